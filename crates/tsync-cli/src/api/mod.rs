//! Graph API client module
//!
//! HTTP client for the mailbox and site endpoints of Microsoft Graph.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GraphClient;
