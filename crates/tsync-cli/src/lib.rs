//! Ticket Sync CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line front end that turns unread mailbox messages into list items.
//!
//! # Overview
//!
//! - **Directory**: Browse sites, lists and columns (`tsync sites`, `tsync lists`, `tsync columns`)
//! - **Destination**: Remember the site and list to write to (`tsync select`)
//! - **Inbox**: Preview unread messages and what they become (`tsync messages`)
//! - **Mapping**: Inspect, edit and auto-resolve the field mapping (`tsync mapping`)
//! - **Sync**: Write selected messages and mark them read (`tsync sync`)
//! - **Maintenance**: Clear saved state and show configuration (`tsync reset`, `tsync config`)

pub mod api;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod interrupt;
pub mod progress;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use context::AppContext;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};

/// tsync - mailbox to list ticket synchronization
#[derive(Parser, Debug)]
#[command(name = "tsync")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Graph API base URL (overrides configuration)
    #[arg(long, global = true)]
    pub graph_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List sites
    Sites,

    /// List the lists of a site
    Lists {
        /// Site id (defaults to the selected site)
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Remember the site or list to write to
    Select {
        #[command(subcommand)]
        command: SelectCommand,
    },

    /// Show the selectable columns of the selected list
    Columns,

    /// Show unread messages, oldest first
    Messages {
        /// Maximum number of messages to fetch
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },

    /// Inspect and edit the field mapping of the selected list
    Mapping {
        #[command(subcommand)]
        command: MappingCommand,
    },

    /// Write messages to the selected list and mark them read
    Sync {
        /// Message ids to sync, in order
        ids: Vec<String>,

        /// Sync every unread message
        #[arg(short, long, conflicts_with = "ids")]
        all: bool,

        /// Maximum number of messages to fetch
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,

        /// Destination as '<site-id>/<list-id>' instead of the selected one
        #[arg(long)]
        to: Option<String>,
    },

    /// Clear all saved mappings and selections
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Selection subcommands
#[derive(Subcommand, Debug)]
pub enum SelectCommand {
    /// Select a site; forgets the selected list when the site changes
    Site {
        /// Site id
        id: String,
    },

    /// Select a list of the selected site
    List {
        /// List id
        id: String,
    },

    /// Show the current selection
    Show,
}

/// Mapping subcommands
#[derive(Subcommand, Debug)]
pub enum MappingCommand {
    /// Show the active mapping
    Show,

    /// Map a field to a column and save
    Set {
        /// Field key (ticketnumber, subject, route, description, user, status)
        field: String,

        /// Column internal or display name
        column: String,
    },

    /// Clear a field's column and save
    Unset {
        /// Field key
        field: String,
    },

    /// Show the mapping guessed from column names
    Auto {
        /// Save the guessed mapping
        #[arg(long)]
        save: bool,
    },

    /// Delete the saved mapping
    Delete,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show all configuration
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["tsync", "sync", "--all", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["tsync", "messages", "--limit", "0"]).is_err());

        let cli = Cli::try_parse_from(["tsync", "sync", "--all", "--limit", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Sync { limit: Some(5), all: true, .. }));
    }

    #[test]
    fn test_sync_ids_conflict_with_all() {
        assert!(Cli::try_parse_from(["tsync", "sync", "m1", "--all"]).is_err());
    }
}
