//! Values derived from raw message attributes
//!
//! Both functions are pure; the only environmental input is the wall clock
//! zone used for ticket numbers.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ROUTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)route:\s*(\S+)").expect("route pattern is valid"));

/// Wall clock in which ticket numbers are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketZone {
    /// Local time zone of the process
    #[default]
    Local,
    /// A named IANA zone
    Named(Tz),
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl TicketZone {
    /// Parse an IANA zone name such as `Europe/Berlin`
    pub fn named(name: &str) -> Option<Self> {
        name.trim().parse::<Tz>().ok().map(TicketZone::Named)
    }

    pub fn utc() -> Self {
        TicketZone::Named(Tz::UTC)
    }

    /// Wall-clock reading of `instant` in this zone
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            TicketZone::Local => instant.with_timezone(&Local).naive_local(),
            TicketZone::Named(tz) => instant.with_timezone(tz).naive_local(),
            TicketZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

impl std::fmt::Display for TicketZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketZone::Local => f.write_str("local"),
            TicketZone::Named(tz) => write!(f, "{}", tz),
            TicketZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Ticket number for a message received at `received_at`, in local time
///
/// Format is `YYYYMMDDHHmm`. Messages received within the same minute share a
/// number.
pub fn ticket_number(received_at: DateTime<Utc>) -> String {
    ticket_number_in(received_at, TicketZone::Local)
}

/// Ticket number for `received_at` read on the wall clock of `zone`
pub fn ticket_number_in(received_at: DateTime<Utc>, zone: TicketZone) -> String {
    let wall = zone.wall_clock(received_at);
    format!(
        "{:04}{:02}{:02}{:02}{:02}",
        wall.year(),
        wall.month(),
        wall.day(),
        wall.hour(),
        wall.minute()
    )
}

/// Route named in a message body, e.g. `Route: US-12` gives `US-12`
///
/// Matching is case-insensitive and only the first occurrence counts.
pub fn extract_route(body: Option<&str>) -> Option<String> {
    let body = body?;
    ROUTE_PATTERN
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
