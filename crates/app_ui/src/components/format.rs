//! Display formatting for record timestamps
//!
//! All formatters render in the local time zone and print `Invalid Date`
//! for timestamps that do not parse.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

pub const INVALID_DATE: &str = "Invalid Date";

fn format_in<Tz>(iso: &str, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt.with_timezone(tz).format(pattern).to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// `01/15/2024`
pub fn date(iso: &str) -> String {
    date_in(iso, &Local)
}

/// `01/15/2024, 10:30 AM`
pub fn date_time(iso: &str) -> String {
    date_time_in(iso, &Local)
}

/// `Jan 15, 2024`
pub fn short_date(iso: &str) -> String {
    short_date_in(iso, &Local)
}

pub fn date_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format_in(iso, tz, "%m/%d/%Y")
}

pub fn date_time_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format_in(iso, tz, "%m/%d/%Y, %I:%M %p")
}

pub fn short_date_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format_in(iso, tz, "%b %-d, %Y")
}
