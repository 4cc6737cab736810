//! Supported string formats.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;

// chrono accepts single-digit fields, so the shape is checked first.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex must compile"));
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:\d{2})?$")
        .expect("static regex must compile")
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex must compile"));
static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]*$").expect("static regex must compile")
});
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:urn:uuid:)?[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("static regex must compile")
});
static HOSTNAME_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?$")
        .expect("static regex must compile")
});

/// A recognized `format` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    DateTime,
    Date,
    Time,
    Email,
    Uri,
    Uuid,
    Ipv4,
    Ipv6,
    Hostname,
}

impl Format {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "date-time" => Format::DateTime,
            "date" => Format::Date,
            "time" => Format::Time,
            "email" => Format::Email,
            "uri" => Format::Uri,
            "uuid" => Format::Uuid,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "hostname" => Format::Hostname,
            _ => return None,
        })
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        match self {
            Format::DateTime => match text.split_once(['T', 't', ' ']) {
                Some((date, time)) => {
                    DATE_RE.is_match(date)
                        && TIME_RE.is_match(time)
                        && DateTime::parse_from_rfc3339(text).is_ok()
                }
                None => false,
            },
            Format::Date => is_date(text),
            Format::Time => is_time(text),
            Format::Email => EMAIL_RE.is_match(text),
            Format::Uri => URI_RE.is_match(text),
            Format::Uuid => UUID_RE.is_match(text),
            Format::Ipv4 => text.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => text.parse::<Ipv6Addr>().is_ok(),
            Format::Hostname => {
                !text.is_empty()
                    && text.len() <= 253
                    && text.split('.').all(|label| HOSTNAME_LABEL_RE.is_match(label))
            }
        }
    }
}

fn is_date(text: &str) -> bool {
    DATE_RE.is_match(text) && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Time of day with an optional offset.
fn is_time(text: &str) -> bool {
    if !TIME_RE.is_match(text) {
        return false;
    }
    let has_offset = text.ends_with(['Z', 'z']) || text[8..].contains(['+', '-']);
    if has_offset {
        DateTime::parse_from_rfc3339(&format!("1970-01-01T{text}")).is_ok()
    } else {
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok()
    }
}
