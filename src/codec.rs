//! # Duration and Enum Codec
//!
//! Converts native values into the textual tokens understood by the JVM
//! bridge and back:
//!
//! - durations use an ISO-8601 subset: `PT[<H>H][<M>M][<S>[.<fff>]S]`
//! - enum variants are written as upper snake case (`MainSample` -> `MAIN_SAMPLE`)
//!
//! Durations are handled with millisecond precision; sub-millisecond parts
//! are truncated when encoding and when decoding.

use std::time::Duration;

use crate::error::{DslError, Result};

const DURATION_PREFIX: &str = "PT";

/// Encode a duration as `PT[<H>H][<M>M][<S>[.<fff>]S]`.
///
/// Hours and minutes are omitted when zero. The seconds block is emitted when
/// both hours and minutes are zero, or when there are seconds or millis to
/// show, so a zero duration becomes `PT0S`.
pub fn encode_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = duration.subsec_millis();

    let mut ret = String::from(DURATION_PREFIX);
    if hours > 0 {
        ret.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        ret.push_str(&format!("{}M", minutes));
    }
    if (hours == 0 && minutes == 0) || seconds > 0 || millis > 0 {
        ret.push_str(&seconds.to_string());
        if millis > 0 {
            ret.push_str(&format!(".{:03}", millis));
        }
        ret.push('S');
    }
    ret
}

/// Decode a duration previously produced by [`encode_duration`] or by the
/// engine side (which may emit fewer or more than three fraction digits).
pub fn decode_duration(value: &str) -> Result<Duration> {
    let invalid = || DslError::Format(format!("No valid duration value '{}'", value));
    let mut rest = value.strip_prefix(DURATION_PREFIX).ok_or_else(invalid)?;

    let mut hours = 0u64;
    let mut minutes = 0u64;
    let mut seconds = 0u64;
    let mut millis = 0u64;

    if let Some(pos) = rest.find('H') {
        hours = parse_segment(&rest[..pos], value)?;
        rest = &rest[pos + 1..];
    }
    if let Some(pos) = rest.find('M') {
        minutes = parse_segment(&rest[..pos], value)?;
        rest = &rest[pos + 1..];
    }
    if !rest.is_empty() {
        let secs_part = rest.strip_suffix('S').ok_or_else(invalid)?;
        match secs_part.split_once('.') {
            Some((whole, fraction)) => {
                seconds = parse_segment(whole, value)?;
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let mut digits: String = fraction.chars().take(3).collect();
                while digits.len() < 3 {
                    digits.push('0');
                }
                millis = parse_segment(&digits, value)?;
            }
            None => seconds = parse_segment(secs_part, value)?,
        }
    }

    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(invalid)?;
    Ok(Duration::from_secs(total) + Duration::from_millis(millis))
}

fn parse_segment(segment: &str, value: &str) -> Result<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DslError::Format(format!(
            "No valid duration value '{}'",
            value
        )));
    }
    segment
        .parse()
        .map_err(|_| DslError::Format(format!("No valid duration value '{}'", value)))
}

/// Transform a camel case identifier into an upper snake case token.
///
/// An underscore is inserted between a lowercase letter or digit and a
/// following uppercase letter, then the whole string is uppercased.
pub fn encode_enum(identifier: &str) -> String {
    let mut ret = String::with_capacity(identifier.len() + 4);
    let mut prev: Option<char> = None;
    for c in identifier.chars() {
        if let Some(p) = prev {
            if c.is_ascii_uppercase() && (p.is_ascii_lowercase() || p.is_ascii_digit()) {
                ret.push('_');
            }
        }
        ret.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    ret
}

/// Serde adapter for fields holding codec-formatted durations.
pub mod iso_duration {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode_duration(&raw).map_err(D::Error::custom)
    }
}
