//! Field recognizers shared by every extraction pass.
//!
//! Each recognizer looks for the leftmost match in the text it is given and
//! knows nothing about the others.

use regex::{Match, Regex};
use std::sync::LazyLock;

/// Prefix that marks a 10 digit token as an SO number rather than a phone number.
pub const SO_PREFIX: &str = "2200";

// Word boundaries are ASCII-only, so Latin tokens are found right next to
// letters of other scripts.
static VEHICLE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[A-Za-z]{2}[0-9]{1,2}[A-Za-z]{1,2}[0-9]{3,4}(?-u:\b)")
        .expect("vehicle number pattern")
});

static SO_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)2200[0-9]{6}(?-u:\b)").expect("so number pattern"));

static TEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9]{10}(?-u:\b)").expect("ten digit pattern"));

static WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)([0-9]+(?:\.[0-9]+)?)\s*MT(?-u:\b)").expect("weight pattern")
});

static DESTINATION_BEFORE_WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)\s+[0-9]+(?:\.[0-9]+)?\s*MT(?-u:\b)").expect("destination pattern")
});

static DRIVER_LICENSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9]{4}(?-u:\b)").expect("driver license pattern"));

pub fn find_vehicle_number(text: &str) -> Option<Match<'_>> {
    VEHICLE_NUMBER.find(text)
}

/// Two letters, one or two digits, one or two letters, three or four digits.
pub fn vehicle_number(text: &str) -> Option<&str> {
    find_vehicle_number(text).map(|m| m.as_str())
}

pub fn so_number(text: &str) -> Option<&str> {
    SO_NUMBER.find(text).map(|m| m.as_str())
}

/// First standalone 10 digit token that does not carry the SO prefix.
pub fn phone_number(text: &str) -> Option<&str> {
    TEN_DIGITS
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| !token.starts_with(SO_PREFIX))
}

/// Numeric part of the first `<number> MT` token, unit discarded.
pub fn weight(text: &str) -> Option<&str> {
    WEIGHT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Raw text in front of the weight token, untrimmed.
pub fn destination_before_weight(line: &str) -> Option<&str> {
    DESTINATION_BEFORE_WEIGHT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn find_driver_license(text: &str) -> Option<Match<'_>> {
    DRIVER_LICENSE.find(text)
}

/// Destination carried by a single weight-bearing line.
///
/// Takes the text in front of the weight, drops the first vehicle number found
/// in it and trims. An empty remainder counts as no destination.
pub fn destination_from_line(line: &str) -> Option<String> {
    let prefix = destination_before_weight(line)?.trim();
    let destination = match find_vehicle_number(prefix) {
        Some(vehicle) => format!("{}{}", &prefix[..vehicle.start()], &prefix[vehicle.end()..]),
        None => prefix.to_string(),
    };
    let destination = destination.trim();
    if destination.is_empty() {
        None
    } else {
        Some(destination.to_string())
    }
}
