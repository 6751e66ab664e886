//! Input validators for each conversation step.
//!
//! Every check is total: any string, including empty or whitespace-only
//! input, yields a plain `bool` (or `None` for the parsing variants).

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::Deserialize;

use crate::config::FlowConfig;

/// `+998` followed by exactly nine national digits, plus sign optional.
static UZBEK_PHONE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?998[0-9]{9}$").ok());

/// Any 9 to 15 digit number, plus sign optional.
static INTERNATIONAL_PHONE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{9,15}$").ok());

/// Zero-padded 24-hour `HH:MM`.
static TIME_OF_DAY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").ok());

/// Which phone number shapes are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonePolicy {
    /// Uzbek mobile numbers only: `+998` and nine digits.
    #[default]
    Uzbekistan,
    /// Any international number of 9 to 15 digits.
    International,
}

fn pattern_matches(pattern: &Option<Regex>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Returns `true` if `text` is a phone number accepted under `policy`.
pub fn is_valid_phone(text: &str, policy: PhonePolicy) -> bool {
    match policy {
        PhonePolicy::Uzbekistan => pattern_matches(&UZBEK_PHONE, text),
        PhonePolicy::International => pattern_matches(&INTERNATIONAL_PHONE, text),
    }
}

/// Parse a free seat count in `1..=4`.
///
/// Rejects surrounding garbage, non-integers and out-of-range values alike.
pub fn parse_seat_count(text: &str) -> Option<u8> {
    text.parse::<u8>().ok().filter(|n| (1..=4).contains(n))
}

/// Returns `true` if `text` is a seat count in `1..=4`.
pub fn is_valid_seat_count(text: &str) -> bool {
    parse_seat_count(text).is_some()
}

/// Parse a zero-padded `HH:MM` departure time.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    if !pattern_matches(&TIME_OF_DAY, text) {
        return None;
    }
    NaiveTime::parse_from_str(text, "%H:%M").ok()
}

/// Returns `true` if `text` is a zero-padded `HH:MM` time.
pub fn is_valid_time(text: &str) -> bool {
    parse_time(text).is_some()
}

/// Configured labels and tokens the validators compare against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRules {
    /// The two accepted routes.
    pub routes: [String; 2],
    /// Passenger role menu label.
    pub passenger_label: String,
    /// Driver role menu label.
    pub driver_label: String,
    /// Affirmative token.
    pub yes: String,
    /// Negative token.
    pub no: String,
    /// Phone acceptance policy.
    pub phone_policy: PhonePolicy,
}

impl Default for FlowRules {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

impl FlowRules {
    /// Build rules from the `[flow]` config section.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            routes: config.routes.clone(),
            passenger_label: config.passenger_label.clone(),
            driver_label: config.driver_label.clone(),
            yes: config.yes.clone(),
            no: config.no.clone(),
            phone_policy: config.phone_policy,
        }
    }

    /// Returns `true` if `text` is exactly one of the two routes.
    pub fn is_valid_route(&self, text: &str) -> bool {
        !text.is_empty() && self.routes.iter().any(|route| route == text)
    }

    /// Returns `true` if `text` is a phone number under the configured policy.
    pub fn is_valid_phone(&self, text: &str) -> bool {
        is_valid_phone(text, self.phone_policy)
    }

    /// Map the yes/no tokens to a boolean.
    pub fn parse_yes_no(&self, text: &str) -> Option<bool> {
        if text.is_empty() {
            None
        } else if text == self.yes {
            Some(true)
        } else if text == self.no {
            Some(false)
        } else {
            None
        }
    }

    /// Returns `true` if `text` is exactly the yes or the no token.
    pub fn is_valid_yes_no(&self, text: &str) -> bool {
        self.parse_yes_no(text).is_some()
    }
}
