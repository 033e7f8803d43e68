//! `HH:MM` wall-clock times on the JSON boundary.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer, de};

pub const FORMAT: &str = "%H:%M";

/// Strict `HH:MM`; seconds are rejected since they would not survive a save.
pub fn parse(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), FORMAT).ok()
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn format(time: NaiveTime) -> String {
    time.format(FORMAT).to_string()
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(*time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
}
