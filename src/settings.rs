use crate::calendar::{CantonCalendar, HolidayTable};
use crate::serde_time;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Daily window whose minutes count as night hours.
///
/// `start > end` wraps midnight (23:00-06:00), `start < end` stays within one
/// day, `start == end` disables night hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    #[serde(with = "serde_time")]
    pub start: NaiveTime,
    #[serde(with = "serde_time")]
    pub end: NaiveTime,
}

impl NightWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_disabled(&self) -> bool {
        self.start == self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.is_disabled() {
            false
        } else if self.wraps_midnight() {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }

    /// Minutes per day covered by the window.
    pub fn daily_minutes(&self) -> i64 {
        let start = minute_of_day(self.start);
        let end = minute_of_day(self.end);
        if self.is_disabled() {
            0
        } else if self.wraps_midnight() {
            24 * 60 - start + end
        } else {
            end - start
        }
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// How unpaid pause minutes are taken out of the hour buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseAllocation {
    /// Remove from normal hours first, then proportionally from the others.
    #[default]
    NormalFirst,
    /// Remove from every bucket in proportion to its size.
    Proportional,
}

impl PauseAllocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseAllocation::NormalFirst => "normal_first",
            PauseAllocation::Proportional => "proportional",
        }
    }
}

impl FromStr for PauseAllocation {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal_first" | "normal" => Ok(PauseAllocation::NormalFirst),
            "proportional" => Ok(PauseAllocation::Proportional),
            _ => Err(SettingsError::UnknownOption {
                field: "pause_allocation",
                value: s.to_string(),
            }),
        }
    }
}

/// Which markup wins when a minute falls on a public holiday that is also a Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayPrecedence {
    #[default]
    HolidayFirst,
    SundayFirst,
}

impl HolidayPrecedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayPrecedence::HolidayFirst => "holiday_first",
            HolidayPrecedence::SundayFirst => "sunday_first",
        }
    }
}

impl FromStr for HolidayPrecedence {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "holiday_first" | "holiday" => Ok(HolidayPrecedence::HolidayFirst),
            "sunday_first" | "sunday" => Ok(HolidayPrecedence::SundayFirst),
            _ => Err(SettingsError::UnknownOption {
                field: "holiday_precedence",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    InvalidPercentage { field: &'static str, value: f64 },
    InvalidVat(f64),
    InvalidAgentRate { agent_type: String, rate: f64 },
    EmptyCurrency,
    UnknownOption { field: &'static str, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidPercentage { field, value } => {
                write!(f, "{field} must be a non-negative percentage (got {value})")
            }
            SettingsError::InvalidVat(value) => {
                write!(f, "vat_pct must be between 0 and 100 (got {value})")
            }
            SettingsError::InvalidAgentRate { agent_type, rate } => write!(
                f,
                "suggested rate for agent type '{agent_type}' must be positive (got {rate})"
            ),
            SettingsError::EmptyCurrency => write!(f, "currency must not be empty"),
            SettingsError::UnknownOption { field, value } => {
                write!(f, "unknown {field} '{value}'")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Everything the calculator needs besides the vacation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    pub night_window: NightWindow,
    pub night_markup_pct: f64,
    pub sunday_markup_pct: f64,
    pub holiday_markup_pct: f64,
    pub vat_pct: f64,
    pub currency: String,
    pub pause_allocation: PauseAllocation,
    pub holiday_precedence: HolidayPrecedence,
    /// Use the built-in Swiss cantonal holidays in addition to `holidays`.
    pub swiss_holidays: bool,
    pub holidays: HolidayTable,
    /// Suggested hourly rate per agent type. Never used by the calculator.
    pub agent_rates: BTreeMap<String, f64>,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        let agent_rates = BTreeMap::from([
            ("agent de sécurité".to_string(), 45.0),
            ("agent cynophile".to_string(), 55.0),
            ("chef de poste".to_string(), 60.0),
        ]);
        Self {
            night_window: NightWindow::default(),
            night_markup_pct: 25.0,
            sunday_markup_pct: 50.0,
            holiday_markup_pct: 100.0,
            vat_pct: 8.1,
            currency: "CHF".to_string(),
            pause_allocation: PauseAllocation::default(),
            holiday_precedence: HolidayPrecedence::default(),
            swiss_holidays: true,
            holidays: HolidayTable::default(),
            agent_rates,
        }
    }
}

impl QuoteSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("night_markup_pct", self.night_markup_pct),
            ("sunday_markup_pct", self.sunday_markup_pct),
            ("holiday_markup_pct", self.holiday_markup_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidPercentage { field, value });
            }
        }
        if !self.vat_pct.is_finite() || self.vat_pct < 0.0 || self.vat_pct >= 100.0 {
            return Err(SettingsError::InvalidVat(self.vat_pct));
        }
        if self.currency.trim().is_empty() {
            return Err(SettingsError::EmptyCurrency);
        }
        for (agent_type, rate) in &self.agent_rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(SettingsError::InvalidAgentRate {
                    agent_type: agent_type.clone(),
                    rate: *rate,
                });
            }
        }
        Ok(())
    }

    /// Agent types are matched case-insensitively.
    pub fn suggested_rate(&self, agent_type: &str) -> Option<f64> {
        let wanted = agent_type.trim().to_lowercase();
        self.agent_rates
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, rate)| *rate)
    }

    pub fn set_agent_rate(&mut self, agent_type: impl Into<String>, rate: f64) {
        self.agent_rates.insert(agent_type.into(), rate);
    }

    pub fn canton_calendar(&self, canton: &str, start_year: i32, end_year: i32) -> CantonCalendar {
        CantonCalendar::resolve(
            canton,
            self.swiss_holidays,
            &self.holidays,
            start_year,
            end_year,
        )
    }
}
