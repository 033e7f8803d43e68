use crate::calendar::normalize_canton_code;
use crate::serde_time;
use crate::vacation_validation::VacationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One scheduled agent shift, as entered on a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationEntry {
    #[serde(default)]
    pub id: u32,
    pub date_start: NaiveDate,
    #[serde(with = "serde_time")]
    pub time_start: NaiveTime,
    pub date_end: NaiveDate,
    #[serde(with = "serde_time")]
    pub time_end: NaiveTime,
    #[serde(default)]
    pub agent_type: String,
    #[serde(rename = "rateCHFh")]
    pub rate_chf_h: f64,
    #[serde(default)]
    pub pause_minutes: u32,
    #[serde(default)]
    pub pause_paid: bool,
    #[serde(rename = "travelCHF", default)]
    pub travel_chf: f64,
    #[serde(default)]
    pub canton: String,
}

impl VacationEntry {
    /// Times are kept to the minute, the precision they are stored with.
    pub fn new(
        id: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rate_chf_h: f64,
        canton: &str,
    ) -> Self {
        Self {
            id,
            date_start: start.date(),
            time_start: serde_time::truncate_to_minute(start.time()),
            date_end: end.date(),
            time_end: serde_time::truncate_to_minute(end.time()),
            agent_type: String::new(),
            rate_chf_h,
            pause_minutes: 0,
            pause_paid: false,
            travel_chf: 0.0,
            canton: normalize_canton_code(canton),
        }
    }

    /// Build an entry from the string form used by forms and the CLI:
    /// ISO dates and `HH:MM` times.
    pub fn parse(
        id: u32,
        date_start: &str,
        time_start: &str,
        date_end: &str,
        time_end: &str,
        rate_chf_h: f64,
        canton: &str,
    ) -> Result<Self, VacationError> {
        let start = NaiveDateTime::new(parse_date(date_start)?, parse_time(time_start)?);
        let end = NaiveDateTime::new(parse_date(date_end)?, parse_time(time_end)?);
        Ok(Self::new(id, start, end, rate_chf_h, canton))
    }

    pub fn with_agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = agent_type.into();
        self
    }

    pub fn with_pause(mut self, minutes: u32, paid: bool) -> Self {
        self.pause_minutes = minutes;
        self.pause_paid = paid;
        self
    }

    pub fn with_travel(mut self, travel_chf: f64) -> Self {
        self.travel_chf = travel_chf;
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date_start, self.time_start)
    }

    pub fn end(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date_end, self.time_end)
    }

    /// Elapsed wall-clock minutes, negative when the end precedes the start.
    pub fn elapsed_minutes(&self) -> i64 {
        (self.end() - self.start()).num_minutes()
    }

    /// Minutes removed from billable time.
    pub fn unpaid_pause_minutes(&self) -> i64 {
        if self.pause_paid {
            0
        } else {
            i64::from(self.pause_minutes)
        }
    }

    pub fn canton_code(&self) -> String {
        normalize_canton_code(&self.canton)
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, VacationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| VacationError::InvalidDate(input.to_string()))
}

pub(crate) fn parse_time(input: &str) -> Result<NaiveTime, VacationError> {
    serde_time::parse(input).ok_or_else(|| VacationError::InvalidTime(input.to_string()))
}

/// Computed hours and amounts for one vacation. Derived data, recomputed on
/// every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationBreakdown {
    pub hours_normal: f64,
    pub hours_night: f64,
    pub hours_sunday: f64,
    pub hours_holiday: f64,
    pub hours_total: f64,
    #[serde(rename = "lineHT")]
    pub line_ht: f64,
    #[serde(rename = "lineTVA")]
    pub line_tva: f64,
    #[serde(rename = "lineTTC")]
    pub line_ttc: f64,
}

impl VacationBreakdown {
    pub fn majorated_hours(&self) -> f64 {
        self.hours_night + self.hours_sunday + self.hours_holiday
    }

    pub fn has_markup(&self) -> bool {
        self.majorated_hours() > 0.0
    }
}

/// An entry with its breakdown, flattened into a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationLine {
    #[serde(flatten)]
    pub entry: VacationEntry,
    #[serde(flatten)]
    pub breakdown: VacationBreakdown,
}
