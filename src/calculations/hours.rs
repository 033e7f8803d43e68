use crate::calendar::CantonCalendar;
use crate::settings::{HolidayPrecedence, NightWindow, PauseAllocation};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Normal,
    Night,
    Sunday,
    Holiday,
}

/// Minutes (or hours, after `to_hours`) per bucket. Buckets never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourBuckets {
    pub normal: f64,
    pub night: f64,
    pub sunday: f64,
    pub holiday: f64,
}

impl HourBuckets {
    pub fn total(&self) -> f64 {
        self.normal + self.night + self.sunday + self.holiday
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Normal => self.normal,
            Bucket::Night => self.night,
            Bucket::Sunday => self.sunday,
            Bucket::Holiday => self.holiday,
        }
    }

    pub fn add(&mut self, bucket: Bucket, amount: f64) {
        match bucket {
            Bucket::Normal => self.normal += amount,
            Bucket::Night => self.night += amount,
            Bucket::Sunday => self.sunday += amount,
            Bucket::Holiday => self.holiday += amount,
        }
    }

    pub fn to_hours(&self) -> Self {
        Self {
            normal: self.normal / 60.0,
            night: self.night / 60.0,
            sunday: self.sunday / 60.0,
            holiday: self.holiday / 60.0,
        }
    }

    /// Remove `pause` minutes according to `policy`. `pause` must not exceed `total()`.
    pub fn without_pause(&self, pause: f64, policy: PauseAllocation) -> Self {
        if pause <= 0.0 {
            return *self;
        }
        let mut result = *self;
        match policy {
            PauseAllocation::NormalFirst => {
                let from_normal = pause.min(result.normal);
                result.normal -= from_normal;
                let remaining = pause - from_normal;
                let others = result.night + result.sunday + result.holiday;
                if remaining > 0.0 && others > 0.0 {
                    let factor = ((others - remaining) / others).max(0.0);
                    result.night *= factor;
                    result.sunday *= factor;
                    result.holiday *= factor;
                }
            }
            PauseAllocation::Proportional => {
                let total = result.total();
                if total > 0.0 {
                    let factor = ((total - pause) / total).max(0.0);
                    result.normal *= factor;
                    result.night *= factor;
                    result.sunday *= factor;
                    result.holiday *= factor;
                }
            }
        }
        result
    }
}

/// Walks a shift segment by segment and classifies every minute.
pub struct HourSplitter<'a> {
    calendar: &'a CantonCalendar,
    night_window: NightWindow,
    precedence: HolidayPrecedence,
}

impl<'a> HourSplitter<'a> {
    pub fn new(
        calendar: &'a CantonCalendar,
        night_window: NightWindow,
        precedence: HolidayPrecedence,
    ) -> Self {
        Self {
            calendar,
            night_window,
            precedence,
        }
    }

    /// Bucket of the minute starting at `at`. Holiday and Sunday outrank
    /// night; their mutual order follows the configured precedence.
    pub fn classify(&self, at: NaiveDateTime) -> Bucket {
        let date = at.date();
        let holiday = self.calendar.is_holiday(date);
        let sunday = date.weekday() == Weekday::Sun;
        match (holiday, sunday) {
            (true, true) => match self.precedence {
                HolidayPrecedence::HolidayFirst => Bucket::Holiday,
                HolidayPrecedence::SundayFirst => Bucket::Sunday,
            },
            (true, false) => Bucket::Holiday,
            (false, true) => Bucket::Sunday,
            (false, false) if self.night_window.contains(at.time()) => Bucket::Night,
            (false, false) => Bucket::Normal,
        }
    }

    /// Next instant after `at` where the classification may change:
    /// the following midnight or a night-window edge.
    fn next_boundary(&self, at: NaiveDateTime) -> NaiveDateTime {
        let date = at.date();
        let mut next = NaiveDateTime::new(date + Duration::days(1), NaiveTime::MIN);
        if !self.night_window.is_disabled() {
            for edge in [self.night_window.start, self.night_window.end] {
                let candidate = NaiveDateTime::new(date, edge);
                if candidate > at && candidate < next {
                    next = candidate;
                }
            }
        }
        next
    }

    /// Elapsed minutes between `start` and `end` per bucket. Empty when
    /// `end <= start`.
    pub fn execute(&self, start: NaiveDateTime, end: NaiveDateTime) -> HourBuckets {
        let mut buckets = HourBuckets::default();
        let mut cursor = start;
        while cursor < end {
            let boundary = self.next_boundary(cursor).min(end);
            let minutes = (boundary - cursor).num_seconds() as f64 / 60.0;
            buckets.add(self.classify(cursor), minutes);
            cursor = boundary;
        }
        buckets
    }
}
