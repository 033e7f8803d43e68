use crate::vacation::VacationEntry;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum VacationError {
    InvalidRate {
        id: u32,
        rate: f64,
    },
    EndNotAfterStart {
        id: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    PauseExceedsShift {
        id: u32,
        pause_minutes: u32,
        shift_minutes: i64,
    },
    InvalidTravel {
        id: u32,
        travel: f64,
    },
    InvalidDate(String),
    InvalidTime(String),
    DuplicateId(u32),
}

impl fmt::Display for VacationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VacationError::InvalidRate { id, rate } => write!(
                f,
                "vacation {id} requires a positive hourly rate (got {rate})"
            ),
            VacationError::EndNotAfterStart { id, start, end } => write!(
                f,
                "vacation {id} ends at {end} which is not after its start {start}"
            ),
            VacationError::PauseExceedsShift {
                id,
                pause_minutes,
                shift_minutes,
            } => write!(
                f,
                "vacation {id} has an unpaid pause of {pause_minutes} min longer than the shift ({shift_minutes} min)"
            ),
            VacationError::InvalidTravel { id, travel } => write!(
                f,
                "vacation {id} has invalid travel fee {travel} (must be zero or positive)"
            ),
            VacationError::InvalidDate(input) => {
                write!(f, "invalid date '{input}' (expected YYYY-MM-DD)")
            }
            VacationError::InvalidTime(input) => {
                write!(f, "invalid time '{input}' (expected HH:MM)")
            }
            VacationError::DuplicateId(id) => write!(f, "duplicate vacation id {id}"),
        }
    }
}

impl std::error::Error for VacationError {}

pub fn validate_vacation(entry: &VacationEntry) -> Result<(), VacationError> {
    if !entry.rate_chf_h.is_finite() || entry.rate_chf_h <= 0.0 {
        return Err(VacationError::InvalidRate {
            id: entry.id,
            rate: entry.rate_chf_h,
        });
    }

    let shift_minutes = entry.elapsed_minutes();
    if shift_minutes <= 0 {
        return Err(VacationError::EndNotAfterStart {
            id: entry.id,
            start: entry.start(),
            end: entry.end(),
        });
    }

    if entry.unpaid_pause_minutes() > shift_minutes {
        return Err(VacationError::PauseExceedsShift {
            id: entry.id,
            pause_minutes: entry.pause_minutes,
            shift_minutes,
        });
    }

    if !entry.travel_chf.is_finite() || entry.travel_chf < 0.0 {
        return Err(VacationError::InvalidTravel {
            id: entry.id,
            travel: entry.travel_chf,
        });
    }

    Ok(())
}

pub fn validate_vacation_collection(entries: &[VacationEntry]) -> Result<(), VacationError> {
    let mut seen_ids = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen_ids.insert(entry.id) {
            return Err(VacationError::DuplicateId(entry.id));
        }
        validate_vacation(entry)?;
    }
    Ok(())
}
