pub mod grouping;
pub mod hours;
pub mod pricing;

use crate::settings::QuoteSettings;
use crate::vacation::{VacationBreakdown, VacationEntry, VacationLine};
use crate::vacation_validation::{self, VacationError};
use chrono::Datelike;
use hours::HourSplitter;
use pricing::Pricing;

/// Split a vacation into hour buckets and price it. Pure given its inputs.
pub fn calculate_vacation(
    entry: &VacationEntry,
    settings: &QuoteSettings,
) -> Result<VacationBreakdown, VacationError> {
    vacation_validation::validate_vacation(entry)?;

    let start = entry.start();
    let end = entry.end();
    let canton = entry.canton_code();
    let calendar = settings.canton_calendar(&canton, start.year(), end.year());
    if !calendar.is_known() {
        tracing::warn!(
            vacation = entry.id,
            canton = %canton,
            "unknown canton, no holiday hours applied"
        );
    }

    let splitter = HourSplitter::new(
        &calendar,
        settings.night_window,
        settings.holiday_precedence,
    );
    let elapsed = splitter.execute(start, end);
    let pause = entry.unpaid_pause_minutes() as f64;
    let billable_minutes = elapsed.total() - pause;
    let hours = elapsed
        .without_pause(pause, settings.pause_allocation)
        .to_hours();

    let amounts = Pricing::new(settings).execute(entry.rate_chf_h, &hours, entry.travel_chf);

    let breakdown = VacationBreakdown {
        hours_normal: hours.normal,
        hours_night: hours.night,
        hours_sunday: hours.sunday,
        hours_holiday: hours.holiday,
        hours_total: billable_minutes / 60.0,
        line_ht: amounts.ht,
        line_tva: amounts.tva,
        line_ttc: amounts.ttc,
    };
    tracing::debug!(
        vacation = entry.id,
        canton = %canton,
        hours_total = breakdown.hours_total,
        hours_night = breakdown.hours_night,
        hours_sunday = breakdown.hours_sunday,
        hours_holiday = breakdown.hours_holiday,
        line_ht = breakdown.line_ht,
        "vacation calculated"
    );
    Ok(breakdown)
}

pub fn calculate_line(
    entry: &VacationEntry,
    settings: &QuoteSettings,
) -> Result<VacationLine, VacationError> {
    let breakdown = calculate_vacation(entry, settings)?;
    Ok(VacationLine {
        entry: entry.clone(),
        breakdown,
    })
}

pub fn calculate_lines(
    entries: &[VacationEntry],
    settings: &QuoteSettings,
) -> Result<Vec<VacationLine>, VacationError> {
    entries
        .iter()
        .map(|entry| calculate_line(entry, settings))
        .collect()
}
