use crate::calculations::pricing::{round_chf, to_centimes};
use crate::serde_time;
use crate::vacation::VacationLine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DATE_LABEL_FORMAT: &str = "%d.%m.%Y";

/// Display aggregate of vacations sharing the same billing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedVacation {
    pub agent_type: String,
    #[serde(rename = "rateCHFh")]
    pub rate_chf_h: f64,
    pub canton: String,
    pub pause_minutes: u32,
    pub pause_paid: bool,
    /// Travel fee of a single shift.
    #[serde(rename = "travelCHF")]
    pub travel_chf: f64,
    pub has_markup: bool,
    pub date_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_label: Option<String>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub shift_count: usize,
    pub entry_ids: Vec<u32>,
    pub hours_normal: f64,
    pub hours_night: f64,
    pub hours_sunday: f64,
    pub hours_holiday: f64,
    pub hours_total: f64,
    #[serde(rename = "travelTotalCHF")]
    pub travel_total_chf: f64,
    #[serde(rename = "lineHT")]
    pub line_ht: f64,
    #[serde(rename = "lineTVA")]
    pub line_tva: f64,
    #[serde(rename = "lineTTC")]
    pub line_ttc: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    agent_type: String,
    rate_centimes: i64,
    canton: String,
    pause_minutes: u32,
    pause_paid: bool,
    travel_centimes: i64,
    has_markup: bool,
}

impl GroupKey {
    fn of(line: &VacationLine) -> Self {
        let entry = &line.entry;
        Self {
            agent_type: entry.agent_type.trim().to_string(),
            rate_centimes: to_centimes(entry.rate_chf_h),
            canton: entry.canton_code(),
            pause_minutes: entry.pause_minutes,
            pause_paid: entry.pause_paid,
            travel_centimes: to_centimes(entry.travel_chf),
            has_markup: line.breakdown.has_markup(),
        }
    }
}

/// Collapse vacation lines into display rows. Groups keep the order of their
/// first member; members are ordered by start time then id.
pub fn group_vacations(lines: &[VacationLine]) -> Vec<GroupedVacation> {
    let mut order: Vec<Vec<&VacationLine>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for line in lines {
        let key = GroupKey::of(line);
        match index.get(&key) {
            Some(&slot) => order[slot].push(line),
            None => {
                index.insert(key, order.len());
                order.push(vec![line]);
            }
        }
    }

    order
        .into_iter()
        .map(|mut members| {
            members.sort_by(|a, b| {
                a.entry
                    .start()
                    .cmp(&b.entry.start())
                    .then(a.entry.id.cmp(&b.entry.id))
            });
            build_group(&members)
        })
        .collect()
}

fn build_group(members: &[&VacationLine]) -> GroupedVacation {
    let first = &members[0].entry;
    let first_date = members
        .iter()
        .map(|line| line.entry.date_start)
        .min()
        .unwrap_or(first.date_start);
    let last_date = members
        .iter()
        .map(|line| line.entry.date_end)
        .max()
        .unwrap_or(first.date_end);

    let mut group = GroupedVacation {
        agent_type: first.agent_type.trim().to_string(),
        rate_chf_h: first.rate_chf_h,
        canton: first.canton_code(),
        pause_minutes: first.pause_minutes,
        pause_paid: first.pause_paid,
        travel_chf: first.travel_chf,
        has_markup: members[0].breakdown.has_markup(),
        date_label: date_label(members, first_date, last_date),
        time_label: time_label(members),
        first_date,
        last_date,
        shift_count: members.len(),
        entry_ids: members.iter().map(|line| line.entry.id).collect(),
        hours_normal: 0.0,
        hours_night: 0.0,
        hours_sunday: 0.0,
        hours_holiday: 0.0,
        hours_total: 0.0,
        travel_total_chf: 0.0,
        line_ht: 0.0,
        line_tva: 0.0,
        line_ttc: 0.0,
    };

    for line in members {
        let breakdown = &line.breakdown;
        group.hours_normal += breakdown.hours_normal;
        group.hours_night += breakdown.hours_night;
        group.hours_sunday += breakdown.hours_sunday;
        group.hours_holiday += breakdown.hours_holiday;
        group.hours_total += breakdown.hours_total;
        group.travel_total_chf = round_chf(group.travel_total_chf + line.entry.travel_chf);
        group.line_ht = round_chf(group.line_ht + breakdown.line_ht);
        group.line_tva = round_chf(group.line_tva + breakdown.line_tva);
        group.line_ttc = round_chf(group.line_ttc + breakdown.line_ttc);
    }

    group
}

fn date_label(members: &[&VacationLine], first_date: NaiveDate, last_date: NaiveDate) -> String {
    let single_day = members
        .iter()
        .all(|line| line.entry.date_start == first_date && line.entry.date_end == first_date);
    if members.len() == 1 || single_day {
        first_date.format(DATE_LABEL_FORMAT).to_string()
    } else {
        format!(
            "du {} au {}",
            first_date.format(DATE_LABEL_FORMAT),
            last_date.format(DATE_LABEL_FORMAT)
        )
    }
}

fn time_label(members: &[&VacationLine]) -> Option<String> {
    let first = &members[0].entry;
    members
        .iter()
        .all(|line| line.entry.time_start == first.time_start && line.entry.time_end == first.time_end)
        .then(|| {
            format!(
                "{} - {}",
                serde_time::format(first.time_start),
                serde_time::format(first.time_end)
            )
        })
}
