use super::{PersistenceError, PersistenceResult};
use crate::{
    Quote,
    item::QuoteItem,
    metadata::{Client, QuoteMetadata},
    serde_time,
    settings::QuoteSettings,
    vacation::{VacationEntry, VacationLine, parse_date, parse_time},
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct QuoteSnapshot {
    metadata: QuoteMetadata,
    #[serde(default)]
    client: Client,
    #[serde(default)]
    settings: QuoteSettings,
    #[serde(default)]
    vacations: Vec<VacationEntry>,
    #[serde(default)]
    items: Vec<QuoteItem>,
}

impl QuoteSnapshot {
    fn from_quote(quote: &Quote) -> PersistenceResult<Self> {
        super::validate_vacations(quote.vacations())?;
        Ok(Self {
            metadata: quote.metadata().clone(),
            client: quote.client().clone(),
            settings: quote.settings().clone(),
            vacations: quote.vacations().to_vec(),
            items: quote.items().to_vec(),
        })
    }

    fn into_quote(self) -> PersistenceResult<Quote> {
        super::validate_vacations(&self.vacations)?;
        let mut quote = Quote::from_parts(self.metadata, self.client, self.settings)?;
        for entry in self.vacations {
            quote.upsert_vacation(entry)?;
        }
        for item in self.items {
            quote.add_item(item)?;
        }
        Ok(quote)
    }
}

pub fn save_quote_to_json<P: AsRef<Path>>(quote: &Quote, path: P) -> PersistenceResult<()> {
    let snapshot = QuoteSnapshot::from_quote(quote)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::info!(path = %path.as_ref().display(), "quote saved as json");
    Ok(())
}

pub fn load_quote_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Quote> {
    let file = File::open(path.as_ref())?;
    let snapshot: QuoteSnapshot = serde_json::from_reader(file)?;
    let quote = snapshot.into_quote()?;
    tracing::info!(
        path = %path.as_ref().display(),
        vacations = quote.vacations().len(),
        "quote loaded from json"
    );
    Ok(quote)
}

pub fn save_settings_to_json<P: AsRef<Path>>(
    settings: &QuoteSettings,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}

pub fn load_settings_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<QuoteSettings> {
    let file = File::open(path)?;
    let settings: QuoteSettings = serde_json::from_reader(file)?;
    settings
        .validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    Ok(settings)
}

/// One CSV row: either the quote header (metadata columns filled) or one
/// vacation with its computed columns. Computed columns are ignored on import.
#[derive(Default, Serialize, Deserialize)]
struct VacationCsvRecord {
    id: String,
    date_start: String,
    time_start: String,
    date_end: String,
    time_end: String,
    agent_type: String,
    rate_chf_h: String,
    pause_minutes: String,
    pause_paid: String,
    travel_chf: String,
    canton: String,
    hours_normal: String,
    hours_night: String,
    hours_sunday: String,
    hours_holiday: String,
    hours_total: String,
    line_ht: String,
    line_tva: String,
    line_ttc: String,
    #[serde(default)]
    metadata_json: String,
    #[serde(default)]
    client_json: String,
    #[serde(default)]
    settings_json: String,
    #[serde(default)]
    items_json: String,
}

impl From<&VacationLine> for VacationCsvRecord {
    fn from(line: &VacationLine) -> Self {
        let entry = &line.entry;
        let breakdown = &line.breakdown;
        VacationCsvRecord {
            id: entry.id.to_string(),
            date_start: entry.date_start.format("%Y-%m-%d").to_string(),
            time_start: serde_time::format(entry.time_start),
            date_end: entry.date_end.format("%Y-%m-%d").to_string(),
            time_end: serde_time::format(entry.time_end),
            agent_type: entry.agent_type.clone(),
            rate_chf_h: entry.rate_chf_h.to_string(),
            pause_minutes: entry.pause_minutes.to_string(),
            pause_paid: entry.pause_paid.to_string(),
            travel_chf: entry.travel_chf.to_string(),
            canton: entry.canton.clone(),
            hours_normal: format_hours(breakdown.hours_normal),
            hours_night: format_hours(breakdown.hours_night),
            hours_sunday: format_hours(breakdown.hours_sunday),
            hours_holiday: format_hours(breakdown.hours_holiday),
            hours_total: format_hours(breakdown.hours_total),
            line_ht: format!("{:.2}", breakdown.line_ht),
            line_tva: format!("{:.2}", breakdown.line_tva),
            line_ttc: format!("{:.2}", breakdown.line_ttc),
            ..VacationCsvRecord::default()
        }
    }
}

impl VacationCsvRecord {
    fn metadata_row(quote: &Quote) -> PersistenceResult<Self> {
        Ok(VacationCsvRecord {
            metadata_json: serde_json::to_string(quote.metadata())?,
            client_json: serde_json::to_string(quote.client())?,
            settings_json: serde_json::to_string(quote.settings())?,
            items_json: serde_json::to_string(quote.items())?,
            ..VacationCsvRecord::default()
        })
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_entry(self) -> PersistenceResult<VacationEntry> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to vacation".into(),
            ));
        }
        let invalid = |err: crate::VacationError| PersistenceError::InvalidData(err.to_string());
        let start = chrono::NaiveDateTime::new(
            parse_date(&self.date_start).map_err(invalid)?,
            parse_time(&self.time_start).map_err(invalid)?,
        );
        let end = chrono::NaiveDateTime::new(
            parse_date(&self.date_end).map_err(invalid)?,
            parse_time(&self.time_end).map_err(invalid)?,
        );
        let id = parse_number::<u32>(&self.id, "id")?.unwrap_or(0);
        let rate = parse_number::<f64>(&self.rate_chf_h, "rate_chf_h")?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("vacation {id} is missing rate_chf_h"))
        })?;
        let pause_minutes = parse_number::<u32>(&self.pause_minutes, "pause_minutes")?.unwrap_or(0);
        let pause_paid = parse_bool(&self.pause_paid)?.unwrap_or(false);
        let travel = parse_number::<f64>(&self.travel_chf, "travel_chf")?.unwrap_or(0.0);

        Ok(VacationEntry::new(id, start, end, rate, &self.canton)
            .with_agent_type(self.agent_type)
            .with_pause(pause_minutes, pause_paid)
            .with_travel(travel))
    }
}

pub fn save_quote_to_csv<P: AsRef<Path>>(quote: &Quote, path: P) -> PersistenceResult<()> {
    super::validate_vacations(quote.vacations())?;
    let lines = quote.vacation_lines()?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(VacationCsvRecord::metadata_row(quote)?)?;
    for line in &lines {
        writer.serialize(VacationCsvRecord::from(line))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.as_ref().display(), rows = lines.len(), "quote saved as csv");
    Ok(())
}

/// Vacation lines only, without the quote header row.
pub fn export_vacation_lines_to_csv<P: AsRef<Path>>(
    lines: &[VacationLine],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for line in lines {
        writer.serialize(VacationCsvRecord::from(line))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_quote_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Quote> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    let mut header: Option<VacationCsvRecord> = None;
    for record in reader.deserialize::<VacationCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if header.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            header = Some(record);
            continue;
        }
        entries.push(record.into_entry()?);
    }

    super::validate_vacations(&entries)?;

    let (mut quote, items) = match header {
        Some(header) => {
            let metadata: QuoteMetadata = parse_json(&header.metadata_json, "metadata")?;
            let client: Client = if header.client_json.trim().is_empty() {
                Client::default()
            } else {
                parse_json(&header.client_json, "client")?
            };
            let settings: QuoteSettings = if header.settings_json.trim().is_empty() {
                QuoteSettings::default()
            } else {
                parse_json(&header.settings_json, "settings")?
            };
            let items: Vec<QuoteItem> = if header.items_json.trim().is_empty() {
                Vec::new()
            } else {
                parse_json(&header.items_json, "items")?
            };
            (Quote::from_parts(metadata, client, settings)?, items)
        }
        None => (Quote::new(), Vec::new()),
    };

    for entry in entries {
        quote.upsert_vacation(entry)?;
    }
    for item in items {
        quote.add_item(item)?;
    }
    tracing::info!(
        path = %path.as_ref().display(),
        vacations = quote.vacations().len(),
        "quote loaded from csv"
    );
    Ok(quote)
}

fn parse_json<T: serde::de::DeserializeOwned>(input: &str, what: &str) -> PersistenceResult<T> {
    serde_json::from_str(input)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid {what} json: {err}")))
}

fn format_hours(hours: f64) -> String {
    format!("{hours:.4}")
}

fn parse_number<T: std::str::FromStr>(input: &str, field: &str) -> PersistenceResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid {field} '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
