use crate::calculations::grouping::{self, GroupedVacation};
use crate::calculations::pricing::{LineAmounts, round_chf};
use crate::calculations::{self, calculate_line};
use crate::item::QuoteItem;
use crate::metadata::{Client, QuoteMetadata};
use crate::settings::{QuoteSettings, SettingsError};
use crate::vacation::{VacationEntry, VacationLine};
use crate::vacation_validation::{self, VacationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub items_ht: f64,
    pub vacations_ht: f64,
    pub total_ht: f64,
    pub total_tva: f64,
    pub total_ttc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub vacation_count: usize,
    pub group_count: usize,
    pub item_count: usize,
    pub hours_total: f64,
    pub hours_majorated: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub totals: QuoteTotals,
}

impl QuoteSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("vacations={}", self.vacation_count));
        parts.push(format!("groups={}", self.group_count));
        if self.item_count > 0 {
            parts.push(format!("items={}", self.item_count));
        }
        parts.push(format!("hours={:.2}", self.hours_total));
        if self.hours_majorated > 0.0 {
            parts.push(format!("majorated={:.2}", self.hours_majorated));
        }
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            parts.push(format!("period={first}..{last}"));
        }
        parts.push(format!("ht={:.2}", self.totals.total_ht));
        parts.push(format!("ttc={:.2}", self.totals.total_ttc));
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
pub enum QuoteError {
    Vacation(VacationError),
    Settings(SettingsError),
    VacationNotFound(u32),
    ItemNotFound(u32),
    InvalidItem(String),
    IdSpaceExhausted(&'static str),
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteError::Vacation(err) => write!(f, "{err}"),
            QuoteError::Settings(err) => write!(f, "invalid settings: {err}"),
            QuoteError::VacationNotFound(id) => write!(f, "vacation {id} not found"),
            QuoteError::ItemNotFound(id) => write!(f, "item {id} not found"),
            QuoteError::InvalidItem(message) => write!(f, "{message}"),
            QuoteError::IdSpaceExhausted(kind) => write!(f, "no {kind} id left to assign"),
        }
    }
}

impl std::error::Error for QuoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuoteError::Vacation(err) => Some(err),
            QuoteError::Settings(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VacationError> for QuoteError {
    fn from(value: VacationError) -> Self {
        Self::Vacation(value)
    }
}

impl From<SettingsError> for QuoteError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

fn next_id(ids: impl Iterator<Item = u32>, kind: &'static str) -> Result<u32, QuoteError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(QuoteError::IdSpaceExhausted(kind))
}

/// In-memory quote: client, catalog items and agent vacations, plus the
/// settings every calculation runs against.
#[derive(Debug, Clone, Default)]
pub struct Quote {
    metadata: QuoteMetadata,
    client: Client,
    settings: QuoteSettings,
    vacations: Vec<VacationEntry>,
    items: Vec<QuoteItem>,
}

impl Quote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_settings(settings: QuoteSettings) -> Result<Self, QuoteError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub(crate) fn from_parts(
        metadata: QuoteMetadata,
        client: Client,
        settings: QuoteSettings,
    ) -> Result<Self, QuoteError> {
        settings.validate()?;
        Ok(Self {
            metadata,
            client,
            settings,
            vacations: Vec::new(),
            items: Vec::new(),
        })
    }

    pub fn metadata(&self) -> &QuoteMetadata {
        &self.metadata
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn settings(&self) -> &QuoteSettings {
        &self.settings
    }

    pub fn vacations(&self) -> &[VacationEntry] {
        &self.vacations
    }

    pub fn items(&self) -> &[QuoteItem] {
        &self.items
    }

    pub fn set_metadata(&mut self, metadata: QuoteMetadata) {
        self.metadata = metadata;
    }

    pub fn set_client(&mut self, client: Client) {
        tracing::info!(client = %client.name, "client updated");
        self.client = client;
    }

    pub fn set_settings(&mut self, settings: QuoteSettings) -> Result<(), QuoteError> {
        settings.validate()?;
        calculations::calculate_lines(&self.vacations, &settings)?;
        self.settings = settings;
        tracing::info!("quote settings updated");
        Ok(())
    }

    /// Apply a change to a copy of the settings and keep it only if valid.
    pub fn update_settings_with<F>(&mut self, mutator: F) -> Result<(), QuoteError>
    where
        F: FnOnce(&mut QuoteSettings),
    {
        let mut settings = self.settings.clone();
        mutator(&mut settings);
        self.set_settings(settings)
    }

    pub fn suggested_rate(&self, agent_type: &str) -> Option<f64> {
        self.settings.suggested_rate(agent_type)
    }

    pub fn next_vacation_id(&self) -> Result<u32, QuoteError> {
        next_id(self.vacations.iter().map(|v| v.id), "vacation")
    }

    pub fn next_item_id(&self) -> Result<u32, QuoteError> {
        next_id(self.items.iter().map(|i| i.id), "item")
    }

    /// Insert a vacation under a fresh id and return that id.
    pub fn add_vacation(&mut self, mut entry: VacationEntry) -> Result<u32, QuoteError> {
        entry.id = self.next_vacation_id()?;
        entry.canton = entry.canton_code();
        vacation_validation::validate_vacation(&entry)?;
        let id = entry.id;
        tracing::info!(
            vacation = id,
            start = %entry.start(),
            end = %entry.end(),
            canton = %entry.canton,
            "vacation added"
        );
        self.vacations.push(entry);
        Ok(id)
    }

    /// Replace the vacation with the same id, or insert it. An id of zero
    /// behaves like `add_vacation`.
    pub fn upsert_vacation(&mut self, mut entry: VacationEntry) -> Result<u32, QuoteError> {
        if entry.id == 0 {
            return self.add_vacation(entry);
        }
        entry.canton = entry.canton_code();
        vacation_validation::validate_vacation(&entry)?;
        let id = entry.id;
        match self.vacations.iter_mut().find(|v| v.id == id) {
            Some(existing) => {
                *existing = entry;
                tracing::info!(vacation = id, "vacation updated");
            }
            None => {
                self.vacations.push(entry);
                tracing::info!(vacation = id, "vacation inserted");
            }
        }
        Ok(id)
    }

    pub fn find_vacation(&self, id: u32) -> Option<&VacationEntry> {
        self.vacations.iter().find(|v| v.id == id)
    }

    pub fn delete_vacation(&mut self, id: u32) -> bool {
        let before = self.vacations.len();
        self.vacations.retain(|v| v.id != id);
        let removed = self.vacations.len() != before;
        if removed {
            tracing::info!(vacation = id, "vacation deleted");
        }
        removed
    }

    /// Apply a change to a copy of a stored vacation and keep it only if valid.
    pub fn update_vacation_with<F>(&mut self, id: u32, mutator: F) -> Result<(), QuoteError>
    where
        F: FnOnce(&mut VacationEntry),
    {
        let mut entry = self
            .find_vacation(id)
            .cloned()
            .ok_or(QuoteError::VacationNotFound(id))?;
        mutator(&mut entry);
        entry.id = id;
        self.upsert_vacation(entry).map(|_| ())
    }

    pub fn vacation_line(&self, id: u32) -> Result<VacationLine, QuoteError> {
        let entry = self
            .find_vacation(id)
            .ok_or(QuoteError::VacationNotFound(id))?;
        Ok(calculate_line(entry, &self.settings)?)
    }

    pub fn vacation_lines(&self) -> Result<Vec<VacationLine>, QuoteError> {
        Ok(calculations::calculate_lines(
            &self.vacations,
            &self.settings,
        )?)
    }

    pub fn grouped_vacations(&self) -> Result<Vec<GroupedVacation>, QuoteError> {
        let lines = self.vacation_lines()?;
        Ok(grouping::group_vacations(&lines))
    }

    pub fn add_item(&mut self, mut item: QuoteItem) -> Result<u32, QuoteError> {
        if item.id == 0 || self.items.iter().any(|i| i.id == item.id) {
            item.id = self.next_item_id()?;
        }
        item.validate().map_err(QuoteError::InvalidItem)?;
        let id = item.id;
        tracing::info!(item = id, description = %item.description, "item added");
        self.items.push(item);
        Ok(id)
    }

    pub fn delete_item(&mut self, id: u32) -> Result<(), QuoteError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Err(QuoteError::ItemNotFound(id));
        }
        tracing::info!(item = id, "item deleted");
        Ok(())
    }

    pub fn item_amounts(&self, item: &QuoteItem) -> LineAmounts {
        item.amounts(self.settings.vat_pct)
    }

    pub fn totals(&self) -> Result<QuoteTotals, QuoteError> {
        let lines = self.vacation_lines()?;
        Ok(self.totals_for(&lines))
    }

    fn totals_for(&self, lines: &[VacationLine]) -> QuoteTotals {
        let mut items = LineAmounts::default();
        for item in &self.items {
            items.add(&self.item_amounts(item));
        }
        let mut vacations = LineAmounts::default();
        for line in lines {
            vacations.add(&LineAmounts {
                ht: line.breakdown.line_ht,
                tva: line.breakdown.line_tva,
                ttc: line.breakdown.line_ttc,
            });
        }
        let total_ht = round_chf(items.ht + vacations.ht);
        let total_tva = round_chf(items.tva + vacations.tva);
        QuoteTotals {
            items_ht: items.ht,
            vacations_ht: vacations.ht,
            total_ht,
            total_tva,
            total_ttc: round_chf(total_ht + total_tva),
        }
    }

    /// Recompute every derived figure of the quote.
    pub fn refresh(&self) -> Result<QuoteSummary, QuoteError> {
        let lines = self.vacation_lines()?;
        let groups = grouping::group_vacations(&lines);
        let totals = self.totals_for(&lines);

        let hours_total = lines.iter().map(|l| l.breakdown.hours_total).sum();
        let hours_majorated = lines.iter().map(|l| l.breakdown.majorated_hours()).sum();
        let first_date = self.vacations.iter().map(|v| v.date_start).min();
        let last_date = self.vacations.iter().map(|v| v.date_end).max();

        let summary = QuoteSummary {
            vacation_count: lines.len(),
            group_count: groups.len(),
            item_count: self.items.len(),
            hours_total,
            hours_majorated,
            first_date,
            last_date,
            totals,
        };
        tracing::debug!(summary = %summary.to_cli_summary(), "quote refreshed");
        Ok(summary)
    }
}
