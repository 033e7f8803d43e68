//! Presentation model of a quote, independent of the output format.
//!
//! Binary formats (PDF, DOCX) are produced by external renderers implementing
//! [`DocumentRenderer`]; this crate ships a plain-text renderer for previews.

use crate::calculations::grouping::GroupedVacation;
use crate::quote::{Quote, QuoteError, QuoteTotals};
use std::fmt::{self, Write};

/// Swiss formatting with apostrophe thousands separator: `1'234.50`.
pub fn format_chf(amount: f64) -> String {
    let centimes = (amount * 100.0).round() as i64;
    let negative = centimes < 0;
    let centimes = centimes.unsigned_abs();
    let francs = (centimes / 100).to_string();
    let mut grouped = String::with_capacity(francs.len() + francs.len() / 3);
    for (idx, ch) in francs.chars().enumerate() {
        if idx > 0 && (francs.len() - idx) % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(ch);
    }
    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        centimes % 100
    )
}

/// Hours as `7h30`, rounded to the minute.
pub fn format_hours(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{}h{:02}", minutes / 60, minutes % 60)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub label: String,
    pub detail: Vec<String>,
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDocument {
    pub title: String,
    pub quote_number: String,
    pub issue_date: String,
    pub valid_until: String,
    pub client: Vec<String>,
    pub currency: String,
    pub vacation_rows: Vec<DocumentRow>,
    pub item_rows: Vec<DocumentRow>,
    pub totals: Vec<(String, String)>,
    pub notes: Option<String>,
}

impl QuoteDocument {
    pub fn build(quote: &Quote) -> Result<Self, QuoteError> {
        let metadata = quote.metadata();
        let settings = quote.settings();
        let groups = quote.grouped_vacations()?;
        let totals = quote.totals()?;

        let mut client = Vec::new();
        if !quote.client().is_empty() {
            client.push(quote.client().name.clone());
        }
        client.extend(quote.client().address_lines.iter().cloned());
        client.extend(quote.client().email.iter().cloned());
        client.extend(quote.client().phone.iter().cloned());

        let item_rows = quote
            .items()
            .iter()
            .map(|item| {
                let amounts = quote.item_amounts(item);
                let quantity = match &item.unit {
                    Some(unit) => format!("{} {}", item.quantity, unit),
                    None => item.quantity.to_string(),
                };
                DocumentRow {
                    label: item.description.clone(),
                    detail: Vec::new(),
                    quantity,
                    unit_price: format_chf(item.unit_price_chf),
                    amount: format_chf(amounts.ht),
                }
            })
            .collect();

        Ok(Self {
            title: metadata.title.clone(),
            quote_number: metadata.quote_number.clone(),
            issue_date: metadata.issue_date.format("%d.%m.%Y").to_string(),
            valid_until: metadata
                .valid_until()
                .map(|date| date.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| "-".to_string()),
            client,
            currency: settings.currency.clone(),
            vacation_rows: groups.iter().map(vacation_row).collect(),
            item_rows,
            totals: totals_rows(&totals, settings.vat_pct),
            notes: metadata.notes.clone(),
        })
    }
}

fn vacation_row(group: &GroupedVacation) -> DocumentRow {
    let label = if group.agent_type.is_empty() {
        format!("Agent ({})", group.canton)
    } else {
        format!("{} ({})", group.agent_type, group.canton)
    };

    let mut detail = Vec::new();
    let mut when = group.date_label.clone();
    if let Some(time) = &group.time_label {
        when.push_str(", ");
        when.push_str(time);
    }
    if group.shift_count > 1 {
        when.push_str(&format!(" ({} vacations)", group.shift_count));
    }
    detail.push(when);

    if group.has_markup {
        let mut markups = Vec::new();
        for (name, hours) in [
            ("nuit", group.hours_night),
            ("dimanche", group.hours_sunday),
            ("férié", group.hours_holiday),
        ] {
            if hours > 0.0 {
                markups.push(format!("{name} {}", format_hours(hours)));
            }
        }
        detail.push(format!("dont heures majorées: {}", markups.join(", ")));
    }
    if group.pause_minutes > 0 {
        let paid = if group.pause_paid { "payée" } else { "non payée" };
        detail.push(format!("pause {} min {paid}", group.pause_minutes));
    }
    if group.travel_total_chf > 0.0 {
        detail.push(format!("déplacement {}", format_chf(group.travel_total_chf)));
    }

    DocumentRow {
        label,
        detail,
        quantity: format_hours(group.hours_total),
        unit_price: format_chf(group.rate_chf_h),
        amount: format_chf(group.line_ht),
    }
}

fn totals_rows(totals: &QuoteTotals, vat_pct: f64) -> Vec<(String, String)> {
    vec![
        ("Total HT".to_string(), format_chf(totals.total_ht)),
        (format!("TVA {vat_pct}%"), format_chf(totals.total_tva)),
        ("Total TTC".to_string(), format_chf(totals.total_ttc)),
    ]
}

/// Turns a [`QuoteDocument`] into an output format.
pub trait DocumentRenderer {
    type Output;
    type Error;

    fn render(&self, document: &QuoteDocument) -> Result<Self::Output, Self::Error>;
}

/// Fixed-width plain-text rendering.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { width: 78 }
    }
}

impl TextRenderer {
    fn write_rows(&self, out: &mut String, heading: &str, rows: &[DocumentRow]) -> fmt::Result {
        if rows.is_empty() {
            return Ok(());
        }
        writeln!(out, "{heading}")?;
        let amount_width = 14;
        let label_width = self.width.saturating_sub(amount_width * 2 + 10).max(20);
        for row in rows {
            writeln!(
                out,
                "  {:<label_width$} {:>10} {:>amount_width$} {:>amount_width$}",
                row.label, row.quantity, row.unit_price, row.amount
            )?;
            for line in &row.detail {
                writeln!(out, "    {line}")?;
            }
        }
        writeln!(out)
    }
}

impl DocumentRenderer for TextRenderer {
    type Output = String;
    type Error = fmt::Error;

    fn render(&self, document: &QuoteDocument) -> Result<String, fmt::Error> {
        let rule = "=".repeat(self.width);
        let mut out = String::new();
        writeln!(out, "{rule}")?;
        writeln!(out, "{} - {}", document.title, document.quote_number)?;
        writeln!(
            out,
            "Date: {}    Valable jusqu'au: {}",
            document.issue_date, document.valid_until
        )?;
        writeln!(out, "{rule}")?;
        for line in &document.client {
            writeln!(out, "{line}")?;
        }
        if !document.client.is_empty() {
            writeln!(out)?;
        }

        self.write_rows(&mut out, "Prestations d'agents", &document.vacation_rows)?;
        self.write_rows(&mut out, "Articles", &document.item_rows)?;

        writeln!(out, "{}", "-".repeat(self.width))?;
        for (label, amount) in &document.totals {
            writeln!(
                out,
                "{:>width$} {} {:>14}",
                label,
                document.currency,
                amount,
                width = self.width.saturating_sub(19)
            )?;
        }
        if let Some(notes) = &document.notes {
            writeln!(out)?;
            writeln!(out, "{notes}")?;
        }
        Ok(out)
    }
}
