use crate::calculations::pricing::LineAmounts;
use serde::{Deserialize, Serialize};

/// A catalog line on the quote (equipment, setup fee, ...), priced independently of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    /// Identifier within the quote, assigned on insert when zero.
    #[serde(default)]
    pub id: u32,
    pub description: String,
    /// Quantity of units. Must be non-negative.
    pub quantity: f64,
    /// Price per unit before tax. Must be non-negative.
    pub unit_price_chf: f64,
    /// Optional unit label ("pce", "forfait", "h").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl QuoteItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price_chf: f64) -> Self {
        Self {
            id: 0,
            description: description.into(),
            quantity,
            unit_price_chf,
            unit: None,
        }
    }

    pub fn amounts(&self, vat_pct: f64) -> LineAmounts {
        LineAmounts::from_ht(self.quantity * self.unit_price_chf, vat_pct)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err(format!("item {} requires a description", self.id));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(format!(
                "item {} has invalid quantity {}",
                self.id, self.quantity
            ));
        }
        if !self.unit_price_chf.is_finite() || self.unit_price_chf < 0.0 {
            return Err(format!(
                "item {} has invalid unit price {}",
                self.id, self.unit_price_chf
            ));
        }
        Ok(())
    }
}
