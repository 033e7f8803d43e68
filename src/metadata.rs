use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteMetadata {
    pub quote_number: String,
    pub title: String,
    pub issue_date: NaiveDate,
    pub validity_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl QuoteMetadata {
    /// `None` when the validity period runs past the supported date range.
    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.issue_date
            .checked_add_days(Days::new(u64::from(self.validity_days)))
    }
}

impl Default for QuoteMetadata {
    fn default() -> Self {
        Self {
            quote_number: "DEV-0001".to_string(),
            title: "Offre de surveillance".to_string(),
            issue_date: Local::now().date_naive(),
            validity_days: 30,
            notes: None,
        }
    }
}

/// Recipient of the quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address_lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}
