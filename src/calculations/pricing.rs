use crate::calculations::hours::HourBuckets;
use crate::settings::QuoteSettings;
use serde::{Deserialize, Serialize};

/// Round to the centime.
pub fn round_chf(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn to_centimes(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub ht: f64,
    pub tva: f64,
    pub ttc: f64,
}

impl LineAmounts {
    /// Apply `vat_pct` to an HT amount. TTC is always HT + TVA.
    pub fn from_ht(ht: f64, vat_pct: f64) -> Self {
        let ht = round_chf(ht);
        let tva = round_chf(ht * vat_pct / 100.0);
        Self {
            ht,
            tva,
            ttc: round_chf(ht + tva),
        }
    }

    pub fn add(&mut self, other: &LineAmounts) {
        self.ht = round_chf(self.ht + other.ht);
        self.tva = round_chf(self.tva + other.tva);
        self.ttc = round_chf(self.ttc + other.ttc);
    }
}

pub struct Pricing<'a> {
    settings: &'a QuoteSettings,
}

impl<'a> Pricing<'a> {
    pub fn new(settings: &'a QuoteSettings) -> Self {
        Self { settings }
    }

    fn multiplier(markup_pct: f64) -> f64 {
        1.0 + markup_pct / 100.0
    }

    /// Hours weighted by their markup, i.e. the number of base-rate hours billed.
    pub fn weighted_hours(&self, hours: &HourBuckets) -> f64 {
        hours.normal
            + hours.night * Self::multiplier(self.settings.night_markup_pct)
            + hours.sunday * Self::multiplier(self.settings.sunday_markup_pct)
            + hours.holiday * Self::multiplier(self.settings.holiday_markup_pct)
    }

    /// Markup portion only, in currency.
    pub fn markup_amount(&self, rate: f64, hours: &HourBuckets) -> f64 {
        round_chf(rate * (self.weighted_hours(hours) - hours.total()))
    }

    pub fn execute(&self, rate: f64, hours: &HourBuckets, travel: f64) -> LineAmounts {
        let ht = rate * self.weighted_hours(hours) + travel;
        LineAmounts::from_ht(ht, self.settings.vat_pct)
    }
}
