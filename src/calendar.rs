use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Swiss cantons, identified by their two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Canton {
    AG,
    AI,
    AR,
    BE,
    BL,
    BS,
    FR,
    GE,
    GL,
    GR,
    JU,
    LU,
    NE,
    NW,
    OW,
    SG,
    SH,
    SO,
    SZ,
    TG,
    TI,
    UR,
    VD,
    VS,
    ZG,
    ZH,
}

impl Canton {
    pub const ALL: [Canton; 26] = [
        Canton::AG,
        Canton::AI,
        Canton::AR,
        Canton::BE,
        Canton::BL,
        Canton::BS,
        Canton::FR,
        Canton::GE,
        Canton::GL,
        Canton::GR,
        Canton::JU,
        Canton::LU,
        Canton::NE,
        Canton::NW,
        Canton::OW,
        Canton::SG,
        Canton::SH,
        Canton::SO,
        Canton::SZ,
        Canton::TG,
        Canton::TI,
        Canton::UR,
        Canton::VD,
        Canton::VS,
        Canton::ZG,
        Canton::ZH,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Canton::AG => "AG",
            Canton::AI => "AI",
            Canton::AR => "AR",
            Canton::BE => "BE",
            Canton::BL => "BL",
            Canton::BS => "BS",
            Canton::FR => "FR",
            Canton::GE => "GE",
            Canton::GL => "GL",
            Canton::GR => "GR",
            Canton::JU => "JU",
            Canton::LU => "LU",
            Canton::NE => "NE",
            Canton::NW => "NW",
            Canton::OW => "OW",
            Canton::SG => "SG",
            Canton::SH => "SH",
            Canton::SO => "SO",
            Canton::SZ => "SZ",
            Canton::TG => "TG",
            Canton::TI => "TI",
            Canton::UR => "UR",
            Canton::VD => "VD",
            Canton::VS => "VS",
            Canton::ZG => "ZG",
            Canton::ZH => "ZH",
        }
    }

    /// Canton codes are matched case-insensitively and ignore surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = normalize_canton_code(code);
        Self::ALL
            .iter()
            .copied()
            .find(|canton| canton.as_str() == normalized)
    }
}

impl fmt::Display for Canton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCanton(pub String);

impl fmt::Display for UnknownCanton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown canton code '{}'", self.0)
    }
}

impl std::error::Error for UnknownCanton {}

impl FromStr for Canton {
    type Err = UnknownCanton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownCanton(s.to_string()))
    }
}

pub fn normalize_canton_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Public holidays observed by at least one canton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicHoliday {
    NewYear,
    Berchtoldstag,
    RepublicNeuchatel,
    StJoseph,
    NaefelserFahrt,
    GoodFriday,
    EasterMonday,
    LabourDay,
    Ascension,
    WhitMonday,
    CorpusChristi,
    JuraIndependence,
    StPeterPaul,
    NationalDay,
    Assumption,
    JeuneGenevois,
    LundiDuJeune,
    AllSaints,
    ImmaculateConception,
    Christmas,
    StStephen,
    Restauration,
}

impl PublicHoliday {
    pub const ALL: [PublicHoliday; 22] = [
        PublicHoliday::NewYear,
        PublicHoliday::Berchtoldstag,
        PublicHoliday::RepublicNeuchatel,
        PublicHoliday::StJoseph,
        PublicHoliday::NaefelserFahrt,
        PublicHoliday::GoodFriday,
        PublicHoliday::EasterMonday,
        PublicHoliday::LabourDay,
        PublicHoliday::Ascension,
        PublicHoliday::WhitMonday,
        PublicHoliday::CorpusChristi,
        PublicHoliday::JuraIndependence,
        PublicHoliday::StPeterPaul,
        PublicHoliday::NationalDay,
        PublicHoliday::Assumption,
        PublicHoliday::JeuneGenevois,
        PublicHoliday::LundiDuJeune,
        PublicHoliday::AllSaints,
        PublicHoliday::ImmaculateConception,
        PublicHoliday::Christmas,
        PublicHoliday::StStephen,
        PublicHoliday::Restauration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PublicHoliday::NewYear => "Nouvel An",
            PublicHoliday::Berchtoldstag => "Saint-Berchtold",
            PublicHoliday::RepublicNeuchatel => "Instauration de la République",
            PublicHoliday::StJoseph => "Saint-Joseph",
            PublicHoliday::NaefelserFahrt => "Näfelser Fahrt",
            PublicHoliday::GoodFriday => "Vendredi saint",
            PublicHoliday::EasterMonday => "Lundi de Pâques",
            PublicHoliday::LabourDay => "Fête du travail",
            PublicHoliday::Ascension => "Ascension",
            PublicHoliday::WhitMonday => "Lundi de Pentecôte",
            PublicHoliday::CorpusChristi => "Fête-Dieu",
            PublicHoliday::JuraIndependence => "Commémoration du plébiscite",
            PublicHoliday::StPeterPaul => "Saints Pierre et Paul",
            PublicHoliday::NationalDay => "Fête nationale",
            PublicHoliday::Assumption => "Assomption",
            PublicHoliday::JeuneGenevois => "Jeûne genevois",
            PublicHoliday::LundiDuJeune => "Lundi du Jeûne fédéral",
            PublicHoliday::AllSaints => "Toussaint",
            PublicHoliday::ImmaculateConception => "Immaculée Conception",
            PublicHoliday::Christmas => "Noël",
            PublicHoliday::StStephen => "Saint-Étienne",
            PublicHoliday::Restauration => "Restauration de la République",
        }
    }

    /// Date of the holiday in `year`, `None` when it cannot be computed
    /// (Easter-relative holidays outside the Gregorian range).
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match self {
            PublicHoliday::NewYear => NaiveDate::from_ymd_opt(year, 1, 1),
            PublicHoliday::Berchtoldstag => NaiveDate::from_ymd_opt(year, 1, 2),
            PublicHoliday::RepublicNeuchatel => NaiveDate::from_ymd_opt(year, 3, 1),
            PublicHoliday::StJoseph => NaiveDate::from_ymd_opt(year, 3, 19),
            PublicHoliday::NaefelserFahrt => naefelser_fahrt(year),
            PublicHoliday::GoodFriday => easter_offset(year, -2),
            PublicHoliday::EasterMonday => easter_offset(year, 1),
            PublicHoliday::LabourDay => NaiveDate::from_ymd_opt(year, 5, 1),
            PublicHoliday::Ascension => easter_offset(year, 39),
            PublicHoliday::WhitMonday => easter_offset(year, 50),
            PublicHoliday::CorpusChristi => easter_offset(year, 60),
            PublicHoliday::JuraIndependence => NaiveDate::from_ymd_opt(year, 6, 23),
            PublicHoliday::StPeterPaul => NaiveDate::from_ymd_opt(year, 6, 29),
            PublicHoliday::NationalDay => NaiveDate::from_ymd_opt(year, 8, 1),
            PublicHoliday::Assumption => NaiveDate::from_ymd_opt(year, 8, 15),
            // Thursday following the first Sunday of September
            PublicHoliday::JeuneGenevois => {
                nth_weekday(year, 9, Weekday::Sun, 1).map(|sunday| sunday + Duration::days(4))
            }
            // Monday following the third Sunday of September (Federal Fast)
            PublicHoliday::LundiDuJeune => {
                nth_weekday(year, 9, Weekday::Sun, 3).map(|sunday| sunday + Duration::days(1))
            }
            PublicHoliday::AllSaints => NaiveDate::from_ymd_opt(year, 11, 1),
            PublicHoliday::ImmaculateConception => NaiveDate::from_ymd_opt(year, 12, 8),
            PublicHoliday::Christmas => NaiveDate::from_ymd_opt(year, 12, 25),
            PublicHoliday::StStephen => NaiveDate::from_ymd_opt(year, 12, 26),
            PublicHoliday::Restauration => NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }

    pub fn observed_in(&self, canton: Canton) -> bool {
        use Canton::*;
        match self {
            PublicHoliday::NewYear
            | PublicHoliday::Ascension
            | PublicHoliday::NationalDay
            | PublicHoliday::Christmas => true,
            PublicHoliday::Berchtoldstag => matches!(
                canton,
                AG | BE | FR | GL | JU | LU | NE | OW | SH | SO | TG | VD | ZG | ZH
            ),
            PublicHoliday::RepublicNeuchatel => canton == NE,
            PublicHoliday::StJoseph => matches!(canton, LU | NW | SZ | TI | UR | VS),
            PublicHoliday::NaefelserFahrt => canton == GL,
            PublicHoliday::GoodFriday => !matches!(canton, TI | VS),
            PublicHoliday::EasterMonday | PublicHoliday::WhitMonday => canton != VS,
            PublicHoliday::LabourDay => matches!(canton, BL | BS | JU | NE | SH | TG | TI | ZH),
            PublicHoliday::CorpusChristi | PublicHoliday::Assumption => matches!(
                canton,
                AG | AI | FR | JU | LU | NW | OW | SO | SZ | TI | UR | VS | ZG
            ),
            PublicHoliday::JuraIndependence => canton == JU,
            PublicHoliday::StPeterPaul => canton == TI,
            PublicHoliday::JeuneGenevois | PublicHoliday::Restauration => canton == GE,
            PublicHoliday::LundiDuJeune => canton == VD,
            PublicHoliday::AllSaints => matches!(
                canton,
                AG | AI | FR | GL | JU | LU | NW | OW | SG | SO | SZ | TI | UR | VS | ZG
            ),
            PublicHoliday::ImmaculateConception => {
                matches!(canton, AG | AI | FR | LU | NW | OW | SZ | TI | UR | VS | ZG)
            }
            PublicHoliday::StStephen => !matches!(canton, JU | VS),
        }
    }
}

/// First Thursday of April, one week later when that is Maundy Thursday or
/// the Thursday after Easter.
fn naefelser_fahrt(year: i32) -> Option<NaiveDate> {
    let first = nth_weekday(year, 4, Weekday::Thu, 1)?;
    let moved = [-3, 4]
        .into_iter()
        .any(|offset| easter_offset(year, offset) == Some(first));
    Some(if moved { first + Duration::days(7) } else { first })
}

fn easter_offset(year: i32, days: i64) -> Option<NaiveDate> {
    bdays::easter::easter_naive_date(year)
        .ok()
        .map(|easter| easter + Duration::days(days))
}

/// Find the nth occurrence of a weekday in a month
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut count = 0;

    while date.month() == month {
        if date.weekday() == weekday {
            count += 1;
            if count == n {
                return Some(date);
            }
        }
        date = date + Duration::days(1);
    }
    None
}

/// Additional holidays keyed by canton code, serialized as
/// `{"GE": ["2025-01-01", ...]}`.
///
/// Codes are free-form two-letter strings; entries for codes that are not
/// Swiss cantons are kept as-is so callers can model their own regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayTable {
    cantons: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl HolidayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in public holidays of every canton for a range of years (inclusive).
    pub fn swiss(start_year: i32, end_year: i32) -> Self {
        let mut table = Self::new();
        for canton in Canton::ALL {
            let dates = swiss_holidays(canton, start_year, end_year);
            table.add_holidays(canton.as_str(), &dates);
        }
        table
    }

    pub fn add_holiday(&mut self, canton: &str, date: NaiveDate) {
        self.cantons
            .entry(normalize_canton_code(canton))
            .or_default()
            .insert(date);
    }

    pub fn add_holidays(&mut self, canton: &str, dates: &[NaiveDate]) {
        self.cantons
            .entry(normalize_canton_code(canton))
            .or_default()
            .extend(dates.iter().copied());
    }

    /// Add the same holiday for multiple years
    /// Example: Dec 24 for 2025-2030
    pub fn add_recurring_holiday(
        &mut self,
        canton: &str,
        month: u32,
        day: u32,
        start_year: i32,
        end_year: i32,
    ) {
        let (start, end) = ordered(start_year, end_year);
        for year in start..=end {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.add_holiday(canton, date);
            }
        }
    }

    pub fn remove_holiday(&mut self, canton: &str, date: NaiveDate) -> bool {
        let code = normalize_canton_code(canton);
        let Some(dates) = self.cantons.get_mut(&code) else {
            return false;
        };
        let removed = dates.remove(&date);
        if dates.is_empty() {
            self.cantons.remove(&code);
        }
        removed
    }

    pub fn holidays(&self, canton: &str) -> Option<&BTreeSet<NaiveDate>> {
        self.cantons.get(&normalize_canton_code(canton))
    }

    pub fn contains(&self, canton: &str, date: NaiveDate) -> bool {
        self.holidays(canton)
            .is_some_and(|dates| dates.contains(&date))
    }

    pub fn cantons(&self) -> impl Iterator<Item = &str> {
        self.cantons.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cantons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cantons.values().map(BTreeSet::len).sum()
    }

    pub fn merge(&mut self, other: &HolidayTable) {
        for (canton, dates) in &other.cantons {
            self.cantons
                .entry(canton.clone())
                .or_default()
                .extend(dates.iter().copied());
        }
    }
}

/// Built-in public holidays observed by `canton` between two years (inclusive).
pub fn swiss_holidays(canton: Canton, start_year: i32, end_year: i32) -> Vec<NaiveDate> {
    let (start, end) = ordered(start_year, end_year);
    let mut dates = BTreeSet::new();
    for year in start..=end {
        for holiday in PublicHoliday::ALL {
            if !holiday.observed_in(canton) {
                continue;
            }
            match holiday.date_in(year) {
                Some(date) => {
                    dates.insert(date);
                }
                None => tracing::warn!(
                    holiday = holiday.name(),
                    year,
                    "unable to compute holiday date"
                ),
            }
        }
    }
    dates.into_iter().collect()
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Holidays applicable to one canton over a bounded year range, resolved from
/// the built-in Swiss calendar and a table of additional dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CantonCalendar {
    canton: String,
    known: bool,
    holidays: BTreeSet<NaiveDate>,
}

impl CantonCalendar {
    pub fn resolve(
        canton: &str,
        include_swiss: bool,
        extra: &HolidayTable,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        let code = normalize_canton_code(canton);
        let builtin = Canton::from_code(&code);
        let mut holidays = BTreeSet::new();
        if include_swiss {
            if let Some(builtin) = builtin {
                holidays.extend(swiss_holidays(builtin, start_year, end_year));
            }
        }
        let mut known = builtin.is_some();
        if let Some(dates) = extra.holidays(&code) {
            known = true;
            holidays.extend(dates.iter().copied());
        }
        Self {
            canton: code,
            known,
            holidays,
        }
    }

    pub fn canton(&self) -> &str {
        &self.canton
    }

    /// `false` when neither the built-in calendar nor the table knows the canton.
    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        self.holidays.range(start..=end).copied().collect()
    }
}
