pub mod calculations;
pub mod calendar;
pub mod config;
pub mod document;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod item;
pub mod metadata;
pub mod persistence;
pub mod quote;
pub mod serde_time;
pub mod settings;
pub mod telemetry;
pub mod vacation;
pub mod vacation_validation;

pub use calculations::grouping::{GroupedVacation, group_vacations};
pub use calculations::hours::{Bucket, HourBuckets, HourSplitter};
pub use calculations::pricing::{LineAmounts, Pricing, round_chf};
pub use calculations::{calculate_line, calculate_lines, calculate_vacation};
pub use calendar::{
    Canton, CantonCalendar, HolidayTable, PublicHoliday, UnknownCanton, swiss_holidays,
};
pub use config::{AppConfig, ConfigError};
pub use document::{DocumentRenderer, QuoteDocument, TextRenderer, format_chf, format_hours};
pub use item::QuoteItem;
pub use metadata::{Client, QuoteMetadata};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteQuoteStore;
pub use persistence::{
    PersistenceError, QuoteStore, export_vacation_lines_to_csv, load_quote_from_csv,
    load_quote_from_json, load_settings_from_json, save_quote_to_csv, save_quote_to_json,
    save_settings_to_json,
};
pub use quote::{Quote, QuoteError, QuoteSummary, QuoteTotals};
pub use settings::{HolidayPrecedence, NightWindow, PauseAllocation, QuoteSettings, SettingsError};
pub use vacation::{VacationBreakdown, VacationEntry, VacationLine};
pub use vacation_validation::{VacationError, validate_vacation, validate_vacation_collection};
