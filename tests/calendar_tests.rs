use chrono::{Datelike, NaiveDate, Weekday};
use vacation_quote::{
    Canton, CantonCalendar, HolidayTable, PublicHoliday, UnknownCanton, swiss_holidays,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn canton_codes_are_case_insensitive() {
    assert_eq!(Canton::from_code(" ge "), Some(Canton::GE));
    assert_eq!(Canton::from_code("Vd"), Some(Canton::VD));
    assert_eq!(Canton::from_code("XX"), None);
    assert_eq!("zh".parse::<Canton>(), Ok(Canton::ZH));
    assert_eq!(Canton::TI.to_string(), "TI");
    let err = "xx".parse::<Canton>().unwrap_err();
    assert_eq!(err, UnknownCanton("xx".into()));
    assert_eq!(err.to_string(), "unknown canton code 'xx'");
}

#[test]
fn easter_relative_holidays_2025() {
    assert_eq!(PublicHoliday::GoodFriday.date_in(2025), Some(d(2025, 4, 18)));
    assert_eq!(PublicHoliday::EasterMonday.date_in(2025), Some(d(2025, 4, 21)));
    assert_eq!(PublicHoliday::Ascension.date_in(2025), Some(d(2025, 5, 29)));
    assert_eq!(PublicHoliday::WhitMonday.date_in(2025), Some(d(2025, 6, 9)));
}

#[test]
fn september_fast_days_follow_sundays() {
    let jeune = PublicHoliday::JeuneGenevois.date_in(2025).unwrap();
    assert_eq!(jeune, d(2025, 9, 11));
    assert_eq!(jeune.weekday(), Weekday::Thu);

    let lundi = PublicHoliday::LundiDuJeune.date_in(2025).unwrap();
    assert_eq!(lundi, d(2025, 9, 22));
    assert_eq!(lundi.weekday(), Weekday::Mon);
}

#[test]
fn geneva_holidays_2025() {
    let dates = swiss_holidays(Canton::GE, 2025, 2025);
    let expected = vec![
        d(2025, 1, 1),
        d(2025, 4, 18),
        d(2025, 4, 21),
        d(2025, 5, 29),
        d(2025, 6, 9),
        d(2025, 8, 1),
        d(2025, 9, 11),
        d(2025, 12, 25),
        d(2025, 12, 26),
        d(2025, 12, 31),
    ];
    assert_eq!(dates, expected);
}

#[test]
fn cantonal_holidays_differ() {
    let vd = swiss_holidays(Canton::VD, 2025, 2025);
    assert!(vd.contains(&d(2025, 1, 2)));
    assert!(vd.contains(&d(2025, 9, 22)));
    assert!(!vd.contains(&d(2025, 9, 11)));

    let vs = swiss_holidays(Canton::VS, 2025, 2025);
    assert!(vs.contains(&d(2025, 3, 19)));
    assert!(!vs.contains(&d(2025, 4, 18)));
}

#[test]
fn holidays_span_multiple_years() {
    let dates = swiss_holidays(Canton::GE, 2026, 2025);
    assert!(dates.contains(&d(2025, 12, 31)));
    assert!(dates.contains(&d(2026, 1, 1)));
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unknown_canton_has_no_holidays() {
    let calendar = CantonCalendar::resolve("XX", true, &HolidayTable::new(), 2025, 2025);
    assert!(!calendar.is_known());
    assert_eq!(calendar.canton(), "XX");
    assert!(!calendar.is_holiday(d(2025, 8, 1)));
    assert_eq!(calendar.holidays().count(), 0);
}

#[test]
fn table_entries_extend_builtin_calendar() {
    let mut table = HolidayTable::new();
    table.add_holiday("ge", d(2025, 12, 24));
    table.add_holiday("XX", d(2025, 3, 3));

    let geneva = CantonCalendar::resolve("GE", true, &table, 2025, 2025);
    assert!(geneva.is_holiday(d(2025, 12, 24)));
    assert!(geneva.is_holiday(d(2025, 12, 25)));

    let custom = CantonCalendar::resolve("xx", true, &table, 2025, 2025);
    assert!(custom.is_known());
    assert!(custom.is_holiday(d(2025, 3, 3)));
}

#[test]
fn builtin_calendar_can_be_disabled() {
    let mut table = HolidayTable::new();
    table.add_holiday("GE", d(2025, 12, 24));
    let calendar = CantonCalendar::resolve("GE", false, &table, 2025, 2025);
    assert!(calendar.is_known());
    assert!(calendar.is_holiday(d(2025, 12, 24)));
    assert!(!calendar.is_holiday(d(2025, 12, 25)));
}

#[test]
fn holidays_in_range_is_inclusive() {
    let calendar = CantonCalendar::resolve("GE", true, &HolidayTable::new(), 2025, 2025);
    let december = calendar.holidays_in_range(d(2025, 12, 25), d(2025, 12, 31));
    assert_eq!(december, vec![d(2025, 12, 25), d(2025, 12, 26), d(2025, 12, 31)]);
    assert!(
        calendar
            .holidays_in_range(d(2025, 12, 31), d(2025, 12, 1))
            .is_empty()
    );
}

#[test]
fn recurring_and_removed_holidays() {
    let mut table = HolidayTable::new();
    table.add_recurring_holiday("NE", 12, 24, 2025, 2027);
    assert_eq!(table.len(), 3);
    assert!(table.contains("ne", d(2026, 12, 24)));

    assert!(table.remove_holiday("NE", d(2026, 12, 24)));
    assert!(!table.remove_holiday("NE", d(2026, 12, 24)));
    assert_eq!(table.len(), 2);

    table.remove_holiday("NE", d(2025, 12, 24));
    table.remove_holiday("NE", d(2027, 12, 24));
    assert!(table.is_empty());
}

#[test]
fn holiday_table_json_is_keyed_by_canton() {
    let mut table = HolidayTable::new();
    table.add_holidays("GE", &[d(2025, 12, 24), d(2025, 1, 2)]);

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "GE": ["2025-01-02", "2025-12-24"] })
    );

    let parsed: HolidayTable = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, table);
}

#[test]
fn swiss_table_covers_every_canton() {
    let table = HolidayTable::swiss(2025, 2025);
    assert_eq!(table.cantons().count(), Canton::ALL.len());
    for canton in Canton::ALL {
        assert!(table.contains(canton.as_str(), d(2025, 8, 1)));
    }
}

#[test]
fn naefelser_fahrt_skips_easter_thursdays() {
    assert_eq!(PublicHoliday::NaefelserFahrt.date_in(2025), Some(d(2025, 4, 3)));
    // Maundy Thursday
    assert_eq!(PublicHoliday::NaefelserFahrt.date_in(2021), Some(d(2021, 4, 8)));
    // Thursday after Easter
    assert_eq!(PublicHoliday::NaefelserFahrt.date_in(2024), Some(d(2024, 4, 11)));
    assert_eq!(PublicHoliday::NaefelserFahrt.date_in(2027), Some(d(2027, 4, 8)));

    let calendar = CantonCalendar::resolve("GL", true, &HolidayTable::new(), 2027, 2027);
    assert!(calendar.is_holiday(d(2027, 4, 8)));
    assert!(!calendar.is_holiday(d(2027, 4, 1)));
}
