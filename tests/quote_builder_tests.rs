use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use vacation_quote::{
    Client, HolidayPrecedence, PauseAllocation, Quote, QuoteError, QuoteItem, QuoteSettings,
    SettingsError, VacationEntry,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
    )
}

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn sample_quote() -> Quote {
    let mut quote = Quote::new();
    quote.set_client(Client::new("Banque Privée SA"));
    quote
        .add_vacation(VacationEntry::new(0, at(2025, 3, 10, 8), at(2025, 3, 10, 16), 40.0, "GE"))
        .unwrap();
    quote
        .add_vacation(VacationEntry::new(0, at(2025, 3, 10, 22), at(2025, 3, 11, 7), 40.0, "GE"))
        .unwrap();
    quote
}

#[test]
fn refresh_summarizes_vacations_and_items() {
    let mut quote = sample_quote();
    quote.add_item(QuoteItem::new("Radio", 2.0, 50.0)).unwrap();

    let summary = quote.refresh().unwrap();
    assert_eq!(summary.vacation_count, 2);
    assert_eq!(summary.group_count, 2);
    assert_eq!(summary.item_count, 1);
    approx(summary.hours_total, 17.0);
    approx(summary.hours_majorated, 7.0);
    assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2025, 3, 10));
    assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2025, 3, 11));

    // 320.00 + 430.00 for vacations, 100.00 for items
    let totals = summary.totals;
    approx(totals.vacations_ht, 750.0);
    approx(totals.items_ht, 100.0);
    approx(totals.total_ht, 850.0);
    approx(totals.total_tva, 68.85);
    approx(totals.total_ttc, 918.85);

    let text = summary.to_cli_summary();
    assert!(text.contains("vacations=2"));
    assert!(text.contains("ht=850.00"));
}

#[test]
fn totals_match_sum_of_lines() {
    let quote = sample_quote();
    let lines = quote.vacation_lines().unwrap();
    let totals = quote.totals().unwrap();
    let ht: f64 = lines.iter().map(|l| l.breakdown.line_ht).sum();
    let tva: f64 = lines.iter().map(|l| l.breakdown.line_tva).sum();
    approx(totals.total_ht, ht);
    approx(totals.total_tva, (tva * 100.0).round() / 100.0);
}

#[test]
fn settings_changes_recompute_lines() {
    let mut quote = sample_quote();
    let before = quote.vacation_line(2).unwrap().breakdown.line_ht;
    quote
        .update_settings_with(|settings| settings.night_markup_pct = 50.0)
        .unwrap();
    let after = quote.vacation_line(2).unwrap().breakdown.line_ht;
    approx(before, 430.0);
    approx(after, 500.0);
}

#[test]
fn invalid_settings_are_rejected() {
    let mut quote = sample_quote();
    let err = quote
        .update_settings_with(|settings| settings.vat_pct = 150.0)
        .unwrap_err();
    assert!(matches!(
        err,
        QuoteError::Settings(SettingsError::InvalidVat(_))
    ));
    approx(quote.settings().vat_pct, 8.1);

    let mut negative = QuoteSettings::default();
    negative.sunday_markup_pct = -10.0;
    assert!(Quote::new_with_settings(negative).is_err());
}

#[test]
fn upsert_replaces_existing_vacation() {
    let mut quote = sample_quote();
    let replacement =
        VacationEntry::new(1, at(2025, 3, 12, 8), at(2025, 3, 12, 12), 45.0, "VD");
    assert_eq!(quote.upsert_vacation(replacement).unwrap(), 1);
    assert_eq!(quote.vacations().len(), 2);
    let stored = quote.find_vacation(1).unwrap();
    assert_eq!(stored.canton, "VD");
    assert_eq!(stored.rate_chf_h, 45.0);

    assert_eq!(
        quote
            .upsert_vacation(VacationEntry::new(
                10,
                at(2025, 3, 13, 8),
                at(2025, 3, 13, 12),
                45.0,
                "VD"
            ))
            .unwrap(),
        10
    );
    assert_eq!(quote.next_vacation_id().unwrap(), 11);
}

#[test]
fn update_vacation_with_keeps_invalid_changes_out() {
    let mut quote = sample_quote();
    let err = quote
        .update_vacation_with(1, |entry| entry.pause_minutes = 1_000)
        .unwrap_err();
    assert!(matches!(err, QuoteError::Vacation(_)));
    assert_eq!(quote.find_vacation(1).unwrap().pause_minutes, 0);

    quote
        .update_vacation_with(1, |entry| entry.pause_minutes = 30)
        .unwrap();
    approx(quote.vacation_line(1).unwrap().breakdown.hours_total, 7.5);
}

#[test]
fn delete_vacation_reports_presence() {
    let mut quote = sample_quote();
    assert!(quote.delete_vacation(1));
    assert!(!quote.delete_vacation(1));
    assert!(matches!(
        quote.vacation_line(1),
        Err(QuoteError::VacationNotFound(1))
    ));
}

#[test]
fn items_are_validated_and_renumbered() {
    let mut quote = Quote::new();
    let first = quote.add_item(QuoteItem::new("Badge", 1.0, 10.0)).unwrap();
    let mut duplicate = QuoteItem::new("Gilet", 3.0, 20.0);
    duplicate.id = first;
    let second = quote.add_item(duplicate).unwrap();
    assert_eq!((first, second), (1, 2));

    let err = quote.add_item(QuoteItem::new("", 1.0, 1.0)).unwrap_err();
    assert!(matches!(err, QuoteError::InvalidItem(_)));

    quote.delete_item(1).unwrap();
    assert!(matches!(
        quote.delete_item(1),
        Err(QuoteError::ItemNotFound(1))
    ));
    assert_eq!(quote.items().len(), 1);
}

#[test]
fn suggested_rates_are_case_insensitive() {
    let mut quote = Quote::new();
    assert_eq!(quote.suggested_rate("Agent de Sécurité"), Some(45.0));
    assert_eq!(quote.suggested_rate("pilote"), None);

    quote
        .update_settings_with(|settings| settings.set_agent_rate("pilote", 80.0))
        .unwrap();
    assert_eq!(quote.suggested_rate("PILOTE"), Some(80.0));
}

#[test]
fn empty_quote_has_zero_totals() {
    let summary = Quote::new().refresh().unwrap();
    assert_eq!(summary.vacation_count, 0);
    assert_eq!(summary.first_date, None);
    approx(summary.totals.total_ttc, 0.0);
}

#[test]
fn ids_are_not_assigned_past_u32_max() {
    let mut quote = Quote::new();
    let mut last = QuoteItem::new("Badge", 1.0, 10.0);
    last.id = u32::MAX;
    assert_eq!(quote.add_item(last).unwrap(), u32::MAX);
    assert!(matches!(
        quote.add_item(QuoteItem::new("Gilet", 1.0, 20.0)),
        Err(QuoteError::IdSpaceExhausted("item"))
    ));
    assert_eq!(quote.items().len(), 1);

    quote
        .upsert_vacation(VacationEntry::new(
            u32::MAX,
            at(2025, 3, 10, 8),
            at(2025, 3, 10, 16),
            40.0,
            "GE",
        ))
        .unwrap();
    let err = quote
        .add_vacation(VacationEntry::new(0, at(2025, 3, 11, 8), at(2025, 3, 11, 16), 40.0, "GE"))
        .unwrap_err();
    assert!(matches!(err, QuoteError::IdSpaceExhausted("vacation")));
    assert_eq!(err.to_string(), "no vacation id left to assign");
    assert_eq!(quote.vacations().len(), 1);
}

#[test]
fn unknown_policy_names_report_the_offending_value() {
    assert_eq!(
        "Proportional".parse::<PauseAllocation>(),
        Ok(PauseAllocation::Proportional)
    );
    let err = "evenly".parse::<PauseAllocation>().unwrap_err();
    assert_eq!(
        err,
        SettingsError::UnknownOption {
            field: "pause_allocation",
            value: "evenly".into()
        }
    );
    assert_eq!(err.to_string(), "unknown pause_allocation 'evenly'");

    let err = "night".parse::<HolidayPrecedence>().unwrap_err();
    assert_eq!(err.to_string(), "unknown holiday_precedence 'night'");
}
