use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use vacation_quote::{
    Client, DocumentRenderer, Quote, QuoteDocument, QuoteItem, QuoteMetadata, TextRenderer,
    VacationEntry, format_chf, format_hours,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
    )
}

#[test]
fn chf_amounts_use_apostrophe_grouping() {
    assert_eq!(format_chf(0.0), "0.00");
    assert_eq!(format_chf(12.5), "12.50");
    assert_eq!(format_chf(1234.5), "1'234.50");
    assert_eq!(format_chf(1_234_567.891), "1'234'567.89");
    assert_eq!(format_chf(-999.999), "-1'000.00");
}

#[test]
fn hours_render_as_hours_and_minutes() {
    assert_eq!(format_hours(7.5), "7h30");
    assert_eq!(format_hours(0.25), "0h15");
    assert_eq!(format_hours(24.0), "24h00");
}

fn sample_quote() -> Quote {
    let mut quote = Quote::new();
    quote.set_metadata(QuoteMetadata {
        quote_number: "DEV-2025-042".into(),
        title: "Surveillance salon".into(),
        issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        validity_days: 30,
        notes: Some("Conditions générales applicables.".into()),
    });
    let mut client = Client::new("Palexpo SA");
    client.address_lines.push("Route François-Peyrot 30".into());
    quote.set_client(client);
    for day in 10..=12 {
        quote
            .add_vacation(
                VacationEntry::new(0, at(2025, 3, day, 8), at(2025, 3, day, 16), 40.0, "GE")
                    .with_agent_type("agent de sécurité"),
            )
            .unwrap();
    }
    quote
        .add_vacation(
            VacationEntry::new(0, at(2025, 3, 13, 22), at(2025, 3, 14, 6), 40.0, "GE")
                .with_agent_type("agent de sécurité")
                .with_pause(30, false),
        )
        .unwrap();
    quote.add_item(QuoteItem::new("Radio", 2.0, 25.0)).unwrap();
    quote
}

#[test]
fn document_rows_follow_groups() {
    let document = QuoteDocument::build(&sample_quote()).unwrap();
    assert_eq!(document.quote_number, "DEV-2025-042");
    assert_eq!(document.issue_date, "01.03.2025");
    assert_eq!(document.valid_until, "31.03.2025");
    assert_eq!(document.client[0], "Palexpo SA");
    assert_eq!(document.vacation_rows.len(), 2);
    assert_eq!(document.item_rows.len(), 1);

    let grouped = &document.vacation_rows[0];
    assert_eq!(grouped.label, "agent de sécurité (GE)");
    assert_eq!(grouped.quantity, "24h00");
    assert!(grouped.detail[0].starts_with("du 10.03.2025 au 12.03.2025"));

    let night = &document.vacation_rows[1];
    assert!(night.detail.iter().any(|line| line.contains("nuit")));
    assert!(night.detail.iter().any(|line| line.contains("pause 30 min")));

    let labels: Vec<&str> = document.totals.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["Total HT", "TVA 8.1%", "Total TTC"]);
}

#[test]
fn text_renderer_prints_every_section() {
    let document = QuoteDocument::build(&sample_quote()).unwrap();
    let text = TextRenderer::default().render(&document).unwrap();
    assert!(text.contains("Surveillance salon - DEV-2025-042"));
    assert!(text.contains("Palexpo SA"));
    assert!(text.contains("Prestations d'agents"));
    assert!(text.contains("Articles"));
    assert!(text.contains("Total TTC"));
    assert!(text.contains("Conditions générales applicables."));
}

#[test]
fn empty_quote_renders_totals_only() {
    let document = QuoteDocument::build(&Quote::new()).unwrap();
    let text = TextRenderer { width: 60 }.render(&document).unwrap();
    assert!(!text.contains("Prestations d'agents"));
    assert!(text.contains("Total HT"));
}

#[test]
fn validity_past_date_range_renders_placeholder() {
    let mut quote = sample_quote();
    let mut metadata = quote.metadata().clone();
    metadata.validity_days = u32::MAX;
    assert_eq!(metadata.valid_until(), None);
    quote.set_metadata(metadata);

    let document = QuoteDocument::build(&quote).unwrap();
    assert_eq!(document.valid_until, "-");
    let text = TextRenderer { width: 60 }.render(&document).unwrap();
    assert!(text.contains("Palexpo SA"));
}
