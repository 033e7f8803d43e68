use chrono::NaiveDate;
use std::io::{self, Write};
use std::str::FromStr;
use vacation_quote::{
    Client, DocumentRenderer, HolidayPrecedence, PauseAllocation, Quote, QuoteDocument, QuoteItem,
    TextRenderer, VacationEntry, export_vacation_lines_to_csv, format_chf, load_quote_from_csv,
    load_quote_from_json, load_settings_from_json, save_quote_to_csv, save_quote_to_json,
    save_settings_to_json, serde_time, telemetry,
};

fn render_vacations_as_text_table(quote: &Quote) -> String {
    let lines = match quote.vacation_lines() {
        Ok(lines) => lines,
        Err(e) => return format!("Calculation error: {e}"),
    };
    if lines.is_empty() {
        return "(no vacations)".to_string();
    }

    let header = [
        "id", "start", "end", "canton", "agent", "rate", "pause", "normal", "night", "sunday",
        "holiday", "total", "ht",
    ];
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| {
            let entry = &line.entry;
            let b = &line.breakdown;
            let pause = match (entry.pause_minutes, entry.pause_paid) {
                (0, _) => String::new(),
                (minutes, true) => format!("{minutes}p"),
                (minutes, false) => minutes.to_string(),
            };
            vec![
                entry.id.to_string(),
                entry.start().format("%Y-%m-%d %H:%M").to_string(),
                entry.end().format("%Y-%m-%d %H:%M").to_string(),
                entry.canton.clone(),
                entry.agent_type.clone(),
                format!("{:.2}", entry.rate_chf_h),
                pause,
                format!("{:.2}", b.hours_normal),
                format!("{:.2}", b.hours_night),
                format!("{:.2}", b.hours_sunday),
                format!("{:.2}", b.hours_holiday),
                format!("{:.2}", b.hours_total),
                format!("{:.2}", b.line_ht),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(ci, h)| format!("{:<width$}", h, width = widths[ci]))
        .collect();
    out.push_str(&header_line.join(" | "));
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&sep.join("-+-"));
    for row in rows {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(ci, cell)| format!("{:<width$}", cell, width = widths[ci]))
            .collect();
        out.push_str(&cells.join(" | "));
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show vacations with computed hours\n  add <date> <HH:MM> <date> <HH:MM> <rate> <canton> [agent_type...]\n                                     Add a vacation (dates YYYY-MM-DD)\n  delete <id>                        Delete a vacation\n  pause  <id> <minutes> <paid|unpaid> Set the pause of a vacation\n  travel <id> <chf>                  Set the travel fee of a vacation\n  rate   <id> <chf>                  Set the hourly rate of a vacation\n  agent  <id> <text...>              Set the agent type of a vacation\n  grouped                            Show vacations grouped for the quote\n  item list                          List catalog items\n  item add <qty> <unit_price> <description...>\n                                     Add a catalog item\n  item delete <id>                   Delete a catalog item\n  client show                        Show the client\n  client name <text...>              Set client name\n  client address <text...>           Append a client address line\n  meta show                          Show quote metadata\n  meta number <text>                 Set quote number\n  meta title <text...>               Set quote title\n  meta notes <text...>               Set closing notes\n  settings show                      Show calculation settings\n  settings night <HH:MM> <HH:MM>     Set the night window\n  settings markup <night|sunday|holiday> <pct>\n                                     Set a markup percentage\n  settings vat <pct>                 Set the VAT rate\n  settings pause <normal_first|proportional>\n                                     Set how unpaid pauses are deducted\n  settings precedence <holiday_first|sunday_first>\n                                     Set the markup for holidays on Sundays\n  settings holiday <add|remove> <canton> <YYYY-MM-DD>\n                                     Edit additional holidays\n  settings rate <agent_type...>      Show the suggested rate of an agent type\n  settings load <json_path>          Load settings from JSON file\n  settings save <json_path>          Save settings to JSON file\n  save <json|csv> <path>             Persist quote to disk\n  load <json|csv> <path>             Load quote from disk\n  export <path>                      Export computed vacation lines to CSV\n  preview                            Render the quote as text\n  compute                            Recompute totals\n  quit|exit                          Exit"
    );
}

fn print_client(quote: &Quote) {
    let client = quote.client();
    println!("Client name        : {}", client.name);
    for line in &client.address_lines {
        println!("Address            : {}", line);
    }
}

fn print_metadata(quote: &Quote) {
    let metadata = quote.metadata();
    println!("Quote number       : {}", metadata.quote_number);
    println!("Title              : {}", metadata.title);
    println!("Issue date         : {}", metadata.issue_date);
    match metadata.valid_until() {
        Some(date) => println!("Valid until        : {}", date),
        None => println!("Valid until        : -"),
    }
    if let Some(notes) = &metadata.notes {
        println!("Notes              : {}", notes);
    }
}

fn print_settings(quote: &Quote) {
    let settings = quote.settings();
    println!(
        "Night window       : {} - {}",
        serde_time::format(settings.night_window.start),
        serde_time::format(settings.night_window.end)
    );
    println!("Night markup       : {}%", settings.night_markup_pct);
    println!("Sunday markup      : {}%", settings.sunday_markup_pct);
    println!("Holiday markup     : {}%", settings.holiday_markup_pct);
    println!("VAT                : {}%", settings.vat_pct);
    println!("Pause allocation   : {}", settings.pause_allocation.as_str());
    println!("Holiday precedence : {}", settings.holiday_precedence.as_str());
    println!("Swiss holidays     : {}", settings.swiss_holidays);
    let extra = settings
        .holidays
        .cantons()
        .map(|canton| {
            let count = settings.holidays.holidays(canton).map_or(0, |d| d.len());
            format!("{canton}({count})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    println!("Extra holidays     : {}", extra);
}

fn print_groups(quote: &Quote) {
    match quote.grouped_vacations() {
        Ok(groups) if groups.is_empty() => println!("(no vacations)"),
        Ok(groups) => {
            for group in groups {
                let time = group
                    .time_label
                    .as_deref()
                    .map(|t| format!(" {t}"))
                    .unwrap_or_default();
                println!(
                    "{} | {}{} | {} x {} | {:.2}h | HT {}",
                    group.canton,
                    group.date_label,
                    time,
                    group.shift_count,
                    if group.agent_type.is_empty() {
                        "agent"
                    } else {
                        group.agent_type.as_str()
                    },
                    group.hours_total,
                    format_chf(group.line_ht)
                );
            }
        }
        Err(e) => println!("Calculation error: {}", e),
    }
}

fn print_items(quote: &Quote) {
    if quote.items().is_empty() {
        println!("(no items)");
        return;
    }
    for item in quote.items() {
        let amounts = quote.item_amounts(item);
        println!(
            "{} | {} | {} x {} | HT {}",
            item.id,
            item.description,
            item.quantity,
            format_chf(item.unit_price_chf),
            format_chf(amounts.ht)
        );
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    if let Err(e) = telemetry::init("warn") {
        eprintln!("Logging disabled: {}", e);
    }

    let mut quote = Quote::new();

    println!("Vacation Quote (CLI) - type 'help' for commands\n");
    println!("{}", render_vacations_as_text_table(&quote));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => {
                println!("{}", render_vacations_as_text_table(&quote));
            }
            "add" => {
                let args: Vec<&str> = parts.by_ref().take(6).collect();
                let agent_type = parts.collect::<Vec<_>>().join(" ");
                let &[date_start, time_start, date_end, time_end, rate_s, canton] = args.as_slice()
                else {
                    println!(
                        "Usage: add <YYYY-MM-DD> <HH:MM> <YYYY-MM-DD> <HH:MM> <rate> <canton> [agent_type...]"
                    );
                    continue;
                };
                let rate: f64 = match rate_s.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        println!("Invalid rate");
                        continue;
                    }
                };
                let entry = match VacationEntry::parse(
                    0, date_start, time_start, date_end, time_end, rate, canton,
                ) {
                    Ok(entry) => entry.with_agent_type(agent_type),
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match quote.add_vacation(entry) {
                    Ok(id) => {
                        println!("Added vacation id={}", id);
                        println!("{}", render_vacations_as_text_table(&quote));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parts.next() {
                Some(id_s) => match id_s.parse::<u32>() {
                    Ok(id) => {
                        if quote.delete_vacation(id) {
                            println!("Deleted vacation {id}.");
                            println!("{}", render_vacations_as_text_table(&quote));
                        } else {
                            println!("Vacation {id} not found.");
                        }
                    }
                    Err(_) => println!("Invalid id"),
                },
                None => println!("Usage: delete <id>"),
            },
            "pause" => {
                let id_s = parts.next();
                let minutes_s = parts.next();
                let paid_s = parts.next();
                match (id_s, minutes_s, paid_s) {
                    (Some(id_s), Some(minutes_s), Some(paid_s)) => {
                        let id: u32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let minutes: u32 = match minutes_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid minutes");
                                continue;
                            }
                        };
                        let paid = match paid_s.to_ascii_lowercase().as_str() {
                            "paid" => true,
                            "unpaid" => false,
                            _ => {
                                println!("Invalid pause kind (paid|unpaid)");
                                continue;
                            }
                        };
                        match quote.update_vacation_with(id, |entry| {
                            entry.pause_minutes = minutes;
                            entry.pause_paid = paid;
                        }) {
                            Ok(_) => println!(
                                "pause set.\n{}",
                                render_vacations_as_text_table(&quote)
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: pause <id> <minutes> <paid|unpaid>"),
                }
            }
            "travel" | "rate" => {
                let id_s = parts.next();
                let val_s = parts.next();
                match (id_s, val_s) {
                    (Some(id_s), Some(val_s)) => {
                        let id: u32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let val: f64 = match val_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid amount");
                                continue;
                            }
                        };
                        let res = quote.update_vacation_with(id, |entry| {
                            if cmd == "travel" {
                                entry.travel_chf = val;
                            } else {
                                entry.rate_chf_h = val;
                            }
                        });
                        match res {
                            Ok(_) => println!(
                                "{} set.\n{}",
                                cmd,
                                render_vacations_as_text_table(&quote)
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: {} <id> <chf>", cmd),
                }
            }
            "agent" => {
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id_s, !rest.is_empty()) {
                    (Some(id_s), true) => {
                        let id: u32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let agent_type = rest.join(" ");
                        match quote.update_vacation_with(id, |entry| entry.agent_type = agent_type)
                        {
                            Ok(_) => println!(
                                "agent set.\n{}",
                                render_vacations_as_text_table(&quote)
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: agent <id> <text...>"),
                }
            }
            "grouped" => print_groups(&quote),
            "item" => match parts.next() {
                Some("list") | None => print_items(&quote),
                Some("add") => {
                    let qty_s = parts.next();
                    let price_s = parts.next();
                    let rest: Vec<&str> = parts.collect();
                    match (qty_s, price_s, !rest.is_empty()) {
                        (Some(qty_s), Some(price_s), true) => {
                            let (Ok(quantity), Ok(price)) =
                                (qty_s.parse::<f64>(), price_s.parse::<f64>())
                            else {
                                println!("Invalid quantity or unit price");
                                continue;
                            };
                            let item = QuoteItem::new(rest.join(" "), quantity, price);
                            match quote.add_item(item) {
                                Ok(id) => {
                                    println!("Added item id={}", id);
                                    print_items(&quote);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: item add <qty> <unit_price> <description...>"),
                    }
                }
                Some("delete") => match parts.next().map(str::parse::<u32>) {
                    Some(Ok(id)) => match quote.delete_item(id) {
                        Ok(_) => println!("Deleted item {id}."),
                        Err(e) => println!("Error: {}", e),
                    },
                    Some(Err(_)) => println!("Invalid id"),
                    None => println!("Usage: item delete <id>"),
                },
                Some(other) => {
                    println!("Unknown item command '{}'.", other);
                    println!("Usage: item list|add|delete ...");
                }
            },
            "client" => match parts.next() {
                Some("show") | None => print_client(&quote),
                Some("name") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: client name <text...>");
                        continue;
                    }
                    let mut client = quote.client().clone();
                    client.name = rest.join(" ");
                    quote.set_client(client);
                    println!("Client updated.");
                    print_client(&quote);
                }
                Some("address") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: client address <text...>");
                        continue;
                    }
                    let mut client: Client = quote.client().clone();
                    client.address_lines.push(rest.join(" "));
                    quote.set_client(client);
                    println!("Client updated.");
                    print_client(&quote);
                }
                Some(other) => {
                    println!("Unknown client command '{}'.", other);
                    println!("Usage: client show|name|address ...");
                }
            },
            "meta" => match parts.next() {
                Some("show") | None => print_metadata(&quote),
                Some(field @ ("number" | "title" | "notes")) => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta {} <text...>", field);
                        continue;
                    }
                    let text = rest.join(" ");
                    let mut metadata = quote.metadata().clone();
                    match field {
                        "number" => metadata.quote_number = text,
                        "title" => metadata.title = text,
                        _ => metadata.notes = Some(text),
                    }
                    quote.set_metadata(metadata);
                    println!("Metadata updated.");
                    print_metadata(&quote);
                }
                Some(other) => {
                    println!("Unknown meta command '{}'.", other);
                    println!("Usage: meta show|number|title|notes ...");
                }
            },
            "settings" => match parts.next() {
                Some("show") | None => print_settings(&quote),
                Some("night") => {
                    let start = parts.next().and_then(serde_time::parse);
                    let end = parts.next().and_then(serde_time::parse);
                    match (start, end) {
                        (Some(start), Some(end)) => {
                            match quote.update_settings_with(|s| {
                                s.night_window.start = start;
                                s.night_window.end = end;
                            }) {
                                Ok(_) => {
                                    println!("Night window updated.");
                                    print_settings(&quote);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: settings night <HH:MM> <HH:MM>"),
                    }
                }
                Some("markup") => {
                    let kind = parts.next();
                    let pct = parts.next().map(str::parse::<f64>);
                    match (kind, pct) {
                        (Some(kind @ ("night" | "sunday" | "holiday")), Some(Ok(pct))) => {
                            match quote.update_settings_with(|s| match kind {
                                "night" => s.night_markup_pct = pct,
                                "sunday" => s.sunday_markup_pct = pct,
                                _ => s.holiday_markup_pct = pct,
                            }) {
                                Ok(_) => println!("{} markup set to {}%.", kind, pct),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: settings markup <night|sunday|holiday> <pct>"),
                    }
                }
                Some("vat") => match parts.next().map(str::parse::<f64>) {
                    Some(Ok(pct)) => match quote.update_settings_with(|s| s.vat_pct = pct) {
                        Ok(_) => println!("VAT set to {}%.", pct),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: settings vat <pct>"),
                },
                Some("pause") => match parts.next().map(PauseAllocation::from_str) {
                    Some(Ok(policy)) => {
                        match quote.update_settings_with(|s| s.pause_allocation = policy) {
                            Ok(_) => println!("Pause allocation set to {}.", policy.as_str()),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Some(Err(e)) => println!("Error: {}", e),
                    None => println!("Usage: settings pause <normal_first|proportional>"),
                },
                Some("precedence") => match parts.next().map(HolidayPrecedence::from_str) {
                    Some(Ok(precedence)) => {
                        match quote.update_settings_with(|s| s.holiday_precedence = precedence) {
                            Ok(_) => {
                                println!("Holiday precedence set to {}.", precedence.as_str())
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Some(Err(e)) => println!("Error: {}", e),
                    None => println!("Usage: settings precedence <holiday_first|sunday_first>"),
                },
                Some("holiday") => {
                    let action = parts.next();
                    let canton = parts.next();
                    let date = parts.next().and_then(parse_date);
                    match (action, canton, date) {
                        (Some("add"), Some(canton), Some(date)) => {
                            match quote.update_settings_with(|s| s.holidays.add_holiday(canton, date))
                            {
                                Ok(_) => println!("Holiday {} added for {}.", date, canton),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        (Some("remove"), Some(canton), Some(date)) => {
                            let mut removed = false;
                            match quote.update_settings_with(|s| {
                                removed = s.holidays.remove_holiday(canton, date)
                            }) {
                                Ok(_) if removed => {
                                    println!("Holiday {} removed for {}.", date, canton)
                                }
                                Ok(_) => println!("Holiday {} not found for {}.", date, canton),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!(
                            "Usage: settings holiday <add|remove> <canton> <YYYY-MM-DD>"
                        ),
                    }
                }
                Some("rate") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: settings rate <agent_type...>");
                        continue;
                    }
                    let agent_type = rest.join(" ");
                    match quote.suggested_rate(&agent_type) {
                        Some(rate) => println!("Suggested rate for {}: {:.2}", agent_type, rate),
                        None => println!("No suggested rate for {}.", agent_type),
                    }
                }
                Some("load") => match parts.next() {
                    Some(path) => match load_settings_from_json(path) {
                        Ok(settings) => match quote.set_settings(settings) {
                            Ok(_) => {
                                println!("Settings loaded from {}.", path);
                                print_settings(&quote);
                            }
                            Err(e) => println!("Error applying settings: {}", e),
                        },
                        Err(e) => println!("Error loading settings: {}", e),
                    },
                    None => println!("Usage: settings load <json_path>"),
                },
                Some("save") => match parts.next() {
                    Some(path) => match save_settings_to_json(quote.settings(), path) {
                        Ok(_) => println!("Settings saved to {}.", path),
                        Err(e) => println!("Error saving settings: {}", e),
                    },
                    None => println!("Usage: settings save <json_path>"),
                },
                Some(other) => {
                    println!("Unknown settings command '{}'.", other);
                    println!(
                        "Usage: settings show|night|markup|vat|pause|precedence|holiday|rate|load|save ..."
                    );
                }
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_quote_to_json(&quote, path) {
                        Ok(_) => println!("Quote saved to {}.", path),
                        Err(e) => println!("Error saving quote: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_quote_to_csv(&quote, path) {
                        Ok(_) => println!("Quote saved to {}.", path),
                        Err(e) => println!("Error saving quote: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => load_quote_from_json(path),
                    (Some("csv"), Some(path)) => load_quote_from_csv(path),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(loaded) => {
                        quote = loaded;
                        println!("Quote loaded from {}.", path.unwrap_or_default());
                        println!("{}", render_vacations_as_text_table(&quote));
                    }
                    Err(e) => println!("Error loading quote: {}", e),
                }
            }
            "export" => match parts.next() {
                Some(path) => match quote.vacation_lines() {
                    Ok(lines) => match export_vacation_lines_to_csv(&lines, path) {
                        Ok(_) => println!("Exported {} vacations to {}.", lines.len(), path),
                        Err(e) => println!("Error exporting: {}", e),
                    },
                    Err(e) => println!("Calculation error: {}", e),
                },
                None => println!("Usage: export <path>"),
            },
            "preview" => {
                match QuoteDocument::build(&quote) {
                    Ok(document) => match TextRenderer::default().render(&document) {
                        Ok(text) => println!("{}", text),
                        Err(e) => println!("Render error: {}", e),
                    },
                    Err(e) => println!("Preview error: {}", e),
                }
            }
            "compute" | "total" => match quote.refresh() {
                Ok(summary) => {
                    println!(
                        "Refreshed ({})\n{}",
                        summary.to_cli_summary(),
                        render_vacations_as_text_table(&quote)
                    );
                }
                Err(e) => println!("Refresh error: {}", e),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
