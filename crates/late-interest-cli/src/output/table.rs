use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Print the result envelope as tables: scalar fields first, then one table
/// per list of records (new LPs, allocations, close summaries, breakdowns).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_record(result, "Result");
                print_notes(map);
            }
            _ => print_record(map, "Result"),
        },
        Value::Array(rows) => print_rows("Rows", rows),
        _ => println!("{}", value),
    }
}

fn print_record(map: &Map<String, Value>, title: &str) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if !is_record_list(val) {
            builder.push_record([key.as_str(), &cell_text(val)]);
        }
    }
    println!("{}", title);
    println!("{}", Table::from(builder));

    for (key, val) in map {
        if let Value::Array(rows) = val {
            if is_record_list(val) {
                print_rows(key, rows);
            }
        }
    }
}

fn print_rows(title: &str, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !is_record_list(v))
        .map(|(k, _)| k.clone())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell_text).unwrap_or_default())
                .collect();
            builder.push_record(cells);
        }
    }
    println!("\n{}", title);
    println!("{}", Table::from(builder));

    // nested record lists, e.g. each new LP's per-call breakdown
    for row in rows {
        if let Value::Object(map) = row {
            let label = map
                .get("partner_name")
                .map(scalar_text)
                .unwrap_or_default();
            for (key, val) in map {
                if let Value::Array(nested) = val {
                    if is_record_list(val) {
                        print_rows(&format!("{title} / {label} / {key}"), nested);
                    }
                }
            }
        }
    }
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().is_some_and(Value::is_object))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", scalar_text(v)))
            .collect::<Vec<_>>()
            .join("; "),
        _ => scalar_text(value),
    }
}
