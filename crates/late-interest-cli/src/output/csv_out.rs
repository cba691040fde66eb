use serde_json::{Map, Value};
use std::io;

use super::scalar_text;

/// Write the result as CSV to stdout.
///
/// Scalar result fields come first as `field,value` rows. Each list of
/// records follows as its own block: a one-cell title row, a header row and
/// the records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    let result = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => result,
            _ => map,
        },
        _ => {
            let _ = wtr.write_record([scalar_text(value)]);
            let _ = wtr.flush();
            return;
        }
    };

    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in result {
        if !matches!(val, Value::Array(_)) {
            let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
        }
    }

    for (key, val) in result {
        if let Value::Array(rows) = val {
            write_block(&mut wtr, key, rows);
        }
    }

    let _ = wtr.flush();
}

fn write_block<W: io::Write>(wtr: &mut csv::Writer<W>, title: &str, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Array(_)))
        .map(|(k, _)| k.as_str())
        .collect();

    let _ = wtr.write_record([title]);
    let _ = wtr.write_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let _ = wtr.write_record(row_cells(map, &headers));
        }
    }

    // flatten nested lists such as per-call breakdowns under their parent
    for row in rows {
        if let Value::Object(map) = row {
            let owner = map.get("partner_name").map(scalar_text).unwrap_or_default();
            for (key, val) in map {
                if let Value::Array(nested) = val {
                    write_block(wtr, &format!("{title}.{owner}.{key}"), nested);
                }
            }
        }
    }
}

fn row_cells(map: &Map<String, Value>, headers: &[&str]) -> Vec<String> {
    headers
        .iter()
        .map(|h| map.get(*h).map(scalar_text).unwrap_or_default())
        .collect()
}
