use serde_json::Value;

use super::scalar_text;

/// Headline figures, most specific first: a full run reports what was
/// collected, a single LP what it owes, an accrual its interest.
const PRIORITY_KEYS: [&str; 4] = [
    "total_late_interest_collected",
    "total_late_interest_due",
    "interest",
    "total_catch_up",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar_text(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val));
            return;
        }
    }

    println!("{}", scalar_text(result_obj));
}
