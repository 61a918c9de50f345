//! Field-level diff summaries for audit entries

use serde_json::{Map, Value};

/// Summarize top-level field changes between two JSON values
///
/// Returns `None` when nothing changed. `updatedAt` is ignored since every
/// ledger mutation touches it.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => object_changes(before_obj, after_obj),
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn object_changes(before: &Map<String, Value>, after: &Map<String, Value>) -> Vec<String> {
    let mut changes = Vec::new();

    for (key, before_val) in before.iter().filter(|(k, _)| k.as_str() != "updatedAt") {
        match after.get(key) {
            Some(after_val) if after_val != before_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }

    for (key, after_val) in after {
        if !before.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    changes
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balance_change() {
        let before = json!({"name": "Bank", "balance": 100000});
        let after = json!({"name": "Bank", "balance": 80000});

        assert_eq!(
            generate_diff(&before, &after).as_deref(),
            Some("balance: 100000 -> 80000")
        );
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let before = json!({"amount": 30000, "updatedAt": "2025-01-01T00:00:00Z"});
        let after = json!({"amount": 30000, "updatedAt": "2025-01-02T00:00:00Z"});

        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"category": "Material", "description": "bricks"});
        let after = json!({"category": "Material", "subCategory": "Cement"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("description: \"bricks\" -> (removed)"));
        assert!(diff.contains("subCategory: (added) -> \"Cement\""));
    }

    #[test]
    fn test_reference_cleared() {
        let before = json!({"paidFrom": "5f0c", "approved": false});
        let after = json!({"paidFrom": null, "approved": true});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("paidFrom: \"5f0c\" -> null"));
        assert!(diff.contains("approved: false -> true"));
    }

    #[test]
    fn test_non_object_values() {
        assert_eq!(generate_diff(&json!(1), &json!(2)).as_deref(), Some("1 -> 2"));
        assert!(generate_diff(&json!("same"), &json!("same")).is_none());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");

        let long = "é".repeat(60);
        assert!(format_value(&json!(long)).ends_with("...\""));
    }
}
