use serde_json::Value;

use super::render_value;

/// Print just the key answer values from the output.
///
/// For bridge results that is the retention headline (NRR, GRR, net change);
/// for other commands the first scalar field of the result.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Bridge components live one level down in the result.
    let components = result
        .as_object()
        .and_then(|m| m.get("components"))
        .and_then(|c| c.as_object());

    if let Some(c) = components {
        for key in ["nrr", "grr", "net_change"] {
            if let Some(val) = c.get(key) {
                println!("{}: {}", key, render_value(val));
            }
        }
        return;
    }

    if let Some(map) = result.as_object() {
        // First scalar field wins
        for (key, val) in map {
            if !val.is_object() && !val.is_array() {
                println!("{}: {}", key, render_value(val));
                return;
            }
        }
        // Nothing scalar at the top; fall back to compact JSON
        println!("{}", serde_json::to_string(result).unwrap_or_default());
        return;
    }

    println!("{}", render_value(result));
}
