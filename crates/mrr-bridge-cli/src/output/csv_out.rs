use serde_json::Value;
use std::io;

use super::render_value;

/// Write output as CSV to stdout.
///
/// When the result carries a per-customer movements table that array is the
/// CSV body; otherwise the result flattens to field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(movements)) = map.get("movements") {
                write_array_csv(&mut wtr, movements);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                write_flat_csv(&mut wtr, map, "");
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&render_value(result)]);
        }
    }

    let _ = wtr.flush();
}

/// Flatten nested objects into dotted field names, one row per leaf.
fn write_flat_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>, prefix: &str) {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => write_flat_csv(wtr, inner, &field),
            _ => {
                let _ = wtr.write_record([field.as_str(), &render_value(val)]);
            }
        }
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(render_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&render_value(item)]);
        }
    }
}
