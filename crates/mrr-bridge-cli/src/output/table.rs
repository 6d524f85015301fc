use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::render_value;

/// Format output as tables using the tabled crate.
///
/// The result envelope is unpacked into one table per section: scalar
/// fields and nested objects (bridge components, segment counts) become
/// Field/Value tables; arrays of objects (movements, monthly series,
/// rankings) become column tables.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            let mut scalars: Vec<(&str, &Value)> = Vec::new();

            for (key, val) in result {
                match val {
                    Value::Object(_) => {
                        println!("{}", section_title(key));
                        print_kv_table(val);
                        println!();
                    }
                    Value::Array(arr) => {
                        println!("{}", section_title(key));
                        print_array_table(arr);
                        println!();
                    }
                    _ => scalars.push((key.as_str(), val)),
                }
            }

            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key, &render_value(val)]);
                }
                println!("{}", Table::from(builder));
            }
        }
        _ => print_kv_table(value),
    }

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

fn section_title(key: &str) -> String {
    let mut title = key.replace('_', " ");
    if let Some(first) = title.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    title
}

fn print_kv_table(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &render_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", render_value(value));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(render_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", render_value(item));
        }
    }
}
