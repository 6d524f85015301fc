use serde_json::Value;

/// Pretty-print the full computation envelope as JSON.
///
/// The machine-readable default: the bridge or breakdown result together
/// with its methodology, warnings, and metadata, exactly as serialized.
/// Decimal fields arrive as strings, so nothing is lost to f64 rounding.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}
