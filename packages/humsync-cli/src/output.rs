use std::io::Write;

/// Write a JSON string to stdout.
pub fn write_output(json: &str) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(json.as_bytes())
        .and_then(|_| handle.write_all(b"\n"))
        .map_err(|e| format!("Failed to write to stdout: {}", e))
}

/// Serialize a value to JSON (pretty or compact).
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, String> {
    if compact {
        serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {}", e))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))
    }
}

/// Print a value as pretty JSON on stdout, mapping failures to an exit code.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), i32> {
    to_json(value, false)
        .and_then(|json| write_output(&json))
        .map_err(|e| {
            eprintln!("Error: {}", e);
            crate::exit_codes::EXECUTION_ERROR
        })
}
