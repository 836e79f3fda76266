use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output rows returned by the API in the appropriate format
pub fn output_records(output_format: OutputFormat, records: &Value, empty_message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Text => {
            let rows = match records {
                Value::Array(rows) => rows.as_slice(),
                single => std::slice::from_ref(single),
            };
            if rows.is_empty() {
                println!("{}", empty_message);
            }
            for row in rows {
                println!("{}", describe_row(row));
            }
        }
    }
    Ok(())
}

/// One line per row: "#id name - description" when the row has a name
pub fn describe_row(row: &Value) -> String {
    match row.get("name").and_then(Value::as_str) {
        Some(name) => {
            let id = row.get("id").map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
            match row.get("description").and_then(Value::as_str) {
                Some(description) if !description.is_empty() => format!("#{} {} - {}", id, name, description),
                _ => format!("#{} {}", id, name),
            }
        }
        None => row.to_string(),
    }
}
