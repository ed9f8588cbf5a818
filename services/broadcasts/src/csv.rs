//! CSV export of serializable records

use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `items` as CSV
///
/// The header row lists the fields of the first record in declaration
/// order. Nested objects and arrays are written as compact JSON. A cell is
/// quoted only when it contains a comma or a double quote.
pub fn to_csv<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    let rows = items
        .iter()
        .map(to_record)
        .collect::<serde_json::Result<Vec<_>>>()?;

    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|header| header.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| escape(&cell(row.get(header.as_str()))))
            .collect();
        lines.push(cells.join(","));
    }

    Ok(lines.join("\n"))
}

fn to_record<T: Serialize>(item: &T) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "CSV rows must be objects, got {other}"
        ))),
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
