use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ExportError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn render(self, documents: &[Value]) -> Result<String, ExportError> {
        match self {
            ExportFormat::Json => to_json(documents, true),
            ExportFormat::Csv => to_csv(documents, None),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}', expected json or csv", other)),
        }
    }
}

pub fn to_csv(documents: &[Value], headers: Option<Vec<String>>) -> Result<String, ExportError> {
    let Some(first) = documents.first() else {
        return Ok(String::new());
    };

    // Extract headers from first document if not provided
    let header_list = headers.unwrap_or_else(|| extract_keys(first));

    let mut csv = String::new();

    // Write headers
    csv.push_str(&header_list.join(","));
    csv.push('\n');

    // Write rows
    for doc in documents {
        let row: Vec<String> = header_list
            .iter()
            .map(|header| {
                let value = lookup_path(doc, header)
                    .map(format_value_for_csv)
                    .unwrap_or_default();
                escape_csv_field(&value)
            })
            .collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    Ok(csv)
}

fn extract_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => {
            let mut keys = Vec::new();
            extract_keys_recursive(map, &mut keys, String::new());
            keys.sort();
            keys
        }
        _ => Vec::new(),
    }
}

fn extract_keys_recursive(map: &serde_json::Map<String, Value>, keys: &mut Vec<String>, prefix: String) {
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(nested_map) if !is_extended_json_scalar(nested_map) => {
                extract_keys_recursive(nested_map, keys, full_key);
            }
            _ => {
                if !keys.contains(&full_key) {
                    keys.push(full_key);
                }
            }
        }
    }
}

/// `{"$oid": ...}`, `{"$date": ...}` and friends are one value, not a
/// nested record worth splitting into columns.
fn is_extended_json_scalar(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 1 && map.keys().all(|k| k.starts_with('$'))
}

fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn format_value_for_csv(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value_for_csv).collect();
            format!("[{}]", items.join(";"))
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn to_json(documents: &[Value], pretty: bool) -> Result<String, ExportError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(documents)?
    } else {
        serde_json::to_string(documents)?
    };
    Ok(rendered)
}

/// Lower-case ASCII alphanumerics joined by single dashes:
/// `Books in genre "Fiction":` becomes `books-in-genre-fiction`.
pub fn slugify(label: &str) -> String {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn export_file_name(step_number: usize, label: &str, format: ExportFormat) -> String {
    format!("{:02}-{}.{}", step_number, slugify(label), format.extension())
}

pub async fn write_export(
    dir: &Path,
    step_number: usize,
    label: &str,
    documents: &[Value],
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(step_number, label, format));
    let body = format.render(documents)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io { path: dir.display().to_string(), source })?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| ExportError::Io { path: path.display().to_string(), source })?;

    Ok(path)
}
