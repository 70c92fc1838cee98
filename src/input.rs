// Comment loading from CSV or JSON files.
//
// Both formats must carry a `comment_text` column/field. The loader only
// produces the ordered list of comment strings; everything else in the file
// is ignored.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Name of the column holding comment text.
pub const COMMENT_COLUMN: &str = "comment_text";

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Pick the format from a file extension (`.csv` / `.json`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported file type: {}. Upload a .csv or .json file.",
                path.display()
            ),
        }
    }

    /// Parse a format name such as `csv` or `json`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load the comments from a CSV or JSON file.
pub fn load_comments(path: &Path) -> Result<Vec<String>> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    parse_comments(&bytes, format)
}

/// Parse comments from raw file contents.
pub fn parse_comments(bytes: &[u8], format: InputFormat) -> Result<Vec<String>> {
    let comments = match format {
        InputFormat::Csv => parse_csv(bytes)?,
        InputFormat::Json => parse_json(bytes)?,
    };

    if comments.is_empty() {
        bail!("No valid comments found in the '{COMMENT_COLUMN}' column.");
    }
    Ok(comments)
}

fn parse_csv(reader: impl Read) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?;
    let Some(column) = headers.iter().position(|h| h.trim() == COMMENT_COLUMN) else {
        bail!(missing_column());
    };

    let mut comments = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
        comments.push(record.get(column).unwrap_or_default().to_string());
    }
    Ok(comments)
}

fn parse_json(bytes: &[u8]) -> Result<Vec<String>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse JSON input")?;

    match value {
        // Records: [{"comment_text": "..."}, ...]
        Value::Array(rows) => {
            let has_column = rows
                .iter()
                .any(|row| row.as_object().is_some_and(|o| o.contains_key(COMMENT_COLUMN)));
            if !rows.is_empty() && !has_column {
                bail!(missing_column());
            }
            Ok(rows.iter().map(|row| coerce(&row[COMMENT_COLUMN])).collect())
        }
        // Columns: {"comment_text": [...]} or {"comment_text": {"0": "...", ...}}
        Value::Object(mut columns) => match columns.remove(COMMENT_COLUMN) {
            Some(Value::Array(cells)) => Ok(cells.iter().map(coerce).collect()),
            Some(Value::Object(cells)) => {
                let mut indexed: Vec<(String, Value)> = cells.into_iter().collect();
                indexed.sort_by(|(a, _), (b, _)| index_order(a, b));
                Ok(indexed.iter().map(|(_, cell)| coerce(cell)).collect())
            }
            Some(_) => bail!("'{COMMENT_COLUMN}' must be an array or an index-keyed object"),
            None => bail!(missing_column()),
        },
        _ => bail!("JSON input must be an array of records or an object of columns"),
    }
}

/// Sort index keys ("0", "1", "10") numerically where possible.
fn index_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Turn a JSON cell into comment text.
fn coerce(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn missing_column() -> String {
    format!("The uploaded file must contain a '{COMMENT_COLUMN}' column.")
}
