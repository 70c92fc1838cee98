// Result export and re-import.
//
// CSV: header row with every ClassificationResult field in declaration
// order, one row per result, input order preserved. `offensive_words` is
// written as a JSON array string so it survives the round trip.
// JSON: a pretty-printed array of result objects.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{ClassificationResult, SCORE_FIELDS};

/// Default file name offered for CSV downloads.
pub const DEFAULT_EXPORT_NAME: &str = "toxicity_analysis_results.csv";

/// Flat CSV row: identical to ClassificationResult except for the word list.
#[derive(Serialize)]
struct CsvRow<'a> {
    comment: &'a str,
    cleaned_comment: &'a str,
    is_toxic: bool,
    toxicity_score: f64,
    severe_toxicity: f64,
    obscene: f64,
    threat: f64,
    insult: f64,
    identity_hate: f64,
    offensive_words: String,
    explanation: &'a str,
}

impl<'a> CsvRow<'a> {
    fn from_result(r: &'a ClassificationResult) -> Result<Self> {
        Ok(Self {
            comment: &r.comment,
            cleaned_comment: &r.cleaned_comment,
            is_toxic: r.is_toxic,
            toxicity_score: r.toxicity_score,
            severe_toxicity: r.severe_toxicity,
            obscene: r.obscene,
            threat: r.threat,
            insult: r.insult,
            identity_hate: r.identity_hate,
            offensive_words: serde_json::to_string(&r.offensive_words)?,
            explanation: &r.explanation,
        })
    }
}

/// Write results as CSV to any writer.
pub fn write_csv<W: Write>(results: &[ClassificationResult], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if results.is_empty() {
        // serde only emits the header alongside the first record
        wtr.write_record(FIELD_NAMES)?;
    }
    for result in results {
        wtr.serialize(CsvRow::from_result(result)?)
            .context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Render results as UTF-8 CSV bytes (for downloads).
pub fn to_csv_bytes(results: &[ClassificationResult]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(results, &mut buf)?;
    Ok(buf)
}

/// Write results to `path`: JSON if it ends in `.json`, CSV otherwise.
pub fn export_results(results: &[ClassificationResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    if is_json(path) {
        serde_json::to_writer_pretty(&mut writer, results)
            .context("Failed to write JSON results")?;
        writer.flush()?;
    } else {
        write_csv(results, writer)?;
    }
    Ok(())
}

/// Load an exported results file as loosely typed rows.
///
/// Rows keep whatever columns the file has; summarizing decides whether
/// they are usable.
pub fn read_table(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if is_json(path) {
        let value: Value =
            serde_json::from_reader(file).context("Failed to parse JSON results")?;
        match value {
            Value::Array(rows) => Ok(rows),
            _ => bail!("JSON results must be an array of records"),
        }
    } else {
        read_csv_table(file)
    }
}

/// Parse CSV results into JSON rows, restoring the types of known columns.
pub fn read_csv_table(reader: impl Read) -> Result<Vec<Value>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let scores: HashSet<&str> = SCORE_FIELDS.into_iter().collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
        let mut row = Map::new();
        for (name, cell) in headers.iter().zip(record.iter()) {
            let value = match name {
                "is_toxic" => Value::Bool(cell.trim().eq_ignore_ascii_case("true")),
                "offensive_words" => serde_json::from_str(cell).unwrap_or(Value::Null),
                n if scores.contains(n) => cell
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                _ => Value::String(cell.to_string()),
            };
            row.insert(name.to_string(), value);
        }
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

const FIELD_NAMES: [&str; 11] = [
    "comment",
    "cleaned_comment",
    "is_toxic",
    "toxicity_score",
    "severe_toxicity",
    "obscene",
    "threat",
    "insult",
    "identity_hate",
    "offensive_words",
    "explanation",
];

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
