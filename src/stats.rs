// Summary statistics over a result collection.
//
// Everything here is a pure function of its input and is recomputed on
// every call. `summarize` works on typed results straight out of the
// pipeline; `summarize_table` accepts loosely typed rows (a re-loaded
// export) and falls back to zeroed stats when a required column is absent.

use std::collections::HashMap;

use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use crate::models::{ClassificationResult, SCORE_FIELDS};

/// How many offensive words the summary keeps.
pub const TOP_WORDS: usize = 10;

/// Columns `summarize_table` needs on every row.
const REQUIRED_COLUMNS: [&str; 3] = ["is_toxic", "toxicity_score", "offensive_words"];

/// Aggregate view of a result collection.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct SummaryStats {
    pub total_comments: usize,
    pub toxic_comments: usize,
    pub avg_toxicity: f64,
    pub most_common_offensive_words: WordCounts,
}

/// Word → count pairs, most frequent first. Serializes as a JSON object
/// whose key order follows the ranking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordCounts(pub Vec<(String, usize)>);

impl WordCounts {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// Count for `word`, if it made the ranking.
    pub fn get(&self, word: &str) -> Option<usize> {
        self.iter().find(|(w, _)| *w == word).map(|(_, c)| c)
    }
}

impl Serialize for WordCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(word, count)| (word, count)))
    }
}

/// Score values per category, ready for plotting.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct ToxicityDistribution {
    pub toxicity_score: Vec<f64>,
    pub severe_toxicity: Vec<f64>,
    pub obscene: Vec<f64>,
    pub threat: Vec<f64>,
    pub insult: Vec<f64>,
    pub identity_hate: Vec<f64>,
}

impl ToxicityDistribution {
    /// (column name, values) pairs in `SCORE_FIELDS` order.
    pub fn columns(&self) -> [(&'static str, &[f64]); 6] {
        [
            (SCORE_FIELDS[0], self.toxicity_score.as_slice()),
            (SCORE_FIELDS[1], self.severe_toxicity.as_slice()),
            (SCORE_FIELDS[2], self.obscene.as_slice()),
            (SCORE_FIELDS[3], self.threat.as_slice()),
            (SCORE_FIELDS[4], self.insult.as_slice()),
            (SCORE_FIELDS[5], self.identity_hate.as_slice()),
        ]
    }
}

/// One row's contribution to the summary.
struct RowView<'a> {
    is_toxic: bool,
    /// `None` when the score is missing or not a finite number
    toxicity: Option<f64>,
    words: Vec<&'a str>,
}

/// Summarize a result collection.
pub fn summarize(results: &[ClassificationResult]) -> SummaryStats {
    aggregate(results.iter().map(|r| RowView {
        is_toxic: r.is_toxic,
        toxicity: Some(r.toxicity_score).filter(|s| s.is_finite()),
        words: r.offensive_words.iter().map(String::as_str).collect(),
    }))
}

/// Summarize loosely typed rows, e.g. a results file loaded back from disk.
///
/// Returns zeroed stats if the table is empty or any row lacks one of
/// `is_toxic`, `toxicity_score` or `offensive_words`.
pub fn summarize_table(rows: &[Value]) -> SummaryStats {
    let well_formed = !rows.is_empty()
        && rows.iter().all(|row| {
            row.as_object()
                .is_some_and(|obj| REQUIRED_COLUMNS.iter().all(|c| obj.contains_key(*c)))
        });
    if !well_formed {
        return SummaryStats::default();
    }

    aggregate(rows.iter().map(|row| RowView {
        is_toxic: truthy(&row["is_toxic"]),
        toxicity: row["toxicity_score"].as_f64().filter(|s| s.is_finite()),
        words: row["offensive_words"]
            .as_array()
            .map(|words| words.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default(),
    }))
}

/// Collect each score column for plotting, with non-finite values as 0.0.
pub fn toxicity_distribution(results: &[ClassificationResult]) -> ToxicityDistribution {
    let column = |pick: fn(&ClassificationResult) -> f64| -> Vec<f64> {
        results
            .iter()
            .map(|r| Some(pick(r)).filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect()
    };

    ToxicityDistribution {
        toxicity_score: column(|r| r.toxicity_score),
        severe_toxicity: column(|r| r.severe_toxicity),
        obscene: column(|r| r.obscene),
        threat: column(|r| r.threat),
        insult: column(|r| r.insult),
        identity_hate: column(|r| r.identity_hate),
    }
}

fn aggregate<'a>(rows: impl Iterator<Item = RowView<'a>>) -> SummaryStats {
    let mut total = 0usize;
    let mut toxic = 0usize;
    let mut score_sum = 0.0;
    let mut score_count = 0usize;
    // (word, count, first-seen index)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for row in rows {
        total += 1;
        if row.is_toxic {
            toxic += 1;
        }
        if let Some(score) = row.toxicity {
            score_sum += score;
            score_count += 1;
        }
        for word in row.words {
            let next_index = counts.len();
            counts.entry(word).or_insert((0, next_index)).0 += 1;
        }
    }

    let avg_toxicity = if score_count > 0 {
        score_sum / score_count as f64
    } else {
        0.0
    };

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first_seen))| (word, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(TOP_WORDS);

    SummaryStats {
        total_comments: total,
        toxic_comments: toxic,
        avg_toxicity,
        most_common_offensive_words: WordCounts(
            ranked
                .into_iter()
                .map(|(word, count, _)| (word.to_string(), count))
                .collect(),
        ),
    }
}

/// Interpret an `is_toxic` cell: booleans, 0/1, and "true"/"false" strings.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
