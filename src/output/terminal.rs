// Colored terminal output for analysis runs.
//
// This module handles all terminal-specific formatting: colors, tables,
// bars. The main.rs commands delegate here.

use colored::Colorize;

use crate::models::ClassificationResult;
use crate::stats::{SummaryStats, ToxicityDistribution};

/// Scores at or above this count as "high" in the category overview.
const HIGH_SCORE: f64 = 0.5;

/// Display the summary block and the top offensive words.
pub fn display_summary(stats: &SummaryStats) {
    println!("\n{}", "=== Summary Statistics ===".bold());
    println!("  Total processed:  {}", stats.total_comments);
    println!(
        "  Toxic comments:   {}",
        if stats.toxic_comments > 0 {
            stats.toxic_comments.to_string().red().bold()
        } else {
            stats.toxic_comments.to_string().green()
        }
    );
    println!(
        "  Average toxicity: {}",
        colorize_score(stats.avg_toxicity, format!("{:.2}", stats.avg_toxicity))
    );

    println!("\n{}", "=== Most Common Offensive Words ===".bold());
    if stats.most_common_offensive_words.is_empty() {
        println!("  {}", "No offensive words found.".dimmed());
        return;
    }

    let max = stats
        .most_common_offensive_words
        .iter()
        .map(|(_, count)| count)
        .max()
        .unwrap_or(1);
    for (word, count) in stats.most_common_offensive_words.iter() {
        let width = (count * 30).div_ceil(max.max(1));
        println!("  {:<20} {:>4}  {}", word, count, "█".repeat(width).red());
    }
}

/// Display mean / max / high-count for each score category.
pub fn display_distribution(dist: &ToxicityDistribution) {
    println!("\n{}", "=== Toxicity Distribution ===".bold());
    println!(
        "  {:<16} {:>6} {:>6} {:>8}",
        "Category".dimmed(),
        "Mean".dimmed(),
        "Max".dimmed(),
        format!(">={HIGH_SCORE}").dimmed(),
    );
    println!("  {}", "-".repeat(40).dimmed());

    for (name, values) in dist.columns() {
        if values.is_empty() {
            println!("  {:<16} {:>6} {:>6} {:>8}", name, "-", "-", "-");
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let high = values.iter().filter(|v| **v >= HIGH_SCORE).count();
        println!(
            "  {:<16} {:>6.2} {:>6} {:>8}",
            name,
            mean,
            colorize_score(max, format!("{max:.2}")),
            high
        );
    }
}

/// Display the per-comment results table, at most `limit` rows.
pub fn display_results(results: &[ClassificationResult], limit: usize) {
    println!(
        "\n{}",
        format!("=== Detailed Results ({} comments) ===", results.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<6} {:>5}  {:<48} {}",
        "#".dimmed(),
        "Toxic".dimmed(),
        "Tox".dimmed(),
        "Comment".dimmed(),
        "Explanation".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for (i, r) in results.iter().take(limit).enumerate() {
        let toxic = if r.is_toxic {
            "yes".red().bold()
        } else {
            "no".green()
        };
        let explanation = super::truncate_chars(&r.explanation, 60);
        let explanation = if r.is_degraded() {
            explanation.yellow()
        } else {
            explanation.dimmed()
        };
        println!(
            "  {:>4}. {:<6} {:>5.2}  {:<48} {}",
            i + 1,
            toxic,
            r.toxicity_score,
            super::truncate_chars(&r.comment.replace('\n', " "), 45),
            explanation,
        );
    }

    if results.len() > limit {
        println!(
            "  {}",
            format!("... {} more rows in the export", results.len() - limit).dimmed()
        );
    }

    let degraded = results.iter().filter(|r| r.is_degraded()).count();
    if degraded > 0 {
        println!(
            "\n  {} {} comments could not be analyzed (see explanation column)",
            "Warning:".yellow(),
            degraded
        );
    }
}

fn colorize_score(score: f64, text: String) -> colored::ColoredString {
    if score >= 0.7 {
        text.red().bold()
    } else if score >= HIGH_SCORE {
        text.yellow()
    } else {
        text.green()
    }
}
