// Colored terminal output for verdicts.
//
// Used by the `classify` and `combine` subcommands. The server never
// prints; it returns JSON.

use colored::Colorize;

use crate::classify::{CombinedScore, CombinedSeverity, IssueVerdict, ModalityVerdict, Severity};

/// Display a single-modality verdict.
pub fn display_modality_verdict(title: &str, verdict: &ModalityVerdict) {
    println!("\n{}", format!("=== {title} ===").bold());
    println!("  Severity: {}", colorize_severity(verdict.severity));
    println!("  Category: {}", verdict.category);
    println!(
        "  Model:    {} ({:.3})",
        super::truncate_chars(&verdict.label, 60),
        verdict.score
    );
}

/// Display a merged issue verdict with its per-modality evidence.
pub fn display_issue_verdict(verdict: &IssueVerdict) {
    println!("\n{}", "=== Issue Verdict ===".bold());
    println!("  Severity: {}", colorize_severity(verdict.severity));
    println!("  Category: {}", verdict.category);

    if !verdict.labels.is_empty() {
        println!("\n  Evidence:");
        for (label, score) in verdict.labels.iter().zip(&verdict.scores) {
            println!(
                "    [{:.3}] {}",
                score,
                super::truncate_chars(label, 60).dimmed()
            );
        }
    }

    if let Some(err) = &verdict.image_error {
        println!(
            "\n  {} image skipped: {}",
            "Warning:".yellow(),
            super::truncate_chars(err, 120)
        );
    }
}

/// Display the result of the score combiner.
pub fn display_combined_score(result: &CombinedScore) {
    let severity = match result.severity {
        CombinedSeverity::High => "High".red().bold(),
        CombinedSeverity::Medium => "Medium".yellow(),
        CombinedSeverity::Low => "Low".green(),
    };
    println!("\n{}", "=== Combined Score ===".bold());
    println!("  Combined score: {:.3}", result.combined_score);
    println!("  Severity:       {}", severity);
}

/// Colorize a severity level.
fn colorize_severity(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::High => severity.as_str().red().bold(),
        Severity::Medium => severity.as_str().yellow(),
        Severity::Low => severity.as_str().green(),
    }
}
