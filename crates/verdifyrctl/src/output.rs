//! Terminal rendering of pipeline results

use owo_colors::OwoColorize;
use verdifyr_common::{
    ClassificationLabel, PipelineOutcome, SessionRecord, SessionSummary, Verdict,
};

fn indicator(label: &ClassificationLabel) -> String {
    match label {
        ClassificationLabel::Passed => "[ok]".green().to_string(),
        ClassificationLabel::Restricted(_) => "[!]".yellow().to_string(),
        ClassificationLabel::Forbidden => "[XX]".red().bold().to_string(),
        ClassificationLabel::Unknown => "[?]".dimmed().to_string(),
    }
}

fn print_verdict(verdict: &Verdict) {
    let annex = verdict
        .annex_reference
        .as_deref()
        .map(|a| format!(" (Annex {})", a))
        .unwrap_or_default();
    let verified = if verdict.verified { " ✓verified" } else { "" };

    println!(
        "  {} {}{} - {}{}",
        indicator(&verdict.label),
        verdict.ingredient.bold(),
        annex,
        verdict.label,
        verified.green(),
    );
    if let Some(reason) = &verdict.reason {
        println!("       {}", reason.dimmed());
    }
}

pub fn print_report(outcome: &PipelineOutcome) {
    let record = &outcome.record;

    println!();
    println!(
        "{} ({} ingredients)",
        "Compliance report".bold(),
        record.source_ingredients.len()
    );
    println!("  session {}", record.session_id.to_string().dimmed());
    println!();

    for verdict in &record.final_verdicts {
        print_verdict(verdict);
    }

    println!();
    let forbidden = record.forbidden_count();
    if forbidden > 0 {
        println!(
            "  {} {} forbidden ingredient(s) found",
            "✗".red().bold(),
            forbidden
        );
    } else {
        println!("  {} no forbidden ingredients found", "✓".green());
    }
    println!(
        "  {} passed, {} total",
        record.passed_count(),
        record.final_verdicts.len()
    );

    if !outcome.notes.is_empty() {
        println!();
        println!("  normalization notes:");
        for note in &outcome.notes {
            println!("    - {}", note);
        }
    }
    if !outcome.degraded_passes.is_empty() {
        println!(
            "  {} oracle pass(es) unavailable: {}",
            "warning:".yellow(),
            outcome.degraded_passes.join(", ")
        );
    }
    if let Some(error) = &outcome.persistence_error {
        println!("  {} session not saved: {}", "warning:".yellow(), error);
    }
}

pub fn print_history(summaries: &[SessionSummary]) {
    if summaries.is_empty() {
        println!("no sessions recorded yet");
        return;
    }
    for summary in summaries {
        let flag = if summary.forbidden_count > 0 {
            format!("{} forbidden", summary.forbidden_count).red().to_string()
        } else {
            "clean".green().to_string()
        };
        println!(
            "{}  {}  {:>3} ingredients  {}",
            summary.created_at.format("%Y-%m-%d %H:%M"),
            summary.session_id,
            summary.ingredient_count,
            flag,
        );
    }
}

pub fn print_session(record: &SessionRecord) {
    println!(
        "session {} ({}, actor {})",
        record.session_id,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.actor.id(),
    );
    println!(
        "source list: {}",
        record
            .source_ingredients
            .iter()
            .map(|i| i.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    for verdict in &record.final_verdicts {
        print_verdict(verdict);
    }
}
