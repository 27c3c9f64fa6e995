//! Terminal output formatting.

use colored::Colorize;
use rxboard_core::lookup::{FamilyRelationship, Patient};
use rxboard_core::LookupOutcome;
use serde_json::json;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Print a lookup result.
pub fn print_lookup(outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::InvalidPid => {
            println!("{}", "Please enter a patient ID.".yellow());
        }
        LookupOutcome::NotFound { pid } => {
            println!("{} {}", "Patient not found:".yellow(), pid);
        }
        LookupOutcome::Found {
            patient,
            relationships,
        } => {
            print_patient(patient);
            println!();
            print_relationships_table(&patient.pid, relationships);
        }
    }
}

/// Print a single patient.
pub fn print_patient(patient: &Patient) {
    let name = patient.name.as_deref().unwrap_or("-");
    println!("{} {}", name.cyan().bold(), format!("({})", patient.pid).dimmed());
    if let Some(birth_date) = &patient.birth_date {
        println!("{}: {}", "Birth date".bold(), birth_date);
    }
    if let Some(gender) = &patient.gender {
        println!("{}: {}", "Gender".bold(), gender);
    }
    for (key, value) in &patient.extra {
        let value = value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        println!("{}: {}", key.bold(), value);
    }
}

/// Print relationships as a table.
pub fn print_relationships_table(pid: &str, relationships: &[FamilyRelationship]) {
    if relationships.is_empty() {
        println!("{}", "No relationships recorded.".dimmed());
        return;
    }

    println!(
        "{} {} {}",
        pad("Pair code", 24),
        pad("Relationship", 16),
        "Relative"
    );
    println!("{}", "-".repeat(56));

    for rel in relationships {
        let relationship = rel.relationship.as_deref().unwrap_or("-");
        let relative = rel.counterpart(pid).unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {}",
            pad(&truncate(&rel.pair_code, 24), 24),
            pad(&truncate(relationship, 16), 16),
            relative.green()
        );
    }
}

/// JSON form of a lookup result.
pub fn outcome_json(outcome: &LookupOutcome) -> serde_json::Value {
    match outcome {
        LookupOutcome::InvalidPid => json!({ "found": false, "error": "invalid pid" }),
        LookupOutcome::NotFound { pid } => json!({
            "found": false,
            "pid": pid,
            "patient": null,
            "relationships": [],
        }),
        LookupOutcome::Found {
            patient,
            relationships,
        } => json!({
            "found": true,
            "pid": patient.pid,
            "patient": patient,
            "relationships": relationships,
        }),
    }
}

/// Pad to a display width, counting wide characters as two columns.
fn pad(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
