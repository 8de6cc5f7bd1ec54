//! Verdict normalizer: raw oracle output to canonical verdicts
//!
//! The oracle's JSON shapes changed across prompt revisions: the verdict may
//! sit under `verdict`, `classification`, `label` or `status`, the annex
//! under `annex` or `annex_reference`, the justification under half a dozen
//! names. This module maps any of those shapes onto the canonical taxonomy
//! with a priority-ordered rule list. The mapping is total: unrecognized or
//! missing fields fall through to `Unknown`, they never error. The only way
//! a raw object is dropped is when no ingredient name can be found at all,
//! and that drop is logged as a merge warning.

use crate::aggregator;
use crate::taxonomy::{ClassificationLabel, RestrictedClass};
use crate::verdict::{Verdict, VerdictSet};
use serde_json::Value;
use tracing::warn;

const NAME_FIELDS: &[&str] = &["ingredient", "name", "inci_name"];
const VERDICT_FIELDS: &[&str] = &["verdict", "classification", "label", "status"];
const ANNEX_FIELDS: &[&str] = &["annex", "annex_reference"];
const REASON_FIELDS: &[&str] = &[
    "reason",
    "reason_for_caution",
    "potential_risk",
    "explanation",
    "note",
];

/// Map one raw oracle object to a canonical verdict. Returns `None` only
/// when no ingredient name is present under any known field.
pub fn map_raw(raw: &Value) -> Option<Verdict> {
    let name = extract_name(raw)?;
    let (label, annex) = map_label(raw);
    let reason = first_string(raw, REASON_FIELDS);

    let mut verdict = Verdict::new(name, label, annex, reason);
    if extract_bool(raw, "verified_correct").or_else(|| extract_bool(raw, "verified"))
        == Some(true)
    {
        verdict.verified = true;
    }
    Some(verdict)
}

/// Map a whole oracle pass to a verdict set. Raw objects without a name are
/// discarded with a warning; duplicate names within one pass resolve by
/// severity, same as cross-pass merging.
pub fn map_all(raws: &[Value]) -> VerdictSet {
    let mut set = VerdictSet::new();
    for raw in raws {
        match map_raw(raw) {
            Some(verdict) => {
                let resolved = match set.get(&verdict.ingredient) {
                    Some(existing) => aggregator::resolve(existing, &verdict),
                    None => verdict,
                };
                set.insert(resolved);
            }
            None => {
                warn!(raw = %raw, "discarding classifier output with no ingredient name");
            }
        }
    }
    set
}

/// The total label mapping, first match wins:
/// forbidden/II, preservative/V, UV filter/VI, colourant/IV, restricted/III,
/// safe synonyms, Unknown. Returns the label and the annex it implies.
pub fn map_label(raw: &Value) -> (ClassificationLabel, Option<String>) {
    let verdict_text = first_string(raw, VERDICT_FIELDS)
        .unwrap_or_default()
        .to_uppercase();
    let annex = first_string(raw, ANNEX_FIELDS)
        .map(|a| canonical_annex(&a))
        .unwrap_or_default();

    let label = if has_marker(&verdict_text, &["FORBIDDEN", "BANNED", "PROHIBITED"]) || annex == "II"
    {
        ClassificationLabel::Forbidden
    } else if has_marker(&verdict_text, &["PRESERVATIVE"]) || annex == "V" {
        ClassificationLabel::Restricted(RestrictedClass::Preservative)
    } else if has_marker(&verdict_text, &["UV FILTER", "UV_FILTER", "UV-FILTER"]) || annex == "VI" {
        ClassificationLabel::Restricted(RestrictedClass::UvFilter)
    } else if has_marker(&verdict_text, &["COLOURANT", "COLORANT"]) || annex == "IV" {
        ClassificationLabel::Restricted(RestrictedClass::Colourant)
    } else if has_marker(&verdict_text, &["RESTRICTED"]) || annex == "III" {
        ClassificationLabel::Restricted(RestrictedClass::General)
    } else if matches!(
        verdict_text.as_str(),
        "PASS" | "PASSED" | "SAFE" | "COMPLIANT" | "OK"
    ) {
        ClassificationLabel::Passed
    } else {
        ClassificationLabel::Unknown
    };

    let annex_ref = label
        .implied_annex()
        .map(String::from)
        .or_else(|| (!annex.is_empty()).then(|| annex));
    (label, annex_ref)
}

/// Find an ingredient name: known fields first, then a bare string value
fn extract_name(raw: &Value) -> Option<String> {
    if let Some(name) = first_string(raw, NAME_FIELDS) {
        return Some(name);
    }
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn first_string(raw: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(text) = raw.get(field).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn extract_bool(raw: &Value, field: &str) -> Option<bool> {
    raw.get(field).and_then(Value::as_bool)
}

fn has_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// Reduce "Annex III", "annex iii", "3" and friends to a bare roman numeral
fn canonical_annex(text: &str) -> String {
    let upper = text.trim().to_uppercase();
    let stripped = upper.strip_prefix("ANNEX").unwrap_or(&upper).trim().to_string();
    match stripped.as_str() {
        "2" => "II".to_string(),
        "3" => "III".to_string(),
        "4" => "IV".to_string(),
        "5" => "V".to_string(),
        "6" => "VI".to_string(),
        other => other.to_string(),
    }
}
