//! Ingredient list normalizer
//!
//! Turns raw, possibly OCR-sourced ingredient text into an ordered list of
//! clean candidate names. The contract is strict: item count and relative
//! order are preserved, nothing is invented, nothing is dropped (empty
//! fragments left behind by splitting do not count as items). Footnote
//! markers like `*` are stripped, never emitted as items of their own.
//!
//! This step never fails. Input that does not look like a delimited
//! ingredient list yields an empty list plus a note saying why.

use crate::ingredient::Ingredient;
use serde::{Deserialize, Serialize};

/// Characters that mark footnotes on ingredient labels ("*certified organic")
const FOOTNOTE_MARKERS: &[char] = &['*', '†', '‡', '°', '¹', '²', '³'];

/// A single unbroken token longer than this is OCR garbage, not a name
const MAX_ITEM_LEN: usize = 120;

/// Result of normalizing one raw ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalized {
    /// Cleaned names, in source order
    pub normalized: Vec<String>,
    /// What was fixed or why nothing could be parsed
    pub notes: Vec<String>,
}

impl Normalized {
    /// The normalized names as pipeline ingredients, source order kept
    pub fn ingredients(&self, raw_items: &[String]) -> Vec<Ingredient> {
        self.normalized
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw = raw_items.get(i).cloned().unwrap_or_else(|| name.clone());
                Ingredient::normalized(raw, name.clone())
            })
            .collect()
    }
}

/// Normalize a free-form ingredient list string.
pub fn normalize(raw: &str) -> Normalized {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Normalized {
            normalized: Vec::new(),
            notes: vec!["input was empty".to_string()],
        };
    }

    // Labels sometimes prefix the list itself
    let body = strip_heading(trimmed);

    let fragments: Vec<&str> = body
        .split(|c: char| matches!(c, ',' | ';' | '\n' | '·' | '•' | '|'))
        .collect();

    let mut notes = Vec::new();
    let mut stripped_symbols = false;
    let mut fixed_casing = false;
    let mut collapsed_whitespace = false;
    let mut dropped_empty = 0usize;

    let mut normalized = Vec::new();
    for fragment in &fragments {
        let without_markers: String = fragment
            .chars()
            .filter(|c| !FOOTNOTE_MARKERS.contains(c))
            .collect();
        if without_markers.len() != fragment.len() {
            stripped_symbols = true;
        }

        let words: Vec<&str> = without_markers.split_whitespace().collect();
        if words.is_empty() {
            dropped_empty += 1;
            continue;
        }
        if words.len() != without_markers.trim().split(' ').count() {
            collapsed_whitespace = true;
        }

        let cased: Vec<String> = words.iter().map(|w| inci_case(w)).collect();
        if cased.iter().zip(&words).any(|(c, w)| c != *w) {
            fixed_casing = true;
        }

        normalized.push(cased.join(" "));
    }

    if normalized.len() == 1 && normalized[0].len() > MAX_ITEM_LEN {
        return Normalized {
            normalized: Vec::new(),
            notes: vec![
                "input does not look like a delimited ingredient list (one unbroken run of text)"
                    .to_string(),
            ],
        };
    }

    if normalized.is_empty() {
        notes.push("no ingredient names found in input".to_string());
    }
    if stripped_symbols {
        notes.push("stripped footnote symbols (*, † and similar)".to_string());
    }
    if fixed_casing {
        notes.push("applied INCI-style capitalization".to_string());
    }
    if collapsed_whitespace {
        notes.push("collapsed irregular whitespace".to_string());
    }
    if dropped_empty > 0 {
        notes.push(format!(
            "discarded {} empty fragment(s) left by delimiters",
            dropped_empty
        ));
    }

    Normalized { normalized, notes }
}

/// Normalize and pair each clean name with its raw source fragment.
pub fn normalize_ingredients(raw: &str) -> (Vec<Ingredient>, Vec<String>) {
    let result = normalize(raw);
    let raw_items: Vec<String> = strip_heading(raw.trim())
        .split(|c: char| matches!(c, ',' | ';' | '\n' | '·' | '•' | '|'))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.chars().all(|c| FOOTNOTE_MARKERS.contains(&c) || c.is_whitespace()))
        .collect();
    let ingredients = result.ingredients(&raw_items);
    (ingredients, result.notes)
}

/// Drop a leading "Ingredients:" style heading if present
fn strip_heading(text: &str) -> &str {
    for heading in ["ingredients:", "ingredients", "inci:"] {
        if let Some(prefix) = text.get(..heading.len()) {
            if prefix.eq_ignore_ascii_case(heading) {
                let rest = &text[heading.len()..];
                // Only treat it as a heading when something follows it
                if !rest.trim().is_empty() {
                    return rest.trim_start();
                }
            }
        }
    }
    text
}

/// INCI-style casing for one word: capitalize ordinary words, keep tokens
/// that carry digits or are short all-caps codes (CI numbers, "PEG-40").
fn inci_case(word: &str) -> String {
    if word.chars().any(|c| c.is_ascii_digit()) {
        return word.to_string();
    }
    if word.len() <= 3 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
        return word.to_string();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_footnote_asterisk_and_keeps_order() {
        let result = normalize("Water, Glycerin*, Fragrance");
        assert_eq!(result.normalized, vec!["Water", "Glycerin", "Fragrance"]);
        assert!(result.notes.iter().any(|n| n.contains("footnote")));
    }

    #[test]
    fn preserves_count_and_order_from_messy_ocr() {
        let result = normalize("AQUA,  glycerin ;PARFUM\nsodium   chloride");
        assert_eq!(
            result.normalized,
            vec!["Aqua", "Glycerin", "Parfum", "Sodium Chloride"]
        );
    }

    #[test]
    fn footnote_marker_alone_is_not_an_item() {
        let result = normalize("Aqua, *, Glycerin");
        assert_eq!(result.normalized, vec!["Aqua", "Glycerin"]);
    }

    #[test]
    fn keeps_ci_numbers_and_coded_tokens() {
        let result = normalize("CI 77491, PEG-40 Hydrogenated Castor Oil");
        assert_eq!(result.normalized[0], "CI 77491");
        assert!(result.normalized[1].starts_with("PEG-40"));
    }

    #[test]
    fn empty_input_yields_note_not_error() {
        let result = normalize("   ");
        assert!(result.normalized.is_empty());
        assert_eq!(result.notes, vec!["input was empty"]);
    }

    #[test]
    fn unbroken_garbage_is_rejected_with_note() {
        let garbage = "x".repeat(300);
        let result = normalize(&garbage);
        assert!(result.normalized.is_empty());
        assert!(result.notes[0].contains("delimited"));
    }

    #[test]
    fn heading_is_stripped() {
        let result = normalize("Ingredients: Aqua, Glycerin");
        assert_eq!(result.normalized, vec!["Aqua", "Glycerin"]);
    }

    #[test]
    fn ingredient_pairs_keep_raw_fragments() {
        let (ingredients, _) = normalize_ingredients("AQUA, Glycerin*");
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].raw_text, "AQUA");
        assert_eq!(ingredients[0].display_name(), "Aqua");
        assert_eq!(ingredients[1].raw_text, "Glycerin*");
        assert_eq!(ingredients[1].display_name(), "Glycerin");
    }
}
