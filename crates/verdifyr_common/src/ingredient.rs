//! Ingredient identity
//!
//! An ingredient is whatever the user (or OCR) typed, plus its normalized
//! INCI-style name once normalization succeeded. Cross-pass identity is always
//! computed through [`canonical_key`]: case-insensitive, whitespace-collapsed,
//! exact match only. Fuzzy matching against the INCI vocabulary is the
//! oracle's job, never done here.

use serde::{Deserialize, Serialize};

/// One entry of a product's ingredient list. Order of ingredients in the
/// source list is significant (concentration descending) and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Text as extracted or typed, possibly with OCR noise
    pub raw_text: String,
    /// Canonical form once normalized; `None` if normalization failed
    pub normalized_name: Option<String>,
}

impl Ingredient {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            normalized_name: None,
        }
    }

    pub fn normalized(raw_text: impl Into<String>, normalized_name: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            normalized_name: Some(normalized_name.into()),
        }
    }

    /// Name used everywhere downstream: normalized form, raw text as fallback
    pub fn display_name(&self) -> &str {
        self.normalized_name.as_deref().unwrap_or(&self.raw_text)
    }

    /// Identity key for verdict grouping
    pub fn key(&self) -> String {
        canonical_key(self.display_name())
    }
}

/// Canonical identity key for an ingredient name: lowercase, interior
/// whitespace runs collapsed to a single space, edges trimmed.
pub fn canonical_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
