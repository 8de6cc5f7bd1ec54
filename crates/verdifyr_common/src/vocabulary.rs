//! INCI reference vocabulary
//!
//! A sample of canonical INCI-style ingredient names handed to the oracle as
//! matching context during the review pass. Ships with a built-in sample;
//! a fuller list can be loaded from a JSON array file (same shape the
//! original resource file used).

use crate::ingredient::canonical_key;
use anyhow::{Context, Result};
use std::path::Path;

/// Built-in sample of common INCI names, enough for prompt context when no
/// vocabulary file is configured.
const BUILTIN_NAMES: &[&str] = &[
    "Aqua",
    "Glycerin",
    "Phenoxyethanol",
    "Parfum",
    "Sodium Chloride",
    "Citric Acid",
    "Sodium Benzoate",
    "Potassium Sorbate",
    "Benzyl Alcohol",
    "Dehydroacetic Acid",
    "Tocopherol",
    "Tocopheryl Acetate",
    "Butyrospermum Parkii Butter",
    "Cocos Nucifera Oil",
    "Simmondsia Chinensis Seed Oil",
    "Helianthus Annuus Seed Oil",
    "Olea Europaea Fruit Oil",
    "Prunus Amygdalus Dulcis Oil",
    "Cetearyl Alcohol",
    "Cetyl Alcohol",
    "Stearyl Alcohol",
    "Glyceryl Stearate",
    "Stearic Acid",
    "Xanthan Gum",
    "Carbomer",
    "Sodium Hyaluronate",
    "Hyaluronic Acid",
    "Niacinamide",
    "Panthenol",
    "Allantoin",
    "Bisabolol",
    "Retinol",
    "Retinyl Palmitate",
    "Ascorbic Acid",
    "Ascorbyl Glucoside",
    "Salicylic Acid",
    "Lactic Acid",
    "Glycolic Acid",
    "Urea",
    "Squalane",
    "Dimethicone",
    "Cyclopentasiloxane",
    "Caprylic/Capric Triglyceride",
    "Isopropyl Myristate",
    "Butylene Glycol",
    "Propylene Glycol",
    "Pentylene Glycol",
    "Caprylyl Glycol",
    "Ethylhexylglycerin",
    "Disodium EDTA",
    "Tetrasodium EDTA",
    "Titanium Dioxide",
    "Zinc Oxide",
    "Mica",
    "CI 77491",
    "CI 77492",
    "CI 77499",
    "Benzophenone-3",
    "Octocrylene",
    "Ethylhexyl Methoxycinnamate",
    "Butyl Methoxydibenzoylmethane",
    "Homosalate",
    "Methylparaben",
    "Propylparaben",
    "Triclosan",
    "Limonene",
    "Linalool",
    "Citronellol",
    "Geraniol",
    "Hexyl Cinnamal",
    "Coumarin",
    "Aloe Barbadensis Leaf Juice",
    "Camellia Sinensis Leaf Extract",
    "Chamomilla Recutita Flower Extract",
    "Calendula Officinalis Flower Extract",
    "Rosmarinus Officinalis Leaf Extract",
];

/// Reference vocabulary of canonical ingredient names.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    /// The built-in sample
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Load from a JSON file holding an array of name strings
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vocabulary file {:?}", path))?;
        let names: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("vocabulary file {:?} is not a JSON array of strings", path))?;
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact canonical-name membership (case/whitespace-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        let key = canonical_key(name);
        self.names.iter().any(|n| canonical_key(n) == key)
    }

    /// Up to `limit` names joined for prompt context
    pub fn sample(&self, limit: usize) -> String {
        self.names
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
