//! Classification taxonomy for EU Regulation (EC) No 1223/2009
//!
//! Every ingredient ends up with exactly one [`ClassificationLabel`].
//! Restricted labels carry a sub-category naming the annex that regulates
//! them; forbidden substances always trace to Annex II.

use serde::{Deserialize, Serialize};

/// Sub-category of a restricted classification, by regulatory annex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictedClass {
    /// Annex V - preservatives allowed within limits
    Preservative,
    /// Annex VI - UV filters allowed within limits
    UvFilter,
    /// Annex IV - colourants allowed within limits
    Colourant,
    /// Annex III - general restrictions (concentration, product type, warnings)
    General,
}

impl RestrictedClass {
    /// The annex number that defines this restriction
    pub fn annex(&self) -> &'static str {
        match self {
            Self::Preservative => "V",
            Self::UvFilter => "VI",
            Self::Colourant => "IV",
            Self::General => "III",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preservative => "preservative",
            Self::UvFilter => "uv_filter",
            Self::Colourant => "colourant",
            Self::General => "restricted",
        }
    }
}

/// Final classification of one ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "label", content = "class")]
pub enum ClassificationLabel {
    /// No EU restriction found
    Passed,
    /// Listed in Annex III/IV/V/VI - permitted within limits
    Restricted(RestrictedClass),
    /// Listed in Annex II - banned in cosmetic products
    Forbidden,
    /// Could not be classified with confidence
    Unknown,
}

impl ClassificationLabel {
    /// Severity rank used by the aggregator: higher never yields to lower.
    /// All restricted sub-categories rank equal.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Forbidden => 3,
            Self::Restricted(_) => 2,
            Self::Unknown => 1,
            Self::Passed => 0,
        }
    }

    /// Annex reference implied by the label itself, if any
    pub fn implied_annex(&self) -> Option<&'static str> {
        match self {
            Self::Forbidden => Some("II"),
            Self::Restricted(class) => Some(class.annex()),
            Self::Passed | Self::Unknown => None,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Restricted(_) => "restricted",
            Self::Forbidden => "forbidden",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restricted(class) => write!(f, "restricted ({})", class.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_matches_policy() {
        assert!(ClassificationLabel::Forbidden.severity() > ClassificationLabel::Restricted(RestrictedClass::General).severity());
        assert!(
            ClassificationLabel::Restricted(RestrictedClass::Preservative).severity()
                > ClassificationLabel::Unknown.severity()
        );
        assert!(ClassificationLabel::Unknown.severity() > ClassificationLabel::Passed.severity());
    }

    #[test]
    fn restricted_subcategories_rank_equal() {
        assert_eq!(
            ClassificationLabel::Restricted(RestrictedClass::Preservative).severity(),
            ClassificationLabel::Restricted(RestrictedClass::UvFilter).severity()
        );
    }

    #[test]
    fn implied_annex_follows_taxonomy() {
        assert_eq!(ClassificationLabel::Forbidden.implied_annex(), Some("II"));
        assert_eq!(
            ClassificationLabel::Restricted(RestrictedClass::Colourant).implied_annex(),
            Some("IV")
        );
        assert_eq!(ClassificationLabel::Passed.implied_annex(), None);
    }
}
