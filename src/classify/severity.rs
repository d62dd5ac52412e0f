// Severity rule engine.
//
// Keyword overrides first (high, then medium), then a fallback on the
// sentiment model's confidence. Only negative sentiment can raise severity
// through the fallback; anything else is low.

use serde::{Deserialize, Serialize};

use super::category::contains_any;

/// Issue severity. Ordered low < medium < high; the merger takes the max.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Severity {
    /// Merge priority: low=1, medium=2, high=3.
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phrases that force `high` regardless of model output.
pub const HIGH_KEYWORDS: &[&str] = &[
    "collapsed bridge",
    "road accident",
    "major pothole",
    "flood",
    "electric short-circuit",
    "fire",
    "structural damage",
];

/// Phrases that force `medium` when no high phrase is present.
pub const MEDIUM_KEYWORDS: &[&str] = &[
    "streetlight",
    "traffic signal",
    "garbage collection",
    "park maintenance",
    "sanitation",
    "leakage",
];

/// Negative-sentiment confidence strictly above this is `high`.
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Negative-sentiment confidence strictly above this (and not high) is `medium`.
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

/// Decide severity for one modality.
///
/// `raw` is the free text for text input, or the label itself for image
/// input. `model_label`/`model_score` are the model's top output.
pub fn assess_severity(raw: &str, model_label: &str, model_score: f64) -> Severity {
    keyword_severity(raw).unwrap_or_else(|| confidence_severity(model_label, model_score))
}

/// Keyword override, if any phrase hits.
pub fn keyword_severity(raw: &str) -> Option<Severity> {
    let lower = raw.to_lowercase();
    if contains_any(&lower, HIGH_KEYWORDS) {
        Some(Severity::High)
    } else if contains_any(&lower, MEDIUM_KEYWORDS) {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Confidence fallback used when no keyword hits.
pub fn confidence_severity(model_label: &str, model_score: f64) -> Severity {
    if !is_negative_label(model_label) {
        return Severity::Low;
    }
    if model_score > HIGH_CONFIDENCE {
        Severity::High
    } else if model_score > MEDIUM_CONFIDENCE {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Whether a sentiment label means negative. Accepts the SST-2 head's raw
/// `LABEL_0` id as well as the named label.
pub fn is_negative_label(label: &str) -> bool {
    let label = label.trim();
    label.eq_ignore_ascii_case("NEGATIVE") || label.eq_ignore_ascii_case("LABEL_0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flood_is_high_regardless_of_score() {
        assert_eq!(assess_severity("Flood on main st", "POSITIVE", 0.99), Severity::High);
        assert_eq!(assess_severity("flood", "NEGATIVE", 0.01), Severity::High);
    }

    #[test]
    fn test_streetlight_is_medium() {
        assert_eq!(
            assess_severity("Streetlight not working in my area.", "POSITIVE", 0.9),
            Severity::Medium
        );
    }

    #[test]
    fn test_high_keyword_beats_medium_keyword() {
        assert_eq!(
            assess_severity("streetlight caught fire", "POSITIVE", 0.5),
            Severity::High
        );
    }

    #[test]
    fn test_negative_fallback_tiers() {
        assert_eq!(assess_severity("meh", "NEGATIVE", 0.9), Severity::High);
        assert_eq!(assess_severity("meh", "NEGATIVE", 0.7), Severity::Medium);
        assert_eq!(assess_severity("meh", "NEGATIVE", 0.5), Severity::Low);
    }

    #[test]
    fn test_fallback_boundaries_are_exclusive() {
        assert_eq!(confidence_severity("NEGATIVE", 0.85), Severity::Medium);
        assert_eq!(confidence_severity("NEGATIVE", 0.6), Severity::Low);
    }

    #[test]
    fn test_positive_is_always_low() {
        assert_eq!(assess_severity("meh", "POSITIVE", 0.9), Severity::Low);
        assert_eq!(assess_severity("meh", "POSITIVE", 0.1), Severity::Low);
    }

    #[test]
    fn test_negative_label_variants() {
        assert!(is_negative_label("NEGATIVE"));
        assert!(is_negative_label("negative"));
        assert!(is_negative_label(" LABEL_0 "));
        assert!(!is_negative_label("POSITIVE"));
        assert!(!is_negative_label("LABEL_1"));
    }

    #[test]
    fn test_priority_order() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert_eq!(Severity::Low.priority(), 1);
        assert_eq!(Severity::High.priority(), 3);
        assert_eq!(Severity::Low.max(Severity::High), Severity::High);
    }

    #[test]
    fn test_keyword_sets_are_disjoint() {
        for kw in HIGH_KEYWORDS {
            assert!(!MEDIUM_KEYWORDS.contains(kw), "{kw} is in both sets");
        }
    }
}
