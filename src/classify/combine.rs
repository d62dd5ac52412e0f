// Score combiner: alternate severity path.
//
// Averages the text and image confidences and buckets the result. No
// keyword lookup. Uses its own capitalized severity vocabulary and is kept
// apart from the keyword engine and the merger.

use serde::{Deserialize, Serialize};

use super::verdict::ClassificationSignal;

/// Severity bucket for the averaged score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinedSeverity {
    High,
    Medium,
    Low,
}

impl CombinedSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinedSeverity::High => "High",
            CombinedSeverity::Medium => "Medium",
            CombinedSeverity::Low => "Low",
        }
    }
}

impl std::fmt::Display for CombinedSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the score combiner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    /// Averaged score, rounded to 3 decimal places
    pub combined_score: f64,
    pub severity: CombinedSeverity,
}

/// Cut points for the averaged score. Both are inclusive lower bounds.
pub struct CombineThresholds {
    /// Averaged score at or above this is High (default 0.75)
    pub high: f64,
    /// Averaged score at or above this (and below `high`) is Medium (default 0.4)
    pub medium: f64,
}

impl Default for CombineThresholds {
    fn default() -> Self {
        Self {
            high: 0.75,
            medium: 0.4,
        }
    }
}

/// Combine a text and an image signal with the default thresholds.
pub fn combine(text: &ClassificationSignal, image: &ClassificationSignal) -> CombinedScore {
    combine_with(text, image, &CombineThresholds::default())
}

/// Combine a text and an image signal.
///
/// Equal-weight average. When both scores are zero the sum is divided by 1
/// instead of 2, which still yields 0.0.
pub fn combine_with(
    text: &ClassificationSignal,
    image: &ClassificationSignal,
    thresholds: &CombineThresholds,
) -> CombinedScore {
    let sum = text.score + image.score;
    let divisor = if text.score != 0.0 || image.score != 0.0 {
        2.0
    } else {
        1.0
    };
    let combined = sum / divisor;

    // Bucket on the unrounded value
    let severity = if combined >= thresholds.high {
        CombinedSeverity::High
    } else if combined >= thresholds.medium {
        CombinedSeverity::Medium
    } else {
        CombinedSeverity::Low
    };

    CombinedScore {
        combined_score: round3(combined),
        severity,
    }
}

/// Round to three decimals, ties to even on the exact binary value.
fn round3(x: f64) -> f64 {
    format!("{x:.3}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(t: f64, i: f64) -> CombinedScore {
        combine(
            &ClassificationSignal::text("NEGATIVE", t),
            &ClassificationSignal::image("pothole", i),
        )
    }

    #[test]
    fn test_high_average() {
        let result = pair(0.8, 0.9);
        assert!((result.combined_score - 0.85).abs() < 1e-9);
        assert_eq!(result.severity, CombinedSeverity::High);
    }

    #[test]
    fn test_all_zero_divides_by_one() {
        let result = pair(0.0, 0.0);
        assert_eq!(result.combined_score, 0.0);
        assert!(!result.combined_score.is_nan());
        assert_eq!(result.severity, CombinedSeverity::Low);
    }

    #[test]
    fn test_one_zero_still_averages() {
        let result = pair(0.0, 0.9);
        assert!((result.combined_score - 0.45).abs() < 1e-9);
        assert_eq!(result.severity, CombinedSeverity::Medium);
    }

    #[test]
    fn test_boundaries_inclusive() {
        assert_eq!(pair(0.75, 0.75).severity, CombinedSeverity::High);
        assert_eq!(pair(0.4, 0.4).severity, CombinedSeverity::Medium);
        assert_eq!(pair(0.39, 0.39).severity, CombinedSeverity::Low);
    }

    #[test]
    fn test_rounds_to_three_places() {
        let result = pair(0.12346, 0.0);
        assert!((result.combined_score - 0.062).abs() < 1e-9);
    }

    #[test]
    fn test_exact_half_rounds_to_even() {
        // 0.0625 is exact in binary, so this is a true tie
        assert_eq!(pair(0.125, 0.0).combined_score, 0.062);
        assert_eq!(pair(0.0, 0.375).combined_score, 0.188);
    }

    #[test]
    fn test_labels_are_ignored() {
        let a = combine(
            &ClassificationSignal::text("POSITIVE", 0.5),
            &ClassificationSignal::image("flood", 0.5),
        );
        let b = combine(
            &ClassificationSignal::text("NEGATIVE", 0.5),
            &ClassificationSignal::image("tabby", 0.5),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = CombineThresholds {
            high: 0.9,
            medium: 0.5,
        };
        let result = combine_with(
            &ClassificationSignal::text("NEGATIVE", 0.8),
            &ClassificationSignal::image("pothole", 0.9),
            &thresholds,
        );
        assert_eq!(result.severity, CombinedSeverity::Medium);
    }

    #[test]
    fn test_severity_serializes_capitalized() {
        let json = serde_json::to_string(&pair(0.8, 0.9)).unwrap();
        assert!(json.contains("\"severity\":\"High\""), "{json}");
    }
}
