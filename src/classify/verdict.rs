// Verdict types: what flows out of the classifiers.
//
// These serialize straight into the JSON the transport layer returns, so
// field names here are the wire names.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::severity::Severity;

/// Which kind of input a signal or verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

/// One external model output: a label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSignal {
    pub modality: Modality,
    pub label: String,
    /// Confidence in [0, 1]
    pub score: f64,
}

impl ClassificationSignal {
    pub fn new(modality: Modality, label: impl Into<String>, score: f64) -> Self {
        Self {
            modality,
            label: label.into(),
            score,
        }
    }

    pub fn text(label: impl Into<String>, score: f64) -> Self {
        Self::new(Modality::Text, label, score)
    }

    pub fn image(label: impl Into<String>, score: f64) -> Self {
        Self::new(Modality::Image, label, score)
    }
}

/// Verdict for a single modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityVerdict {
    pub severity: Severity,
    pub category: Category,
    pub label: String,
    pub score: f64,
}

impl ModalityVerdict {
    /// Returned when the image model produced no labels at all.
    pub fn unknown_image() -> Self {
        Self {
            severity: Severity::Low,
            category: Category::Other,
            label: "Unknown".to_string(),
            score: 0.0,
        }
    }
}

/// Final verdict for an issue, merged across whichever modalities were given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueVerdict {
    pub severity: Severity,
    pub category: Category,
    /// Model labels in supply order (text before image)
    pub labels: Vec<String>,
    /// Model scores, parallel to `labels`
    pub scores: Vec<f64>,
    /// Set only when an image was supplied, failed, and a text-only verdict
    /// was returned instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_error: Option<String>,
}

impl Default for IssueVerdict {
    fn default() -> Self {
        Self {
            severity: Severity::Low,
            category: Category::Other,
            labels: Vec::new(),
            scores: Vec::new(),
            image_error: None,
        }
    }
}
