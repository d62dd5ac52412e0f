// Model traits: the swap-ready abstraction over the external models.
//
// The classifier only ever sees these traits. The default implementations
// run local ONNX exports; the hosted backend calls the Hugging Face
// Inference API instead. Tests plug in fixed-output mocks.

use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One (label, confidence) pair as returned by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    /// Confidence from 0.0 to 1.0
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Text sentiment model. Returns a single label from a small closed
/// vocabulary (`NEGATIVE`, `POSITIVE`) with its confidence.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn predict(&self, text: &str) -> Result<LabelScore>;
}

/// Image label model. Returns labels ranked by descending confidence,
/// possibly empty.
#[async_trait]
pub trait ImageLabelModel: Send + Sync {
    async fn predict(&self, image: &RgbImage) -> Result<Vec<LabelScore>>;
}

/// Sort labels by descending score, in place.
pub fn rank(labels: &mut [LabelScore]) {
    labels.sort_by(|a, b| b.score.total_cmp(&a.score));
}
