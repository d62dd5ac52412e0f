// Multi-modal merge.
//
// Text sets the starting category and severity. An image then overrides
// the category when it found a non-`other` one, and can only raise
// severity. Labels and scores are always reported text first.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::category::Category;
use super::error::ClassifyError;
use super::modality::Classifier;
use super::verdict::{IssueVerdict, ModalityVerdict};

/// What to do when text was given and the image leg failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFailurePolicy {
    /// Return the text-only verdict with `image_error` set.
    #[default]
    Partial,
    /// Fail the whole request with the image error.
    Fail,
}

impl ImageFailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "partial" => Some(ImageFailurePolicy::Partial),
            "fail" => Some(ImageFailurePolicy::Fail),
            _ => None,
        }
    }
}

/// Merge per-modality verdicts into one issue verdict.
///
/// Fails with `InvalidInput` when both are absent.
pub fn merge_verdicts(
    text: Option<&ModalityVerdict>,
    image: Option<&ModalityVerdict>,
) -> Result<IssueVerdict, ClassifyError> {
    if text.is_none() && image.is_none() {
        return Err(ClassifyError::InvalidInput);
    }

    let mut merged = IssueVerdict::default();

    if let Some(text) = text {
        merged.labels.push(text.label.clone());
        merged.scores.push(text.score);
        merged.category = text.category;
        merged.severity = text.severity;
    }

    if let Some(image) = image {
        merged.labels.push(image.label.clone());
        merged.scores.push(image.score);
        if image.category != Category::Other {
            merged.category = image.category;
        }
        merged.severity = merged.severity.max(image.severity);
    }

    Ok(merged)
}

/// Treat empty or whitespace-only strings as "not supplied".
fn supplied(input: Option<&str>) -> Option<&str> {
    input.filter(|s| !s.trim().is_empty())
}

impl Classifier {
    /// Classify an issue from text, an image URL, or both.
    ///
    /// Both legs run concurrently; the merge order is fixed regardless of
    /// which finishes first.
    pub async fn classify_issue(
        &self,
        text: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<IssueVerdict, ClassifyError> {
        let text = supplied(text);
        let image_url = supplied(image_url);

        if text.is_none() && image_url.is_none() {
            return Err(ClassifyError::InvalidInput);
        }

        let text_leg = async {
            match text {
                Some(text) => Some(self.classify_text(text).await),
                None => None,
            }
        };
        let image_leg = async {
            match image_url {
                Some(url) => Some(self.classify_image(url).await),
                None => None,
            }
        };
        let (text_result, image_result) = tokio::join!(text_leg, image_leg);

        let text_verdict = text_result.transpose()?;

        let (image_verdict, image_error) = match image_result {
            None => (None, None),
            Some(Ok(verdict)) => (Some(verdict), None),
            Some(Err(e)) => {
                if text_verdict.is_none() || self.image_failure == ImageFailurePolicy::Fail {
                    return Err(e);
                }
                warn!(error = %e, "Image leg failed, returning text-only verdict");
                (None, Some(e.to_string()))
            }
        };

        let mut verdict = merge_verdicts(text_verdict.as_ref(), image_verdict.as_ref())?;
        verdict.image_error = image_error;
        Ok(verdict)
    }
}
