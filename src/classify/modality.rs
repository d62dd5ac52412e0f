// Single-modality classifier.
//
// Runs one external model call per input and feeds the result through the
// category matcher and severity engine. The verdict-building half is kept
// as plain functions so it can be exercised without any model loaded.

use std::sync::Arc;

use tracing::debug;

use super::category::match_category;
use super::error::ClassifyError;
use super::merge::ImageFailurePolicy;
use super::severity::assess_severity;
use super::verdict::{ClassificationSignal, Modality, ModalityVerdict};
use crate::fetch::ImageSource;
use crate::models::traits::{ImageLabelModel, LabelScore, SentimentModel};
use crate::output::truncate_chars;

/// Build a text verdict from the raw text and the sentiment model's output.
pub fn text_verdict(text: &str, signal: &ClassificationSignal) -> ModalityVerdict {
    ModalityVerdict {
        severity: assess_severity(text, &signal.label, signal.score),
        category: match_category(text),
        label: signal.label.clone(),
        score: signal.score,
    }
}

/// Build an image verdict from the image model's top label. Keyword checks
/// run against the label itself since an image has no free text.
pub fn image_verdict(signal: &ClassificationSignal) -> ModalityVerdict {
    ModalityVerdict {
        severity: assess_severity(&signal.label, &signal.label, signal.score),
        category: match_category(&signal.label),
        label: signal.label.clone(),
        score: signal.score,
    }
}

/// Build an image verdict from the model's full ranked output.
pub fn ranked_image_verdict(ranked: &[LabelScore]) -> ModalityVerdict {
    match ranked.first() {
        Some(top) => image_verdict(&ClassificationSignal::image(top.label.as_str(), top.score)),
        None => ModalityVerdict::unknown_image(),
    }
}

/// Classifier over injected model clients.
///
/// Built once at startup and shared behind an `Arc`; every call is
/// independent and holds no per-call state.
pub struct Classifier {
    sentiment: Arc<dyn SentimentModel>,
    image_labels: Arc<dyn ImageLabelModel>,
    images: Arc<dyn ImageSource>,
    pub(super) image_failure: ImageFailurePolicy,
}

impl Classifier {
    pub fn new(
        sentiment: Arc<dyn SentimentModel>,
        image_labels: Arc<dyn ImageLabelModel>,
        images: Arc<dyn ImageSource>,
    ) -> Self {
        Self {
            sentiment,
            image_labels,
            images,
            image_failure: ImageFailurePolicy::default(),
        }
    }

    /// Choose what `classify_issue` does when the image leg fails but text
    /// was supplied.
    pub fn with_image_failure_policy(mut self, policy: ImageFailurePolicy) -> Self {
        self.image_failure = policy;
        self
    }

    /// Classify one input of the given modality. For images, `input` is a URL.
    pub async fn classify(
        &self,
        modality: Modality,
        input: &str,
    ) -> Result<ModalityVerdict, ClassifyError> {
        match modality {
            Modality::Text => self.classify_text(input).await,
            Modality::Image => self.classify_image(input).await,
        }
    }

    /// Classify free text.
    pub async fn classify_text(&self, text: &str) -> Result<ModalityVerdict, ClassifyError> {
        let output = self
            .sentiment
            .predict(text)
            .await
            .map_err(ClassifyError::Model)?;
        let signal = ClassificationSignal::text(output.label, output.score);
        let verdict = text_verdict(text, &signal);

        debug!(
            severity = %verdict.severity,
            category = %verdict.category,
            label = %verdict.label,
            score = verdict.score,
            text_preview = %truncate_chars(text, 50),
            "Classified text"
        );

        Ok(verdict)
    }

    /// Fetch the image at `image_url` and classify it.
    pub async fn classify_image(&self, image_url: &str) -> Result<ModalityVerdict, ClassifyError> {
        let image = self.images.fetch(image_url).await?;
        let ranked = self
            .image_labels
            .predict(&image)
            .await
            .map_err(ClassifyError::Model)?;
        let verdict = ranked_image_verdict(&ranked);

        debug!(
            severity = %verdict.severity,
            category = %verdict.category,
            label = %verdict.label,
            score = verdict.score,
            candidates = ranked.len(),
            url = %truncate_chars(image_url, 80),
            "Classified image"
        );

        Ok(verdict)
    }
}
