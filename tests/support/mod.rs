// Fixed-output model clients and image sources shared by the integration
// tests. None of them touch the network or load a model.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;

use triage::classify::Classifier;
use triage::fetch::{FetchError, ImageSource};
use triage::models::traits::{ImageLabelModel, LabelScore, SentimentModel};

/// Sentiment model that always returns the same output and counts calls.
pub struct FixedSentiment {
    pub output: LabelScore,
    pub calls: AtomicUsize,
}

impl FixedSentiment {
    pub fn new(label: &str, score: f64) -> Self {
        Self {
            output: LabelScore::new(label, score),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SentimentModel for FixedSentiment {
    async fn predict(&self, _text: &str) -> Result<LabelScore> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Image model that always returns the same ranked labels.
pub struct FixedLabels {
    pub ranked: Vec<LabelScore>,
    pub calls: AtomicUsize,
}

impl FixedLabels {
    pub fn new(ranked: &[(&str, f64)]) -> Self {
        Self {
            ranked: ranked
                .iter()
                .map(|(label, score)| LabelScore::new(*label, *score))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageLabelModel for FixedLabels {
    async fn predict(&self, _image: &RgbImage) -> Result<Vec<LabelScore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ranked.clone())
    }
}

/// Model that always fails.
pub struct BrokenModel;

#[async_trait]
impl SentimentModel for BrokenModel {
    async fn predict(&self, _text: &str) -> Result<LabelScore> {
        anyhow::bail!("model offline")
    }
}

/// Image source that hands back a tiny blank image for any URL.
pub struct BlankImages;

#[async_trait]
impl ImageSource for BlankImages {
    async fn fetch(&self, _url: &str) -> Result<RgbImage, FetchError> {
        Ok(RgbImage::new(2, 2))
    }
}

/// Image source where every URL is a 404.
pub struct MissingImages;

#[async_trait]
impl ImageSource for MissingImages {
    async fn fetch(&self, url: &str) -> Result<RgbImage, FetchError> {
        Err(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Classifier over a fixed sentiment output and fixed image labels.
pub fn classifier(sentiment: (&str, f64), labels: &[(&str, f64)]) -> Classifier {
    Classifier::new(
        Arc::new(FixedSentiment::new(sentiment.0, sentiment.1)),
        Arc::new(FixedLabels::new(labels)),
        Arc::new(BlankImages),
    )
}

/// Classifier whose image URLs all fail to fetch.
pub fn classifier_with_missing_images(sentiment: (&str, f64)) -> Classifier {
    Classifier::new(
        Arc::new(FixedSentiment::new(sentiment.0, sentiment.1)),
        Arc::new(FixedLabels::new(&[])),
        Arc::new(MissingImages),
    )
}
