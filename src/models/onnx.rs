// Local ONNX models: DistilBERT SST-2 sentiment and ResNet-50 image labels.
//
// Both run on the local CPU and need no network once the files are
// downloaded.
//
// Sentiment output: 2 logits (NEGATIVE, POSITIVE) → softmax → argmax.
// Image output: 1000 ImageNet logits → softmax → top-5 ranked labels.
// Label names come from each model's config.json `id2label`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::download::{
    image_model_dir, sentiment_model_dir, CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE,
};
use super::traits::{rank, ImageLabelModel, LabelScore, SentimentModel};

/// DistilBERT's position embedding limit.
const MAX_SEQUENCE_LEN: usize = 512;

/// ResNet-50 input edge, after center crop.
const CROP_SIZE: u32 = 224;

/// Shortest edge after resize, before the center crop (224 / 0.875).
const RESIZE_SHORTEST_EDGE: u32 = 256;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// How many ranked labels the image model returns.
const TOP_K: usize = 5;

/// Local sentiment model. Holds the session behind Arc<Mutex> so inference
/// can be offloaded to spawn_blocking without blocking the async runtime.
pub struct OnnxSentimentModel {
    // ort::Session::run takes &mut self, hence the Mutex
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    labels: Arc<Vec<String>>,
}

impl OnnxSentimentModel {
    /// Load the sentiment model from `<model_dir>/sentiment/`.
    ///
    /// Expects `model.onnx`, `tokenizer.json` and `config.json`.
    /// Call `download::download_model()` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let dir = sentiment_model_dir(model_dir);
        let session = load_session(&dir.join(MODEL_FILE))?;

        let tokenizer_path = dir.join(TOKENIZER_FILE);
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `triage download-model` to download it.",
                tokenizer_path.display()
            );
        }
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let labels = load_labels(&dir.join(CONFIG_FILE))?;

        debug!(labels = labels.len(), "Loaded ONNX sentiment model from {}", dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            labels: Arc::new(labels),
        })
    }
}

#[async_trait]
impl SentimentModel for OnnxSentimentModel {
    async fn predict(&self, text: &str) -> Result<LabelScore> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let labels = Arc::clone(&self.labels);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let shape = [1_i64, input_ids.len() as i64];

            let input_ids_tensor = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
                .context("Failed to create attention_mask tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids_tensor,
                        "attention_mask" => attention_mask_tensor
                    })
                    .context("ONNX sentiment inference failed")?;

                // Output shape: [1, num_labels]
                let (_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            let probs = softmax(&logits);
            let (index, score) = argmax(&probs).context("Sentiment model returned no logits")?;
            let result = LabelScore::new(label_for(&labels, index), score);

            debug!(
                label = %result.label,
                score = result.score,
                text_preview = %crate::output::truncate_chars(&text, 50),
                "ONNX sentiment scored text"
            );

            Ok(result)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Local image-label model.
pub struct OnnxImageModel {
    session: Arc<Mutex<Session>>,
    labels: Arc<Vec<String>>,
}

impl OnnxImageModel {
    /// Load the image model from `<model_dir>/image/`.
    ///
    /// Expects `model.onnx` and `config.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let dir = image_model_dir(model_dir);
        let session = load_session(&dir.join(MODEL_FILE))?;
        let labels = load_labels(&dir.join(CONFIG_FILE))?;

        debug!(labels = labels.len(), "Loaded ONNX image model from {}", dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            labels: Arc::new(labels),
        })
    }
}

#[async_trait]
impl ImageLabelModel for OnnxImageModel {
    async fn predict(&self, image: &RgbImage) -> Result<Vec<LabelScore>> {
        let session = Arc::clone(&self.session);
        let labels = Arc::clone(&self.labels);
        let image = image.clone();

        tokio::task::spawn_blocking(move || {
            let pixels = preprocess(&image)?;
            let shape = [1_i64, 3, CROP_SIZE as i64, CROP_SIZE as i64];
            let pixel_tensor = Tensor::from_array((shape, pixels))
                .context("Failed to create pixel_values tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! { "pixel_values" => pixel_tensor })
                    .context("ONNX image inference failed")?;

                // Output shape: [1, 1000]
                let (_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            let ranked = top_k(&softmax(&logits), &labels, TOP_K);

            debug!(
                top_label = ranked.first().map(|l| l.label.as_str()).unwrap_or(""),
                top_score = ranked.first().map(|l| l.score).unwrap_or(0.0),
                "ONNX image labelled"
            );

            Ok(ranked)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

fn load_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!(
            "Model file not found: {}\nRun `triage download-model` to download it.",
            model_path.display()
        );
    }

    Session::builder()
        .context("Failed to create ONNX session builder")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
}

fn load_labels(config_path: &Path) -> Result<Vec<String>> {
    let json = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    parse_id2label(&json).with_context(|| format!("Invalid model config {}", config_path.display()))
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: BTreeMap<String, String>,
}

/// Turn a HF config.json `id2label` map into a label vector indexed by id.
fn parse_id2label(json: &str) -> Result<Vec<String>> {
    let config: ModelConfig = serde_json::from_str(json).context("Missing id2label")?;

    let mut indexed: Vec<(usize, String)> = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|id| (id, label))
                .with_context(|| format!("Non-numeric label id: {id}"))
        })
        .collect::<Result<_>>()?;
    indexed.sort_by_key(|(id, _)| *id);

    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

fn label_for(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("LABEL_{index}"))
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn argmax(probs: &[f64]) -> Option<(usize, f64)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}

fn top_k(probs: &[f64], labels: &[String], k: usize) -> Vec<LabelScore> {
    let mut ranked: Vec<LabelScore> = probs
        .iter()
        .enumerate()
        .map(|(i, &p)| LabelScore::new(label_for(labels, i), p))
        .collect();
    rank(&mut ranked);
    ranked.truncate(k);
    ranked
}

/// Center-crop the square a 256 shortest-edge resize would leave at 224,
/// resize it to 224x224, scale to [0, 1] and apply ImageNet normalization.
/// Cropping happens in source coordinates so the resize never exceeds
/// 224x224 whatever the aspect ratio. Returns CHW planar f32 data.
fn preprocess(image: &RgbImage) -> Result<Vec<f32>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("Image has zero size ({width}x{height})");
    }

    let shortest = width.min(height) as u64;
    let side = ((shortest * CROP_SIZE as u64) / RESIZE_SHORTEST_EDGE as u64).max(1) as u32;
    let left = (width - side) / 2;
    let top = (height - side) / 2;
    let square = imageops::crop_imm(image, left, top, side, side).to_image();
    let cropped = imageops::resize(&square, CROP_SIZE, CROP_SIZE, FilterType::Triangle);

    let plane = (CROP_SIZE * CROP_SIZE) as usize;
    let mut data = vec![0.0_f32; 3 * plane];
    for (x, y, pixel) in cropped.enumerate_pixels() {
        let offset = (y * CROP_SIZE + x) as usize;
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            data[c * plane + offset] = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    Ok(data)
}
