// Hugging Face Inference API implementations.
//
// Same two models as the local backend, served remotely. Useful when the
// host can't run ONNX Runtime or the model files aren't downloaded. Needs
// an API token (HF_API_TOKEN) and is rate limited per client.
//
// API docs: https://huggingface.co/docs/api-inference

use std::io::Cursor;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{rank, ImageLabelModel, LabelScore, SentimentModel};

/// Default Inference API base URL. The model id is appended.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";

/// Requests per second per client.
const HOSTED_RATE_LIMIT: f64 = 5.0;

/// One model endpoint on the Inference API.
struct InferenceEndpoint {
    client: Client,
    url: String,
    api_token: String,
    rate_limiter: RateLimiter,
}

impl InferenceEndpoint {
    fn new(base_url: &str, model: &str, api_token: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("triage/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: format!("{}/{}", base_url.trim_end_matches('/'), model),
            api_token: api_token.to_string(),
            rate_limiter: RateLimiter::new(HOSTED_RATE_LIMIT),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        self.rate_limiter.acquire().await;

        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .with_context(|| format!("Failed to call inference API at {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Inference API returned {}: {}", status, body);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse inference API response")
    }
}

/// Hosted text sentiment model.
pub struct HostedSentimentModel {
    endpoint: InferenceEndpoint,
}

impl HostedSentimentModel {
    pub fn new(base_url: &str, model: &str, api_token: &str) -> Result<Self> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, model, api_token)?,
        })
    }
}

#[async_trait]
impl SentimentModel for HostedSentimentModel {
    async fn predict(&self, text: &str) -> Result<LabelScore> {
        let body = TextRequest {
            inputs: text,
            options: RequestOptions {
                wait_for_model: true,
            },
        };
        let request = self.endpoint.client.post(&self.endpoint.url).json(&body);
        let response: TextResponse = self.endpoint.send(request).await?;

        let best = top_label(response.into_flat())?;
        debug!(
            label = %best.label,
            score = best.score,
            text_preview = %crate::output::truncate_chars(text, 50),
            "Hosted sentiment scored text"
        );
        Ok(best)
    }
}

/// Hosted image-label model. Images are re-encoded as PNG for upload.
pub struct HostedImageModel {
    endpoint: InferenceEndpoint,
}

impl HostedImageModel {
    pub fn new(base_url: &str, model: &str, api_token: &str) -> Result<Self> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, model, api_token)?,
        })
    }
}

#[async_trait]
impl ImageLabelModel for HostedImageModel {
    async fn predict(&self, image: &RgbImage) -> Result<Vec<LabelScore>> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("Failed to encode image as PNG")?;

        let request = self
            .endpoint
            .client
            .post(&self.endpoint.url)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .header("x-wait-for-model", "true")
            .body(png);
        let mut labels: Vec<LabelScore> = self.endpoint.send(request).await?;
        rank(&mut labels);

        debug!(
            candidates = labels.len(),
            top_label = labels.first().map(|l| l.label.as_str()).unwrap_or(""),
            "Hosted image labelled"
        );
        Ok(labels)
    }
}

/// Highest-scoring label from a sentiment response.
fn top_label(labels: Vec<LabelScore>) -> Result<LabelScore> {
    labels
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .context("Inference API returned no sentiment labels")
}

// --- Inference API request/response types ---

#[derive(Serialize)]
struct TextRequest<'a> {
    inputs: &'a str,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// Text classification comes back nested one level per input, but some
/// deployments return the flat list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl TextResponse {
    fn into_flat(self) -> Vec<LabelScore> {
        match self {
            TextResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            TextResponse::Flat(labels) => labels,
        }
    }
}
