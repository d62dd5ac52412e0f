use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::classify::ImageFailurePolicy;
use crate::models::download;
use crate::models::hosted::DEFAULT_INFERENCE_URL;

/// Default origin allowed by CORS (the Vite dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub const DEFAULT_TEXT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_IMAGE_MODEL: &str = "microsoft/resnet-50";

/// Which model backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelBackend {
    /// Local ONNX models (default), no API token needed
    Onnx,
    /// Hugging Face Inference API: requires HF_API_TOKEN
    Hosted,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::Onnx => "onnx",
            ModelBackend::Hosted => "hosted",
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars (never hardcoded). The .env file is loaded
/// automatically at startup via dotenvy.
pub struct Config {
    /// Which model backend to use (default: Onnx)
    pub model_backend: ModelBackend,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Hugging Face API token for the hosted backend
    pub hf_api_token: String,
    /// Inference API base URL; the model id is appended
    pub inference_url: String,
    /// Hosted text model id
    pub text_model: String,
    /// Hosted image model id
    pub image_model: String,
    /// Single origin allowed to call the API from a browser
    pub allowed_origin: String,
    /// Timeout for fetching an image by URL
    pub fetch_timeout: Duration,
    /// What to do when the image leg of a combined request fails
    pub image_failure: ImageFailurePolicy,
}

impl Config {
    /// Load configuration from environment variables. Everything has a
    /// default; `require_models` checks the chosen backend is usable.
    pub fn load() -> Result<Self> {
        let model_backend = match env::var("TRIAGE_MODEL_BACKEND").as_deref() {
            Ok("hosted") => ModelBackend::Hosted,
            Ok("onnx") | Err(_) => ModelBackend::Onnx,
            Ok(other) => anyhow::bail!(
                "Unknown TRIAGE_MODEL_BACKEND '{other}' (expected 'onnx' or 'hosted')"
            ),
        };

        let model_dir = env::var("TRIAGE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        let fetch_timeout = match env::var("TRIAGE_FETCH_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("TRIAGE_FETCH_TIMEOUT_SECS must be a whole number, got '{raw}'")
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(15),
        };

        let image_failure = match env::var("TRIAGE_IMAGE_FAILURE") {
            Ok(raw) => ImageFailurePolicy::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("Unknown TRIAGE_IMAGE_FAILURE '{raw}' (expected 'partial' or 'fail')")
            })?,
            Err(_) => ImageFailurePolicy::default(),
        };

        Ok(Self {
            model_backend,
            model_dir,
            hf_api_token: env::var("HF_API_TOKEN").unwrap_or_default(),
            inference_url: env::var("HF_INFERENCE_URL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string()),
            text_model: env::var("TRIAGE_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: env::var("TRIAGE_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            allowed_origin: env::var("TRIAGE_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string()),
            fetch_timeout,
            image_failure,
        })
    }

    /// Check that the HF API token is configured.
    pub fn require_hf_token(&self) -> Result<()> {
        if self.hf_api_token.is_empty() {
            anyhow::bail!(
                "HF_API_TOKEN not set. Add it to your .env file \
                 or export it before running with TRIAGE_MODEL_BACKEND=hosted."
            );
        }
        Ok(())
    }

    /// Validate that the chosen model backend has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    /// For Hosted: API token must be set.
    pub fn require_models(&self) -> Result<()> {
        match self.model_backend {
            ModelBackend::Onnx => {
                if !download::sentiment_files_present(&self.model_dir)
                    || !download::image_files_present(&self.model_dir)
                {
                    anyhow::bail!(
                        "ONNX model files not found in {}\n\
                         Run `triage download-model` to download them.\n\
                         Or set TRIAGE_MODEL_BACKEND=hosted to use the Inference API instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ModelBackend::Hosted => self.require_hf_token(),
        }
    }
}
