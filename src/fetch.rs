// Image acquisition: fetch an image by URL and decode it to RGB.
//
// Failures are typed so the merger can tell "image failed" apart from
// "no image given" and decide whether a text-only verdict still goes out.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;
use tracing::debug;

/// Why an image could not be acquired.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, timeout or body read failure.
    #[error("failed to fetch image from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("image request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not a decodable image.
    #[error("failed to decode image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Source of decoded images, keyed by URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RgbImage, FetchError>;
}

/// Plain HTTP(S) GET image source.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("triage/0.1 (issue-image-fetch)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<RgbImage, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        debug!(url = url, bytes = bytes.len(), "Fetched image");

        decode_rgb(url, &bytes)
    }
}

/// Decode image bytes of any supported format into RGB8.
pub fn decode_rgb(url: &str, bytes: &[u8]) -> Result<RgbImage, FetchError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
}
