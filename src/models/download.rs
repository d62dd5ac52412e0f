// Model download helper for the local ONNX backend.
//
// Downloads two models from HuggingFace:
// 1. DistilBERT fine-tuned on SST-2: text sentiment (~67MB quantized)
// 2. ResNet-50: ImageNet image labels (~102MB)
//
// Files are stored in a platform-appropriate directory
// (~/.local/share/triage/models/ on Linux) so they persist across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo with the ONNX export of the sentiment model.
const SENTIMENT_HF_URL: &str =
    "https://huggingface.co/Xenova/distilbert-base-uncased-finetuned-sst-2-english/resolve/main";

/// HuggingFace repo with the ONNX export of the image model.
const IMAGE_HF_URL: &str = "https://huggingface.co/Xenova/resnet-50/resolve/main";

/// Local file names shared by both model directories.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// A file to fetch: where it lives in the HF repo, what we call it locally.
struct RemoteFile {
    remote: &'static str,
    local: &'static str,
    /// Shown next to the file name; also turns on the progress bar
    size_hint: Option<&'static str>,
}

const SENTIMENT_FILES: [RemoteFile; 3] = [
    RemoteFile {
        remote: "config.json",
        local: CONFIG_FILE,
        size_hint: None,
    },
    RemoteFile {
        remote: "tokenizer.json",
        local: TOKENIZER_FILE,
        size_hint: None,
    },
    RemoteFile {
        remote: "onnx/model_quantized.onnx",
        local: MODEL_FILE,
        size_hint: Some("~67 MB"),
    },
];

const IMAGE_FILES: [RemoteFile; 2] = [
    RemoteFile {
        remote: "config.json",
        local: CONFIG_FILE,
        size_hint: None,
    },
    RemoteFile {
        remote: "onnx/model.onnx",
        local: MODEL_FILE,
        size_hint: Some("~102 MB"),
    },
];

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/triage/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("triage")
        .join("models")
}

/// Subdirectory within model_dir for the sentiment model.
pub fn sentiment_model_dir(base: &Path) -> PathBuf {
    base.join("sentiment")
}

/// Subdirectory within model_dir for the image model.
pub fn image_model_dir(base: &Path) -> PathBuf {
    base.join("image")
}

/// Check whether all sentiment model files exist.
pub fn sentiment_files_present(base: &Path) -> bool {
    files_present(&sentiment_model_dir(base), &SENTIMENT_FILES)
}

/// Check whether all image model files exist.
pub fn image_files_present(base: &Path) -> bool {
    files_present(&image_model_dir(base), &IMAGE_FILES)
}

fn files_present(dir: &Path, files: &[RemoteFile]) -> bool {
    files.iter().all(|f| dir.join(f.local).exists())
}

/// Local paths of every model file, for status display.
pub fn expected_files(base: &Path) -> Vec<PathBuf> {
    let sentiment = sentiment_model_dir(base);
    let image = image_model_dir(base);
    SENTIMENT_FILES
        .iter()
        .map(|f| sentiment.join(f.local))
        .chain(IMAGE_FILES.iter().map(|f| image.join(f.local)))
        .collect()
}

/// Download both ONNX models (sentiment + image).
///
/// Shows progress bars for large files. Skips files that already exist.
/// Creates directories as needed.
pub async fn download_model(dir: &Path) -> Result<()> {
    println!("\nSentiment model (distilbert-base-uncased-finetuned-sst-2-english):");
    download_set(SENTIMENT_HF_URL, &sentiment_model_dir(dir), &SENTIMENT_FILES).await?;

    println!("\nImage model (resnet-50):");
    download_set(IMAGE_HF_URL, &image_model_dir(dir), &IMAGE_FILES).await?;

    Ok(())
}

async fn download_set(base_url: &str, dir: &Path, files: &[RemoteFile]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    for file in files {
        let dest = dir.join(file.local);
        if dest.exists() {
            info!(file = file.local, dir = %dir.display(), "Model file already exists, skipping");
            println!("  {} (already exists)", file.local);
            continue;
        }

        match file.size_hint {
            Some(size) => println!("  Downloading {} ({size})...", file.local),
            None => println!("  Downloading {}...", file.local),
        }
        download_file(
            &format!("{}/{}", base_url, file.remote),
            &dest,
            file.size_hint.is_some(),
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        Some(progress_bar(response.content_length()))
    } else {
        None
    };

    let mut bytes: Vec<u8> = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        bytes.extend_from_slice(&chunk);
        if let Some(ref pb) = pb {
            pb.set_position(bytes.len() as u64);
        }
    }

    // Write to a temp name first so an interrupted download never looks complete
    let partial = dest.with_extension("part");
    std::fs::write(&partial, &bytes)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

fn progress_bar(total_size: Option<u64>) -> ProgressBar {
    match total_size {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_triage() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("triage") && path_str.contains("models"),
            "Expected path containing triage/models, got: {path_str}"
        );
    }

    #[test]
    fn test_model_subdirectories() {
        let base = PathBuf::from("/tmp/test-models");
        assert_eq!(sentiment_model_dir(&base), base.join("sentiment"));
        assert_eq!(image_model_dir(&base), base.join("image"));
    }

    #[test]
    fn test_files_present_false_when_empty() {
        let dir = std::env::temp_dir().join("triage-test-nonexistent");
        assert!(!sentiment_files_present(&dir));
        assert!(!image_files_present(&dir));
    }

    #[test]
    fn test_image_files_present_true_when_files_exist() {
        let dir = std::env::temp_dir().join("triage-image-model-test");
        let image_dir = image_model_dir(&dir);
        std::fs::create_dir_all(&image_dir).unwrap();
        std::fs::write(image_dir.join(MODEL_FILE), b"fake").unwrap();
        std::fs::write(image_dir.join(CONFIG_FILE), b"{}").unwrap();

        assert!(image_files_present(&dir));
        // Sentiment files were never written
        assert!(!sentiment_files_present(&dir));

        // Cleanup
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_expected_files_lists_both_models() {
        let base = PathBuf::from("/models");
        let files = expected_files(&base);
        assert_eq!(files.len(), 5);
        assert!(files.contains(&base.join("sentiment").join(TOKENIZER_FILE)));
        assert!(files.contains(&base.join("image").join(MODEL_FILE)));
    }
}
