// System status display: shows the model backend and whether its files
// or credentials are in place.

use crate::config::{Config, ModelBackend};
use crate::models::download;

/// Display system status to the terminal.
pub fn show(config: &Config) {
    println!("Model backend: {}", config.model_backend.as_str());

    match config.model_backend {
        ModelBackend::Onnx => {
            println!("Model directory: {}", config.model_dir.display());
            for path in download::expected_files(&config.model_dir) {
                let state = std::fs::metadata(&path)
                    .map(|m| format_bytes(m.len()))
                    .unwrap_or_else(|_| "missing".to_string());
                println!("  {} ({})", path.display(), state);
            }
            if config.require_models().is_err() {
                println!("\nRun `triage download-model` to fetch the missing files.");
            }
        }
        ModelBackend::Hosted => {
            println!("Inference API: {}", config.inference_url);
            println!("  Text model: {}", config.text_model);
            println!("  Image model: {}", config.image_model);
            if config.hf_api_token.is_empty() {
                println!("  API token: not set (HF_API_TOKEN)");
            } else {
                println!("  API token: set");
            }
        }
    }

    println!("Allowed origin: {}", config.allowed_origin);
    println!("Image fetch timeout: {}s", config.fetch_timeout.as_secs());
    println!(
        "On image failure: {}",
        match config.image_failure {
            crate::classify::ImageFailurePolicy::Partial => "return text-only verdict",
            crate::classify::ImageFailurePolicy::Fail => "fail the request",
        }
    );
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(102 * 1024 * 1024), "102.0 MB");
    }
}
