use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use triage::classify::{self, ClassificationSignal, Classifier};
use triage::config::{Config, ModelBackend};
use triage::fetch::HttpImageSource;
use triage::models::hosted::{HostedImageModel, HostedSentimentModel};
use triage::models::onnx::{OnnxImageModel, OnnxSentimentModel};
use triage::models::traits::{ImageLabelModel, SentimentModel};
use triage::output::terminal;

/// Triage: severity and category classification for civic issue reports.
///
/// Classifies a reported issue from free text, an image URL, or both.
#[derive(Parser)]
#[command(name = "triage", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 7860)
        #[arg(long, default_value = "7860")]
        port: u16,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Classify one issue from the command line
    Classify {
        /// Free-text description of the issue
        #[arg(long)]
        text: Option<String>,

        /// URL of a photo of the issue
        #[arg(long)]
        image_url: Option<String>,

        /// Print the verdict as JSON instead of a colored summary
        #[arg(long)]
        json: bool,
    },

    /// Combine two model confidences into a severity (no models, no keywords)
    Combine {
        /// Text model confidence (0-1)
        text_score: f64,

        /// Image model confidence (0-1)
        image_score: f64,

        /// Text model label, carried along for the record
        #[arg(long, default_value = "NEGATIVE")]
        text_label: String,

        /// Image model label, carried along for the record
        #[arg(long, default_value = "Unknown")]
        image_label: String,
    },

    /// Download the ONNX sentiment and image models (~170 MB)
    DownloadModel,

    /// Show model backend and configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("triage=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_models()?;
            let classifier = build_classifier(&config)?;
            triage::web::run_server(classifier, &config.allowed_origin, port, &bind).await?;
        }

        Commands::Classify {
            text,
            image_url,
            json,
        } => {
            if text.is_none() && image_url.is_none() {
                anyhow::bail!("Provide at least --text or --image-url");
            }

            let config = Config::load()?;
            config.require_models()?;
            let classifier = build_classifier(&config)?;

            match (text.as_deref(), image_url.as_deref()) {
                (Some(text), None) => {
                    let verdict = classifier.classify_text(text).await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&verdict)?);
                    } else {
                        terminal::display_modality_verdict("Text Verdict", &verdict);
                    }
                }
                (None, Some(url)) => {
                    let verdict = classifier.classify_image(url).await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&verdict)?);
                    } else {
                        terminal::display_modality_verdict("Image Verdict", &verdict);
                    }
                }
                (text, image_url) => {
                    let verdict = classifier.classify_issue(text, image_url).await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&verdict)?);
                    } else {
                        terminal::display_issue_verdict(&verdict);
                    }
                }
            }
        }

        Commands::Combine {
            text_score,
            image_score,
            text_label,
            image_label,
        } => {
            for score in [text_score, image_score] {
                if !(0.0..=1.0).contains(&score) {
                    anyhow::bail!("Scores must be between 0 and 1, got {score}");
                }
            }
            let result = classify::combine(
                &ClassificationSignal::text(text_label, text_score),
                &ClassificationSignal::image(image_label, image_score),
            );
            terminal::display_combined_score(&result);
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX models...");
            println!("  Destination: {}", model_dir.display());

            triage::models::download::download_model(model_dir).await?;

            println!("\n{}", "Models downloaded successfully.".bold());
            println!("You can now run `triage serve` or `triage classify --text \"...\"`.");
        }

        Commands::Status => {
            let config = Config::load()?;
            triage::status::show(&config);
        }
    }

    Ok(())
}

/// Build the model clients for the configured backend. Called once at startup.
fn create_models(config: &Config) -> Result<(Arc<dyn SentimentModel>, Arc<dyn ImageLabelModel>)> {
    match config.model_backend {
        ModelBackend::Onnx => {
            info!("Using local ONNX models");
            let sentiment: Arc<dyn SentimentModel> =
                Arc::new(OnnxSentimentModel::load(&config.model_dir)?);
            let image: Arc<dyn ImageLabelModel> =
                Arc::new(OnnxImageModel::load(&config.model_dir)?);
            Ok((sentiment, image))
        }
        ModelBackend::Hosted => {
            info!(
                text_model = %config.text_model,
                image_model = %config.image_model,
                "Using hosted Inference API models"
            );
            let sentiment: Arc<dyn SentimentModel> = Arc::new(HostedSentimentModel::new(
                &config.inference_url,
                &config.text_model,
                &config.hf_api_token,
            )?);
            let image: Arc<dyn ImageLabelModel> = Arc::new(HostedImageModel::new(
                &config.inference_url,
                &config.image_model,
                &config.hf_api_token,
            )?);
            Ok((sentiment, image))
        }
    }
}

fn build_classifier(config: &Config) -> Result<Classifier> {
    let (sentiment, image) = create_models(config)?;
    let images = HttpImageSource::new(config.fetch_timeout)?;
    Ok(Classifier::new(sentiment, image, Arc::new(images))
        .with_image_failure_policy(config.image_failure))
}
