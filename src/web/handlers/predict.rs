// Prediction handlers.
//
// POST /predict-text   { text }                 -> text-only verdict
// POST /predict-image  { image_url }            -> image-only verdict
// POST /predict-issue  { text?, image_url? }    -> merged verdict
//
// Empty strings are treated as absent, so `{"text": ""}` on /predict-issue
// is the same as `{}`.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::classify::{IssueVerdict, ModalityVerdict};
use crate::web::{AppState, Reply};

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct ImageRequest {
    pub image_url: String,
}

#[derive(Deserialize, Default)]
pub struct IssueRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// POST /predict-text: severity and category from text only.
pub async fn predict_text(
    State(state): State<AppState>,
    Json(body): Json<TextRequest>,
) -> Reply<ModalityVerdict> {
    state.classifier.classify_text(&body.text).await.into()
}

/// POST /predict-image: severity and category from an image URL only.
pub async fn predict_image(
    State(state): State<AppState>,
    Json(body): Json<ImageRequest>,
) -> Reply<ModalityVerdict> {
    state.classifier.classify_image(&body.image_url).await.into()
}

/// POST /predict-issue: severity and category from text and/or image.
pub async fn predict_issue(
    State(state): State<AppState>,
    Json(body): Json<IssueRequest>,
) -> Reply<IssueVerdict> {
    state
        .classifier
        .classify_issue(body.text.as_deref(), body.image_url.as_deref())
        .await
        .into()
}
