// POST /combine-scores: the averaged-score severity path.
//
// Takes two already-computed model outputs and returns the combined score.
// No models are called and no keywords are consulted.

use axum::Json;
use serde::Deserialize;

use crate::classify::{combine, ClassificationSignal, CombinedScore};
use crate::models::traits::LabelScore;
use crate::web::Reply;

#[derive(Deserialize)]
pub struct CombineRequest {
    pub text: LabelScore,
    pub image: LabelScore,
}

/// POST /combine-scores: average two confidences into a severity bucket.
pub async fn combine_scores(Json(body): Json<CombineRequest>) -> Reply<CombinedScore> {
    let scores = [body.text.score, body.image.score];
    if let Some(bad) = scores.iter().find(|s| !(0.0..=1.0).contains(*s)) {
        return Reply::error(format!("score {bad} is outside [0, 1]"));
    }

    let text = ClassificationSignal::text(body.text.label, body.text.score);
    let image = ClassificationSignal::image(body.image.label, body.image.score);
    Reply::Result {
        result: combine(&text, &image),
    }
}
