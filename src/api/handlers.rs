use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde::Serialize;
use tracing::error;

use crate::api::{page, state::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
    pub rows: usize,
    pub classes: usize,
}

fn random_prediction_page(
    state: &AppState,
) -> std::result::Result<Html<String>, (StatusCode, String)> {
    match state.predictor.predict_random() {
        Ok(prediction) => Ok(Html(page::render(&prediction))),
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ))
        }
    }
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
) -> std::result::Result<Html<String>, (StatusCode, String)> {
    random_prediction_page(&state)
}

/// GET /refresh
pub async fn refresh(
    State(state): State<AppState>,
) -> std::result::Result<Html<String>, (StatusCode, String)> {
    random_prediction_page(&state)
}

/// GET /healthz -- liveness probe
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let ctx = state.predictor.context();
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_seconds(),
        rows: ctx.dataset.len(),
        classes: ctx.network.output_size(),
    })
}
