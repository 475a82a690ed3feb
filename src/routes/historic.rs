use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{HistoricContext, HistoricRequest, TARGET_STOCKS};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/historic", get(get_defaults).post(run_historic))
        .route("/stocks", get(list_stocks))
}

/// Initial dashboard context: last three years, nothing selected.
pub async fn get_defaults() -> Json<HistoricContext> {
    info!("GET /api/historic - Default context");
    Json(HistoricContext::with_defaults(Utc::now().date_naive()))
}

pub async fn run_historic(
    State(state): State<AppState>,
    payload: Result<Json<HistoricRequest>, JsonRejection>,
) -> Result<Json<HistoricContext>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("POST /api/historic - Malformed body: {}", rejection.body_text());
        AppError::Validation(rejection.body_text())
    })?;

    info!(
        "POST /api/historic - stocks={:?} start={:?} end={:?}",
        request.stocks, request.start_date, request.end_date
    );

    let output = state.pipeline.run(&request).await;
    if let Some(error) = &output.error {
        warn!("Historic view finished in stage {} with: {}", output.stage, error);
    }

    Ok(Json(HistoricContext::from_output(output, Utc::now().date_naive())))
}

pub async fn list_stocks() -> Json<Vec<&'static str>> {
    Json(TARGET_STOCKS.to_vec())
}
