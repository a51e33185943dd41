use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CoreConfig;
use crate::ml::Predictor;
use crate::predict::{self, DOWNLOAD_FILE_NAME};
use crate::telemetry::{StatsSnapshot, SystemHealth, TelemetryStore};
use crate::types::{form_schema, FeatureRecord, FieldSchema};

#[derive(Clone)]
pub struct ApiState {
    pub model: Arc<dyn Predictor + Send + Sync>,
    pub telemetry: Arc<TelemetryStore>,
    pub config: Arc<CoreConfig>,
}

#[derive(Debug, Serialize)]
struct ApiStatus {
    status: &'static str,
    stats: StatsSnapshot,
    health: SystemHealth,
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    columns: Vec<&'static str>,
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    status: &'static str,
    /// The assembled record, echoed back so the host can show what was
    /// actually scored.
    record: FeatureRecord,
    label: String,
    confidence: f32,
    message: String,
}

#[derive(Debug, Serialize)]
struct BatchPreviewResponse {
    status: &'static str,
    row_count: usize,
    columns: Vec<String>,
    preview: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

pub async fn serve(addr: String, state: ApiState) -> Result<(), Box<dyn std::error::Error>> {
    let upload_limit = state.config.max_upload_bytes;

    let app = Router::new()
        .route("/api/schema", get(schema))
        .route("/api/predict", post(predict_single))
        .route("/api/batch", post(predict_batch))
        .route("/api/batch/preview", post(batch_preview))
        .route("/api/status", get(status))
        .with_state(state)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors_layer());

    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn schema(State(_state): State<ApiState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        columns: FeatureRecord::COLUMNS.to_vec(),
        fields: form_schema(),
    })
}

async fn predict_single(
    State(state): State<ApiState>,
    Json(record): Json<FeatureRecord>,
) -> Response {
    let record = record.normalized();
    if state.config.log_requests {
        log::info!("single prediction requested");
    }

    match predict::single_prediction(state.model.as_ref(), &record) {
        Ok(outcome) => {
            state.telemetry.record_single().await;
            (
                StatusCode::OK,
                Json(PredictResponse {
                    status: "ok",
                    record,
                    label: outcome.label,
                    confidence: outcome.confidence,
                    message: outcome.message,
                }),
            )
                .into_response()
        }
        Err(error) => {
            state.telemetry.record_failure().await;
            log::warn!("single prediction failed: {}", error);
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Prediction failed: {}", error),
            )
        }
    }
}

async fn predict_batch(State(state): State<ApiState>, body: Bytes) -> Response {
    if state.config.log_requests {
        log::info!("batch prediction requested ({} bytes)", body.len());
    }

    match predict::batch_prediction(state.model.as_ref(), &body, state.config.preview_rows) {
        Ok(outcome) => {
            state.telemetry.record_batch(outcome.row_count as u64).await;
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                    ),
                ],
                outcome.csv,
            )
                .into_response()
        }
        Err(error) => {
            state.telemetry.record_failure().await;
            log::warn!("batch prediction failed: {}", error);
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to process batch file: {}", error),
            )
        }
    }
}

async fn batch_preview(State(state): State<ApiState>, body: Bytes) -> Response {
    match predict::batch_prediction(state.model.as_ref(), &body, state.config.preview_rows) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(BatchPreviewResponse {
                status: "ok",
                row_count: outcome.row_count,
                columns: outcome.columns,
                preview: outcome.preview,
            }),
        )
            .into_response(),
        Err(error) => {
            state.telemetry.record_failure().await;
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to process batch file: {}", error),
            )
        }
    }
}

async fn status(State(state): State<ApiState>) -> Json<ApiStatus> {
    let stats = state.telemetry.snapshot_stats().await;
    let health = state.telemetry.health_snapshot().await;

    Json(ApiStatus {
        status: "ready",
        stats,
        health,
    })
}

fn error_response(code: StatusCode, message: String) -> Response {
    (
        code,
        Json(ErrorResponse {
            status: "error",
            message,
        }),
    )
        .into_response()
}

fn cors_layer() -> CorsLayer {
    let allowed = std::env::var("PAYGRADE_CORS_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let mut cors = if allowed.trim() == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = allowed
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    cors = cors.allow_methods([Method::GET, Method::POST]);
    cors.allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
