use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{supervisor::StartOutcome, web::AppState};

#[derive(Debug, Serialize)]
pub struct PipelineReply {
    status: &'static str,
    message: &'static str,
}

fn not_started_reply() -> PipelineReply {
    PipelineReply {
        status: "not_started",
        message: "Processing pipeline has not been run yet",
    }
}

/// Relays the status artifact verbatim; the pipeline owns its shape.
pub async fn pipeline_status(State(state): State<AppState>) -> Response {
    match state.supervisor().read_status().await {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        None => Json(not_started_reply()).into_response(),
    }
}

pub async fn start_pipeline(State(state): State<AppState>) -> Json<PipelineReply> {
    match state.supervisor().start().await {
        StartOutcome::Started => Json(PipelineReply {
            status: "started",
            message: "Processing pipeline started",
        }),
        StartOutcome::AlreadyRunning => Json(PipelineReply {
            status: "already_running",
            message: "Pipeline is already running",
        }),
    }
}

#[derive(Debug, Serialize)]
struct LogReply {
    log: &'static str,
}

pub async fn pipeline_log(State(state): State<AppState>) -> Response {
    match state.supervisor().read_log().await {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            bytes,
        )
            .into_response(),
        None => Json(LogReply {
            log: "No log file found",
        })
        .into_response(),
    }
}
