use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::{
    export::{self, ExportFilter},
    web::{ApiMessage, AppState, json_error},
};

const GPKG_CONTENT_TYPE: &str = "application/geopackage+sqlite3";

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub years: Option<String>,
    pub gemeinden: Option<String>,
}

pub async fn export_dataset(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, (StatusCode, Json<ApiMessage>)> {
    let filter = ExportFilter::parse(params.years.as_deref(), params.gemeinden.as_deref())
        .map_err(|err| {
            error!(?err, "rejected export filter");
            json_error(StatusCode::BAD_REQUEST, "Ungültige Filterparameter.")
        })?;

    let source = state.config().public_dir.join(export::SOURCE_DATASET);
    let payload = export::build_export(source, filter).await.map_err(|err| {
        // Command and SQL details stay in the log; the caller gets a
        // generic failure.
        error!(?err, "export generation failed");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Export konnte nicht erstellt werden.",
        )
    })?;

    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    Ok((
        [
            (header::CONTENT_TYPE, GPKG_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.bytes,
    )
        .into_response())
}
