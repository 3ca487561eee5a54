use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::web::{AppState, auth, export, pipeline, policy};

pub fn build_router(state: AppState) -> Router {
    let public_dir = state.config().public_dir.clone();
    let data_dir = state.config().data_dir.clone();

    let protected = Router::new()
        .route("/api/status", get(pipeline::pipeline_status))
        .route("/api/start-pipeline", post(pipeline::start_pipeline))
        .route("/api/pipeline-log", get(pipeline::pipeline_log))
        .route("/api/export", get(export::export_dataset))
        .nest_service("/data", ServeDir::new(&data_dir))
        .fallback_service(ServeDir::new(&public_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            policy::enforce_session,
        ));

    Router::new()
        .route("/login", get(auth::login_page).post(auth::process_login))
        // SEO and social-preview files stay reachable without a session.
        .route_service("/robots.txt", ServeFile::new(public_dir.join("robots.txt")))
        .route_service("/sitemap.xml", ServeFile::new(public_dir.join("sitemap.xml")))
        .route_service("/og-image.png", ServeFile::new(public_dir.join("og-image.png")))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
