use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::web::{AppState, auth, json_error};

/// Access-control strategy for everything behind the login wall. `Disabled`
/// keeps the dashboard public without leaving dead gating code around;
/// flipping the policy back on is a configuration change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessPolicy {
    Enforced,
    Disabled,
}

impl AccessPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enforced" => Some(Self::Enforced),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

pub async fn enforce_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if state.config().access_policy == AccessPolicy::Disabled {
        return next.run(request).await;
    }

    let authenticated = match jar.get(auth::SESSION_COOKIE) {
        Some(cookie) => state.sessions().is_valid(cookie.value()).await,
        None => false,
    };

    if authenticated {
        return next.run(request).await;
    }

    if request.uri().path().starts_with("/api/") {
        json_error(StatusCode::UNAUTHORIZED, "Anmeldung erforderlich.").into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}
