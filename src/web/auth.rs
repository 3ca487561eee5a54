use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use tracing::debug;

use crate::web::{AppState, templates};

pub const SESSION_COOKIE: &str = "session";

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

pub async fn login_page() -> Html<String> {
    Html(templates::render_login_page(false))
}

pub async fn process_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.credentials().verify(&form.password) {
        // Wrong password re-renders the form with the error banner visible.
        return Html(templates::render_login_page(true)).into_response();
    }

    let token = state.sessions().create().await;
    let secure = connection_is_tls(&state, &headers);
    debug!(token = %&token[..8], secure, "created session");

    let jar = jar.add(session_cookie(&state, token, secure));
    (jar, Redirect::to("/")).into_response()
}

/// The service faces plain HTTP in development and a TLS-terminating proxy
/// in production. Only a proxy the deployment explicitly trusts may claim
/// the connection is secure.
fn connection_is_tls(state: &AppState, headers: &HeaderMap) -> bool {
    state.config().trust_forwarded_proto
        && headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn session_cookie(state: &AppState, token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(if secure { SameSite::None } else { SameSite::Lax });
    cookie.set_max_age(CookieDuration::hours(state.config().session_ttl_hours));
    cookie
}
