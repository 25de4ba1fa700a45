// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member account routes: sign-up, login, logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::api_key::require_anon_key;
use crate::middleware::auth::SESSION_COOKIE;
use crate::routes::json_body;
use crate::services::{LoginRequest, Session, SignupRequest};
use crate::AppState;

/// Sign-up and login need the public client key; logout does not.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let keyed = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(state, require_anon_key));

    Router::new()
        .merge(keyed)
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub user_id: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Session cookie for browser clients; API clients use the returned token.
fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

fn session_response(
    state: &AppState,
    jar: CookieJar,
    session: Session,
) -> (CookieJar, Json<SessionResponse>) {
    let secure = state.config.frontend_url.starts_with("https://");
    let jar = jar.add(session_cookie(session.access_token.clone(), secure));
    (
        jar,
        Json(SessionResponse {
            success: true,
            user_id: session.user.user_id,
            access_token: session.access_token,
        }),
    )
}

async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let request = json_body(payload)?;
    let session = state.identity.signup(&request).await?;
    Ok(session_response(&state, jar, session))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let request = json_body(payload)?;
    let session = state.identity.login(&request).await?;
    Ok(session_response(&state, jar, session))
}

/// Clear the session cookie. Bearer-token clients just drop their token.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.remove(
        Cookie::build(SESSION_COOKIE)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    );
    (jar, Json(LogoutResponse { success: true }))
}
