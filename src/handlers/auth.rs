use std::sync::Arc;

use axum::{extract::State, response::Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ckan::CkanError;
use crate::error::ApiError;
use crate::session::{self, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - Verify credentials against CKAN and set the
/// session cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let username = body.username.as_deref().unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let record = match state.ckan.verify_credentials(username, password).await {
        Ok(record) => record,
        Err(err @ CkanError::UrlNotConfigured) => return Err(err.into()),
        Err(err) => {
            // Remote rejection and transport failure both read as bad credentials
            tracing::debug!("credential check for {} failed: {}", username, err);
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let token = session::encode_session(&record, &state.config.session_secret)?;
    let cookie = session::session_cookie(token, state.config.environment.is_production());

    Ok((
        jar.add(cookie),
        Json(json!({
            "success": true,
            "user": record,
            "message": "Login successful",
        })),
    ))
}

/// GET /api/auth/me - Decode the session cookie back into the session record
pub async fn me(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let record = session::decode_session(cookie.value(), &state.config.session_secret)
        .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

    Ok(Json(json!({ "success": true, "user": record })))
}
