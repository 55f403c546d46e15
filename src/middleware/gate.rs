use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::session::SESSION_COOKIE;

const LOGIN_PATH: &str = "/login";
const DASHBOARD_PATH: &str = "/dashboard";

/// Access gate evaluated on every request from path + cookie presence alone.
///
/// The cookie is never decoded here: a malformed but present cookie still
/// routes as "authenticated", and the actual validity check happens in the
/// session read handler. API routes self-police and always pass through; the
/// health probe must never redirect. Rule order matters.
pub async fn session_gate(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path();

    if path == "/api" || path.starts_with("/api/") || path == "/health" {
        return next.run(request).await;
    }

    let authenticated = jar.get(SESSION_COOKIE).is_some();

    if !authenticated && !path.starts_with(LOGIN_PATH) {
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    if authenticated && path == LOGIN_PATH {
        return Redirect::temporary(DASHBOARD_PATH).into_response();
    }

    // The unauthenticated root already redirected to the login page above
    if path == "/" {
        return Redirect::temporary(DASHBOARD_PATH).into_response();
    }

    next.run(request).await
}
