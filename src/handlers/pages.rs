//! Redirect targets for the access gate. Rendering and theming live in the
//! front-end; these shells only give the gate somewhere to land.

use axum::response::Html;

pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!doctype html>\n<html>\n<head><title>Portal Admin - Login</title></head>\n\
         <body><h1>Portal Admin</h1><p>Sign in via POST /api/auth/login.</p></body>\n</html>",
    )
}

pub async fn dashboard_page() -> Html<&'static str> {
    Html(
        "<!doctype html>\n<html>\n<head><title>Portal Admin - Dashboard</title></head>\n\
         <body><h1>Dashboard</h1><p>See /api for available endpoints.</p></body>\n</html>",
    )
}
