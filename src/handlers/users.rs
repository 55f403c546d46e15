use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::ckan::UserEntry;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub fullname: Option<String>,
    pub about: Option<String>,
    pub sysadmin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub username: Option<String>,
}

/// GET /api/users/list - All users, each enriched with a best-effort detail
/// lookup
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let entries = state.ckan.user_list_detailed().await?;
    let users: Vec<Value> = entries.into_iter().map(UserEntry::into_payload).collect();
    Ok(Json(json!({ "success": true, "users": users })))
}

/// GET /api/users/show?username=
pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShowQuery>,
) -> Result<Json<Value>, ApiError> {
    let username = required(query.username, "Username is required")?;
    let user = state.ckan.user_show(&username).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// POST /api/users/create - Field presence is checked here; business rules
/// (email format, password strength, name collisions) are the remote API's
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(name), Some(email), Some(password)) = (&body.name, &body.email, &body.password)
    else {
        return Err(ApiError::bad_request("Username, email, and password are required"));
    };
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Username, email, and password are required"));
    }

    let mut user = Map::new();
    user.insert("name".to_string(), json!(name));
    user.insert("email".to_string(), json!(email));
    user.insert("password".to_string(), json!(password));
    if let Some(fullname) = &body.fullname {
        user.insert("fullname".to_string(), json!(fullname));
    }
    if let Some(about) = &body.about {
        user.insert("about".to_string(), json!(about));
    }
    if let Some(sysadmin) = body.sysadmin {
        user.insert("sysadmin".to_string(), json!(sysadmin));
    }

    let created = state.ckan.user_create(&Value::Object(user)).await?;
    Ok(Json(json!({
        "success": true,
        "user": created,
        "message": "User created successfully",
    })))
}

/// PATCH /api/users/update - Only the provided fields are forwarded
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let username = required(body.username, "Username is required")?;

    let mut patch = Map::new();
    patch.insert("id".to_string(), json!(username));
    if let Some(fullname) = &body.fullname {
        patch.insert("fullname".to_string(), json!(fullname));
    }
    if let Some(email) = &body.email {
        patch.insert("email".to_string(), json!(email));
    }
    if let Some(about) = &body.about {
        patch.insert("about".to_string(), json!(about));
    }

    let updated = state.ckan.user_update(&Value::Object(patch)).await?;
    Ok(Json(json!({
        "success": true,
        "user": updated,
        "message": "User updated successfully",
    })))
}

/// DELETE /api/users/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let username = required(body.username, "Username is required")?;
    state.ckan.user_delete(&username).await?;
    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })))
}

fn required(field: Option<String>, message: &str) -> Result<String, ApiError> {
    field.filter(|v| !v.is_empty()).ok_or_else(|| ApiError::bad_request(message))
}
