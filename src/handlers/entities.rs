//! Organization and group proxy routes. The two CKAN entity types share one
//! handler set parameterized by [`EntityKind`].

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{delete as delete_route, get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::ckan::EntityKind;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EntityWriteRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntityNameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntityShowQuery {
    pub name: Option<String>,
}

pub fn routes(kind: EntityKind) -> Router<Arc<AppState>> {
    let prefix = kind.route_prefix();
    Router::new()
        .route(
            &format!("/api/{}/create", prefix),
            post(move |state: State<Arc<AppState>>, body: Json<EntityWriteRequest>| {
                create(kind, state, body)
            }),
        )
        .route(
            &format!("/api/{}/list", prefix),
            get(move |state: State<Arc<AppState>>| list(kind, state)),
        )
        .route(
            &format!("/api/{}/show", prefix),
            get(move |state: State<Arc<AppState>>, query: Query<EntityShowQuery>| {
                show(kind, state, query)
            }),
        )
        .route(
            &format!("/api/{}/update", prefix),
            patch(move |state: State<Arc<AppState>>, body: Json<EntityWriteRequest>| {
                update(kind, state, body)
            }),
        )
        .route(
            &format!("/api/{}/delete", prefix),
            delete_route(move |state: State<Arc<AppState>>, body: Json<EntityNameRequest>| {
                remove(kind, state, body)
            }),
        )
}

async fn create(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EntityWriteRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(name), Some(title)) = (&body.name, &body.title) else {
        return Err(ApiError::bad_request("Name and title are required"));
    };
    if name.is_empty() || title.is_empty() {
        return Err(ApiError::bad_request("Name and title are required"));
    }

    let mut entity = Map::new();
    entity.insert("name".to_string(), json!(name));
    entity.insert("title".to_string(), json!(title));
    if let Some(description) = &body.description {
        entity.insert("description".to_string(), json!(description));
    }
    if let Some(image_url) = &body.image_url {
        entity.insert("image_url".to_string(), json!(image_url));
    }

    let created = state.ckan.entity_create(kind, &Value::Object(entity)).await?;
    Ok(Json(json!({
        "success": true,
        "result": created,
        "message": format!("{} created successfully", kind.label()),
    })))
}

async fn list(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let entities = state.ckan.entity_list(kind).await?;
    Ok(Json(json!({ "success": true, "result": entities })))
}

async fn show(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntityShowQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = required_name(query.name)?;
    let entity = state.ckan.entity_show(kind, &name).await?;
    Ok(Json(json!({ "success": true, "result": entity })))
}

/// The slug is immutable post-creation: `name` only selects the entity, and
/// just the provided fields are forwarded to the patch action.
async fn update(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EntityWriteRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = required_name(body.name)?;

    let mut patch = Map::new();
    patch.insert("id".to_string(), json!(name));
    if let Some(title) = &body.title {
        patch.insert("title".to_string(), json!(title));
    }
    if let Some(description) = &body.description {
        patch.insert("description".to_string(), json!(description));
    }
    if let Some(image_url) = &body.image_url {
        patch.insert("image_url".to_string(), json!(image_url));
    }

    let updated = state.ckan.entity_update(kind, &Value::Object(patch)).await?;
    Ok(Json(json!({
        "success": true,
        "result": updated,
        "message": format!("{} updated successfully", kind.label()),
    })))
}

async fn remove(
    kind: EntityKind,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EntityNameRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = required_name(body.name)?;
    state.ckan.entity_delete(kind, &name).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} deleted successfully", kind.label()),
    })))
}

fn required_name(name: Option<String>) -> Result<String, ApiError> {
    name.filter(|n| !n.is_empty()).ok_or_else(|| ApiError::bad_request("Name is required"))
}
