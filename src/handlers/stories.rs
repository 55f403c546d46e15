use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoryPayload {
    pub slug: Option<String>,
    pub metadata: Option<Value>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

impl StoryPayload {
    fn into_parts(self) -> Result<(String, Value, String), ApiError> {
        match (self.slug, self.metadata, self.content) {
            (Some(slug), Some(metadata), Some(content))
                if !slug.is_empty() && !metadata.is_null() && !content.is_empty() =>
            {
                Ok((slug, metadata, content))
            }
            _ => Err(ApiError::bad_request("Missing required fields")),
        }
    }
}

/// POST /api/stories/create
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StoryPayload>,
) -> Result<Json<Value>, ApiError> {
    let (slug, metadata, content) = body.into_parts()?;
    state.stories.create(&slug, &metadata, &content).await?;
    Ok(Json(json!({
        "success": true,
        "slug": slug,
        "message": "Story created successfully",
    })))
}

/// GET /api/stories/get?slug=
pub async fn get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<Value>, ApiError> {
    let slug = required_slug(query.slug)?;
    let story = state.stories.read(&slug).await?;
    Ok(Json(json!({
        "success": true,
        "result": {
            "slug": story.slug,
            "metadata": story.metadata,
            "content": story.content,
        },
    })))
}

/// GET /api/stories/list - Metadata summaries, newest first
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let listing = state.stories.list().await?;
    if listing.skipped > 0 {
        tracing::warn!("story listing skipped {} unreadable entries", listing.skipped);
    }
    Ok(Json(json!({ "success": true, "result": listing.stories })))
}

/// PUT /api/stories/update - Full overwrite
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StoryPayload>,
) -> Result<Json<Value>, ApiError> {
    let (slug, metadata, content) = body.into_parts()?;
    state.stories.update(&slug, &metadata, &content).await?;
    Ok(Json(json!({
        "success": true,
        "slug": slug,
        "message": "Story updated successfully",
    })))
}

/// DELETE /api/stories/delete?slug=
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<Value>, ApiError> {
    let slug = required_slug(query.slug)?;
    state.stories.delete(&slug).await?;
    Ok(Json(json!({ "success": true, "message": "Story deleted successfully" })))
}

fn required_slug(slug: Option<String>) -> Result<String, ApiError> {
    slug.filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Story slug is required"))
}
