use crate::{
    captions,
    errors::AppError,
    models::{CreateMemeRequest, GenerateCaptionRequest, MemeCreatedResponse, NewGeneratedMeme},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// How many memes `GET /api/memes/recent` returns when no `limit` is given.
const DEFAULT_RECENT_LIMIT: usize = 12;

/// Display name used when a meme's template is missing from the cache.
const UNKNOWN_TEMPLATE_NAME: &str = "Unknown Template";

/// Returns the cached template list, filling the cache from the upstream
/// catalog on the first request (or after a cache clear).
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let cached = state
        .templates
        .list()
        .await
        .map_err(|e| AppError::store("Failed to fetch meme templates", e))?;
    if !cached.is_empty() {
        tracing::debug!(count = cached.len(), "Serving templates from cache");
        return Ok(Json(cached));
    }

    let fetched = state
        .catalog
        .fetch_templates()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch meme templates", e))?;
    state
        .templates
        .save_all(&fetched)
        .await
        .map_err(|e| AppError::store("Failed to fetch meme templates", e))?;
    tracing::info!(count = fetched.len(), "Template cache filled from upstream");

    Ok(Json(fetched))
}

/// Empties both the template cache and the generated-meme store, forcing the
/// next template listing to hit the upstream catalog again.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state
        .templates
        .clear()
        .await
        .map_err(|e| AppError::store("Failed to clear cache", e))?;
    state
        .memes
        .clear()
        .await
        .map_err(|e| AppError::store("Failed to clear cache", e))?;
    tracing::info!("Template and meme caches cleared");

    Ok(Json(serde_json::json!({ "message": "Cache cleared successfully" })))
}

/// Renders a meme through the upstream service and records it.
///
/// The template name is denormalized into the record at creation time;
/// later cache clears do not touch it.
pub async fn generate_meme(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let request = CreateMemeRequest::parse(&body).map_err(AppError::Validation)?;
    tracing::debug!(template_id = %request.template_id, "Generating meme");

    let image_url = state
        .renderer
        .render(&request.template_id, &request.top_text, &request.bottom_text)
        .await
        .map_err(|e| AppError::upstream("Failed to generate meme", e))?;

    // A cache miss is not an error here: the cache may never have been
    // filled, or was cleared since the client picked a template.
    let templates = state
        .templates
        .list()
        .await
        .map_err(|e| AppError::store("Failed to generate meme", e))?;
    let template_name = templates
        .iter()
        .find(|t| t.id == request.template_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_TEMPLATE_NAME.to_string());

    let meme = state
        .memes
        .insert(NewGeneratedMeme {
            template_id: request.template_id.clone(),
            template_name: template_name.clone(),
            top_text: none_if_empty(&request.top_text),
            bottom_text: none_if_empty(&request.bottom_text),
            image_url: image_url.clone(),
        })
        .await
        .map_err(|e| AppError::store("Failed to generate meme", e))?;
    tracing::info!(meme_id = %meme.id, template_id = %request.template_id, "Meme generated");

    Ok(Json(MemeCreatedResponse {
        id: meme.id,
        url: image_url,
        template_id: request.template_id,
        template_name,
        top_text: request.top_text,
        bottom_text: request.bottom_text,
    }))
}

#[derive(Deserialize)]
pub struct RecentQuery {
    limit: Option<usize>,
}

/// Lists generated memes, newest first.
pub async fn recent_memes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let memes = state
        .memes
        .list_recent(limit)
        .await
        .map_err(|e| AppError::store("Failed to fetch recent memes", e))?;
    tracing::debug!(count = memes.len(), limit, "Listing recent memes");

    Ok(Json(memes))
}

/// Fetches a single generated meme by id.
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let maybe_meme = state
        .memes
        .get(&id)
        .await
        .map_err(|e| AppError::store("Failed to fetch meme", e))?;

    match maybe_meme {
        Some(meme) => Ok(Json(meme)),
        None => {
            tracing::warn!(meme_id = %id, "Meme not found");
            Err(AppError::NotFound("Meme not found".to_string()))
        }
    }
}

/// Asks the text model for a caption on the given topic and splits the reply
/// into top and bottom text.
pub async fn generate_caption(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let request = GenerateCaptionRequest::parse(&body).map_err(AppError::Validation)?;
    tracing::debug!(topic = %request.topic, "Generating caption");

    let caption = captions::generate_caption(
        state.caption_model.as_ref(),
        &request.topic,
        request.template_name.as_deref(),
    )
    .await
    .map_err(|e| AppError::upstream("Failed to generate caption", e))?;

    Ok(Json(caption))
}

fn none_if_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
