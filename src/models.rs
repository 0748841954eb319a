use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FieldError;

/// A reusable base image with editable text regions, sourced from the
/// upstream template catalog. Immutable once cached; identity is `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeTemplate {
    pub id: String,
    pub name: String,
    pub url: String,
    pub width: i32,
    pub height: i32,
    pub box_count: i32,
}

/// A rendered meme as persisted in the generated-meme store.
///
/// `top_text`/`bottom_text` are `None` when the request supplied no (or
/// empty) text. `template_id` is not checked against the template cache,
/// so it may reference a template that has since been cleared.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMeme {
    pub id: String,
    pub template_id: String,
    pub template_name: String,
    pub top_text: Option<String>,
    pub bottom_text: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Insert form for [`GeneratedMeme`]; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone)]
pub struct NewGeneratedMeme {
    pub template_id: String,
    pub template_name: String,
    pub top_text: Option<String>,
    pub bottom_text: Option<String>,
    pub image_url: String,
}

/// Validated body of `POST /api/memes/generate`. Absent text fields have
/// already been defaulted to the empty string.
#[derive(Debug, Clone)]
pub struct CreateMemeRequest {
    pub template_id: String,
    pub top_text: String,
    pub bottom_text: String,
}

impl CreateMemeRequest {
    /// Validates a raw JSON body. `templateId` must be a string; the text
    /// fields must be strings when present. All violations are collected
    /// rather than failing on the first one.
    pub fn parse(body: &Value) -> Result<Self, Vec<FieldError>> {
        let Some(map) = body.as_object() else {
            return Err(vec![FieldError::new("body", "Expected a JSON object")]);
        };

        let mut errors = Vec::new();
        let template_id = match map.get("templateId") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                errors.push(FieldError::new("templateId", "Expected a string"));
                String::new()
            }
            None => {
                errors.push(FieldError::new("templateId", "Required"));
                String::new()
            }
        };
        let top_text = optional_string(map, "topText", &mut errors);
        let bottom_text = optional_string(map, "bottomText", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            template_id,
            top_text: top_text.unwrap_or_default(),
            bottom_text: bottom_text.unwrap_or_default(),
        })
    }
}

/// Validated body of `POST /api/captions/generate`.
#[derive(Debug, Clone)]
pub struct GenerateCaptionRequest {
    pub topic: String,
    pub template_name: Option<String>,
}

impl GenerateCaptionRequest {
    pub fn parse(body: &Value) -> Result<Self, Vec<FieldError>> {
        let Some(map) = body.as_object() else {
            return Err(vec![FieldError::new("body", "Expected a JSON object")]);
        };

        let mut errors = Vec::new();
        let topic = match map.get("topic") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => {
                errors.push(FieldError::new("topic", "Topic is required"));
                String::new()
            }
            Some(_) => {
                errors.push(FieldError::new("topic", "Expected a string"));
                String::new()
            }
            None => {
                errors.push(FieldError::new("topic", "Required"));
                String::new()
            }
        };
        let template_name = optional_string(map, "templateName", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            topic,
            template_name,
        })
    }
}

fn optional_string(
    map: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match map.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "Expected a string"));
            None
        }
        None => None,
    }
}

/// Response of `POST /api/memes/generate`: the persisted id plus the
/// request's original (defaulted) text fields.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemeCreatedResponse {
    pub id: String,
    pub url: String,
    pub template_id: String,
    pub template_name: String,
    pub top_text: String,
    pub bottom_text: String,
}

/// Response of `POST /api/captions/generate`. `original_response` keeps
/// the raw model output for debugging and client-side fallback.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CaptionResponse {
    pub top_text: String,
    pub bottom_text: String,
    pub original_response: String,
}
