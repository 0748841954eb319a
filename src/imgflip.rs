use crate::{
    domain::{MemeRenderer, TemplateCatalog},
    errors::UpstreamError,
    models::MemeTemplate,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for the Imgflip-style meme API: one endpoint listing the
/// template catalog, one rendering a captioned image.
///
/// Imgflip reports failure inside a 200 response (`success: false` plus
/// `error_message`), so the body is parsed unconditionally and the
/// envelope decides success.
#[derive(Debug, Clone)]
pub struct ImgflipClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ImgflipClient {
    pub fn new(client: Client, base_url: String, username: String, password: String) -> Self {
        Self {
            client,
            base_url,
            username,
            password,
        }
    }
}

// --- Wire types ---

/// Template descriptor as the upstream sends it (snake_case, extra fields
/// like caption counts are ignored).
#[derive(Debug, Deserialize)]
struct UpstreamTemplate {
    id: String,
    name: String,
    url: String,
    width: i32,
    height: i32,
    box_count: i32,
}

impl From<UpstreamTemplate> for MemeTemplate {
    fn from(t: UpstreamTemplate) -> Self {
        MemeTemplate {
            id: t.id,
            name: t.name,
            url: t.url,
            width: t.width,
            height: t.height,
            box_count: t.box_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetMemesResponse {
    success: bool,
    data: Option<MemesData>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemesData {
    memes: Vec<UpstreamTemplate>,
}

impl GetMemesResponse {
    fn into_templates(self) -> Result<Vec<MemeTemplate>, UpstreamError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data.memes.into_iter().map(MemeTemplate::from).collect()),
            _ => Err(UpstreamError::Api(self.error_message.unwrap_or_else(
                || "Failed to fetch templates from Imgflip".to_string(),
            ))),
        }
    }
}

#[derive(Serialize)]
struct CaptionImageForm<'a> {
    template_id: &'a str,
    username: &'a str,
    password: &'a str,
    text0: &'a str,
    text1: &'a str,
}

#[derive(Debug, Deserialize)]
struct CaptionImageResponse {
    success: bool,
    data: Option<CaptionData>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionData {
    url: String,
}

impl CaptionImageResponse {
    fn into_url(self) -> Result<String, UpstreamError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data.url),
            _ => Err(UpstreamError::Api(
                self.error_message
                    .unwrap_or_else(|| "Failed to generate meme".to_string()),
            )),
        }
    }
}

// --- Trait impls ---

#[async_trait]
impl TemplateCatalog for ImgflipClient {
    async fn fetch_templates(&self) -> Result<Vec<MemeTemplate>, UpstreamError> {
        let url = format!("{}/get_memes", self.base_url);
        debug!(%url, "Imgflip: fetching template catalog");

        let response = self.client.get(&url).send().await?;
        let envelope: GetMemesResponse = response.json().await?;
        let templates = envelope.into_templates()?;

        debug!(count = templates.len(), "Imgflip: template catalog fetched");
        Ok(templates)
    }
}

#[async_trait]
impl MemeRenderer for ImgflipClient {
    async fn render(
        &self,
        template_id: &str,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/caption_image", self.base_url);
        debug!(%template_id, "Imgflip: rendering captioned image");

        let form = CaptionImageForm {
            template_id,
            username: &self.username,
            password: &self.password,
            text0: top_text,
            text1: bottom_text,
        };
        let response = self.client.post(&url).form(&form).send().await?;
        let envelope: CaptionImageResponse = response.json().await?;
        let image_url = envelope.into_url()?;

        debug!(%template_id, %image_url, "Imgflip: image rendered");
        Ok(image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_memes_envelope_maps_to_templates() {
        let raw = r#"{
            "success": true,
            "data": {
                "memes": [
                    {
                        "id": "181913649",
                        "name": "Drake Hotline Bling",
                        "url": "https://i.imgflip.com/30b1gx.jpg",
                        "width": 1200,
                        "height": 1200,
                        "box_count": 2,
                        "captions": 1200000
                    }
                ]
            }
        }"#;
        let envelope: GetMemesResponse = serde_json::from_str(raw).unwrap();
        let templates = envelope.into_templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "181913649");
        assert_eq!(templates[0].name, "Drake Hotline Bling");
        assert_eq!(templates[0].box_count, 2);
    }

    #[test]
    fn get_memes_failure_uses_fallback_message() {
        let raw = r#"{ "success": false }"#;
        let envelope: GetMemesResponse = serde_json::from_str(raw).unwrap();
        let err = envelope.into_templates().unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch templates from Imgflip");
    }

    #[test]
    fn caption_image_envelope_yields_url() {
        let raw = r#"{
            "success": true,
            "data": { "url": "https://i.imgflip.com/out.jpg", "page_url": "https://imgflip.com/i/out" }
        }"#;
        let envelope: CaptionImageResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            envelope.into_url().unwrap(),
            "https://i.imgflip.com/out.jpg"
        );
    }

    #[test]
    fn caption_image_failure_passes_upstream_message_through() {
        let raw = r#"{ "success": false, "error_message": "Invalid username/password combination" }"#;
        let envelope: CaptionImageResponse = serde_json::from_str(raw).unwrap();
        let err = envelope.into_url().unwrap_err();
        assert_eq!(err.to_string(), "Invalid username/password combination");
    }

    #[test]
    fn caption_image_success_without_data_is_an_error() {
        let raw = r#"{ "success": true }"#;
        let envelope: CaptionImageResponse = serde_json::from_str(raw).unwrap();
        let err = envelope.into_url().unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate meme");
    }
}
