use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod captions;
mod config;
mod domain;
mod errors;
mod gemini;
mod handlers;
mod imgflip;
mod models;
mod routes;
mod stores;

use crate::config::Config;
use crate::domain::{CaptionModel, MemeRenderer, MemeStore, TemplateCatalog, TemplateStore};
use crate::gemini::GeminiClient;
use crate::imgflip::ImgflipClient;
use crate::routes::create_router;
use crate::stores::{MemoryMemeStore, MemoryTemplateStore};

/// AppState holds shared resources for the web server.
#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<dyn TemplateStore>,
    pub memes: Arc<dyn MemeStore>,
    pub catalog: Arc<dyn TemplateCatalog>,
    pub renderer: Arc<dyn MemeRenderer>,
    pub caption_model: Arc<dyn CaptionModel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "memeforge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; caption requests will fail upstream");
    }

    // Both upstream adapters share one HTTP client.
    let http_client = reqwest::Client::new();
    let imgflip = Arc::new(ImgflipClient::new(
        http_client.clone(),
        config.imgflip_api_url.clone(),
        config.imgflip_username.clone(),
        config.imgflip_password.clone(),
    ));
    let gemini = Arc::new(GeminiClient::new(
        http_client,
        config.gemini_api_url.clone(),
        config.gemini_api_key.clone(),
    ));

    // The same Imgflip client backs both the catalog and the renderer.
    let state = Arc::new(AppState {
        templates: Arc::new(MemoryTemplateStore::new()),
        memes: Arc::new(MemoryMemeStore::new()),
        catalog: imgflip.clone(),
        renderer: imgflip,
        caption_model: gemini,
    });

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
