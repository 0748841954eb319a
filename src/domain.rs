use crate::errors::{StoreError, UpstreamError};
use crate::models::{GeneratedMeme, MemeTemplate, NewGeneratedMeme};
use async_trait::async_trait;

/// Trait defining the template cache fronting the upstream catalog.
///
/// No point lookup: the cache is a list-or-nothing layer, and callers
/// resolve a template by scanning `list()`.
#[async_trait]
pub trait TemplateStore: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Returns every cached template; empty if never populated.
    async fn list(&self) -> Result<Vec<MemeTemplate>, StoreError>;

    /// Upserts each template keyed by id. Re-saving an existing id
    /// overwrites it in place; ids not mentioned are left untouched.
    async fn save_all(&self, templates: &[MemeTemplate]) -> Result<(), StoreError>;

    /// Drops every cached template.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Trait defining operations for storing and retrieving generated memes.
#[async_trait]
pub trait MemeStore: Send + Sync + 'static {
    /// Persists a meme, assigning it a unique id and creation timestamp.
    async fn insert(&self, meme: NewGeneratedMeme) -> Result<GeneratedMeme, StoreError>;

    /// Lists up to `limit` memes, most recently created first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<GeneratedMeme>, StoreError>;

    /// Retrieves a meme by id. Returns Ok(None) if the meme is not found.
    async fn get(&self, id: &str) -> Result<Option<GeneratedMeme>, StoreError>;

    /// Drops every stored meme.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// The upstream template-listing API.
#[async_trait]
pub trait TemplateCatalog: Send + Sync + 'static {
    async fn fetch_templates(&self) -> Result<Vec<MemeTemplate>, UpstreamError>;
}

/// The upstream image-captioning API: composes the two text fields onto a
/// template and returns the rendered image URL.
#[async_trait]
pub trait MemeRenderer: Send + Sync + 'static {
    async fn render(
        &self,
        template_id: &str,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<String, UpstreamError>;
}

/// The upstream generative-text API, reduced to prompt-in/text-out.
#[async_trait]
pub trait CaptionModel: Send + Sync + 'static {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}
