use crate::{
    domain::{MemeStore, TemplateStore},
    errors::StoreError,
    models::{GeneratedMeme, MemeTemplate, NewGeneratedMeme},
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// In-memory template cache keyed by template id.
///
/// Lives for the process lifetime with no eviction or size bound.
/// Readers racing a `save_all` may see a partially-updated set;
/// staleness is unbounded anyway.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: DashMap<String, MemeTemplate>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn list(&self) -> Result<Vec<MemeTemplate>, StoreError> {
        Ok(self
            .templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn save_all(&self, templates: &[MemeTemplate]) -> Result<(), StoreError> {
        for template in templates {
            // Keyed by the upstream id; renders pass it through verbatim
            self.templates
                .insert(template.id.clone(), template.clone());
        }
        debug!(count = templates.len(), "Template cache updated");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.templates.clear();
        debug!("Template cache cleared");
        Ok(())
    }
}

/// In-memory generated-meme store. Append-only apart from `clear`.
#[derive(Debug, Default)]
pub struct MemoryMemeStore {
    memes: DashMap<String, GeneratedMeme>,
}

impl MemoryMemeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemeStore for MemoryMemeStore {
    async fn insert(&self, meme: NewGeneratedMeme) -> Result<GeneratedMeme, StoreError> {
        let meme = GeneratedMeme {
            id: Uuid::new_v4().to_string(),
            template_id: meme.template_id,
            template_name: meme.template_name,
            top_text: meme.top_text,
            bottom_text: meme.bottom_text,
            image_url: meme.image_url,
            created_at: Utc::now(),
        };
        self.memes.insert(meme.id.clone(), meme.clone());
        debug!(meme_id = %meme.id, "Stored generated meme");
        Ok(meme)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<GeneratedMeme>, StoreError> {
        let mut memes: Vec<GeneratedMeme> = self
            .memes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        memes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        memes.truncate(limit);
        Ok(memes)
    }

    async fn get(&self, id: &str) -> Result<Option<GeneratedMeme>, StoreError> {
        Ok(self.memes.get(id).map(|entry| entry.value().clone()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.memes.clear();
        debug!("Generated-meme store cleared");
        Ok(())
    }
}
