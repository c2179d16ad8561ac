//! Saved cleaning settings.
//!
//! A [`CleaningTemplate`] is a named [`CleaningSettings`] value with usage
//! metadata. Persistence goes through the [`TemplateStore`] trait so hosts can
//! plug in their own storage; two stores ship with the crate:
//!
//! - [`InMemoryTemplateStore`] for a single session
//! - [`JsonFileTemplateStore`] persisting the whole store to one JSON file

use crate::config::CleaningSettings;
use crate::error::{CleaningError, Result, ResultExt};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub settings: CleaningSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl CleaningTemplate {
    /// Create a template whose id is derived from `name`.
    pub fn new(name: impl Into<String>, settings: CleaningSettings) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: slugify(&name),
            name,
            description: String::new(),
            settings,
            created_at: now,
            updated_at: now,
            usage_count: 0,
            last_used_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Record one use of the template.
    pub fn mark_used(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.last_used_at = Some(Utc::now());
    }
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Storage for templates.
pub trait TemplateStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CleaningError::TemplateNotFound`] if no template has this id.
    fn get(&self, id: &str) -> Result<CleaningTemplate>;

    /// Insert or replace the template with the same id.
    fn put(&self, template: CleaningTemplate) -> Result<()>;

    fn delete(&self, id: &str) -> Result<()>;

    /// All templates, ordered by id.
    fn list(&self) -> Result<Vec<CleaningTemplate>>;

    /// Fetch a template's settings and record the use.
    fn use_template(&self, id: &str) -> Result<CleaningSettings> {
        let mut template = self.get(id)?;
        template.mark_used();
        let settings = template.settings.clone();
        self.put(template)?;
        Ok(settings)
    }
}

/// Session-scoped template store.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<BTreeMap<String, CleaningTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn get(&self, id: &str) -> Result<CleaningTemplate> {
        self.templates
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CleaningError::TemplateNotFound(id.to_string()))
    }

    fn put(&self, mut template: CleaningTemplate) -> Result<()> {
        template.settings.validate()?;
        let mut templates = self.templates.write();
        if let Some(existing) = templates.get(&template.id) {
            template.created_at = existing.created_at;
            template.updated_at = Utc::now();
        }
        debug!("Stored template '{}'", template.id);
        templates.insert(template.id.clone(), template);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.templates
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CleaningError::TemplateNotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<CleaningTemplate>> {
        Ok(self.templates.read().values().cloned().collect())
    }
}

/// Template store persisted as a JSON array in a single file.
///
/// The file is read once on open and rewritten after every change.
#[derive(Debug)]
pub struct JsonFileTemplateStore {
    path: PathBuf,
    inner: InMemoryTemplateStore,
}

impl JsonFileTemplateStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryTemplateStore::new();

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .context(format!("Failed to read template store {}", path.display()))?;
            let templates: Vec<CleaningTemplate> = serde_json::from_str(&contents)?;
            let count = templates.len();
            inner.templates.write().extend(
                templates
                    .into_iter()
                    .map(|template| (template.id.clone(), template)),
            );
            info!("Loaded {} templates from {}", count, path.display());
        }

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let templates = self.inner.list()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&templates)?)
            .context(format!("Failed to write template store {}", self.path.display()))
    }
}

impl TemplateStore for JsonFileTemplateStore {
    fn get(&self, id: &str) -> Result<CleaningTemplate> {
        self.inner.get(id)
    }

    fn put(&self, template: CleaningTemplate) -> Result<()> {
        self.inner.put(template)?;
        self.persist()
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)?;
        self.persist()
    }

    fn list(&self) -> Result<Vec<CleaningTemplate>> {
        self.inner.list()
    }
}

static_assertions::assert_impl_all!(InMemoryTemplateStore: Send, Sync);
static_assertions::assert_impl_all!(JsonFileTemplateStore: Send, Sync);
