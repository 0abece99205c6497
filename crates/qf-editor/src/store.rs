//! Form store contract and an in-memory implementation.
//!
//! The store treats document text as opaque. Saves are guarded by a
//! revision number: a save names the revision it was based on, and the
//! store refuses it if someone else saved in between.

use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tokio::sync::RwLock;

/// What the store holds for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredForm {
    pub content: String,
    pub theme: String,
    pub revision: u64,
}

/// An owned, already-serialized save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Serialized document text.
    pub content: String,
    pub theme: String,
    /// Revision the edits were based on.
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("form `{0}` not found")]
    NotFound(String),

    #[error("revision conflict: save based on {expected}, store is at {actual}")]
    Conflict { expected: u64, actual: u64 },
}

/// Persistence backend for form designs.
pub trait FormStore: Send + Sync {
    fn load(&self, form_id: &str) -> impl Future<Output = Result<StoredForm, StoreError>> + Send;

    /// Store a new version. Returns the new revision.
    fn save(
        &self,
        form_id: &str,
        request: SaveRequest,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Map-backed store for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: RwLock<HashMap<String, StoredForm>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or overwrite) a form at revision 1.
    pub async fn create(&self, form_id: &str, content: impl Into<String>) {
        let form = StoredForm {
            content: content.into(),
            theme: String::new(),
            revision: 1,
        };
        self.forms.write().await.insert(form_id.to_string(), form);
    }

    pub async fn len(&self) -> usize {
        self.forms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.forms.read().await.is_empty()
    }
}

impl FormStore for MemoryStore {
    async fn load(&self, form_id: &str) -> Result<StoredForm, StoreError> {
        self.forms
            .read()
            .await
            .get(form_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(form_id.to_string()))
    }

    async fn save(&self, form_id: &str, request: SaveRequest) -> Result<u64, StoreError> {
        let mut forms = self.forms.write().await;
        let form = forms
            .get_mut(form_id)
            .ok_or_else(|| StoreError::NotFound(form_id.to_string()))?;
        if form.revision != request.revision {
            return Err(StoreError::Conflict {
                expected: request.revision,
                actual: form.revision,
            });
        }
        form.content = request.content;
        form.theme = request.theme;
        form.revision += 1;
        Ok(form.revision)
    }
}
