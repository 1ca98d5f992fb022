use std::sync::Arc;

use tracing::debug;

use crate::document::Document;
use crate::error::{IndexerError, Result};
use crate::index::IndexRegistry;
use crate::store::{DocumentStore, DOCUMENTS};

/// Writes a document to the store and offers it to every registered index.
///
/// A document is either fully dispatched or the call fails: a failed store
/// write skips the indexes entirely, and the first failing index stops the
/// remaining ones. Indexes that already ran are not rolled back.
#[derive(Clone)]
pub struct IndexDispatcher {
    store: Arc<dyn DocumentStore>,
    registry: IndexRegistry,
}

impl IndexDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, registry: IndexRegistry) -> Self {
        Self { store, registry }
    }

    pub fn index_document(&self, document: &Document) -> Result<()> {
        let value = serde_json::to_vec(document)?;
        self.store
            .store(DOCUMENTS, document.uri().as_str(), &value)
            .map_err(|e| match e {
                IndexerError::Store(_) => e,
                other => IndexerError::Store(other.to_string()),
            })?;

        for index in self.registry.iter() {
            index.index(document).map_err(|e| match e {
                IndexerError::Index { .. } => e,
                other => IndexerError::Index {
                    index: index.name(),
                    reason: other.to_string(),
                },
            })?;
        }

        debug!(uri = %document.uri(), indexes = self.registry.len(), "Dispatched document");
        Ok(())
    }

    pub fn fetch_document(&self, uri: &str) -> Result<Option<Document>> {
        match self.store.fetch(DOCUMENTS, uri)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
