use std::collections::HashMap;
use std::sync::RwLock;

use crate::document::{Document, PoiKind, Uri};
use crate::error::{IndexerError, Result};

use super::SpecializedIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub uri: Uri,
    pub line: usize,
}

#[derive(Debug, Default)]
struct Inner {
    /// `module:function/arity` → call sites
    by_target: HashMap<String, Vec<Reference>>,
    /// Targets each URI contributed, so re-indexing can drop them.
    by_uri: HashMap<Uri, Vec<String>>,
}

/// Cross-references from remote calls to their call sites.
#[derive(Debug, Default)]
pub struct ReferencesIndex {
    inner: RwLock<Inner>,
}

impl ReferencesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, module: &str, function: &str, arity: usize) -> Vec<Reference> {
        let key = target_key(module, function, arity);
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.by_target.get(&key).cloned())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.by_target.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn target_key(module: &str, function: &str, arity: usize) -> String {
    format!("{}:{}/{}", module, function, arity)
}

impl SpecializedIndex for ReferencesIndex {
    fn name(&self) -> &'static str {
        "references"
    }

    fn index(&self, document: &Document) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| IndexerError::Index {
            index: self.name(),
            reason: "lock poisoned".to_string(),
        })?;
        let inner = &mut *inner;

        if let Some(stale) = inner.by_uri.remove(&document.uri) {
            for target in stale {
                if let Some(refs) = inner.by_target.get_mut(&target) {
                    refs.retain(|r| r.uri != document.uri);
                    if refs.is_empty() {
                        inner.by_target.remove(&target);
                    }
                }
            }
        }

        let mut targets = Vec::new();
        for poi in document.pois_of(PoiKind::RemoteCall) {
            let key = format!("{}/{}", poi.name, poi.arity.unwrap_or(0));
            inner.by_target.entry(key.clone()).or_default().push(Reference {
                uri: document.uri.clone(),
                line: poi.line,
            });
            targets.push(key);
        }
        targets.sort();
        targets.dedup();
        if !targets.is_empty() {
            inner.by_uri.insert(document.uri.clone(), targets);
        }
        Ok(())
    }
}
