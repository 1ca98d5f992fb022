use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::document::{Document, DocumentKind, PoiKind};
use crate::error::{IndexerError, Result};

use super::{ModuleOwners, SpecializedIndex};

#[derive(Debug, Default)]
struct Inner {
    /// module → `name/arity`
    modules: BTreeMap<String, BTreeSet<String>>,
    owners: ModuleOwners,
}

/// Completion candidates: module names and the `name/arity` of the
/// functions each module defines.
#[derive(Debug, Default)]
pub struct CompletionIndex {
    inner: RwLock<Inner>,
}

impl CompletionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modules_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| {
                inner
                    .modules
                    .range(prefix.to_string()..)
                    .take_while(|(name, _)| name.starts_with(prefix))
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn functions(&self, module: &str, prefix: &str) -> Vec<String> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| {
                inner.modules.get(module).map(|fns| {
                    fns.iter()
                        .filter(|f| f.starts_with(prefix))
                        .cloned()
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.modules.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpecializedIndex for CompletionIndex {
    fn name(&self) -> &'static str {
        "completion"
    }

    fn index(&self, document: &Document) -> Result<()> {
        if document.kind != DocumentKind::Module {
            return Ok(());
        }

        let functions: BTreeSet<String> = document
            .pois_of(PoiKind::Function)
            .map(|p| format!("{}/{}", p.name, p.arity.unwrap_or(0)))
            .collect();

        let mut inner = self.inner.write().map_err(|_| IndexerError::Index {
            index: self.name(),
            reason: "lock poisoned".to_string(),
        })?;
        if let Some(stale) = inner.owners.claim(&document.uri, &document.id) {
            inner.modules.remove(&stale);
        }
        inner.modules.insert(document.id.clone(), functions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Uri;
    use crate::indexer::SourceDocumentFactory;
    use std::path::Path;

    fn doc(path: &str, source: &str) -> Document {
        SourceDocumentFactory::new().parse_source(&Uri::from_path(Path::new(path)), source)
    }

    #[test]
    fn test_completion_candidates() {
        let index = CompletionIndex::new();
        index
            .index(&doc(
                "/p/src/foo_server.erl",
                "-module(foo_server).\nstart_link() -> ok.\nstop(Pid) -> ok.\n",
            ))
            .unwrap();
        index
            .index(&doc("/p/src/foo.erl", "-module(foo).\nrun() -> ok.\n"))
            .unwrap();
        index
            .index(&doc("/p/src/bar.erl", "-module(bar).\n"))
            .unwrap();

        assert_eq!(index.modules_with_prefix("foo"), vec!["foo", "foo_server"]);
        assert_eq!(index.functions("foo_server", "st"), vec!["start_link/0", "stop/1"]);
        assert!(index.functions("missing", "").is_empty());
    }

    #[test]
    fn test_reindex_replaces_functions() {
        let index = CompletionIndex::new();
        index
            .index(&doc("/p/src/foo.erl", "-module(foo).\nold() -> ok.\n"))
            .unwrap();
        index
            .index(&doc("/p/src/foo.erl", "-module(foo).\nnew(X) -> X.\n"))
            .unwrap();

        assert_eq!(index.functions("foo", ""), vec!["new/1"]);
    }

    #[test]
    fn test_renamed_module_drops_old_candidates() {
        let index = CompletionIndex::new();
        index
            .index(&doc("/p/src/foo.erl", "-module(foo).\nrun() -> ok.\n"))
            .unwrap();
        index
            .index(&doc("/p/src/foo.erl", "-module(foo_v2).\nrun() -> ok.\n"))
            .unwrap();

        assert_eq!(index.modules_with_prefix("foo"), vec!["foo_v2"]);
        assert!(index.functions("foo", "").is_empty());
    }

    #[test]
    fn test_headers_are_skipped() {
        let index = CompletionIndex::new();
        index
            .index(&doc("/p/include/defs.hrl", "-define(X, 1).\n"))
            .unwrap();
        assert!(index.is_empty());
    }
}
