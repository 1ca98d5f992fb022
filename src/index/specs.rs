use std::collections::HashMap;
use std::sync::RwLock;

use crate::document::{Document, DocumentKind, PoiKind};
use crate::error::{IndexerError, Result};

use super::{ModuleOwners, SpecializedIndex};

#[derive(Debug, Default)]
struct Inner {
    specs: HashMap<String, HashMap<(String, usize), String>>,
    owners: ModuleOwners,
}

/// Type signatures keyed by `module:function/arity`.
#[derive(Debug, Default)]
pub struct SpecsIndex {
    inner: RwLock<Inner>,
}

impl SpecsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module: &str, function: &str, arity: usize) -> Option<String> {
        self.inner.read().ok().and_then(|inner| {
            inner
                .specs
                .get(module)
                .and_then(|fns| fns.get(&(function.to_string(), arity)))
                .cloned()
        })
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.specs.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpecializedIndex for SpecsIndex {
    fn name(&self) -> &'static str {
        "specs"
    }

    fn index(&self, document: &Document) -> Result<()> {
        if document.kind != DocumentKind::Module {
            return Ok(());
        }

        let module_specs: HashMap<(String, usize), String> = document
            .pois_of(PoiKind::Spec)
            .filter_map(|p| {
                let text = p.data.clone()?;
                Some(((p.name.clone(), p.arity.unwrap_or(0)), text))
            })
            .collect();

        let mut inner = self.inner.write().map_err(|_| IndexerError::Index {
            index: self.name(),
            reason: "lock poisoned".to_string(),
        })?;
        if let Some(stale) = inner.owners.claim(&document.uri, &document.id) {
            inner.specs.remove(&stale);
        }
        if module_specs.is_empty() {
            inner.specs.remove(&document.id);
        } else {
            inner.specs.insert(document.id.clone(), module_specs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Uri;
    use crate::indexer::SourceDocumentFactory;
    use std::path::Path;

    #[test]
    fn test_specs_lookup() {
        let index = SpecsIndex::new();
        let doc = SourceDocumentFactory::new().parse_source(
            &Uri::from_path(Path::new("/p/src/math.erl")),
            "-module(math).\n-spec double(number()) -> number().\ndouble(X) -> X * 2.\n",
        );
        index.index(&doc).unwrap();

        assert_eq!(
            index.get("math", "double", 1).as_deref(),
            Some("-spec double(number()) -> number().")
        );
        assert!(index.get("math", "double", 2).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_renamed_module_drops_old_specs() {
        let index = SpecsIndex::new();
        let factory = SourceDocumentFactory::new();
        let uri = Uri::from_path(Path::new("/p/src/math.erl"));
        let source = "-spec double(number()) -> number().\ndouble(X) -> X * 2.\n";

        index
            .index(&factory.parse_source(&uri, &format!("-module(math).\n{source}")))
            .unwrap();
        index
            .index(&factory.parse_source(&uri, &format!("-module(arith).\n{source}")))
            .unwrap();

        assert!(index.get("math", "double", 1).is_none());
        assert!(index.get("arith", "double", 1).is_some());
        assert_eq!(index.len(), 1);
    }
}
