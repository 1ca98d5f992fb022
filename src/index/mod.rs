pub mod completion;
pub mod references;
pub mod specs;

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{Document, Uri};
use crate::error::Result;

pub use completion::CompletionIndex;
pub use references::{Reference, ReferencesIndex};
pub use specs::SpecsIndex;

/// A consumer of documents maintaining one kind of lookup structure.
pub trait SpecializedIndex: Send + Sync {
    fn name(&self) -> &'static str;
    fn index(&self, document: &Document) -> Result<()>;
}

/// The fixed set of indexes every document is offered to, in registration
/// order.
#[derive(Clone)]
pub struct IndexRegistry {
    indexes: Vec<Arc<dyn SpecializedIndex>>,
}

impl IndexRegistry {
    pub fn new(indexes: Vec<Arc<dyn SpecializedIndex>>) -> Self {
        Self { indexes }
    }

    /// Completion, references and specs, in that order.
    pub fn standard() -> (Self, StandardIndexes) {
        let standard = StandardIndexes {
            completion: Arc::new(CompletionIndex::new()),
            references: Arc::new(ReferencesIndex::new()),
            specs: Arc::new(SpecsIndex::new()),
        };
        let registry = Self::new(vec![
            standard.completion.clone() as Arc<dyn SpecializedIndex>,
            standard.references.clone() as Arc<dyn SpecializedIndex>,
            standard.specs.clone() as Arc<dyn SpecializedIndex>,
        ]);
        (registry, standard)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SpecializedIndex>> {
        self.indexes.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.indexes.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// Typed handles to the indexes registered by [`IndexRegistry::standard`].
#[derive(Clone)]
pub struct StandardIndexes {
    pub completion: Arc<CompletionIndex>,
    pub references: Arc<ReferencesIndex>,
    pub specs: Arc<SpecsIndex>,
}

/// Which module id each URI last contributed, for indexes keyed by module.
#[derive(Debug, Default)]
pub(crate) struct ModuleOwners {
    by_uri: HashMap<Uri, String>,
    by_module: HashMap<String, Uri>,
}

impl ModuleOwners {
    /// Records `uri` as the source of `module`. Returns the module the same
    /// URI previously defined if it differs and no other file has claimed
    /// it since; its entries are stale.
    pub(crate) fn claim(&mut self, uri: &Uri, module: &str) -> Option<String> {
        let previous = self.by_uri.insert(uri.clone(), module.to_string());
        self.by_module.insert(module.to_string(), uri.clone());

        let previous = previous.filter(|prev| prev != module)?;
        if self.by_module.get(&previous) == Some(uri) {
            self.by_module.remove(&previous);
            Some(previous)
        } else {
            None
        }
    }
}
