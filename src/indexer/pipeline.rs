use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::document::{Document, DocumentFactory, Uri};
use crate::error::{ErrorClass, FileIndexError, Result};
use crate::paths::{RootCategory, RootPaths};

use super::{DirectoryWalker, IndexDispatcher, OnDemandResolver, WalkResult};

/// Entry point used by the rest of the server: startup indexing, indexing
/// of already-parsed documents, and on-demand lookups by file name.
///
/// Everything runs synchronously on the caller's thread.
pub struct Indexer {
    config: Config,
    factory: Arc<dyn DocumentFactory>,
    dispatcher: IndexDispatcher,
    walker: DirectoryWalker,
}

impl Indexer {
    pub fn new(config: Config, factory: Arc<dyn DocumentFactory>, dispatcher: IndexDispatcher) -> Self {
        Self {
            config,
            factory,
            dispatcher,
            walker: DirectoryWalker::default(),
        }
    }

    pub fn with_walker(mut self, walker: DirectoryWalker) -> Self {
        self.walker = walker;
        self
    }

    pub fn dispatcher(&self) -> &IndexDispatcher {
        &self.dispatcher
    }

    /// Walks the app root-path set and dispatches every file in it. Deps and
    /// runtime sources are left to [`Indexer::find_and_index_file`].
    pub fn initialize(&self) -> Result<WalkResult> {
        let dirs = RootPaths::new(&self.config).resolve(RootCategory::App)?;
        let roots = walk_roots(&dirs);
        info!(
            directories = dirs.len(),
            walk_roots = roots.len(),
            "Indexing app root-path set"
        );

        let mut total = WalkResult::default();
        for root in &roots {
            total += self.index_dir(root);
        }

        info!(
            succeeded = total.succeeded,
            failed = total.failed,
            elapsed_ms = total.elapsed.as_millis() as u64,
            "Startup indexing complete"
        );
        Ok(total)
    }

    /// Stores and dispatches a document whose content is already known.
    pub fn index(&self, document: &Document) -> Result<()> {
        self.dispatcher.index_document(document)
    }

    pub fn index_dir(&self, dir: &Path) -> WalkResult {
        self.walker.walk(dir, |file| self.index_file(file).map(|_| ()))
    }

    /// Reads, parses and dispatches one file.
    pub fn index_file(&self, path: &Path) -> std::result::Result<Uri, FileIndexError> {
        let content =
            std::fs::read(path).map_err(|e| FileIndexError::new(path, ErrorClass::Read, e.into()))?;
        let uri = Uri::from_path(path);
        let document = self
            .factory
            .create(&uri, &content)
            .map_err(|e| FileIndexError::new(path, ErrorClass::Parse, e))?;
        self.dispatcher
            .index_document(&document)
            .map_err(|e| FileIndexError::new(path, ErrorClass::Dispatch, e))?;
        Ok(uri)
    }

    /// Resolves `filename` against the app, deps and runtime search path and
    /// indexes the first match.
    pub fn find_and_index_file(&self, filename: &str) -> Result<Uri> {
        let path = OnDemandResolver::new(&self.config).locate(filename)?;
        let uri = self.index_file(&path)?;
        info!(filename, uri = %uri, "Indexed file on demand");
        Ok(uri)
    }
}

/// Drops directories already covered by an earlier, enclosing one so that a
/// recursive walk visits each file once.
fn walk_roots(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if !roots.iter().any(|root| dir.starts_with(root)) {
            roots.push(dir.clone());
        }
    }
    roots
}
