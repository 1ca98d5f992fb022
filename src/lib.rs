pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod paths;
pub mod store;

pub use config::Config;
pub use document::{Document, DocumentFactory, DocumentKind, Poi, PoiKind, Uri};
pub use error::{ErrorClass, FileIndexError, IndexerError, Result};
pub use index::{
    CompletionIndex, IndexRegistry, Reference, ReferencesIndex, SpecializedIndex, SpecsIndex,
    StandardIndexes,
};
pub use indexer::{
    DirectoryWalker, IndexDispatcher, Indexer, OnDemandResolver, SourceDocumentFactory,
    SourceFilter, WalkResult,
};
pub use paths::{PathResolver, PathTemplate, RootCategory, RootPaths};
pub use store::{DocumentStore, MemoryStore, SqliteStore, DOCUMENTS};
