pub mod dispatcher;
pub mod on_demand;
pub mod parser;
pub mod pipeline;
pub mod walker;

pub use dispatcher::IndexDispatcher;
pub use on_demand::OnDemandResolver;
pub use parser::SourceDocumentFactory;
pub use pipeline::Indexer;
pub use walker::{DirectoryWalker, SourceFilter, WalkResult, DEFAULT_SOURCE_PATTERN};
