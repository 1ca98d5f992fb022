use std::fs::File;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{IndexerError, Result};
use crate::paths::RootPaths;

/// Looks up a bare file name across the app, deps and runtime root-path
/// sets, in that priority order.
pub struct OnDemandResolver<'a> {
    config: &'a Config,
}

impl<'a> OnDemandResolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// First directory on the search path holding `filename` wins. Only a
    /// bare file name is looked up; anything with a directory part is never
    /// on the search path.
    pub fn locate(&self, filename: &str) -> Result<PathBuf> {
        if !is_bare_name(filename) {
            debug!(filename, "Not a bare file name");
            return Err(IndexerError::NotFound(filename.to_string()));
        }

        let search_path = RootPaths::new(self.config).search_path()?;

        for dir in &search_path {
            let candidate = dir.join(filename);
            if candidate.is_file() && File::open(&candidate).is_ok() {
                debug!(file = %candidate.display(), "Located file on search path");
                return Ok(candidate);
            }
        }

        debug!(filename, directories = search_path.len(), "File not on search path");
        Err(IndexerError::NotFound(filename.to_string()))
    }
}

fn is_bare_name(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
