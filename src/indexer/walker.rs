use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{ErrorClass, FileIndexError, IndexerError, Result};

/// Erlang sources and headers.
pub const DEFAULT_SOURCE_PATTERN: &str = r"\.[eh]rl$";

static DEFAULT_FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_SOURCE_PATTERN).expect("default source pattern is valid"));

/// File-name filter applied during walks.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    pattern: Regex,
}

impl SourceFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| IndexerError::Config(format!("invalid source pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| self.pattern.is_match(n))
            .unwrap_or(false)
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_FILTER.clone(),
        }
    }
}

/// Outcome of one walk. `succeeded + failed` is the number of files visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkResult {
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl WalkResult {
    pub fn visited(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl AddAssign for WalkResult {
    fn add_assign(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.elapsed += other.elapsed;
    }
}

pub struct DirectoryWalker {
    filter: SourceFilter,
}

impl DirectoryWalker {
    pub fn new(filter: SourceFilter) -> Self {
        Self { filter }
    }

    /// Matching files under `root`, at any depth. Symlinked files and
    /// directories are followed.
    pub fn files(&self, root: &Path) -> Vec<PathBuf> {
        self.entries(root).into_iter().filter_map(|entry| entry.ok()).collect()
    }

    /// Like [`DirectoryWalker::files`], but keeps matching entries that
    /// could not be inspected (dangling links, permission errors) as
    /// read failures.
    fn entries(&self, root: &Path) -> Vec<std::result::Result<PathBuf, FileIndexError>> {
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => (entry.file_type().is_file() && self.filter.matches(entry.path()))
                    .then(|| Ok(entry.into_path())),
                Err(e) => {
                    let unreadable = e
                        .path()
                        .filter(|path| e.loop_ancestor().is_none() && self.filter.matches(path))
                        .map(Path::to_path_buf);
                    match unreadable {
                        Some(path) => {
                            let source = match e.into_io_error() {
                                Some(io) => IndexerError::Io(io),
                                None => IndexerError::NotFound(path.display().to_string()),
                            };
                            Some(Err(FileIndexError::new(path, ErrorClass::Read, source)))
                        }
                        None => {
                            warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                            None
                        }
                    }
                }
            })
            .collect()
    }

    /// Visits every matching file under `root`. A failing visit is counted
    /// and logged; the walk always continues with the next file.
    pub fn walk<F>(&self, root: &Path, mut visit: F) -> WalkResult
    where
        F: FnMut(&Path) -> std::result::Result<(), FileIndexError>,
    {
        let started = Instant::now();
        let mut result = WalkResult::default();

        for entry in self.entries(root) {
            match entry.and_then(|file| visit(&file)) {
                Ok(()) => result.succeeded += 1,
                Err(e) => {
                    result.failed += 1;
                    warn!(
                        file = %e.path.display(),
                        class = %e.class,
                        reason = %e.source,
                        "Failed to index file"
                    );
                }
            }
        }

        result.elapsed = started.elapsed();
        info!(
            directory = %root.display(),
            succeeded = result.succeeded,
            failed = result.failed,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Indexed directory"
        );
        result
    }
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new(SourceFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_filter_matches_sources_and_headers() {
        let filter = SourceFilter::default();
        assert!(filter.matches(Path::new("src/foo.erl")));
        assert!(filter.matches(Path::new("include/foo.hrl")));
        assert!(!filter.matches(Path::new("foo.beam")));
        assert!(!filter.matches(Path::new("foo.erl.orig")));
        assert!(!filter.matches(Path::new("rebar.config")));
    }

    #[test]
    fn test_custom_filter() {
        let filter = SourceFilter::new(r"\.(erl|escript)$").unwrap();
        assert!(filter.matches(Path::new("run.escript")));
        assert!(!filter.matches(Path::new("a.hrl")));
        assert!(SourceFilter::new("(").is_err());
    }

    #[test]
    fn test_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.erl", "");
        create_file(temp_dir.path(), "sub/b.erl", "");
        create_file(temp_dir.path(), "sub/deep/c.hrl", "");
        create_file(temp_dir.path(), "sub/notes.txt", "");

        let files = DirectoryWalker::default().files(temp_dir.path());

        assert_eq!(
            files,
            vec![
                temp_dir.path().join("a.erl"),
                temp_dir.path().join("sub/b.erl"),
                temp_dir.path().join("sub/deep/c.hrl"),
            ]
        );
    }

    #[test]
    fn test_walk_counts_successes() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.erl", "");
        create_file(temp_dir.path(), "sub/b.erl", "");

        let mut seen = Vec::new();
        let result = DirectoryWalker::default().walk(temp_dir.path(), |file| {
            seen.push(file.to_path_buf());
            Ok(())
        });

        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_walk_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.erl", "");
        create_file(temp_dir.path(), "b.erl", "");
        create_file(temp_dir.path(), "c.erl", "");

        let mut visited = 0;
        let result = DirectoryWalker::default().walk(temp_dir.path(), |file| {
            visited += 1;
            if file.ends_with("a.erl") {
                Err(FileIndexError::new(
                    file,
                    ErrorClass::Parse,
                    IndexerError::Parse("bad".to_string()),
                ))
            } else {
                Ok(())
            }
        });

        assert_eq!(visited, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.visited(), 3);
    }

    #[test]
    fn test_walk_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = DirectoryWalker::default().walk(&temp_dir.path().join("missing"), |_| Ok(()));
        assert_eq!(result.visited(), 0);
    }

    #[test]
    fn test_walk_result_accumulates() {
        let mut total = WalkResult::default();
        total += WalkResult {
            succeeded: 2,
            failed: 1,
            elapsed: Duration::from_millis(5),
        };
        total += WalkResult {
            succeeded: 3,
            failed: 0,
            elapsed: Duration::from_millis(7),
        };
        assert_eq!(total.succeeded, 5);
        assert_eq!(total.failed, 1);
        assert_eq!(total.elapsed, Duration::from_millis(12));
    }
}
