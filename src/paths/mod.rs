//! Root-path resolution.
//!
//! Templates from the configuration are expanded against the filesystem on
//! every call and each resulting directory is widened with all of its nested
//! subdirectories.

pub mod roots;
pub mod template;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

pub use roots::{RootCategory, RootPaths};
pub use template::{PathTemplate, Segment};

pub struct PathResolver;

impl PathResolver {
    /// Resolves templates to concrete directories, in template order, each
    /// directory followed by its subdirectories. Duplicates keep their first
    /// position.
    pub fn resolve(templates: &[PathTemplate]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut dirs = Vec::new();

        for template in templates {
            let expanded = template.expand();
            if expanded.is_empty() {
                debug!(template = %template, "Template resolved to no directories");
            }
            for dir in expanded {
                for candidate in std::iter::once(dir.clone()).chain(Self::subdirectories(&dir)) {
                    if seen.insert(candidate.clone()) {
                        dirs.push(candidate);
                    }
                }
            }
        }

        dirs
    }

    /// Every directory below `dir`, at any depth, following symlinks. Link
    /// cycles are skipped.
    pub fn subdirectories(dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect()
    }
}
