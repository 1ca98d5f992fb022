use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::warn;

use crate::error::{IndexerError, Result};

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Wildcard,
}

/// A directory template: an absolute base followed by relative segments, at
/// most one of which is a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    base: PathBuf,
    segments: Vec<Segment>,
    /// Wildcard matches whose name (minus any `-vsn` suffix) is listed here
    /// are dropped.
    excluded: Vec<String>,
}

impl PathTemplate {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            segments: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Appends a `/`-separated relative path. `*` marks the wildcard segment
    /// and `.` segments are skipped.
    pub fn join(mut self, relative: &str) -> Result<Self> {
        for part in relative.split('/').filter(|p| !p.is_empty() && *p != ".") {
            let segment = if part == WILDCARD {
                Segment::Wildcard
            } else if part.contains(['*', '?', '[']) {
                return Err(IndexerError::Template(format!(
                    "'{}' in {}: only whole-segment '*' is supported",
                    part, relative
                )));
            } else {
                Segment::Literal(part.to_string())
            };

            if segment == Segment::Wildcard && self.has_wildcard() {
                return Err(IndexerError::Template(format!(
                    "more than one wildcard in {}",
                    self.join_display(relative)
                )));
            }
            self.segments.push(segment);
        }
        Ok(self)
    }

    pub fn excluding<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.excluded = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }

    /// Expands the template against the current filesystem. Missing
    /// directories simply produce no entries.
    pub fn expand(&self) -> Vec<PathBuf> {
        let Some(wildcard_at) = self.segments.iter().position(|s| *s == Segment::Wildcard) else {
            let dir = self.literal_path();
            return if dir.is_dir() { vec![dir] } else { Vec::new() };
        };

        let pattern = self.glob_pattern();
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let paths = match glob_with(&pattern, options) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid glob pattern");
                return Vec::new();
            }
        };

        paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_dir())
            .filter(|path| !self.is_excluded(path, wildcard_at))
            .collect()
    }

    fn literal_path(&self) -> PathBuf {
        let mut path = self.base.clone();
        for segment in &self.segments {
            if let Segment::Literal(s) = segment {
                path.push(s);
            }
        }
        path
    }

    fn glob_pattern(&self) -> String {
        let mut pattern = Pattern::escape(&self.base.to_string_lossy());
        for segment in &self.segments {
            if !pattern.ends_with('/') {
                pattern.push('/');
            }
            match segment {
                Segment::Literal(s) => pattern.push_str(&Pattern::escape(s)),
                Segment::Wildcard => pattern.push_str(WILDCARD),
            }
        }
        pattern
    }

    fn is_excluded(&self, path: &Path, wildcard_at: usize) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let matched = path
            .strip_prefix(&self.base)
            .ok()
            .and_then(|rel| {
                rel.components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .nth(wildcard_at)
            })
            .map(|c| c.as_os_str().to_string_lossy().into_owned());

        match matched {
            Some(name) => {
                let app = strip_vsn(&name);
                self.excluded.iter().any(|e| e == app)
            }
            None => false,
        }
    }

    fn join_display(&self, relative: &str) -> String {
        format!("{}/{}", self, relative)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.display())?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{}", s)?,
                Segment::Wildcard => write!(f, "/{}", WILDCARD)?,
            }
        }
        Ok(())
    }
}

/// `stdlib-3.17` → `stdlib`
fn strip_vsn(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((app, vsn)) if vsn.starts_with(|c: char| c.is_ascii_digit()) => app,
        _ => name,
    }
}
