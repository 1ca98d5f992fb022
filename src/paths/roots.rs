use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

use super::{PathResolver, PathTemplate};

const APP_SUBDIRS: &[&str] = &["src", "test", "include"];
const DEPS_SUBDIRS: &[&str] = &["src", "include"];
const OTP_SUBDIRS: &[&str] = &["src", "include"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootCategory {
    /// Project sources, tests and includes.
    App,
    Include,
    Deps,
    /// Runtime-library (OTP) sources.
    Runtime,
}

impl RootCategory {
    pub const ALL: [RootCategory; 4] = [
        RootCategory::App,
        RootCategory::Include,
        RootCategory::Deps,
        RootCategory::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RootCategory::App => "app",
            RootCategory::Include => "include",
            RootCategory::Deps => "deps",
            RootCategory::Runtime => "runtime",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "app" | "apps" => Some(RootCategory::App),
            "include" => Some(RootCategory::Include),
            "deps" => Some(RootCategory::Deps),
            "runtime" | "otp" => Some(RootCategory::Runtime),
            _ => None,
        }
    }
}

impl fmt::Display for RootCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root-path sets derived from a [`Config`]. Nothing is cached: every call
/// reads the configuration and the filesystem again.
pub struct RootPaths<'a> {
    config: &'a Config,
}

impl<'a> RootPaths<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn templates(&self, category: RootCategory) -> Result<Vec<PathTemplate>> {
        match category {
            RootCategory::App => {
                let root = self.config.root_path()?;
                let mut templates = Vec::new();
                for app in &self.config.apps_dirs {
                    for sub in APP_SUBDIRS {
                        templates.push(PathTemplate::new(&root).join(app)?.join(sub)?);
                    }
                }
                templates.extend(self.templates(RootCategory::Include)?);
                Ok(templates)
            }
            RootCategory::Include => {
                let root = self.config.root_path()?;
                self.config
                    .include_dirs
                    .iter()
                    .map(|dir| PathTemplate::new(&root).join(dir))
                    .collect()
            }
            RootCategory::Deps => {
                let root = self.config.root_path()?;
                let mut templates = Vec::new();
                for dep in &self.config.deps_dirs {
                    for sub in DEPS_SUBDIRS {
                        templates.push(PathTemplate::new(&root).join(dep)?.join(sub)?);
                    }
                }
                Ok(templates)
            }
            RootCategory::Runtime => {
                let Some(otp) = &self.config.otp_path else {
                    return Ok(Vec::new());
                };
                OTP_SUBDIRS
                    .iter()
                    .map(|sub| -> Result<PathTemplate> {
                        Ok(PathTemplate::new(otp)
                            .join("lib/*")?
                            .join(sub)?
                            .excluding(self.config.otp_apps_exclude.iter().cloned()))
                    })
                    .collect()
            }
        }
    }

    pub fn resolve(&self, category: RootCategory) -> Result<Vec<PathBuf>> {
        Ok(PathResolver::resolve(&self.templates(category)?))
    }

    /// Directories searched by on-demand lookups, highest priority first:
    /// app, then deps, then runtime.
    pub fn search_path(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = self.resolve(RootCategory::App)?;
        dirs.extend(self.resolve(RootCategory::Deps)?);
        dirs.extend(self.resolve(RootCategory::Runtime)?);
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn mkdirs(root: &std::path::Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(RootCategory::from_str("app"), Some(RootCategory::App));
        assert_eq!(RootCategory::from_str("OTP"), Some(RootCategory::Runtime));
        assert_eq!(RootCategory::from_str("deps"), Some(RootCategory::Deps));
        assert_eq!(RootCategory::from_str("other"), None);
    }

    #[test]
    fn test_app_paths_cover_sources_tests_and_includes() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), &["src", "test", "include", "priv"]);

        let config = Config::new(dir.path());
        let app = RootPaths::new(&config).resolve(RootCategory::App).unwrap();

        assert_eq!(
            app,
            vec![
                dir.path().join("src"),
                dir.path().join("test"),
                dir.path().join("include"),
            ]
        );
    }

    #[test]
    fn test_apps_dirs_with_wildcard() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), &["apps/one/src", "apps/two/src", "apps/two/test"]);

        let config = Config::new(dir.path())
            .with_apps_dirs(["apps/*"])
            .with_include_dirs(Vec::<String>::new());
        let mut app = RootPaths::new(&config).resolve(RootCategory::App).unwrap();
        app.sort();

        assert_eq!(
            app,
            vec![
                dir.path().join("apps/one/src"),
                dir.path().join("apps/two/src"),
                dir.path().join("apps/two/test"),
            ]
        );
    }

    #[test]
    fn test_missing_include_dirs_resolve_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path()).with_include_dirs(["missing", "also_missing"]);
        let include = RootPaths::new(&config).resolve(RootCategory::Include).unwrap();
        assert!(include.is_empty());
    }

    #[test]
    fn test_runtime_paths_without_otp_path() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        assert!(RootPaths::new(&config)
            .resolve(RootCategory::Runtime)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_runtime_paths_honour_exclusions() {
        let project = TempDir::new().unwrap();
        let otp = TempDir::new().unwrap();
        mkdirs(
            otp.path(),
            &["lib/stdlib-5.1/src", "lib/stdlib-5.1/include", "lib/megaco-4.4/src"],
        );

        let config = Config::new(project.path())
            .with_otp_path(otp.path())
            .with_otp_apps_exclude(["megaco"]);
        let runtime = RootPaths::new(&config).resolve(RootCategory::Runtime).unwrap();

        assert_eq!(
            runtime,
            vec![
                otp.path().join("lib/stdlib-5.1/src"),
                otp.path().join("lib/stdlib-5.1/include"),
            ]
        );
    }

    #[test]
    fn test_search_path_priority_order() {
        let project = TempDir::new().unwrap();
        let otp = TempDir::new().unwrap();
        mkdirs(project.path(), &["src", "deps/lib_a/src"]);
        mkdirs(otp.path(), &["lib/kernel-9.0/src"]);

        let config = Config::new(project.path())
            .with_deps_dirs(["deps/*"])
            .with_otp_path(otp.path());
        let search = RootPaths::new(&config).search_path().unwrap();

        assert_eq!(
            search,
            vec![
                project.path().join("src"),
                project.path().join("deps/lib_a/src"),
                otp.path().join("lib/kernel-9.0/src"),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let config = Config::default();
        assert!(RootPaths::new(&config).resolve(RootCategory::App).is_err());
    }
}
