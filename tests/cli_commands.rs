//! Integration tests for CLI commands.
//!
//! These run the `erlang-indexer` binary against small projects on disk,
//! with the default SQLite store placed in the project root.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn write(path: PathBuf, content: &str) {
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dirs");
    fs::write(path, content).expect("Failed to write file");
}

/// A project with one app module, one header and a `cowboy` dependency.
fn create_project() -> TempDir {
    let project = TempDir::new().expect("Failed to create temp dir");
    let root = project.path();
    write(root.join("src/app.erl"), "-module(app).\nrun() -> ok.\n");
    write(root.join("include/app.hrl"), "-record(state, {}).\n");
    write(root.join("deps/cowboy/src/cowboy.erl"), "-module(cowboy).\nstart() -> ok.\n");
    write(root.join("erlang_ls.yaml"), "deps_dirs:\n  - \"deps/*\"\n");
    project
}

fn run(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_erlang-indexer"))
        .arg("--root")
        .arg(project)
        .arg("--config")
        .arg(project.join("erlang_ls.yaml"))
        .args(args)
        .output()
        .expect("Failed to run erlang-indexer")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// Index and Stats Command Tests
// ============================================================================

mod index_command {
    use super::*;

    #[test]
    fn test_index_then_stats() {
        let project = create_project();

        let output = run(project.path(), &["index"]);
        assert!(output.status.success(), "index failed: {}", stderr(&output));
        assert!(stdout(&output).contains("Indexed 2 files (0 failed)"));
        assert!(project.path().join(".erlang-index.db").exists());

        let output = run(project.path(), &["stats"]);
        assert!(output.status.success(), "stats failed: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("Documents: 2"), "unexpected stats: {out}");
        assert!(out.contains("Modules:   1"));
        assert!(out.contains("Headers:   1"));
    }

    #[test]
    fn test_stats_without_index() {
        let project = create_project();

        let output = run(project.path(), &["stats"]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("No index at"));
        assert!(!project.path().join(".erlang-index.db").exists());
    }
}

// ============================================================================
// Find Command Tests
// ============================================================================

mod find_command {
    use super::*;

    #[test]
    fn test_find_dependency_module() {
        let project = create_project();

        let output = run(project.path(), &["find", "cowboy.erl"]);
        assert!(output.status.success(), "find failed: {}", stderr(&output));
        let expected = project.path().join("deps/cowboy/src/cowboy.erl");
        assert_eq!(stdout(&output).trim(), format!("file://{}", expected.display()));

        let output = run(project.path(), &["stats"]);
        assert!(stdout(&output).contains("Documents: 1"));
    }

    #[test]
    fn test_find_missing_file_fails() {
        let project = create_project();

        let output = run(project.path(), &["find", "missing.erl"]);
        assert!(!output.status.success());
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains("missing.erl"));
    }
}

// ============================================================================
// Paths Command Tests
// ============================================================================

mod paths_command {
    use super::*;

    #[test]
    fn test_paths_for_deps_category() {
        let project = create_project();

        let output = run(project.path(), &["paths", "--category", "deps"]);
        assert!(output.status.success(), "paths failed: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.starts_with("deps (1 directories)"), "unexpected paths: {out}");
        let src = project.path().join("deps/cowboy/src");
        assert!(out.contains(&format!("  {}\n", src.display())));
    }

    #[test]
    fn test_paths_unknown_category_fails() {
        let project = create_project();

        let output = run(project.path(), &["paths", "--category", "nope"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("unknown category"));
    }
}
