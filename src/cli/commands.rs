use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use erlang_indexer::config::Config;
use erlang_indexer::error::{IndexerError, Result};
use erlang_indexer::index::{IndexRegistry, StandardIndexes};
use erlang_indexer::indexer::{IndexDispatcher, Indexer, SourceDocumentFactory};
use erlang_indexer::paths::{RootCategory, RootPaths};
use erlang_indexer::store::{DocumentStore, SqliteStore, DOCUMENTS};

const DEFAULT_DB: &str = ".erlang-index.db";

#[derive(Parser)]
#[command(name = "erlang-indexer")]
#[command(about = "Index Erlang project, dependency and OTP sources")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Index the project in the current directory
    erlang-indexer index

    # Use an erlang_ls-style config file
    erlang-indexer --config erlang_ls.config index

    # Resolve and index a module from deps or OTP
    erlang-indexer find lists.erl

    # Show resolved root-path sets
    erlang-indexer paths --category deps
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (YAML, TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root, overriding root_uri from the config
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to the document store database
    #[arg(long, global = true, default_value = DEFAULT_DB)]
    pub db: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index the app root-path set
    Index,

    /// Find a file by name on the search path and index it
    Find {
        /// Bare file name, e.g. `lists.erl`
        filename: String,
    },

    /// Print resolved root-path sets
    Paths {
        /// Only this category (app, include, deps, runtime)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show store statistics
    Stats,
}

pub fn load_config(config_path: Option<&Path>, root: Option<&Path>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(root) = root {
        config.root_uri = Some(absolute(root)?.display().to_string());
    } else if config.root_uri.is_none() {
        config.root_uri = Some(std::env::current_dir()?.display().to_string());
    }
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// The default database lives inside the project root.
fn effective_db(config: &Config, db_path: &Path) -> Result<PathBuf> {
    if db_path == Path::new(DEFAULT_DB) {
        Ok(config.root_path()?.join(DEFAULT_DB))
    } else {
        Ok(db_path.to_path_buf())
    }
}

fn build_indexer(config: Config, db_path: &Path) -> Result<(Indexer, StandardIndexes)> {
    let store = Arc::new(SqliteStore::new(effective_db(&config, db_path)?)?);
    let (registry, indexes) = IndexRegistry::standard();
    let dispatcher = IndexDispatcher::new(store, registry);
    let indexer = Indexer::new(config, Arc::new(SourceDocumentFactory::new()), dispatcher);
    Ok((indexer, indexes))
}

pub fn index_project(config: Config, db_path: &Path) -> Result<()> {
    let (indexer, indexes) = build_indexer(config, db_path)?;
    let result = indexer.initialize()?;

    println!(
        "Indexed {} files ({} failed) in {} ms",
        result.succeeded,
        result.failed,
        result.elapsed.as_millis()
    );
    println!(
        "  {} modules, {} references, {} specs",
        indexes.completion.len(),
        indexes.references.len(),
        indexes.specs.len()
    );
    Ok(())
}

pub fn find_file(config: Config, db_path: &Path, filename: &str) -> Result<()> {
    let (indexer, _) = build_indexer(config, db_path)?;
    let uri = indexer.find_and_index_file(filename)?;
    println!("{}", uri);
    Ok(())
}

pub fn show_paths(config: &Config, category: Option<String>) -> Result<()> {
    let categories = match category {
        Some(name) => vec![RootCategory::from_str(&name)
            .ok_or_else(|| IndexerError::Config(format!("unknown category: {}", name)))?],
        None => RootCategory::ALL.to_vec(),
    };

    let roots = RootPaths::new(config);
    for category in categories {
        let dirs = roots.resolve(category)?;
        println!("{} ({} directories)", category, dirs.len());
        for dir in dirs {
            println!("  {}", dir.display());
        }
    }
    Ok(())
}

pub fn show_stats(config: &Config, db_path: &Path) -> Result<()> {
    let db = effective_db(config, db_path)?;
    if !db.exists() {
        println!("No index at {}", db.display());
        return Ok(());
    }

    let store = SqliteStore::new(&db)?;
    let keys = store.keys(DOCUMENTS)?;
    let headers = keys.iter().filter(|k| k.ends_with(".hrl")).count();

    println!("Index: {}", db.display());
    println!("  Documents: {}", keys.len());
    println!("  Modules:   {}", keys.len() - headers);
    println!("  Headers:   {}", headers);
    Ok(())
}
