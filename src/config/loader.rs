use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::NodemetaConfig;
use crate::errors::{Error, Result};

/// File name searched for in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".nodemeta.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse config from a TOML string
pub fn parse_config(contents: &str) -> Result<NodemetaConfig> {
    toml::from_str::<NodemetaConfig>(contents)
        .map_err(|e| Error::Configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))
}

/// Pure function to try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<NodemetaConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Load the nearest config at or above `start`, else defaults
pub fn load_config_from(start: PathBuf) -> NodemetaConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            NodemetaConfig::default()
        })
}

/// Load config for the working directory, with environment overrides
pub fn load_config() -> NodemetaConfig {
    let config = match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            tracing::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            NodemetaConfig::default()
        }
    };
    config.with_env_overrides(|key| std::env::var(key).ok())
}

/// `[package]` identity from a Cargo manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Directory holding the manifest
    pub root: PathBuf,
    pub name: String,
    /// Literal version; absent when inherited from a workspace
    pub version: Option<String>,
}

/// Read name and version from manifest text; `None` for virtual manifests
pub fn parse_manifest(root: &Path, contents: &str) -> Option<PackageInfo> {
    let manifest: toml::Table = toml::from_str(contents).ok()?;
    let package = manifest.get("package")?.as_table()?;
    Some(PackageInfo {
        root: root.to_path_buf(),
        name: package.get("name")?.as_str()?.to_string(),
        version: package
            .get("version")
            .and_then(toml::Value::as_str)
            .map(str::to_string),
    })
}

/// Nearest package manifest at or above `start`
pub fn find_package(start: &Path) -> Option<PackageInfo> {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH).find_map(|dir| {
        let contents = read_config_file(&dir.join("Cargo.toml")).ok()?;
        parse_manifest(&dir, &contents)
    })
}
