use crate::cli::OutputFormat;
use crate::config::{find_package, load_config, NodemetaConfig};
use crate::core::Metadata;
use crate::errors::Error;
use crate::introspect::{Definition, SourceIntrospector, SourceScanner};
use crate::registry::{backend_mode, set_backend_mode, BackendMode, Registrar};
use crate::signature::{DuplicateLabelPolicy, SignatureExtractor};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Options for one `inspect` run; `None` falls back to the config file
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub item: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub backend: Option<BackendMode>,
    pub duplicate_labels: Option<DuplicateLabelPolicy>,
    pub crate_name: Option<String>,
    pub output: Option<PathBuf>,
}

pub fn inspect(config: InspectConfig) -> Result<()> {
    let file_config = load_config();
    let rendered = render(&collect_metadata(&config, &file_config)?, config.format)?;

    match &config.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Scan `config.path` and register every matching callable
pub fn collect_metadata(
    config: &InspectConfig,
    file_config: &NodemetaConfig,
) -> Result<Vec<Arc<Metadata>>> {
    set_backend_mode(config.backend.unwrap_or_else(|| file_config.backend()));

    let search_start = if config.path.is_dir() {
        config.path.clone()
    } else {
        config
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };
    let package = find_package(&search_start);
    let crate_root = package
        .as_ref()
        .map(|p| p.root.clone())
        .unwrap_or_else(|| search_start.clone());
    let module_root = config
        .crate_name
        .clone()
        .or_else(|| file_config.crate_name.clone())
        .or_else(|| package.as_ref().map(|p| p.name.clone()))
        .unwrap_or_else(|| "crate".to_string());
    let version = package.and_then(|p| p.version);

    let scanner = SourceScanner::new(module_root).with_version(version);
    let extractor = SignatureExtractor::new().with_duplicate_labels(
        config
            .duplicate_labels
            .unwrap_or_else(|| file_config.duplicate_labels()),
    );
    let registrar = Registrar::new(backend_mode())
        .with_author(
            config
                .author_name
                .as_deref()
                .unwrap_or_else(|| file_config.author_name()),
            config
                .author_email
                .as_deref()
                .unwrap_or_else(|| file_config.author_email()),
        )
        .with_introspector(SourceIntrospector::with_extractor(extractor));

    let mut collected = Vec::new();
    for file in source_files(&config.path) {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let relative = file.strip_prefix(&crate_root).unwrap_or(&file);
        let definitions = match scanner.scan(relative, &content) {
            Ok(definitions) => definitions,
            Err(e @ Error::Parse { .. }) => {
                warn!("Skipping {}: {}", file.display(), e);
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to scan {}", file.display()))
            }
        };

        for definition in definitions.iter().filter(|d| matches_item(d, config.item.as_deref())) {
            let callable = registrar.register(definition)?;
            match callable.metadata() {
                Some(meta) => collected.push(Arc::clone(meta)),
                None if registrar.mode() != BackendMode::Bare => {
                    warn!(name = callable.name(), "No metadata available")
                }
                None => {}
            }
        }
    }

    info!(count = collected.len(), "Collected metadata");
    Ok(collected)
}

fn matches_item(definition: &Definition, item: Option<&str>) -> bool {
    let Some(callable) = definition.as_callable() else {
        return false;
    };
    match item {
        None => true,
        Some(wanted) => callable.name() == wanted || callable.qualname() == Some(wanted),
    }
}

/// `.rs` files under `path`, skipping `target` and hidden directories
fn source_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name.starts_with('.') || name == "target")
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    files.sort();
    files
}

fn render(metadata: &[Arc<Metadata>], format: OutputFormat) -> Result<String> {
    let records: Vec<&Metadata> = metadata.iter().map(Arc::as_ref).collect();
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&records)?,
        OutputFormat::Yaml => serde_yaml::to_string(&records)?,
    })
}
