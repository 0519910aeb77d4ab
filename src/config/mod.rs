//! Configuration for the metadata compiler.
//!
//! Settings come from `.nodemeta.toml`, found by walking up from the working
//! directory, with `NODEMETA_BACKEND` overriding the backend:
//!
//! ```toml
//! backend = "with-metadata"
//! duplicate_labels = "overwrite"
//!
//! [author]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! ```

mod core;
mod loader;

pub use self::core::{AuthorConfig, NodemetaConfig, BACKEND_ENV_VAR};
pub use loader::{
    directory_ancestors, find_package, load_config, load_config_from, parse_config,
    parse_manifest, PackageInfo, CONFIG_FILE_NAME,
};
