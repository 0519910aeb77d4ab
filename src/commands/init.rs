use crate::config::CONFIG_FILE_NAME;
use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# nodemeta configuration

# One of: bare, with-metadata, workflow, core
backend = "with-metadata"

# One of: overwrite, reject
duplicate_labels = "overwrite"

[author]
name = ""
email = ""
"#;

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

/// Write the default configuration into `dir`
pub fn init_config_in(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(())
}
