use anyhow::Result;
use clap::Parser;
use nodemeta::cli::{Cli, Commands};
use nodemeta::commands::inspect::InspectConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            path,
            format,
            item,
            author_name,
            author_email,
            backend,
            duplicate_labels,
            crate_name,
            output,
        } => nodemeta::commands::inspect::inspect(InspectConfig {
            path,
            format,
            item,
            author_name,
            author_email,
            backend: backend.map(Into::into),
            duplicate_labels: duplicate_labels.map(Into::into),
            crate_name,
            output,
        }),
        Commands::Init { force } => nodemeta::commands::init::init_config(force),
    }
}

// Diagnostics go to stderr so stdout stays machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_env("NODEMETA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
