use crate::registry::BackendMode;
use crate::signature::DuplicateLabelPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// YAML sequence
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Skip introspection entirely
    Bare,
    /// Attach metadata (default)
    WithMetadata,
    /// Workflow engine backend
    Workflow,
    /// Core graph runtime backend
    Core,
}

impl From<BackendArg> for BackendMode {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Bare => BackendMode::Bare,
            BackendArg::WithMetadata => BackendMode::WithMetadata,
            BackendArg::Workflow => BackendMode::Workflow,
            BackendArg::Core => BackendMode::Core,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateLabelsArg {
    /// Later outputs replace earlier ones
    Overwrite,
    /// Fail on the first collision
    Reject,
}

impl From<DuplicateLabelsArg> for DuplicateLabelPolicy {
    fn from(arg: DuplicateLabelsArg) -> Self {
        match arg {
            DuplicateLabelsArg::Overwrite => DuplicateLabelPolicy::Overwrite,
            DuplicateLabelsArg::Reject => DuplicateLabelPolicy::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "nodemeta")]
#[command(about = "Extract node metadata from Rust function signatures", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print metadata for every function found under a path
    Inspect {
        /// Source file or directory to inspect
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Only describe callables with this name or qualified name
        #[arg(long)]
        item: Option<String>,

        /// Author name recorded in the metadata
        #[arg(long)]
        author_name: Option<String>,

        /// Author email recorded in the metadata
        #[arg(long)]
        author_email: Option<String>,

        /// Registration backend
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        /// Handling of duplicate output labels
        #[arg(long, value_enum)]
        duplicate_labels: Option<DuplicateLabelsArg>,

        /// Module root (defaults to the package name from Cargo.toml)
        #[arg(long)]
        crate_name: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default .nodemeta.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_arguments() {
        let cli = Cli::try_parse_from([
            "nodemeta",
            "inspect",
            "src",
            "--format",
            "yaml",
            "--backend",
            "with-metadata",
            "--duplicate-labels",
            "reject",
        ])
        .unwrap();
        let Commands::Inspect {
            format,
            backend,
            duplicate_labels,
            ..
        } = cli.command
        else {
            panic!("expected inspect");
        };
        assert_eq!(format, OutputFormat::Yaml);
        assert_eq!(backend.map(BackendMode::from), Some(BackendMode::WithMetadata));
        assert_eq!(
            duplicate_labels.map(DuplicateLabelPolicy::from),
            Some(DuplicateLabelPolicy::Reject)
        );
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
