use crate::config::{CliOverrides, Config};
use crate::error::{FieldHistError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fieldhist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract field-output histories from simulation result archives")]
#[command(
    long_about = "FieldHist walks the frames of one or more simulation result archives and \
                       exports the requested nodal displacement and element strain histories \
                       as tabular files, one file per requested output."
)]
#[command(after_help = "EXAMPLES:\n  \
    fieldhist extraction.json\n  \
    fieldhist extraction.json --output-dir results --verbose\n  \
    fieldhist extraction.json --dry-run\n  \
    fieldhist --generate-config extraction.json")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(required_unless_present = "generate_config")]
    pub config: Option<PathBuf>,

    /// Output directory for the extracted tables
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Analysis step to read frames from (default: from configuration)
    #[arg(long)]
    pub step: Option<String>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show the compiled job plan without opening any archive
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let path = self
            .config
            .as_ref()
            .ok_or_else(|| FieldHistError::Config {
                message: "No configuration file given".to_string(),
            })?;

        let mut config = Config::load_from_file(path)?;
        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_output_dir(self.output_dir.clone())
            .with_step_name(self.step.clone())
    }
}
