pub mod cli;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod store;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use compiler::{ExtractionJob, FieldKind, JobPlan};
pub use config::{CliOverrides, Config, TimeAxisConfig};
pub use error::{FieldHistError, Result, UserFriendlyError};

// Core functionality re-exports
pub use driver::{ArchiveFailure, BatchDriver, BatchSummary, JobOutcome, JobStatus};
pub use exporter::SheetWriter;
pub use extractor::{Sample, SeriesExtractor, TimeAxis, TimeSeries};
pub use store::{Archive, EntityKind, EntitySet};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface: owns the configuration and the console/progress
/// surfaces, and sequences compilation and the batch run.
pub struct FieldHist {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl FieldHist {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a FieldHist instance from CLI arguments.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Run the whole batch and print the final summary.
    ///
    /// Request compilation happens first, so an inconsistent configuration
    /// aborts before any archive is opened. Once the driver starts, the
    /// batch always runs to completion; per-job failures are carried in the
    /// returned summary, not surfaced as errors.
    pub fn run_batch(&self) -> Result<BatchSummary> {
        let plan = compiler::compile(&self.config)?;

        self.output_formatter
            .start_operation("Starting batch extraction");
        self.output_formatter.info(&format!(
            "Compiled {} jobs over {} archives",
            plan.total(),
            self.config.archive_paths.len()
        ));

        let driver = BatchDriver::new(
            &self.config,
            &plan,
            &self.output_formatter,
            &self.progress_manager,
        );
        let summary = driver.run();

        self.progress_manager.clear();
        self.output_formatter.print_batch_summary(&summary);

        Ok(summary)
    }

    /// Compile and display the job plan without opening any archive.
    pub fn print_job_plan(&self) -> Result<()> {
        let plan = compiler::compile(&self.config)?;

        self.output_formatter.info(&format!(
            "{} jobs would run over {} archives into {}",
            plan.total(),
            self.config.archive_paths.len(),
            self.config.output_dir.display()
        ));
        self.output_formatter.print_job_plan(&plan);

        Ok(())
    }

    /// Generate a sample configuration file.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(FieldHistError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output.
    pub fn handle_error(&self, error: &FieldHistError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information.
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
