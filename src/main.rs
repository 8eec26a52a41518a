use clap::Parser;
use fieldhist::{Cli, FieldHist, FieldHistError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use std::time::Instant;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let start_time = Instant::now();

    let app = match FieldHist::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&app);
    }

    match app.run_batch() {
        Ok(_summary) => {
            app.output_formatter().info(&format!(
                "Total elapsed time: {:.2}s",
                start_time.elapsed().as_secs_f64()
            ));
            // Job-level failures are part of a completed batch; only an
            // unrecoverable configuration problem is a process failure.
            0
        }
        Err(e) => {
            app.handle_error(&e);
            1
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "fieldhist.json".to_string());

    match FieldHist::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  fieldhist {}", config_path);
            println!("\nEdit the file to point at your archives and entities.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(app: &FieldHist) -> i32 {
    let formatter = app.output_formatter();

    formatter.info("DRY RUN MODE - no archives will be opened");
    formatter.print_separator();

    match app.print_job_plan() {
        Ok(()) => {
            formatter.print_separator();
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            app.handle_error(&e);
            1
        }
    }
}

fn print_startup_error(error: &FieldHistError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldhist::OutputFormat;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli_with(config: Option<PathBuf>, generate_config: bool, dry_run: bool) -> Cli {
        Cli {
            config,
            output_dir: None,
            step: None,
            output_format: OutputFormat::Plain,
            verbose: 0,
            quiet: true,
            dry_run,
            generate_config,
        }
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.json");

        let cli = cli_with(Some(config_path.clone()), true, false);
        let exit_code = handle_generate_config(&cli);

        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("archive_paths"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{
                "archive_paths": ["missing.json"],
                "instance_names": ["A-1"],
                "node_labels": [100],
                "displacement_output_names": ["disp1"]
            }"#,
        )
        .unwrap();

        let cli = cli_with(Some(config_path), false, true);
        let app = FieldHist::from_cli(&cli).unwrap();

        // Dry run never opens archives, so the missing path is fine
        let exit_code = handle_dry_run(&app);
        assert_eq!(exit_code, 0);
    }
}
