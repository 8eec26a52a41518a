use crate::compiler::{FieldKind, JobPlan};
use crate::driver::BatchSummary;
use crate::error::{FieldHistError, UserFriendlyError};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => println!("WARNING: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{}", ROCKET, style(operation).bold());
                } else {
                    println!("> {}", operation);
                }
            }
            OutputMode::Json => self.print_json_message("operation_start", operation),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &FieldHistError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Final batch report: always printed, even when every job failed.
    pub fn print_batch_summary(&self, summary: &BatchSummary) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(summary),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_summary(summary),
        }
    }

    /// Compiled job listing for dry runs.
    pub fn print_job_plan(&self, plan: &JobPlan) {
        if self.mode == OutputMode::Json {
            let jobs: Vec<serde_json::Value> = plan
                .iter()
                .map(|job| {
                    serde_json::json!({
                        "output_name": job.output_name,
                        "instance": job.instance_name,
                        "label": job.entity_label,
                        "field": job.field_kind.field_name(),
                    })
                })
                .collect();
            self.print_json_object(&serde_json::json!({
                "type": "job_plan",
                "jobs": jobs
            }));
            return;
        }

        for job in plan.iter() {
            let kind = match job.field_kind {
                FieldKind::DisplacementComponent { component } => {
                    format!("displacement component {}", component)
                }
                FieldKind::MaxPrincipalInvariant => "max principal strain".to_string(),
            };
            println!(
                "  {} <- {} of {} {} (instance {})",
                job.output_name,
                kind,
                job.field_kind.entity_kind().noun(),
                job.entity_label,
                job.instance_name
            );
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &BatchSummary) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Batch extraction completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Batch extraction completed!");
        }

        println!();
        println!("  Archives processed: {}", summary.archives_processed);
        if !summary.archives_skipped.is_empty() {
            println!("  Archives skipped:   {}", summary.archives_skipped.len());
            for failure in &summary.archives_skipped {
                println!("    - {}: {}", failure.path, failure.error);
            }
        }
        println!("  Outputs written:    {}", summary.exported_count());

        if summary.failed_count() > 0 {
            println!("  Jobs failed:        {}", summary.failed_count());
            for job in summary.jobs.iter().filter(|j| !j.is_exported()) {
                println!(
                    "    - {} ({}, instance {}, label {})",
                    job.output_name, job.archive, job.instance_name, job.entity_label
                );
            }
        }

        println!(
            "  Time taken:         {}",
            format_duration(summary.elapsed)
        );

        self.print_separator();
    }

    fn print_plain_summary(&self, summary: &BatchSummary) {
        println!("COMPLETED: Batch extraction");
        println!("Archives processed: {}", summary.archives_processed);
        println!("Archives skipped: {}", summary.archives_skipped.len());
        println!("Outputs written: {}", summary.exported_count());
        println!("Jobs failed: {}", summary.failed_count());
        println!("Duration: {:?}", summary.elapsed);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
