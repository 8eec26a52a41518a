use crate::compiler::{ExtractionJob, JobPlan};
use crate::config::Config;
use crate::error::{Result, UserFriendlyError};
use crate::exporter::SheetWriter;
use crate::extractor::{SeriesExtractor, TimeAxis};
use crate::store::Archive;
use crate::ui::{self, OutputFormatter, ProgressManager};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What happened to one job against one archive.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub archive: String,
    pub output_name: String,
    pub instance_name: String,
    pub entity_label: u64,
    #[serde(flatten)]
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum JobStatus {
    Exported { path: PathBuf, rows: usize },
    Failed { error: String },
}

impl JobOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self.status, JobStatus::Exported { .. })
    }
}

/// An archive that could not be opened and was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveFailure {
    pub path: String,
    pub error: String,
}

/// Aggregated result of one batch run. The batch always completes and always
/// produces a summary, however many jobs failed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub archives_processed: usize,
    pub archives_skipped: Vec<ArchiveFailure>,
    pub jobs: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn exported_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_exported()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.jobs.len() - self.exported_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0 || !self.archives_skipped.is_empty()
    }
}

/// Sequences extraction and export across all configured archives.
///
/// Archives are processed one at a time, jobs within an archive one at a
/// time. Each archive handle lives only for its loop iteration and is
/// released on every exit path. Job failures are recorded and logged at the
/// point of failure and never abort the batch.
pub struct BatchDriver<'a> {
    config: &'a Config,
    plan: &'a JobPlan,
    formatter: &'a OutputFormatter,
    progress: &'a ProgressManager,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        config: &'a Config,
        plan: &'a JobPlan,
        formatter: &'a OutputFormatter,
        progress: &'a ProgressManager,
    ) -> Self {
        Self {
            config,
            plan,
            formatter,
            progress,
        }
    }

    pub fn run(&self) -> BatchSummary {
        let started_at = Utc::now();
        let timer = Instant::now();

        let mut jobs = Vec::new();
        let mut archives_skipped = Vec::new();
        let mut archives_processed = 0;

        let archive_bar = self
            .progress
            .create_archive_progress(self.config.archive_paths.len() as u64);

        for path in &self.config.archive_paths {
            match Archive::open(path) {
                Ok(archive) => {
                    let archive_name = archive_short_name(path);
                    self.formatter
                        .start_operation(&format!("Processing archive {}", archive_name));
                    self.process_archive(&archive, &archive_name, &mut jobs);
                    archives_processed += 1;
                }
                Err(error) => {
                    self.formatter.warning(&format!(
                        "Skipping archive {}: {}",
                        path.display(),
                        error.user_message()
                    ));
                    archives_skipped.push(ArchiveFailure {
                        path: path.display().to_string(),
                        error: error.to_string(),
                    });
                }
            }
            archive_bar.inc(1);
        }

        ui::progress::finish_progress_with_summary(
            &archive_bar,
            &format!("{} archives processed", archives_processed),
            timer.elapsed(),
        );

        BatchSummary {
            started_at,
            archives_processed,
            archives_skipped,
            jobs,
            elapsed: timer.elapsed(),
        }
    }

    fn process_archive(
        &self,
        archive: &Archive,
        archive_name: &str,
        outcomes: &mut Vec<JobOutcome>,
    ) {
        let extractor = SeriesExtractor::new(
            archive,
            &self.config.step_name,
            TimeAxis::from_config(&self.config.time_axis),
        );
        let writer = SheetWriter::new();
        let job_bar = self.progress.create_job_progress(self.plan.total() as u64);

        for job in self.plan.iter() {
            let dest = self.output_path(archive_name, job);
            let status = match self.run_job(&extractor, &writer, job, &dest) {
                Ok(rows) => {
                    self.formatter
                        .success(&format!("{} has been saved ({} rows)", job.output_name, rows));
                    JobStatus::Exported { path: dest, rows }
                }
                Err(error) => {
                    self.formatter.error(&format!(
                        "{} failed for archive {} (instance {}, label {}): {}",
                        job.output_name,
                        archive_name,
                        job.instance_name,
                        job.entity_label,
                        error.user_message()
                    ));
                    JobStatus::Failed {
                        error: error.to_string(),
                    }
                }
            };

            outcomes.push(JobOutcome {
                archive: archive_name.to_string(),
                output_name: job.output_name.clone(),
                instance_name: job.instance_name.clone(),
                entity_label: job.entity_label,
                status,
            });
            job_bar.inc(1);
        }

        job_bar.finish_and_clear();
    }

    fn run_job(
        &self,
        extractor: &SeriesExtractor<'_>,
        writer: &SheetWriter,
        job: &ExtractionJob,
        dest: &Path,
    ) -> Result<usize> {
        let series = extractor.extract(job)?;
        writer.write(&series, dest)?;
        Ok(series.len())
    }

    fn output_path(&self, archive_name: &str, job: &ExtractionJob) -> PathBuf {
        self.config
            .output_dir
            .join(archive_name)
            .join(format!("{}.csv", job.output_name))
    }
}

/// The archive's base file name without extension, used to namespace its
/// output files.
pub fn archive_short_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("archive")
        .to_string()
}
