use crate::error::{FieldHistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Run configuration, deserialized from a JSON document.
///
/// The request families are described by parallel arrays: index `i` of
/// `instance_names`, the family's label array and the family's output-name
/// array together describe one extraction request. A family may be left
/// empty by leaving both its label and output-name arrays empty.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub archive_paths: Vec<PathBuf>,
    /// Shared per-request instance names, used by any family that does not
    /// carry its own instance array.
    #[serde(default)]
    pub instance_names: Vec<String>,
    /// Per-family overrides of `instance_names`.
    #[serde(default)]
    pub displacement_instance_names: Vec<String>,
    #[serde(default)]
    pub strain_instance_names: Vec<String>,
    #[serde(default)]
    pub node_labels: Vec<u64>,
    #[serde(default)]
    pub element_labels: Vec<u64>,
    #[serde(default)]
    pub displacement_output_names: Vec<String>,
    #[serde(default)]
    pub strain_output_names: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_step_name")]
    pub step_name: String,
    #[serde(default = "default_displacement_component")]
    pub displacement_component: usize,
    #[serde(default)]
    pub time_axis: TimeAxisConfig,
}

/// Where row times come from.
///
/// `Archive` reads each frame's recorded time from the result store. `Fixed`
/// is the legacy evenly spaced axis over `points` samples from 0 to `end`;
/// it is rejected at extraction time when `points` does not match the
/// archive's frame count.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimeAxisConfig {
    Archive,
    Fixed { end: f64, points: usize },
}

impl Default for TimeAxisConfig {
    fn default() -> Self {
        TimeAxisConfig::Archive
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_step_name() -> String {
    "Step-1".to_string()
}

fn default_displacement_component() -> usize {
    1
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FieldHistError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FieldHistError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|e| FieldHistError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    pub fn merge_with_cli_args(&mut self, overrides: &CliOverrides) {
        if let Some(ref output_dir) = overrides.output_dir {
            self.output_dir = output_dir.clone();
        }

        if let Some(ref step_name) = overrides.step_name {
            self.step_name = step_name.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.archive_paths.is_empty() {
            return Err(FieldHistError::Config {
                message: "At least one archive path must be specified".to_string(),
            });
        }

        if self.step_name.is_empty() {
            return Err(FieldHistError::Config {
                message: "step_name must not be empty".to_string(),
            });
        }

        if let TimeAxisConfig::Fixed { end, points } = self.time_axis {
            if points == 0 {
                return Err(FieldHistError::Config {
                    message: "time_axis.points must be greater than 0".to_string(),
                });
            }
            if !end.is_finite() {
                return Err(FieldHistError::Config {
                    message: "time_axis.end must be a finite number".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FieldHistError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;

        std::fs::write(path, content).map_err(|e| FieldHistError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    /// The instance names a family pairs its labels with.
    pub fn displacement_instances(&self) -> &[String] {
        if self.displacement_instance_names.is_empty() {
            &self.instance_names
        } else {
            &self.displacement_instance_names
        }
    }

    pub fn strain_instances(&self) -> &[String] {
        if self.strain_instance_names.is_empty() {
            &self.instance_names
        } else {
            &self.strain_instance_names
        }
    }

    pub fn create_sample_config() -> String {
        let sample = Config {
            archive_paths: vec![PathBuf::from("results/run-1.json")],
            instance_names: vec!["PART-1".to_string()],
            displacement_instance_names: vec![],
            strain_instance_names: vec![],
            node_labels: vec![100],
            element_labels: vec![200],
            displacement_output_names: vec!["disp1".to_string()],
            strain_output_names: vec!["strain1".to_string()],
            output_dir: PathBuf::from("extracted"),
            step_name: default_step_name(),
            displacement_component: default_displacement_component(),
            time_axis: TimeAxisConfig::default(),
        };
        serde_json::to_string_pretty(&sample).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
    pub step_name: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_step_name(mut self, step_name: Option<String>) -> Self {
        self.step_name = step_name;
        self
    }
}
