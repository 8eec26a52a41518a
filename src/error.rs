use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldHistError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to open archive {path}: {message}")]
    ArchiveOpen { path: String, message: String },

    #[error("Step not found in archive: {name}")]
    StepNotFound { name: String },

    #[error("Entity resolution failed for instance {instance}: {what}")]
    EntityResolution { instance: String, what: String },

    #[error("Field {field} not present on frame {frame_index}")]
    FieldNotFound { field: String, frame_index: usize },

    #[error("Component {component} out of range for a value of field {field}")]
    ComponentOutOfRange { field: String, component: usize },

    #[error("Fixed time axis has {axis_points} points but the step has {frame_count} frames")]
    TimeAxis {
        axis_points: usize,
        frame_count: usize,
    },

    #[error("Failed to write {path}: {message}")]
    Export { path: String, message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FieldHistError {
    fn user_message(&self) -> String {
        match self {
            FieldHistError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            FieldHistError::ArchiveOpen { path, message } => {
                format!("Cannot open archive {}: {}", path, message)
            }
            FieldHistError::StepNotFound { name } => {
                format!("The archive does not contain a step named {}", name)
            }
            FieldHistError::EntityResolution { instance, what } => {
                format!("Entity resolution failed for instance {}: {}", instance, what)
            }
            FieldHistError::FieldNotFound { field, frame_index } => {
                format!(
                    "Field output {} is missing on frame {}",
                    field, frame_index
                )
            }
            FieldHistError::TimeAxis {
                axis_points,
                frame_count,
            } => {
                format!(
                    "Fixed time axis length {} does not match the archive's {} frames",
                    axis_points, frame_count
                )
            }
            FieldHistError::Export { path, message } => {
                format!("Failed to write output file {}: {}", path, message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FieldHistError::Config { .. } => Some(
                "Check the configuration file: it must be valid JSON, and each request family's instance, label and output-name arrays must have equal lengths.".to_string()
            ),
            FieldHistError::ArchiveOpen { .. } => Some(
                "Verify the archive path exists and the file is a readable result archive.".to_string()
            ),
            FieldHistError::StepNotFound { .. } => Some(
                "Set step_name in the configuration to a step that exists in the archive.".to_string()
            ),
            FieldHistError::EntityResolution { .. } => Some(
                "Check the instance name and the node/element label against the archive contents.".to_string()
            ),
            FieldHistError::TimeAxis { .. } => Some(
                "Adjust time_axis.points to the archive's frame count, or switch time_axis.mode to \"archive\".".to_string()
            ),
            FieldHistError::Export { .. } => Some(
                "Ensure the output directory is writable and has enough free space.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FieldHistError {
    fn from(error: serde_json::Error) -> Self {
        FieldHistError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldHistError>;
