use crate::config::TimeAxisConfig;
use crate::error::{FieldHistError, Result};
use crate::store::Frame;

/// One output row: the row time and one scalar per member of the resolved
/// entity set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub values: Vec<f64>,
}

/// The ordered samples produced for one job, one per frame.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

/// Resolved time-axis policy for one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeAxis {
    /// Row time is the frame's own recorded time.
    Archive,
    /// Legacy evenly spaced axis: `points` samples from 0 to `end`, indexed
    /// by frame position. Only valid when `points` equals the frame count.
    Fixed { end: f64, points: usize },
}

impl TimeAxis {
    pub fn from_config(config: &TimeAxisConfig) -> Self {
        match *config {
            TimeAxisConfig::Archive => TimeAxis::Archive,
            TimeAxisConfig::Fixed { end, points } => TimeAxis::Fixed { end, points },
        }
    }

    /// The fixed axis silently corrupts the time column when its length and
    /// the frame count drift apart, so reject the mismatch up front.
    pub fn check_frame_count(&self, frame_count: usize) -> Result<()> {
        match *self {
            TimeAxis::Archive => Ok(()),
            TimeAxis::Fixed { points, .. } => {
                if points == frame_count {
                    Ok(())
                } else {
                    Err(FieldHistError::TimeAxis {
                        axis_points: points,
                        frame_count,
                    })
                }
            }
        }
    }

    pub fn time_at(&self, frame: &Frame, frame_index: usize) -> f64 {
        match *self {
            TimeAxis::Archive => frame.time,
            TimeAxis::Fixed { end, points } => {
                if points <= 1 {
                    0.0
                } else {
                    end * frame_index as f64 / (points - 1) as f64
                }
            }
        }
    }
}
