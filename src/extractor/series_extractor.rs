use crate::compiler::{ExtractionJob, FieldKind};
use crate::error::{FieldHistError, Result};
use crate::extractor::time_series::{Sample, TimeAxis, TimeSeries};
use crate::store::{Archive, EntityKind, FieldValue};

/// Walks one archive's frames for one job and produces the job's
/// time series. Holds a shared reference to the opened archive and never
/// mutates it.
pub struct SeriesExtractor<'a> {
    archive: &'a Archive,
    step_name: &'a str,
    time_axis: TimeAxis,
}

impl<'a> SeriesExtractor<'a> {
    pub fn new(archive: &'a Archive, step_name: &'a str, time_axis: TimeAxis) -> Self {
        Self {
            archive,
            step_name,
            time_axis,
        }
    }

    /// Produce the ordered samples for `job`, one per frame of the
    /// configured step.
    ///
    /// Samples are strictly frame-order, one-to-one with the step's frame
    /// sequence. A set whose members carry no value in a frame yields an
    /// empty row, not an error; a frame missing the requested field aborts
    /// the job so the rows cannot silently drift off the time axis.
    pub fn extract(&self, job: &ExtractionJob) -> Result<TimeSeries> {
        let step = self.archive.step(self.step_name)?;

        let labels = [job.entity_label];
        let set = match job.field_kind.entity_kind() {
            EntityKind::Node => self
                .archive
                .node_set_from_labels(&job.instance_name, &labels)?,
            EntityKind::Element => self
                .archive
                .element_set_from_labels(&job.instance_name, &labels)?,
        };

        self.time_axis.check_frame_count(step.frame_count())?;

        let mut samples = Vec::with_capacity(step.frame_count());
        for (frame_index, frame) in step.frames.iter().enumerate() {
            let field_name = job.field_kind.field_name();
            let field =
                frame
                    .field(field_name)
                    .ok_or_else(|| FieldHistError::FieldNotFound {
                        field: field_name.to_string(),
                        frame_index,
                    })?;

            let values = field
                .restrict(&set)
                .into_iter()
                .map(|value| extract_scalar(value, &job.field_kind))
                .collect::<Result<Vec<f64>>>()?;

            samples.push(Sample {
                time: self.time_axis.time_at(frame, frame_index),
                values,
            });
        }

        Ok(TimeSeries { samples })
    }
}

fn extract_scalar(value: &FieldValue, kind: &FieldKind) -> Result<f64> {
    match *kind {
        FieldKind::DisplacementComponent { component } => value.component(component).ok_or(
            FieldHistError::ComponentOutOfRange {
                field: kind.field_name().to_string(),
                component,
            },
        ),
        FieldKind::MaxPrincipalInvariant => Ok(value.max_principal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // A-1 carries nodes 100/101 with displacement vectors, B-1 carries
    // element 200 with a strain tensor, over `frames` evenly recorded frames.
    fn test_archive(frames: usize) -> Archive {
        let frame_docs: Vec<serde_json::Value> = (0..frames)
            .map(|i| {
                let t = i as f64 * 0.1;
                json!({
                    "time": t,
                    "fields": {
                        "U": {
                            "values": [
                                {"instance": "A-1", "label": 100, "data": [t, t * 2.0, 0.0]},
                                {"instance": "A-1", "label": 101, "data": [0.0, t * 3.0, 0.0]}
                            ]
                        },
                        "LE": {
                            "values": [
                                {"instance": "B-1", "label": 200, "max_principal": t * 0.5}
                            ]
                        }
                    }
                })
            })
            .collect();

        serde_json::from_value(json!({
            "steps": {"Step-1": {"frames": frame_docs}},
            "instances": {
                "A-1": {"node_labels": [100, 101]},
                "B-1": {"element_labels": [200]}
            }
        }))
        .unwrap()
    }

    fn displacement_job(label: u64) -> ExtractionJob {
        ExtractionJob {
            instance_name: "A-1".to_string(),
            entity_label: label,
            output_name: "disp1".to_string(),
            field_kind: FieldKind::DisplacementComponent { component: 1 },
        }
    }

    fn strain_job() -> ExtractionJob {
        ExtractionJob {
            instance_name: "B-1".to_string(),
            entity_label: 200,
            output_name: "strain1".to_string(),
            field_kind: FieldKind::MaxPrincipalInvariant,
        }
    }

    #[test]
    fn test_series_covers_every_frame_in_order() {
        let archive = test_archive(5);
        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);

        let series = extractor.extract(&displacement_job(100)).unwrap();
        assert_eq!(series.len(), 5);

        for (i, sample) in series.iter().enumerate() {
            assert_eq!(sample.time, i as f64 * 0.1);
            assert_eq!(sample.values.len(), 1);
            // component 1 of node 100 is 2t
            assert!((sample.values[0] - i as f64 * 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_strain_series_uses_max_principal() {
        let archive = test_archive(3);
        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);

        let series = extractor.extract(&strain_job()).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series.samples[2].values[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_axis_overrides_frame_time() {
        let archive = test_archive(11);
        let extractor = SeriesExtractor::new(
            &archive,
            "Step-1",
            TimeAxis::Fixed {
                end: 1.0,
                points: 11,
            },
        );

        let series = extractor.extract(&displacement_job(100)).unwrap();
        assert_eq!(series.samples[0].time, 0.0);
        assert_eq!(series.samples[10].time, 1.0);
    }

    #[test]
    fn test_fixed_axis_mismatch_fails_job() {
        let archive = test_archive(5);
        let extractor = SeriesExtractor::new(
            &archive,
            "Step-1",
            TimeAxis::Fixed {
                end: 0.01,
                points: 101,
            },
        );

        let err = extractor.extract(&displacement_job(100)).unwrap_err();
        assert!(matches!(err, FieldHistError::TimeAxis { .. }));
    }

    #[test]
    fn test_unknown_label_fails_before_frame_walk() {
        let archive = test_archive(3);
        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);

        let err = extractor.extract(&displacement_job(999)).unwrap_err();
        assert!(matches!(err, FieldHistError::EntityResolution { .. }));
    }

    #[test]
    fn test_unknown_step() {
        let archive = test_archive(3);
        let extractor = SeriesExtractor::new(&archive, "Step-9", TimeAxis::Archive);

        let err = extractor.extract(&strain_job()).unwrap_err();
        assert!(matches!(err, FieldHistError::StepNotFound { .. }));
    }

    #[test]
    fn test_missing_field_on_one_frame_aborts_job() {
        let mut archive = test_archive(8);
        archive
            .steps
            .get_mut("Step-1")
            .unwrap()
            .frames[5]
            .fields
            .remove("LE");

        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);
        let err = extractor.extract(&strain_job()).unwrap_err();

        match err {
            FieldHistError::FieldNotFound { field, frame_index } => {
                assert_eq!(field, "LE");
                assert_eq!(frame_index, 5);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_member_without_values_yields_empty_rows() {
        // Node 101 is dropped from every U field, so its restricted subset
        // is empty; the job still succeeds with empty rows.
        let mut archive = test_archive(4);
        for frame in &mut archive.steps.get_mut("Step-1").unwrap().frames {
            let field = frame.fields.get_mut("U").unwrap();
            field.values.retain(|v| v.label != 101);
        }

        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);
        let series = extractor.extract(&displacement_job(101)).unwrap();

        assert_eq!(series.len(), 4);
        assert!(series.iter().all(|s| s.values.is_empty()));
    }

    #[test]
    fn test_component_out_of_range() {
        let archive = test_archive(2);
        let extractor = SeriesExtractor::new(&archive, "Step-1", TimeAxis::Archive);

        let job = ExtractionJob {
            field_kind: FieldKind::DisplacementComponent { component: 9 },
            ..displacement_job(100)
        };

        let err = extractor.extract(&job).unwrap_err();
        assert!(matches!(err, FieldHistError::ComponentOutOfRange { .. }));
    }
}
