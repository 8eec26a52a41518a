use crate::error::{FieldHistError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A simulation result archive: one analysis run, containing named steps
/// (each an ordered frame sequence) and the part instances of the assembly.
///
/// The on-disk form is a self-describing JSON document. An opened archive is
/// read-only; the handle is released when the value is dropped.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Archive {
    pub steps: BTreeMap<String, Step>,
    pub instances: BTreeMap<String, Instance>,
}

/// One analysis step: an ordered sequence of recorded frames.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    pub frames: Vec<Frame>,
}

/// One recorded time/load increment, carrying named field outputs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Frame {
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldOutput>,
}

/// A named physical quantity defined over entities for one frame.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldOutput {
    pub values: Vec<FieldValue>,
}

/// One field value at one entity (node or element).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldValue {
    pub instance: String,
    pub label: u64,
    /// Vector components, indexed positionally.
    #[serde(default)]
    pub data: Vec<f64>,
    /// Largest eigenvalue of the tensor quantity at this point.
    #[serde(default)]
    pub max_principal: f64,
}

/// A part instance: the node and element labels it owns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Instance {
    #[serde(default)]
    pub node_labels: Vec<u64>,
    #[serde(default)]
    pub element_labels: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Element,
}

impl EntityKind {
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Element => "element",
        }
    }
}

/// A resolved collection of entity labels within one instance.
#[derive(Debug, Clone)]
pub struct EntitySet {
    pub instance: String,
    pub kind: EntityKind,
    pub labels: Vec<u64>,
}

impl EntitySet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Archive {
    /// Open an archive document from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| FieldHistError::ArchiveOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| FieldHistError::ArchiveOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn step(&self, name: &str) -> Result<&Step> {
        self.steps
            .get(name)
            .ok_or_else(|| FieldHistError::StepNotFound {
                name: name.to_string(),
            })
    }

    pub fn instance(&self, name: &str) -> Result<&Instance> {
        self.instances
            .get(name)
            .ok_or_else(|| FieldHistError::EntityResolution {
                instance: name.to_string(),
                what: "instance not present in the archive".to_string(),
            })
    }

    /// Resolve a node set from explicit labels under the named instance.
    pub fn node_set_from_labels(&self, instance: &str, labels: &[u64]) -> Result<EntitySet> {
        self.instance(instance)?
            .resolve(instance, EntityKind::Node, labels)
    }

    /// Resolve an element set from explicit labels under the named instance.
    pub fn element_set_from_labels(&self, instance: &str, labels: &[u64]) -> Result<EntitySet> {
        self.instance(instance)?
            .resolve(instance, EntityKind::Element, labels)
    }
}

impl Step {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Frame {
    /// Look up a field output by name; `None` when the frame does not carry
    /// that field.
    pub fn field(&self, name: &str) -> Option<&FieldOutput> {
        self.fields.get(name)
    }
}

impl FieldOutput {
    /// Restrict the field to the members of an entity set, preserving the
    /// field's own value order.
    pub fn restrict(&self, set: &EntitySet) -> Vec<&FieldValue> {
        self.values
            .iter()
            .filter(|v| v.instance == set.instance && set.labels.contains(&v.label))
            .collect()
    }
}

impl FieldValue {
    /// The vector component at `index`, when the value carries one.
    pub fn component(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    pub fn max_principal(&self) -> f64 {
        self.max_principal
    }
}

impl Instance {
    fn resolve(&self, name: &str, kind: EntityKind, labels: &[u64]) -> Result<EntitySet> {
        let known = match kind {
            EntityKind::Node => &self.node_labels,
            EntityKind::Element => &self.element_labels,
        };

        for label in labels {
            if !known.contains(label) {
                return Err(FieldHistError::EntityResolution {
                    instance: name.to_string(),
                    what: format!("{} label {} is unknown", kind.noun(), label),
                });
            }
        }

        Ok(EntitySet {
            instance: name.to_string(),
            kind,
            labels: labels.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_archive() -> Archive {
        serde_json::from_str(
            r#"{
                "steps": {
                    "Step-1": {
                        "frames": [
                            {
                                "time": 0.0,
                                "fields": {
                                    "U": {
                                        "values": [
                                            {"instance": "A-1", "label": 100, "data": [0.0, 0.0, 0.0]},
                                            {"instance": "A-1", "label": 101, "data": [0.0, 0.0, 0.0]}
                                        ]
                                    }
                                }
                            },
                            {
                                "time": 0.5,
                                "fields": {
                                    "U": {
                                        "values": [
                                            {"instance": "A-1", "label": 100, "data": [0.1, 0.2, 0.3]},
                                            {"instance": "A-1", "label": 101, "data": [0.4, 0.5, 0.6]}
                                        ]
                                    },
                                    "LE": {
                                        "values": [
                                            {"instance": "B-1", "label": 200, "max_principal": 0.015}
                                        ]
                                    }
                                }
                            }
                        ]
                    }
                },
                "instances": {
                    "A-1": {"node_labels": [100, 101]},
                    "B-1": {"element_labels": [200]}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let archive = sample_archive();
        write!(file, "{}", serde_json::to_string(&archive).unwrap()).unwrap();

        let opened = Archive::open(file.path()).unwrap();
        assert_eq!(opened.step("Step-1").unwrap().frame_count(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let err = Archive::open("/no/such/archive.json").unwrap_err();
        assert!(matches!(err, FieldHistError::ArchiveOpen { .. }));
    }

    #[test]
    fn test_open_malformed_document() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Archive::open(file.path()).unwrap_err();
        assert!(matches!(err, FieldHistError::ArchiveOpen { .. }));
    }

    #[test]
    fn test_unknown_step() {
        let archive = sample_archive();
        let err = archive.step("Step-9").unwrap_err();
        assert!(matches!(err, FieldHistError::StepNotFound { .. }));
    }

    #[test]
    fn test_node_set_resolution() {
        let archive = sample_archive();
        let set = archive.node_set_from_labels("A-1", &[100]).unwrap();
        assert_eq!(set.kind, EntityKind::Node);
        assert_eq!(set.labels, vec![100]);
    }

    #[test]
    fn test_unknown_instance() {
        let archive = sample_archive();
        let err = archive.node_set_from_labels("Z-9", &[100]).unwrap_err();
        assert!(matches!(err, FieldHistError::EntityResolution { .. }));
    }

    #[test]
    fn test_unknown_label() {
        let archive = sample_archive();
        let err = archive.element_set_from_labels("B-1", &[999]).unwrap_err();
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_restrict_filters_and_preserves_order() {
        let archive = sample_archive();
        let set = archive.node_set_from_labels("A-1", &[101, 100]).unwrap();
        let frame = &archive.step("Step-1").unwrap().frames[1];
        let values = frame.field("U").unwrap().restrict(&set);

        // Field order, not set order
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].label, 100);
        assert_eq!(values[1].label, 101);
    }

    #[test]
    fn test_restrict_with_empty_set() {
        let archive = sample_archive();
        let set = EntitySet {
            instance: "A-1".to_string(),
            kind: EntityKind::Node,
            labels: vec![],
        };
        let frame = &archive.step("Step-1").unwrap().frames[0];
        assert!(frame.field("U").unwrap().restrict(&set).is_empty());
    }

    #[test]
    fn test_value_accessors() {
        let archive = sample_archive();
        let frame = &archive.step("Step-1").unwrap().frames[1];

        let u = &frame.field("U").unwrap().values[0];
        assert_eq!(u.component(1), Some(0.2));
        assert_eq!(u.component(7), None);

        let le = &frame.field("LE").unwrap().values[0];
        assert_eq!(le.max_principal(), 0.015);
    }

    #[test]
    fn test_missing_field_is_none() {
        let archive = sample_archive();
        let frame = &archive.step("Step-1").unwrap().frames[0];
        assert!(frame.field("LE").is_none());
    }
}
