use crate::config::Config;
use crate::error::{FieldHistError, Result};
use crate::store::EntityKind;

/// Field output carrying nodal displacement vectors.
pub const DISPLACEMENT_FIELD: &str = "U";
/// Field output carrying element strain tensors.
pub const STRAIN_FIELD: &str = "LE";

/// The scalar to pull out of each field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    DisplacementComponent { component: usize },
    MaxPrincipalInvariant,
}

impl FieldKind {
    /// Fixed name of the field output this kind reads.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldKind::DisplacementComponent { .. } => DISPLACEMENT_FIELD,
            FieldKind::MaxPrincipalInvariant => STRAIN_FIELD,
        }
    }

    /// Whether the entity set is resolved over nodes or elements.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            FieldKind::DisplacementComponent { .. } => EntityKind::Node,
            FieldKind::MaxPrincipalInvariant => EntityKind::Element,
        }
    }
}

/// One self-contained extraction request. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub instance_name: String,
    pub entity_label: u64,
    pub output_name: String,
    pub field_kind: FieldKind,
}

/// The compiled job lists, one per request family.
#[derive(Debug, Clone, Default)]
pub struct JobPlan {
    pub displacement: Vec<ExtractionJob>,
    pub strain: Vec<ExtractionJob>,
}

impl JobPlan {
    pub fn total(&self) -> usize {
        self.displacement.len() + self.strain.len()
    }

    /// All jobs in processing order: every displacement job, then every
    /// strain job.
    pub fn iter(&self) -> impl Iterator<Item = &ExtractionJob> {
        self.displacement.iter().chain(self.strain.iter())
    }
}

/// Turn the configuration's parallel request arrays into explicit job
/// records, one list per family.
///
/// Rejects the whole batch when a family's arrays have unequal lengths; a
/// short array would otherwise silently truncate the job list. Whether the
/// named instances and labels exist in any archive is not checked here, that
/// is deferred to extraction time.
pub fn compile(config: &Config) -> Result<JobPlan> {
    let displacement = compile_family(
        "displacement",
        config.displacement_instances(),
        &config.node_labels,
        &config.displacement_output_names,
        |_| FieldKind::DisplacementComponent {
            component: config.displacement_component,
        },
    )?;

    let strain = compile_family(
        "strain",
        config.strain_instances(),
        &config.element_labels,
        &config.strain_output_names,
        |_| FieldKind::MaxPrincipalInvariant,
    )?;

    Ok(JobPlan {
        displacement,
        strain,
    })
}

fn compile_family<F>(
    family: &str,
    instances: &[String],
    labels: &[u64],
    outputs: &[String],
    kind_at: F,
) -> Result<Vec<ExtractionJob>>
where
    F: Fn(usize) -> FieldKind,
{
    // Both arrays empty means the family was not requested at all.
    if labels.is_empty() && outputs.is_empty() {
        return Ok(Vec::new());
    }

    if labels.len() != instances.len() || outputs.len() != instances.len() {
        return Err(FieldHistError::Config {
            message: format!(
                "{} request arrays have mismatched lengths: {} instance names, {} labels, {} output names",
                family,
                instances.len(),
                labels.len(),
                outputs.len()
            ),
        });
    }

    Ok((0..instances.len())
        .map(|i| ExtractionJob {
            instance_name: instances[i].clone(),
            entity_label: labels[i],
            output_name: outputs[i].clone(),
            field_kind: kind_at(i),
        })
        .collect())
}
