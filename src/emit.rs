//! Mapping-function emission, step one: compile each specification into an
//! ordered field plan. The plan is what the runtime dispatcher executes and
//! what [`crate::codegen`] renders as a source fragment — a pure function of
//! the specification and its correspondence, with no runtime side effects.

use serde::Serialize;

use crate::catalog::TypeCatalog;
use crate::correspond;
use crate::correspond::FieldCorrespondence;
use crate::diag::BuildError;
use crate::extract::{self, MappingSpec};
use crate::markers::{Direction, MarkerCatalog};
use crate::shape::TypeExpr;
use crate::synth::{self, CarrierDef, HookContract};

/// How one destination property gets its value. The property name itself is
/// the lookup key on the source side — correspondence is by name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldOp {
    /// Same-named property, identical declared type: take the value as-is.
    Copy,
    /// Same-named property, differing declared type: ask the dispatcher to
    /// convert the value into the destination property's type.
    Convert { into: TypeExpr },
    /// No same-named property: read the value off the factory-hook carrier.
    FromCarrier,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldStep {
    pub dest: String,
    #[serde(flatten)]
    pub op: FieldOp,
}

/// The compiled form of one mapping: everything the dispatcher needs at run
/// time and everything codegen needs to render the fragment.
#[derive(Debug, Clone, Serialize)]
pub struct MappingArtifact {
    pub spec: MappingSpec,
    pub correspondence: FieldCorrespondence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<CarrierDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookContract>,
    pub steps: Vec<FieldStep>,
}

pub fn build_artifact(spec: MappingSpec) -> MappingArtifact {
    let correspondence = correspond::correspondence_for(&spec);
    let (carrier, hook) = match synth::synthesize(&spec, &correspondence) {
        Some((carrier, hook)) => (Some(carrier), Some(hook)),
        None => (None, None),
    };

    let steps = {
        let dest = spec.constructed_shape();
        let source = spec.source_shape();
        dest.properties
            .iter()
            .map(|prop| {
                let op = match source.property(&prop.name) {
                    None => FieldOp::FromCarrier,
                    // Converting into the counterpart assigns matched values
                    // directly, with no type-mismatch fallback.
                    Some(_) if spec.direction == Direction::IntoCounterpart => FieldOp::Copy,
                    Some(sp) if sp.ty == prop.ty => FieldOp::Copy,
                    Some(_) => FieldOp::Convert { into: prop.ty.clone() },
                };
                FieldStep { dest: prop.name.clone(), op }
            })
            .collect()
    };

    MappingArtifact { spec, correspondence, carrier, hook, steps }
}

/// Extraction plus per-spec compilation, in catalog declaration order.
pub fn build_artifacts(
    catalog: &dyn TypeCatalog,
    markers: &MarkerCatalog,
) -> Result<Vec<MappingArtifact>, BuildError> {
    let specs = extract::extract_specs(catalog, markers)?;
    Ok(specs.into_iter().map(build_artifact).collect())
}

// ------------------------------- Tests ------------------------------------ //
