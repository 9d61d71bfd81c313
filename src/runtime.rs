//! The runtime dispatcher. A `MappingSet` holds the compiled mappings and
//! their factory hooks, built once ahead of execution; a `Mapper` is a
//! stateless handle over the set that resolves each "convert this value into
//! that shape" request, re-entering itself for nested shapes and containers.
//!
//! Resolution order, evaluated per call:
//! 1. the destination shape has a build-from mapping accepting the runtime
//!    shape of the source;
//! 2. the runtime shape of the source has a convert-into mapping producing
//!    the destination;
//! 3. the source is an ordered container and the destination names one:
//!    convert element-wise, preserving order;
//! 4. fail with `NoMappingDefined`.

use indexmap::IndexMap;
use thiserror::Error;

use crate::catalog::TypeCatalog;
use crate::diag::BuildError;
use crate::emit::{self, FieldOp, MappingArtifact};
use crate::markers::{Direction, MarkerCatalog};
use crate::shape::TypeExpr;
use crate::value::{Record, Value};

/// Conversions nested deeper than this fail cleanly instead of exhausting
/// the stack.
pub const CONVERT_DEPTH_LIMIT: usize = 128;

/// The caller-supplied factory: `(mapper, other_side_instance) -> carrier`.
pub type FactoryHook = dyn Fn(&Mapper<'_>, &Record) -> Record + Send + Sync;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("no mapping defined from `{source_shape}` to `{destination}`")]
    NoMappingDefined { source_shape: String, destination: String },

    #[error("failed to map container element {index}")]
    ElementMappingFailure {
        index: usize,
        #[source]
        source: Box<MapError>,
    },

    #[error("record `{shape}` has no property `{property}`")]
    MissingProperty { shape: String, property: String },

    #[error("factory hook result has no property `{property}`")]
    MissingCarrierProperty { property: String },

    #[error("conversion exceeded the recursion depth limit of {limit}")]
    RecursionLimitExceeded { limit: usize },
}

/// Factory hooks keyed by owner shape name. Exactly one hook per owner.
#[derive(Default)]
pub struct HookRegistry {
    hooks: IndexMap<String, Box<FactoryHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, owner: impl Into<String>, hook: F) -> Result<(), BuildError>
    where
        F: Fn(&Mapper<'_>, &Record) -> Record + Send + Sync + 'static,
    {
        let owner = owner.into();
        if self.hooks.contains_key(&owner) {
            return Err(BuildError::DuplicateFactoryImplementation { owner });
        }
        self.hooks.insert(owner, Box::new(hook));
        Ok(())
    }
}

struct CompiledMapping {
    artifact: MappingArtifact,
    /// Present exactly when the artifact synthesizes a carrier.
    hook: Option<Box<FactoryHook>>,
}

/// The compiled artifacts plus their hooks. Immutable after construction;
/// shared freely across threads.
pub struct MappingSet {
    mappings: Vec<CompiledMapping>,
}

impl std::fmt::Debug for MappingSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingSet")
            .field("mappings", &self.mappings.len())
            .finish()
    }
}

impl MappingSet {
    /// Extraction, analysis, synthesis, and the factory checks in one pass.
    pub fn compile(
        catalog: &dyn TypeCatalog,
        markers: &MarkerCatalog,
        hooks: HookRegistry,
    ) -> Result<Self, BuildError> {
        let artifacts = emit::build_artifacts(catalog, markers)?;
        Self::from_artifacts(artifacts, hooks)
    }

    /// Pair artifacts with hooks, enforcing the factory contract: a carrier
    /// requires exactly one hook, and no hook may exist without a carrier.
    pub fn from_artifacts(
        artifacts: Vec<MappingArtifact>,
        hooks: HookRegistry,
    ) -> Result<Self, BuildError> {
        let mut hooks = hooks.hooks;
        let mut mappings = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let owner = &artifact.spec.owner.name;
            let hook = hooks.shift_remove(owner);
            match (&artifact.carrier, &hook) {
                (Some(carrier), None) => {
                    return Err(BuildError::MissingFactoryImplementation {
                        owner: owner.clone(),
                        carrier: carrier.name.clone(),
                    });
                }
                (None, Some(_)) => {
                    return Err(BuildError::UnexpectedFactoryImplementation { owner: owner.clone() });
                }
                _ => {}
            }
            mappings.push(CompiledMapping { artifact, hook });
        }
        if let Some(owner) = hooks.keys().next() {
            return Err(BuildError::UnexpectedFactoryImplementation { owner: owner.clone() });
        }
        Ok(MappingSet { mappings })
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &MappingArtifact> {
        self.mappings.iter().map(|m| &m.artifact)
    }

    fn find_from(&self, owner: &str, counterpart: &str) -> Option<&CompiledMapping> {
        self.mappings.iter().find(|m| {
            m.artifact.spec.direction == Direction::FromCounterpart
                && m.artifact.spec.owner.name == owner
                && m.artifact.spec.counterpart.name == counterpart
        })
    }

    fn find_to(&self, owner: &str, counterpart: &str) -> Option<&CompiledMapping> {
        self.mappings.iter().find(|m| {
            m.artifact.spec.direction == Direction::IntoCounterpart
                && m.artifact.spec.owner.name == owner
                && m.artifact.spec.counterpart.name == counterpart
        })
    }
}

/// Stateless dispatcher handle. Cheap to copy, safe to share; holds no
/// mutable cross-call state.
#[derive(Clone, Copy)]
pub struct Mapper<'a> {
    set: &'a MappingSet,
}

impl<'a> Mapper<'a> {
    pub fn new(set: &'a MappingSet) -> Self {
        Mapper { set }
    }

    pub fn convert(&self, source: &Value, dest: &TypeExpr) -> Result<Value, MapError> {
        self.convert_at(source, dest, 0)
    }

    fn convert_at(&self, source: &Value, dest: &TypeExpr, depth: usize) -> Result<Value, MapError> {
        if depth > CONVERT_DEPTH_LIMIT {
            return Err(MapError::RecursionLimitExceeded { limit: CONVERT_DEPTH_LIMIT });
        }

        if let (Some(dest_name), Value::Record(record)) = (dest.name(), source) {
            if let Some(m) = self.set.find_from(dest_name, record.shape()) {
                return self.run(m, record, depth);
            }
            if let Some(m) = self.set.find_to(record.shape(), dest_name) {
                return self.run(m, record, depth);
            }
        }

        if let (Value::List(items), Some(element)) = (source, dest.element()) {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let converted = self.convert_at(item, element, depth + 1).map_err(|cause| {
                    MapError::ElementMappingFailure { index, source: Box::new(cause) }
                })?;
                out.push(converted);
            }
            return Ok(Value::List(out));
        }

        Err(MapError::NoMappingDefined {
            source_shape: source.describe(),
            destination: dest.to_string(),
        })
    }

    /// Execute one compiled mapping. The hook runs at most once per
    /// invocation and is never cached across invocations.
    fn run(&self, m: &CompiledMapping, source: &Record, depth: usize) -> Result<Value, MapError> {
        let carrier: Option<Record> = match &m.hook {
            Some(hook) => Some(hook(self, source)),
            None => None,
        };

        let mut out = Record::new(m.artifact.spec.constructed_shape().name.clone());
        for step in &m.artifact.steps {
            let value = match &step.op {
                FieldOp::Copy => self.source_field(source, &step.dest)?.clone(),
                FieldOp::Convert { into } => {
                    let nested = self.source_field(source, &step.dest)?;
                    self.convert_at(nested, into, depth + 1)?
                }
                FieldOp::FromCarrier => carrier
                    .as_ref()
                    .and_then(|c| c.get(&step.dest))
                    .cloned()
                    .ok_or_else(|| MapError::MissingCarrierProperty {
                        property: step.dest.clone(),
                    })?,
            };
            out.set(step.dest.clone(), value);
        }
        Ok(Value::Record(out))
    }

    fn source_field<'v>(&self, source: &'v Record, name: &str) -> Result<&'v Value, MapError> {
        source.get(name).ok_or_else(|| MapError::MissingProperty {
            shape: source.shape().to_string(),
            property: name.to_string(),
        })
    }
}

// ------------------------------- Tests ------------------------------------ //
