//! Field correspondence analysis: partition the constructed shape's
//! properties into matched pairs and unmatched leftovers.
//!
//! Matching is case-sensitive exact name equality, independent of declared
//! type. Names are unique within a shape, so the partition is unambiguous.
//! Both lists keep the constructed shape's declaration order, which keeps the
//! generated output deterministic and diff-friendly.

use serde::Serialize;

use crate::extract::MappingSpec;
use crate::shape::{PropertyDescriptor, TypeShape};

/// A same-named property pair: the side being constructed and the side being
/// read from.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    pub dest: PropertyDescriptor,
    pub source: PropertyDescriptor,
}

/// Derived per mapping, never stored: a property is in exactly one list.
#[derive(Debug, Clone, Serialize)]
pub struct FieldCorrespondence {
    pub matched: Vec<MatchedPair>,
    pub unmatched: Vec<PropertyDescriptor>,
}

pub fn partition(dest: &TypeShape, source: &TypeShape) -> FieldCorrespondence {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for prop in &dest.properties {
        match source.property(&prop.name) {
            Some(sp) => matched.push(MatchedPair { dest: prop.clone(), source: sp.clone() }),
            None => unmatched.push(prop.clone()),
        }
    }
    FieldCorrespondence { matched, unmatched }
}

pub fn correspondence_for(spec: &MappingSpec) -> FieldCorrespondence {
    partition(spec.constructed_shape(), spec.source_shape())
}

// ------------------------------- Tests ------------------------------------ //
