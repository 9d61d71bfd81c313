//! Carrier & factory-hook synthesis.
//!
//! Whenever a mapping leaves destination properties unmatched, an auxiliary
//! carrier shape is defined holding exactly those properties, and a factory
//! hook is declared that the surrounding code must implement to produce a
//! carrier instance. If nothing is unmatched, neither exists and neither may
//! be referenced.

use serde::Serialize;

use crate::correspond::FieldCorrespondence;
use crate::extract::MappingSpec;
use crate::shape::PropertyDescriptor;

/// The synthesized unmapped-properties carrier. Named deterministically from
/// the counterpart's identity.
#[derive(Debug, Clone, Serialize)]
pub struct CarrierDef {
    pub name: String,
    pub fields: Vec<PropertyDescriptor>,
}

/// The declared-but-unimplemented factory signature:
/// `(mapper, other_side_instance) -> carrier instance`.
///
/// `source_shape` is the counterpart for a build-from mapping and the owner
/// itself for a convert-into mapping. In rendered fragments the contract is a
/// trait the owning type must implement; for the in-process execution path it
/// is a closure registered under the owner's name.
#[derive(Debug, Clone, Serialize)]
pub struct HookContract {
    pub trait_name: String,
    pub fn_name: String,
    pub source_shape: String,
    pub carrier: String,
}

pub fn carrier_name(counterpart: &str) -> String {
    format!("{counterpart}UnmappedProperties")
}

pub fn synthesize(
    spec: &MappingSpec,
    correspondence: &FieldCorrespondence,
) -> Option<(CarrierDef, HookContract)> {
    if correspondence.unmatched.is_empty() {
        return None;
    }
    let carrier = CarrierDef {
        name: carrier_name(&spec.counterpart.name),
        fields: correspondence.unmatched.clone(),
    };
    let hook = HookContract {
        trait_name: format!("{}UnmappedFactory", spec.owner.name),
        fn_name: format!("get_{}_unmapped_properties", snake_case(&spec.counterpart.name)),
        source_shape: spec.source_shape().name.clone(),
        carrier: carrier.name.clone(),
    };
    Some((carrier, hook))
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// ------------------------------- Tests ------------------------------------ //
