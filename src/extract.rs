//! Schema extraction: scan the catalog for marked types, resolve each
//! marker's counterpart reference, and produce one mapping specification per
//! marked type, in catalog declaration order.

use serde::Serialize;

use crate::catalog::TypeCatalog;
use crate::diag::BuildError;
use crate::markers::{Direction, MarkerCatalog};
use crate::shape::TypeShape;

/// One declared mapping: the marked (owner) shape, its resolved counterpart,
/// and which way the conversion runs.
#[derive(Debug, Clone, Serialize)]
pub struct MappingSpec {
    pub owner: TypeShape,
    pub counterpart: TypeShape,
    pub direction: Direction,
}

impl MappingSpec {
    /// The shape the emitted function constructs.
    pub fn constructed_shape(&self) -> &TypeShape {
        match self.direction {
            Direction::FromCounterpart => &self.owner,
            Direction::IntoCounterpart => &self.counterpart,
        }
    }

    /// The shape whose instance the emitted function (and the factory hook)
    /// reads from.
    pub fn source_shape(&self) -> &TypeShape {
        match self.direction {
            Direction::FromCounterpart => &self.counterpart,
            Direction::IntoCounterpart => &self.owner,
        }
    }
}

pub fn extract_specs(
    catalog: &dyn TypeCatalog,
    markers: &MarkerCatalog,
) -> Result<Vec<MappingSpec>, BuildError> {
    let mut specs = Vec::new();
    for decl in catalog.declared_types() {
        let matched: Vec<_> = decl
            .markers
            .iter()
            .filter_map(|mu| markers.by_name(&mu.marker).map(|def| (mu, def)))
            .collect();

        let (marker_use, marker_def) = match matched.as_slice() {
            [] => continue,
            [single] => *single,
            [first, ..] => {
                return Err(BuildError::AmbiguousDirection {
                    owner: decl.shape.name.clone(),
                    location: first.0.location.clone(),
                });
            }
        };

        let counterpart = catalog.resolve(&marker_use.counterpart).ok_or_else(|| {
            BuildError::CounterpartUnresolved {
                owner: decl.shape.name.clone(),
                marker: marker_use.marker.clone(),
                reference: marker_use.counterpart.clone(),
                location: marker_use.location.clone(),
            }
        })?;

        specs.push(MappingSpec {
            owner: decl.shape.clone(),
            counterpart: counterpart.clone(),
            direction: marker_def.direction,
        });
    }
    Ok(specs)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DeclaredCatalog, MarkerUse, TypeDecl};
    use crate::markers::{MAP_FROM, MAP_TO};
    use crate::shape::{PropertyDescriptor, TypeShape};

    fn shape(name: &str) -> TypeShape {
        TypeShape::new(name, vec![PropertyDescriptor::new("id", "i64")])
    }

    #[test]
    fn direction_follows_the_matched_marker() {
        let mut catalog = DeclaredCatalog::new();
        catalog.push(TypeDecl::plain(shape("User")));
        catalog.push(TypeDecl::marked(shape("UserReadDto"), vec![MarkerUse::new(MAP_FROM, "User")]));
        catalog.push(TypeDecl::marked(shape("UserCreateDto"), vec![MarkerUse::new(MAP_TO, "User")]));

        let specs = extract_specs(&catalog, MarkerCatalog::standard()).unwrap();
        assert_eq!(specs.len(), 2);

        assert_eq!(specs[0].owner.name, "UserReadDto");
        assert_eq!(specs[0].counterpart.name, "User");
        assert_eq!(specs[0].direction, Direction::FromCounterpart);
        assert_eq!(specs[0].constructed_shape().name, "UserReadDto");
        assert_eq!(specs[0].source_shape().name, "User");

        assert_eq!(specs[1].direction, Direction::IntoCounterpart);
        assert_eq!(specs[1].constructed_shape().name, "User");
        assert_eq!(specs[1].source_shape().name, "UserCreateDto");
    }

    #[test]
    fn unknown_markers_are_ignored() {
        let mut catalog = DeclaredCatalog::new();
        catalog.push(TypeDecl::marked(shape("User"), vec![MarkerUse::new("serde", "ignored")]));
        let specs = extract_specs(&catalog, MarkerCatalog::standard()).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn unresolved_counterpart_is_a_build_error() {
        let mut catalog = DeclaredCatalog::new();
        catalog.push(TypeDecl::marked(shape("Dto"), vec![MarkerUse::new(MAP_FROM, "Nowhere")]));
        let err = extract_specs(&catalog, MarkerCatalog::standard()).unwrap_err();
        assert!(matches!(err, BuildError::CounterpartUnresolved { ref reference, .. } if reference == "Nowhere"));
    }

    #[test]
    fn two_directional_markers_are_rejected() {
        let mut catalog = DeclaredCatalog::new();
        catalog.push(TypeDecl::plain(shape("User")));
        catalog.push(TypeDecl::marked(
            shape("Dto"),
            vec![MarkerUse::new(MAP_FROM, "User"), MarkerUse::new(MAP_TO, "User")],
        ));
        let err = extract_specs(&catalog, MarkerCatalog::standard()).unwrap_err();
        assert!(matches!(err, BuildError::AmbiguousDirection { ref owner, .. } if owner == "Dto"));
    }
}
