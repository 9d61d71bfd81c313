//! The abstract "type database" the host build implements, plus an in-memory
//! implementation that loads from JSON. Extraction and every later stage
//! depend only on the trait, never on any particular parser.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::shape::{PropertyDescriptor, SourceLoc, TypeExpr, TypeShape, Visibility};

/// One marker attached to a declared type, argument already split out.
#[derive(Debug, Clone)]
pub struct MarkerUse {
    pub marker: String,
    /// The single argument: a direct reference to a declared type.
    pub counterpart: String,
    pub location: Option<SourceLoc>,
}

impl MarkerUse {
    pub fn new(marker: impl Into<String>, counterpart: impl Into<String>) -> Self {
        MarkerUse { marker: marker.into(), counterpart: counterpart.into(), location: None }
    }
}

/// A declared type as the host build sees it: its shape plus any markers.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub shape: TypeShape,
    pub markers: Vec<MarkerUse>,
}

impl TypeDecl {
    pub fn plain(shape: TypeShape) -> Self {
        TypeDecl { shape, markers: Vec::new() }
    }

    pub fn marked(shape: TypeShape, markers: Vec<MarkerUse>) -> Self {
        TypeDecl { shape, markers }
    }
}

/// The declared-type catalog visible to one build.
pub trait TypeCatalog {
    fn declared_types(&self) -> &[TypeDecl];

    /// Static resolution of a type reference to its shape, or unresolved.
    fn resolve(&self, reference: &str) -> Option<&TypeShape>;
}

/// In-memory catalog. Declaration order is preserved; later declarations of
/// the same name shadow earlier ones for resolution.
#[derive(Debug, Clone, Default)]
pub struct DeclaredCatalog {
    decls: Vec<TypeDecl>,
    by_name: IndexMap<String, usize>,
}

impl DeclaredCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: TypeDecl) {
        self.by_name.insert(decl.shape.name.clone(), self.decls.len());
        self.decls.push(decl);
    }

    pub fn extend(&mut self, other: DeclaredCatalog) {
        for decl in other.decls {
            self.push(decl);
        }
    }

    /// Deserialize with JSON-path context in error messages.
    pub fn from_json_str(src: &str) -> Result<Self, String> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let file: CatalogFile = serde_path_to_error::deserialize(de).map_err(|err| {
            let path = err.path().to_string();
            format!("at JSON path {path} → {}", err.into_inner())
        })?;
        Ok(file.into())
    }
}

impl TypeCatalog for DeclaredCatalog {
    fn declared_types(&self) -> &[TypeDecl] {
        &self.decls
    }

    fn resolve(&self, reference: &str) -> Option<&TypeShape> {
        self.by_name.get(reference).map(|&i| &self.decls[i].shape)
    }
}

// ------------------------------ JSON form --------------------------------- //

#[derive(Debug, Deserialize)]
struct CatalogFile {
    types: Vec<TypeDeclJson>,
}

#[derive(Debug, Deserialize)]
struct TypeDeclJson {
    name: String,
    #[serde(default)]
    file: Option<String>,
    properties: Vec<PropertyJson>,
    #[serde(default)]
    markers: Vec<MarkerJson>,
}

#[derive(Debug, Deserialize)]
struct PropertyJson {
    name: String,
    #[serde(rename = "type")]
    ty: TypeExpr,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    line: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MarkerJson {
    marker: String,
    counterpart: String,
    #[serde(default)]
    line: Option<u32>,
}

fn loc(file: &Option<String>, line: Option<u32>) -> Option<SourceLoc> {
    match (file, line) {
        (Some(file), Some(line)) => Some(SourceLoc { file: file.clone(), line }),
        _ => None,
    }
}

impl From<CatalogFile> for DeclaredCatalog {
    fn from(file: CatalogFile) -> Self {
        let mut catalog = DeclaredCatalog::new();
        for decl in file.types {
            let properties = decl
                .properties
                .into_iter()
                .map(|p| PropertyDescriptor {
                    name: p.name,
                    ty: p.ty,
                    visibility: p.visibility,
                    location: loc(&decl.file, p.line),
                })
                .collect();
            let markers = decl
                .markers
                .into_iter()
                .map(|m| MarkerUse {
                    marker: m.marker,
                    counterpart: m.counterpart,
                    location: loc(&decl.file, m.line),
                })
                .collect();
            catalog.push(TypeDecl::marked(TypeShape::new(decl.name, properties), markers));
        }
        catalog
    }
}

// ------------------------------- Tests ------------------------------------ //
