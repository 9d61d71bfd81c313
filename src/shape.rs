//! Declared-shape model. No host-compiler syntax trees here: every later
//! stage works off this representation alone.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A declared property type.
///
/// Ordered containers are kept structural so the dispatcher can recover the
/// element type of a destination container; everything else is carried as an
/// opaque name. `Display` reproduces the canonical source text, so structural
/// equality and textual identity agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn list(element: TypeExpr) -> Self {
        TypeExpr::List(Box::new(element))
    }

    /// Parse the textual form. `Vec<T>` nests; anything else is opaque.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text.strip_prefix("Vec<").and_then(|t| t.strip_suffix('>')) {
            TypeExpr::list(TypeExpr::parse(inner))
        } else {
            TypeExpr::Named(text.to_string())
        }
    }

    /// Element type, for containers only.
    pub fn element(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::List(element) => Some(element),
            TypeExpr::Named(_) => None,
        }
    }

    /// Plain shape name, for non-containers only.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name) => Some(name),
            TypeExpr::List(_) => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::List(element) => write!(f, "Vec<{element}>"),
        }
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TypeExpr::parse(&text))
    }
}

/// Property visibility as declared by the host. Carried through analysis and
/// the plan output; never affects matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Crate,
    Private,
}

/// Where a declaration came from. Documentation only, never semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One declared property. Names are unique within a shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLoc>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        PropertyDescriptor {
            name: name.into(),
            ty: TypeExpr::parse(ty),
            visibility: Visibility::Public,
            location: None,
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(SourceLoc { file: file.into(), line });
        self
    }
}

/// A declared type's identity plus its ordered property list. Immutable once
/// extracted; one per distinct declared type seen during analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShape {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
}

impl TypeShape {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        TypeShape { name: name.into(), properties }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

// ------------------------------- Tests ------------------------------------ //
