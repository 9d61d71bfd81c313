//! The marker table: two directional markers, each taking a single
//! counterpart-type argument. The table is a fixed, versionless constant and
//! is always passed explicitly into extraction — no ambient registry.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Marker name: "build the decorated shape from the counterpart".
pub const MAP_FROM: &str = "map_from";
/// Marker name: "convert the decorated shape into the counterpart".
pub const MAP_TO: &str = "map_to";

/// Which way a mapping runs, relative to the marked (owner) shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The owner is built from a counterpart instance.
    FromCounterpart,
    /// The owner converts itself into a counterpart instance.
    IntoCounterpart,
}

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct MarkerDef {
    pub name: &'static str,
    pub description: &'static str,
    pub direction: Direction,
    /// Every marker takes exactly one argument: the counterpart type.
    pub argument: ArgumentDef,
}

/// The full marker set known to extraction.
#[derive(Debug, Clone)]
pub struct MarkerCatalog {
    entries: Vec<MarkerDef>,
}

static STANDARD: Lazy<MarkerCatalog> = Lazy::new(|| MarkerCatalog {
    entries: vec![
        MarkerDef {
            name: MAP_FROM,
            description: "the marked shape can be built from the given counterpart type",
            direction: Direction::FromCounterpart,
            argument: ArgumentDef {
                name: "counterpart",
                description: "the type to build from",
            },
        },
        MarkerDef {
            name: MAP_TO,
            description: "the marked shape can be converted into the given counterpart type",
            direction: Direction::IntoCounterpart,
            argument: ArgumentDef {
                name: "counterpart",
                description: "the type to convert into",
            },
        },
    ],
});

impl MarkerCatalog {
    pub fn standard() -> &'static MarkerCatalog {
        &STANDARD
    }

    pub fn entries(&self) -> &[MarkerDef] {
        &self.entries
    }

    pub fn by_name(&self, name: &str) -> Option<&MarkerDef> {
        self.entries.iter().find(|m| m.name == name)
    }
}

// ------------------------------- Tests ------------------------------------ //
