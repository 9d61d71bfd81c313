//! Build-time diagnostics. Every variant is fatal to the build; the CLI
//! prefixes the source location when one is known.

use thiserror::Error;

use crate::shape::SourceLoc;

#[derive(Debug, Error)]
pub enum BuildError {
    /// The marker's single argument is not a direct reference to a declared
    /// type.
    #[error("marker `{marker}` on `{owner}`: counterpart `{reference}` does not resolve to a declared type")]
    CounterpartUnresolved {
        owner: String,
        marker: String,
        reference: String,
        location: Option<SourceLoc>,
    },

    /// A type carries more than one directional marker. Rejected outright
    /// rather than processed in declaration order.
    #[error("`{owner}` carries more than one directional marker")]
    AmbiguousDirection {
        owner: String,
        location: Option<SourceLoc>,
    },

    /// Unmatched properties exist but the surrounding code supplies no
    /// factory hook for the owner.
    #[error("`{owner}` has unmapped properties but no factory hook producing `{carrier}` was supplied")]
    MissingFactoryImplementation { owner: String, carrier: String },

    /// The surrounding code registered a second hook for the same owner;
    /// exactly one implementation is required.
    #[error("a factory hook for `{owner}` is already registered")]
    DuplicateFactoryImplementation { owner: String },

    /// A hook was supplied for a mapping that synthesizes no carrier, or for
    /// a type with no mapping at all.
    #[error("a factory hook was supplied for `{owner}`, which requires none")]
    UnexpectedFactoryImplementation { owner: String },
}

impl BuildError {
    pub fn location(&self) -> Option<&SourceLoc> {
        match self {
            BuildError::CounterpartUnresolved { location, .. }
            | BuildError::AmbiguousDirection { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
