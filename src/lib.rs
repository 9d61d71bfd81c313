//! shapemap: a declarative object-mapping compiler.
//!
//! Two independently-declared data shapes are analyzed for same-named
//! properties, and conversion code is synthesized that builds one shape from
//! the other. Properties with no same-named counterpart are filled by a
//! caller-supplied factory hook instead of being left undefined.
//!
//! Pipeline, leaves first:
//! - [`shape`] / [`catalog`]: the declared-type model and the abstract type
//!   database the host build feeds us.
//! - [`markers`]: the fixed two-entry table of directional markers.
//! - [`extract`] → [`correspond`] → [`synth`] → [`emit`]: marker scan,
//!   matched/unmatched partition, carrier + factory-hook synthesis, and the
//!   per-mapping field plan. All of this runs once, ahead of execution.
//! - [`codegen`]: renders each plan as a compilable Rust source fragment for
//!   a host build to merge into the owning type.
//! - [`runtime`]: the stateless dispatcher that resolves "convert this value
//!   into that shape" against the compiled plans, recursing through nested
//!   shapes and containers.

pub mod catalog;
pub mod cli;
pub mod codegen;
pub mod correspond;
pub mod diag;
pub mod emit;
pub mod extract;
pub mod markers;
pub mod runtime;
pub mod shape;
pub mod synth;
pub mod value;
