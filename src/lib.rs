// Prevent accidental debug output in library code.
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

//! Abstract value lattice for the ProtoScript static analyzer.
//!
//! Abstract values approximate the sets of concrete runtime values a program
//! expression may take at a program point. The lattice supports join (least
//! upper bound), widening, meet (intersection by strict equality), and the
//! restriction and query operators used by the analyzer's transfer functions.
//!
//! The central type is [`Value`]: an immutable, interned record with seven
//! mostly-orthogonal facets (undefined, null, boolean, number, string,
//! object/symbol reference, accessor property) plus property-attribute
//! metadata. Every distinct value exists exactly once: equality and hashing
//! are reference-fast after canonicalization.
//!
//! # Module structure
//!
//! - `persistent`: immutable, structurally-shared sets and maps
//! - `canonical`: the process-wide interning pools and singleton cache
//! - `strings`: pure predicates classifying concrete strings
//! - `lattice`: the [`Value`] datatype and its collaborator types
//! - `options`: the analysis options bag
//! - `diagnostics`: precision-loss event collector
//! - `error`: internal contract-violation errors

pub mod canonical;
pub mod diagnostics;
pub mod error;
pub mod lattice;
pub mod options;
pub mod persistent;
pub mod strings;

pub use error::AnalysisError;
pub use lattice::label::{HostApi, LabelKind, ObjectLabel, SourceLocation, Summarized};
pub use lattice::property::{
    FreeVariablePartitioning, ObjectProperty, PKey, Partitions, PropertyRef,
};
pub use lattice::Value;
pub use options::AnalysisOptions;
pub use persistent::{Join, PersistentMap, PersistentSet};
