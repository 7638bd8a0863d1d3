//! Immutable, structurally-shared collections with value semantics.
//!
//! Every "mutating" operation returns a new logical collection and leaves
//! the receiver unchanged. Clones share storage; modifications copy. Both
//! collection types are deeply immutable once built, which is what makes
//! them safe to intern and to embed in canonicalized values.

pub mod map;
pub mod set;

pub use map::{Join, PersistentMap};
pub use set::PersistentSet;
