//! Property keys and polymorphic property references.

use std::fmt;

use crate::error::{raise, AnalysisError};
use crate::lattice::label::{LabelKind, ObjectLabel};
use crate::lattice::value::Value;
use crate::persistent::{Join, PersistentMap, PersistentSet};

/// A concrete property key: a string or a symbol.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PKey {
    String(String),
    Symbol(ObjectLabel),
}

impl PKey {
    /// A string property key.
    pub fn string(s: impl Into<String>) -> Self {
        PKey::String(s.into())
    }

    /// A symbol property key. The label must have symbol kind.
    pub fn symbol(label: ObjectLabel) -> Self {
        if label.kind() != LabelKind::Symbol {
            raise(AnalysisError::NonSymbolLabel);
        }
        PKey::Symbol(label)
    }

    pub fn get_str(&self) -> Option<&str> {
        match self {
            PKey::String(s) => Some(s),
            PKey::Symbol(_) => None,
        }
    }

    pub fn get_object_label(&self) -> Option<&ObjectLabel> {
        match self {
            PKey::String(_) => None,
            PKey::Symbol(label) => Some(label),
        }
    }

    /// The abstract value describing exactly this key.
    pub fn to_value(&self) -> Value {
        match self {
            PKey::String(s) => Value::make_str(s.clone()),
            PKey::Symbol(label) => Value::make_symbol(label.clone()),
        }
    }
}

impl fmt::Display for PKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PKey::String(s) => write!(f, "\"{}\"", crate::strings::escape(s)),
            PKey::Symbol(label) => write!(f, "{}", label),
        }
    }
}

/// Which property of an object a polymorphic value refers to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PropertyRef {
    /// An ordinary named or symbol property.
    Ordinary(PKey),
    /// The internal value property of wrapper objects.
    InternalValue,
    /// The internal prototype link.
    InternalPrototype,
    /// The internal scope link of functions.
    InternalScope,
    /// The default property covering all numeric keys.
    DefaultNumeric,
    /// The default property covering all other keys.
    DefaultOther,
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyRef::Ordinary(key) => write!(f, "{}", key),
            PropertyRef::InternalValue => write!(f, "[[Value]]"),
            PropertyRef::InternalPrototype => write!(f, "[[Prototype]]"),
            PropertyRef::InternalScope => write!(f, "[[Scope]]"),
            PropertyRef::DefaultNumeric => write!(f, "[[default-numeric]]"),
            PropertyRef::DefaultOther => write!(f, "[[default-other]]"),
        }
    }
}

/// A reference to a property of an abstract object. A value carrying one of
/// these is polymorphic: a placeholder for the referenced property.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObjectProperty {
    label: ObjectLabel,
    property: PropertyRef,
}

impl ObjectProperty {
    pub fn new(label: ObjectLabel, property: PropertyRef) -> Self {
        ObjectProperty { label, property }
    }

    pub fn object_label(&self) -> &ObjectLabel {
        &self.label
    }

    pub fn property(&self) -> &PropertyRef {
        &self.property
    }
}

impl fmt::Display for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.property)
    }
}

/// A set of partition tokens. The unit of information tracked per function
/// by the free-variable partitioning.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Partitions(PersistentSet<u64>);

impl Partitions {
    pub fn new(tokens: impl IntoIterator<Item = u64>) -> Self {
        Partitions(tokens.into_iter().collect())
    }

    pub fn tokens(&self) -> &PersistentSet<u64> {
        &self.0
    }
}

impl Join for Partitions {
    fn join(&self, other: &Self) -> Self {
        Partitions(self.0.union(&other.0))
    }
}

/// Partitioning information for the free variables captured by function
/// objects. Opaque to the value lattice except for equality, hashing, and
/// its own join.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct FreeVariablePartitioning {
    partitions: PersistentMap<ObjectLabel, Partitions>,
}

impl FreeVariablePartitioning {
    pub fn new(partitions: PersistentMap<ObjectLabel, Partitions>) -> Self {
        FreeVariablePartitioning { partitions }
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partitions(&self) -> &PersistentMap<ObjectLabel, Partitions> {
        &self.partitions
    }
}

impl Join for FreeVariablePartitioning {
    fn join(&self, other: &Self) -> Self {
        FreeVariablePartitioning {
            partitions: self.partitions.join(&other.partitions),
        }
    }
}

impl fmt::Display for FreeVariablePartitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self
            .partitions
            .iter()
            .map(|(label, parts)| format!("{}#{}", label, parts.tokens().size()))
            .collect();
        entries.sort();
        write!(f, "[{}]", entries.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::label::SourceLocation;

    fn label(kind: LabelKind, line: u32) -> ObjectLabel {
        ObjectLabel::new(kind, SourceLocation::new("test.ps", line, 1))
    }

    #[test]
    fn test_pkey_string_to_value() {
        let v = PKey::string("foo").to_value();
        assert!(v.is_maybe_single_str());
        assert_eq!(v.get_str(), "foo");
    }

    #[test]
    fn test_pkey_symbol_to_value() {
        let sym = label(LabelKind::Symbol, 4);
        let v = PKey::symbol(sym.clone()).to_value();
        assert!(v.is_maybe_symbol());
        assert!(v.get_object_labels().contains(&sym));
    }

    #[test]
    #[should_panic(expected = "non-symbol")]
    fn test_pkey_symbol_rejects_non_symbol() {
        PKey::symbol(label(LabelKind::Object, 4));
    }

    #[test]
    fn test_partitioning_join() {
        let f = label(LabelKind::Function, 1);
        let g = label(LabelKind::Function, 2);

        let a = FreeVariablePartitioning::new(
            PersistentMap::empty().put(f.clone(), Partitions::new([1, 2])),
        );
        let b = FreeVariablePartitioning::new(
            PersistentMap::empty()
                .put(f.clone(), Partitions::new([3]))
                .put(g.clone(), Partitions::new([9])),
        );

        let j = a.join(&b);
        assert_eq!(j.partitions().get(&f).unwrap().tokens().size(), 3);
        assert_eq!(j.partitions().get(&g).unwrap().tokens().size(), 1);
    }
}
