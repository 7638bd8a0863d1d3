//! Object labels: abstract allocation sites for objects and symbols.
//!
//! An [`ObjectLabel`] names the set of runtime objects allocated at one
//! program point. A *singleton* label represents at most one object; its
//! *summary* twin represents all older objects from the same site.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::persistent::PersistentSet;
use rustc_hash::FxHashSet;

/// The kind of object an object label describes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LabelKind {
    Object,
    Function,
    Array,
    Symbol,
    String,
    Number,
    Boolean,
    Date,
    RegExp,
    Error,
    Math,
    Arguments,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelKind::Object => "Object",
            LabelKind::Function => "Function",
            LabelKind::Array => "Array",
            LabelKind::Symbol => "Symbol",
            LabelKind::String => "String",
            LabelKind::Number => "Number",
            LabelKind::Boolean => "Boolean",
            LabelKind::Date => "Date",
            LabelKind::RegExp => "RegExp",
            LabelKind::Error => "Error",
            LabelKind::Math => "Math",
            LabelKind::Arguments => "Arguments",
        };
        write!(f, "{}", name)
    }
}

/// The host API a host object belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum HostApi {
    Native,
    Dom,
    Other,
}

impl HostApi {
    pub fn short_name(&self) -> &'static str {
        match self {
            HostApi::Native => "native",
            HostApi::Dom => "dom",
            HostApi::Other => "other",
        }
    }
}

/// A source position, used to identify allocation sites.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// An abstract object: an allocation site together with a kind and a
/// singleton/summary polarity.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObjectLabel {
    kind: LabelKind,
    location: SourceLocation,
    singleton: bool,
    host: Option<HostApi>,
}

impl ObjectLabel {
    /// A singleton user-object label for the given allocation site.
    pub fn new(kind: LabelKind, location: SourceLocation) -> Self {
        ObjectLabel {
            kind,
            location,
            singleton: true,
            host: None,
        }
    }

    /// A singleton host-object label.
    pub fn host(kind: LabelKind, location: SourceLocation, api: HostApi) -> Self {
        ObjectLabel {
            kind,
            location,
            singleton: true,
            host: Some(api),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn is_host_object(&self) -> bool {
        self.host.is_some()
    }

    pub fn host_api(&self) -> Option<HostApi> {
        self.host
    }

    pub fn source_location(&self) -> &SourceLocation {
        &self.location
    }

    /// The summary twin of this label.
    pub fn summary(&self) -> Self {
        ObjectLabel {
            singleton: false,
            ..self.clone()
        }
    }

    /// The singleton twin of this label.
    pub fn singleton_variant(&self) -> Self {
        ObjectLabel {
            singleton: true,
            ..self.clone()
        }
    }
}

impl fmt::Display for ObjectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.singleton {
            write!(f, "*")?;
        }
        write!(f, "{}@{}", self.kind, self.location)
    }
}

/// Knowledge about which singleton labels have been summarized, used when
/// joining states across allocations of the same site.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Summarized {
    maybe_summarized: PersistentSet<ObjectLabel>,
    definitely_summarized: PersistentSet<ObjectLabel>,
}

impl Summarized {
    pub fn new(
        maybe_summarized: PersistentSet<ObjectLabel>,
        definitely_summarized: PersistentSet<ObjectLabel>,
    ) -> Self {
        Summarized {
            maybe_summarized,
            definitely_summarized,
        }
    }

    pub fn is_maybe_summarized(&self, label: &ObjectLabel) -> bool {
        self.maybe_summarized.contains(label)
    }

    pub fn is_definitely_summarized(&self, label: &ObjectLabel) -> bool {
        self.definitely_summarized.contains(label)
    }

    /// Collapses summarized singletons in the given set to their summary
    /// labels. A singleton survives alongside its summary only while it is
    /// not definitely summarized.
    pub fn summarize(&self, labels: &PersistentSet<ObjectLabel>) -> PersistentSet<ObjectLabel> {
        let mut result = FxHashSet::default();
        for label in labels.iter() {
            if label.is_singleton() && self.is_maybe_summarized(label) {
                result.insert(label.summary());
                if !self.is_definitely_summarized(label) {
                    result.insert(label.clone());
                }
            } else {
                result.insert(label.clone());
            }
        }
        PersistentSet::from(result)
    }
}
