//! Canonicalization: the process-wide interning pools.
//!
//! Every freshly constructed value payload passes through
//! [`canonicalize`]: its representation invariants are checked (in debug
//! mode), its label and string subsets are replaced by interned
//! representatives, and the payload itself is looked up in the value pool.
//! The returned handle is the unique representative of its structural
//! equivalence class, so value equality reduces to pointer identity.
//!
//! The pools are the only shared mutable state in this crate. They are
//! backed by concurrent maps so multiple analyses may run in one process.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::{raise, AnalysisError};
use crate::lattice::flags::ValueFlags;
use crate::lattice::label::ObjectLabel;
use crate::lattice::singletons;
use crate::lattice::value::{Value, ValueData};
use crate::options;
use crate::persistent::PersistentSet;

/// The interning pools.
pub struct Canonicalizer {
    values: DashMap<ValueData, Value>,
    label_sets: DashMap<PersistentSet<ObjectLabel>, PersistentSet<ObjectLabel>>,
    string_sets: DashMap<PersistentSet<String>, PersistentSet<String>>,
}

impl Canonicalizer {
    fn new() -> Canonicalizer {
        Canonicalizer {
            values: DashMap::new(),
            label_sets: DashMap::new(),
            string_sets: DashMap::new(),
        }
    }

    /// Returns the canonical representative of the given label set.
    pub fn canonicalize_set(&self, set: PersistentSet<ObjectLabel>) -> PersistentSet<ObjectLabel> {
        if let Some(found) = self.label_sets.get(&set) {
            return found.clone();
        }
        self.label_sets.entry(set.clone()).or_insert(set).clone()
    }

    /// Returns the canonical representative of the given string set.
    pub fn canonicalize_string_set(&self, set: PersistentSet<String>) -> PersistentSet<String> {
        if let Some(found) = self.string_sets.get(&set) {
            return found.clone();
        }
        self.string_sets.entry(set.clone()).or_insert(set).clone()
    }

    fn canonicalize_value(&self, data: ValueData) -> Value {
        if let Some(found) = self.values.get(&data) {
            return found.clone();
        }
        let fresh = Value(Arc::new(data.clone()));
        self.values.entry(data).or_insert(fresh).clone()
    }

    /// The number of interned values.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    fn clear(&self) {
        self.values.clear();
        self.label_sets.clear();
        self.string_sets.clear();
    }
}

static CANONICALIZER: Lazy<Canonicalizer> = Lazy::new(Canonicalizer::new);

/// The process-wide canonicalizer.
pub fn get() -> &'static Canonicalizer {
    &CANONICALIZER
}

/// Initializes the pools and the singleton cache.
pub fn init() {
    Lazy::force(&CANONICALIZER);
    singletons::init();
}

/// Clears the pools and rebuilds the singleton cache. Value handles
/// obtained before the reset are stale identities afterwards: they compare
/// unequal by reference to newly constructed equal values.
pub fn reset() {
    CANONICALIZER.clear();
    singletons::rebuild();
}

/// Puts the given payload into canonical form and returns the interned
/// representative.
pub(crate) fn canonicalize(mut data: ValueData) -> Value {
    let opts = options::get();
    if opts.debug_or_test_enabled {
        if let Some(reason) = invariant_violation(&data) {
            raise(AnalysisError::InvalidRepresentation {
                value: format!("{:?}", data),
                reason,
            });
        }
        if opts.polymorphic_disabled && data.var.is_some() {
            raise(AnalysisError::UnexpectedPolymorphic);
        }
    }

    let pool = get();
    if let Some(set) = data.object_labels.take() {
        data.object_labels = Some(pool.canonicalize_set(set));
    }
    if let Some(set) = data.getters.take() {
        data.getters = Some(pool.canonicalize_set(set));
    }
    if let Some(set) = data.setters.take() {
        data.setters = Some(pool.canonicalize_set(set));
    }
    if let Some(set) = data.excluded_strings.take() {
        data.excluded_strings = Some(pool.canonicalize_string_set(set));
    }
    if let Some(set) = data.included_strings.take() {
        data.included_strings = Some(pool.canonicalize_string_set(set));
    }
    data.hashcode = data.compute_hashcode();
    pool.canonicalize_value(data)
}

/// Checks the representation invariants, returning the first violation.
fn invariant_violation(v: &ValueData) -> Option<&'static str> {
    if v.flags.intersects(
        ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
    ) && v.str.is_some()
    {
        return Some("fixed string and flags inconsistent");
    }
    if v.flags.contains(ValueFlags::STR_PREFIX)
        && v.str.as_ref().map_or(true, |s| s.is_empty())
    {
        return Some("prefix string inconsistent");
    }
    if v.flags.intersects(ValueFlags::NUM) && v.num.is_some() {
        return Some("number facet inconsistent");
    }
    if matches!(v.num, Some(n) if n.is_nan()) {
        return Some("number constant is NaN");
    }
    if matches!(&v.object_labels, Some(s) if s.is_empty()) {
        return Some("empty set of object labels");
    }
    if matches!(&v.getters, Some(s) if s.is_empty()) {
        return Some("empty set of getters");
    }
    if matches!(&v.setters, Some(s) if s.is_empty()) {
        return Some("empty set of setters");
    }
    if matches!(&v.excluded_strings, Some(s) if s.is_empty()) {
        return Some("empty set of excluded strings");
    }
    if matches!(&v.included_strings, Some(s) if s.size() <= 1) {
        return Some("invalid number of included strings");
    }
    if v.excluded_strings.is_some() && v.included_strings.is_some() {
        return Some("has both excluded strings and included strings");
    }
    if v.flags.contains(ValueFlags::UNKNOWN)
        && (!(v.flags - ValueFlags::UNKNOWN).is_empty()
            || v.str.is_some()
            || v.num.is_some()
            || v.object_labels.is_some()
            || v.getters.is_some()
            || v.setters.is_some())
    {
        return Some("'unknown' inconsistent with other flags");
    }
    if v.var.is_some()
        && (v.flags.intersects(ValueFlags::PRIMITIVE)
            || v.str.is_some()
            || v.num.is_some()
            || v.object_labels.is_some()
            || v.getters.is_some()
            || v.setters.is_some())
    {
        return Some("mix of polymorphic and ordinary value");
    }
    if v.flags
        .intersects(ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR)
        && v.var.is_none()
    {
        return Some("PRESENT set for non-polymorphic value");
    }
    if v.excluded_strings.is_some() && !v.flags.intersects(ValueFlags::STR) {
        return Some("excluded strings present without fuzzy strings");
    }
    if v.included_strings.is_some() && !v.flags.intersects(ValueFlags::STR) {
        return Some("included strings present without fuzzy strings");
    }
    None
}
