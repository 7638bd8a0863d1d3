//! The abstract value record: construction, canonicalization plumbing, and
//! facet queries.
//!
//! A [`Value`] approximates a set of concrete runtime values. It carries
//! seven mostly-orthogonal facets (undefined, null, boolean, number, string,
//! object/symbol reference, accessor property) plus property-attribute
//! metadata. Values are immutable and interned: after canonicalization,
//! equality and hashing are reference-fast, and every constructive
//! operation returns the canonical representative of its result.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashSet, FxHasher};

use crate::canonical;
use crate::error::{raise, AnalysisError};
use crate::lattice::flags::ValueFlags;
use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation, Summarized};
use crate::lattice::property::{FreeVariablePartitioning, ObjectProperty, PKey};
use crate::lattice::singletons;
use crate::options;
use crate::persistent::PersistentSet;
use crate::strings;

/// The structural payload of an abstract value.
///
/// Structural equality and hashing live here; the interning pool is keyed
/// by this type. User code holds [`Value`] handles instead.
#[derive(Clone, Debug)]
pub(crate) struct ValueData {
    /// Facet membership, attributes, and meta-states.
    pub(crate) flags: ValueFlags,
    /// Single concrete number; may be +/-Infinity but never NaN.
    pub(crate) num: Option<f64>,
    /// Single concrete string, or the common prefix when `STR_PREFIX` is set.
    pub(crate) str: Option<String>,
    /// Possible objects and symbols. Never empty when present.
    pub(crate) object_labels: Option<PersistentSet<ObjectLabel>>,
    /// Possible getters. Never empty when present.
    pub(crate) getters: Option<PersistentSet<ObjectLabel>>,
    /// Possible setters. Never empty when present.
    pub(crate) setters: Option<PersistentSet<ObjectLabel>>,
    /// Strings excluded from the fuzzy string facet. Never empty when present.
    pub(crate) excluded_strings: Option<PersistentSet<String>>,
    /// Exhaustive enumeration of the possible strings. Size >= 2 when present.
    pub(crate) included_strings: Option<PersistentSet<String>>,
    /// Partitioning of free variables, opaque to the lattice.
    pub(crate) free_variable_partitioning: Option<FreeVariablePartitioning>,
    /// Property reference; the value is polymorphic when present.
    pub(crate) var: Option<ObjectProperty>,
    /// Precomputed identity-independent hash, set during canonicalization.
    pub(crate) hashcode: u64,
}

impl ValueData {
    /// The empty (bottom) payload.
    pub(crate) fn none() -> ValueData {
        ValueData {
            flags: ValueFlags::empty(),
            num: None,
            str: None,
            object_labels: None,
            getters: None,
            setters: None,
            excluded_strings: None,
            included_strings: None,
            free_variable_partitioning: None,
            var: None,
            hashcode: 0,
        }
    }

    pub(crate) fn compute_hashcode(&self) -> u64 {
        fn sub<T: Hash>(t: &T) -> u64 {
            let mut h = FxHasher::default();
            t.hash(&mut h);
            h.finish()
        }
        let mut code = (self.flags.bits() as u64).wrapping_mul(17);
        if let Some(n) = self.num {
            code = code.wrapping_add(n.to_bits());
        }
        if let Some(s) = &self.str {
            code = code.wrapping_add(sub(s));
        }
        if let Some(v) = &self.var {
            code = code.wrapping_add(sub(v));
        }
        if let Some(s) = &self.object_labels {
            code = code.wrapping_add(sub(s));
        }
        if let Some(s) = &self.getters {
            code = code.wrapping_add(sub(s).rotate_left(1));
        }
        if let Some(s) = &self.setters {
            code = code.wrapping_add(sub(s).rotate_left(2));
        }
        if let Some(s) = &self.excluded_strings {
            code = code.wrapping_add(sub(s).rotate_left(3));
        }
        if let Some(s) = &self.included_strings {
            code = code.wrapping_add(sub(s).rotate_left(4));
        }
        if let Some(p) = &self.free_variable_partitioning {
            code = code.wrapping_add(sub(p));
        }
        code
    }
}

impl PartialEq for ValueData {
    fn eq(&self, other: &Self) -> bool {
        // -0.0 and 0.0 are distinct single numbers; compare by bits.
        self.flags == other.flags
            && self.num.map(f64::to_bits) == other.num.map(f64::to_bits)
            && self.str == other.str
            && self.var == other.var
            && self.object_labels == other.object_labels
            && self.getters == other.getters
            && self.setters == other.setters
            && self.excluded_strings == other.excluded_strings
            && self.included_strings == other.included_strings
            && self.free_variable_partitioning == other.free_variable_partitioning
    }
}

impl Eq for ValueData {}

impl Hash for ValueData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hashcode);
    }
}

/// An interned abstract value.
///
/// Equality and hashing are reference-fast: two handles compare equal
/// exactly when they point at the same canonical representative.
#[derive(Clone)]
pub struct Value(pub(crate) Arc<ValueData>);

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hashcode);
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({})", self)
    }
}

impl crate::persistent::Join for Value {
    fn join(&self, other: &Self) -> Self {
        self.join_with(other, false)
    }
}

impl Value {
    pub(crate) fn data(&self) -> &ValueData {
        &self.0
    }

    pub(crate) fn flags(&self) -> ValueFlags {
        self.0.flags
    }

    /// Copy-with-change: clones the payload, applies the patch, and returns
    /// the canonical representative of the result. Callers changing several
    /// fields see a single canonicalization.
    pub(crate) fn modified(&self, patch: impl FnOnce(&mut ValueData)) -> Value {
        let mut data = self.data().clone();
        patch(&mut data);
        canonical::canonicalize(data)
    }

    // === Checks ===============================================================

    pub(crate) fn check_not_unknown(&self) {
        if self.is_unknown() {
            raise(AnalysisError::UnexpectedUnknown);
        }
    }

    /// Asserts that the value is neither polymorphic nor 'unknown'.
    pub fn check_not_polymorphic_or_unknown(&self) {
        if self.is_polymorphic() {
            raise(AnalysisError::UnexpectedPolymorphic);
        }
        if self.is_unknown() {
            raise(AnalysisError::UnexpectedUnknown);
        }
    }

    pub(crate) fn check_no_getters_setters(&self) {
        if self.0.getters.is_some() || self.0.setters.is_some() {
            raise(AnalysisError::UnexpectedGetterSetter);
        }
    }

    /// Asserts that this value is non-empty (or polymorphic), unless dead
    /// flow is allowed to propagate.
    pub fn assert_non_empty(&self) {
        self.check_not_unknown();
        if self.is_polymorphic() {
            return;
        }
        if !self.flags().intersects(ValueFlags::PRIMITIVE)
            && self.0.num.is_none()
            && self.0.str.is_none()
            && self.0.object_labels.is_none()
            && self.0.getters.is_none()
            && self.0.setters.is_none()
            && !options::get().propagate_dead_flow
        {
            raise(AnalysisError::EmptyValue);
        }
    }

    // === Polymorphic values ===================================================

    /// Checks whether this value is polymorphic.
    pub fn is_polymorphic(&self) -> bool {
        self.0.var.is_some()
    }

    pub fn is_polymorphic_or_unknown(&self) -> bool {
        self.0.var.is_some() || self.flags().contains(ValueFlags::UNKNOWN)
    }

    /// The property reference of a polymorphic value.
    pub fn get_object_property(&self) -> Option<&ObjectProperty> {
        self.0.var.as_ref()
    }

    /// Constructs a fresh polymorphic value from the attributes (including
    /// absence and presence) of this value.
    pub fn make_polymorphic(&self, prop: ObjectProperty) -> Value {
        let mut new_flags = self.flags()
            & (ValueFlags::ATTR
                | ValueFlags::ABSENT
                | ValueFlags::PRESENT_DATA
                | ValueFlags::PRESENT_ACCESSOR
                | ValueFlags::EXTENDEDSCOPE);
        if !self.is_unknown() {
            if self.is_maybe_present_data() {
                new_flags |= ValueFlags::PRESENT_DATA;
            }
            if self.is_maybe_present_accessor() {
                new_flags |= ValueFlags::PRESENT_ACCESSOR;
            }
        }
        let mut data = ValueData::none();
        data.flags = new_flags;
        data.var = Some(prop);
        canonical::canonicalize(data)
    }

    /// Constructs a fresh non-polymorphic value using the attributes
    /// (excluding presence) of this value.
    pub fn make_non_polymorphic(&self) -> Value {
        if self.0.var.is_none() {
            return self.clone();
        }
        self.modified(|d| {
            d.var = None;
            d.flags -= ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR;
        })
    }

    // === Bottom, absent, unknown ==============================================

    pub(crate) fn really_make_none() -> Value {
        canonical::canonicalize(ValueData::none())
    }

    /// Constructs the empty abstract value (bottom).
    pub fn make_none() -> Value {
        singletons::get().none.clone()
    }

    /// Returns true if this abstract value represents no concrete values.
    /// Attributes and the modified flag are ignored; 'unknown' is non-none.
    pub fn is_none(&self) -> bool {
        if self.0.var.is_none() {
            !self.flags().intersects(
                ValueFlags::PRIMITIVE | ValueFlags::ABSENT | ValueFlags::UNKNOWN,
            ) && self.0.num.is_none()
                && self.0.str.is_none()
                && self.0.object_labels.is_none()
                && self.0.getters.is_none()
                && self.0.setters.is_none()
        } else {
            !self.flags().intersects(
                ValueFlags::ABSENT | ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR,
            )
        }
    }

    pub(crate) fn really_make_absent() -> Value {
        let mut data = ValueData::none();
        data.flags = ValueFlags::ABSENT;
        canonical::canonicalize(data)
    }

    /// Constructs the absent value.
    pub fn make_absent() -> Value {
        singletons::get().absent.clone()
    }

    pub(crate) fn really_make_unknown() -> Value {
        let mut data = ValueData::none();
        data.flags = ValueFlags::UNKNOWN;
        canonical::canonicalize(data)
    }

    /// Constructs the unknown value (lazy propagation placeholder).
    pub fn make_unknown() -> Value {
        singletons::get().unknown.clone()
    }

    /// Returns true if this value is 'unknown'.
    pub fn is_unknown(&self) -> bool {
        self.flags().contains(ValueFlags::UNKNOWN)
    }

    /// Returns true if this value belongs to a maybe-absent property.
    pub fn is_maybe_absent(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ABSENT)
    }

    /// Returns true if this value belongs to a definitely-present property.
    pub fn is_not_absent(&self) -> bool {
        !self.is_maybe_absent() && self.is_maybe_present()
    }

    /// Constructs a value as a copy of this value but marked as maybe absent.
    pub fn join_absent(&self) -> Value {
        self.check_not_unknown();
        if self.is_maybe_absent() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::ABSENT)
    }

    // === Presence =============================================================

    /// Returns true if this value is maybe present.
    pub fn is_maybe_present(&self) -> bool {
        self.check_not_unknown();
        if self.is_polymorphic() {
            self.flags()
                .intersects(ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR)
        } else {
            self.flags().intersects(ValueFlags::PRIMITIVE)
                || self.0.num.is_some()
                || self.0.str.is_some()
                || self.0.object_labels.is_some()
                || self.0.getters.is_some()
                || self.0.setters.is_some()
        }
    }

    /// Returns true if this value is maybe present as a data property.
    pub fn is_maybe_present_data(&self) -> bool {
        self.check_not_unknown();
        if self.is_polymorphic() {
            self.flags().contains(ValueFlags::PRESENT_DATA)
        } else {
            self.flags().intersects(ValueFlags::PRIMITIVE)
                || self.0.num.is_some()
                || self.0.str.is_some()
                || self.0.object_labels.is_some()
        }
    }

    /// Returns true if this value is maybe present as an accessor property.
    pub fn is_maybe_present_accessor(&self) -> bool {
        self.check_not_unknown();
        if self.is_polymorphic() {
            self.flags().contains(ValueFlags::PRESENT_ACCESSOR)
        } else {
            self.0.getters.is_some() || self.0.setters.is_some()
        }
    }

    pub fn is_maybe_polymorphic_present(&self) -> bool {
        self.flags()
            .intersects(ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR)
    }

    pub fn is_maybe_present_or_unknown(&self) -> bool {
        self.is_unknown() || self.is_maybe_present()
    }

    pub fn is_not_present(&self) -> bool {
        self.check_not_unknown();
        !self.is_maybe_present()
    }

    pub fn is_not_present_not_absent(&self) -> bool {
        self.check_not_unknown();
        !self.is_maybe_absent() && !self.is_maybe_present()
    }

    // === Extended scope =======================================================

    /// Returns a value as this one but marked as having extended scope.
    pub fn make_extended_scope(&self) -> Value {
        self.check_not_unknown();
        if self.is_extended_scope() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::EXTENDEDSCOPE)
    }

    /// Returns true if this value is marked as having extended scope.
    pub fn is_extended_scope(&self) -> bool {
        self.flags().contains(ValueFlags::EXTENDEDSCOPE)
    }

    // === Free-variable partitioning ===========================================

    /// Returns the free-variable partitioning info, or `None` if empty.
    pub fn get_free_variable_partitioning(&self) -> Option<&FreeVariablePartitioning> {
        self.check_not_polymorphic_or_unknown();
        self.0.free_variable_partitioning.as_ref()
    }

    /// Constructs a value as a copy of this value with the given
    /// free-variable partitioning.
    pub fn with_free_variable_partitioning(
        &self,
        partitioning: Option<FreeVariablePartitioning>,
    ) -> Value {
        if self.0.free_variable_partitioning == partitioning {
            return self.clone();
        }
        self.modified(|d| d.free_variable_partitioning = partitioning)
    }

    // === The Undef facet ======================================================

    pub fn is_maybe_undef(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::UNDEF)
    }

    pub fn is_not_undef(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        !self.flags().contains(ValueFlags::UNDEF)
    }

    pub fn is_maybe_other_than_undef(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::NULL | ValueFlags::BOOL | ValueFlags::NUM | ValueFlags::STR,
        ) || self.0.num.is_some()
            || self.0.str.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    pub fn join_undef(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_undef() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::UNDEF)
    }

    pub(crate) fn really_make_undef() -> Value {
        let mut data = ValueData::none();
        data.flags = ValueFlags::UNDEF;
        canonical::canonicalize(data)
    }

    /// Constructs the value describing definitely undefined.
    pub fn make_undef() -> Value {
        singletons::get().undef.clone()
    }

    // === The Null facet =======================================================

    pub fn is_maybe_null(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NULL)
    }

    pub fn is_not_null(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        !self.flags().contains(ValueFlags::NULL)
    }

    pub fn is_maybe_other_than_null(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::UNDEF | ValueFlags::BOOL | ValueFlags::NUM | ValueFlags::STR,
        ) || self.0.num.is_some()
            || self.0.str.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    pub fn join_null(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_null() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::NULL)
    }

    /// Returns true if this value is definitely null or undefined and
    /// nothing else.
    pub fn is_null_or_undef(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(ValueFlags::NULL | ValueFlags::UNDEF)
            && !self
                .flags()
                .intersects(ValueFlags::NUM | ValueFlags::STR | ValueFlags::BOOL)
            && self.0.num.is_none()
            && self.0.str.is_none()
            && self.0.object_labels.is_none()
            && self.0.getters.is_none()
            && self.0.setters.is_none()
    }

    pub(crate) fn really_make_null() -> Value {
        let mut data = ValueData::none();
        data.flags = ValueFlags::NULL;
        canonical::canonicalize(data)
    }

    /// Constructs the value describing definitely null.
    pub fn make_null() -> Value {
        singletons::get().null.clone()
    }

    // === The Bool facet =======================================================

    pub fn is_maybe_any_bool(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::BOOL)
    }

    pub fn is_maybe_true_but_not_false(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::BOOL == ValueFlags::BOOL_TRUE
    }

    pub fn is_maybe_false_but_not_true(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::BOOL == ValueFlags::BOOL_FALSE
    }

    pub fn is_maybe_true(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::BOOL_TRUE)
    }

    pub fn is_maybe_false(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::BOOL_FALSE)
    }

    pub fn is_not_bool(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        !self.flags().intersects(ValueFlags::BOOL)
    }

    pub fn is_maybe_other_than_bool(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::UNDEF | ValueFlags::NULL | ValueFlags::NUM | ValueFlags::STR,
        ) || self.0.num.is_some()
            || self.0.str.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    pub fn join_any_bool(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_any_bool() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::BOOL)
    }

    /// Constructs a value as a copy of this value joined with the given
    /// concrete boolean.
    pub fn join_bool(&self, b: bool) -> Value {
        self.check_not_polymorphic_or_unknown();
        let bit = if b {
            ValueFlags::BOOL_TRUE
        } else {
            ValueFlags::BOOL_FALSE
        };
        if self.flags().contains(bit) {
            return self.clone();
        }
        self.modified(|d| d.flags |= bit)
    }

    pub(crate) fn really_make_bool(b: Option<bool>) -> Value {
        let mut data = ValueData::none();
        data.flags = match b {
            None => ValueFlags::BOOL,
            Some(true) => ValueFlags::BOOL_TRUE,
            Some(false) => ValueFlags::BOOL_FALSE,
        };
        canonical::canonicalize(data)
    }

    /// Constructs the value representing any boolean.
    pub fn make_any_bool() -> Value {
        singletons::get().bool_any.clone()
    }

    /// Constructs the value describing the given boolean.
    pub fn make_bool(b: bool) -> Value {
        let s = singletons::get();
        if b {
            s.bool_true.clone()
        } else {
            s.bool_false.clone()
        }
    }

    // === The Num facet ========================================================

    pub fn is_maybe_any_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NUM)
    }

    pub fn is_maybe_any_num_not_nan_inf(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::NUM
            == ValueFlags::NUM - (ValueFlags::NUM_NAN | ValueFlags::NUM_INF)
    }

    pub fn is_maybe_single_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.num.is_some()
    }

    pub fn is_maybe_single_num_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        matches!(self.0.num, Some(n) if is_uint32(n))
    }

    pub fn is_maybe_fuzzy_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(ValueFlags::NUM)
    }

    pub fn is_maybe_nan(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NUM_NAN)
    }

    /// Returns true if this value is definitely NaN and nothing else.
    pub fn is_nan(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::NUM == ValueFlags::NUM_NAN
            && self.0.num.is_none()
            && !self.is_maybe_other_than_num()
    }

    pub fn is_maybe_inf(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NUM_INF)
    }

    /// Returns true if this value is definitely +/-Infinity and nothing else.
    pub fn is_inf(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::NUM == ValueFlags::NUM_INF
            && self.0.num.is_none()
            && !self.is_maybe_other_than_num()
    }

    /// Checks whether the given concrete number is a possible value of this
    /// abstract value's number facet.
    pub fn is_maybe_num(&self, num: f64) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(n) = self.0.num {
            n == num
        } else if num.is_infinite() {
            self.flags().contains(ValueFlags::NUM_INF)
        } else if num.is_nan() {
            self.flags().contains(ValueFlags::NUM_NAN)
        } else if num == 0.0 {
            self.flags().contains(ValueFlags::NUM_ZERO)
        } else if is_uint32(num) {
            self.flags().contains(ValueFlags::NUM_UINT_POS)
        } else {
            self.flags().contains(ValueFlags::NUM_OTHER)
        }
    }

    pub fn is_maybe_num_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(ValueFlags::NUM_UINT)
    }

    pub fn is_maybe_num_other(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NUM_OTHER)
    }

    pub fn is_maybe_zero(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(n) = self.0.num {
            if n == 0.0 {
                return true;
            }
        }
        self.flags().contains(ValueFlags::NUM_ZERO)
    }

    pub fn is_maybe_num_uint_pos(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::NUM_UINT_POS)
    }

    pub fn is_maybe_other_than_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::UNDEF | ValueFlags::NULL | ValueFlags::BOOL | ValueFlags::STR,
        ) || self.0.str.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    pub fn is_maybe_other_than_num_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::UNDEF
                | ValueFlags::NULL
                | ValueFlags::BOOL
                | ValueFlags::STR
                | ValueFlags::NUM_INF
                | ValueFlags::NUM_NAN
                | ValueFlags::NUM_OTHER,
        ) || self.0.str.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    /// Returns the single concrete number of this value, with NaN standing
    /// in for a pure NaN value.
    pub fn get_num(&self) -> Option<f64> {
        self.check_not_polymorphic_or_unknown();
        if let Some(n) = self.0.num {
            Some(n)
        } else if self.flags().contains(ValueFlags::NUM_NAN) {
            Some(f64::NAN)
        } else {
            None
        }
    }

    pub fn is_not_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        !self.flags().intersects(ValueFlags::NUM) && self.0.num.is_none()
    }

    /// Checks whether this and the given value may hold the same number.
    pub fn is_maybe_same_number(&self, v: &Value) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(n) = self.0.num {
            return v.is_maybe_num(n);
        }
        if let Some(n) = v.0.num {
            return self.is_maybe_num(n);
        }
        (self.flags() & v.flags()).intersects(ValueFlags::NUM)
    }

    /// Checks whether this and the negation of the given value may hold the
    /// same number.
    pub fn is_maybe_same_number_when_negated(&self, v: &Value) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(n) = self.0.num {
            return v.is_maybe_num(-n);
        }
        if let Some(n) = v.0.num {
            return self.is_maybe_num(-n);
        }
        let maybe_pos = self.flags().contains(ValueFlags::NUM_UINT_POS);
        let maybe_neg = self.flags().contains(ValueFlags::NUM_OTHER);
        let maybe_zero = self.flags().contains(ValueFlags::NUM_ZERO);
        let v_maybe_pos = v.flags().contains(ValueFlags::NUM_UINT_POS);
        let v_maybe_neg = v.flags().contains(ValueFlags::NUM_OTHER);
        let v_maybe_zero = v.flags().contains(ValueFlags::NUM_ZERO);
        (maybe_pos && v_maybe_neg) || (maybe_neg && v_maybe_pos) || (maybe_zero && v_maybe_zero)
    }

    /// Constructs a value as a copy of this value joined with any number.
    pub fn join_any_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_any_num() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags |= ValueFlags::NUM;
            d.num = None;
        })
    }

    pub fn join_any_num_uint(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_num_uint_pos() && self.is_maybe_zero() {
            return self.clone();
        }
        let old_num = self.0.num;
        self.modified(|d| {
            d.flags |= ValueFlags::NUM_UINT;
            d.num = None;
            if let Some(n) = old_num {
                d.flags |= num_category(n);
            }
        })
    }

    pub fn join_any_num_other(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_num_other() {
            return self.clone();
        }
        let old_num = self.0.num;
        self.modified(|d| {
            d.flags |= ValueFlags::NUM_OTHER;
            d.num = None;
            if let Some(n) = old_num {
                d.flags |= num_category(n);
            }
        })
    }

    /// Constructs a value as a copy of this value joined with the given
    /// concrete number.
    pub fn join_num(&self, v: f64) -> Value {
        self.check_not_polymorphic_or_unknown();
        if v.is_nan() {
            return self.join_num_nan();
        }
        if let Some(n) = self.0.num {
            if n.to_bits() == v.to_bits() {
                return self.clone();
            }
        }
        if self.is_not_num() {
            self.modified(|d| d.num = Some(v))
        } else {
            let old_num = self.0.num;
            self.modified(|d| {
                if let Some(n) = old_num {
                    d.flags |= num_category(n);
                    d.num = None;
                }
                d.flags |= num_category(v);
            })
        }
    }

    pub fn join_num_nan(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_nan() {
            return self.clone();
        }
        let old_num = self.0.num;
        self.modified(|d| {
            d.flags |= ValueFlags::NUM_NAN;
            d.num = None;
            if let Some(n) = old_num {
                d.flags |= num_category(n);
            }
        })
    }

    pub fn join_num_inf(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_inf() {
            return self.clone();
        }
        let old_num = self.0.num;
        self.modified(|d| {
            d.flags |= ValueFlags::NUM_INF;
            d.num = None;
            if let Some(n) = old_num {
                d.flags |= num_category(n);
            }
        })
    }

    pub(crate) fn really_make_flags(flags: ValueFlags) -> Value {
        let mut data = ValueData::none();
        data.flags = flags;
        canonical::canonicalize(data)
    }

    /// Constructs the value describing the given number.
    pub fn make_num(d: f64) -> Value {
        if d.is_nan() {
            return singletons::get().num_nan.clone();
        }
        if d.is_infinite() {
            return singletons::get().num_inf.clone();
        }
        let mut data = ValueData::none();
        data.num = Some(d);
        canonical::canonicalize(data)
    }

    /// Constructs the value describing NaN.
    pub fn make_num_nan() -> Value {
        singletons::get().num_nan.clone()
    }

    /// Constructs the value describing +/-Infinity.
    pub fn make_num_inf() -> Value {
        singletons::get().num_inf.clone()
    }

    /// Constructs the value describing any number.
    pub fn make_any_num() -> Value {
        singletons::get().num_any.clone()
    }

    /// Constructs the value describing any UInt32 number.
    pub fn make_any_num_uint() -> Value {
        singletons::get().num_uint.clone()
    }

    /// Constructs the value describing any non-zero UInt32 number.
    pub fn make_any_num_uint_pos() -> Value {
        singletons::get().num_uint_pos.clone()
    }

    /// Constructs the value describing any non-UInt32, non-NaN, non-Infinity
    /// number.
    pub fn make_any_num_other() -> Value {
        singletons::get().num_other.clone()
    }

    /// Constructs the value describing any number except NaN and Infinity.
    pub fn make_any_num_not_nan_inf() -> Value {
        singletons::get().num_not_nan_inf.clone()
    }

    // === The Str facet: queries ===============================================

    pub fn is_maybe_any_str(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        // Excluded and included strings are deliberately ignored here.
        self.flags().contains(
            ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
        )
    }

    pub fn is_maybe_str_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_UINT)
    }

    /// Checks whether some UInt32 string is a possible value.
    pub fn is_maybe_str_some_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().any(|s| strings::is_array_index(s));
        }
        self.is_maybe_str_uint()
            || matches!(&self.0.str, Some(s) if strings::is_array_index(s))
    }

    /// Checks whether some numeric string is a possible value.
    pub fn is_maybe_str_some_numeric(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().any(|s| strings::is_numeric(s));
        }
        self.flags()
            .intersects(ValueFlags::STR_UINT | ValueFlags::STR_OTHERNUM)
            || matches!(&self.0.str, Some(s) if strings::is_numeric(s))
    }

    /// Checks whether some non-UInt32 string is a possible value.
    pub fn is_maybe_str_some_non_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().any(|s| !strings::is_array_index(s));
        }
        self.flags().intersects(
            ValueFlags::STR_OTHERNUM
                | ValueFlags::STR_PREFIX
                | ValueFlags::STR_IDENTIFIER
                | ValueFlags::STR_OTHERIDENTIFIERPARTS
                | ValueFlags::STR_OTHER
                | ValueFlags::STR_JSON,
        ) || matches!(&self.0.str, Some(s) if !strings::is_array_index(s))
    }

    /// Checks whether some non-numeric string is a possible value.
    pub fn is_maybe_str_some_non_numeric(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().any(|s| !strings::is_numeric(s));
        }
        self.flags().intersects(
            ValueFlags::STR_PREFIX
                | ValueFlags::STR_IDENTIFIER
                | ValueFlags::STR_OTHERIDENTIFIERPARTS
                | ValueFlags::STR_OTHER
                | ValueFlags::STR_JSON,
        ) || matches!(&self.0.str, Some(s) if !strings::is_numeric(s))
    }

    pub fn is_maybe_str_other_num(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_OTHERNUM)
    }

    pub fn is_maybe_str_identifier(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_IDENTIFIER)
    }

    pub fn is_maybe_str_other_identifier_parts(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_OTHERIDENTIFIERPARTS)
    }

    pub fn is_maybe_str_prefix(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_PREFIX)
    }

    pub fn is_maybe_str_other(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_OTHER)
    }

    pub fn is_maybe_str_json(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().contains(ValueFlags::STR_JSON)
    }

    /// Returns true if this value is definitely a JSON string and nothing
    /// else.
    pub fn is_str_json(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::PRIMITIVE == ValueFlags::STR_JSON
            && self.0.str.is_none()
            && self.0.num.is_none()
            && self.0.object_labels.is_none()
            && self.0.getters.is_none()
            && self.0.setters.is_none()
    }

    /// Returns true if this value is definitely a string made of identifier
    /// parts and nothing else.
    pub fn is_str_identifier_parts(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().all(|s| strings::is_identifier_parts(s));
        }
        ((self.flags().intersects(ValueFlags::STR_IDENTIFIERPARTS)
            && (self.flags() & (ValueFlags::PRIMITIVE - ValueFlags::STR_IDENTIFIERPARTS)).is_empty())
            || matches!(&self.0.str, Some(s) if strings::is_identifier_parts(s)))
            && self.0.num.is_none()
            && self.0.object_labels.is_none()
            && self.0.getters.is_none()
            && self.0.setters.is_none()
    }

    /// Returns true if this value is definitely an identifier string and
    /// nothing else.
    pub fn is_str_identifier(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(included) = &self.0.included_strings {
            return included.iter().all(|s| strings::is_identifier(s));
        }
        (self.flags() & ValueFlags::PRIMITIVE == ValueFlags::STR_IDENTIFIER
            || matches!(&self.0.str, Some(s) if strings::is_identifier(s)))
            && self.0.num.is_none()
            && self.0.object_labels.is_none()
            && self.0.getters.is_none()
            && self.0.setters.is_none()
    }

    pub fn is_maybe_str_only_uint(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags() & ValueFlags::STR == ValueFlags::STR_UINT
    }

    pub fn is_maybe_single_str(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.str.is_some() && !self.flags().contains(ValueFlags::STR_PREFIX)
    }

    pub fn is_maybe_fuzzy_str(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(ValueFlags::STR)
    }

    /// Returns the single concrete string of this value.
    pub fn get_str(&self) -> &str {
        self.check_not_polymorphic_or_unknown();
        if self.0.str.is_none() || self.flags().contains(ValueFlags::STR_PREFIX) {
            raise(AnalysisError::NotSingleString);
        }
        self.0.str.as_deref().unwrap_or_default()
    }

    /// Returns the prefix of a prefix-string value.
    pub fn get_prefix(&self) -> &str {
        self.check_not_polymorphic_or_unknown();
        if !self.flags().contains(ValueFlags::STR_PREFIX) {
            raise(AnalysisError::NotPrefixString);
        }
        self.0.str.as_deref().unwrap_or_default()
    }

    pub fn is_not_str(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        !self.flags().intersects(ValueFlags::STR) && self.0.str.is_none()
    }

    pub fn is_maybe_other_than_str(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(
            ValueFlags::UNDEF | ValueFlags::NULL | ValueFlags::BOOL | ValueFlags::NUM,
        ) || self.0.num.is_some()
            || self.0.object_labels.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
    }

    /// Checks whether the given concrete string is a possible value of this
    /// abstract value's string facet.
    pub fn is_maybe_str(&self, s: &str) -> bool {
        self.check_not_polymorphic_or_unknown();
        if let Some(excluded) = &self.0.excluded_strings {
            if excluded.contains(&s.to_string()) {
                return false;
            }
        }
        if let Some(included) = &self.0.included_strings {
            if !included.contains(&s.to_string()) {
                return false;
            }
        }
        self.is_maybe_str_ignore_included_excluded(s)
    }

    pub(crate) fn is_maybe_str_ignore_included_excluded(&self, s: &str) -> bool {
        crate::lattice::restrict::data_maybe_str_ignoring_sets(self.data(), s)
    }

    pub fn get_included_strings(&self) -> Option<&PersistentSet<String>> {
        self.0.included_strings.as_ref()
    }

    pub fn get_excluded_strings(&self) -> Option<&PersistentSet<String>> {
        self.0.excluded_strings.as_ref()
    }

    /// Returns true if the possible strings of this value are all known
    /// explicitly.
    pub fn is_maybe_all_known_str(&self) -> bool {
        self.is_maybe_single_str() || self.0.included_strings.is_some()
    }

    /// Returns the set of all possible strings of this value.
    pub fn get_all_known_str(&self) -> PersistentSet<String> {
        if self.is_maybe_single_str() {
            PersistentSet::singleton(self.get_str().to_string())
        } else if let Some(included) = &self.0.included_strings {
            included.clone()
        } else {
            raise(AnalysisError::NotAllKnownStrings)
        }
    }

    /// Checks whether strings described by this value may occur as
    /// substrings of strings described by the other value.
    pub fn is_str_may_contain_substring(&self, other: &Value) -> bool {
        if options::get().debug_or_test_enabled
            && (self.is_maybe_other_than_str() || other.is_maybe_other_than_str())
        {
            raise(AnalysisError::NotStringOnly(
                self.to_string(),
                other.to_string(),
            ));
        }
        !self.must_only_be_identifier_characters() || !other.must_contain_non_identifier_characters()
    }

    pub fn must_contain_non_identifier_characters(&self) -> bool {
        self.is_maybe_single_str() && !strings::is_identifier_parts(self.get_str())
    }

    pub fn must_only_be_identifier_characters(&self) -> bool {
        self.is_str_identifier_parts()
    }

    // === The Str facet: constructors ==========================================

    /// Constructs the value describing any string.
    pub fn make_any_str() -> Value {
        singletons::get().str_any.clone()
    }

    /// Constructs the value describing any UInt32 string.
    pub fn make_any_str_uint() -> Value {
        singletons::get().str_uint.clone()
    }

    /// Constructs the value describing any string representing a non-UInt32
    /// number, including Infinity, -Infinity, and NaN.
    pub fn make_any_str_other_num() -> Value {
        singletons::get().str_other_num.clone()
    }

    /// Constructs the value describing any numeric string.
    pub fn make_any_str_numeric() -> Value {
        singletons::get().str_numeric.clone()
    }

    /// Constructs the value describing any non-numeric string.
    pub fn make_any_str_not_numeric() -> Value {
        singletons::get().str_not_numeric.clone()
    }

    /// Constructs the value describing any non-UInt32 string.
    pub fn make_any_str_not_uint() -> Value {
        singletons::get().str_not_uint.clone()
    }

    /// Constructs the value describing any identifier string.
    pub fn make_any_str_ident() -> Value {
        singletons::get().str_ident.clone()
    }

    /// Constructs the value describing any JSON string.
    pub fn make_json_str() -> Value {
        singletons::get().str_json.clone()
    }

    /// Constructs the value describing the given string.
    pub fn make_str(s: impl Into<String>) -> Value {
        let mut data = ValueData::none();
        data.str = Some(s.into());
        canonical::canonicalize(data)
    }

    /// Constructs a new value representing the given strings.
    pub fn make_strings<I>(strings_iter: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let all: Vec<String> = strings_iter.into_iter().map(Into::into).collect();
        let r = Value::join_all(all.iter().map(|s| Value::make_str(s.clone())));
        if !options::get().no_string_sets && r.is_maybe_fuzzy_str() {
            let set: FxHashSet<String> = all.into_iter().collect();
            return r.modified(|d| d.included_strings = Some(PersistentSet::from(set)));
        }
        r
    }

    /// Constructs a new value representing the given strings and symbols.
    pub fn make_strings_and_symbols<'a, I>(properties: I) -> Value
    where
        I: IntoIterator<Item = &'a PKey> + Clone,
    {
        let symbols = Value::join_all(properties.clone().into_iter().map(|k| k.to_value()));
        let strs = Value::make_strings(
            properties
                .into_iter()
                .filter_map(|k| k.get_str().map(str::to_string)),
        );
        symbols.join(&strs)
    }

    /// Constructs a value that is any string except for the given strings.
    pub fn make_any_str_excluding<I>(strings_iter: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let set: FxHashSet<String> = strings_iter.into_iter().map(Into::into).collect();
        if set.is_empty() {
            return Value::make_any_str();
        }
        Value::make_any_str().modified(|d| d.excluded_strings = Some(PersistentSet::from(set)))
    }

    /// Joins one of the fuzzy string categories into this value: the flag
    /// is added, exclusions the category re-covers are dropped, the
    /// enumeration becomes meaningless, and an existing single or prefix
    /// string dissolves into its categories.
    fn join_any_str_category(
        &self,
        category: ValueFlags,
        covered: impl Fn(&String) -> bool,
    ) -> Value {
        let old_str = self.0.str.clone();
        let was_prefix = self.flags().contains(ValueFlags::STR_PREFIX);
        let old_included = self.0.included_strings.clone();
        self.modified(|d| {
            d.flags |= category;
            d.flags -= ValueFlags::STR_PREFIX;
            d.str = None;
            if let Some(excluded) = &d.excluded_strings {
                let kept = excluded.remove_if(&covered);
                d.excluded_strings = if kept.is_empty() { None } else { Some(kept) };
            }
            d.included_strings = None;
            if let Some(s) = &old_str {
                crate::lattice::join::join_fuzzy_category(
                    &mut d.flags,
                    s,
                    was_prefix,
                    old_included.as_ref(),
                );
            }
        })
    }

    /// Constructs a value as a copy of this value joined with any string.
    pub fn join_any_str(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_any_str() {
            return self.clone();
        }
        self.join_any_str_category(
            ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
            |_| true,
        )
    }

    /// Constructs a value as a copy of this value joined with any UInt32
    /// string.
    pub fn join_any_str_uint(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_str_uint() {
            return self.clone();
        }
        self.join_any_str_category(ValueFlags::STR_UINT, |s| strings::is_array_index(s))
    }

    /// Constructs a value as a copy of this value joined with any
    /// other-numeric string.
    pub fn join_any_str_other_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_str_other_num() {
            return self.clone();
        }
        self.join_any_str_category(ValueFlags::STR_OTHERNUM, |s| {
            strings::is_numeric(s) && !strings::is_array_index(s)
        })
    }

    /// Constructs a value as a copy of this value joined with any
    /// identifier string.
    pub fn join_any_str_identifier(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_str_identifier() {
            return self.clone();
        }
        self.join_any_str_category(ValueFlags::STR_IDENTIFIER, |s| strings::is_identifier(s))
    }

    /// Constructs a value as a copy of this value joined with any
    /// identifier-parts string.
    pub fn join_any_str_identifier_parts(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.flags().contains(ValueFlags::STR_IDENTIFIERPARTS) {
            return self.clone();
        }
        self.join_any_str_category(ValueFlags::STR_IDENTIFIERPARTS, |s| {
            strings::is_identifier_parts(s)
        })
    }

    /// Constructs a value as a copy of this value joined with any string
    /// outside the numeric and identifier-parts categories.
    pub fn join_any_str_other(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_str_other() {
            return self.clone();
        }
        self.join_any_str_category(ValueFlags::STR_OTHER, |s| {
            !strings::is_numeric(s) && !strings::is_identifier_parts(s)
        })
    }

    /// Constructs a value as a copy of this value joined with the given
    /// concrete string.
    pub fn join_str(&self, s: &str) -> Value {
        self.check_not_polymorphic_or_unknown();
        if let Some(own) = &self.0.str {
            if !self.flags().contains(ValueFlags::STR_PREFIX) && own == s {
                return self.clone();
            }
        }
        self.join(&Value::make_str(s))
    }

    /// Constructs a value as a copy of this value joined with the prefix
    /// string of the given prefix.
    pub fn join_prefix(&self, s: &str) -> Value {
        self.check_not_polymorphic_or_unknown();
        if s.is_empty() {
            raise(AnalysisError::EmptyPrefix);
        }
        if self.flags().contains(ValueFlags::STR_PREFIX) && self.0.str.as_deref() == Some(s) {
            return self.clone();
        }
        let mut data = ValueData::none();
        data.flags = ValueFlags::STR_PREFIX;
        data.str = Some(s.to_string());
        let prefix = canonical::canonicalize(data);
        self.join(&prefix)
    }

    /// Forgets the excluded/included string refinements.
    pub fn forget_excluded_included_strings(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.0.excluded_strings.is_none() && self.0.included_strings.is_none() {
            return self.clone();
        }
        self.modified(|d| {
            d.excluded_strings = None;
            d.included_strings = None;
        })
    }

    // === Object labels ========================================================

    /// Constructs the value describing the given object label.
    pub fn make_object(label: ObjectLabel) -> Value {
        let mut data = ValueData::none();
        data.object_labels = Some(PersistentSet::singleton(label));
        canonical::canonicalize(data)
    }

    /// Constructs the value describing the given object labels.
    pub fn make_object_set(labels: PersistentSet<ObjectLabel>) -> Value {
        let mut data = ValueData::none();
        if !labels.is_empty() {
            data.object_labels = Some(labels);
        }
        canonical::canonicalize(data)
    }

    /// Constructs the value describing the given symbol object label.
    pub fn make_symbol(label: ObjectLabel) -> Value {
        if label.kind() != LabelKind::Symbol {
            raise(AnalysisError::NonSymbolLabel);
        }
        Value::make_object(label)
    }

    /// Constructs a value as the join of this value and the given object
    /// label.
    pub fn join_object(&self, label: ObjectLabel) -> Value {
        self.check_not_polymorphic_or_unknown();
        if let Some(labels) = &self.0.object_labels {
            if labels.contains(&label) {
                return self.clone();
            }
        }
        self.modified(|d| {
            d.object_labels = Some(match &d.object_labels {
                Some(labels) => labels.add(label),
                None => PersistentSet::singleton(label),
            });
        })
    }

    pub fn is_maybe_object(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        matches!(&self.0.object_labels,
            Some(labels) if labels.iter().any(|l| l.kind() != LabelKind::Symbol))
    }

    pub fn is_maybe_object_or_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.object_labels.is_some()
    }

    pub fn is_maybe_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        matches!(&self.0.object_labels,
            Some(labels) if labels.iter().any(|l| l.kind() == LabelKind::Symbol))
    }

    /// Checks whether this value is a single string or a single singleton
    /// symbol.
    pub fn is_maybe_single_str_or_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_single_str() && !self.is_maybe_symbol() {
            return true;
        }
        if !self.is_not_str() {
            return false;
        }
        match &self.0.object_labels {
            Some(labels) => {
                labels
                    .iter()
                    .filter(|l| l.kind() == LabelKind::Symbol)
                    .count()
                    == 1
                    && labels
                        .iter()
                        .filter(|l| l.kind() == LabelKind::Symbol && l.is_singleton())
                        .count()
                        == 1
            }
            None => false,
        }
    }

    /// Checks whether this value may be multiple strings or symbols, or a
    /// summarized symbol.
    pub fn is_maybe_fuzzy_str_or_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if !self.is_not_str() && self.is_maybe_symbol() {
            return true;
        }
        if self.is_maybe_fuzzy_str() {
            return true;
        }
        match &self.0.object_labels {
            Some(labels) => {
                labels
                    .iter()
                    .filter(|l| l.kind() == LabelKind::Symbol)
                    .count()
                    > 1
                    || labels
                        .iter()
                        .any(|l| l.kind() == LabelKind::Symbol && !l.is_singleton())
            }
            None => false,
        }
    }

    pub fn is_maybe_other_than_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_primitive() || self.is_maybe_getter_or_setter() {
            return true;
        }
        matches!(&self.0.object_labels,
            Some(labels) if labels.iter().any(|l| l.kind() != LabelKind::Symbol))
    }

    pub fn is_maybe_other_than_str_or_symbol(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        if self.flags().intersects(
            ValueFlags::UNDEF | ValueFlags::NULL | ValueFlags::BOOL | ValueFlags::NUM,
        ) || self.0.num.is_some()
            || self.0.getters.is_some()
            || self.0.setters.is_some()
        {
            return true;
        }
        matches!(&self.0.object_labels,
            Some(labels) if labels.iter().any(|l| l.kind() != LabelKind::Symbol))
    }

    pub fn is_maybe_getter(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.getters.is_some()
    }

    pub fn is_maybe_setter(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.setters.is_some()
    }

    pub fn is_maybe_getter_or_setter(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.getters.is_some() || self.0.setters.is_some()
    }

    /// Returns true if this value may be a primitive, including undefined
    /// and null.
    pub fn is_maybe_primitive(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.flags().intersects(ValueFlags::PRIMITIVE)
            || self.0.num.is_some()
            || self.0.str.is_some()
    }

    pub fn is_maybe_primitive_or_symbol(&self) -> bool {
        self.is_maybe_primitive() || self.is_maybe_symbol()
    }

    /// Returns the set of object labels, including symbols. Empty for
    /// polymorphic and 'unknown' values. Getters and setters are ignored.
    pub fn get_object_labels(&self) -> PersistentSet<ObjectLabel> {
        match &self.0.object_labels {
            Some(labels) => labels.clone(),
            None => PersistentSet::empty(),
        }
    }

    /// Returns the set of object labels, with getters and setters included.
    pub fn get_all_object_labels(&self) -> PersistentSet<ObjectLabel> {
        let mut result = self.get_object_labels();
        if let Some(getters) = &self.0.getters {
            result = result.union(getters);
        }
        if let Some(setters) = &self.0.setters {
            result = result.union(setters);
        }
        result
    }

    /// Returns the object labels representing symbols.
    pub fn get_symbols(&self) -> PersistentSet<ObjectLabel> {
        match &self.0.object_labels {
            Some(labels) => labels.remove_if(|l| l.kind() != LabelKind::Symbol),
            None => PersistentSet::empty(),
        }
    }

    /// Returns the set of getters. Empty for polymorphic and 'unknown'
    /// values.
    pub fn get_getters(&self) -> PersistentSet<ObjectLabel> {
        match &self.0.getters {
            Some(getters) => getters.clone(),
            None => PersistentSet::empty(),
        }
    }

    /// Returns the set of setters. Empty for polymorphic and 'unknown'
    /// values.
    pub fn get_setters(&self) -> PersistentSet<ObjectLabel> {
        match &self.0.setters {
            Some(setters) => setters.clone(),
            None => PersistentSet::empty(),
        }
    }

    /// Returns the source locations of the objects and symbols in this
    /// value, accessors included.
    pub fn get_object_source_locations(&self) -> PersistentSet<SourceLocation> {
        let mut result = FxHashSet::default();
        for set in [&self.0.object_labels, &self.0.getters, &self.0.setters]
            .into_iter()
            .flatten()
        {
            for label in set.iter() {
                result.insert(label.source_location().clone());
            }
        }
        PersistentSet::from(result)
    }

    /// Converts the object labels of this value into getters.
    pub fn make_getter(&self) -> Value {
        self.modified(|d| {
            d.getters = d.object_labels.take();
        })
    }

    /// Converts the object labels of this value into setters.
    pub fn make_setter(&self) -> Value {
        self.modified(|d| {
            d.setters = d.object_labels.take();
        })
    }

    /// Constructs a value as a copy of this value but with the given object
    /// labels removed.
    pub fn remove_objects(&self, labels: &PersistentSet<ObjectLabel>) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.check_no_getters_setters();
        let Some(own) = &self.0.object_labels else {
            return self.clone();
        };
        let remaining = own.subtract(labels);
        self.modified(|d| {
            d.object_labels = if remaining.is_empty() {
                None
            } else {
                Some(remaining)
            };
        })
    }

    /// Constructs a value as a copy of this value but with only the given
    /// object labels.
    pub fn restrict_to_object(&self, labels: &PersistentSet<ObjectLabel>) -> Value {
        self.check_not_polymorphic_or_unknown();
        let Some(own) = &self.0.object_labels else {
            return self.clone();
        };
        let remaining = own.intersect(labels);
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE;
            d.num = None;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
            d.object_labels = if remaining.is_empty() {
                None
            } else {
                Some(remaining)
            };
        })
    }

    /// Constructs a value as a copy of this value with object labels
    /// summarized. Unknown and polymorphic values are returned unchanged.
    pub fn summarize(&self, summarized: &Summarized) -> Value {
        if self.is_unknown() || self.is_polymorphic() {
            return self.clone();
        }
        let new_labels = self.0.object_labels.as_ref().map(|s| summarized.summarize(s));
        let new_getters = self.0.getters.as_ref().map(|s| summarized.summarize(s));
        let new_setters = self.0.setters.as_ref().map(|s| summarized.summarize(s));
        if new_labels == self.0.object_labels
            && new_getters == self.0.getters
            && new_setters == self.0.setters
        {
            return self.clone();
        }
        self.modified(|d| {
            d.object_labels = new_labels.filter(|s| !s.is_empty());
            d.getters = new_getters.filter(|s| !s.is_empty());
            d.setters = new_setters.filter(|s| !s.is_empty());
        })
    }

    pub fn is_maybe_single_object_label(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        matches!(&self.0.object_labels, Some(labels) if labels.size() == 1)
    }

    pub fn is_maybe_single_allocation_site(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        self.0.object_labels.is_some() && self.get_object_source_locations().size() == 1
    }

    /// Returns true if this value does not contain a summary object label.
    pub fn is_not_a_summarized_object(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        match &self.0.object_labels {
            Some(labels) => labels.iter().all(|l| l.is_singleton()),
            None => true,
        }
    }

    /// Returns true if this value does not contain a singleton object label.
    pub fn is_not_a_singleton_object(&self) -> bool {
        self.check_not_polymorphic_or_unknown();
        match &self.0.object_labels {
            Some(labels) => labels.iter().all(|l| !l.is_singleton()),
            None => true,
        }
    }

    pub fn contains_object_label(&self, label: &ObjectLabel) -> bool {
        [&self.0.object_labels, &self.0.getters, &self.0.setters]
            .into_iter()
            .flatten()
            .any(|set| set.contains(label))
    }

    /// Returns a copy of this value where the given object label has been
    /// replaced, if present.
    pub fn replace_object_label(&self, old_label: &ObjectLabel, new_label: &ObjectLabel) -> Value {
        if old_label == new_label {
            raise(AnalysisError::EqualObjectLabels);
        }
        if !self.contains_object_label(old_label) {
            return self.clone();
        }
        let replace = |set: &Option<PersistentSet<ObjectLabel>>| {
            set.as_ref().map(|s| {
                if s.contains(old_label) {
                    s.remove(old_label).add(new_label.clone())
                } else {
                    s.clone()
                }
            })
        };
        let new_labels = replace(&self.0.object_labels);
        let new_getters = replace(&self.0.getters);
        let new_setters = replace(&self.0.setters);
        self.modified(|d| {
            d.object_labels = new_labels;
            d.getters = new_getters;
            d.setters = new_setters;
        })
    }

    /// Returns the number of different types of this value, counting
    /// boolean/string/number/function/array/native/dom/other. Undefined and
    /// null are ignored unless they are the only value.
    pub fn type_size(&self) -> usize {
        if self.is_unknown() || self.is_polymorphic() {
            return 0;
        }
        let mut count = 0;
        if !self.is_not_bool() {
            count += 1;
        }
        if !self.is_not_str() {
            count += 1;
        }
        if !self.is_not_num() {
            count += 1;
        }
        if let Some(labels) = &self.0.object_labels {
            let mut is_function = false;
            let mut is_array = false;
            let mut is_native = false;
            let mut is_dom = false;
            let mut is_other = false;
            for label in labels.iter() {
                match label.kind() {
                    LabelKind::Function => is_function = true,
                    LabelKind::Array => is_array = true,
                    _ => match label.host_api() {
                        Some(HostApiKind::Native) => is_native = true,
                        Some(HostApiKind::Dom) => is_dom = true,
                        _ => is_other = true,
                    },
                }
            }
            count += [is_function, is_array, is_native, is_dom, is_other]
                .iter()
                .filter(|b| **b)
                .count();
        }
        if self.0.getters.is_some() {
            count += 1;
        }
        if self.0.setters.is_some() {
            count += 1;
        }
        if count == 0 && (self.is_maybe_null() || self.is_maybe_undef()) {
            count = 1;
        }
        count
    }

    // === Attributes ===========================================================

    pub fn is_dont_enum(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_DONTENUM_ANY == ValueFlags::ATTR_DONTENUM
    }

    pub fn is_maybe_dont_enum(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_DONTENUM)
    }

    pub fn is_not_dont_enum(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_DONTENUM_ANY == ValueFlags::ATTR_NOTDONTENUM
    }

    pub fn is_maybe_not_dont_enum(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_NOTDONTENUM)
    }

    pub fn has_dont_enum(&self) -> bool {
        self.check_not_unknown();
        self.flags().intersects(ValueFlags::ATTR_DONTENUM_ANY)
    }

    pub fn set_dont_enum(&self) -> Value {
        self.check_not_unknown();
        if self.is_dont_enum() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_DONTENUM_ANY;
            d.flags |= ValueFlags::ATTR_DONTENUM;
        })
    }

    pub fn set_not_dont_enum(&self) -> Value {
        self.check_not_unknown();
        if self.is_not_dont_enum() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_DONTENUM_ANY;
            d.flags |= ValueFlags::ATTR_NOTDONTENUM;
        })
    }

    pub fn join_not_dont_enum(&self) -> Value {
        self.check_not_unknown();
        if self.is_maybe_not_dont_enum() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::ATTR_NOTDONTENUM)
    }

    pub fn is_dont_delete(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_DONTDELETE_ANY == ValueFlags::ATTR_DONTDELETE
    }

    pub fn is_maybe_dont_delete(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_DONTDELETE)
    }

    pub fn is_not_dont_delete(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_DONTDELETE_ANY == ValueFlags::ATTR_NOTDONTDELETE
    }

    pub fn is_maybe_not_dont_delete(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_NOTDONTDELETE)
    }

    pub fn has_dont_delete(&self) -> bool {
        self.check_not_unknown();
        self.flags().intersects(ValueFlags::ATTR_DONTDELETE_ANY)
    }

    pub fn set_dont_delete(&self) -> Value {
        self.check_not_unknown();
        if self.is_dont_delete() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_DONTDELETE_ANY;
            d.flags |= ValueFlags::ATTR_DONTDELETE;
        })
    }

    pub fn set_not_dont_delete(&self) -> Value {
        self.check_not_unknown();
        if self.is_not_dont_delete() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_DONTDELETE_ANY;
            d.flags |= ValueFlags::ATTR_NOTDONTDELETE;
        })
    }

    pub fn join_not_dont_delete(&self) -> Value {
        self.check_not_unknown();
        if self.is_maybe_not_dont_delete() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::ATTR_NOTDONTDELETE)
    }

    pub fn is_read_only(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_READONLY_ANY == ValueFlags::ATTR_READONLY
    }

    pub fn is_maybe_read_only(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_READONLY)
    }

    pub fn is_not_read_only(&self) -> bool {
        self.check_not_unknown();
        self.flags() & ValueFlags::ATTR_READONLY_ANY == ValueFlags::ATTR_NOTREADONLY
    }

    pub fn is_maybe_not_read_only(&self) -> bool {
        self.check_not_unknown();
        self.flags().contains(ValueFlags::ATTR_NOTREADONLY)
    }

    pub fn has_read_only(&self) -> bool {
        self.check_not_unknown();
        self.flags().intersects(ValueFlags::ATTR_READONLY_ANY)
    }

    pub fn set_read_only(&self) -> Value {
        self.check_not_unknown();
        if self.is_read_only() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_READONLY_ANY;
            d.flags |= ValueFlags::ATTR_READONLY;
        })
    }

    pub fn set_not_read_only(&self) -> Value {
        self.check_not_unknown();
        if self.is_not_read_only() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR_READONLY_ANY;
            d.flags |= ValueFlags::ATTR_NOTREADONLY;
        })
    }

    pub fn join_not_read_only(&self) -> Value {
        self.check_not_unknown();
        if self.is_maybe_not_read_only() {
            return self.clone();
        }
        self.modified(|d| d.flags |= ValueFlags::ATTR_NOTREADONLY)
    }

    /// Constructs a value as a copy of this value but with all attributes
    /// definitely not set.
    pub fn remove_attributes(&self) -> Value {
        self.check_not_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR;
            d.flags |= ValueFlags::ATTR_NOTDONTDELETE
                | ValueFlags::ATTR_NOTDONTENUM
                | ValueFlags::ATTR_NOTREADONLY;
        })
    }

    /// Constructs a value as a copy of this value but with attributes set as
    /// in the given value.
    pub fn set_attributes_from(&self, from: &Value) -> Value {
        self.check_not_unknown();
        from.check_not_unknown();
        let attr = from.flags() & ValueFlags::ATTR;
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR;
            d.flags |= attr;
        })
    }

    /// Constructs a value as a copy of this value but with the given
    /// attributes.
    pub fn set_attributes(&self, dontenum: bool, dontdelete: bool, readonly: bool) -> Value {
        self.check_not_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::ATTR;
            d.flags |= if dontdelete {
                ValueFlags::ATTR_DONTDELETE
            } else {
                ValueFlags::ATTR_NOTDONTDELETE
            };
            d.flags |= if readonly {
                ValueFlags::ATTR_READONLY
            } else {
                ValueFlags::ATTR_NOTREADONLY
            };
            d.flags |= if dontenum {
                ValueFlags::ATTR_DONTENUM
            } else {
                ValueFlags::ATTR_NOTDONTENUM
            };
        })
    }

    /// Constructs a value as a copy of this value but with no information
    /// that only makes sense for object property values.
    pub fn set_bottom_property_data(&self) -> Value {
        self.check_not_unknown();
        self.modified(|d| d.flags -= ValueFlags::PROPERTYDATA)
    }

    /// Constructs a value as a copy of this value but for reading
    /// attributes. The value facet collapses to a dummy that satisfies the
    /// representation invariant whenever the property is maybe present.
    pub fn restrict_to_attributes(&self) -> Value {
        let mut new_flags =
            self.flags() & (ValueFlags::ATTR | ValueFlags::ABSENT | ValueFlags::UNKNOWN);
        if !self.is_unknown() && self.is_maybe_present() {
            new_flags |= ValueFlags::UNDEF;
        }
        let mut data = ValueData::none();
        data.flags = new_flags;
        data.free_variable_partitioning = self.0.free_variable_partitioning.clone();
        canonical::canonicalize(data)
    }

    /// Constructs a value as a copy of this value but with all property
    /// data set to bottom.
    pub fn restrict_to_non_attributes(&self) -> Value {
        self.modified(|d| {
            d.flags -= ValueFlags::PROPERTYDATA
                | ValueFlags::ABSENT
                | ValueFlags::PRESENT_DATA
                | ValueFlags::PRESENT_ACCESSOR;
        })
    }

    /// Constructs a value as a copy of the given value but with the
    /// attributes (property data, absence, and polymorphic presence) from
    /// this value.
    pub fn replace_value(&self, v: &Value) -> Value {
        let keep_plain = self.flags() & (ValueFlags::PROPERTYDATA | ValueFlags::ABSENT);
        let keep_present =
            self.flags() & (ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR);
        v.modified(|d| {
            d.flags -= ValueFlags::PROPERTYDATA
                | ValueFlags::ABSENT
                | ValueFlags::PRESENT_DATA
                | ValueFlags::PRESENT_ACCESSOR;
            d.flags |= keep_plain;
            if d.var.is_some() {
                d.flags |= keep_present;
            }
        })
    }

    // === Meta joins ===========================================================

    /// Joins the meta-information from the given value into this value.
    pub fn join_meta(&self, v: &Value) -> Value {
        let meta = v.flags() & ValueFlags::META;
        self.modified(|d| d.flags |= meta)
    }

    /// Joins the getters and setters from the given value into this value.
    /// The receiver must not have getters or setters of its own.
    pub fn join_getters_setters(&self, v: &Value) -> Value {
        if self.0.getters.is_some() || self.0.setters.is_some() {
            raise(AnalysisError::UnexpectedGetterSetter);
        }
        if v.0.getters.is_none() && v.0.setters.is_none() {
            return self.clone();
        }
        let getters = v.0.getters.clone();
        let setters = v.0.setters.clone();
        self.modified(|d| {
            d.getters = getters;
            d.setters = setters;
        })
    }

    // === Meet =================================================================

    /// Computes the meet of the two values (intersection by strict
    /// equality).
    pub fn meet(&self, other: &Value) -> Value {
        self.restrict_to_strict_equals(other)
    }

    /// Checks whether the two values have a non-bottom meet.
    pub fn is_maybe(&self, other: &Value) -> bool {
        !self.restrict_to_strict_equals(other).is_none()
    }
}

use crate::lattice::label::HostApi as HostApiKind;

/// Checks whether the given number is a UInt32.
pub fn is_uint32(v: f64) -> bool {
    !v.is_nan() && !v.is_infinite() && v >= 0.0 && v <= u32::MAX as f64 && v.fract() == 0.0
}

/// The fuzzy category bit covering the given concrete number.
pub(crate) fn num_category(v: f64) -> ValueFlags {
    if v.is_nan() {
        ValueFlags::NUM_NAN
    } else if v.is_infinite() {
        ValueFlags::NUM_INF
    } else if v == 0.0 {
        ValueFlags::NUM_ZERO
    } else if is_uint32(v) {
        ValueFlags::NUM_UINT_POS
    } else {
        ValueFlags::NUM_OTHER
    }
}

/// The fuzzy category bit covering the given concrete string.
pub(crate) fn str_category(s: &str) -> ValueFlags {
    if strings::is_array_index(s) {
        ValueFlags::STR_UINT
    } else if strings::is_numeric(s) {
        ValueFlags::STR_OTHERNUM
    } else if strings::is_identifier(s) {
        ValueFlags::STR_IDENTIFIER
    } else if strings::is_other_identifier_parts(s) {
        ValueFlags::STR_OTHERIDENTIFIERPARTS
    } else {
        ValueFlags::STR_OTHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_reference_equality() {
        let a = Value::make_str("hello");
        let b = Value::make_str("hello");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));

        let c = Value::make_str("world");
        assert_ne!(a, c);
    }

    #[test]
    fn test_none_is_bottom() {
        let none = Value::make_none();
        assert!(none.is_none());
        assert!(!none.is_unknown());
        assert!(none.is_not_str());
        assert!(none.is_not_num());
        assert!(none.is_not_bool());
    }

    #[test]
    fn test_bool_facet() {
        let t = Value::make_bool(true);
        assert!(t.is_maybe_true_but_not_false());
        assert!(!t.is_maybe_false());
        assert!(!t.is_maybe_other_than_bool());

        let any = t.join_bool(false);
        assert_eq!(any, Value::make_any_bool());
        assert!(any.is_maybe_any_bool());
    }

    #[test]
    fn test_num_facet() {
        let five = Value::make_num(5.0);
        assert!(five.is_maybe_single_num());
        assert!(five.is_maybe_num(5.0));
        assert!(!five.is_maybe_num(6.0));
        assert_eq!(five.get_num(), Some(5.0));

        let nan = Value::make_num(f64::NAN);
        assert!(nan.is_nan());
        assert_eq!(nan, Value::make_num_nan());

        let joined = five.join_num(6.0);
        assert!(joined.is_maybe_single_num() == false);
        assert!(joined.is_maybe_num(5.0));
        assert!(joined.is_maybe_num(6.0));
        assert!(joined.is_maybe_num_uint_pos());
    }

    #[test]
    fn test_is_maybe_num_categories() {
        let any = Value::make_any_num();
        assert!(any.is_maybe_num(0.0));
        assert!(any.is_maybe_num(7.0));
        assert!(any.is_maybe_num(-1.5));
        assert!(any.is_maybe_num(f64::NAN));
        assert!(any.is_maybe_num(f64::INFINITY));

        let uint = Value::make_any_num_uint();
        assert!(uint.is_maybe_num(0.0));
        assert!(uint.is_maybe_num(42.0));
        assert!(!uint.is_maybe_num(-3.0));
        assert!(!uint.is_maybe_num(f64::NAN));
    }

    #[test]
    fn test_str_facet() {
        let s = Value::make_str("foo");
        assert!(s.is_maybe_single_str());
        assert_eq!(s.get_str(), "foo");
        assert!(s.is_maybe_str("foo"));
        assert!(!s.is_maybe_str("bar"));

        let any = Value::make_any_str();
        assert!(any.is_maybe_any_str());
        assert!(any.is_maybe_str("anything at all"));
        assert!(any.is_maybe_str(""));
    }

    #[test]
    fn test_str_category_queries() {
        let uint = Value::make_any_str_uint();
        assert!(uint.is_maybe_str("42"));
        assert!(!uint.is_maybe_str("foo"));
        assert!(uint.is_maybe_str_some_uint());
        assert!(!uint.is_maybe_str_some_non_uint());

        let ident = Value::make_any_str_ident();
        assert!(ident.is_maybe_str("foo"));
        assert!(ident.is_maybe_str("NaN"));
        assert!(!ident.is_maybe_str("42"));
    }

    #[test]
    fn test_object_labels() {
        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let v = Value::make_object(label.clone());
        assert!(v.is_maybe_object());
        assert!(!v.is_maybe_symbol());
        assert!(v.contains_object_label(&label));
        assert!(v.is_maybe_single_object_label());

        let other = ObjectLabel::new(LabelKind::Function, SourceLocation::new("t.ps", 2, 1));
        let joined = v.join_object(other.clone());
        assert_eq!(joined.get_object_labels().size(), 2);
        assert_eq!(joined.type_size(), 2);
    }

    #[test]
    fn test_replace_object_label() {
        let a = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let b = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 2, 2));
        let v = Value::make_object(a.clone());
        let r = v.replace_object_label(&a, &b);
        assert!(!r.contains_object_label(&a));
        assert!(r.contains_object_label(&b));
    }

    #[test]
    #[should_panic(expected = "equal object labels")]
    fn test_replace_object_label_equal_panics() {
        let a = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        Value::make_object(a.clone()).replace_object_label(&a, &a);
    }

    #[test]
    fn test_summarize() {
        let l = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let v = Value::make_object(l.clone());
        let s = Summarized::new(
            PersistentSet::singleton(l.clone()),
            PersistentSet::singleton(l.clone()),
        );
        let r = v.summarize(&s);
        assert!(!r.contains_object_label(&l));
        assert!(r.contains_object_label(&l.summary()));
    }

    #[test]
    fn test_attributes() {
        let v = Value::make_str("x").set_attributes(true, false, true);
        assert!(v.is_dont_enum());
        assert!(v.is_not_dont_delete());
        assert!(v.is_read_only());

        let cleared = v.remove_attributes();
        assert!(cleared.is_not_dont_enum());
        assert!(cleared.is_not_read_only());
        assert!(cleared.is_not_dont_delete());

        let copied = Value::make_num(1.0).set_attributes_from(&v);
        assert!(copied.is_dont_enum());
        assert!(copied.is_read_only());
    }

    #[test]
    fn test_polymorphic_roundtrip() {
        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let prop = ObjectProperty::new(
            label,
            crate::lattice::property::PropertyRef::Ordinary(PKey::string("f")),
        );
        let v = Value::make_str("payload").set_attributes(true, true, false);
        let poly = v.make_polymorphic(prop.clone());
        assert!(poly.is_polymorphic());
        assert!(poly.is_maybe_present_data());
        assert!(!poly.is_maybe_present_accessor());
        assert_eq!(poly.get_object_property(), Some(&prop));
        assert!(poly.is_dont_enum());

        let back = poly.make_non_polymorphic();
        assert!(!back.is_polymorphic());
        assert!(back.is_none());
    }

    #[test]
    #[should_panic(expected = "polymorphic")]
    fn test_polymorphic_query_panics() {
        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let prop = ObjectProperty::new(
            label,
            crate::lattice::property::PropertyRef::Ordinary(PKey::string("f")),
        );
        let poly = Value::make_none().make_polymorphic(prop);
        poly.is_maybe_undef();
    }

    #[test]
    #[should_panic(expected = "unknown")]
    fn test_unknown_query_panics() {
        Value::make_unknown().is_maybe_str("x");
    }

    #[test]
    fn test_absent_and_presence() {
        let absent = Value::make_absent();
        assert!(absent.is_maybe_absent());
        assert!(!absent.is_maybe_present());
        assert!(!absent.is_none());

        let v = Value::make_num(1.0).join_absent();
        assert!(v.is_maybe_absent());
        assert!(v.is_maybe_present());
        assert!(!v.is_not_absent());
    }

    #[test]
    fn test_make_strings() {
        let v = Value::make_strings(["foo", "bar", "baz"]);
        assert!(v.is_maybe_str("foo"));
        assert!(v.is_maybe_str("baz"));
        assert!(!v.is_maybe_str("qux"));
        assert_eq!(v.get_all_known_str().size(), 3);
    }

    #[test]
    fn test_join_any_str_categories() {
        let v = Value::make_str("foo").join_any_str_uint();
        assert!(v.is_maybe_str_uint());
        assert!(v.is_maybe_str_identifier(), "single string dissolves");
        assert!(!v.is_maybe_single_str());
        assert!(v.is_maybe_str("7"));
        assert!(v.is_maybe_str("foo"));

        let w = Value::make_json_str()
            .restrict_to_not_strings(["7", "foo"])
            .join_any_str_uint();
        assert!(w.is_maybe_str("7"), "re-covered exclusion is dropped");
        assert!(!w.is_maybe_str("foo"), "unrelated exclusion survives");

        assert_eq!(Value::make_any_str().join_any_str(), Value::make_any_str());
        assert_eq!(
            Value::make_none().join_any_str_identifier(),
            Value::make_any_str_ident()
        );
        let parts = Value::make_none().join_any_str_identifier_parts();
        assert!(parts.is_maybe_str_uint());
        assert!(parts.is_maybe_str_identifier());
        assert!(parts.is_maybe_str_other_identifier_parts());

        let other = Value::make_none().join_any_str_other();
        assert!(other.is_maybe_str("x y"));
        assert!(!other.is_maybe_str("foo"));
    }

    #[test]
    fn test_uint32_predicate() {
        assert!(is_uint32(0.0));
        assert!(is_uint32(-0.0));
        assert!(is_uint32(4294967295.0));
        assert!(!is_uint32(4294967296.0));
        assert!(!is_uint32(-1.0));
        assert!(!is_uint32(0.5));
        assert!(!is_uint32(f64::NAN));
    }

    #[test]
    fn test_getters_setters() {
        let label = ObjectLabel::new(LabelKind::Function, SourceLocation::new("t.ps", 1, 1));
        let getter = Value::make_object(label.clone()).make_getter();
        assert!(getter.is_maybe_getter());
        assert!(!getter.is_maybe_object_or_symbol());
        assert!(getter.is_maybe_present_accessor());

        let joined = Value::make_num(3.0).join_getters_setters(&getter);
        assert!(joined.is_maybe_getter());
        assert!(joined.is_maybe_num(3.0));
    }

    #[test]
    #[should_panic(expected = "getter/setter")]
    fn test_join_getters_setters_rejects_accessor_receiver() {
        let label = ObjectLabel::new(LabelKind::Function, SourceLocation::new("t.ps", 1, 1));
        let getter = Value::make_object(label).make_getter();
        getter.join_getters_setters(&getter);
    }
}
