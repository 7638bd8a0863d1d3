//! Join (least upper bound) and widening.
//!
//! `join` produces the smallest value that is greater than or equal to both
//! inputs. Widening trades precision for termination: included-string sets
//! collapse on any growth and excluded-string refinements collapse on any
//! disagreement, so that chains of widened joins stabilize.

use rustc_hash::FxHashSet;

use crate::canonical;
use crate::diagnostics;
use crate::error::{raise, AnalysisError};
use crate::lattice::flags::ValueFlags;
use crate::lattice::value::{num_category, str_category, Value, ValueData};
use crate::options;
use crate::persistent::{Join, PersistentSet};
use crate::strings;

impl Value {
    /// Constructs a value as the join of this value and the given value.
    pub fn join(&self, v: &Value) -> Value {
        self.join_with(v, false)
    }

    /// Constructs a value as the widened join of this value and the given
    /// value.
    pub fn widening_join(&self, v: &Value) -> Value {
        self.join_with(v, true)
    }

    /// Constructs a value as the join of this value and the given value,
    /// optionally applying widening.
    pub fn join_with(&self, v: &Value, widen: bool) -> Value {
        if v.is_unknown() {
            return self.clone();
        }
        if self.is_polymorphic() && v.is_polymorphic() {
            if self.data().var != v.data().var {
                raise(AnalysisError::PolymorphicJoinMismatch);
            }
            let extra_flags = v.flags();
            let fvp = join_partitioning(self, v);
            return self.modified(|d| {
                d.flags |= extra_flags;
                d.free_variable_partitioning = fvp;
            });
        }
        if self.is_unknown() || self.is_polymorphic() {
            // The other side wins; the partitioning of this side survives.
            let fvp = self.data().free_variable_partitioning.clone();
            return v.with_free_variable_partitioning(fvp);
        }
        if v.is_polymorphic() {
            return self.clone();
        }
        self.join_non_polymorphic(v, widen)
    }

    /// Constructs a value as the join of the given values, `none` for an
    /// empty collection.
    pub fn join_all<I: IntoIterator<Item = Value>>(values: I) -> Value {
        let mut result = Value::make_none();
        for v in values {
            result = result.join(&v);
        }
        result
    }

    fn join_non_polymorphic(&self, v: &Value, widen: bool) -> Value {
        let opts = options::get();
        let sd = self.data();
        let vd = v.data();

        let mut flags = sd.flags;
        let mut num = sd.num;
        let mut strv = sd.str.clone();

        // Numbers: two differing singles relax into their categories, a
        // single meeting a fuzzy side is relaxed likewise.
        match (sd.num, vd.num) {
            (Some(a), Some(b)) => {
                if a.to_bits() != b.to_bits() {
                    diagnostics::emit_number_relaxed();
                    flags |= num_category(a) | num_category(b);
                    num = None;
                }
            }
            (Some(a), None) => {
                if vd.flags.intersects(ValueFlags::NUM) {
                    diagnostics::emit_number_relaxed();
                    flags |= num_category(a);
                    num = None;
                }
            }
            (None, Some(b)) => {
                if sd.flags.intersects(ValueFlags::NUM) {
                    flags |= num_category(b);
                } else {
                    num = Some(b);
                }
            }
            (None, None) => {}
        }

        let self_is_prefix = sd.flags.contains(ValueFlags::STR_PREFIX);
        let v_is_prefix = vd.flags.contains(ValueFlags::STR_PREFIX);
        let self_has_str = sd.flags.intersects(ValueFlags::STR) || sd.str.is_some();
        let v_has_str = vd.flags.intersects(ValueFlags::STR) || vd.str.is_some();
        let bound = opts.string_sets_bound;

        // Included strings.
        let mut included: Option<PersistentSet<String>> =
            match (&sd.included_strings, &vd.included_strings) {
                (Some(a), Some(b)) => {
                    let union = a.union(b);
                    let grew = union.size() != a.size();
                    if widen && grew {
                        diagnostics::emit_string_set_widened();
                        None
                    } else if union.size() > bound {
                        diagnostics::emit_string_set_bound(union.size());
                        None
                    } else {
                        Some(union)
                    }
                }
                (Some(a), None) => {
                    if !v_has_str {
                        Some(a.clone())
                    } else {
                        match vd.str.as_ref() {
                            Some(s) if !v_is_prefix => {
                                if a.contains(s) {
                                    Some(a.clone())
                                } else if !widen {
                                    let grown = a.add(s.clone());
                                    if grown.size() > bound {
                                        diagnostics::emit_string_set_bound(grown.size());
                                        None
                                    } else {
                                        Some(grown)
                                    }
                                } else {
                                    diagnostics::emit_string_set_widened();
                                    None
                                }
                            }
                            // The other side covers infinitely many strings.
                            _ => None,
                        }
                    }
                }
                (None, Some(b)) => {
                    if !self_has_str {
                        Some(b.clone())
                    } else {
                        match sd.str.as_ref() {
                            Some(s) if !self_is_prefix => {
                                if b.contains(s) {
                                    Some(b.clone())
                                } else if !widen {
                                    let grown = b.add(s.clone());
                                    if grown.size() > bound {
                                        diagnostics::emit_string_set_bound(grown.size());
                                        None
                                    } else {
                                        Some(grown)
                                    }
                                } else {
                                    diagnostics::emit_string_set_widened();
                                    None
                                }
                            }
                            // This side covers infinitely many strings.
                            _ => None,
                        }
                    }
                }
                (None, None) => None,
            };

        // Excluded strings: each side's exclusions survive only where the
        // other side cannot produce the string.
        let mut excluded: Option<PersistentSet<String>> =
            if sd.excluded_strings.is_none() && vd.excluded_strings.is_none() {
                None
            } else {
                let mut residual: FxHashSet<String> = FxHashSet::default();
                if let Some(e) = &sd.excluded_strings {
                    for s in e.iter() {
                        if !v.is_maybe_str(s) {
                            residual.insert(s.clone());
                        }
                    }
                }
                if let Some(e) = &vd.excluded_strings {
                    for s in e.iter() {
                        if !self.is_maybe_str(s) {
                            residual.insert(s.clone());
                        }
                    }
                }
                let new_set = if residual.is_empty() {
                    None
                } else {
                    Some(PersistentSet::from(residual))
                };
                if widen
                    && new_set.is_some()
                    && sd.excluded_strings.is_some()
                    && vd.excluded_strings.is_some()
                    && new_set != sd.excluded_strings
                {
                    diagnostics::emit_excluded_strings_widened();
                    None
                } else {
                    new_set
                }
            };

        // Single and prefix strings.
        match (sd.str.as_ref(), vd.str.as_ref()) {
            (Some(a), Some(b)) => {
                if !(!self_is_prefix && !v_is_prefix && a == b) {
                    if !self_is_prefix && !v_is_prefix && !opts.no_string_sets {
                        let mut pair = FxHashSet::default();
                        pair.insert(a.clone());
                        pair.insert(b.clone());
                        included = Some(PersistentSet::from(pair));
                    }
                    let shared = strings::shared_prefix(a, b);
                    if shared.is_empty() {
                        diagnostics::emit_prefix_collapsed(a, b);
                        flags -= ValueFlags::STR_PREFIX;
                        strv = None;
                        join_fuzzy_category(&mut flags, b, v_is_prefix, vd.included_strings.as_ref());
                        join_fuzzy_category(&mut flags, a, self_is_prefix, sd.included_strings.as_ref());
                    } else {
                        flags |= ValueFlags::STR_PREFIX;
                        strv = Some(shared);
                    }
                }
            }
            (Some(a), None) => {
                if vd.flags.intersects(ValueFlags::STR) {
                    // The other side is fuzzy; this single/prefix string
                    // dissolves into its categories.
                    flags -= ValueFlags::STR_PREFIX;
                    strv = None;
                    join_fuzzy_category(&mut flags, a, self_is_prefix, sd.included_strings.as_ref());
                }
            }
            (None, Some(b)) => {
                if !sd.flags.intersects(ValueFlags::STR) {
                    strv = Some(b.clone());
                    if v_is_prefix {
                        flags |= ValueFlags::STR_PREFIX;
                    }
                } else {
                    join_fuzzy_category(&mut flags, b, v_is_prefix, vd.included_strings.as_ref());
                    if !v_is_prefix {
                        if let Some(inc) = &included {
                            included = Some(inc.add(b.clone()));
                        }
                    }
                }
            }
            (None, None) => {}
        }

        if included.is_some() {
            excluded = None;
        }

        // Objects, getters, setters: set union.
        let object_labels = join_label_sets(&sd.object_labels, &vd.object_labels);
        let getters = join_label_sets(&sd.getters, &vd.getters);
        let setters = join_label_sets(&sd.setters, &vd.setters);

        // Flags: bitwise OR, except STR_PREFIX which is governed by the
        // single/prefix logic above.
        flags |= vd.flags - ValueFlags::STR_PREFIX;
        flags -= ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR;
        if flags.intersects(ValueFlags::STR_IDENTIFIER | ValueFlags::STR_OTHERIDENTIFIERPARTS)
            && flags.contains(ValueFlags::STR_PREFIX)
        {
            flags -= ValueFlags::STR_PREFIX;
            strv = None;
        }

        let free_variable_partitioning = join_partitioning(self, v);

        let mut data = ValueData::none();
        data.flags = flags;
        data.num = num;
        data.str = strv;
        data.object_labels = object_labels;
        data.getters = getters;
        data.setters = setters;
        data.excluded_strings = excluded;
        data.included_strings = included;
        data.free_variable_partitioning = free_variable_partitioning;
        canonical::canonicalize(data)
    }
}

fn join_label_sets<T: Eq + std::hash::Hash + Clone>(
    a: &Option<PersistentSet<T>>,
    b: &Option<PersistentSet<T>>,
) -> Option<PersistentSet<T>> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x.clone()),
        (None, Some(y)) => Some(y.clone()),
        (Some(x), Some(y)) => Some(x.union(y)),
    }
}

fn join_partitioning(
    a: &Value,
    b: &Value,
) -> Option<crate::lattice::property::FreeVariablePartitioning> {
    match (
        &a.data().free_variable_partitioning,
        &b.data().free_variable_partitioning,
    ) {
        (None, None) => None,
        (Some(p), None) => Some(p.clone()),
        (None, Some(q)) => Some(q.clone()),
        (Some(p), Some(q)) => Some(p.join(q)),
    }
}

/// The string-category bits covered by the included strings of a prefix
/// value.
pub(crate) fn included_categories(included: &PersistentSet<String>) -> ValueFlags {
    let mut flags = ValueFlags::empty();
    for s in included.iter() {
        flags |= str_category(s);
    }
    flags
}

/// Dissolves a single or prefix string into fuzzy category bits. For a
/// prefix with known included strings, the exact suffixes give a precise
/// category set; otherwise the suffix is unknown and every non-prefix
/// category is possible.
pub(crate) fn join_fuzzy_category(
    flags: &mut ValueFlags,
    s: &str,
    is_prefix: bool,
    included: Option<&PersistentSet<String>>,
) {
    if is_prefix {
        match included {
            Some(inc) => *flags |= included_categories(inc),
            None => {
                *flags |=
                    ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER
            }
        }
    } else {
        *flags |= str_category(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_identity_and_idempotence() {
        let v = Value::make_num(7.0).join_str("x");
        assert_eq!(v.join(&Value::make_none()), v);
        assert_eq!(Value::make_none().join(&v), v);
        assert_eq!(v.join(&v), v);
    }

    #[test]
    fn test_join_unknown() {
        let v = Value::make_num(7.0);
        let unknown = Value::make_unknown();
        assert_eq!(v.join(&unknown), v);
        assert_eq!(unknown.join(&v), v);
    }

    #[test]
    fn test_join_numbers_same_and_different() {
        let five = Value::make_num(5.0);
        assert_eq!(five.join(&Value::make_num(5.0)), five);

        let j = five.join(&Value::make_num(0.5));
        assert!(!j.is_maybe_single_num());
        assert!(j.is_maybe_num_uint_pos());
        assert!(j.is_maybe_num_other());
        assert!(j.is_maybe_num(5.0));
        assert!(j.is_maybe_num(0.5));
        assert!(!j.is_maybe_num(7.0));
    }

    #[test]
    fn test_join_single_number_with_fuzzy() {
        let j = Value::make_num(3.0).join(&Value::make_any_num_other());
        assert!(!j.is_maybe_single_num());
        assert!(j.is_maybe_num_uint_pos());
        assert!(j.is_maybe_num_other());
    }

    #[test]
    fn test_join_two_identifier_strings() {
        let j = Value::make_str("foo").join(&Value::make_str("bar"));
        assert!(j.is_maybe_str_identifier());
        assert!(!j.is_maybe_str_prefix());
        assert!(j.is_maybe_str("foo"));
        assert!(j.is_maybe_str("bar"));
        assert!(!j.is_maybe_str("baz"));
        assert_eq!(j.get_included_strings().map(|s| s.size()), Some(2));
    }

    #[test]
    fn test_join_strings_with_shared_prefix() {
        let j = Value::make_str("file_a").join(&Value::make_str("file_b"));
        assert!(j.is_maybe_str_prefix());
        assert_eq!(j.get_prefix(), "file_");
        assert!(j.is_maybe_str("file_a"));
        assert!(!j.is_maybe_str("file_c"));
    }

    #[test]
    fn test_join_single_string_with_fuzzy() {
        let j = Value::make_str("foo").join(&Value::make_any_str_uint());
        assert!(j.is_maybe_str_uint());
        assert!(j.is_maybe_str_identifier());
        assert!(j.is_maybe_str("foo"));
        assert!(j.is_maybe_str("7"));
    }

    #[test]
    fn test_join_fuzzy_with_single_string() {
        let j = Value::make_any_str_uint().join(&Value::make_str("foo"));
        assert!(j.is_maybe_str("foo"));
        assert!(j.is_maybe_str("7"));
    }

    #[test]
    fn test_join_string_set_bound() {
        let count = crate::options::DEFAULT_STRING_SETS_BOUND + 50;
        let j = Value::join_all((0..count).map(|i| Value::make_str(format!("key{}", i))));
        assert!(j.get_included_strings().is_none(), "bound exceeded, set widened");
        assert!(j.is_maybe_str("key0"));
        assert!(j.is_maybe_str("key999999"));
    }

    #[test]
    fn test_widening_collapses_included_growth() {
        let a = Value::make_str("aa").join(&Value::make_str("ab"));
        let b = Value::make_str("ac").join(&Value::make_str("ad"));
        assert!(a.get_included_strings().is_some());

        let widened = a.widening_join(&b);
        assert!(widened.get_included_strings().is_none());

        let plain = a.join(&b);
        assert_eq!(plain.get_included_strings().map(|s| s.size()), Some(4));
    }

    #[test]
    fn test_widening_keeps_stable_included() {
        let a = Value::make_str("x1").join(&Value::make_str("x2"));
        let same = a.widening_join(&a);
        assert_eq!(same, a);
    }

    #[test]
    fn test_join_excluded_strings_residual() {
        let a = Value::make_any_str_excluding(["foo", "bar"]);
        let b = Value::make_str("foo");
        let j = a.join(&b);
        // "foo" is produced by the right side, so its exclusion dies.
        assert!(j.is_maybe_str("foo"));
        assert!(!j.is_maybe_str("bar"));
    }

    #[test]
    fn test_widening_excluded_needs_both_sides() {
        // Only the left side has exclusions: widening must not collapse.
        let a = Value::make_any_str_excluding(["bar"]);
        let b = Value::make_str("foo");
        let j = a.widening_join(&b);
        assert!(!j.is_maybe_str("bar"));

        // Both sides have exclusions and the residual changes: collapse.
        let c = Value::make_any_str_excluding(["bar", "qux"]);
        let d = Value::make_any_str_excluding(["bar"]);
        let jw = c.widening_join(&d);
        assert!(jw.get_excluded_strings().is_none());
        assert!(jw.is_maybe_str("qux"));

        // Both sides agree: the exclusion survives widening.
        let stable = c.widening_join(&c);
        assert!(!stable.is_maybe_str("bar"));
        assert!(!stable.is_maybe_str("qux"));
    }

    #[test]
    fn test_join_objects_union() {
        use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation};
        let a = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let b = ObjectLabel::new(LabelKind::Array, SourceLocation::new("t.ps", 2, 1));
        let j = Value::make_object(a.clone()).join(&Value::make_object(b.clone()));
        assert!(j.contains_object_label(&a));
        assert!(j.contains_object_label(&b));
    }

    #[test]
    fn test_join_flags_or() {
        let j = Value::make_undef().join(&Value::make_null()).join(&Value::make_bool(true));
        assert!(j.is_maybe_undef());
        assert!(j.is_maybe_null());
        assert!(j.is_maybe_true());
        assert!(!j.is_maybe_false());
    }

    #[test]
    #[should_panic(expected = "different property")]
    fn test_join_polymorphic_mismatch_panics() {
        use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation};
        use crate::lattice::property::{ObjectProperty, PKey, PropertyRef};

        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let p = Value::make_undef().make_polymorphic(ObjectProperty::new(
            label.clone(),
            PropertyRef::Ordinary(PKey::string("p")),
        ));
        let q = Value::make_undef().make_polymorphic(ObjectProperty::new(
            label,
            PropertyRef::Ordinary(PKey::string("q")),
        ));
        p.join(&q);
    }

    #[test]
    fn test_join_polymorphic_with_non_polymorphic() {
        use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation};
        use crate::lattice::property::{ObjectProperty, PKey, PropertyRef};

        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("t.ps", 1, 1));
        let poly = Value::make_undef().make_polymorphic(ObjectProperty::new(
            label,
            PropertyRef::Ordinary(PKey::string("p")),
        ));
        let v = Value::make_num(1.0);
        assert_eq!(poly.join(&v), v);
        assert_eq!(v.join(&poly), v);
    }

    #[test]
    fn test_join_all_empty_is_none() {
        assert_eq!(Value::join_all(std::iter::empty()), Value::make_none());
    }

    #[test]
    fn test_join_preserves_partitioning() {
        use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation};
        use crate::lattice::property::{FreeVariablePartitioning, Partitions};
        use crate::persistent::PersistentMap;

        let f = ObjectLabel::new(LabelKind::Function, SourceLocation::new("t.ps", 9, 1));
        let fvp = FreeVariablePartitioning::new(
            PersistentMap::empty().put(f.clone(), Partitions::new([1])),
        );
        let a = Value::make_num(1.0).with_free_variable_partitioning(Some(fvp.clone()));
        let b = Value::make_num(2.0);
        let j = a.join(&b);
        assert_eq!(j.get_free_variable_partitioning(), Some(&fvp));
    }
}
