//! Equality-driven restriction.
//!
//! These four operators implement the transfer of `if (x OP y)` for the
//! strict and loose (non-)equality operators. The strict forms intersect
//! facet-by-facet; the not-equals forms only restrict when the other side
//! is a single concrete value; the loose forms additionally account for the
//! coercions of the analyzed language, where `0`, `false`, `""`, and
//! numeric strings with value zero are mutually equal, and `null` and
//! `undefined` equal each other and nothing else.

use crate::canonical;
use crate::lattice::flags::ValueFlags;
use crate::lattice::join::included_categories;
use crate::lattice::restrict::{data_maybe_str_ignoring_sets, normalize_included_excluded};
use crate::lattice::value::{Value, ValueData};
use crate::persistent::PersistentSet;
use crate::strings;

/// Installs an intersected included-string enumeration on the payload. A
/// prefix representation survives when every surviving string still starts
/// with the prefix; otherwise the category bits are re-derived from the
/// enumeration.
fn apply_included_intersection(d: &mut ValueData, intersected: PersistentSet<String>) {
    let keep_prefix = d.flags.contains(ValueFlags::STR_PREFIX)
        && !intersected.is_empty()
        && d.str
            .as_deref()
            .map_or(false, |p| intersected.iter().all(|s| s.starts_with(p)));
    if keep_prefix {
        d.flags = (d.flags - ValueFlags::STR) | ValueFlags::STR_PREFIX;
    } else {
        d.flags -= ValueFlags::STR;
        d.flags |= included_categories(&intersected);
        d.str = None;
    }
    d.excluded_strings = None;
    d.included_strings = Some(intersected);
}

/// Removes the given string from an included enumeration, or records it as
/// excluded when the string facet is fuzzy.
fn remove_included_add_excluded(d: &mut ValueData, s: &str) {
    if let Some(inc) = &d.included_strings {
        d.included_strings = Some(inc.remove(&s.to_string()));
    } else if d.flags.intersects(ValueFlags::STR) && data_maybe_str_ignoring_sets(d, s) {
        let excluded = d
            .excluded_strings
            .clone()
            .unwrap_or_default()
            .add(s.to_string());
        d.excluded_strings = Some(excluded);
    }
}

impl Value {
    /// Returns a safe approximation of the intersection of this value and
    /// the given value under strict equality. Models the true branch of
    /// `if (x === y)`.
    pub fn restrict_to_strict_equals(&self, v: &Value) -> Value {
        self.check_not_polymorphic_or_unknown();
        if v.data().getters.is_some() {
            // Getters could return anything; keep everything to stay safe.
            return self.clone();
        }
        let sd = self.data();
        let vd = v.data();
        let mut d = sd.clone();

        // Booleans and null: intersect by flags.
        d.flags &= vd.flags | !(ValueFlags::BOOL | ValueFlags::NULL);

        // Undefined and absent, with absent treated as undefined.
        if !vd.flags.intersects(ValueFlags::UNDEF | ValueFlags::ABSENT) {
            d.flags -= ValueFlags::UNDEF | ValueFlags::ABSENT;
        }

        // Numbers.
        if let Some(n) = sd.num {
            if !v.is_maybe_num(n) {
                d.num = None;
            }
        } else if let Some(m) = vd.num {
            if self.is_maybe_num(m) {
                d.num = Some(m);
            }
            d.flags -= ValueFlags::NUM;
        } else {
            d.flags &= vd.flags | !ValueFlags::NUM;
        }

        // Strings.
        let self_single_str = sd.str.is_some() && !sd.flags.contains(ValueFlags::STR_PREFIX);
        let v_single_str = vd.str.is_some() && !vd.flags.contains(ValueFlags::STR_PREFIX);
        if self_single_str {
            if let Some(s) = &sd.str {
                if !v.is_maybe_str(s) {
                    d.str = None;
                }
            }
        } else if v_single_str {
            d.str = vd.str.clone().filter(|s| self.is_maybe_str(s));
            d.flags -= ValueFlags::STR;
            d.included_strings = None;
            d.excluded_strings = None;
        } else if sd.included_strings.is_some() || vd.included_strings.is_some() {
            let intersected = match (&sd.included_strings, &vd.included_strings) {
                (Some(a), Some(b)) => a.intersect(b),
                (Some(a), None) => a.remove_if(|s| !v.is_maybe_str(s)),
                (None, Some(b)) => b.remove_if(|s| !self.is_maybe_str(s)),
                (None, None) => unreachable!(),
            };
            apply_included_intersection(&mut d, intersected);
            normalize_included_excluded(&mut d);
        } else {
            let self_prefix = sd.flags.contains(ValueFlags::STR_PREFIX);
            let v_prefix = vd.flags.contains(ValueFlags::STR_PREFIX);
            if (sd.flags | vd.flags).contains(ValueFlags::STR_JSON) {
                // JSON strings stay as they are; any string is possible.
            } else if self_prefix && v_prefix {
                let a = sd.str.as_deref().unwrap_or_default();
                let b = vd.str.as_deref().unwrap_or_default();
                let longer = if a.starts_with(b) {
                    Some(a)
                } else if b.starts_with(a) {
                    Some(b)
                } else {
                    None
                };
                d.flags -= ValueFlags::STR;
                match longer {
                    Some(p) => {
                        d.str = Some(p.to_string());
                        d.flags |= ValueFlags::STR_PREFIX;
                    }
                    None => d.str = None,
                }
            } else if self_prefix {
                let prefix = sd.str.as_deref().unwrap_or_default();
                let compatible = (vd.flags.contains(ValueFlags::STR_UINT)
                    && strings::is_array_index(prefix))
                    || (vd.flags.contains(ValueFlags::STR_OTHERNUM)
                        && !strings::contains_non_number_characters(prefix))
                    || (vd.flags.contains(ValueFlags::STR_IDENTIFIER)
                        && strings::is_identifier_parts(prefix))
                    || (vd.flags.contains(ValueFlags::STR_OTHERIDENTIFIERPARTS)
                        && strings::is_other_identifier_parts(prefix))
                    || (vd.flags.contains(ValueFlags::STR_OTHER)
                        && (strings::contains_non_number_characters(prefix)
                            || !strings::is_identifier_parts(prefix)));
                if !compatible {
                    d.flags -= ValueFlags::STR;
                    d.str = None;
                }
            } else if v_prefix {
                if sd.flags.contains(
                    ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
                ) {
                    // This side is any string, so the prefix carries over.
                    d.flags = (d.flags - ValueFlags::STR) | ValueFlags::STR_PREFIX;
                    d.str = vd.str.clone();
                } else {
                    let prefix = vd.str.as_deref().unwrap_or_default();
                    if !strings::is_array_index(prefix) {
                        d.flags -= ValueFlags::STR_UINT;
                    }
                    if strings::contains_non_number_characters(prefix) {
                        d.flags -= ValueFlags::STR_OTHERNUM;
                    }
                    if !strings::is_identifier_parts(prefix) {
                        d.flags -=
                            ValueFlags::STR_IDENTIFIER | ValueFlags::STR_OTHERIDENTIFIERPARTS;
                    }
                }
            } else {
                // Both fuzzy or not strings: intersect the category bits.
                d.flags &= vd.flags | !ValueFlags::STR;
            }
            if let Some(v_excluded) = &vd.excluded_strings {
                let combined = match &d.excluded_strings {
                    Some(own) => own.union(v_excluded),
                    None => v_excluded.clone(),
                };
                d.excluded_strings = Some(combined);
            }
            if let Some(excluded) = d.excluded_strings.clone() {
                let retained = excluded.remove_if(|s| !data_maybe_str_ignoring_sets(&d, s));
                d.excluded_strings = if retained.is_empty() {
                    None
                } else {
                    Some(retained)
                };
            }
        }

        // Objects and symbols: intersect the label sets.
        d.object_labels = match (&d.object_labels, &vd.object_labels) {
            (Some(own), Some(other)) => Some(own.intersect(other)).filter(|s| !s.is_empty()),
            _ => None,
        };

        canonical::canonicalize(d)
    }

    /// Returns a safe approximation of this value minus the given value
    /// under strict equality. Models the false branch of `if (x === y)`.
    pub fn restrict_to_strict_not_equals(&self, v: &Value) -> Value {
        self.check_not_polymorphic_or_unknown();
        let vd = v.data();
        let v_multi_object = match &vd.object_labels {
            Some(labels) => {
                labels.size() > 1 || labels.iter().any(|l| !l.is_singleton())
            }
            None => false,
        };
        if v.is_maybe_fuzzy_str() || v.is_maybe_fuzzy_num() || v_multi_object {
            return self.clone();
        }
        let v_is_undef_or_absent = v.is_maybe_undef() || v.is_maybe_absent();
        let v_is_null = v.is_maybe_null();
        let v_is_true = v.is_maybe_true();
        let v_is_false = v.is_maybe_false();
        let v_is_string = !v.is_not_str();
        let v_is_number = !v.is_not_num();
        let v_is_object = vd.object_labels.is_some();
        let facets = [
            v_is_undef_or_absent,
            v_is_null,
            v_is_true,
            v_is_false,
            v_is_string,
            v_is_number,
            v_is_object,
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if facets != 1 {
            // Not a single concrete value; nothing can be removed.
            return self.clone();
        }
        if v_is_string {
            return self.restrict_to_not_strings([v.get_str()]);
        }
        self.modified(|d| {
            if v_is_undef_or_absent {
                d.flags -= ValueFlags::UNDEF | ValueFlags::ABSENT;
            } else if v_is_null {
                d.flags -= ValueFlags::NULL;
            } else if v_is_true {
                d.flags -= ValueFlags::BOOL_TRUE;
            } else if v_is_false {
                d.flags -= ValueFlags::BOOL_FALSE;
            } else if v_is_number {
                // NaN is never strictly equal to itself, so it survives.
                if let (Some(own), Some(other)) = (d.num, vd.num) {
                    if own == other && !other.is_nan() {
                        d.num = None;
                    }
                }
            } else if let (Some(own), Some(other)) = (&d.object_labels, &vd.object_labels) {
                if let Some(single) = other.iter().next() {
                    let remaining = own.remove(single);
                    d.object_labels = if remaining.is_empty() {
                        None
                    } else {
                        Some(remaining)
                    };
                }
            }
        })
    }

    /// Returns a safe approximation of the intersection of this value and
    /// the given value under loose equality. Models the true branch of
    /// `if (x == y)`.
    pub fn restrict_to_loose_equals(&self, v: &Value) -> Value {
        self.check_not_polymorphic_or_unknown();
        let sd = self.data();
        let vd = v.data();
        if vd.object_labels.is_some() {
            // An object can be loosely equal to almost anything; give up.
            return self.clone();
        }
        let mut d = sd.clone();

        if sd.included_strings.is_some() || vd.included_strings.is_some() {
            let intersected = match (&sd.included_strings, &vd.included_strings) {
                (Some(a), Some(b)) => a.intersect(b),
                (Some(a), None) => a.remove_if(|s| !v.is_maybe_str(s)),
                (None, Some(b)) => b.remove_if(|s| !self.is_maybe_str(s)),
                (None, None) => unreachable!(),
            };
            apply_included_intersection(&mut d, intersected);
        } else {
            let v_is_not_undef_absent_or_null =
                !(v.is_maybe_undef() || v.is_maybe_absent() || v.is_maybe_null());
            let v_is_not_true = !v.is_maybe_true();
            let v_is_not_false = !v.is_maybe_false();
            let v_is_not_number = v.is_not_num();
            let v_is_not_string = v.is_not_str();
            let v_is_not_zero = !v.is_maybe_zero();
            let v_is_not_empty_string = !v.is_maybe_str("");

            let v_numeric_string_number = match &vd.str {
                Some(s) if v.is_maybe_single_str() => strings::parse_numeric(s),
                _ => None,
            };
            let v_is_not_numeric_string = if v.is_maybe_single_str() {
                v_numeric_string_number.is_none()
            } else {
                !v.is_maybe_fuzzy_str()
            };
            let this_is_not_numeric_string = if self.is_maybe_single_str() {
                sd.str
                    .as_deref()
                    .and_then(strings::parse_numeric)
                    .is_none()
            } else {
                !self.is_maybe_fuzzy_str()
            };
            let v_is_numeric_string_not_zero =
                matches!(v_numeric_string_number, Some(n) if n != 0.0);

            if v_is_not_undef_absent_or_null {
                d.flags -= ValueFlags::UNDEF | ValueFlags::ABSENT | ValueFlags::NULL;
            }
            if v_is_not_true {
                d.flags -= ValueFlags::BOOL_TRUE;
            }
            if v_is_not_string && v_is_not_number && v_is_not_false {
                d.flags -= ValueFlags::STR;
                d.str = None;
                d.included_strings = None;
                d.excluded_strings = None;
            }
            if v_is_not_number && v_is_not_false && v_is_not_empty_string && v_is_not_numeric_string
            {
                d.flags -= ValueFlags::NUM;
                d.num = None;
            }
            if v_is_not_zero && v_is_not_false && v_is_not_empty_string && v_is_numeric_string_not_zero
            {
                d.flags -= ValueFlags::NUM_ZERO | ValueFlags::BOOL_FALSE;
                if matches!(d.num, Some(n) if n == 0.0) {
                    d.num = None;
                }
                remove_included_add_excluded(&mut d, "");
                remove_included_add_excluded(&mut d, "0");
            }
            if let Some(own) = d.num {
                if own != 0.0 && !v.is_maybe_num(own) {
                    if matches!(v_numeric_string_number, Some(n) if n != own) {
                        d.num = None;
                    }
                }
            }
            if self.is_maybe_single_str() {
                if let Some(own) = sd.str.clone() {
                    if !own.is_empty()
                        && !v.is_maybe_str(&own)
                        && (v_is_not_number || this_is_not_numeric_string)
                    {
                        d.str = None;
                    }
                }
            }
        }
        normalize_included_excluded(&mut d);
        canonical::canonicalize(d)
    }

    /// Returns a safe approximation of this value minus the given value
    /// under loose equality. Models the false branch of `if (x == y)`.
    pub fn restrict_to_loose_not_equals(&self, v: &Value) -> Value {
        self.check_not_polymorphic_or_unknown();
        let sd = self.data();
        let vd = v.data();
        // NaN is treated as fuzzy, so it cannot be removed here even though
        // it is not loosely equal to itself.
        if v.is_maybe_fuzzy_str() || v.is_maybe_fuzzy_num() || vd.object_labels.is_some() {
            return self.clone();
        }
        let v_is_undef_absent_or_null =
            v.is_maybe_undef() || v.is_maybe_absent() || v.is_maybe_null();
        let v_is_true = v.is_maybe_true();
        let v_is_false = v.is_maybe_false();
        let v_is_string = !v.is_not_str();
        let v_is_number = !v.is_not_num();
        let facets = [
            v_is_undef_absent_or_null,
            v_is_true,
            v_is_false,
            v_is_string,
            v_is_number,
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if facets != 1 {
            return self.clone();
        }
        let v_is_number_zero = v_is_number && matches!(vd.num, Some(n) if n == 0.0);
        let v_number_if_string_numeric = if v_is_string {
            vd.str.as_deref().and_then(strings::parse_numeric)
        } else {
            None
        };
        let this_number_if_string_numeric = if self.is_maybe_single_str() {
            sd.str.as_deref().and_then(strings::parse_numeric)
        } else {
            None
        };
        let v_is_string_zero = matches!(v_number_if_string_numeric, Some(n) if n == 0.0);
        let v_is_string_empty = v_is_string
            && matches!(&vd.str, Some(s) if s.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty());

        let mut d = sd.clone();
        if v_is_undef_absent_or_null {
            d.flags -= ValueFlags::UNDEF | ValueFlags::ABSENT | ValueFlags::NULL;
        } else if v_is_true {
            d.flags -= ValueFlags::BOOL_TRUE;
        } else if v_is_number_zero || v_is_false {
            // Cannot be 0, false, "", " 0.0 ", and so on.
            if matches!(d.num, Some(n) if n == 0.0) {
                d.num = None;
            }
            d.flags -= ValueFlags::NUM_ZERO | ValueFlags::BOOL_FALSE;
            if matches!(this_number_if_string_numeric, Some(n) if n == 0.0) {
                d.str = None;
            }
            remove_included_add_excluded(&mut d, "");
            remove_included_add_excluded(&mut d, "0");
        } else if v_is_number {
            // Cannot be that non-zero number, also not in string form.
            if let (Some(own), Some(other)) = (d.num, vd.num) {
                if own == other {
                    d.num = None;
                }
            }
            if let (Some(own), Some(other)) = (this_number_if_string_numeric, vd.num) {
                if own == other {
                    d.str = None;
                }
            }
            if let Some(other) = vd.num {
                remove_included_add_excluded(&mut d, &format!("{}", other));
            }
        } else if v_is_string_zero || v_is_string_empty {
            // Cannot be 0, false, or that string.
            if matches!(d.num, Some(n) if n == 0.0) {
                d.num = None;
            }
            d.flags -= ValueFlags::NUM_ZERO | ValueFlags::BOOL_FALSE;
            if self.is_maybe_single_str() && d.str == vd.str {
                d.str = None;
            }
            if let Some(s) = &vd.str {
                remove_included_add_excluded(&mut d, s);
            }
        } else {
            // A non-zero, non-empty string: remove it, also in number form.
            if self.is_maybe_single_str() && d.str == vd.str {
                d.str = None;
            }
            if let (Some(own), Some(other)) = (d.num, v_number_if_string_numeric) {
                if own == other {
                    d.num = None;
                }
            }
            if let Some(s) = &vd.str {
                remove_included_add_excluded(&mut d, s);
            }
        }
        normalize_included_excluded(&mut d);
        canonical::canonicalize(d)
    }
}
