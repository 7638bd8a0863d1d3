//! Restriction operators.
//!
//! These implement the analyzer's type-narrowing transfers: each returns a
//! value that is less than or equal to the receiver in the lattice order,
//! keeping only the facets the restriction allows.

use crate::canonical;
use crate::lattice::flags::ValueFlags;
use crate::lattice::join::included_categories;
use crate::lattice::label::LabelKind;
use crate::lattice::value::{Value, ValueData};
use crate::options;
use crate::persistent::PersistentSet;
use crate::strings;

/// Strings covered by the other-numeric string category.
fn is_str_other_num(s: &str) -> bool {
    strings::is_numeric(s) && !strings::is_array_index(s)
}

/// Checks whether the payload's string flags cover the given string,
/// ignoring the included/excluded refinements.
pub(crate) fn data_maybe_str_ignoring_sets(d: &ValueData, s: &str) -> bool {
    if d.flags.contains(ValueFlags::STR_JSON) {
        return true;
    }
    if let Some(own) = &d.str {
        return if d.flags.contains(ValueFlags::STR_PREFIX) {
            s.starts_with(own.as_str())
        } else {
            s == own
        };
    }
    if strings::is_array_index(s) {
        d.flags.contains(ValueFlags::STR_UINT)
    } else if s == "Infinity" || s == "NaN" {
        d.flags
            .intersects(ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIER)
    } else if strings::is_numeric(s) {
        d.flags.contains(ValueFlags::STR_OTHERNUM)
    } else if strings::is_identifier(s) {
        d.flags.contains(ValueFlags::STR_IDENTIFIER)
    } else if strings::is_identifier_parts(s) {
        d.flags.contains(ValueFlags::STR_OTHERIDENTIFIERPARTS)
    } else {
        d.flags.contains(ValueFlags::STR_OTHER)
    }
}

/// Re-establishes the included/excluded representation invariants after a
/// string restriction: an empty inclusion clears the string facet, a
/// singleton inclusion becomes an ordinary single string, a surviving
/// inclusion re-derives its category bits, and exclusions not covered by
/// the remaining flags are dropped.
pub(crate) fn normalize_included_excluded(d: &mut ValueData) {
    if let Some(inc) = d.included_strings.clone() {
        if inc.is_empty() {
            // An exhausted enumeration means no strings at all.
            d.included_strings = None;
            d.excluded_strings = None;
            d.flags -= ValueFlags::STR;
            d.str = None;
        } else if inc.size() == 1 {
            d.included_strings = None;
            d.excluded_strings = None;
            d.flags -= ValueFlags::STR;
            d.str = inc.iter().next().cloned();
        } else if !d.flags.contains(ValueFlags::STR_PREFIX) {
            d.flags = (d.flags - ValueFlags::STR) | included_categories(&inc);
            d.excluded_strings = None;
            d.str = None;
        }
        // A prefix with two or more included strings keeps its prefix
        // representation.
    }
    if let Some(exc) = d.excluded_strings.clone() {
        let mut retained = exc;
        if !d.flags.contains(ValueFlags::STR_PREFIX) {
            if let Some(s) = d.str.clone() {
                if retained.contains(&s) {
                    retained = retained.remove(&s);
                    d.str = None;
                }
            }
        }
        let retained = retained.remove_if(|s| !data_maybe_str_ignoring_sets(d, s));
        d.excluded_strings = if retained.is_empty() {
            None
        } else {
            Some(retained)
        };
    }
}

impl Value {
    // === Absence and accessors ================================================

    /// Constructs a value as a copy of this value but definitely not absent.
    pub fn restrict_to_not_absent(&self) -> Value {
        self.check_not_unknown();
        if self.is_not_absent() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::ABSENT;
            if d.var.is_some()
                && !d
                    .flags
                    .intersects(ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR)
            {
                d.var = None;
            }
        })
    }

    /// Constructs a value as a copy of this value but only with
    /// getter/setter values.
    pub fn restrict_to_getter_setter(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_primitive() && !self.is_maybe_object_or_symbol() {
            return self.clone();
        }
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE;
            d.num = None;
            d.str = None;
            d.object_labels = None;
            d.excluded_strings = None;
            d.included_strings = None;
        })
    }

    /// Constructs a value holding only the getters of this value.
    pub fn restrict_to_getter(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        match &self.data().getters {
            None => Value::make_none(),
            Some(getters) => {
                let mut data = ValueData::none();
                data.getters = Some(getters.clone());
                data.free_variable_partitioning = self.data().free_variable_partitioning.clone();
                canonical::canonicalize(data)
            }
        }
    }

    /// Constructs a value holding only the setters of this value.
    pub fn restrict_to_setter(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        match &self.data().setters {
            None => Value::make_none(),
            Some(setters) => {
                let mut data = ValueData::none();
                data.setters = Some(setters.clone());
                data.free_variable_partitioning = self.data().free_variable_partitioning.clone();
                canonical::canonicalize(data)
            }
        }
    }

    /// Constructs a value as a copy of this value but definitely not a
    /// getter or setter.
    pub fn restrict_to_not_getter_setter(&self) -> Value {
        self.check_not_unknown();
        if self.data().getters.is_none() && self.data().setters.is_none() {
            return self.clone();
        }
        self.modified(|d| {
            d.getters = None;
            d.setters = None;
        })
    }

    pub fn restrict_to_not_getter(&self) -> Value {
        self.check_not_unknown();
        if self.data().getters.is_none() {
            return self.clone();
        }
        self.modified(|d| d.getters = None)
    }

    pub fn restrict_to_not_setter(&self) -> Value {
        self.check_not_unknown();
        if self.data().setters.is_none() {
            return self.clone();
        }
        self.modified(|d| d.setters = None)
    }

    // === Undef and null =======================================================

    pub fn restrict_to_not_undef(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_not_undef() {
            return self.clone();
        }
        self.modified(|d| d.flags -= ValueFlags::UNDEF)
    }

    pub fn restrict_to_undef(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_not_undef() {
            Value::make_none()
        } else {
            Value::make_undef()
        }
    }

    pub fn restrict_to_not_null(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_not_null() {
            return self.clone();
        }
        self.modified(|d| d.flags -= ValueFlags::NULL)
    }

    pub fn restrict_to_null(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_not_null() {
            Value::make_none()
        } else {
            Value::make_null()
        }
    }

    /// Constructs a value as a copy of this value but definitely not null
    /// nor undefined.
    pub fn restrict_to_not_null_not_undef(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_null() && !self.is_maybe_undef() {
            return self.clone();
        }
        self.modified(|d| d.flags -= ValueFlags::NULL | ValueFlags::UNDEF)
    }

    // === Booleans =============================================================

    /// Constructs a value from this value where only the boolean facet is
    /// considered.
    pub fn restrict_to_bool(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if self.is_maybe_any_bool() {
            Value::make_any_bool()
        } else if self.is_maybe_true_but_not_false() {
            Value::make_bool(true)
        } else if self.is_maybe_false_but_not_true() {
            Value::make_bool(false)
        } else {
            Value::make_none()
        }
    }

    pub fn restrict_to_not_bool(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| d.flags -= ValueFlags::BOOL)
    }

    // === Truthiness ===========================================================

    /// Constructs a value as a copy of this value but definitely not falsy.
    /// Absent is treated as falsy.
    pub fn restrict_to_truthy(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let was_fuzzy_str = self.is_maybe_fuzzy_str();
        let r = self.modified(|d| {
            if !d.flags.contains(ValueFlags::STR_PREFIX)
                && matches!(&d.str, Some(s) if s.is_empty())
            {
                d.str = None;
            }
            if matches!(d.num, Some(n) if n == 0.0) {
                d.num = None;
            }
            d.flags -= ValueFlags::BOOL_FALSE
                | ValueFlags::NULL
                | ValueFlags::UNDEF
                | ValueFlags::NUM_NAN
                | ValueFlags::NUM_ZERO
                | ValueFlags::ABSENT;
        });
        if was_fuzzy_str {
            r.restrict_to_not_strings([""])
        } else {
            r
        }
    }

    /// Constructs a value as a copy of this value but definitely not truthy.
    /// Absent is treated as not truthy.
    pub fn restrict_to_falsy(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let keep_empty_str = self.is_maybe_str("");
        self.modified(|d| {
            d.str = if keep_empty_str {
                Some(String::new())
            } else {
                None
            };
            if matches!(d.num, Some(n) if n != 0.0) {
                d.num = None;
            }
            d.flags -= ValueFlags::BOOL_TRUE
                | ValueFlags::STR
                | (ValueFlags::NUM - (ValueFlags::NUM_ZERO | ValueFlags::NUM_NAN));
            d.object_labels = None;
            d.getters = None;
            d.setters = None;
            d.excluded_strings = None;
            d.included_strings = None;
        })
    }

    // === Numbers ==============================================================

    /// Constructs a value from this value where only the string, boolean,
    /// and number facets are considered.
    pub fn restrict_to_str_bool_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let mut data = ValueData::none();
        data.flags = self.flags() & (ValueFlags::STR | ValueFlags::BOOL | ValueFlags::NUM);
        data.num = self.data().num;
        data.str = self.data().str.clone();
        data.excluded_strings = self.data().excluded_strings.clone();
        data.included_strings = self.data().included_strings.clone();
        data.free_variable_partitioning = self.data().free_variable_partitioning.clone();
        canonical::canonicalize(data)
    }

    /// Constructs a value from this value where only the number facet is
    /// considered.
    pub fn restrict_to_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let mut data = ValueData::none();
        data.flags = self.flags() & ValueFlags::NUM;
        data.num = self.data().num;
        canonical::canonicalize(data)
    }

    pub fn restrict_to_not_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::NUM;
            d.num = None;
        })
    }

    pub fn restrict_to_not_nan(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_nan() {
            return self.clone();
        }
        self.modified(|d| d.flags -= ValueFlags::NUM_NAN)
    }

    pub fn restrict_to_not_inf(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_inf() {
            return self.clone();
        }
        self.modified(|d| d.flags -= ValueFlags::NUM_INF)
    }

    pub fn restrict_to_not_num_zero(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_zero() {
            return self.clone();
        }
        self.modified(|d| {
            if matches!(d.num, Some(n) if n == 0.0) {
                d.num = None;
            }
            d.flags -= ValueFlags::NUM_ZERO;
        })
    }

    pub fn restrict_to_not_num_uint(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| d.flags -= ValueFlags::NUM_UINT)
    }

    pub fn restrict_to_not_num_other(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| d.flags -= ValueFlags::NUM_OTHER)
    }

    // === Strings ==============================================================

    /// Constructs a value from this value where only the string facet is
    /// considered.
    pub fn restrict_to_str(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let mut data = ValueData::none();
        data.flags = self.flags() & ValueFlags::STR;
        data.str = self.data().str.clone();
        data.excluded_strings = self.data().excluded_strings.clone();
        data.included_strings = self.data().included_strings.clone();
        canonical::canonicalize(data)
    }

    /// Constructs a value from this value where only the numeric strings
    /// are considered.
    pub fn restrict_to_str_numeric(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let sd = self.data();
        let mut data = ValueData::none();
        data.flags = sd.flags & (ValueFlags::STR_OTHERNUM | ValueFlags::STR_UINT);
        if let Some(included) = &sd.included_strings {
            data.included_strings = Some(included.remove_if(|s| !strings::is_numeric(s)));
        }
        if self.is_maybe_str_prefix() {
            if let Some(prefix) = &sd.str {
                if strings::is_numeric(prefix) {
                    data.flags |= ValueFlags::STR_PREFIX;
                    data.str = Some(prefix.clone());
                }
            }
        } else if matches!(&sd.str, Some(s) if strings::is_numeric(s)) {
            data.str = sd.str.clone();
        }
        normalize_included_excluded(&mut data);
        canonical::canonicalize(data)
    }

    /// Constructs a value from this value where only the non-numeric
    /// strings are considered.
    pub fn restrict_to_str_not_numeric(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let sd = self.data();
        let mut data = ValueData::none();
        data.flags = (sd.flags & ValueFlags::STR)
            - (ValueFlags::STR_OTHERNUM | ValueFlags::STR_UINT | ValueFlags::STR_PREFIX);
        if let Some(included) = &sd.included_strings {
            data.included_strings = Some(included.remove_if(|s| strings::is_numeric(s)));
        }
        if self.is_maybe_str_prefix() {
            data.flags |= ValueFlags::STR_PREFIX;
            data.str = sd.str.clone();
        } else if matches!(&sd.str, Some(s) if !strings::is_numeric(s)) {
            data.str = sd.str.clone();
        }
        normalize_included_excluded(&mut data);
        canonical::canonicalize(data)
    }

    pub fn restrict_to_not_str(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::STR;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
        })
    }

    pub fn restrict_to_not_str_identifier_parts(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::STR_IDENTIFIERPARTS;
            if let Some(exc) = &d.excluded_strings {
                let kept = exc.remove_if(|s| strings::is_identifier_parts(s));
                d.excluded_strings = if kept.is_empty() { None } else { Some(kept) };
            }
            if let Some(inc) = &d.included_strings {
                d.included_strings = Some(inc.remove_if(|s| strings::is_identifier_parts(s)));
            }
            normalize_included_excluded(d);
        })
    }

    pub fn restrict_to_not_str_uint(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::STR_UINT;
            if let Some(exc) = &d.excluded_strings {
                let kept = exc.remove_if(|s| strings::is_array_index(s));
                d.excluded_strings = if kept.is_empty() { None } else { Some(kept) };
            }
            if let Some(inc) = &d.included_strings {
                d.included_strings = Some(inc.remove_if(|s| strings::is_array_index(s)));
            }
            normalize_included_excluded(d);
        })
    }

    pub fn restrict_to_not_str_other_num(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            d.flags -= ValueFlags::STR_OTHERNUM;
            if let Some(exc) = &d.excluded_strings {
                let kept = exc.remove_if(|s| is_str_other_num(s));
                d.excluded_strings = if kept.is_empty() { None } else { Some(kept) };
            }
            if let Some(inc) = &d.included_strings {
                d.included_strings = Some(inc.remove_if(|s| is_str_other_num(s)));
            }
            normalize_included_excluded(d);
        })
    }

    pub fn restrict_to_not_str_prefix(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        self.modified(|d| {
            if d.flags.contains(ValueFlags::STR_PREFIX) {
                d.str = None;
            }
            d.flags -= ValueFlags::STR_PREFIX;
            d.excluded_strings = None;
            if !d.flags.intersects(ValueFlags::STR) {
                d.included_strings = None;
            }
        })
    }

    /// Constructs a value as a copy of this value that cannot be any of the
    /// given strings. A no-op when string sets are disabled.
    pub fn restrict_to_not_strings<I>(&self, strings_iter: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.check_not_polymorphic_or_unknown();
        if options::get().no_string_sets || self.is_not_str() {
            return self.clone();
        }
        let relevant: Vec<String> = strings_iter
            .into_iter()
            .map(Into::into)
            .filter(|s| self.is_maybe_str(s))
            .collect();
        if relevant.is_empty() {
            return self.clone();
        }
        let sd = self.data();
        if sd.str.is_some() && !self.is_maybe_str_prefix() {
            // A single string: drop it if it is among the removed ones.
            if relevant.iter().any(|s| Some(s) == sd.str.as_ref()) {
                return self.modified(|d| d.str = None);
            }
            return self.clone();
        }
        if sd.included_strings.is_some() {
            return self.modified(|d| {
                if let Some(inc) = &d.included_strings {
                    let removed: PersistentSet<String> = relevant.iter().cloned().collect();
                    d.included_strings = Some(inc.subtract(&removed));
                }
                normalize_included_excluded(d);
            });
        }
        self.modified(|d| {
            let mut excluded = d.excluded_strings.clone().unwrap_or_default();
            excluded = excluded.add_all(relevant.iter().cloned());
            d.excluded_strings = Some(excluded);
        })
    }

    // === Objects, symbols, functions ==========================================

    /// Constructs a value as a copy of this value but definitely not a
    /// symbol. Polymorphic and 'unknown' values are returned unmodified.
    pub fn restrict_to_not_symbol(&self) -> Value {
        let Some(labels) = &self.data().object_labels else {
            return self.clone();
        };
        let remaining = labels.remove_if(|l| l.kind() == LabelKind::Symbol);
        if remaining.size() == labels.size() {
            return self.clone();
        }
        self.modified(|d| {
            d.object_labels = if remaining.is_empty() {
                None
            } else {
                Some(remaining)
            };
        })
    }

    /// Constructs a value as a copy of this value but definitely a symbol.
    pub fn restrict_to_symbol(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let symbols = self
            .data()
            .object_labels
            .as_ref()
            .map(|labels| labels.remove_if(|l| l.kind() != LabelKind::Symbol))
            .filter(|s| !s.is_empty());
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE;
            d.num = None;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
            d.getters = None;
            d.setters = None;
            d.object_labels = symbols;
        })
    }

    /// Constructs a value as a copy of this value but only with non-symbol
    /// object values.
    pub fn restrict_to_non_symbol_object(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        if !self.is_maybe_primitive_or_symbol() && !self.is_maybe_getter_or_setter() {
            return self.clone();
        }
        let objects = self
            .data()
            .object_labels
            .as_ref()
            .map(|labels| labels.remove_if(|l| l.kind() == LabelKind::Symbol))
            .filter(|s| !s.is_empty());
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE;
            d.num = None;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
            d.getters = None;
            d.setters = None;
            d.object_labels = objects;
        })
    }

    /// Constructs a value as a copy of this value but only with values of
    /// typeof "object": objects except functions and symbols, plus null.
    pub fn restrict_to_typeof_object(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let objects = self
            .data()
            .object_labels
            .as_ref()
            .map(|labels| {
                labels.remove_if(|l| {
                    l.kind() == LabelKind::Function || l.kind() == LabelKind::Symbol
                })
            })
            .filter(|s| !s.is_empty());
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE - ValueFlags::NULL;
            d.num = None;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
            d.getters = None;
            d.setters = None;
            d.object_labels = objects;
        })
    }

    /// Constructs a value as a copy of this value but without the values of
    /// typeof "object": null goes away, functions and symbols stay.
    pub fn restrict_to_not_typeof_object(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let objects = self
            .data()
            .object_labels
            .as_ref()
            .map(|labels| {
                labels.remove_if(|l| {
                    l.kind() != LabelKind::Function && l.kind() != LabelKind::Symbol
                })
            })
            .filter(|s| !s.is_empty());
        self.modified(|d| {
            d.flags -= ValueFlags::NULL;
            d.object_labels = objects;
        })
    }

    /// Constructs a value as a copy of this value but only with functions.
    pub fn restrict_to_function(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let functions = self
            .data()
            .object_labels
            .as_ref()
            .map(|labels| labels.remove_if(|l| l.kind() != LabelKind::Function))
            .filter(|s| !s.is_empty());
        self.modified(|d| {
            d.flags -= ValueFlags::PRIMITIVE;
            d.num = None;
            d.str = None;
            d.excluded_strings = None;
            d.included_strings = None;
            d.getters = None;
            d.setters = None;
            d.object_labels = functions;
        })
    }

    /// Constructs a value as a copy of this value but only with
    /// non-functions.
    pub fn restrict_to_not_function(&self) -> Value {
        self.check_not_polymorphic_or_unknown();
        let Some(labels) = &self.data().object_labels else {
            return self.clone();
        };
        let remaining = labels.remove_if(|l| l.kind() == LabelKind::Function);
        if remaining.size() == labels.size() {
            return self.clone();
        }
        self.modified(|d| {
            d.object_labels = if remaining.is_empty() {
                None
            } else {
                Some(remaining)
            };
        })
    }

    /// Constructs a value as a copy of this value but only with non-object
    /// values. Symbols are not objects. Unknown and polymorphic values are
    /// returned unmodified.
    pub fn restrict_to_not_object(&self) -> Value {
        let Some(labels) = &self.data().object_labels else {
            return self.clone();
        };
        let remaining = labels.remove_if(|l| l.kind() != LabelKind::Symbol);
        if remaining.size() == labels.size() {
            return self.clone();
        }
        self.modified(|d| {
            d.object_labels = if remaining.is_empty() {
                None
            } else {
                Some(remaining)
            };
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::label::{ObjectLabel, SourceLocation};

    fn label(kind: LabelKind, line: u32) -> ObjectLabel {
        ObjectLabel::new(kind, SourceLocation::new("t.ps", line, 1))
    }

    fn mixed() -> Value {
        Value::make_str("s")
            .join(&Value::make_num(1.5))
            .join(&Value::make_bool(true))
            .join(&Value::make_null())
            .join(&Value::make_undef())
            .join(&Value::make_object(label(LabelKind::Object, 1)))
            .join(&Value::make_object(label(LabelKind::Function, 2)))
            .join(&Value::make_symbol(label(LabelKind::Symbol, 3)))
    }

    #[test]
    fn test_restrict_to_num_and_str_partition() {
        let v = mixed();
        let num = v.restrict_to_num();
        assert!(num.is_maybe_num(1.5));
        assert!(!num.is_maybe_other_than_num());

        let s = v.restrict_to_str();
        assert!(s.is_maybe_str("s"));
        assert!(!s.is_maybe_other_than_str());
    }

    #[test]
    fn test_restrict_complements_rejoin() {
        let v = mixed();
        for (a, b) in [
            (v.restrict_to_num(), v.restrict_to_not_num()),
            (v.restrict_to_str(), v.restrict_to_not_str()),
            (v.restrict_to_bool(), v.restrict_to_not_bool()),
        ] {
            assert_eq!(a.join(&b), v);
        }
    }

    #[test]
    fn test_restrict_to_truthy_and_falsy() {
        let v = Value::make_bool(true)
            .join_bool(false)
            .join(&Value::make_str(""));
        let truthy = v.restrict_to_truthy();
        assert_eq!(truthy, Value::make_bool(true));

        let falsy = v.restrict_to_falsy();
        assert!(falsy.is_maybe_false());
        assert!(!falsy.is_maybe_true());
        assert!(falsy.is_maybe_str(""));
    }

    #[test]
    fn test_restrict_to_truthy_drops_zero_nan_empty() {
        let v = Value::make_num(0.0)
            .join(&Value::make_num_nan())
            .join(&Value::make_num(3.0))
            .join(&Value::make_null())
            .join(&Value::make_undef());
        let t = v.restrict_to_truthy();
        assert!(!t.is_maybe_zero());
        assert!(!t.is_maybe_nan());
        assert!(t.is_maybe_num(3.0));
        assert!(t.is_not_null());
        assert!(t.is_not_undef());
    }

    #[test]
    fn test_restrict_truthy_fuzzy_string_excludes_empty() {
        let t = Value::make_any_str().restrict_to_truthy();
        assert!(!t.is_maybe_str(""));
        assert!(t.is_maybe_str("x"));
    }

    #[test]
    fn test_restrict_to_function_partition() {
        let v = mixed();
        let f = v.restrict_to_function();
        assert!(f.is_maybe_object());
        assert!(f.get_object_labels().iter().all(|l| l.kind() == LabelKind::Function));
        assert!(!f.is_maybe_primitive());

        let nf = v.restrict_to_not_function();
        assert!(nf
            .get_object_labels()
            .iter()
            .all(|l| l.kind() != LabelKind::Function));
        assert_eq!(f.join(&nf), v);
    }

    #[test]
    fn test_restrict_to_symbol_partition() {
        let v = mixed();
        let sym = v.restrict_to_symbol();
        assert!(sym.is_maybe_symbol());
        assert!(!sym.is_maybe_object());
        assert!(!sym.is_maybe_primitive());

        let nosym = v.restrict_to_not_symbol();
        assert!(!nosym.is_maybe_symbol());
        assert_eq!(sym.join(&nosym), v);
    }

    #[test]
    fn test_restrict_to_typeof_object() {
        let v = mixed();
        let o = v.restrict_to_typeof_object();
        assert!(o.is_maybe_null(), "null has typeof object");
        assert!(!o.is_maybe_undef());
        assert!(o
            .get_object_labels()
            .iter()
            .all(|l| l.kind() != LabelKind::Function && l.kind() != LabelKind::Symbol));

        let no = v.restrict_to_not_typeof_object();
        assert!(no.is_not_null());
        assert!(no.is_maybe_undef());
        assert!(no.is_maybe_num(1.5));
        assert_eq!(o.join(&no), v);
    }

    #[test]
    fn test_restrict_to_getter_setter() {
        let g = Value::make_object(label(LabelKind::Function, 7)).make_getter();
        let v = Value::make_num(2.0).join_getters_setters(&g);
        let only_accessors = v.restrict_to_getter_setter();
        assert!(only_accessors.is_maybe_getter());
        assert!(!only_accessors.is_maybe_primitive());

        let only_getter = v.restrict_to_getter();
        assert_eq!(only_getter.get_getters().size(), 1);
        assert!(only_getter.restrict_to_setter().is_none());

        let cleaned = v.restrict_to_not_getter_setter();
        assert!(!cleaned.is_maybe_getter_or_setter());
        assert!(cleaned.is_maybe_num(2.0));
    }

    #[test]
    fn test_restrict_to_not_strings_single() {
        let v = Value::make_str("kill").join(&Value::make_num(1.0));
        let r = v.restrict_to_not_strings(["kill"]);
        assert!(r.is_not_str());
        assert!(r.is_maybe_num(1.0));
    }

    #[test]
    fn test_restrict_to_not_strings_included() {
        let v = Value::make_strings(["a", "b", "c"]);
        let r = v.restrict_to_not_strings(["a"]);
        assert!(!r.is_maybe_str("a"));
        assert!(r.is_maybe_str("b"));
        assert!(r.is_maybe_str("c"));

        // Removing down to one included string collapses to a single string.
        let r2 = v.restrict_to_not_strings(["a", "b"]);
        assert!(r2.is_maybe_single_str());
        assert_eq!(r2.get_str(), "c");
    }

    #[test]
    fn test_restrict_to_not_strings_fuzzy_excludes() {
        let v = Value::make_any_str();
        let r = v.restrict_to_not_strings(["secret"]);
        assert!(!r.is_maybe_str("secret"));
        assert!(r.is_maybe_str("public"));
    }

    #[test]
    fn test_restrict_to_str_numeric_partition() {
        let v = Value::make_any_str();
        let numeric = v.restrict_to_str_numeric();
        assert!(numeric.is_maybe_str("42"));
        assert!(numeric.is_maybe_str("3.5"));
        assert!(!numeric.is_maybe_str("foo"));

        let non = v.restrict_to_str_not_numeric();
        assert!(non.is_maybe_str("foo"));
        assert!(!non.is_maybe_str("42"));
    }

    #[test]
    fn test_restrict_to_str_numeric_single() {
        assert_eq!(
            Value::make_str("17").restrict_to_str_numeric(),
            Value::make_str("17")
        );
        assert!(Value::make_str("foo").restrict_to_str_numeric().is_none());
        assert_eq!(
            Value::make_str("foo").restrict_to_str_not_numeric(),
            Value::make_str("foo")
        );
    }

    #[test]
    fn test_restrict_to_not_str_uint() {
        let v = Value::make_any_str_numeric();
        let r = v.restrict_to_not_str_uint();
        assert!(!r.is_maybe_str_uint());
        assert!(r.is_maybe_str("1.5"));
        assert!(!r.is_maybe_str("7"));
    }

    #[test]
    fn test_restrict_to_not_str_prefix() {
        let v = Value::make_str("pre_a").join(&Value::make_str("pre_b"));
        assert!(v.is_maybe_str_prefix());
        let r = v.restrict_to_not_str_prefix();
        assert!(!r.is_maybe_str_prefix());
    }

    #[test]
    fn test_restrict_to_str_bool_num() {
        let v = mixed().join_absent();
        let r = v.restrict_to_str_bool_num();
        assert!(r.is_maybe_str("s"));
        assert!(r.is_maybe_num(1.5));
        assert!(r.is_maybe_true());
        assert!(r.is_not_null());
        assert!(r.is_not_undef());
        assert!(!r.is_maybe_object_or_symbol());
        assert!(!r.is_maybe_absent());
    }

    #[test]
    fn test_restrict_to_not_absent() {
        let v = Value::make_num(1.0).join_absent();
        let r = v.restrict_to_not_absent();
        assert!(!r.is_maybe_absent());
        assert!(r.is_maybe_num(1.0));
    }

    #[test]
    fn test_restrict_to_undef_null() {
        let v = mixed();
        assert_eq!(v.restrict_to_undef(), Value::make_undef());
        assert_eq!(v.restrict_to_null(), Value::make_null());
        assert!(Value::make_num(1.0).restrict_to_undef().is_none());

        let r = v.restrict_to_not_null_not_undef();
        assert!(r.is_not_null());
        assert!(r.is_not_undef());
        assert!(r.is_maybe_num(1.5));
    }
}
