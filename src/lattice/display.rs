//! Human-readable printing and diffing of abstract values.
//!
//! The `Display` output is a union expression over the short facet names
//! (`Undef`, `Null`, `Bool`, `UIntPos`, `IdentStr`, `PrefixStr[...]`, ...),
//! with the string part parenthesized when excluded or included string
//! refinements apply. The empty value prints as `<no value>`, unknown as
//! `?`, and polymorphic values as `^(var[absent|present])`.

use std::fmt;

use crate::lattice::flags::ValueFlags;
use crate::lattice::value::{Value, ValueData};
use crate::persistent::PersistentSet;
use crate::strings;

struct Parts {
    buffer: String,
    any: bool,
}

impl Parts {
    fn new() -> Parts {
        Parts {
            buffer: String::new(),
            any: false,
        }
    }

    fn push(&mut self, part: &str) {
        if self.any {
            self.buffer.push('|');
        }
        self.buffer.push_str(part);
        self.any = true;
    }
}

fn sorted_strings(set: &PersistentSet<String>) -> Vec<String> {
    let mut items: Vec<String> = set
        .iter()
        .map(|s| format!("\"{}\"", strings::escape(s)))
        .collect();
    items.sort();
    items
}

fn format_label_set<T: fmt::Display>(set: &PersistentSet<T>) -> String {
    let mut items: Vec<String> = set.iter().map(|l| l.to_string()).collect();
    items.sort();
    format!("{{{}}}", items.join(","))
}

fn format_data(d: &ValueData, out: &mut Parts) {
    if d.flags.contains(ValueFlags::UNKNOWN) {
        out.push("?");
        return;
    }
    if let Some(var) = &d.var {
        let mut inner = String::new();
        if d.flags.contains(ValueFlags::ABSENT) {
            inner.push_str("absent");
        }
        if d.flags
            .intersects(ValueFlags::PRESENT_DATA | ValueFlags::PRESENT_ACCESSOR)
        {
            if !inner.is_empty() {
                inner.push('|');
            }
            inner.push_str("present");
        }
        out.push(&format!("^({}[{}])", var, inner));
        return;
    }

    if d.flags.contains(ValueFlags::UNDEF) {
        out.push("Undef");
    }
    if d.flags.contains(ValueFlags::NULL) {
        out.push("Null");
    }
    if d.flags.contains(ValueFlags::BOOL) {
        out.push("Bool");
    } else if d.flags.contains(ValueFlags::BOOL_TRUE) {
        out.push("true");
    } else if d.flags.contains(ValueFlags::BOOL_FALSE) {
        out.push("false");
    }

    if d.flags.contains(ValueFlags::NUM) {
        out.push("Num");
    } else {
        if d.num.is_none()
            && d.flags.contains(ValueFlags::NUM_ZERO)
            && !d.flags.contains(ValueFlags::NUM_UINT_POS)
        {
            out.push("Zero");
        } else if !d.flags.contains(ValueFlags::NUM_ZERO)
            && d.flags.contains(ValueFlags::NUM_UINT_POS)
        {
            out.push("UIntPos");
        } else if d.flags.intersects(ValueFlags::NUM_UINT) {
            out.push("UInt");
        }
        if d.flags.contains(ValueFlags::NUM_OTHER) {
            out.push("NotUInt");
        }
        if d.flags.contains(ValueFlags::NUM_NAN) {
            out.push("NaN");
        }
        if d.flags.contains(ValueFlags::NUM_INF) {
            out.push("Inf");
        }
        if let Some(n) = d.num {
            out.push(&format!("{}", n));
        }
    }

    let string_sets = d.excluded_strings.is_some() || d.included_strings.is_some();
    if string_sets {
        if out.any {
            out.buffer.push('|');
        }
        out.buffer.push('(');
        out.any = false;
    }
    if d.flags.contains(
        ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
    ) {
        out.push("Str");
    } else {
        if d.flags.contains(ValueFlags::STR_UINT) {
            out.push("UIntStr");
        }
        if d.flags.contains(ValueFlags::STR_OTHERNUM) {
            out.push("NotUIntStr");
        }
        if d.flags.contains(ValueFlags::STR_IDENTIFIER) {
            out.push("IdentStr");
        }
        if d.flags.contains(ValueFlags::STR_OTHERIDENTIFIERPARTS) {
            out.push("OtherIdentPartsStr");
        }
        if d.flags.contains(ValueFlags::STR_OTHER) {
            out.push("OtherStr");
        }
        if d.flags.contains(ValueFlags::STR_JSON) {
            out.push("JSONStr");
        }
        if d.flags.contains(ValueFlags::STR_PREFIX) {
            let prefix = d.str.as_deref().unwrap_or_default();
            out.push(&format!("PrefixStr[{}]", strings::escape(prefix)));
        } else if let Some(s) = &d.str {
            out.push(&format!("\"{}\"", strings::escape(s)));
        }
    }
    if string_sets {
        out.buffer.push(')');
        if let Some(excluded) = &d.excluded_strings {
            out.buffer
                .push_str(&format!("\\{{{}}}", sorted_strings(excluded).join(",")));
        }
        if let Some(included) = &d.included_strings {
            out.buffer
                .push_str(&format!("{{{}}}", sorted_strings(included).join(",")));
        }
        out.any = true;
    }

    if let Some(labels) = &d.object_labels {
        out.push(&format_label_set(labels));
    }
    if let Some(getters) = &d.getters {
        out.push(&format!("getter {}", format_label_set(getters)));
    }
    if let Some(setters) = &d.setters {
        out.push(&format!("setter {}", format_label_set(setters)));
    }
    if d.flags.contains(ValueFlags::ABSENT) {
        out.push("absent");
    }
    if let Some(partitioning) = &d.free_variable_partitioning {
        if out.any {
            out.buffer.push(',');
        }
        out.buffer
            .push_str(&format!("freeVariablePartitioning={}", partitioning));
        out.any = true;
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Parts::new();
        format_data(self.data(), &mut parts);
        if !parts.any {
            parts.buffer.push_str("<no value>");
        }
        f.write_str(&parts.buffer)
    }
}

const FLAG_NAMES: &[(ValueFlags, &str)] = &[
    (ValueFlags::BOOL_TRUE, "BOOL_TRUE"),
    (ValueFlags::BOOL_FALSE, "BOOL_FALSE"),
    (ValueFlags::UNDEF, "UNDEF"),
    (ValueFlags::NULL, "NULL"),
    (ValueFlags::STR_UINT, "STR_UINT"),
    (ValueFlags::STR_OTHERNUM, "STR_OTHERNUM"),
    (ValueFlags::STR_PREFIX, "STR_PREFIX"),
    (ValueFlags::STR_IDENTIFIER, "STR_IDENTIFIER"),
    (ValueFlags::STR_OTHERIDENTIFIERPARTS, "STR_OTHERIDENTIFIERPARTS"),
    (ValueFlags::STR_OTHER, "STR_OTHER"),
    (ValueFlags::STR_JSON, "STR_JSON"),
    (ValueFlags::NUM_NAN, "NUM_NAN"),
    (ValueFlags::NUM_INF, "NUM_INF"),
    (ValueFlags::NUM_ZERO, "NUM_ZERO"),
    (ValueFlags::NUM_UINT_POS, "NUM_UINT_POS"),
    (ValueFlags::NUM_OTHER, "NUM_OTHER"),
    (ValueFlags::ATTR_DONTENUM, "ATTR_DONTENUM"),
    (ValueFlags::ATTR_NOTDONTENUM, "ATTR_NOTDONTENUM"),
    (ValueFlags::ATTR_READONLY, "ATTR_READONLY"),
    (ValueFlags::ATTR_NOTREADONLY, "ATTR_NOTREADONLY"),
    (ValueFlags::ATTR_DONTDELETE, "ATTR_DONTDELETE"),
    (ValueFlags::ATTR_NOTDONTDELETE, "ATTR_NOTDONTDELETE"),
    (ValueFlags::MODIFIED, "MODIFIED"),
    (ValueFlags::ABSENT, "ABSENT"),
    (ValueFlags::PRESENT_DATA, "PRESENT_DATA"),
    (ValueFlags::PRESENT_ACCESSOR, "PRESENT_ACCESSOR"),
    (ValueFlags::UNKNOWN, "UNKNOWN"),
    (ValueFlags::EXTENDEDSCOPE, "EXTENDEDSCOPE"),
];

impl Value {
    /// Produces a listing of the raw flag bits, for debugging.
    pub fn print_flags(&self) -> String {
        let mut parts = Parts::new();
        for (flag, name) in FLAG_NAMES {
            if self.flags().contains(*flag) {
                parts.push(name);
            }
        }
        parts.buffer
    }

    /// Produces a description of the attributes of this value, for
    /// debugging. Each attribute prints its possible polarities as `+`/`-`.
    pub fn print_attributes(&self) -> String {
        self.check_not_unknown();
        let mut out = String::new();
        let mut attr = |name: &str, maybe_set: bool, maybe_not_set: bool| {
            if maybe_set || maybe_not_set {
                out.push('(');
                out.push_str(name);
                if maybe_set {
                    out.push('+');
                }
                if maybe_not_set {
                    out.push('-');
                }
                out.push(')');
            }
        };
        attr(
            "DontDelete",
            self.flags().contains(ValueFlags::ATTR_DONTDELETE),
            self.flags().contains(ValueFlags::ATTR_NOTDONTDELETE),
        );
        attr(
            "DontEnum",
            self.flags().contains(ValueFlags::ATTR_DONTENUM),
            self.flags().contains(ValueFlags::ATTR_NOTDONTENUM),
        );
        attr(
            "ReadOnly",
            self.flags().contains(ValueFlags::ATTR_READONLY),
            self.flags().contains(ValueFlags::ATTR_NOTREADONLY),
        );
        out
    }

    /// Appends a description of the changes from the old value to this
    /// value. The old value is assumed to be less than this value.
    pub fn diff(&self, old: &Value, out: &mut String) {
        let mut d = self.data().clone();
        d.flags -= old.data().flags;
        let subtract = |mine: &Option<PersistentSet<crate::lattice::label::ObjectLabel>>,
                        theirs: &Option<PersistentSet<crate::lattice::label::ObjectLabel>>| {
            match (mine, theirs) {
                (Some(m), Some(t)) => Some(m.subtract(t)).filter(|s| !s.is_empty()),
                _ => mine.clone(),
            }
        };
        d.object_labels = subtract(&d.object_labels, &old.data().object_labels);
        d.getters = subtract(&d.getters, &old.data().getters);
        d.setters = subtract(&d.setters, &old.data().setters);
        if let (Some(mine), Some(theirs)) = (&d.excluded_strings, &old.data().excluded_strings) {
            d.excluded_strings = Some(mine.subtract(theirs)).filter(|s| !s.is_empty());
        }
        if let (Some(mine), Some(theirs)) = (&d.included_strings, &old.data().included_strings) {
            d.included_strings = Some(mine.subtract(theirs)).filter(|s| !s.is_empty());
        }
        let mut parts = Parts::new();
        format_data(&d, &mut parts);
        if !parts.any {
            parts.buffer.push_str("<no value>");
        }
        out.push_str(&parts.buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::label::{LabelKind, ObjectLabel, SourceLocation};

    #[test]
    fn test_display_simple_values() {
        assert_eq!(Value::make_none().to_string(), "<no value>");
        assert_eq!(Value::make_unknown().to_string(), "?");
        assert_eq!(Value::make_undef().to_string(), "Undef");
        assert_eq!(Value::make_null().to_string(), "Null");
        assert_eq!(Value::make_bool(true).to_string(), "true");
        assert_eq!(Value::make_any_bool().to_string(), "Bool");
        assert_eq!(Value::make_absent().to_string(), "absent");
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::make_any_num().to_string(), "Num");
        assert_eq!(Value::make_num(5.0).to_string(), "5");
        assert_eq!(Value::make_num(0.5).to_string(), "0.5");
        assert_eq!(Value::make_num_nan().to_string(), "NaN");
        assert_eq!(Value::make_num_inf().to_string(), "Inf");
        assert_eq!(Value::make_any_num_uint().to_string(), "UInt");
        assert_eq!(Value::make_any_num_uint_pos().to_string(), "UIntPos");
        assert_eq!(Value::make_num(0.0).to_string(), "0");
        assert_eq!(
            Value::make_any_num_uint().restrict_to_not_num_zero().to_string(),
            "UIntPos"
        );
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Value::make_any_str().to_string(), "Str");
        assert_eq!(Value::make_str("hi").to_string(), "\"hi\"");
        assert_eq!(Value::make_any_str_uint().to_string(), "UIntStr");
        assert_eq!(Value::make_any_str_ident().to_string(), "IdentStr");
        assert_eq!(Value::make_json_str().to_string(), "JSONStr");

        let prefix = Value::make_str("ab1")
            .join(&Value::make_str("ab2"))
            .forget_excluded_included_strings();
        assert_eq!(prefix.to_string(), "PrefixStr[ab]");
    }

    #[test]
    fn test_display_union_and_sets() {
        let v = Value::make_undef().join(&Value::make_num(2.0));
        assert_eq!(v.to_string(), "Undef|2");

        let included = Value::make_strings(["ax", "ay"]);
        assert_eq!(
            included.to_string(),
            "(PrefixStr[a]){\"ax\",\"ay\"}"
        );

        let excluded = Value::make_any_str_excluding(["no"]);
        assert_eq!(excluded.to_string(), "(Str)\\{\"no\"}");
    }

    #[test]
    fn test_display_objects_and_accessors() {
        let label = ObjectLabel::new(LabelKind::Array, SourceLocation::new("v.ps", 3, 9));
        let v = Value::make_object(label.clone());
        assert_eq!(v.to_string(), "{Array@v.ps:3:9}");
        assert_eq!(v.make_getter().to_string(), "getter {Array@v.ps:3:9}");
    }

    #[test]
    fn test_display_polymorphic() {
        use crate::lattice::property::{ObjectProperty, PKey, PropertyRef};
        let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("v.ps", 1, 1));
        let poly = Value::make_undef().join_absent().make_polymorphic(ObjectProperty::new(
            label,
            PropertyRef::Ordinary(PKey::string("p")),
        ));
        let text = poly.to_string();
        assert!(text.starts_with("^("));
        assert!(text.contains("absent|present"));
    }

    #[test]
    fn test_print_flags() {
        let v = Value::make_bool(true).join(&Value::make_null());
        let flags = v.print_flags();
        assert!(flags.contains("BOOL_TRUE"));
        assert!(flags.contains("NULL"));
        assert!(!flags.contains("BOOL_FALSE"));
    }

    #[test]
    fn test_print_attributes() {
        let v = Value::make_str("x").set_attributes(true, false, false);
        let text = v.print_attributes();
        assert!(text.contains("(DontDelete-)"));
        assert!(text.contains("(DontEnum+)"));
        assert!(text.contains("(ReadOnly-)"));
    }

    #[test]
    fn test_diff_subtracts_old() {
        let old = Value::make_undef();
        let new = old.join(&Value::make_null());
        let mut out = String::new();
        new.diff(&old, &mut out);
        assert_eq!(out, "Null");

        let mut same = String::new();
        old.diff(&old, &mut same);
        assert_eq!(same, "<no value>");
    }
}
