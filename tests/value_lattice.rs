//! End-to-end tests of the value lattice: concrete scenarios exercising
//! join, widening, and the restriction operators together.

use protoscript_lattice::{
    LabelKind, ObjectLabel, PKey, PersistentSet, SourceLocation, Summarized, Value,
};

#[test]
fn join_of_two_identifier_strings_records_both() {
    let j = Value::make_str("foo").join(&Value::make_str("bar"));

    let included = j.get_included_strings().expect("string set recorded");
    assert_eq!(included.size(), 2);
    assert!(included.contains(&"foo".to_string()));
    assert!(included.contains(&"bar".to_string()));

    assert!(j.is_maybe_str_identifier());
    assert!(!j.is_maybe_str_prefix());
    assert!(!j.is_maybe_str_uint());

    assert!(j.is_maybe_str("foo"));
    assert!(j.is_maybe_str("bar"));
    assert!(!j.is_maybe_str("baz"));
}

#[test]
fn join_of_strings_with_shared_prefix() {
    let j = Value::make_str("file_a").join(&Value::make_str("file_b"));

    assert!(j.is_maybe_str_prefix());
    assert_eq!(j.get_prefix(), "file_");
    let included = j.get_included_strings().expect("string set recorded");
    assert_eq!(included.size(), 2);

    assert!(j.is_maybe_str("file_a"));
    assert!(!j.is_maybe_str("file_c"));
}

#[test]
fn truthy_restriction_of_booleans_and_empty_string() {
    let v = Value::make_bool(true)
        .join(&Value::make_bool(false))
        .join(&Value::make_str(""));
    assert_eq!(v.restrict_to_truthy(), Value::make_bool(true));
}

#[test]
fn strict_equals_narrows_any_number_to_the_constant() {
    let r = Value::make_any_num().restrict_to_strict_equals(&Value::make_num(5.0));
    assert_eq!(r, Value::make_num(5.0));
}

#[test]
fn loose_equals_keeps_zero_against_empty_string() {
    let r = Value::make_num(0.0).restrict_to_loose_equals(&Value::make_str(""));
    assert_eq!(r, Value::make_num(0.0));
}

#[test]
fn join_of_many_numbers_relaxes_to_uint_pos() {
    let j = Value::join_all((1..=32).map(|k| Value::make_num(k as f64)));

    assert!(!j.is_maybe_single_num());
    assert!(j.is_maybe_num_uint_pos());
    assert!(!j.is_maybe_zero());
    assert!(!j.is_maybe_nan());
    for k in 1..=32 {
        assert!(j.is_maybe_num(k as f64), "{} must stay possible", k);
    }
}

#[test]
fn join_laws_on_assorted_values() {
    let samples = sample_values();
    for a in &samples {
        assert_eq!(a.join(&Value::make_none()), *a, "none is the identity");
        assert_eq!(a.join(a), *a, "join is idempotent");
        for b in &samples {
            assert_eq!(a.join(b), b.join(a), "join is commutative: {} vs {}", a, b);
            let j = a.join(b);
            assert_eq!(a.join(&j), j, "join is monotone in {} vs {}", a, b);
            assert_eq!(b.join(&j), j, "join is monotone in {} vs {}", b, a);
        }
    }
}

#[test]
fn join_is_associative_on_assorted_values() {
    let samples = sample_values();
    for a in &samples {
        for b in &samples {
            for c in &samples {
                let left = a.join(b).join(c);
                let right = a.join(&b.join(c));
                assert_eq!(left, right, "({}|{})|{} differs from the right fold", a, b, c);
            }
        }
    }
}

#[test]
fn restriction_complements_recover_the_value() {
    for v in sample_values() {
        let pairs = [
            (v.restrict_to_num(), v.restrict_to_not_num()),
            (v.restrict_to_str(), v.restrict_to_not_str()),
            (v.restrict_to_bool(), v.restrict_to_not_bool()),
            (v.restrict_to_undef(), v.restrict_to_not_undef()),
            (v.restrict_to_null(), v.restrict_to_not_null()),
            (v.restrict_to_function(), v.restrict_to_not_function()),
            (v.restrict_to_symbol(), v.restrict_to_not_symbol()),
        ];
        for (inside, outside) in pairs {
            assert_eq!(inside.join(&outside), v, "complements must rejoin {}", v);
            // Each restriction stays below the value.
            assert_eq!(inside.join(&v), v);
            assert_eq!(outside.join(&v), v);
        }

        let absent_part = if v.is_maybe_absent() {
            Value::make_absent()
        } else {
            Value::make_none()
        };
        assert_eq!(v.restrict_to_not_absent().join(&absent_part), v);
    }
}

#[test]
fn strict_equals_stays_below_both_sides() {
    let singletons = [
        Value::make_num(5.0),
        Value::make_str("foo"),
        Value::make_bool(true),
        Value::make_null(),
        Value::make_undef(),
    ];
    for v in sample_values() {
        for w in &singletons {
            let r = v.restrict_to_strict_equals(w);
            assert_eq!(r.join(&v), v, "result must be below {}", v);
            // Absent counts as undefined under strict equality, and JSON
            // strings are kept as a sound approximation, so both may
            // survive the comparison.
            if !v.is_maybe_absent() && !v.is_maybe_str_json() {
                assert_eq!(r.join(w), *w, "result must be below {}", w);
            }
        }
    }
}

#[test]
fn summarize_collapses_singletons_across_facets() {
    let site = SourceLocation::new("m.ps", 12, 4);
    let obj = ObjectLabel::new(LabelKind::Object, site.clone());
    let getter_fn = ObjectLabel::new(LabelKind::Function, SourceLocation::new("m.ps", 13, 4));

    let v = Value::make_object(obj.clone())
        .join(&Value::make_object(getter_fn.clone()).make_getter());
    let summarized = Summarized::new(
        PersistentSet::singleton(obj.clone()).add(getter_fn.clone()),
        PersistentSet::singleton(obj.clone()).add(getter_fn.clone()),
    );
    let r = v.summarize(&summarized);
    assert!(r.contains_object_label(&obj.summary()));
    assert!(!r.contains_object_label(&obj));
    assert!(r.get_getters().contains(&getter_fn.summary()));
}

#[test]
fn strings_and_symbols_from_property_keys() {
    let sym = ObjectLabel::new(LabelKind::Symbol, SourceLocation::new("m.ps", 1, 1));
    let keys = [
        PKey::string("length"),
        PKey::string("push"),
        PKey::symbol(sym.clone()),
    ];
    let v = Value::make_strings_and_symbols(&keys);
    assert!(v.is_maybe_str("length"));
    assert!(v.is_maybe_str("push"));
    assert!(!v.is_maybe_str("pop"));
    assert!(v.is_maybe_symbol());
    assert!(v.get_symbols().contains(&sym));
}

#[test]
fn polymorphic_values_round_trip_through_join() {
    use protoscript_lattice::{ObjectProperty, PropertyRef};

    let label = ObjectLabel::new(LabelKind::Object, SourceLocation::new("m.ps", 2, 1));
    let prop = ObjectProperty::new(label, PropertyRef::Ordinary(PKey::string("field")));
    let poly = Value::make_str("data")
        .join_absent()
        .make_polymorphic(prop.clone());

    assert!(poly.is_polymorphic());
    assert!(poly.is_maybe_absent());
    assert!(poly.is_maybe_present_data());

    // Joining two polymorphic views of the same property accumulates flags.
    let other = Value::make_absent().make_polymorphic(prop);
    let joined = poly.join(&other);
    assert!(joined.is_polymorphic());
    assert!(joined.is_maybe_absent());
}

#[test]
fn type_size_counts_distinct_types() {
    let obj = ObjectLabel::new(LabelKind::Object, SourceLocation::new("m.ps", 3, 1));
    let fun = ObjectLabel::new(LabelKind::Function, SourceLocation::new("m.ps", 4, 1));
    let arr = ObjectLabel::new(LabelKind::Array, SourceLocation::new("m.ps", 5, 1));

    let v = Value::make_bool(true)
        .join(&Value::make_str("s"))
        .join(&Value::make_num(1.0))
        .join(&Value::make_object(obj))
        .join(&Value::make_object(fun))
        .join(&Value::make_object(arr));
    // bool + string + number + function + array + other object.
    assert_eq!(v.type_size(), 6);

    assert_eq!(Value::make_null().type_size(), 1);
    assert_eq!(Value::make_none().type_size(), 0);
}

fn sample_values() -> Vec<Value> {
    let obj = ObjectLabel::new(LabelKind::Object, SourceLocation::new("sample.ps", 1, 1));
    let fun = ObjectLabel::new(LabelKind::Function, SourceLocation::new("sample.ps", 2, 1));
    let sym = ObjectLabel::new(LabelKind::Symbol, SourceLocation::new("sample.ps", 3, 1));
    vec![
        Value::make_none(),
        Value::make_undef(),
        Value::make_null(),
        Value::make_bool(true),
        Value::make_bool(false),
        Value::make_any_bool(),
        Value::make_num(0.0),
        Value::make_num(7.0),
        Value::make_num(-1.5),
        Value::make_num_nan(),
        Value::make_num_inf(),
        Value::make_any_num(),
        Value::make_any_num_uint(),
        Value::make_any_num_other(),
        Value::make_str(""),
        Value::make_str("foo"),
        Value::make_str("42"),
        Value::make_str("x y"),
        Value::make_any_str(),
        Value::make_any_str_uint(),
        Value::make_any_str_numeric(),
        Value::make_any_str_ident(),
        Value::make_json_str(),
        Value::make_strings(["ab", "ac"]),
        Value::make_strings(["foo", "bar"]),
        Value::make_str("ab")
            .join(&Value::make_str("ac"))
            .forget_excluded_included_strings(),
        Value::make_any_str_excluding(["foo"]),
        Value::make_absent(),
        Value::make_object(obj.clone()),
        Value::make_object(fun.clone()),
        Value::make_symbol(sym.clone()),
        Value::make_object(obj).join(&Value::make_object(fun)),
        Value::make_undef()
            .join(&Value::make_num(3.0))
            .join(&Value::make_str("mix")),
        Value::make_object(sym.summary()),
    ]
}
