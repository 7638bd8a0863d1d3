//! Pool lifecycle tests. These live in their own test binary because
//! `reset` invalidates every previously interned value in the process.

use protoscript_lattice::{canonical, Value};

#[test]
fn reset_clears_the_pool_and_rebuilds_singletons() {
    canonical::init();

    let before = Value::make_str("survivor");
    let none_before = Value::make_none();
    assert!(canonical::get().size() > 0);

    canonical::reset();

    // Fresh constructions are new identities.
    let after = Value::make_str("survivor");
    assert_ne!(before, after, "pre-reset handles are stale identities");

    // The singleton cache has been rebuilt and is self-consistent.
    let none_after = Value::make_none();
    assert_ne!(none_before, none_after);
    assert_eq!(Value::make_none(), none_after);
    assert_eq!(Value::make_undef().join(&none_after), Value::make_undef());

    // The new pool interns as usual.
    assert_eq!(after, Value::make_str("survivor"));
}
