//! Eagerly built cache of canonical constants for common values.
//!
//! The cache is process-wide, like the canonicalization pools. `rebuild`
//! re-creates every constant; it must run after the pools are cleared so
//! the fresh constants become the new canonical representatives.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::lattice::flags::ValueFlags;
use crate::lattice::value::Value;

pub(crate) struct Singletons {
    pub none: Value,
    pub undef: Value,
    pub null: Value,
    pub bool_true: Value,
    pub bool_false: Value,
    pub bool_any: Value,
    pub str_any: Value,
    pub str_uint: Value,
    pub str_other_num: Value,
    pub str_numeric: Value,
    pub str_not_numeric: Value,
    pub str_not_uint: Value,
    pub str_ident: Value,
    pub str_json: Value,
    pub num_any: Value,
    pub num_uint: Value,
    pub num_uint_pos: Value,
    pub num_not_nan_inf: Value,
    pub num_other: Value,
    pub num_nan: Value,
    pub num_inf: Value,
    pub absent: Value,
    pub unknown: Value,
}

impl Singletons {
    fn build() -> Singletons {
        Singletons {
            none: Value::really_make_none(),
            undef: Value::really_make_undef(),
            null: Value::really_make_null(),
            bool_true: Value::really_make_bool(Some(true)),
            bool_false: Value::really_make_bool(Some(false)),
            bool_any: Value::really_make_bool(None),
            str_any: Value::really_make_flags(
                ValueFlags::STR_OTHERNUM | ValueFlags::STR_IDENTIFIERPARTS | ValueFlags::STR_OTHER,
            ),
            str_uint: Value::really_make_flags(ValueFlags::STR_UINT),
            str_other_num: Value::really_make_flags(ValueFlags::STR_OTHERNUM),
            str_numeric: Value::really_make_flags(
                ValueFlags::STR_OTHERNUM | ValueFlags::STR_UINT,
            ),
            str_not_numeric: Value::really_make_flags(
                ValueFlags::STR_IDENTIFIER
                    | ValueFlags::STR_OTHERIDENTIFIERPARTS
                    | ValueFlags::STR_OTHER,
            ),
            str_not_uint: Value::really_make_flags(
                ValueFlags::STR_IDENTIFIER
                    | ValueFlags::STR_OTHERIDENTIFIERPARTS
                    | ValueFlags::STR_OTHER
                    | ValueFlags::STR_OTHERNUM,
            ),
            str_ident: Value::really_make_flags(ValueFlags::STR_IDENTIFIER),
            str_json: Value::really_make_flags(ValueFlags::STR_JSON),
            num_any: Value::really_make_flags(ValueFlags::NUM),
            num_uint: Value::really_make_flags(ValueFlags::NUM_UINT),
            num_uint_pos: Value::really_make_flags(ValueFlags::NUM_UINT_POS),
            num_not_nan_inf: Value::really_make_flags(
                ValueFlags::NUM_UINT | ValueFlags::NUM_OTHER,
            ),
            num_other: Value::really_make_flags(ValueFlags::NUM_OTHER),
            num_nan: Value::really_make_flags(ValueFlags::NUM_NAN),
            num_inf: Value::really_make_flags(ValueFlags::NUM_INF),
            absent: Value::really_make_absent(),
            unknown: Value::really_make_unknown(),
        }
    }
}

static SINGLETONS: Lazy<RwLock<Arc<Singletons>>> =
    Lazy::new(|| RwLock::new(Arc::new(Singletons::build())));

/// The current singleton cache.
pub(crate) fn get() -> Arc<Singletons> {
    SINGLETONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Forces initialization of the cache.
pub(crate) fn init() {
    Lazy::force(&SINGLETONS);
}

/// Rebuilds every cached constant from scratch.
pub(crate) fn rebuild() {
    let mut guard = SINGLETONS.write().unwrap_or_else(PoisonError::into_inner);
    *guard = Arc::new(Singletons::build());
}
