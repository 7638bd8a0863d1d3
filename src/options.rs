//! Analysis options consumed by the value lattice.
//!
//! The options form a flat bag that is read once per operation that needs
//! it. The bag is process-wide, like the canonicalization pools: all
//! analyses running in the same process share one configuration.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Default cap on the size of included-string sets before widening.
pub const DEFAULT_STRING_SETS_BOUND: usize = 100;

/// The options bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Enable representation-invariant checks and polymorphism asserts.
    pub debug_or_test_enabled: bool,

    /// Reject any polymorphic value passed through canonicalization.
    pub polymorphic_disabled: bool,

    /// Disable use of included-string sets.
    pub no_string_sets: bool,

    /// Allow empty (none) values to propagate without assertion failures.
    pub propagate_dead_flow: bool,

    /// Cap on the size of included-string sets before widening to fuzzy.
    pub string_sets_bound: usize,
}

impl AnalysisOptions {
    const DEFAULT: AnalysisOptions = AnalysisOptions {
        debug_or_test_enabled: cfg!(debug_assertions),
        polymorphic_disabled: false,
        no_string_sets: false,
        propagate_dead_flow: false,
        string_sets_bound: DEFAULT_STRING_SETS_BOUND,
    };
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static OPTIONS: RwLock<AnalysisOptions> = RwLock::new(AnalysisOptions::DEFAULT);

/// Returns a copy of the current options.
pub fn get() -> AnalysisOptions {
    *OPTIONS.read().unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the current options.
pub fn set(options: AnalysisOptions) {
    *OPTIONS.write().unwrap_or_else(PoisonError::into_inner) = options;
}

/// Applies a change to the current options.
pub fn update(f: impl FnOnce(&mut AnalysisOptions)) {
    f(&mut OPTIONS.write().unwrap_or_else(PoisonError::into_inner));
}

/// Restores the default options.
pub fn reset() {
    set(AnalysisOptions::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = AnalysisOptions::default();
        assert!(!opts.polymorphic_disabled);
        assert!(!opts.no_string_sets);
        assert!(!opts.propagate_dead_flow);
        assert_eq!(opts.string_sets_bound, DEFAULT_STRING_SETS_BOUND);
    }

    #[test]
    fn test_update_and_reset() {
        update(|o| o.string_sets_bound = 7);
        assert_eq!(get().string_sets_bound, 7);
        reset();
        assert_eq!(get().string_sets_bound, DEFAULT_STRING_SETS_BOUND);
    }
}
