//! Precision-loss diagnostics for the value lattice.
//!
//! Join and widening deliberately discard information to guarantee
//! termination. This module lets the embedding analyzer observe those
//! events: where an included-string set hit its bound, where exclusion
//! refinements were widened away, where a shared prefix collapsed to
//! category bits, and where single numbers were relaxed.
//!
//! Collection is disabled by default to avoid overhead. Enable it via
//! `DiagnosticsCollector::enable()`, drain with `DiagnosticsCollector::take()`.

use std::cell::RefCell;
use std::fmt;

/// Reason for a precision-loss event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecisionLossReason {
    /// An included-string set exceeded the configured bound.
    /// Contains the size the set would have had.
    StringSetBound(usize),

    /// An included-string set was widened away.
    StringSetWidened,

    /// An excluded-string refinement was widened away.
    ExcludedStringsWidened,

    /// Two single/prefix strings had no usable shared prefix and collapsed
    /// to their category bits.
    PrefixCollapsed,

    /// A single concrete number was relaxed into its fuzzy category.
    NumberRelaxed,
}

impl fmt::Display for PrecisionLossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecisionLossReason::StringSetBound(size) => {
                write!(f, "included-string set of size {} exceeds bound", size)
            }
            PrecisionLossReason::StringSetWidened => {
                write!(f, "included-string set widened away")
            }
            PrecisionLossReason::ExcludedStringsWidened => {
                write!(f, "excluded-string refinement widened away")
            }
            PrecisionLossReason::PrefixCollapsed => {
                write!(f, "shared prefix collapsed to string categories")
            }
            PrecisionLossReason::NumberRelaxed => {
                write!(f, "single number relaxed to fuzzy category")
            }
        }
    }
}

/// A single recorded precision-loss event.
#[derive(Clone, Debug)]
pub struct PrecisionLossEvent {
    pub reason: PrecisionLossReason,
    /// Optional description of the values involved.
    pub context: Option<String>,
}

impl PrecisionLossEvent {
    pub fn new(reason: PrecisionLossReason) -> Self {
        PrecisionLossEvent {
            reason,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for PrecisionLossEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precision loss: {}", self.reason)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

thread_local! {
    static ENABLED: RefCell<bool> = const { RefCell::new(false) };
    static EVENTS: RefCell<Vec<PrecisionLossEvent>> = const { RefCell::new(Vec::new()) };
}

/// Collector for precision-loss events, one per thread.
#[derive(Debug)]
pub struct DiagnosticsCollector;

impl DiagnosticsCollector {
    pub fn enable() {
        ENABLED.with(|enabled| *enabled.borrow_mut() = true);
    }

    pub fn disable() {
        ENABLED.with(|enabled| *enabled.borrow_mut() = false);
    }

    pub fn is_enabled() -> bool {
        ENABLED.with(|enabled| *enabled.borrow())
    }

    /// Records an event, if collection is enabled.
    pub fn emit(event: PrecisionLossEvent) {
        if Self::is_enabled() {
            EVENTS.with(|events| events.borrow_mut().push(event));
        }
    }

    /// Takes all recorded events, clearing the collection.
    pub fn take() -> Vec<PrecisionLossEvent> {
        EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
    }

    pub fn clear() {
        EVENTS.with(|events| events.borrow_mut().clear());
    }

    pub fn count() -> usize {
        EVENTS.with(|events| events.borrow().len())
    }
}

pub(crate) fn emit_string_set_bound(size: usize) {
    DiagnosticsCollector::emit(PrecisionLossEvent::new(PrecisionLossReason::StringSetBound(
        size,
    )));
}

pub(crate) fn emit_string_set_widened() {
    DiagnosticsCollector::emit(PrecisionLossEvent::new(
        PrecisionLossReason::StringSetWidened,
    ));
}

pub(crate) fn emit_excluded_strings_widened() {
    DiagnosticsCollector::emit(PrecisionLossEvent::new(
        PrecisionLossReason::ExcludedStringsWidened,
    ));
}

pub(crate) fn emit_number_relaxed() {
    DiagnosticsCollector::emit(PrecisionLossEvent::new(PrecisionLossReason::NumberRelaxed));
}

pub(crate) fn emit_prefix_collapsed(a: &str, b: &str) {
    if DiagnosticsCollector::is_enabled() {
        DiagnosticsCollector::emit(
            PrecisionLossEvent::new(PrecisionLossReason::PrefixCollapsed)
                .with_context(format!("\"{}\" vs \"{}\"", a, b)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        DiagnosticsCollector::disable();
        DiagnosticsCollector::clear();
        assert!(!DiagnosticsCollector::is_enabled());

        emit_string_set_widened();
        assert_eq!(DiagnosticsCollector::count(), 0);
    }

    #[test]
    fn test_collection() {
        DiagnosticsCollector::enable();
        DiagnosticsCollector::clear();

        emit_string_set_bound(101);
        emit_prefix_collapsed("foo", "bar");
        assert_eq!(DiagnosticsCollector::count(), 2);

        let events = DiagnosticsCollector::take();
        assert_eq!(events.len(), 2);
        assert_eq!(DiagnosticsCollector::count(), 0);
        assert_eq!(events[0].reason, PrecisionLossReason::StringSetBound(101));
        assert!(events[1].to_string().contains("\"foo\" vs \"bar\""));

        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_event_display() {
        let e = PrecisionLossEvent::new(PrecisionLossReason::NumberRelaxed).with_context("join");
        let text = e.to_string();
        assert!(text.contains("precision loss"));
        assert!(text.contains("join"));
    }
}
