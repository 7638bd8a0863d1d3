//! Internal contract-violation errors.
//!
//! Every error here indicates a programming error in the calling transfer
//! functions, not a problem with the analyzed program. All of them are fatal
//! to the current analysis run: the check helpers abort immediately and
//! nothing in this crate recovers from them.

use thiserror::Error;

/// A violated internal contract of the value lattice.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid value {value}: {reason}")]
    InvalidRepresentation { value: String, reason: &'static str },

    #[error("unexpected polymorphic value")]
    UnexpectedPolymorphic,

    #[error("unexpected 'unknown' value")]
    UnexpectedUnknown,

    #[error("unexpected getter/setter value")]
    UnexpectedGetterSetter,

    #[error("attempt to join polymorphic values of different property")]
    PolymorphicJoinMismatch,

    #[error("invoked get_str on a non-single string value")]
    NotSingleString,

    #[error("invoked get_prefix on a non-prefix string value")]
    NotPrefixString,

    #[error("prefix string can't be empty")]
    EmptyPrefix,

    #[error("creating symbol value with a non-symbol label")]
    NonSymbolLabel,

    #[error("equal object labels not expected")]
    EqualObjectLabels,

    #[error("empty value")]
    EmptyValue,

    #[error("getting known strings from a value without all known strings")]
    NotAllKnownStrings,

    #[error("expected string-only values, got ({0}, {1})")]
    NotStringOnly(String, String),
}

/// Aborts the analysis run with the given contract violation.
pub(crate) fn raise(err: AnalysisError) -> ! {
    panic!("{err}")
}
