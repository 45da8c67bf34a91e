//! Error types for the coherence engine and its driver-facing parsers.

use thiserror::Error;

/// Precondition violations the engine fails fast on.
///
/// Well-typed callers going through [`crate::address::CacheId`] and
/// [`crate::address::Address`] cannot construct a value that would trigger
/// these — they exist for the few remaining places that accept raw
/// integers (the scripted driver's input parsing) and must validate before
/// handing a value to the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Cache id was not in `[0, N_CACHES)`.
    #[error("invalid cache id: {0}")]
    InvalidCacheId(usize),

    /// Address was not in `[0, N_ADDRESSES)`.
    #[error("invalid address: {0}")]
    InvalidAddress(usize),

    /// A write value was negative, which main memory cannot represent.
    #[error("write value cannot be negative: {0}")]
    NegativeValue(i64),
}
