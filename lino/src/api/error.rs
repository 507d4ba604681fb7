use thiserror::Error as ThisError;

/// Errors surfaced by the bridge.
///
/// `Interrupted` is the cancellation signal. It is never conflated with
/// end-of-input, which [`read_line`](crate::read_line) reports as
/// `Ok(None)`.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The interrupt key was pressed during read-line while catch-break
    /// is enabled.
    #[error("line editing interrupted")]
    Interrupted,

    /// An operation was called before [`setup`](crate::setup).
    #[error("line-editing engine is not set up")]
    NotReady,

    /// [`setup`](crate::setup) was called a second time. Re-registering
    /// the callbacks with the engine is undefined, so the bridge refuses.
    #[error("line-editing engine is already set up")]
    AlreadyInitialized,

    /// The string cannot cross the boundary: it contains a NUL byte.
    #[error("string contains an embedded NUL byte")]
    EmbeddedNul,

    /// The engine library could not be loaded or is missing a symbol.
    #[error("engine error: {0}")]
    Engine(String),
}
