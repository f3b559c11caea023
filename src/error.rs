//! Host-facing error type.

use thiserror::Error;

/// Fatal conditions surfaced to the embedder. Everything recoverable inside
/// the program travels as a throw completion instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A throw completion escaped the outermost frame.
    #[error("unhandled exception: {message}")]
    UnhandledException { message: String },

    /// The program violated a structural invariant of the bytecode format.
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(&'static str),
}
