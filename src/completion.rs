//! Completion values.
//!
//! Every evaluator in the engine returns a completion. Normal completions are
//! the `Ok` side of a `Result` so handlers propagate abrupt completions with
//! `?`; the abrupt kinds (throw, return, exit) are a dedicated sum type.

use crate::value::Value;

/// An abrupt completion: any outcome that terminates the inner dispatch loop
/// and propagates to the nearest structured handler.
#[derive(Debug, Clone)]
pub enum Abrupt {
    /// A thrown value, recoverable by try/catch.
    Throw(Value),
    /// Return from the current function body.
    Return(Value),
    /// Engine exit with a success flag.
    Exit(bool),
}

impl Abrupt {
    pub fn is_throw(&self) -> bool {
        matches!(self, Abrupt::Throw(_))
    }
}

/// Completion of an engine operation: a normal completion carrying `T`, or an
/// abrupt completion.
pub type Completion<T = Value> = Result<T, Abrupt>;

/// Outcome of a single opcode handler.
///
/// `Next` is the normal-empty completion: dispatch continues with the next
/// instruction. `Meta` is produced by data-bearing meta instructions; the
/// dispatch loop stops on it so the surrounding structured opcode can consume
/// the data, leaving the program counter at the meta instruction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Meta,
}
