//! ECMAScript 5.1 subset bytecode interpreter for microcontroller-class
//! targets.
//!
//! The engine executes a compact fixed-width bytecode stream over an ECMA
//! object model: a bounded object heap with mark-and-sweep collection,
//! interned strings with a magic-string registry, lexical environments and
//! the full property algorithms.
//!
//! # Example
//!
//! ```
//! use picojs::bytecode::{ArgKind, Op, ProgramBuilder};
//! use picojs::Engine;
//!
//! // var a = 2; exit(a == 2);
//! let mut b = ProgramBuilder::new();
//! b.emit(Op::RegVarDecl { min: 0, max: 1 });
//! b.emit(Op::Assignment { dst: 0, kind: ArgKind::SmallInt, src: 2 });
//! b.emit(Op::Assignment { dst: 1, kind: ArgKind::SmallInt, src: 2 });
//! b.emit(Op::EqualValue { dst: 0, left: 0, right: 1 });
//! let jump = b.emit(Op::IsTrueJmpDown { cond: 0, a: 0, b: 0 });
//! b.emit(Op::Exitval { status: 1 });
//! let exit_ok = b.emit(Op::Exitval { status: 0 });
//! b.patch_offset(jump, exit_ok);
//!
//! let mut engine = Engine::new(b.finish());
//! assert!(engine.run().unwrap());
//! ```

pub mod builtins;
pub mod bytecode;
pub mod completion;
pub mod conversion;
pub mod error;
pub mod function;
pub mod heap;
pub mod interpreter;
pub mod lex_env;
pub mod numbers;
pub mod object;
pub mod object_ops;
pub mod strings;
pub mod value;

pub use bytecode::{Program, ProgramBuilder};
pub use completion::{Abrupt, Completion, Flow};
pub use error::EngineError;
pub use heap::{GcStats, Heap, ObjectRef};
pub use interpreter::Interpreter;
pub use strings::{JsString, Magic, StringTable};
pub use value::Value;

/// Engine configuration.
pub struct EngineConfig {
    /// Allocations between collection safe points. Zero disables automatic
    /// collection.
    pub gc_threshold: usize,
    /// Nesting limit for function calls; exceeding it throws a RangeError.
    pub max_call_depth: usize,
    /// Optional instruction limit. Exceeding it surfaces as a thrown error
    /// observed at the next dispatch safe point.
    pub step_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gc_threshold: 512,
            max_call_depth: 128,
            step_limit: None,
        }
    }
}

/// The embedding entry point: installs a program and runs it.
pub struct Engine {
    interp: Interpreter,
}

impl Engine {
    /// Install `program` with the default configuration.
    pub fn new(program: Program) -> Self {
        Self::with_config(program, EngineConfig::default())
    }

    /// Install `program` with an explicit configuration.
    pub fn with_config(program: Program, config: EngineConfig) -> Self {
        Self {
            interp: Interpreter::new(program, config),
        }
    }

    /// Run the program. Returns true iff it terminated through the
    /// exit-success opcode; an unhandled throw is a fatal error.
    pub fn run(&mut self) -> Result<bool, EngineError> {
        self.interp.run()
    }

    /// Force a collection cycle.
    pub fn collect(&mut self) {
        self.interp.collect_garbage();
    }

    /// Collector statistics.
    pub fn gc_stats(&self) -> GcStats {
        self.interp.heap.stats()
    }
}
