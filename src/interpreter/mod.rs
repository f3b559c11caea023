//! The interpreter: engine context, frames and the dispatch loop.
//!
//! `run_from_position` sets up a frame over the register window declared by
//! the body's `reg_var_decl` opcode, then the inner loop fetches and
//! dispatches instructions until a completion other than normal-empty
//! terminates it. Data-bearing meta instructions stop the loop with the
//! program counter left on them, so the surrounding structured opcode can
//! read their payload.

mod arith;
mod opcodes;
mod relational;

use crate::builtins::{self, Realm};
use crate::bytecode::{decode_counter, Idx, Literal, MetaKind, Op, Program};
use crate::completion::{Abrupt, Completion, Flow};
use crate::conversion;
use crate::error::EngineError;
use crate::heap::{Heap, ObjectRef};
use crate::lex_env;
use crate::object::{ClassTag, Property};
use crate::object_ops::{self, StandardError};
use crate::strings::{JsString, Magic, StringTable};
use crate::value::Value;
use crate::EngineConfig;

/// One activation: program counter, this binding, lexical environment and
/// the register window.
pub(crate) struct Frame {
    pos: u16,
    this: Value,
    lex_env: ObjectRef,
    strict: bool,
    is_eval: bool,
    min_reg: Idx,
    regs: Vec<Value>,
}

impl Frame {
    fn trace(&self, out: &mut Vec<ObjectRef>) {
        self.this.trace(out);
        out.push(self.lex_env);
        for reg in &self.regs {
            reg.trace(out);
        }
    }
}

/// The engine context threaded through every operation.
pub struct Interpreter {
    pub heap: Heap,
    pub strings: StringTable,
    pub realm: Realm,
    pub(crate) config: EngineConfig,
    program: Program,
    /// String literals interned once at installation.
    lit_strings: Vec<Option<JsString>>,
    frames: Vec<Frame>,
    /// Values pinned by handlers across re-entrant evaluation; a GC root.
    temp_roots: Vec<Value>,
    steps: u64,
}

impl Interpreter {
    pub(crate) fn new(program: Program, config: EngineConfig) -> Self {
        let mut heap = Heap::new();
        heap.set_gc_threshold(config.gc_threshold);
        let mut strings = StringTable::new();
        let realm = builtins::create_realm(&mut heap, &mut strings);
        let lit_strings = program
            .literals()
            .iter()
            .map(|lit| match lit {
                Literal::String(s) => Some(strings.intern(s)),
                Literal::Number(_) => None,
            })
            .collect();
        Self {
            heap,
            strings,
            realm,
            config,
            program,
            lit_strings,
            frames: Vec::new(),
            temp_roots: Vec::new(),
            steps: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Entry points
    // ═══════════════════════════════════════════════════════════════════════

    /// Run the installed program to termination.
    pub fn run(&mut self) -> Result<bool, EngineError> {
        if self.program.is_empty() {
            return Err(EngineError::InvalidBytecode("program is empty"));
        }

        let mut start: u16 = 0;
        let mut strict = false;
        if let Op::Meta {
            kind: MetaKind::StrictCode,
            ..
        } = self.program.op(0)
        {
            strict = true;
            start = 1;
        }

        let this = Value::Object(self.realm.global);
        let env = self.realm.global_env;
        match self.run_from_position(start, this, env, strict, false) {
            Err(Abrupt::Exit(success)) => Ok(success),
            Err(Abrupt::Throw(value)) => {
                let message = self.describe_thrown(&value);
                Err(EngineError::UnhandledException { message })
            }
            Err(Abrupt::Return(_)) => Err(EngineError::InvalidBytecode(
                "return outside of a function body",
            )),
            Ok(()) => Err(EngineError::InvalidBytecode(
                "program ended without an exit opcode",
            )),
        }
    }

    /// Execute a function body starting at its `reg_var_decl` opcode.
    pub(crate) fn run_from_position(
        &mut self,
        start: u16,
        this: Value,
        lex_env: ObjectRef,
        strict: bool,
        is_eval: bool,
    ) -> Completion<()> {
        let (min, max) = match self.program.op(start) {
            Op::RegVarDecl { min, max } => (min, max),
            other => unreachable!("body must start with reg_var_decl, found {:?}", other),
        };
        debug_assert!(max >= min);

        self.frames.push(Frame {
            pos: start + 1,
            this,
            lex_env,
            strict,
            is_eval,
            min_reg: min,
            regs: vec![Value::Undefined; (max - min) as usize + 1],
        });
        let result = self.run_loop();
        self.frames.pop();
        result
    }

    /// The inner dispatch loop. Runs while completions are normal-empty;
    /// stops with `Ok` on a data-bearing meta instruction (program counter
    /// left on it) and propagates every abrupt completion.
    pub(crate) fn run_loop(&mut self) -> Completion<()> {
        loop {
            if self.heap.should_collect() {
                self.collect_garbage();
            }
            self.steps += 1;
            if let Some(limit) = self.config.step_limit {
                if self.steps > limit {
                    let err = object_ops::new_standard_error(
                        self,
                        StandardError::Range,
                        "script interrupted",
                    );
                    return Err(Abrupt::Throw(err));
                }
            }
            let op = self.program.op(self.frame().pos);
            match self.dispatch(op)? {
                Flow::Next => continue,
                Flow::Meta => return Ok(()),
            }
        }
    }

    fn dispatch(&mut self, op: Op) -> Completion<Flow> {
        match op {
            Op::Nop => self.op_nop(),
            Op::RegVarDecl { .. } => {
                unreachable!("reg_var_decl is consumed at frame setup")
            }
            Op::Assignment { dst, kind, src } => self.op_assignment(dst, kind, src),
            Op::PreIncr { dst, var } => self.op_incr_decr(dst, var, 1.0, true),
            Op::PreDecr { dst, var } => self.op_incr_decr(dst, var, -1.0, true),
            Op::PostIncr { dst, var } => self.op_incr_decr(dst, var, 1.0, false),
            Op::PostDecr { dst, var } => self.op_incr_decr(dst, var, -1.0, false),
            Op::VarDecl { name } => self.op_var_decl(name),
            Op::FuncDeclN { name, args } => self.op_func_decl_n(name, args),
            Op::FuncExprN { dst, name, args } => self.op_func_expr_n(dst, name, args),
            Op::CallN { dst, func, args } => self.op_call_n(dst, func, args),
            Op::ConstructN { dst, ctor, args } => self.op_construct_n(dst, ctor, args),
            Op::ArrayDecl { dst, args } => self.op_array_decl(dst, args),
            Op::ObjDecl { dst, props } => self.op_obj_decl(dst, props),
            Op::Ret => Err(Abrupt::Return(Value::Undefined)),
            Op::Retval { value } => self.op_retval(value),
            Op::PropGetter { dst, base, name } => self.op_prop_getter(dst, base, name),
            Op::PropSetter { base, name, rhs } => self.op_prop_setter(base, name, rhs),
            Op::Exitval { status } => self.op_exitval(status),
            Op::LogicalNot { dst, var } => self.op_logical_not(dst, var),
            Op::ThisBinding { dst } => self.op_this_binding(dst),
            Op::With { expr } => self.op_with(expr),
            Op::ThrowValue { var } => self.op_throw_value(var),
            Op::Typeof { dst, var } => self.op_typeof(dst, var),
            Op::DeleteVar { dst, name } => self.op_delete_var(dst, name),
            Op::DeleteProp { dst, base, name } => self.op_delete_prop(dst, base, name),
            Op::Meta { kind, .. } => self.op_meta(kind),
            Op::TryBlock { a, b } => self.op_try_block(a, b),
            Op::JmpDown { a, b } => self.op_jmp(decode_counter(a, b) as i32),
            Op::JmpUp { a, b } => self.op_jmp(-(decode_counter(a, b) as i32)),
            Op::IsTrueJmpDown { cond, a, b } => {
                self.op_cond_jmp(cond, decode_counter(a, b) as i32, true)
            }
            Op::IsTrueJmpUp { cond, a, b } => {
                self.op_cond_jmp(cond, -(decode_counter(a, b) as i32), true)
            }
            Op::IsFalseJmpDown { cond, a, b } => {
                self.op_cond_jmp(cond, decode_counter(a, b) as i32, false)
            }
            Op::IsFalseJmpUp { cond, a, b } => {
                self.op_cond_jmp(cond, -(decode_counter(a, b) as i32), false)
            }
            Op::LessThan { dst, left, right } => self.op_less_than(dst, left, right),
            Op::GreaterThan { dst, left, right } => self.op_greater_than(dst, left, right),
            Op::LessOrEqualThan { dst, left, right } => {
                self.op_less_or_equal_than(dst, left, right)
            }
            Op::GreaterOrEqualThan { dst, left, right } => {
                self.op_greater_or_equal_than(dst, left, right)
            }
            Op::Instanceof { dst, left, right } => self.op_instanceof(dst, left, right),
            Op::In { dst, left, right } => self.op_in(dst, left, right),
            Op::Addition { dst, left, right } => self.op_addition(dst, left, right),
            Op::Subtraction { dst, left, right } => self.op_subtraction(dst, left, right),
            Op::Multiplication { dst, left, right } => self.op_multiplication(dst, left, right),
            Op::Division { dst, left, right } => self.op_division(dst, left, right),
            Op::Remainder { dst, left, right } => self.op_remainder(dst, left, right),
            Op::UnaryMinus { dst, var } => self.op_unary_minus(dst, var),
            Op::UnaryPlus { dst, var } => self.op_unary_plus(dst, var),
            Op::EqualValue { dst, left, right } => self.op_equal_value(dst, left, right, false),
            Op::NotEqualValue { dst, left, right } => self.op_equal_value(dst, left, right, true),
            Op::EqualValueType { dst, left, right } => {
                self.op_equal_value_type(dst, left, right, false)
            }
            Op::NotEqualValueType { dst, left, right } => {
                self.op_equal_value_type(dst, left, right, true)
            }
            Op::BitAnd { dst, left, right } => self.op_bit_and(dst, left, right),
            Op::BitOr { dst, left, right } => self.op_bit_or(dst, left, right),
            Op::BitXor { dst, left, right } => self.op_bit_xor(dst, left, right),
            Op::BitNot { dst, var } => self.op_bit_not(dst, var),
            Op::ShiftLeft { dst, left, right } => self.op_shift_left(dst, left, right),
            Op::ShiftRight { dst, left, right } => self.op_shift_right(dst, left, right),
            Op::ShiftUright { dst, left, right } => self.op_shift_uright(dst, left, right),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Frame and register access
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn frame(&self) -> &Frame {
        self.frames.last().expect("no active frame")
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no active frame")
    }

    pub(crate) fn call_depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> u16 {
        self.frame().pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: u16) {
        self.frame_mut().pos = pos;
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.frame_mut().pos += 1;
    }

    #[inline]
    pub(crate) fn op_at(&self, pos: u16) -> Op {
        self.program.op(pos)
    }

    pub(crate) fn frame_strict(&self) -> bool {
        self.frame().strict
    }

    pub(crate) fn frame_env(&self) -> ObjectRef {
        self.frame().lex_env
    }

    pub(crate) fn set_frame_env(&mut self, env: ObjectRef) {
        self.frame_mut().lex_env = env;
    }

    pub(crate) fn frame_this(&self) -> Value {
        self.frame().this.clone()
    }

    /// Whether the operand addresses a register of the current frame.
    pub(crate) fn is_reg_var(&self, idx: Idx) -> bool {
        let frame = self.frame();
        idx >= frame.min_reg && (idx as usize) < frame.min_reg as usize + frame.regs.len()
    }

    fn reg(&self, idx: Idx) -> &Value {
        let frame = self.frame();
        &frame.regs[(idx - frame.min_reg) as usize]
    }

    fn set_reg(&mut self, idx: Idx, value: Value) {
        let frame = self.frame_mut();
        frame.regs[(idx - frame.min_reg) as usize] = value;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Literal and variable access
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn literal_string(&self, uid: Idx, pos: u16) -> JsString {
        let id = self.program.resolve_literal_id(uid, pos);
        match &self.lit_strings[id] {
            Some(s) => s.clone(),
            None => unreachable!("literal {} is not a string", id),
        }
    }

    pub(crate) fn literal_number(&self, uid: Idx, pos: u16) -> f64 {
        let id = self.program.resolve_literal_id(uid, pos);
        match self.program.literal(id) {
            Literal::Number(n) => *n,
            Literal::String(_) => unreachable!("literal {} is not a number", id),
        }
    }

    /// Read an operand: a register copy, or an identifier resolved through
    /// the lexical environment chain.
    pub(crate) fn get_variable(&mut self, idx: Idx, lit_pos: u16) -> Completion<Value> {
        if self.is_reg_var(idx) {
            return Ok(self.reg(idx).clone());
        }
        let name = self.literal_string(idx, lit_pos);
        let env = self.frame_env();
        match lex_env::resolve_reference_base(&self.heap, env, &name) {
            Some(base) => {
                let strict = self.frame_strict();
                lex_env::get_binding_value(self, base, &name, strict)
            }
            None => {
                let message = format!("{} is not defined", name);
                object_ops::throw_standard_error(self, StandardError::Reference, &message)
            }
        }
    }

    /// Write an operand: a register store, or an identifier assignment
    /// through the environment chain. Unresolvable identifiers create a
    /// global property outside strict mode.
    pub(crate) fn set_variable(&mut self, idx: Idx, lit_pos: u16, value: Value) -> Completion<()> {
        if self.is_reg_var(idx) {
            self.set_reg(idx, value);
            return Ok(());
        }
        let name = self.literal_string(idx, lit_pos);
        let env = self.frame_env();
        let strict = self.frame_strict();
        match lex_env::resolve_reference_base(&self.heap, env, &name) {
            Some(base) => lex_env::set_mutable_binding(self, base, &name, value, strict),
            None if strict => {
                let message = format!("{} is not defined", name);
                object_ops::throw_standard_error(self, StandardError::Reference, &message)
            }
            None => {
                let global = self.realm.global;
                object_ops::object_put(self, global, &name, value, false)
            }
        }
    }

    /// Decode the 16-bit counter of the meta instruction at `pos`.
    pub(crate) fn meta_counter_at(&self, pos: u16, expected: MetaKind) -> u16 {
        match self.program.op(pos) {
            Op::Meta { kind, a, b } if kind == expected => decode_counter(a, b),
            other => unreachable!("expected meta {:?}, found {:?}", expected, other),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // GC integration
    // ═══════════════════════════════════════════════════════════════════════

    /// Pin a value for the duration of a re-entrant operation. Returns the
    /// mark to pass to `unpin_to`.
    pub(crate) fn pin(&mut self, value: Value) -> usize {
        let mark = self.temp_roots.len();
        self.temp_roots.push(value);
        mark
    }

    pub(crate) fn unpin_to(&mut self, mark: usize) {
        self.temp_roots.truncate(mark);
    }

    pub(crate) fn temp_roots_mark(&self) -> usize {
        self.temp_roots.len()
    }

    /// Collect garbage with the full root set: realm objects, every active
    /// frame and the pinned values.
    pub fn collect_garbage(&mut self) {
        let mut roots = Vec::with_capacity(16 + self.temp_roots.len());
        self.realm.trace(&mut roots);
        for frame in &self.frames {
            frame.trace(&mut roots);
        }
        for value in &self.temp_roots {
            value.trace(&mut roots);
        }
        self.heap.collect(roots);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    /// Best-effort rendering of an uncaught thrown value.
    pub(crate) fn describe_thrown(&mut self, value: &Value) -> String {
        if let Some(obj) = value.as_object() {
            if self.heap.get(obj).class == ClassTag::Error {
                let name_key = self.strings.magic(Magic::Name);
                let name = match object_ops::get_property(&self.heap, obj, &name_key) {
                    Some(Property::Data {
                        value: Value::String(s),
                        ..
                    }) => s.to_string(),
                    _ => "Error".to_string(),
                };
                let message_key = self.strings.magic(Magic::Message);
                let message = match object_ops::get_property(&self.heap, obj, &message_key) {
                    Some(Property::Data {
                        value: Value::String(s),
                        ..
                    }) => s.to_string(),
                    _ => String::new(),
                };
                return if message.is_empty() {
                    name
                } else {
                    format!("{}: {}", name, message)
                };
            }
        }
        match conversion::to_string(self, value) {
            Ok(s) => s.to_string(),
            Err(_) => "uncaught value".to_string(),
        }
    }
}
