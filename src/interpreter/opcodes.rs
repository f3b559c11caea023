//! Opcode handlers: data movement, declarations, calls, literals, scope and
//! exception machinery. Arithmetic and relational handlers live in their own
//! modules.

use super::Interpreter;
use crate::bytecode::{decode_counter, ArgKind, Idx, MetaKind, Op, SimpleValue, INVALID_IDX};
use crate::completion::{Abrupt, Completion, Flow};
use crate::conversion;
use crate::function;
use crate::lex_env;
use crate::object::{ClassTag, Object, ObjectData, PropertyDescriptor};
use crate::object_ops::{self, Reference, StandardError};
use crate::strings::{JsString, Magic};
use crate::value::Value;

impl Interpreter {
    pub(super) fn op_nop(&mut self) -> Completion<Flow> {
        self.advance();
        Ok(Flow::Next)
    }

    /// Assignment of a literal's or a variable's value to a variable
    /// (ECMA-262 v5, 11.13.1). Property stores go through `prop_setter`.
    pub(super) fn op_assignment(&mut self, dst: Idx, kind: ArgKind, src: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = match kind {
            ArgKind::Simple => match SimpleValue::from_idx(src) {
                Some(SimpleValue::Empty) => Value::Empty,
                Some(SimpleValue::Undefined) => Value::Undefined,
                Some(SimpleValue::Null) => Value::Null,
                Some(SimpleValue::False) => Value::Bool(false),
                Some(SimpleValue::True) => Value::Bool(true),
                Some(SimpleValue::ArrayHole) => Value::Hole,
                None => unreachable!("bad simple value operand {}", src),
            },
            ArgKind::StringLit => Value::String(self.literal_string(src, lit_pos)),
            ArgKind::Variable => self.get_variable(src, lit_pos)?,
            ArgKind::NumberLit => Value::Number(self.literal_number(src, lit_pos)),
            ArgKind::NumberLitNegate => Value::Number(-self.literal_number(src, lit_pos)),
            ArgKind::SmallInt => Value::Number(src as f64),
            ArgKind::SmallIntNegate => Value::Number(-(src as f64)),
            ArgKind::Reserved => unreachable!("reserved assignment operand kind"),
        };
        self.set_variable(dst, lit_pos, value)?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Shared pre/post increment and decrement (ECMA-262 v5, 11.3, 11.4.4).
    pub(super) fn op_incr_decr(
        &mut self,
        dst: Idx,
        var: Idx,
        delta: f64,
        is_pre: bool,
    ) -> Completion<Flow> {
        let lit_pos = self.pos();
        let old = self.get_variable(var, lit_pos)?;
        let old_num = conversion::to_number(self, &old)?;
        let new_num = old_num + delta;
        self.set_variable(var, lit_pos, Value::Number(new_num))?;
        let result = if is_pre { new_num } else { old_num };
        self.set_variable(dst, lit_pos, Value::Number(result))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Declaration binding instantiation for a `var` (ECMA-262 v5, 10.5).
    pub(super) fn op_var_decl(&mut self, name_uid: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let name = self.literal_string(name_uid, lit_pos);
        let env = self.frame_env();
        if !lex_env::has_binding(&self.heap, env, &name) {
            // Bindings are deletable only in eval code.
            let deletable = self.frame().is_eval;
            lex_env::create_mutable_binding(self, env, &name, deletable)?;
        }
        self.advance();
        Ok(Flow::Next)
    }

    /// Read `count` parameter-name carriers following a function opcode.
    fn read_param_names(&mut self, count: Idx) -> Vec<JsString> {
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let pos = self.pos();
            match self.op_at(pos) {
                Op::Meta {
                    kind: MetaKind::Varg,
                    a,
                    ..
                } => {
                    names.push(self.literal_string(a, pos));
                    self.advance();
                }
                other => unreachable!("expected parameter carrier, found {:?}", other),
            }
        }
        names
    }

    /// Consume the function-end counter and an optional strict marker;
    /// returns (end position, body strictness, body start).
    fn read_function_header(&mut self) -> (u16, bool, u16) {
        let meta_pos = self.pos();
        let end = meta_pos + self.meta_counter_at(meta_pos, MetaKind::FunctionEnd);
        self.advance();
        let mut strict = self.frame_strict();
        if let Op::Meta {
            kind: MetaKind::StrictCode,
            ..
        } = self.op_at(self.pos())
        {
            strict = true;
            self.advance();
        }
        (end, strict, self.pos())
    }

    /// Function declaration (ECMA-262 v5, 13; binding per 10.5).
    pub(super) fn op_func_decl_n(&mut self, name_uid: Idx, args: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let name = self.literal_string(name_uid, lit_pos);
        self.advance();
        let params = self.read_param_names(args);
        let (end, strict, code_pos) = self.read_function_header();

        let scope = self.frame_env();
        let func = function::create_function_object(self, params, scope, strict, code_pos);

        let env = self.frame_env();
        let frame_strict = self.frame_strict();
        if !lex_env::has_binding(&self.heap, env, &name) {
            let deletable = self.frame().is_eval;
            lex_env::create_mutable_binding(self, env, &name, deletable)?;
        }
        lex_env::set_mutable_binding(self, env, &name, Value::Object(func), frame_strict)?;

        self.set_pos(end);
        Ok(Flow::Next)
    }

    /// Function expression (ECMA-262 v5, 13). A named expression gets its
    /// name as an immutable binding in a fresh declarative environment
    /// wrapping the body.
    pub(super) fn op_func_expr_n(&mut self, dst: Idx, name_uid: Idx, args: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        self.advance();
        let params = self.read_param_names(args);
        let (end, strict, code_pos) = self.read_function_header();

        let outer = self.frame_env();
        let named = name_uid != INVALID_IDX;
        let (scope, name) = if named {
            let name = self.literal_string(name_uid, lit_oc);
            let scope = lex_env::new_declarative_env(&mut self.heap, Some(outer));
            lex_env::create_immutable_binding(&mut self.heap, scope, &name);
            (scope, Some(name))
        } else {
            (outer, None)
        };

        let func = function::create_function_object(self, params, scope, strict, code_pos);
        self.set_variable(dst, lit_oc, Value::Object(func))?;
        if let Some(name) = name {
            lex_env::initialize_immutable_binding(
                &mut self.heap,
                scope,
                &name,
                Value::Object(func),
            );
        }

        self.set_pos(end);
        Ok(Flow::Next)
    }

    /// Evaluate `count` variadic arguments. Each argument's expression runs
    /// through the inner loop up to its carrier. Gathered values are pinned;
    /// the caller owns the surrounding mark.
    fn fill_varg_list(&mut self, count: Idx) -> Completion<Vec<Value>> {
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            self.run_loop()?;
            let pos = self.pos();
            match self.op_at(pos) {
                Op::Meta {
                    kind: MetaKind::Varg,
                    a,
                    ..
                } => {
                    let value = self.get_variable(a, pos)?;
                    self.pin(value.clone());
                    values.push(value);
                    self.advance();
                }
                other => unreachable!("expected argument carrier, found {:?}", other),
            }
        }
        Ok(values)
    }

    /// Function call (ECMA-262 v5, 11.2.3). A `this_arg` carrier directly
    /// after the opcode binds the receiver of a method call; otherwise the
    /// implicit this value of the environment applies.
    pub(super) fn op_call_n(&mut self, dst: Idx, func_idx: Idx, args_idx: Idx) -> Completion<Flow> {
        let mark = self.temp_roots_mark();
        let result = self.call_n_pinned(dst, func_idx, args_idx);
        self.unpin_to(mark);
        result
    }

    fn call_n_pinned(&mut self, dst: Idx, func_idx: Idx, args_idx: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        let func_value = self.get_variable(func_idx, lit_oc)?;
        self.pin(func_value.clone());
        self.advance();

        let mut this_arg_idx = None;
        let mut argc = args_idx;
        if let Op::Meta {
            kind: MetaKind::ThisArg,
            a,
            ..
        } = self.op_at(self.pos())
        {
            debug_assert!(self.is_reg_var(a));
            debug_assert!(args_idx > 0);
            this_arg_idx = Some(a);
            argc = args_idx - 1;
            self.advance();
        }

        let args = self.fill_varg_list(argc)?;

        let this_value = match this_arg_idx {
            Some(reg) => self.get_variable(reg, lit_oc)?,
            None => {
                let env = self.frame_env();
                lex_env::implicit_this_value(&self.heap, env)
            }
        };

        let Some(func) = object_ops::callable_object(&self.heap, &func_value) else {
            return object_ops::throw_standard_error(
                self,
                StandardError::Type,
                "value is not a function",
            );
        };
        let result = function::call_function(self, func, this_value, &args)?;
        self.set_variable(dst, lit_oc, result)?;
        Ok(Flow::Next)
    }

    /// Constructor call (ECMA-262 v5, 11.2.2).
    pub(super) fn op_construct_n(
        &mut self,
        dst: Idx,
        ctor_idx: Idx,
        args_idx: Idx,
    ) -> Completion<Flow> {
        let mark = self.temp_roots_mark();
        let result = self.construct_n_pinned(dst, ctor_idx, args_idx);
        self.unpin_to(mark);
        result
    }

    fn construct_n_pinned(&mut self, dst: Idx, ctor_idx: Idx, args_idx: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        let ctor_value = self.get_variable(ctor_idx, lit_oc)?;
        self.pin(ctor_value.clone());
        self.advance();

        let args = self.fill_varg_list(args_idx)?;

        let ctor = match ctor_value.as_object() {
            Some(obj) if self.heap.get(obj).is_constructor() => obj,
            _ => {
                return object_ops::throw_standard_error(
                    self,
                    StandardError::Type,
                    "value is not a constructor",
                )
            }
        };
        let result = function::construct(self, ctor, &args)?;
        self.set_variable(dst, lit_oc, result)?;
        Ok(Flow::Next)
    }

    /// Array initialiser (ECMA-262 v5, 11.1.4). Holes occupy positions but
    /// define no properties.
    pub(super) fn op_array_decl(&mut self, dst: Idx, args_idx: Idx) -> Completion<Flow> {
        let mark = self.temp_roots_mark();
        let result = self.array_decl_pinned(dst, args_idx);
        self.unpin_to(mark);
        result
    }

    fn array_decl_pinned(&mut self, dst: Idx, args_idx: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        self.advance();
        let values = self.fill_varg_list(args_idx)?;

        let proto = self.realm.array_prototype;
        let mut array = Object::with_data(ClassTag::Array, Some(proto), ObjectData::Array);
        let length_name = self.strings.magic(Magic::Length);
        array.define_data(
            length_name,
            Value::Number(values.len() as f64),
            true,
            false,
            false,
        );
        let array = self.heap.alloc(array);
        for (i, value) in values.iter().enumerate() {
            if value.is_hole() {
                continue;
            }
            let name = self.strings.intern(&i.to_string());
            self.heap
                .get_mut(array)
                .define_data(name, value.clone(), true, true, true);
        }

        self.set_variable(dst, lit_oc, Value::Object(array))?;
        Ok(Flow::Next)
    }

    /// Object initialiser (ECMA-262 v5, 11.1.5). Each property entry runs
    /// the inner loop to evaluate its value, then a property carrier names
    /// the key and the kind.
    pub(super) fn op_obj_decl(&mut self, dst: Idx, props: Idx) -> Completion<Flow> {
        let mark = self.temp_roots_mark();
        let result = self.obj_decl_pinned(dst, props);
        self.unpin_to(mark);
        result
    }

    fn obj_decl_pinned(&mut self, dst: Idx, props: Idx) -> Completion<Flow> {
        let obj_lit_oc = self.pos();
        self.advance();

        let proto = self.realm.object_prototype;
        let obj = self.heap.alloc(Object::new(ClassTag::Object, Some(proto)));
        self.pin(Value::Object(obj));

        for _ in 0..props {
            self.run_loop()?;
            let pos = self.pos();
            let (kind, name_idx, value_idx) = match self.op_at(pos) {
                Op::Meta {
                    kind:
                        kind @ (MetaKind::VargPropData
                        | MetaKind::VargPropGetter
                        | MetaKind::VargPropSetter),
                    a,
                    b,
                } => (kind, a, b),
                other => unreachable!("expected property carrier, found {:?}", other),
            };

            let value = self.get_variable(value_idx, pos)?;
            debug_assert!(self.is_reg_var(name_idx));
            let name_value = self.get_variable(name_idx, pos)?;
            let value_mark = self.pin(value.clone());
            let name = conversion::to_string(self, &name_value);
            self.unpin_to(value_mark);
            let name = name?;

            // A data/accessor conflict on a previously defined key is an
            // early SyntaxError the front end must have rejected.
            let previous = object_ops::get_own_property(&self.heap, obj, &name);
            let strict = self.frame_strict();
            match kind {
                MetaKind::VargPropData => debug_assert!(!previous.as_ref().is_some_and(|p| {
                    p.is_accessor() || (p.is_data() && strict)
                })),
                _ => debug_assert!(!previous.as_ref().is_some_and(|p| p.is_data())),
            }

            let mut desc = PropertyDescriptor {
                enumerable: Some(true),
                configurable: Some(true),
                ..PropertyDescriptor::empty()
            };
            match kind {
                MetaKind::VargPropData => {
                    desc.value = Some(value);
                    desc.writable = Some(true);
                }
                MetaKind::VargPropGetter => match value.as_object() {
                    Some(getter) => desc.get = Some(Some(getter)),
                    None => unreachable!("getter carrier without a function"),
                },
                _ => match value.as_object() {
                    Some(setter) => desc.set = Some(Some(setter)),
                    None => unreachable!("setter carrier without a function"),
                },
            }
            object_ops::define_own_property(self, obj, &name, &desc, false)?;
            self.advance();
        }

        self.set_variable(dst, obj_lit_oc, Value::Object(obj))?;
        Ok(Flow::Next)
    }

    /// Return with expression (ECMA-262 v5, 12.9).
    pub(super) fn op_retval(&mut self, value_idx: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(value_idx, lit_pos)?;
        Err(Abrupt::Return(value))
    }

    /// Engine exit with a success or failure status. Not language-defined;
    /// terminates the program.
    pub(super) fn op_exitval(&mut self, status: Idx) -> Completion<Flow> {
        debug_assert!(status <= 1);
        Err(Abrupt::Exit(status == 0))
    }

    /// Property read (ECMA-262 v5, 11.2.1).
    pub(super) fn op_prop_getter(&mut self, dst: Idx, base_idx: Idx, name_idx: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let base = self.get_variable(base_idx, lit_pos)?;
        let name_value = self.get_variable(name_idx, lit_pos)?;
        conversion::check_object_coercible(self, &base)?;
        let mark = self.pin(base.clone());
        let name = conversion::to_string(self, &name_value);
        self.unpin_to(mark);
        let reference = Reference {
            base,
            name: name?,
            strict: self.frame_strict(),
        };
        let value = object_ops::get_value(self, &reference)?;
        self.set_variable(dst, lit_pos, value)?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Property write (ECMA-262 v5, 11.13.1).
    pub(super) fn op_prop_setter(&mut self, base_idx: Idx, name_idx: Idx, rhs: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let base = self.get_variable(base_idx, lit_pos)?;
        let name_value = self.get_variable(name_idx, lit_pos)?;
        conversion::check_object_coercible(self, &base)?;
        let mark = self.pin(base.clone());
        let name = conversion::to_string(self, &name_value);
        self.unpin_to(mark);
        let reference = Reference {
            base,
            name: name?,
            strict: self.frame_strict(),
        };
        let value = self.get_variable(rhs, lit_pos)?;
        object_ops::put_value(self, &reference, value)?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Logical NOT (ECMA-262 v5, 11.4.9).
    pub(super) fn op_logical_not(&mut self, dst: Idx, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(var, lit_pos)?;
        let result = !conversion::to_boolean(&value);
        self.set_variable(dst, lit_pos, Value::Bool(result))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// The this binding (ECMA-262 v5, 11.1.1).
    pub(super) fn op_this_binding(&mut self, dst: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        self.advance();
        let this = self.frame_this();
        self.set_variable(dst, lit_oc, this)?;
        Ok(Flow::Next)
    }

    /// `with` statement (ECMA-262 v5, 12.10): push an object-bound
    /// environment providing this, run the body, pop on every path.
    pub(super) fn op_with(&mut self, expr: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let expr_value = self.get_variable(expr, lit_pos)?;
        let obj = conversion::to_object(self, &expr_value)?;
        self.advance();

        let old_env = self.frame_env();
        let with_env = lex_env::new_object_env(&mut self.heap, Some(old_env), obj, true);
        self.set_frame_env(with_env);
        let completion = self.run_loop();
        self.set_frame_env(old_env);

        completion?;
        let pos = self.pos();
        match self.op_at(pos) {
            Op::Meta {
                kind: MetaKind::EndWith,
                ..
            } => {
                self.advance();
                Ok(Flow::Next)
            }
            other => unreachable!("expected end_with, found {:?}", other),
        }
    }

    /// `throw` (ECMA-262 v5, 12.13).
    pub(super) fn op_throw_value(&mut self, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(var, lit_pos)?;
        self.advance();
        Err(Abrupt::Throw(value))
    }

    /// `typeof` (ECMA-262 v5, 11.4.3). An unresolvable identifier yields
    /// "undefined" instead of a ReferenceError.
    pub(super) fn op_typeof(&mut self, dst: Idx, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = if self.is_reg_var(var) {
            self.get_variable(var, lit_pos)?
        } else {
            let name = self.literal_string(var, lit_pos);
            let env = self.frame_env();
            match lex_env::resolve_reference_base(&self.heap, env, &name) {
                None => Value::Undefined,
                Some(base) => {
                    let strict = self.frame_strict();
                    lex_env::get_binding_value(self, base, &name, strict)?
                }
            }
        };
        let magic = match &value {
            Value::Undefined => Magic::Undefined,
            Value::Null => Magic::Object,
            Value::Bool(_) => Magic::Boolean,
            Value::Number(_) => Magic::Number,
            Value::String(_) => Magic::String,
            Value::Object(obj) => {
                if self.heap.get(*obj).is_callable() {
                    Magic::Function
                } else {
                    Magic::Object
                }
            }
            Value::Empty | Value::Hole => unreachable!("internal sentinel reached typeof"),
        };
        let tag = self.strings.magic(magic);
        self.set_variable(dst, lit_pos, Value::String(tag))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// `delete` of an identifier (ECMA-262 v5, 11.4.1). Unresolvable names
    /// delete to true; strict deletion is an early error.
    pub(super) fn op_delete_var(&mut self, dst: Idx, name_uid: Idx) -> Completion<Flow> {
        let lit_oc = self.pos();
        self.advance();
        debug_assert!(!self.frame_strict());
        let name = self.literal_string(name_uid, lit_oc);
        let env = self.frame_env();
        let result = match lex_env::resolve_reference_base(&self.heap, env, &name) {
            None => true,
            Some(base) => lex_env::delete_binding(self, base, &name)?,
        };
        self.set_variable(dst, lit_oc, Value::Bool(result))?;
        Ok(Flow::Next)
    }

    /// `delete` of a property (ECMA-262 v5, 11.4.1).
    pub(super) fn op_delete_prop(&mut self, dst: Idx, base_idx: Idx, name_idx: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let base = self.get_variable(base_idx, lit_pos)?;
        let name_value = self.get_variable(name_idx, lit_pos)?;
        conversion::check_object_coercible(self, &base)?;
        let mark = self.pin(base.clone());
        let name = conversion::to_string(self, &name_value);
        self.unpin_to(mark);
        let name = name?;
        let obj = conversion::to_object(self, &base)?;
        let strict = self.frame_strict();
        let result = object_ops::object_delete(self, obj, &name, strict)?;
        self.set_variable(dst, lit_pos, Value::Bool(result))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Meta instructions carry data for the surrounding opcode. The ones that
    /// mark block boundaries or carry variadic payloads produce a meta
    /// completion; the rest are consumed where they are expected and must not
    /// reach the dispatcher.
    pub(super) fn op_meta(&mut self, kind: MetaKind) -> Completion<Flow> {
        match kind {
            MetaKind::Varg
            | MetaKind::VargPropData
            | MetaKind::VargPropGetter
            | MetaKind::VargPropSetter
            | MetaKind::EndWith
            | MetaKind::Catch
            | MetaKind::Finally
            | MetaKind::EndTryCatchFinally => Ok(Flow::Meta),
            // Handled at code entry; a stray marker stops the loop like any
            // other data instruction.
            MetaKind::StrictCode => Ok(Flow::Meta),
            MetaKind::ThisArg | MetaKind::FunctionEnd | MetaKind::CatchExceptionIdentifier => {
                unreachable!("meta {:?} must be consumed by its surrounding opcode", kind)
            }
        }
    }

    /// try/catch/finally (ECMA-262 v5, 12.14). The opcode's counter points at
    /// the first handler marker; markers chain to each other and the region
    /// ends with `end_try_catch_finally`.
    pub(super) fn op_try_block(&mut self, a: Idx, b: Idx) -> Completion<Flow> {
        let try_pos = self.pos();
        let handler_pos = try_pos + decode_counter(a, b);
        self.advance();

        let mut completion = self.run_loop();
        if completion.is_ok() {
            debug_assert_eq!(self.pos(), handler_pos);
        }
        self.set_pos(handler_pos);

        if let Op::Meta {
            kind: MetaKind::Catch,
            a,
            b,
        } = self.op_at(handler_pos)
        {
            let next_marker = handler_pos + decode_counter(a, b);
            let thrown = match &completion {
                Err(Abrupt::Throw(exception)) => Some(exception.clone()),
                _ => None,
            };
            if let Some(exception) = thrown {
                let ident_pos = handler_pos + 1;
                let name = match self.op_at(ident_pos) {
                    Op::Meta {
                        kind: MetaKind::CatchExceptionIdentifier,
                        a,
                        ..
                    } => self.literal_string(a, ident_pos),
                    other => unreachable!("expected catch identifier, found {:?}", other),
                };

                let old_env = self.frame_env();
                let catch_env = lex_env::new_declarative_env(&mut self.heap, Some(old_env));
                self.set_frame_env(catch_env);
                let mut inner = lex_env::create_mutable_binding(self, catch_env, &name, false);
                if inner.is_ok() {
                    inner =
                        lex_env::set_mutable_binding(self, catch_env, &name, exception, false);
                }
                if inner.is_ok() {
                    self.set_pos(ident_pos + 1);
                    inner = self.run_loop();
                }
                self.set_frame_env(old_env);
                if inner.is_ok() {
                    debug_assert_eq!(self.pos(), next_marker);
                }
                completion = inner;
            }
            self.set_pos(next_marker);
        }

        if let Op::Meta {
            kind: MetaKind::Finally,
            a,
            b,
        } = self.op_at(self.pos())
        {
            let end_marker = self.pos() + decode_counter(a, b);
            self.advance();
            match self.run_loop() {
                Ok(()) => debug_assert_eq!(self.pos(), end_marker),
                Err(abrupt) => completion = Err(abrupt),
            }
            self.set_pos(end_marker);
        }

        match self.op_at(self.pos()) {
            Op::Meta {
                kind: MetaKind::EndTryCatchFinally,
                ..
            } => self.advance(),
            other => unreachable!("expected end_try_catch_finally, found {:?}", other),
        }
        completion.map(|()| Flow::Next)
    }

    /// Unconditional jump by a signed instruction offset.
    pub(super) fn op_jmp(&mut self, offset: i32) -> Completion<Flow> {
        let target = self.pos() as i32 + offset;
        self.set_pos(target as u16);
        Ok(Flow::Next)
    }

    /// Conditional jump on the truthiness of a register.
    pub(super) fn op_cond_jmp(&mut self, cond: Idx, offset: i32, jump_if: bool) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(cond, lit_pos)?;
        if conversion::to_boolean(&value) == jump_if {
            let target = lit_pos as i32 + offset;
            self.set_pos(target as u16);
        } else {
            self.advance();
        }
        Ok(Flow::Next)
    }
}
