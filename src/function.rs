//! Function objects: creation, [[Call]] and [[Construct]].

use crate::completion::{Abrupt, Completion};
use crate::conversion;
use crate::heap::ObjectRef;
use crate::interpreter::Interpreter;
use crate::lex_env;
use crate::object::{ClassTag, FunctionData, Object, ObjectData};
use crate::object_ops::{self, StandardError};
use crate::strings::{JsString, Magic};
use crate::value::Value;

/// Create a function object over a bytecode body (ECMA-262 v5, 13.2).
///
/// The function gets the usual `length` property and a fresh prototype
/// object whose `constructor` points back at it.
pub fn create_function_object(
    vm: &mut Interpreter,
    formals: Vec<JsString>,
    scope: ObjectRef,
    strict: bool,
    code_pos: u16,
) -> ObjectRef {
    let arity = formals.len();
    let fn_proto = vm.realm.function_prototype;
    let mut func_obj = Object::with_data(
        ClassTag::Function,
        Some(fn_proto),
        ObjectData::Function(FunctionData {
            code_pos,
            formals,
            scope,
            strict,
        }),
    );
    let length_name = vm.strings.magic(Magic::Length);
    func_obj.define_data(length_name, Value::Number(arity as f64), false, false, false);
    let func = vm.heap.alloc(func_obj);

    let obj_proto = vm.realm.object_prototype;
    let mut proto = Object::new(ClassTag::Object, Some(obj_proto));
    let ctor_name = vm.strings.magic(Magic::Constructor);
    proto.define_data(ctor_name, Value::Object(func), true, false, true);
    let proto_ref = vm.heap.alloc(proto);

    let proto_name = vm.strings.magic(Magic::Prototype);
    vm.heap
        .get_mut(func)
        .define_data(proto_name, Value::Object(proto_ref), true, false, false);
    func
}

/// The non-strict arguments object (ECMA-262 v5, 10.6, simple form).
fn create_arguments_object(
    vm: &mut Interpreter,
    callee: ObjectRef,
    args: &[Value],
) -> ObjectRef {
    let proto = vm.realm.object_prototype;
    let mut obj = Object::with_data(ClassTag::Arguments, Some(proto), ObjectData::Arguments);
    let length_name = vm.strings.magic(Magic::Length);
    obj.define_data(
        length_name,
        Value::Number(args.len() as f64),
        true,
        false,
        true,
    );
    let callee_name = vm.strings.magic(Magic::Callee);
    obj.define_data(callee_name, Value::Object(callee), true, false, true);
    for (i, arg) in args.iter().enumerate() {
        let name = vm.strings.intern(&i.to_string());
        obj.define_data(name, arg.clone(), true, true, true);
    }
    vm.heap.alloc(obj)
}

/// [[Call]] (ECMA-262 v5, 13.2.1): bind this, instantiate the declaration
/// environment and run the body.
pub fn call_function(
    vm: &mut Interpreter,
    func: ObjectRef,
    this: Value,
    args: &[Value],
) -> Completion<Value> {
    if vm.call_depth() >= vm.config.max_call_depth {
        return object_ops::throw_standard_error(
            vm,
            StandardError::Range,
            "maximum call depth exceeded",
        );
    }

    let data = match &vm.heap.get(func).data {
        ObjectData::Native(native) => {
            let f = native.func;
            return f(vm, this, args);
        }
        ObjectData::Function(data) => data.clone(),
        _ => {
            return object_ops::throw_standard_error(
                vm,
                StandardError::Type,
                "object is not callable",
            )
        }
    };

    // Entering function code (10.4.3): non-strict callees coerce a missing or
    // primitive this value.
    let this_binding = if data.strict {
        this
    } else {
        match this {
            Value::Undefined | Value::Null => Value::Object(vm.realm.global),
            Value::Object(_) => this,
            primitive => Value::Object(conversion::to_object(vm, &primitive)?),
        }
    };

    let env = lex_env::new_declarative_env(&mut vm.heap, Some(data.scope));

    // Declaration binding instantiation (10.5): formals first, later
    // duplicates win.
    for (i, name) in data.formals.iter().enumerate() {
        let value = args.get(i).cloned().unwrap_or(Value::Undefined);
        if !lex_env::has_binding(&vm.heap, env, name) {
            lex_env::create_mutable_binding(vm, env, name, false)?;
        }
        lex_env::set_mutable_binding(vm, env, name, value, data.strict)?;
    }

    let arguments_name = vm.strings.magic(Magic::Arguments);
    if !lex_env::has_binding(&vm.heap, env, &arguments_name) {
        let args_obj = create_arguments_object(vm, func, args);
        lex_env::create_mutable_binding(vm, env, &arguments_name, false)?;
        lex_env::set_mutable_binding(vm, env, &arguments_name, Value::Object(args_obj), false)?;
    }

    match vm.run_from_position(data.code_pos, this_binding, env, data.strict, false) {
        Ok(()) => Ok(Value::Undefined),
        Err(Abrupt::Return(value)) => Ok(value),
        Err(other) => Err(other),
    }
}

/// [[Construct]] (ECMA-262 v5, 13.2.2).
pub fn construct(vm: &mut Interpreter, ctor: ObjectRef, args: &[Value]) -> Completion<Value> {
    let proto_name = vm.strings.magic(Magic::Prototype);
    let proto_val = object_ops::object_get(vm, ctor, &proto_name)?;
    let proto = proto_val
        .as_object()
        .unwrap_or(vm.realm.object_prototype);
    let obj = vm.heap.alloc(Object::new(ClassTag::Object, Some(proto)));

    let mark = vm.pin(Value::Object(obj));
    let result = call_function(vm, ctor, Value::Object(obj), args);
    vm.unpin_to(mark);

    match result? {
        returned @ Value::Object(_) => Ok(returned),
        _ => Ok(Value::Object(obj)),
    }
}
