//! The minimal built-in realm: core prototypes, the global object and the
//! handful of Object built-ins the engine itself leans on.

use crate::completion::Completion;
use crate::conversion;
use crate::heap::{Heap, ObjectRef};
use crate::interpreter::Interpreter;
use crate::object::{ClassTag, NativeFunction, Object, ObjectData};
use crate::object_ops::{self, StandardError};
use crate::strings::{JsString, Magic, StringTable};
use crate::value::Value;

/// Root objects of a realm. All of them are GC roots.
#[derive(Debug, Clone, Copy)]
pub struct Realm {
    pub global: ObjectRef,
    pub global_env: ObjectRef,
    pub object_prototype: ObjectRef,
    pub function_prototype: ObjectRef,
    pub array_prototype: ObjectRef,
    pub error_prototype: ObjectRef,
}

impl Realm {
    pub(crate) fn trace(&self, out: &mut Vec<ObjectRef>) {
        out.push(self.global);
        out.push(self.global_env);
        out.push(self.object_prototype);
        out.push(self.function_prototype);
        out.push(self.array_prototype);
        out.push(self.error_prototype);
    }
}

fn new_native(
    heap: &mut Heap,
    function_prototype: ObjectRef,
    name: &'static str,
    func: crate::object::NativeFn,
) -> ObjectRef {
    let mut obj = Object::with_data(
        ClassTag::Function,
        Some(function_prototype),
        ObjectData::Native(NativeFunction { name, func }),
    );
    obj.is_builtin = true;
    heap.alloc(obj)
}

fn define_method(
    heap: &mut Heap,
    strings: &mut StringTable,
    target: ObjectRef,
    function_prototype: ObjectRef,
    name: &'static str,
    func: crate::object::NativeFn,
) {
    let f = new_native(heap, function_prototype, name, func);
    let name_str = strings.intern(name);
    heap.get_mut(target)
        .define_data(name_str, Value::Object(f), true, false, true);
}

/// Build the realm: prototypes, global object and global environment.
pub fn create_realm(heap: &mut Heap, strings: &mut StringTable) -> Realm {
    let mut object_prototype_obj = Object::new(ClassTag::Object, None);
    object_prototype_obj.is_builtin = true;
    let object_prototype = heap.alloc(object_prototype_obj);

    let mut function_prototype_obj = Object::with_data(
        ClassTag::Function,
        Some(object_prototype),
        ObjectData::Native(NativeFunction {
            name: "",
            func: native_function_prototype,
        }),
    );
    function_prototype_obj.is_builtin = true;
    let function_prototype = heap.alloc(function_prototype_obj);

    let mut array_prototype_obj =
        Object::with_data(ClassTag::Array, Some(object_prototype), ObjectData::Array);
    array_prototype_obj.is_builtin = true;
    let length_name = strings.magic(Magic::Length);
    array_prototype_obj.define_data(length_name, Value::Number(0.0), true, false, false);
    let array_prototype = heap.alloc(array_prototype_obj);

    let mut error_prototype_obj = Object::new(ClassTag::Error, Some(object_prototype));
    error_prototype_obj.is_builtin = true;
    let name_str = strings.magic(Magic::Name);
    let error_name = strings.intern("Error");
    error_prototype_obj.define_data(name_str, Value::String(error_name), true, false, true);
    let message_str = strings.magic(Magic::Message);
    let empty = strings.intern("");
    error_prototype_obj.define_data(message_str, Value::String(empty), true, false, true);
    let error_prototype = heap.alloc(error_prototype_obj);

    let mut global_obj = Object::new(ClassTag::Object, Some(object_prototype));
    global_obj.is_builtin = true;
    let global = heap.alloc(global_obj);
    let global_env = heap.alloc(Object::new_object_env(None, global, false));

    // Object.prototype methods.
    define_method(
        heap,
        strings,
        object_prototype,
        function_prototype,
        "toString",
        native_object_proto_to_string,
    );
    define_method(
        heap,
        strings,
        object_prototype,
        function_prototype,
        "valueOf",
        native_object_proto_value_of,
    );
    define_method(
        heap,
        strings,
        object_prototype,
        function_prototype,
        "hasOwnProperty",
        native_object_proto_has_own_property,
    );

    // The Object constructor and its utility functions.
    let object_ctor = new_native(heap, function_prototype, "Object", native_object_constructor);
    let proto_name = strings.magic(Magic::Prototype);
    heap.get_mut(object_ctor).define_data(
        proto_name,
        Value::Object(object_prototype),
        false,
        false,
        false,
    );
    let ctor_name = strings.magic(Magic::Constructor);
    heap.get_mut(object_prototype).define_data(
        ctor_name,
        Value::Object(object_ctor),
        true,
        false,
        true,
    );
    define_method(
        heap,
        strings,
        object_ctor,
        function_prototype,
        "defineProperty",
        native_object_define_property,
    );
    define_method(
        heap,
        strings,
        object_ctor,
        function_prototype,
        "getOwnPropertyDescriptor",
        native_object_get_own_property_descriptor,
    );

    // Global bindings.
    let object_name = strings.intern("Object");
    heap.get_mut(global)
        .define_data(object_name, Value::Object(object_ctor), true, false, true);
    let undefined_name = strings.magic(Magic::Undefined);
    heap.get_mut(global)
        .define_data(undefined_name, Value::Undefined, false, false, false);
    let nan_name = strings.magic(Magic::Nan);
    heap.get_mut(global)
        .define_data(nan_name, Value::Number(f64::NAN), false, false, false);
    let infinity_name = strings.magic(Magic::Infinity);
    heap.get_mut(global).define_data(
        infinity_name,
        Value::Number(f64::INFINITY),
        false,
        false,
        false,
    );

    Realm {
        global,
        global_env,
        object_prototype,
        function_prototype,
        array_prototype,
        error_prototype,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Native implementations
// ═══════════════════════════════════════════════════════════════════════════

/// Function.prototype is callable and returns undefined.
fn native_function_prototype(
    _vm: &mut Interpreter,
    _this: Value,
    _args: &[Value],
) -> Completion<Value> {
    Ok(Value::Undefined)
}

/// Object(value) (ECMA-262 v5, 15.2.1.1).
fn native_object_constructor(
    vm: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Completion<Value> {
    match args.first() {
        None | Some(Value::Undefined) | Some(Value::Null) => {
            let proto = vm.realm.object_prototype;
            Ok(Value::Object(
                vm.heap.alloc(Object::new(ClassTag::Object, Some(proto))),
            ))
        }
        Some(value) => Ok(Value::Object(conversion::to_object(vm, value)?)),
    }
}

/// Object.defineProperty (ECMA-262 v5, 15.2.3.6).
fn native_object_define_property(
    vm: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Completion<Value> {
    let target = args.first().cloned().unwrap_or(Value::Undefined);
    let Some(obj) = target.as_object() else {
        return object_ops::throw_standard_error(
            vm,
            StandardError::Type,
            "Object.defineProperty called on non-object",
        );
    };
    let name_arg = args.get(1).cloned().unwrap_or(Value::Undefined);
    let name = conversion::to_string(vm, &name_arg)?;
    let desc_arg = args.get(2).cloned().unwrap_or(Value::Undefined);
    let desc = object_ops::to_property_descriptor(vm, &desc_arg)?;
    object_ops::define_own_property(vm, obj, &name, &desc, true)?;
    Ok(target)
}

/// Object.getOwnPropertyDescriptor (ECMA-262 v5, 15.2.3.3).
fn native_object_get_own_property_descriptor(
    vm: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Completion<Value> {
    let target = args.first().cloned().unwrap_or(Value::Undefined);
    let Some(obj) = target.as_object() else {
        return object_ops::throw_standard_error(
            vm,
            StandardError::Type,
            "Object.getOwnPropertyDescriptor called on non-object",
        );
    };
    let name_arg = args.get(1).cloned().unwrap_or(Value::Undefined);
    let name = conversion::to_string(vm, &name_arg)?;
    match object_ops::get_own_property(&vm.heap, obj, &name) {
        None => Ok(Value::Undefined),
        Some(prop) => {
            let desc = object_ops::descriptor_of(&prop);
            Ok(Value::Object(object_ops::from_property_descriptor(
                vm, &desc,
            )))
        }
    }
}

/// Object.prototype.toString (ECMA-262 v5, 15.2.4.2).
fn native_object_proto_to_string(
    vm: &mut Interpreter,
    this: Value,
    _args: &[Value],
) -> Completion<Value> {
    let tag = match &this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        other => {
            let obj = conversion::to_object(vm, other)?;
            vm.heap.get(obj).class.name()
        }
    };
    Ok(Value::String(JsString::new(&format!("[object {}]", tag))))
}

/// Object.prototype.valueOf. Primitive wrappers yield their wrapped value so
/// ToPrimitive behaves without per-type prototypes.
fn native_object_proto_value_of(
    vm: &mut Interpreter,
    this: Value,
    _args: &[Value],
) -> Completion<Value> {
    let obj = conversion::to_object(vm, &this)?;
    if let ObjectData::PrimitiveWrapper(primitive) = &vm.heap.get(obj).data {
        return Ok(primitive.clone());
    }
    Ok(Value::Object(obj))
}

/// Object.prototype.hasOwnProperty (ECMA-262 v5, 15.2.4.5).
fn native_object_proto_has_own_property(
    vm: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Completion<Value> {
    let name_arg = args.first().cloned().unwrap_or(Value::Undefined);
    let name = conversion::to_string(vm, &name_arg)?;
    let obj = conversion::to_object(vm, &this)?;
    let found = object_ops::get_own_property(&vm.heap, obj, &name).is_some();
    Ok(Value::Bool(found))
}
