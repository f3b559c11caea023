//! Lexical environment operations (ECMA-262 v5, 10.2.1).
//!
//! Environments are heap objects whose discriminator says "lexical
//! environment". Declarative environments store bindings as named data
//! properties directly on themselves; object-bound environments delegate to a
//! binding object and may provide it as the implicit this value.

use crate::completion::Completion;
use crate::heap::{Heap, ObjectRef};
use crate::interpreter::Interpreter;
use crate::object::{LexEnvData, Object, ObjectData, Property, PropertyDescriptor};
use crate::object_ops::{self, StandardError};
use crate::strings::JsString;
use crate::value::Value;

fn env_data(heap: &Heap, env: ObjectRef) -> &LexEnvData {
    match &heap.get(env).data {
        ObjectData::LexEnv(data) => data,
        _ => unreachable!("object is not a lexical environment"),
    }
}

/// Outer environment reference.
pub fn outer_env(heap: &Heap, env: ObjectRef) -> Option<ObjectRef> {
    env_data(heap, env).outer()
}

/// HasBinding: presence in this environment only, without the outer chain.
pub fn has_binding(heap: &Heap, env: ObjectRef, name: &JsString) -> bool {
    match env_data(heap, env) {
        LexEnvData::Declarative { .. } => heap.get(env).get_own(name).is_some(),
        LexEnvData::ObjectBound { binding, .. } => {
            object_ops::get_property(heap, *binding, name).is_some()
        }
    }
}

/// CreateMutableBinding with deletability `deletable`.
pub fn create_mutable_binding(
    vm: &mut Interpreter,
    env: ObjectRef,
    name: &JsString,
    deletable: bool,
) -> Completion<()> {
    match env_data(&vm.heap, env).clone() {
        LexEnvData::Declarative { .. } => {
            vm.heap.get_mut(env).define_data(
                name.clone(),
                Value::Undefined,
                true,
                false,
                deletable,
            );
            Ok(())
        }
        LexEnvData::ObjectBound { binding, .. } => {
            let desc = PropertyDescriptor {
                value: Some(Value::Undefined),
                writable: Some(true),
                enumerable: Some(true),
                configurable: Some(deletable),
                ..PropertyDescriptor::empty()
            };
            object_ops::define_own_property(vm, binding, name, &desc, true)?;
            Ok(())
        }
    }
}

/// SetMutableBinding with strictness `strict`.
pub fn set_mutable_binding(
    vm: &mut Interpreter,
    env: ObjectRef,
    name: &JsString,
    value: Value,
    strict: bool,
) -> Completion<()> {
    match env_data(&vm.heap, env).clone() {
        LexEnvData::Declarative { .. } => {
            let writable = match vm.heap.get(env).get_own(name) {
                Some(prop) => prop.writable(),
                None => unreachable!("binding resolved before assignment"),
            };
            if writable {
                if let Some(Property::Data { value: stored, .. }) =
                    vm.heap.get_mut(env).properties.get_mut(name)
                {
                    *stored = value;
                }
                Ok(())
            } else if strict {
                object_ops::throw_standard_error(
                    vm,
                    StandardError::Type,
                    "assignment to constant binding",
                )
            } else {
                Ok(())
            }
        }
        LexEnvData::ObjectBound { binding, .. } => {
            object_ops::object_put(vm, binding, name, value, strict)
        }
    }
}

/// GetBindingValue with strictness `strict`.
pub fn get_binding_value(
    vm: &mut Interpreter,
    env: ObjectRef,
    name: &JsString,
    strict: bool,
) -> Completion<Value> {
    match env_data(&vm.heap, env).clone() {
        LexEnvData::Declarative { .. } => {
            let prop = match vm.heap.get(env).get_own(name) {
                Some(prop) => prop.clone(),
                None => unreachable!("binding resolved before read"),
            };
            match prop {
                Property::Data {
                    value, writable, ..
                } => {
                    if !writable && value.is_empty() {
                        // Uninitialised immutable binding.
                        if strict {
                            object_ops::throw_standard_error(
                                vm,
                                StandardError::Reference,
                                "binding is not initialised",
                            )
                        } else {
                            Ok(Value::Undefined)
                        }
                    } else {
                        Ok(value)
                    }
                }
                Property::Accessor { .. } => {
                    unreachable!("declarative binding stored as accessor")
                }
            }
        }
        LexEnvData::ObjectBound { binding, .. } => {
            if object_ops::get_property(&vm.heap, binding, name).is_none() {
                if strict {
                    object_ops::throw_standard_error(
                        vm,
                        StandardError::Reference,
                        "binding is not defined",
                    )
                } else {
                    Ok(Value::Undefined)
                }
            } else {
                object_ops::object_get(vm, binding, name)
            }
        }
    }
}

/// DeleteBinding.
pub fn delete_binding(
    vm: &mut Interpreter,
    env: ObjectRef,
    name: &JsString,
) -> Completion<bool> {
    match env_data(&vm.heap, env).clone() {
        LexEnvData::Declarative { .. } => match vm.heap.get(env).get_own(name) {
            None => Ok(true),
            Some(prop) if !prop.configurable() => Ok(false),
            Some(_) => {
                vm.heap.get_mut(env).remove_property(name);
                Ok(true)
            }
        },
        LexEnvData::ObjectBound { binding, .. } => {
            object_ops::object_delete(vm, binding, name, false)
        }
    }
}

/// ImplicitThisValue: the binding object of a provide-this object-bound
/// environment, undefined otherwise.
pub fn implicit_this_value(heap: &Heap, env: ObjectRef) -> Value {
    match env_data(heap, env) {
        LexEnvData::Declarative { .. } => Value::Undefined,
        LexEnvData::ObjectBound {
            binding,
            provide_this,
            ..
        } => {
            if *provide_this {
                Value::Object(*binding)
            } else {
                Value::Undefined
            }
        }
    }
}

/// CreateImmutableBinding: a non-writable binding whose value is the `empty`
/// sentinel until initialised.
pub fn create_immutable_binding(heap: &mut Heap, env: ObjectRef, name: &JsString) {
    debug_assert!(matches!(
        env_data(heap, env),
        LexEnvData::Declarative { .. }
    ));
    heap.get_mut(env)
        .define_data(name.clone(), Value::Empty, false, false, false);
}

/// InitializeImmutableBinding: assign exactly once while the stored value is
/// still the `empty` sentinel.
pub fn initialize_immutable_binding(
    heap: &mut Heap,
    env: ObjectRef,
    name: &JsString,
    value: Value,
) {
    match heap.get_mut(env).properties.get_mut(name) {
        Some(Property::Data {
            value: stored,
            writable: false,
            ..
        }) => {
            debug_assert!(stored.is_empty());
            *stored = value;
        }
        _ => unreachable!("immutable binding missing at initialisation"),
    }
}

/// Walk the environment chain for the nearest environment holding `name`.
pub fn resolve_reference_base(
    heap: &Heap,
    env: ObjectRef,
    name: &JsString,
) -> Option<ObjectRef> {
    let mut current = Some(env);
    while let Some(e) = current {
        if has_binding(heap, e, name) {
            return Some(e);
        }
        current = outer_env(heap, e);
    }
    None
}

/// Allocate a fresh declarative environment.
pub fn new_declarative_env(heap: &mut Heap, outer: Option<ObjectRef>) -> ObjectRef {
    heap.alloc(Object::new_decl_env(outer))
}

/// Allocate a fresh object-bound environment over `binding`.
pub fn new_object_env(
    heap: &mut Heap,
    outer: Option<ObjectRef>,
    binding: ObjectRef,
    provide_this: bool,
) -> ObjectRef {
    heap.alloc(Object::new_object_env(outer, binding, provide_this))
}
