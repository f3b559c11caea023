//! General object operations (ECMA-262 v5, 8.12) and property references.

use crate::completion::{Abrupt, Completion};
use crate::conversion::{self, PreferredType};
use crate::function;
use crate::heap::{Heap, ObjectRef};
use crate::interpreter::Interpreter;
use crate::numbers;
use crate::object::{ClassTag, Object, Property, PropertyDescriptor};
use crate::strings::{JsString, Magic};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════════
// Standard errors
// ═══════════════════════════════════════════════════════════════════════════

/// Kinds of standard error objects the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardError {
    Type,
    Reference,
    Range,
    Syntax,
    Uri,
    Eval,
}

impl StandardError {
    pub fn name(self) -> &'static str {
        match self {
            StandardError::Type => "TypeError",
            StandardError::Reference => "ReferenceError",
            StandardError::Range => "RangeError",
            StandardError::Syntax => "SyntaxError",
            StandardError::Uri => "URIError",
            StandardError::Eval => "EvalError",
        }
    }
}

/// Construct a fresh standard error object.
pub fn new_standard_error(vm: &mut Interpreter, kind: StandardError, message: &str) -> Value {
    let proto = vm.realm.error_prototype;
    let mut obj = Object::new(ClassTag::Error, Some(proto));
    let name_str = vm.strings.magic(Magic::Name);
    let name_val = vm.strings.intern(kind.name());
    obj.define_data(name_str, Value::String(name_val), true, false, true);
    let message_str = vm.strings.magic(Magic::Message);
    let message_val = vm.strings.intern(message);
    obj.define_data(message_str, Value::String(message_val), true, false, true);
    Value::Object(vm.heap.alloc(obj))
}

/// Raise a standard error as a throw completion.
pub fn throw_standard_error<T>(
    vm: &mut Interpreter,
    kind: StandardError,
    message: &str,
) -> Completion<T> {
    let err = new_standard_error(vm, kind, message);
    Err(Abrupt::Throw(err))
}

fn reject(vm: &mut Interpreter, throw: bool, message: &str) -> Completion<bool> {
    if throw {
        throw_standard_error(vm, StandardError::Type, message)
    } else {
        Ok(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property lookup
// ═══════════════════════════════════════════════════════════════════════════

/// [[GetOwnProperty]] (8.12.1): the own property node, if present.
pub fn get_own_property(heap: &Heap, obj: ObjectRef, name: &JsString) -> Option<Property> {
    heap.get(obj).get_own(name).cloned()
}

/// [[GetProperty]] (8.12.2): own property or the nearest one on the
/// prototype chain. The chain is acyclic by construction.
pub fn get_property(heap: &Heap, obj: ObjectRef, name: &JsString) -> Option<Property> {
    let mut current = obj;
    loop {
        if let Some(prop) = heap.get(current).get_own(name) {
            return Some(prop.clone());
        }
        match heap.get(current).prototype {
            Some(proto) => current = proto,
            None => return None,
        }
    }
}

/// [[Get]] (8.12.3).
pub fn object_get(vm: &mut Interpreter, obj: ObjectRef, name: &JsString) -> Completion<Value> {
    match get_property(&vm.heap, obj, name) {
        None => Ok(Value::Undefined),
        Some(Property::Data { value, .. }) => Ok(value),
        Some(Property::Accessor { get: Some(getter), .. }) => {
            function::call_function(vm, getter, Value::Object(obj), &[])
        }
        Some(Property::Accessor { get: None, .. }) => Ok(Value::Undefined),
    }
}

/// [[CanPut]] (8.12.4).
pub fn can_put(heap: &Heap, obj: ObjectRef, name: &JsString) -> bool {
    if let Some(own) = heap.get(obj).get_own(name) {
        return match own {
            Property::Accessor { set, .. } => set.is_some(),
            Property::Data { writable, .. } => *writable,
        };
    }
    let extensible = heap.get(obj).extensible;
    let Some(proto) = heap.get(obj).prototype else {
        return extensible;
    };
    match get_property(heap, proto, name) {
        None => extensible,
        Some(Property::Accessor { set, .. }) => set.is_some(),
        Some(Property::Data { writable, .. }) => extensible && writable,
    }
}

/// [[Put]] (8.12.5).
pub fn object_put(
    vm: &mut Interpreter,
    obj: ObjectRef,
    name: &JsString,
    value: Value,
    throw: bool,
) -> Completion<()> {
    // 1.
    if !can_put(&vm.heap, obj, name) {
        if throw {
            return throw_standard_error(
                vm,
                StandardError::Type,
                "cannot assign to read-only property",
            );
        }
        return Ok(());
    }

    // 2., 3. An own data property takes the fast value-only path.
    if let Some(Property::Data { .. }) = get_own_property(&vm.heap, obj, name) {
        let desc = PropertyDescriptor {
            value: Some(value),
            ..PropertyDescriptor::empty()
        };
        define_own_property(vm, obj, name, &desc, throw)?;
        return Ok(());
    }

    // 4., 5. An inherited accessor routes through its setter.
    if let Some(Property::Accessor { set: Some(setter), .. }) = get_property(&vm.heap, obj, name)
    {
        function::call_function(vm, setter, Value::Object(obj), &[value])?;
        return Ok(());
    }

    // 6. Fresh property with default attributes.
    let desc = PropertyDescriptor {
        value: Some(value),
        writable: Some(true),
        enumerable: Some(true),
        configurable: Some(true),
        ..PropertyDescriptor::empty()
    };
    define_own_property(vm, obj, name, &desc, throw)?;
    Ok(())
}

/// [[Delete]] (8.12.7).
pub fn object_delete(
    vm: &mut Interpreter,
    obj: ObjectRef,
    name: &JsString,
    throw: bool,
) -> Completion<bool> {
    let Some(prop) = get_own_property(&vm.heap, obj, name) else {
        return Ok(true);
    };
    if prop.configurable() {
        vm.heap.get_mut(obj).remove_property(name);
        Ok(true)
    } else if throw {
        throw_standard_error(vm, StandardError::Type, "property is non-configurable")
    } else {
        Ok(false)
    }
}

/// [[DefaultValue]] (8.12.8).
///
/// With no hint, Date objects default to string and everything else to
/// number.
pub fn default_value(
    vm: &mut Interpreter,
    obj: ObjectRef,
    hint: PreferredType,
) -> Completion<Value> {
    let hint = match hint {
        PreferredType::Default => {
            if vm.heap.get(obj).class == ClassTag::Date {
                PreferredType::String
            } else {
                PreferredType::Number
            }
        }
        other => other,
    };

    for attempt in 0..2 {
        let magic = if (attempt == 0) == (hint == PreferredType::String) {
            Magic::ToString
        } else {
            Magic::ValueOf
        };
        let name = vm.strings.magic(magic);
        let candidate = object_get(vm, obj, &name)?;
        if let Some(func) = callable_object(&vm.heap, &candidate) {
            let result = function::call_function(vm, func, Value::Object(obj), &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }

    throw_standard_error(vm, StandardError::Type, "cannot convert object to primitive")
}

/// The object handle if `value` is a callable object.
pub fn callable_object(heap: &Heap, value: &Value) -> Option<ObjectRef> {
    let obj = value.as_object()?;
    if heap.get(obj).is_callable() {
        Some(obj)
    } else {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// [[DefineOwnProperty]]
// ═══════════════════════════════════════════════════════════════════════════

/// [[DefineOwnProperty]] (8.12.9), dispatching the Array special case.
pub fn define_own_property(
    vm: &mut Interpreter,
    obj: ObjectRef,
    name: &JsString,
    desc: &PropertyDescriptor,
    throw: bool,
) -> Completion<bool> {
    if vm.heap.get(obj).class == ClassTag::Array {
        array_define_own_property(vm, obj, name, desc, throw)
    } else {
        general_define_own_property(vm, obj, name, desc, throw)
    }
}

fn general_define_own_property(
    vm: &mut Interpreter,
    obj: ObjectRef,
    name: &JsString,
    desc: &PropertyDescriptor,
    throw: bool,
) -> Completion<bool> {
    let desc_is_data = desc.is_data_descriptor();
    let desc_is_accessor = desc.is_accessor_descriptor();
    let desc_is_generic = desc.is_generic_descriptor();
    debug_assert!(!(desc_is_data && desc_is_accessor));

    // 1., 2.
    let current = get_own_property(&vm.heap, obj, name);
    let extensible = vm.heap.get(obj).extensible;

    let Some(mut current) = current else {
        // 3.
        if !extensible {
            return reject(vm, throw, "object is not extensible");
        }
        // 4.
        let prop = if desc_is_generic || desc_is_data {
            Property::Data {
                value: desc.value.clone().unwrap_or(Value::Undefined),
                writable: desc.writable.unwrap_or(false),
                enumerable: desc.enumerable.unwrap_or(false),
                configurable: desc.configurable.unwrap_or(false),
            }
        } else {
            Property::Accessor {
                get: desc.get.flatten(),
                set: desc.set.flatten(),
                enumerable: desc.enumerable.unwrap_or(false),
                configurable: desc.configurable.unwrap_or(false),
            }
        };
        vm.heap.get_mut(obj).properties.insert(name.clone(), prop);
        return Ok(true);
    };

    // 5.
    if desc_is_generic && desc.enumerable.is_none() && desc.configurable.is_none() {
        return Ok(true);
    }

    // 6. Nothing to do when every requested field already holds.
    let current_is_data = current.is_data();
    let mut unchanged = true;
    if let Some(v) = &desc.value {
        match &current {
            Property::Data { value, .. } if conversion::same_value(v, value) => {}
            _ => unchanged = false,
        }
    }
    if let Some(w) = desc.writable {
        if !current_is_data || w != current.writable() {
            unchanged = false;
        }
    }
    if let Some(g) = desc.get {
        match &current {
            Property::Accessor { get, .. } if g == *get => {}
            _ => unchanged = false,
        }
    }
    if let Some(s) = desc.set {
        match &current {
            Property::Accessor { set, .. } if s == *set => {}
            _ => unchanged = false,
        }
    }
    if let Some(e) = desc.enumerable {
        if e != current.enumerable() {
            unchanged = false;
        }
    }
    if let Some(c) = desc.configurable {
        if c != current.configurable() {
            unchanged = false;
        }
    }
    if unchanged {
        return Ok(true);
    }

    // 7.
    if !current.configurable() {
        if desc.configurable == Some(true) {
            return reject(vm, throw, "cannot make property configurable");
        }
        if desc
            .enumerable
            .is_some_and(|e| e != current.enumerable())
        {
            return reject(vm, throw, "cannot change enumerability");
        }
    }

    if desc_is_generic {
        // 8. No further validation.
    } else if desc_is_data != current_is_data {
        // 9. Kind switch, preserving enumerable and configurable.
        if !current.configurable() {
            return reject(vm, throw, "cannot redefine non-configurable property");
        }
        current = if current_is_data {
            Property::Accessor {
                get: None,
                set: None,
                enumerable: current.enumerable(),
                configurable: current.configurable(),
            }
        } else {
            Property::Data {
                value: Value::Undefined,
                writable: false,
                enumerable: current.enumerable(),
                configurable: current.configurable(),
            }
        };
    } else if desc_is_data {
        // 10. Data to data.
        if !current.configurable() && !current.writable() {
            if desc.writable == Some(true) {
                return reject(vm, throw, "cannot make property writable");
            }
            if let (Some(v), Property::Data { value, .. }) = (&desc.value, &current) {
                if !conversion::same_value(v, value) {
                    return reject(vm, throw, "cannot change read-only property");
                }
            }
        }
    } else {
        // 11. Accessor to accessor.
        if !current.configurable() {
            if let Property::Accessor { get, set, .. } = &current {
                if desc.get.is_some_and(|g| g != *get) || desc.set.is_some_and(|s| s != *set) {
                    return reject(vm, throw, "cannot redefine accessor");
                }
            }
        }
    }

    // 12. Apply the requested fields; the rest stay untouched.
    match &mut current {
        Property::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => {
            if let Some(v) = &desc.value {
                *value = v.clone();
            }
            if let Some(w) = desc.writable {
                *writable = w;
            }
            if let Some(e) = desc.enumerable {
                *enumerable = e;
            }
            if let Some(c) = desc.configurable {
                *configurable = c;
            }
        }
        Property::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => {
            if let Some(g) = desc.get {
                *get = g;
            }
            if let Some(s) = desc.set {
                *set = s;
            }
            if let Some(e) = desc.enumerable {
                *enumerable = e;
            }
            if let Some(c) = desc.configurable {
                *configurable = c;
            }
        }
    }
    vm.heap.get_mut(obj).properties.insert(name.clone(), current);
    Ok(true)
}

/// Array [[DefineOwnProperty]] (15.4.5.1), reduced to the length and index
/// interplay this subset needs.
fn array_define_own_property(
    vm: &mut Interpreter,
    obj: ObjectRef,
    name: &JsString,
    desc: &PropertyDescriptor,
    throw: bool,
) -> Completion<bool> {
    let length_str = vm.strings.magic(Magic::Length);
    let (old_len, len_writable) = match get_own_property(&vm.heap, obj, &length_str) {
        Some(Property::Data { value, writable, .. }) => (
            numbers::to_uint32(value.as_number().unwrap_or(0.0)),
            writable,
        ),
        _ => unreachable!("array object without length property"),
    };

    if *name == length_str {
        let Some(v) = &desc.value else {
            return general_define_own_property(vm, obj, name, desc, throw);
        };
        let num = conversion::to_number(vm, v)?;
        let new_len = numbers::to_uint32(num);
        if new_len as f64 != num {
            return throw_standard_error(vm, StandardError::Range, "invalid array length");
        }
        let mut len_desc = desc.clone();
        len_desc.value = Some(Value::Number(new_len as f64));
        if new_len >= old_len {
            return general_define_own_property(vm, obj, &length_str, &len_desc, throw);
        }
        if !len_writable {
            return reject(vm, throw, "length is not writable");
        }
        if !general_define_own_property(vm, obj, &length_str, &len_desc, throw)? {
            return Ok(false);
        }
        // Shrinking deletes the elements past the new length, highest first.
        let mut index = old_len;
        while index > new_len {
            index -= 1;
            let index_name = vm.strings.intern(&index.to_string());
            if !object_delete(vm, obj, &index_name, false)? {
                let fix = PropertyDescriptor {
                    value: Some(Value::Number((index + 1) as f64)),
                    ..PropertyDescriptor::empty()
                };
                general_define_own_property(vm, obj, &length_str, &fix, false)?;
                return reject(vm, throw, "cannot delete array element");
            }
        }
        return Ok(true);
    }

    if let Some(index) = numbers::array_index_of(name.as_str()) {
        if index >= old_len && !len_writable {
            return reject(vm, throw, "length is not writable");
        }
        if !general_define_own_property(vm, obj, name, desc, false)? {
            return reject(vm, throw, "cannot define array element");
        }
        if index >= old_len {
            let fix = PropertyDescriptor {
                value: Some(Value::Number((index + 1) as f64)),
                ..PropertyDescriptor::empty()
            };
            general_define_own_property(vm, obj, &length_str, &fix, false)?;
        }
        return Ok(true);
    }

    general_define_own_property(vm, obj, name, desc, throw)
}

// ═══════════════════════════════════════════════════════════════════════════
// References
// ═══════════════════════════════════════════════════════════════════════════

/// A transient property reference: (base, name, strict). Never outlives the
/// opcode that produced it.
#[derive(Debug, Clone)]
pub struct Reference {
    pub base: Value,
    pub name: JsString,
    pub strict: bool,
}

/// GetValue on a property reference with an object or primitive base
/// (ECMA-262 v5, 8.7.1).
pub fn get_value(vm: &mut Interpreter, reference: &Reference) -> Completion<Value> {
    match &reference.base {
        Value::Object(obj) => object_get(vm, *obj, &reference.name),
        primitive => {
            let wrapper = conversion::to_object(vm, primitive)?;
            object_get(vm, wrapper, &reference.name)
        }
    }
}

/// PutValue on a property reference (ECMA-262 v5, 8.7.2).
pub fn put_value(vm: &mut Interpreter, reference: &Reference, value: Value) -> Completion<()> {
    match &reference.base {
        Value::Object(obj) => object_put(vm, *obj, &reference.name, value, reference.strict),
        primitive => {
            let wrapper = conversion::to_object(vm, primitive)?;
            object_put(vm, wrapper, &reference.name, value, reference.strict)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// instanceof support
// ═══════════════════════════════════════════════════════════════════════════

/// [[HasInstance]] (ECMA-262 v5, 15.3.5.3).
pub fn has_instance(vm: &mut Interpreter, func: ObjectRef, value: &Value) -> Completion<bool> {
    let Some(mut obj) = value.as_object() else {
        return Ok(false);
    };
    let proto_name = vm.strings.magic(Magic::Prototype);
    let proto_val = object_get(vm, func, &proto_name)?;
    let Some(proto) = proto_val.as_object() else {
        return throw_standard_error(vm, StandardError::Type, "prototype is not an object");
    };
    loop {
        match vm.heap.get(obj).prototype {
            None => return Ok(false),
            Some(p) if p == proto => return Ok(true),
            Some(p) => obj = p,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Descriptor conversions
// ═══════════════════════════════════════════════════════════════════════════

/// ToPropertyDescriptor (ECMA-262 v5, 8.10.5).
///
/// Starts from an empty descriptor and defines each field only when the
/// corresponding property actually exists on the source object.
pub fn to_property_descriptor(
    vm: &mut Interpreter,
    value: &Value,
) -> Completion<PropertyDescriptor> {
    let Some(obj) = value.as_object() else {
        return throw_standard_error(vm, StandardError::Type, "descriptor is not an object");
    };

    let mut desc = PropertyDescriptor::empty();

    let enumerable = vm.strings.magic(Magic::Enumerable);
    if get_property(&vm.heap, obj, &enumerable).is_some() {
        let v = object_get(vm, obj, &enumerable)?;
        desc.enumerable = Some(conversion::to_boolean(&v));
    }

    let configurable = vm.strings.magic(Magic::Configurable);
    if get_property(&vm.heap, obj, &configurable).is_some() {
        let v = object_get(vm, obj, &configurable)?;
        desc.configurable = Some(conversion::to_boolean(&v));
    }

    let value_name = vm.strings.magic(Magic::Value);
    if get_property(&vm.heap, obj, &value_name).is_some() {
        desc.value = Some(object_get(vm, obj, &value_name)?);
    }

    let writable = vm.strings.magic(Magic::Writable);
    if get_property(&vm.heap, obj, &writable).is_some() {
        let v = object_get(vm, obj, &writable)?;
        desc.writable = Some(conversion::to_boolean(&v));
    }

    let get_name = vm.strings.magic(Magic::Get);
    if get_property(&vm.heap, obj, &get_name).is_some() {
        let v = object_get(vm, obj, &get_name)?;
        if v.is_undefined() {
            desc.get = Some(None);
        } else if let Some(f) = callable_object(&vm.heap, &v) {
            desc.get = Some(Some(f));
        } else {
            return throw_standard_error(vm, StandardError::Type, "getter is not callable");
        }
    }

    let set_name = vm.strings.magic(Magic::Set);
    if get_property(&vm.heap, obj, &set_name).is_some() {
        let v = object_get(vm, obj, &set_name)?;
        if v.is_undefined() {
            desc.set = Some(None);
        } else if let Some(f) = callable_object(&vm.heap, &v) {
            desc.set = Some(Some(f));
        } else {
            return throw_standard_error(vm, StandardError::Type, "setter is not callable");
        }
    }

    if desc.is_accessor_descriptor() && (desc.value.is_some() || desc.writable.is_some()) {
        return throw_standard_error(
            vm,
            StandardError::Type,
            "descriptor mixes value and accessor fields",
        );
    }

    Ok(desc)
}

/// FromPropertyDescriptor (ECMA-262 v5, 8.10.4). All attributes are copied
/// from the argument descriptor.
pub fn from_property_descriptor(
    vm: &mut Interpreter,
    desc: &PropertyDescriptor,
) -> ObjectRef {
    let proto = vm.realm.object_prototype;
    let mut obj = Object::new(ClassTag::Object, Some(proto));

    if desc.is_data_descriptor() {
        let value_name = vm.strings.magic(Magic::Value);
        obj.define_data(
            value_name,
            desc.value.clone().unwrap_or(Value::Undefined),
            true,
            true,
            true,
        );
        let writable_name = vm.strings.magic(Magic::Writable);
        obj.define_data(
            writable_name,
            Value::Bool(desc.writable.unwrap_or(false)),
            true,
            true,
            true,
        );
    } else {
        let get_name = vm.strings.magic(Magic::Get);
        let get_val = match desc.get.flatten() {
            Some(g) => Value::Object(g),
            None => Value::Undefined,
        };
        obj.define_data(get_name, get_val, true, true, true);
        let set_name = vm.strings.magic(Magic::Set);
        let set_val = match desc.set.flatten() {
            Some(s) => Value::Object(s),
            None => Value::Undefined,
        };
        obj.define_data(set_name, set_val, true, true, true);
    }

    let enumerable_name = vm.strings.magic(Magic::Enumerable);
    obj.define_data(
        enumerable_name,
        Value::Bool(desc.enumerable.unwrap_or(false)),
        true,
        true,
        true,
    );
    let configurable_name = vm.strings.magic(Magic::Configurable);
    obj.define_data(
        configurable_name,
        Value::Bool(desc.configurable.unwrap_or(false)),
        true,
        true,
        true,
    );

    vm.heap.alloc(obj)
}

/// Build a property descriptor from a stored property node.
pub fn descriptor_of(prop: &Property) -> PropertyDescriptor {
    match prop {
        Property::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => PropertyDescriptor {
            value: Some(value.clone()),
            writable: Some(*writable),
            enumerable: Some(*enumerable),
            configurable: Some(*configurable),
            ..PropertyDescriptor::empty()
        },
        Property::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => PropertyDescriptor {
            get: Some(*get),
            set: Some(*set),
            enumerable: Some(*enumerable),
            configurable: Some(*configurable),
            ..PropertyDescriptor::empty()
        },
    }
}
