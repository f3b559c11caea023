//! ECMA-defined conversion and comparison routines (ECMA-262 v5, 9).

use crate::completion::Completion;
use crate::interpreter::Interpreter;
use crate::numbers;
use crate::object::{ClassTag, Object, ObjectData};
use crate::object_ops::{self, StandardError};
use crate::strings::{JsString, Magic};
use crate::value::Value;

/// Preferred type hint for ToPrimitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

/// CheckObjectCoercible (ECMA-262 v5, 9.10).
pub fn check_object_coercible(vm: &mut Interpreter, value: &Value) -> Completion<()> {
    if value.is_nullish() {
        return object_ops::throw_standard_error(
            vm,
            StandardError::Type,
            "value is not object coercible",
        );
    }
    Ok(())
}

/// SameValue (ECMA-262 v5, 9.12): type then bits. NaN is the same as NaN,
/// positive and negative zero differ.
pub fn same_value(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            if *a == 0.0 && *b == 0.0 {
                return a.is_sign_negative() == b.is_sign_negative();
            }
            a == b
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => a == b,
        _ => false,
    }
}

/// Strict equality (ECMA-262 v5, 11.9.6).
pub fn strict_equals(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => same_value(x, y),
    }
}

/// ToPrimitive (ECMA-262 v5, 9.1): identity for non-objects, [[DefaultValue]]
/// for objects.
pub fn to_primitive(vm: &mut Interpreter, value: &Value, hint: PreferredType) -> Completion<Value> {
    match value {
        Value::Object(obj) => object_ops::default_value(vm, *obj, hint),
        other => Ok(other.clone()),
    }
}

/// ToBoolean (ECMA-262 v5, 9.2).
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null | Value::Empty | Value::Hole => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

/// ToNumber (ECMA-262 v5, 9.3).
pub fn to_number(vm: &mut Interpreter, value: &Value) -> Completion<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => Ok(numbers::string_to_number(s.as_str())),
        Value::Object(_) => {
            let prim = to_primitive(vm, value, PreferredType::Number)?;
            to_number(vm, &prim)
        }
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Bool(true) => Ok(1.0),
        Value::Bool(false) => Ok(0.0),
        Value::Empty | Value::Hole => {
            unreachable!("internal sentinel reached ToNumber")
        }
    }
}

/// ToString (ECMA-262 v5, 9.8).
pub fn to_string(vm: &mut Interpreter, value: &Value) -> Completion<JsString> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(JsString::new(&numbers::number_to_string(*n))),
        Value::Undefined => Ok(vm.strings.magic(Magic::Undefined)),
        Value::Null => Ok(vm.strings.magic(Magic::Null)),
        Value::Bool(true) => Ok(vm.strings.magic(Magic::True)),
        Value::Bool(false) => Ok(vm.strings.magic(Magic::False)),
        Value::Object(_) => {
            let prim = to_primitive(vm, value, PreferredType::String)?;
            to_string(vm, &prim)
        }
        Value::Empty | Value::Hole => {
            unreachable!("internal sentinel reached ToString")
        }
    }
}

/// ToObject (ECMA-262 v5, 9.9): wraps primitives, rejects undefined and null.
pub fn to_object(vm: &mut Interpreter, value: &Value) -> Completion<crate::heap::ObjectRef> {
    match value {
        Value::Object(r) => Ok(*r),
        Value::Number(_) => {
            let proto = vm.realm.object_prototype;
            Ok(vm.heap.alloc(Object::with_data(
                ClassTag::Number,
                Some(proto),
                ObjectData::PrimitiveWrapper(value.clone()),
            )))
        }
        Value::Bool(_) => {
            let proto = vm.realm.object_prototype;
            Ok(vm.heap.alloc(Object::with_data(
                ClassTag::Boolean,
                Some(proto),
                ObjectData::PrimitiveWrapper(value.clone()),
            )))
        }
        Value::String(s) => {
            let proto = vm.realm.object_prototype;
            let mut obj = Object::with_data(
                ClassTag::String,
                Some(proto),
                ObjectData::PrimitiveWrapper(value.clone()),
            );
            // String objects expose length and per-character index properties.
            let chars: Vec<char> = s.as_str().chars().collect();
            let length = vm.strings.magic(Magic::Length);
            obj.define_data(length, Value::Number(chars.len() as f64), false, false, false);
            for (i, c) in chars.iter().enumerate() {
                let name = vm.strings.intern(&i.to_string());
                let ch = vm.strings.intern(&c.to_string());
                obj.define_data(name, Value::String(ch), false, true, false);
            }
            Ok(vm.heap.alloc(obj))
        }
        Value::Undefined | Value::Null => object_ops::throw_standard_error(
            vm,
            StandardError::Type,
            "cannot convert undefined or null to object",
        ),
        Value::Empty | Value::Hole => {
            unreachable!("internal sentinel reached ToObject")
        }
    }
}

/// ToNumber over an operand pair. The second operand is pinned while the
/// first conversion may run user code.
pub fn to_number_pair(vm: &mut Interpreter, x: &Value, y: &Value) -> Completion<(f64, f64)> {
    let mark = vm.pin(y.clone());
    let nx = to_number(vm, x);
    vm.unpin_to(mark);
    let nx = nx?;
    let ny = to_number(vm, y)?;
    Ok((nx, ny))
}

/// ToPrimitive over an operand pair in `left_first` order, pinning whichever
/// operand waits while the other conversion may run user code.
pub fn to_primitive_pair(
    vm: &mut Interpreter,
    x: &Value,
    y: &Value,
    hint: PreferredType,
    left_first: bool,
) -> Completion<(Value, Value)> {
    if left_first {
        let mark = vm.pin(y.clone());
        let px = to_primitive(vm, x, hint);
        vm.unpin_to(mark);
        let px = px?;
        let mark = vm.pin(px.clone());
        let py = to_primitive(vm, y, hint);
        vm.unpin_to(mark);
        Ok((px, py?))
    } else {
        let mark = vm.pin(x.clone());
        let py = to_primitive(vm, y, hint);
        vm.unpin_to(mark);
        let py = py?;
        let mark = vm.pin(py.clone());
        let px = to_primitive(vm, x, hint);
        vm.unpin_to(mark);
        Ok((px?, py))
    }
}

/// Abstract equality (ECMA-262 v5, 11.9.3).
pub fn abstract_equality(vm: &mut Interpreter, x: &Value, y: &Value) -> Completion<bool> {
    match (x, y) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Object(_), Value::Object(_)) => Ok(strict_equals(x, y)),
        (Value::Number(a), Value::String(s)) => {
            Ok(*a == numbers::string_to_number(s.as_str()))
        }
        (Value::String(s), Value::Number(b)) => {
            Ok(numbers::string_to_number(s.as_str()) == *b)
        }
        (Value::Bool(b), _) => {
            let n = if *b { 1.0 } else { 0.0 };
            abstract_equality(vm, &Value::Number(n), y)
        }
        (_, Value::Bool(b)) => {
            let n = if *b { 1.0 } else { 0.0 };
            abstract_equality(vm, x, &Value::Number(n))
        }
        (Value::Number(_) | Value::String(_), Value::Object(_)) => {
            let mark = vm.pin(x.clone());
            let py = to_primitive(vm, y, PreferredType::Default);
            vm.unpin_to(mark);
            abstract_equality(vm, x, &py?)
        }
        (Value::Object(_), Value::Number(_) | Value::String(_)) => {
            let mark = vm.pin(y.clone());
            let px = to_primitive(vm, x, PreferredType::Default);
            vm.unpin_to(mark);
            abstract_equality(vm, &px?, y)
        }
        _ => Ok(false),
    }
}

/// Abstract relational comparison (ECMA-262 v5, 11.8.5).
///
/// Returns `None` for the undefined result (a NaN operand).
pub fn abstract_relational_compare(
    vm: &mut Interpreter,
    x: &Value,
    y: &Value,
    left_first: bool,
) -> Completion<Option<bool>> {
    let (px, py) = to_primitive_pair(vm, x, y, PreferredType::Number, left_first)?;

    if let (Value::String(a), Value::String(b)) = (&px, &py) {
        // Code-unit lexicographic comparison.
        return Ok(Some(a.as_str() < b.as_str()));
    }

    let nx = to_number(vm, &px)?;
    let ny = to_number(vm, &py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}
