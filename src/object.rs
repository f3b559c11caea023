//! The object model: headers, property storage, descriptors.

use std::fmt;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::completion::Completion;
use crate::heap::ObjectRef;
use crate::interpreter::Interpreter;
use crate::strings::JsString;
use crate::value::Value;

/// Property map preserving insertion order for enumeration.
pub type PropertyMap = IndexMap<JsString, Property, BuildHasherDefault<FxHasher>>;

/// The [[Class]] tag of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTag {
    Object,
    Function,
    Array,
    Arguments,
    String,
    Boolean,
    Number,
    Error,
    Date,
}

impl ClassTag {
    pub fn name(self) -> &'static str {
        match self {
            ClassTag::Object => "Object",
            ClassTag::Function => "Function",
            ClassTag::Array => "Array",
            ClassTag::Arguments => "Arguments",
            ClassTag::String => "String",
            ClassTag::Boolean => "Boolean",
            ClassTag::Number => "Number",
            ClassTag::Error => "Error",
            ClassTag::Date => "Date",
        }
    }
}

/// Code and environment carried by an interpreted function object.
#[derive(Debug, Clone)]
pub struct FunctionData {
    /// Position of the body's `reg_var_decl` opcode.
    pub code_pos: u16,
    /// Formal parameter names in declaration order.
    pub formals: Vec<JsString>,
    /// The [[Scope]] lexical environment.
    pub scope: ObjectRef,
    pub strict: bool,
}

/// Native function signature used by built-ins.
pub type NativeFn = fn(&mut Interpreter, Value, &[Value]) -> Completion<Value>;

/// A built-in function implemented in Rust.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Payload of a lexical environment object.
#[derive(Debug, Clone)]
pub enum LexEnvData {
    /// Bindings live as named data properties directly on this object.
    Declarative { outer: Option<ObjectRef> },
    /// Bindings delegate to a binding object.
    ObjectBound {
        outer: Option<ObjectRef>,
        binding: ObjectRef,
        provide_this: bool,
    },
}

impl LexEnvData {
    pub fn outer(&self) -> Option<ObjectRef> {
        match self {
            LexEnvData::Declarative { outer } => *outer,
            LexEnvData::ObjectBound { outer, .. } => *outer,
        }
    }
}

/// Kind-specific payload, standing in for the internal properties of the
/// original object layout.
#[derive(Debug, Clone)]
pub enum ObjectData {
    Ordinary,
    Function(FunctionData),
    Native(NativeFunction),
    Array,
    Arguments,
    /// [[PrimitiveValue]] of Number/String/Boolean wrapper objects.
    PrimitiveWrapper(Value),
    LexEnv(LexEnvData),
}

/// A heap object: header fields plus the named property list.
#[derive(Debug)]
pub struct Object {
    pub prototype: Option<ObjectRef>,
    pub extensible: bool,
    pub is_builtin: bool,
    pub class: ClassTag,
    pub data: ObjectData,
    pub properties: PropertyMap,
}

impl Object {
    pub fn new(class: ClassTag, prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            extensible: true,
            is_builtin: false,
            class,
            data: ObjectData::Ordinary,
            properties: PropertyMap::default(),
        }
    }

    pub fn with_data(class: ClassTag, prototype: Option<ObjectRef>, data: ObjectData) -> Self {
        Self {
            prototype,
            extensible: true,
            is_builtin: false,
            class,
            data,
            properties: PropertyMap::default(),
        }
    }

    /// A fresh declarative lexical environment.
    pub fn new_decl_env(outer: Option<ObjectRef>) -> Self {
        Self::with_data(
            ClassTag::Object,
            None,
            ObjectData::LexEnv(LexEnvData::Declarative { outer }),
        )
    }

    /// A fresh object-bound lexical environment over `binding`.
    pub fn new_object_env(outer: Option<ObjectRef>, binding: ObjectRef, provide_this: bool) -> Self {
        Self::with_data(
            ClassTag::Object,
            None,
            ObjectData::LexEnv(LexEnvData::ObjectBound {
                outer,
                binding,
                provide_this,
            }),
        )
    }

    #[inline]
    pub fn is_lex_env(&self) -> bool {
        matches!(self.data, ObjectData::LexEnv(_))
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self.data, ObjectData::Function(_) | ObjectData::Native(_))
    }

    /// Constructors are the callable objects in this subset.
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.is_callable()
    }

    pub fn get_own(&self, name: &JsString) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Insert a named data property. The name must not already be present.
    pub fn define_data(
        &mut self,
        name: JsString,
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) {
        debug_assert!(!self.properties.contains_key(&name));
        self.properties.insert(
            name,
            Property::Data {
                value,
                writable,
                enumerable,
                configurable,
            },
        );
    }

    /// Insert a named accessor property. The name must not already be present.
    pub fn define_accessor(
        &mut self,
        name: JsString,
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) {
        debug_assert!(!self.properties.contains_key(&name));
        self.properties.insert(
            name,
            Property::Accessor {
                get,
                set,
                enumerable,
                configurable,
            },
        );
    }

    /// Remove a property, preserving the order of the rest.
    pub fn remove_property(&mut self, name: &JsString) {
        self.properties.shift_remove(name);
    }

    /// Push every object reference held by this object onto a mark stack.
    pub(crate) fn trace(&self, out: &mut Vec<ObjectRef>) {
        if let Some(p) = self.prototype {
            out.push(p);
        }
        for prop in self.properties.values() {
            match prop {
                Property::Data { value, .. } => value.trace(out),
                Property::Accessor { get, set, .. } => {
                    if let Some(g) = get {
                        out.push(*g);
                    }
                    if let Some(s) = set {
                        out.push(*s);
                    }
                }
            }
        }
        match &self.data {
            ObjectData::Function(f) => out.push(f.scope),
            ObjectData::PrimitiveWrapper(v) => v.trace(out),
            ObjectData::LexEnv(LexEnvData::Declarative { outer }) => {
                if let Some(o) = outer {
                    out.push(*o);
                }
            }
            ObjectData::LexEnv(LexEnvData::ObjectBound { outer, binding, .. }) => {
                if let Some(o) = outer {
                    out.push(*o);
                }
                out.push(*binding);
            }
            ObjectData::Ordinary
            | ObjectData::Native(_)
            | ObjectData::Array
            | ObjectData::Arguments => {}
        }
    }
}

/// A stored property: named data or named accessor.
#[derive(Debug, Clone)]
pub enum Property {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    },
}

impl Property {
    pub fn is_data(&self) -> bool {
        matches!(self, Property::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Property::Accessor { .. })
    }

    pub fn enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => {
                *enumerable
            }
        }
    }

    pub fn configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => {
                *configurable
            }
        }
    }

    /// Writable attribute; false for accessors.
    pub fn writable(&self) -> bool {
        match self {
            Property::Data { writable, .. } => *writable,
            Property::Accessor { .. } => false,
        }
    }
}

/// Operation-time property descriptor (ECMA-262 v5, 8.10).
///
/// Each field doubles as its own "defined" flag; an empty descriptor has all
/// fields `None`. For accessors the inner option distinguishes an explicitly
/// absent getter/setter from an undefined field.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Option<ObjectRef>>,
    pub set: Option<Option<ObjectRef>>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }
}
