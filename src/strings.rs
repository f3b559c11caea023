//! Interned string descriptors and the magic-string registry.
//!
//! Every string is an immutable byte sequence with a precomputed hash. The
//! string table deduplicates literals and property names so that pointer
//! equality settles most comparisons; the magic-string registry preloads the
//! well-known names the engine touches on its hot paths.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHasher};

/// A shared immutable string with a precomputed hash.
///
/// Clone is cheap: it only bumps a reference count. The reference count of a
/// string is exactly the number of live holders.
#[derive(Clone)]
pub struct JsString(Rc<StringData>);

struct StringData {
    text: Box<str>,
    hash: u64,
}

fn hash_str(s: &str) -> u64 {
    let mut h = FxHasher::default();
    s.as_bytes().hash(&mut h);
    h.finish()
}

impl JsString {
    /// Create a fresh, non-interned string.
    pub fn new(text: &str) -> Self {
        JsString(Rc::new(StringData {
            text: text.into(),
            hash: hash_str(text),
        }))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.text.is_empty()
    }

    /// Identity comparison: true iff both descriptors are the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &JsString) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        // Pointer equality first: interned strings and magic strings share
        // one allocation per content.
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.hash == other.0.hash && self.0.text == other.0.text
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString::new(s)
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString::new(&s)
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_str())
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! magic_strings {
    ($($name:ident => $text:expr,)*) => {
        /// Well-known strings registered at start-up.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(usize)]
        pub enum Magic {
            $($name),*
        }

        impl Magic {
            pub const ALL: &'static [Magic] = &[$(Magic::$name),*];

            pub fn text(self) -> &'static str {
                match self {
                    $(Magic::$name => $text),*
                }
            }
        }
    };
}

magic_strings! {
    Undefined => "undefined",
    Null => "null",
    True => "true",
    False => "false",
    Boolean => "boolean",
    Number => "number",
    String => "string",
    Object => "object",
    Function => "function",
    Length => "length",
    Prototype => "prototype",
    Constructor => "constructor",
    ToString => "toString",
    ValueOf => "valueOf",
    HasOwnProperty => "hasOwnProperty",
    Value => "value",
    Writable => "writable",
    Get => "get",
    Set => "set",
    Enumerable => "enumerable",
    Configurable => "configurable",
    Name => "name",
    Message => "message",
    Arguments => "arguments",
    Callee => "callee",
    Nan => "NaN",
    Infinity => "Infinity",
    DefineProperty => "defineProperty",
    GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
}

/// Deduplicating string table with the magic-string registry preloaded.
pub struct StringTable {
    strings: FxHashMap<Box<str>, JsString>,
    magic: Vec<JsString>,
}

impl StringTable {
    pub fn new() -> Self {
        let mut strings = FxHashMap::default();
        let mut magic = Vec::with_capacity(Magic::ALL.len());
        for m in Magic::ALL {
            let s = JsString::new(m.text());
            strings.insert(m.text().into(), s.clone());
            magic.push(s);
        }
        Self { strings, magic }
    }

    /// Shared instance of a well-known string.
    #[inline]
    pub fn magic(&self, m: Magic) -> JsString {
        self.magic[m as usize].clone()
    }

    /// Get an existing string or insert a new one. Identical contents always
    /// return the same allocation.
    pub fn intern(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let js = JsString::new(s);
        self.strings.insert(s.into(), js.clone());
        js
    }

    /// Number of unique strings in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
