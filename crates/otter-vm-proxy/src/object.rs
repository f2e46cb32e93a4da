//! JavaScript objects
//!
//! [`JsObject`] is the ordinary object: an insertion-ordered property table,
//! a prototype link and an extensibility flag, optionally carrying native
//! call/construct behaviour. [`Object`] is the handle the rest of the engine
//! passes around; it is either an ordinary object or a proxy, and exposes the
//! fundamental internal methods (see `internal_methods.rs`).

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::function::NativeFunction;
use crate::gc::GcRef;
use crate::proxy::JsProxy;
use crate::string::JsString;
use crate::value::{Symbol, Value};

/// Property key (string or symbol)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String property key
    String(Arc<JsString>),
    /// Symbol property key
    Symbol(Arc<Symbol>),
    /// Canonical array index, i.e. a string key spelled `"0"`..=`"4294967294"`
    Index(u32),
}

impl PropertyKey {
    /// Create a string property key, canonicalizing array indices
    pub fn string(s: &str) -> Self {
        Self::from_js_string(JsString::intern(s))
    }

    /// Create from a string Arc, canonicalizing array indices
    pub fn from_js_string(s: Arc<JsString>) -> Self {
        match s.as_array_index() {
            Some(i) => Self::Index(i),
            None => Self::String(s),
        }
    }

    /// Create an index property key
    pub fn index(i: u32) -> Self {
        Self::Index(i)
    }

    /// Create a symbol property key
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// Interpret a value as a key. Only strings and symbols qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::from_js_string(s.clone())),
            Value::Symbol(sym) => Some(Self::Symbol(sym.clone())),
            _ => None,
        }
    }

    /// The key as a value, as handed to traps (indices become strings)
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::string(s.clone()),
            Self::Index(n) => Value::string(JsString::intern(&n.to_string())),
            Self::Symbol(sym) => Value::symbol(sym.clone()),
        }
    }

    /// Is this a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Index(i) => write!(f, "{i}"),
            Self::Symbol(sym) => match &sym.description {
                Some(d) => write!(f, "Symbol({d})"),
                None => write!(f, "Symbol()"),
            },
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::Index(i)
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable (data properties only)
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

/// A stored, fully populated property
#[derive(Clone, Debug)]
pub enum PropertySlot {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<Object>,
        /// Setter function
        set: Option<Object>,
        /// Attributes (`writable` is ignored)
        attributes: PropertyAttributes,
    },
}

impl PropertySlot {
    /// Create a data property with default attributes
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Attributes of either kind
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Check if configurable
    pub fn is_configurable(&self) -> bool {
        self.attributes().configurable
    }
}

/// What an ordinary object is, beyond its property table
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array (its `length` is maintained by the array helpers)
    Array,
    /// Native function
    Function(NativeFunction),
}

/// A JavaScript ordinary object
///
/// Thread-safe with interior mutability. Locks are only held for the
/// duration of a table access, never across a call into managed code.
pub struct JsObject {
    /// Properties storage, in insertion order
    properties: RwLock<IndexMap<PropertyKey, PropertySlot, FxBuildHasher>>,
    /// Prototype (None for null)
    prototype: RwLock<Option<Object>>,
    /// `[[Extensible]]`
    extensible: AtomicBool,
    /// Ordinary, array or function
    kind: ObjectKind,
}

impl JsObject {
    /// Create a new empty object
    pub fn new(prototype: Option<Object>) -> Self {
        Self::with_kind(prototype, ObjectKind::Ordinary)
    }

    /// Create a new empty object of the given kind
    pub fn with_kind(prototype: Option<Object>, kind: ObjectKind) -> Self {
        Self {
            properties: RwLock::new(IndexMap::with_hasher(FxBuildHasher)),
            prototype: RwLock::new(prototype),
            extensible: AtomicBool::new(true),
            kind,
        }
    }

    /// Object kind
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Is this an array
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array)
    }

    /// Native function behaviour, if this is a function
    pub fn as_function(&self) -> Option<&NativeFunction> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Own property slot (cloned out of the table)
    pub fn get_own_slot(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.properties.read().get(key).cloned()
    }

    /// Check if object has own property
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Write a slot, keeping the key's position if it already exists
    pub(crate) fn write_slot(&self, key: PropertyKey, slot: PropertySlot) {
        self.properties.write().insert(key, slot);
    }

    /// Remove a slot, preserving the order of the remaining keys
    pub(crate) fn remove_slot(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.properties.write().shift_remove(key)
    }

    /// Own property keys in ordinary order: array indices ascending, then
    /// strings in creation order, then symbols in creation order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let props = self.properties.read();
        let mut indices: Vec<u32> = Vec::new();
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for key in props.keys() {
            match key {
                PropertyKey::Index(i) => indices.push(*i),
                PropertyKey::String(_) => strings.push(key.clone()),
                PropertyKey::Symbol(_) => symbols.push(key.clone()),
            }
        }
        indices.sort_unstable();

        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    /// Get prototype
    pub fn prototype(&self) -> Option<Object> {
        self.prototype.read().clone()
    }

    pub(crate) fn set_prototype_slot(&self, proto: Option<Object>) {
        *self.prototype.write() = proto;
    }

    /// `[[Extensible]]`
    pub fn extensible(&self) -> bool {
        self.extensible.load(Ordering::Acquire)
    }

    pub(crate) fn clear_extensible(&self) {
        self.extensible.store(false, Ordering::Release);
    }

    /// Host-side define that bypasses traps: adds or replaces `key`.
    ///
    /// Fails only when adding a new key to a non-extensible object. Use the
    /// `define_own_property` internal method for validated definitions.
    pub fn define_property(&self, key: PropertyKey, slot: PropertySlot) -> bool {
        let mut props = self.properties.write();
        if !self.extensible() && !props.contains_key(&key) {
            return false;
        }
        props.insert(key, slot);
        true
    }

    /// Host-side data store: writes `value` to an own writable data property,
    /// or creates a default data property if the object is extensible
    pub fn set(&self, key: PropertyKey, value: Value) -> bool {
        let mut props = self.properties.write();
        match props.get_mut(&key) {
            Some(PropertySlot::Data { value: v, attributes }) => {
                if !attributes.writable {
                    return false;
                }
                *v = value;
                true
            }
            Some(PropertySlot::Accessor { .. }) => false,
            None => {
                if !self.extensible() {
                    return false;
                }
                props.insert(key, PropertySlot::data(value));
                true
            }
        }
    }

    /// Host-side own data read (no getters, no prototype walk)
    pub fn get_own_value(&self, key: &PropertyKey) -> Option<Value> {
        match self.properties.read().get(key) {
            Some(PropertySlot::Data { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Host-side freeze: every own property becomes non-configurable (and
    /// non-writable for data properties), then the object stops being
    /// extensible
    pub fn freeze(&self) {
        let mut props = self.properties.write();
        for slot in props.values_mut() {
            match slot {
                PropertySlot::Data { attributes, .. } => {
                    attributes.writable = false;
                    attributes.configurable = false;
                }
                PropertySlot::Accessor { attributes, .. } => {
                    attributes.configurable = false;
                }
            }
        }
        self.clear_extensible();
    }
}

impl std::fmt::Debug for JsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let props = self.properties.read();
        f.debug_struct("JsObject")
            .field("properties", &props.len())
            .field("is_array", &self.is_array())
            .field("is_function", &self.as_function().is_some())
            .finish()
    }
}

/// Handle to any object: ordinary or proxy
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Object {
    /// Ordinary object (including arrays and functions)
    Ordinary(GcRef<JsObject>),
    /// Proxy exotic object
    Proxy(GcRef<JsProxy>),
}

impl Object {
    /// Does this object have `[[Call]]`
    pub fn is_callable(&self) -> bool {
        match self {
            Self::Ordinary(o) => o.as_function().is_some(),
            Self::Proxy(p) => p.is_callable(),
        }
    }

    /// Does this object have `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        match self {
            Self::Ordinary(o) => o.as_function().is_some_and(NativeFunction::is_constructor),
            Self::Proxy(p) => p.is_constructor(),
        }
    }

    /// Get as ordinary object
    pub fn as_ordinary(&self) -> Option<&GcRef<JsObject>> {
        match self {
            Self::Ordinary(o) => Some(o),
            Self::Proxy(_) => None,
        }
    }

    /// Get as proxy
    pub fn as_proxy(&self) -> Option<&GcRef<JsProxy>> {
        match self {
            Self::Proxy(p) => Some(p),
            Self::Ordinary(_) => None,
        }
    }
}

impl From<GcRef<JsObject>> for Object {
    fn from(o: GcRef<JsObject>) -> Self {
        Self::Ordinary(o)
    }
}

impl From<GcRef<JsProxy>> for Object {
    fn from(p: GcRef<JsProxy>) -> Self {
        Self::Proxy(p)
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordinary(o) => o.fmt(f),
            Self::Proxy(p) => p.fmt(f),
        }
    }
}
