//! JavaScript values
//!
//! Primitives are stored inline; strings, symbols and objects are shared
//! handles. The type is `Send + Sync` because all heap data is behind `Arc`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::gc::GcRef;
use crate::object::{JsObject, Object};
use crate::proxy::JsProxy;
use crate::string::JsString;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A JavaScript Symbol
#[derive(Debug)]
pub struct Symbol {
    /// Symbol description
    pub description: Option<String>,
    /// Unique ID
    pub id: u64,
}

impl Symbol {
    /// Create a fresh, unique symbol
    pub fn new(description: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            description: description.map(str::to_string),
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        })
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// IEEE 754 double
    Number(f64),
    /// Interned string
    String(Arc<JsString>),
    /// Symbol
    Symbol(Arc<Symbol>),
    /// Any object, ordinary or exotic
    Object(Object),
}

impl Value {
    /// Create undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// Create null value
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create 32-bit integer value
    #[inline]
    pub fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// Create number (f64) value
    #[inline]
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create string value
    pub fn string(s: Arc<JsString>) -> Self {
        Self::String(s)
    }

    /// Create symbol value
    pub fn symbol(s: Arc<Symbol>) -> Self {
        Self::Symbol(s)
    }

    /// Create object value from an ordinary object
    pub fn object(obj: GcRef<JsObject>) -> Self {
        Self::Object(Object::Ordinary(obj))
    }

    /// Create object value from a proxy
    pub fn proxy(proxy: GcRef<JsProxy>) -> Self {
        Self::Object(Object::Proxy(proxy))
    }

    /// Check if undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Check if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if undefined or null
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Check if object (including proxies and functions)
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Check if this value has a `[[Call]]` internal method
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Object(o) if o.is_callable())
    }

    /// Check if this value has a `[[Construct]]` internal method
    pub fn is_constructor(&self) -> bool {
        matches!(self, Self::Object(o) if o.is_constructor())
    }

    /// Get as object handle
    pub fn as_object(&self) -> Option<Object> {
        match self {
            Self::Object(o) => Some(o.clone()),
            _ => None,
        }
    }

    /// Get as proxy, if this value is one
    pub fn as_proxy(&self) -> Option<GcRef<JsProxy>> {
        match self {
            Self::Object(Object::Proxy(p)) => Some(p.clone()),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&Arc<JsString>> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as symbol
    pub fn as_symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// ToBoolean (ES §7.1.2)
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Symbol(_) | Self::Object(_) => true,
        }
    }

    /// The `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(o) if o.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }
}

/// SameValue comparison (ES §7.2.11)
///
/// NaN is SameValue to itself; +0 and -0 are distinct; objects and symbols
/// compare by identity.
pub fn same_value(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            if *a == 0.0 && *b == 0.0 {
                return a.is_sign_positive() == b.is_sign_positive();
            }
            a == b
        }
        (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b) || a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a.id == b.id,
        (Value::Object(a), Value::Object(b)) => a == b,
        _ => false,
    }
}

/// Equality on values is SameValue
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        same_value(self, other)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{:?}", s.as_str()),
            Self::Symbol(s) => match &s.description {
                Some(d) => write!(f, "Symbol({d})"),
                None => write!(f, "Symbol()"),
            },
            Self::Object(o) => write!(f, "{o:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(JsString::intern(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl From<Option<Object>> for Value {
    fn from(o: Option<Object>) -> Self {
        o.map_or(Self::Null, Self::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_primitives() {
        assert!(same_value(&Value::undefined(), &Value::undefined()));
        assert!(same_value(&Value::null(), &Value::null()));
        assert!(!same_value(&Value::null(), &Value::undefined()));
        assert!(same_value(&Value::boolean(true), &Value::boolean(true)));
        assert!(same_value(&Value::int32(42), &Value::int32(42)));
        assert!(!same_value(&Value::int32(42), &Value::int32(43)));
        assert!(same_value(&Value::from("a"), &Value::from("a")));
    }

    #[test]
    fn test_same_value_nan() {
        let nan1 = Value::number(f64::NAN);
        let nan2 = Value::number(f64::NAN);
        assert!(same_value(&nan1, &nan2));
    }

    #[test]
    fn test_same_value_zero() {
        let pos_zero = Value::number(0.0);
        let neg_zero = Value::number(-0.0);
        assert!(!same_value(&pos_zero, &neg_zero));
    }

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new(Some("tag"));
        let b = Symbol::new(Some("tag"));
        assert!(!same_value(&Value::symbol(a.clone()), &Value::symbol(b)));
        assert!(same_value(&Value::symbol(a.clone()), &Value::symbol(a)));
    }

    #[test]
    fn test_to_boolean() {
        assert!(!Value::number(f64::NAN).to_boolean());
        assert!(!Value::number(0.0).to_boolean());
        assert!(!Value::from("").to_boolean());
        assert!(Value::from("x").to_boolean());
        assert!(Value::symbol(Symbol::new(None)).to_boolean());
    }

    #[test]
    fn test_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
    }
}
