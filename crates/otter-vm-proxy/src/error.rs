//! VM error types

use crate::object::PropertyKey;
use crate::trap::ProxyTrap;
use crate::value::Value;
use thiserror::Error;

/// VM execution errors
#[derive(Debug, Error)]
pub enum VmError {
    /// Type error, tagged with a machine-readable reason
    #[error("TypeError: {message}")]
    TypeError {
        /// Why the error was raised
        kind: TypeErrorKind,
        /// Human-readable diagnostic
        message: String,
    },

    /// Range error (e.g., invalid array length)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Stack overflow
    #[error("RangeError: Maximum call stack size exceeded")]
    StackOverflow,

    /// Thrown JS exception
    #[error("Uncaught exception: {0}")]
    Exception(Box<ThrownValue>),
}

/// Reason code attached to a [`VmError::TypeError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// Any type error without a dedicated reason
    Generic,
    /// Proxy construction was given a non-object target or handler
    NotAnObject,
    /// Operation attempted on a revoked proxy
    ProxyRevoked,
    /// The handler holds a non-callable, non-nullish value under a trap name
    TrapNotCallable(ProxyTrap),
    /// A trap result contradicts the target's observable state
    InvariantViolation {
        /// The trap whose result was rejected
        trap: ProxyTrap,
        /// The property the check concerned, if any
        key: Option<PropertyKey>,
    },
    /// Call attempted on a value without `[[Call]]`
    NotCallable,
    /// Construct attempted on a value without `[[Construct]]`
    NotConstructor,
}

/// A thrown JavaScript value
#[derive(Debug)]
pub struct ThrownValue {
    /// The thrown value
    pub value: Value,
    /// The thrown value (as a string representation)
    pub message: String,
}

impl std::fmt::Display for ThrownValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl VmError {
    /// Create a generic type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError {
            kind: TypeErrorKind::Generic,
            message: msg.into(),
        }
    }

    /// Create a type error with an explicit reason
    pub fn type_error_with(kind: TypeErrorKind, msg: impl Into<String>) -> Self {
        Self::TypeError {
            kind,
            message: msg.into(),
        }
    }

    /// Proxy constructor argument was not an object
    pub fn not_an_object(what: &str) -> Self {
        Self::type_error_with(
            TypeErrorKind::NotAnObject,
            format!("Cannot create proxy with a non-object as {what}"),
        )
    }

    /// Operation on a revoked proxy
    pub fn revoked(trap: ProxyTrap) -> Self {
        Self::type_error_with(
            TypeErrorKind::ProxyRevoked,
            format!("Cannot perform '{}' on a proxy that has been revoked", trap.name()),
        )
    }

    /// Handler trap is present but not a function
    pub fn trap_not_callable(trap: ProxyTrap) -> Self {
        Self::type_error_with(
            TypeErrorKind::TrapNotCallable(trap),
            format!("Proxy handler's '{}' trap must be a function", trap.name()),
        )
    }

    /// Trap result failed invariant validation
    pub fn invariant(trap: ProxyTrap, key: Option<&PropertyKey>, msg: impl AsRef<str>) -> Self {
        let message = match key {
            Some(key) => format!("'{}' on proxy: {} (key '{}')", trap.name(), msg.as_ref(), key),
            None => format!("'{}' on proxy: {}", trap.name(), msg.as_ref()),
        };
        Self::type_error_with(
            TypeErrorKind::InvariantViolation {
                trap,
                key: key.cloned(),
            },
            message,
        )
    }

    /// Value is not a function
    pub fn not_callable(what: &str) -> Self {
        Self::type_error_with(TypeErrorKind::NotCallable, format!("{what} is not a function"))
    }

    /// Value is not a constructor
    pub fn not_constructor(what: &str) -> Self {
        Self::type_error_with(
            TypeErrorKind::NotConstructor,
            format!("{what} is not a constructor"),
        )
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create an exception from a thrown JS value
    pub fn exception(value: Value) -> Self {
        let message = if let Some(s) = value.as_string() {
            s.as_str().to_string()
        } else {
            format!("{:?}", value)
        };
        Self::Exception(Box::new(ThrownValue { message, value }))
    }

    /// Reason code, if this is a type error
    pub fn type_error_kind(&self) -> Option<&TypeErrorKind> {
        match self {
            Self::TypeError { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// True if this is a type error with the given reason
    pub fn is_kind(&self, kind: &TypeErrorKind) -> bool {
        self.type_error_kind() == Some(kind)
    }

    /// True if this is an invariant violation raised by `trap`
    pub fn is_invariant_violation(&self, trap: ProxyTrap) -> bool {
        matches!(
            self.type_error_kind(),
            Some(TypeErrorKind::InvariantViolation { trap: t, .. }) if *t == trap
        )
    }
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_message_names_trap_and_key() {
        let key = PropertyKey::string("x");
        let err = VmError::invariant(ProxyTrap::Get, Some(&key), "value mismatch");
        assert_eq!(
            err.to_string(),
            "TypeError: 'get' on proxy: value mismatch (key 'x')"
        );
        assert!(err.is_invariant_violation(ProxyTrap::Get));
        assert!(!err.is_invariant_violation(ProxyTrap::Set));
    }

    #[test]
    fn test_reason_codes() {
        assert!(VmError::revoked(ProxyTrap::Has).is_kind(&TypeErrorKind::ProxyRevoked));
        assert!(
            VmError::trap_not_callable(ProxyTrap::Get)
                .is_kind(&TypeErrorKind::TrapNotCallable(ProxyTrap::Get))
        );
        assert_eq!(VmError::StackOverflow.type_error_kind(), None);
    }

    #[test]
    fn test_exception_message() {
        let err = VmError::exception(Value::from("boom"));
        assert_eq!(err.to_string(), "Uncaught exception: boom");
    }
}
