//! Proxy trap table (ES §10.5)
//!
//! One entry per fundamental object operation: the handler property that
//! overrides it, the internal method it intercepts, how the trap's return
//! value is interpreted, and which target capability (if any) gates it.
//! Every trap defaults to forwarding the operation to the target.

use std::sync::Arc;
use std::sync::LazyLock;

use crate::string::JsString;

/// A proxy handler trap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyTrap {
    /// `[[GetPrototypeOf]]`
    GetPrototypeOf,
    /// `[[SetPrototypeOf]]`
    SetPrototypeOf,
    /// `[[IsExtensible]]`
    IsExtensible,
    /// `[[PreventExtensions]]`
    PreventExtensions,
    /// `[[GetOwnProperty]]`
    GetOwnPropertyDescriptor,
    /// `[[DefineOwnProperty]]`
    DefineProperty,
    /// `[[HasProperty]]`
    Has,
    /// `[[Get]]`
    Get,
    /// `[[Set]]`
    Set,
    /// `[[Delete]]`
    DeleteProperty,
    /// `[[OwnPropertyKeys]]`
    OwnKeys,
    /// `[[Call]]`
    Apply,
    /// `[[Construct]]`
    Construct,
}

/// How a trap's raw return value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapResultShape {
    /// An object or `null`
    ObjectOrNull,
    /// Any value, coerced with ToBoolean
    Boolean,
    /// A descriptor object or `undefined`
    DescriptorOrUndefined,
    /// Any value, returned as is
    Any,
    /// An array-like of strings and symbols
    KeyList,
    /// An object
    Object,
}

/// Target capability required before a trap may be dispatched at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCapability {
    /// Target must have `[[Call]]`
    Callable,
    /// Target must have `[[Construct]]`
    Constructor,
}

impl ProxyTrap {
    /// Every trap, in table order
    pub const ALL: [ProxyTrap; 13] = [
        Self::GetPrototypeOf,
        Self::SetPrototypeOf,
        Self::IsExtensible,
        Self::PreventExtensions,
        Self::GetOwnPropertyDescriptor,
        Self::DefineProperty,
        Self::Has,
        Self::Get,
        Self::Set,
        Self::DeleteProperty,
        Self::OwnKeys,
        Self::Apply,
        Self::Construct,
    ];

    /// Handler property name
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetPrototypeOf => "getPrototypeOf",
            Self::SetPrototypeOf => "setPrototypeOf",
            Self::IsExtensible => "isExtensible",
            Self::PreventExtensions => "preventExtensions",
            Self::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
            Self::DefineProperty => "defineProperty",
            Self::Has => "has",
            Self::Get => "get",
            Self::Set => "set",
            Self::DeleteProperty => "deleteProperty",
            Self::OwnKeys => "ownKeys",
            Self::Apply => "apply",
            Self::Construct => "construct",
        }
    }

    /// Name of the internal method the trap intercepts
    pub const fn internal_method(self) -> &'static str {
        match self {
            Self::GetPrototypeOf => "[[GetPrototypeOf]]",
            Self::SetPrototypeOf => "[[SetPrototypeOf]]",
            Self::IsExtensible => "[[IsExtensible]]",
            Self::PreventExtensions => "[[PreventExtensions]]",
            Self::GetOwnPropertyDescriptor => "[[GetOwnProperty]]",
            Self::DefineProperty => "[[DefineOwnProperty]]",
            Self::Has => "[[HasProperty]]",
            Self::Get => "[[Get]]",
            Self::Set => "[[Set]]",
            Self::DeleteProperty => "[[Delete]]",
            Self::OwnKeys => "[[OwnPropertyKeys]]",
            Self::Apply => "[[Call]]",
            Self::Construct => "[[Construct]]",
        }
    }

    /// How the trap's return value is interpreted
    pub const fn result_shape(self) -> TrapResultShape {
        match self {
            Self::GetPrototypeOf => TrapResultShape::ObjectOrNull,
            Self::SetPrototypeOf
            | Self::IsExtensible
            | Self::PreventExtensions
            | Self::DefineProperty
            | Self::Has
            | Self::Set
            | Self::DeleteProperty => TrapResultShape::Boolean,
            Self::GetOwnPropertyDescriptor => TrapResultShape::DescriptorOrUndefined,
            Self::Get | Self::Apply => TrapResultShape::Any,
            Self::OwnKeys => TrapResultShape::KeyList,
            Self::Construct => TrapResultShape::Object,
        }
    }

    /// Capability the target must have for this trap to be reachable
    pub const fn capability(self) -> Option<TrapCapability> {
        match self {
            Self::Apply => Some(TrapCapability::Callable),
            Self::Construct => Some(TrapCapability::Constructor),
            _ => None,
        }
    }

    /// Interned handler property name
    pub fn js_name(self) -> Arc<JsString> {
        static NAMES: LazyLock<Vec<Arc<JsString>>> = LazyLock::new(|| {
            ProxyTrap::ALL
                .iter()
                .map(|t| JsString::intern(t.name()))
                .collect()
        });
        NAMES[self as usize].clone()
    }
}

impl std::fmt::Display for ProxyTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interned_names() {
        for trap in ProxyTrap::ALL {
            assert_eq!(trap.js_name().as_str(), trap.name());
        }
        assert_eq!(ProxyTrap::GetOwnPropertyDescriptor.to_string(), "getOwnPropertyDescriptor");
    }

    #[test]
    fn test_table_order_matches_discriminants() {
        for (i, trap) in ProxyTrap::ALL.into_iter().enumerate() {
            assert_eq!(trap as usize, i);
        }
    }

    #[test]
    fn test_only_call_and_construct_are_gated() {
        let gated: Vec<_> = ProxyTrap::ALL
            .into_iter()
            .filter(|t| t.capability().is_some())
            .collect();
        assert_eq!(gated, vec![ProxyTrap::Apply, ProxyTrap::Construct]);
    }

    #[test]
    fn test_result_shapes() {
        assert_eq!(ProxyTrap::Has.result_shape(), TrapResultShape::Boolean);
        assert_eq!(ProxyTrap::OwnKeys.result_shape(), TrapResultShape::KeyList);
        assert_eq!(ProxyTrap::Construct.result_shape(), TrapResultShape::Object);
        assert_eq!(ProxyTrap::Get.internal_method(), "[[Get]]");
    }
}
