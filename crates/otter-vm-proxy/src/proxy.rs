//! JavaScript Proxy exotic objects
//!
//! A proxy holds a target and a handler. Revocation clears both at once, so
//! "revoked" is simply the absence of the pair. Whether the proxy is callable
//! or constructible is decided from the target at creation and never changes.
//!
//! ## Usage
//!
//! ```
//! use otter_vm_proxy::{JsProxy, Value, VmRuntime};
//!
//! let ncx = VmRuntime::new().create_context();
//! let target = Value::object(ncx.new_object());
//! let handler = Value::object(ncx.new_object());
//! let proxy = JsProxy::create(&target, &handler).unwrap();
//! assert!(!proxy.is_revoked());
//! proxy.revoke();
//! assert!(proxy.is_revoked());
//! ```

use parking_lot::{Mutex, RwLock};

use crate::context::NativeContext;
use crate::error::{VmError, VmResult};
use crate::function::create_native_function;
use crate::gc::GcRef;
use crate::object::{JsObject, Object};
use crate::trap::{ProxyTrap, TrapCapability};
use crate::value::Value;

/// Target and handler of a live proxy
#[derive(Clone, Debug)]
pub(crate) struct ProxySlots {
    pub(crate) target: Object,
    pub(crate) handler: Object,
}

/// A JavaScript Proxy object
///
/// Proxies intercept fundamental operations on target objects
/// through handler traps.
pub struct JsProxy {
    /// `[[ProxyTarget]]` and `[[ProxyHandler]]`; `None` once revoked
    slots: RwLock<Option<ProxySlots>>,
    /// Target had `[[Call]]` at creation
    callable: bool,
    /// Target had `[[Construct]]` at creation
    constructor: bool,
}

impl std::fmt::Debug for JsProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.slots.read() {
            Some(slots) => write!(f, "Proxy {{ target: {:?} }}", slots.target),
            None => write!(f, "Proxy {{ <revoked> }}"),
        }
    }
}

/// Result of creating a revocable proxy
#[derive(Debug)]
pub struct RevocableProxy {
    /// The proxy object
    pub proxy: GcRef<JsProxy>,
    /// Native `revoke` function; calling it any number of times revokes once
    pub revoke: GcRef<JsObject>,
}

impl JsProxy {
    /// Create a proxy over two object handles
    pub fn new(target: Object, handler: Object) -> GcRef<Self> {
        let callable = target.is_callable();
        let constructor = target.is_constructor();
        GcRef::new(Self {
            slots: RwLock::new(Some(ProxySlots { target, handler })),
            callable,
            constructor,
        })
    }

    /// ProxyCreate: both arguments must be objects
    pub fn create(target: &Value, handler: &Value) -> VmResult<GcRef<Self>> {
        let target = target
            .as_object()
            .ok_or_else(|| VmError::not_an_object("target"))?;
        let handler = handler
            .as_object()
            .ok_or_else(|| VmError::not_an_object("handler"))?;
        Ok(Self::new(target, handler))
    }

    /// Create a proxy together with its revoke function
    pub fn create_revocable(
        ncx: &NativeContext,
        target: &Value,
        handler: &Value,
    ) -> VmResult<RevocableProxy> {
        let proxy = Self::create(target, handler)?;

        // The function drops its reference on first use.
        let slot = Mutex::new(Some(proxy.clone()));
        let revoke = create_native_function(ncx, "", 0, move |_this, _args, _ncx| {
            if let Some(proxy) = slot.lock().take() {
                proxy.revoke();
            }
            Ok(Value::Undefined)
        });

        Ok(RevocableProxy { proxy, revoke })
    }

    /// Get the target object
    ///
    /// Returns `None` if the proxy has been revoked.
    pub fn target(&self) -> Option<Object> {
        self.slots.read().as_ref().map(|s| s.target.clone())
    }

    /// Get the handler object
    ///
    /// Returns `None` if the proxy has been revoked.
    pub fn handler(&self) -> Option<Object> {
        self.slots.read().as_ref().map(|s| s.handler.clone())
    }

    /// Check if this proxy has been revoked
    pub fn is_revoked(&self) -> bool {
        self.slots.read().is_none()
    }

    /// Revoke this proxy
    ///
    /// After revocation, every internal method throws a TypeError. Revoking
    /// twice is a no-op.
    pub fn revoke(&self) {
        let previous = self.slots.write().take();
        if previous.is_some() {
            tracing::debug!(target: "otter::proxy", "proxy revoked");
        }
    }

    /// Does this proxy have `[[Call]]`
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Does this proxy have `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    /// Snapshot target and handler for one trap
    ///
    /// Fails when the target lacked the capability the trap requires, then
    /// when the proxy has been revoked.
    pub(crate) fn slots_for(&self, trap: ProxyTrap) -> VmResult<ProxySlots> {
        match trap.capability() {
            Some(TrapCapability::Callable) if !self.callable => {
                return Err(VmError::not_callable("proxy"));
            }
            Some(TrapCapability::Constructor) if !self.constructor => {
                return Err(VmError::not_constructor("proxy"));
            }
            _ => {}
        }
        self.slots
            .read()
            .clone()
            .ok_or_else(|| VmError::revoked(trap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeErrorKind;
    use crate::runtime::VmRuntime;

    #[test]
    fn test_proxy_creation() {
        let ncx = VmRuntime::new().create_context();
        let target = Value::object(ncx.new_object());
        let handler = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&target, &handler).unwrap();

        assert!(!proxy.is_revoked());
        assert_eq!(proxy.target().map(Value::Object), Some(target));
        assert_eq!(proxy.handler().map(Value::Object), Some(handler));
        assert!(!proxy.is_callable());
    }

    #[test]
    fn test_create_rejects_primitives() {
        let ncx = VmRuntime::new().create_context();
        let obj = Value::object(ncx.new_object());
        for bad in [Value::Undefined, Value::Null, Value::int32(1), Value::from("s")] {
            let err = JsProxy::create(&bad, &obj).unwrap_err();
            assert!(err.is_kind(&TypeErrorKind::NotAnObject));
            let err = JsProxy::create(&obj, &bad).unwrap_err();
            assert!(err.is_kind(&TypeErrorKind::NotAnObject));
        }
    }

    #[test]
    fn test_revoke_clears_slots() {
        let ncx = VmRuntime::new().create_context();
        let target = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&target, &target).unwrap();

        proxy.revoke();
        assert!(proxy.is_revoked());
        assert!(proxy.target().is_none());
        assert!(proxy.handler().is_none());
        proxy.revoke();
        assert!(proxy.is_revoked());

        let err = proxy.slots_for(ProxyTrap::Get).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::ProxyRevoked));
    }

    #[test]
    fn test_revocable_function_is_idempotent() {
        let mut ncx = VmRuntime::new().create_context();
        let target = Value::object(ncx.new_object());
        let handler = Value::object(ncx.new_object());
        let RevocableProxy { proxy, revoke } =
            JsProxy::create_revocable(&ncx, &target, &handler).unwrap();

        let revoke = Value::object(revoke);
        for _ in 0..3 {
            let r = ncx.call_function(&revoke, Value::Undefined, &[]).unwrap();
            assert!(r.is_undefined());
        }
        assert!(proxy.is_revoked());
    }

    #[test]
    fn test_callable_bit_survives_revocation() {
        let ncx = VmRuntime::new().create_context();
        let f = create_native_function(&ncx, "f", 0, |_, _, _| Ok(Value::Undefined));
        let handler = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&Value::object(f), &handler).unwrap();

        assert!(proxy.is_callable());
        assert!(!proxy.is_constructor());
        proxy.revoke();
        assert!(proxy.is_callable());
    }

    #[test]
    fn test_capability_checked_before_revocation() {
        let ncx = VmRuntime::new().create_context();
        let target = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&target, &target).unwrap();
        proxy.revoke();

        let err = proxy.slots_for(ProxyTrap::Apply).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::NotCallable));
        let err = proxy.slots_for(ProxyTrap::Construct).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::NotConstructor));
        let err = proxy.slots_for(ProxyTrap::Get).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::ProxyRevoked));
    }

    #[test]
    fn test_debug_format() {
        let ncx = VmRuntime::new().create_context();
        let target = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&target, &target).unwrap();
        proxy.revoke();
        assert_eq!(format!("{proxy:?}"), "Proxy { <revoked> }");
    }
}
