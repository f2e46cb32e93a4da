//! Proxy constructor builtin
//!
//! - `new Proxy(target, handler)`
//! - `Proxy.revocable(target, handler)`
//!
//! `Proxy` has no `prototype` property and cannot be called without `new`.

use crate::context::NativeContext;
use crate::error::{VmError, VmResult};
use crate::function::{create_native_constructor, create_native_function};
use crate::gc::GcRef;
use crate::object::{JsObject, PropertyAttributes, PropertyKey, PropertySlot};
use crate::proxy::{JsProxy, RevocableProxy};
use crate::string::well_known;
use crate::value::Value;

/// Attributes of builtin methods and global bindings
const BUILTIN_ATTRS: PropertyAttributes = PropertyAttributes {
    writable: true,
    enumerable: false,
    configurable: true,
};

fn target_and_handler(args: &[Value]) -> (Value, Value) {
    (
        args.first().cloned().unwrap_or_default(),
        args.get(1).cloned().unwrap_or_default(),
    )
}

/// `new Proxy(target, handler)`
fn proxy_construct(args: &[Value]) -> VmResult<Value> {
    let (target, handler) = target_and_handler(args);
    Ok(Value::proxy(JsProxy::create(&target, &handler)?))
}

/// `Proxy.revocable(target, handler)` → `{ proxy, revoke }`
fn proxy_revocable(args: &[Value], ncx: &mut NativeContext) -> VmResult<Value> {
    let (target, handler) = target_and_handler(args);
    let RevocableProxy { proxy, revoke } = JsProxy::create_revocable(ncx, &target, &handler)?;

    let result = ncx.new_object();
    result.set(
        PropertyKey::String(well_known::PROXY.clone()),
        Value::proxy(proxy),
    );
    result.set(
        PropertyKey::String(well_known::REVOKE.clone()),
        Value::object(revoke),
    );
    Ok(Value::object(result))
}

/// Create the `Proxy` constructor function object
pub fn create_proxy_constructor(ncx: &NativeContext) -> GcRef<JsObject> {
    let ctor = create_native_constructor(
        ncx,
        "Proxy",
        2,
        |_this, _args, _ncx| Err(VmError::type_error("Constructor Proxy requires 'new'")),
        |args, _new_target, _ncx| proxy_construct(args),
    );

    let revocable =
        create_native_function(ncx, "revocable", 2, |_this, args, ncx| proxy_revocable(args, ncx));
    ctor.define_property(
        PropertyKey::String(well_known::REVOCABLE.clone()),
        PropertySlot::data_with_attrs(Value::object(revocable), BUILTIN_ATTRS),
    );
    ctor
}

/// Install `Proxy` on the context's global object
pub fn install(ncx: &NativeContext) -> GcRef<JsObject> {
    let ctor = create_proxy_constructor(ncx);
    ncx.global().define_property(
        PropertyKey::String(well_known::PROXY_CTOR.clone()),
        PropertySlot::data_with_attrs(Value::object(ctor.clone()), BUILTIN_ATTRS),
    );
    ctor
}
