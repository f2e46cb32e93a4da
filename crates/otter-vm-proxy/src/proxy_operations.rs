//! Proxy trap operations implementing ES2026 §10.5
//!
//! Every entry point follows the same shape: snapshot the proxy's target and
//! handler (failing if revoked), look the trap up on the handler, forward to
//! the target when it is absent, otherwise call it and validate the result
//! against the target's actual state. Target state is re-read after the trap
//! returns, through the target's own internal methods, so nested proxies are
//! validated through their own traps.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::array::{create_array_from_list, create_list_from_array_like};
use crate::context::NativeContext;
use crate::descriptor::{PropertyDescriptor, from_property_descriptor, to_property_descriptor};
use crate::error::{VmError, VmResult};
use crate::gc::GcRef;
use crate::object::{Object, PropertyKey};
use crate::ordinary::is_compatible_property_descriptor;
use crate::proxy::{JsProxy, ProxySlots};
use crate::trap::{ProxyTrap, TrapResultShape};
use crate::value::{Value, same_value};

/// Look up `trap` on the handler
///
/// Returns:
/// - `Ok(Some(func))` if the handler holds a callable under the trap name
/// - `Ok(None)` if it holds `undefined` or `null` (caller forwards to target)
/// - `Err(...)` if the lookup threw or the value is not callable
fn get_trap(ncx: &mut NativeContext, handler: &Object, trap: ProxyTrap) -> VmResult<Option<Value>> {
    let key = PropertyKey::String(trap.js_name());
    let receiver = Value::Object(handler.clone());
    let func = handler.get(ncx, &key, &receiver)?;

    if func.is_nullish() {
        tracing::trace!(target: "otter::proxy", trap = trap.name(), "forwarding to target");
        return Ok(None);
    }
    if !func.is_callable() {
        return Err(VmError::trap_not_callable(trap));
    }
    Ok(Some(func))
}

/// Call a trap with the handler as `this`
fn call_trap(
    ncx: &mut NativeContext,
    trap: ProxyTrap,
    func: &Value,
    handler: &Object,
    args: &[Value],
) -> VmResult<Value> {
    tracing::trace!(
        target: "otter::proxy",
        trap = trap.name(),
        method = trap.internal_method(),
        depth = ncx.depth(),
        "invoking trap"
    );
    ncx.call_function(func, Value::Object(handler.clone()), args)
}

/// Call a trap whose result is coerced with ToBoolean
fn call_boolean_trap(
    ncx: &mut NativeContext,
    trap: ProxyTrap,
    func: &Value,
    handler: &Object,
    args: &[Value],
) -> VmResult<bool> {
    debug_assert_eq!(trap.result_shape(), TrapResultShape::Boolean);
    Ok(call_trap(ncx, trap, func, handler, args)?.to_boolean())
}

fn violation(trap: ProxyTrap, key: Option<&PropertyKey>, msg: &str) -> VmError {
    tracing::debug!(
        target: "otter::proxy",
        trap = trap.name(),
        key = ?key,
        "invariant violation: {msg}"
    );
    VmError::invariant(trap, key, msg)
}

fn object_or_null(proto: Option<Object>) -> Value {
    proto.map_or(Value::Null, Value::Object)
}

/// ES §10.5.1: [[GetPrototypeOf]]
pub fn proxy_get_prototype_of(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
) -> VmResult<Option<Object>> {
    const TRAP: ProxyTrap = ProxyTrap::GetPrototypeOf;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.get_prototype_of(ncx);
    };

    let result = call_trap(ncx, TRAP, &trap, &handler, &[Value::Object(target.clone())])?;
    let proto = match result {
        Value::Object(o) => Some(o),
        Value::Null => None,
        _ => return Err(violation(TRAP, None, "trap returned neither an object nor null")),
    };

    if target.is_extensible(ncx)? {
        return Ok(proto);
    }
    let target_proto = target.get_prototype_of(ncx)?;
    if proto != target_proto {
        return Err(violation(
            TRAP,
            None,
            "trap result differs from the prototype of the non-extensible target",
        ));
    }
    Ok(proto)
}

/// ES §10.5.2: [[SetPrototypeOf]]
pub fn proxy_set_prototype_of(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    proto: Option<Object>,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::SetPrototypeOf;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.set_prototype_of(ncx, proto);
    };

    let args = [Value::Object(target.clone()), object_or_null(proto.clone())];
    if !call_boolean_trap(ncx, TRAP, &trap, &handler, &args)? {
        return Ok(false);
    }

    if target.is_extensible(ncx)? {
        return Ok(true);
    }
    let target_proto = target.get_prototype_of(ncx)?;
    if proto != target_proto {
        return Err(violation(
            TRAP,
            None,
            "trap returned true but the non-extensible target has a different prototype",
        ));
    }
    Ok(true)
}

/// ES §10.5.3: [[IsExtensible]]
pub fn proxy_is_extensible(ncx: &mut NativeContext, proxy: &GcRef<JsProxy>) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::IsExtensible;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.is_extensible(ncx);
    };

    let args = [Value::Object(target.clone())];
    let result = call_boolean_trap(ncx, TRAP, &trap, &handler, &args)?;
    if result != target.is_extensible(ncx)? {
        return Err(violation(
            TRAP,
            None,
            "trap result does not reflect extensibility of the target",
        ));
    }
    Ok(result)
}

/// ES §10.5.4: [[PreventExtensions]]
pub fn proxy_prevent_extensions(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::PreventExtensions;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.prevent_extensions(ncx);
    };

    let args = [Value::Object(target.clone())];
    let result = call_boolean_trap(ncx, TRAP, &trap, &handler, &args)?;
    if result && target.is_extensible(ncx)? {
        return Err(violation(
            TRAP,
            None,
            "trap returned true but the target is still extensible",
        ));
    }
    Ok(result)
}

/// ES §10.5.5: [[GetOwnProperty]]
pub fn proxy_get_own_property_descriptor(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
) -> VmResult<Option<PropertyDescriptor>> {
    const TRAP: ProxyTrap = ProxyTrap::GetOwnPropertyDescriptor;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.get_own_property(ncx, key);
    };

    let args = [Value::Object(target.clone()), key.to_value()];
    let result = call_trap(ncx, TRAP, &trap, &handler, &args)?;
    if !result.is_object() && !result.is_undefined() {
        return Err(violation(
            TRAP,
            Some(key),
            "trap returned neither an object nor undefined",
        ));
    }

    let target_desc = target.get_own_property(ncx, key)?;
    if result.is_undefined() {
        let Some(target_desc) = target_desc else {
            return Ok(None);
        };
        if !target_desc.is_configurable() {
            return Err(violation(
                TRAP,
                Some(key),
                "cannot report a non-configurable property as non-existent",
            ));
        }
        if !target.is_extensible(ncx)? {
            return Err(violation(
                TRAP,
                Some(key),
                "cannot report an own property of a non-extensible target as non-existent",
            ));
        }
        return Ok(None);
    }

    let extensible_target = target.is_extensible(ncx)?;
    let mut result_desc = to_property_descriptor(ncx, &result)?;
    result_desc.complete();

    if !is_compatible_property_descriptor(extensible_target, &result_desc, target_desc.as_ref()) {
        return Err(violation(
            TRAP,
            Some(key),
            "reported descriptor is incompatible with the target property",
        ));
    }

    if !result_desc.is_configurable() {
        match &target_desc {
            None => {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot report a non-existent property as non-configurable",
                ));
            }
            Some(td) if td.is_configurable() => {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot report a configurable property as non-configurable",
                ));
            }
            Some(td) => {
                if result_desc.writable == Some(false) && td.is_writable() {
                    return Err(violation(
                        TRAP,
                        Some(key),
                        "cannot report a writable property as non-configurable and non-writable",
                    ));
                }
            }
        }
    }

    Ok(Some(result_desc))
}

/// ES §10.5.6: [[DefineOwnProperty]]
pub fn proxy_define_property(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
    desc: PropertyDescriptor,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::DefineProperty;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.define_own_property(ncx, key, desc);
    };

    let desc_obj = from_property_descriptor(ncx, &desc);
    let args = [Value::Object(target.clone()), key.to_value(), desc_obj];
    if !call_boolean_trap(ncx, TRAP, &trap, &handler, &args)? {
        return Ok(false);
    }

    let target_desc = target.get_own_property(ncx, key)?;
    let extensible_target = target.is_extensible(ncx)?;
    let setting_config_false = desc.configurable == Some(false);

    match target_desc {
        None => {
            if !extensible_target {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot add a property to a non-extensible target",
                ));
            }
            if setting_config_false {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot define a non-existent property as non-configurable",
                ));
            }
        }
        Some(target_desc) => {
            if !is_compatible_property_descriptor(extensible_target, &desc, Some(&target_desc)) {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "descriptor is incompatible with the target property",
                ));
            }
            if setting_config_false && target_desc.is_configurable() {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot define a configurable target property as non-configurable",
                ));
            }
            if target_desc.is_data_descriptor()
                && !target_desc.is_configurable()
                && target_desc.is_writable()
                && desc.writable == Some(false)
            {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot make a non-configurable writable property non-writable",
                ));
            }
        }
    }

    Ok(true)
}

/// ES §10.5.7: [[HasProperty]]
pub fn proxy_has(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::Has;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.has_property(ncx, key);
    };

    let args = [Value::Object(target.clone()), key.to_value()];
    let result = call_boolean_trap(ncx, TRAP, &trap, &handler, &args)?;
    if result {
        return Ok(true);
    }

    if let Some(target_desc) = target.get_own_property(ncx, key)? {
        if !target_desc.is_configurable() {
            return Err(violation(
                TRAP,
                Some(key),
                "cannot report a non-configurable property as non-existent",
            ));
        }
        if !target.is_extensible(ncx)? {
            return Err(violation(
                TRAP,
                Some(key),
                "cannot report an own property of a non-extensible target as non-existent",
            ));
        }
    }
    Ok(false)
}

/// ES §10.5.8: [[Get]]
pub fn proxy_get(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    const TRAP: ProxyTrap = ProxyTrap::Get;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.get(ncx, key, receiver);
    };

    let args = [Value::Object(target.clone()), key.to_value(), receiver.clone()];
    let result = call_trap(ncx, TRAP, &trap, &handler, &args)?;

    if let Some(target_desc) = target.get_own_property(ncx, key)? {
        if !target_desc.is_configurable() {
            if target_desc.is_data_descriptor() && !target_desc.is_writable() {
                let expected = target_desc.value.as_ref().unwrap_or(&Value::Undefined);
                if !same_value(&result, expected) {
                    return Err(violation(
                        TRAP,
                        Some(key),
                        "trap result differs from a non-writable, non-configurable value",
                    ));
                }
            }
            if target_desc.is_accessor_descriptor()
                && target_desc.getter().is_none()
                && !result.is_undefined()
            {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "trap must report undefined for a non-configurable accessor without a getter",
                ));
            }
        }
    }
    Ok(result)
}

/// ES §10.5.9: [[Set]]
pub fn proxy_set(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::Set;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.set(ncx, key, value, receiver);
    };

    let args = [
        Value::Object(target.clone()),
        key.to_value(),
        value.clone(),
        receiver.clone(),
    ];
    if !call_boolean_trap(ncx, TRAP, &trap, &handler, &args)? {
        return Ok(false);
    }

    if let Some(target_desc) = target.get_own_property(ncx, key)? {
        if !target_desc.is_configurable() {
            if target_desc.is_data_descriptor() && !target_desc.is_writable() {
                let current = target_desc.value.as_ref().unwrap_or(&Value::Undefined);
                if !same_value(&value, current) {
                    return Err(violation(
                        TRAP,
                        Some(key),
                        "cannot change the value of a non-writable, non-configurable property",
                    ));
                }
            }
            if target_desc.is_accessor_descriptor() && target_desc.setter().is_none() {
                return Err(violation(
                    TRAP,
                    Some(key),
                    "cannot set a non-configurable accessor without a setter",
                ));
            }
        }
    }
    Ok(true)
}

/// ES §10.5.10: [[Delete]]
pub fn proxy_delete_property(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    key: &PropertyKey,
) -> VmResult<bool> {
    const TRAP: ProxyTrap = ProxyTrap::DeleteProperty;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.delete(ncx, key);
    };

    let args = [Value::Object(target.clone()), key.to_value()];
    if !call_boolean_trap(ncx, TRAP, &trap, &handler, &args)? {
        return Ok(false);
    }

    let Some(target_desc) = target.get_own_property(ncx, key)? else {
        return Ok(true);
    };
    if !target_desc.is_configurable() {
        return Err(violation(
            TRAP,
            Some(key),
            "cannot delete a non-configurable property",
        ));
    }
    if !target.is_extensible(ncx)? {
        return Err(violation(
            TRAP,
            Some(key),
            "cannot delete a property of a non-extensible target",
        ));
    }
    Ok(true)
}

/// ES §10.5.11: [[OwnPropertyKeys]]
pub fn proxy_own_keys(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
) -> VmResult<Vec<PropertyKey>> {
    const TRAP: ProxyTrap = ProxyTrap::OwnKeys;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.own_property_keys(ncx);
    };

    let result = call_trap(ncx, TRAP, &trap, &handler, &[Value::Object(target.clone())])?;
    if !result.is_object() {
        return Err(violation(TRAP, None, "trap result must be an object"));
    }

    let elements = create_list_from_array_like(ncx, &result)?;
    let mut trap_keys: Vec<PropertyKey> = Vec::with_capacity(elements.len());
    let mut unchecked: IndexSet<PropertyKey, FxBuildHasher> =
        IndexSet::with_capacity_and_hasher(elements.len(), FxBuildHasher);
    for element in &elements {
        let key = PropertyKey::from_value(element).ok_or_else(|| {
            violation(TRAP, None, "trap result may only contain strings and symbols")
        })?;
        if !unchecked.insert(key.clone()) {
            return Err(violation(TRAP, Some(&key), "trap result contains a duplicate entry"));
        }
        trap_keys.push(key);
    }

    let extensible_target = target.is_extensible(ncx)?;
    let target_keys = target.own_property_keys(ncx)?;
    let mut configurable: SmallVec<[PropertyKey; 8]> = SmallVec::new();
    let mut non_configurable: SmallVec<[PropertyKey; 8]> = SmallVec::new();
    for key in target_keys {
        match target.get_own_property(ncx, &key)? {
            Some(desc) if !desc.is_configurable() => non_configurable.push(key),
            _ => configurable.push(key),
        }
    }

    if extensible_target && non_configurable.is_empty() {
        return Ok(trap_keys);
    }

    for key in &non_configurable {
        if !unchecked.swap_remove(key) {
            return Err(violation(
                TRAP,
                Some(key),
                "trap result must include every non-configurable key of the target",
            ));
        }
    }
    if extensible_target {
        return Ok(trap_keys);
    }

    for key in &configurable {
        if !unchecked.swap_remove(key) {
            return Err(violation(
                TRAP,
                Some(key),
                "trap result must include every key of the non-extensible target",
            ));
        }
    }
    if let Some(extra) = unchecked.first() {
        return Err(violation(
            TRAP,
            Some(extra),
            "trap result cannot add keys to a non-extensible target",
        ));
    }
    Ok(trap_keys)
}

/// ES §10.5.12: [[Call]]
///
/// The caller has already checked that the proxy is callable.
pub fn proxy_call(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    this: Value,
    args: &[Value],
) -> VmResult<Value> {
    const TRAP: ProxyTrap = ProxyTrap::Apply;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.call(ncx, this, args);
    };

    let args_array = Value::object(create_array_from_list(ncx, args));
    let trap_args = [Value::Object(target), this, args_array];
    call_trap(ncx, TRAP, &trap, &handler, &trap_args)
}

/// ES §10.5.13: [[Construct]]
///
/// The caller has already checked that the proxy is a constructor.
pub fn proxy_construct(
    ncx: &mut NativeContext,
    proxy: &GcRef<JsProxy>,
    args: &[Value],
    new_target: &Object,
) -> VmResult<Object> {
    const TRAP: ProxyTrap = ProxyTrap::Construct;
    let ProxySlots { target, handler } = proxy.slots_for(TRAP)?;
    let Some(trap) = get_trap(ncx, &handler, TRAP)? else {
        return target.construct(ncx, args, new_target);
    };

    let args_array = Value::object(create_array_from_list(ncx, args));
    let trap_args = [
        Value::Object(target),
        args_array,
        Value::Object(new_target.clone()),
    ];
    match call_trap(ncx, TRAP, &trap, &handler, &trap_args)? {
        Value::Object(obj) => Ok(obj),
        _ => Err(violation(TRAP, None, "trap returned a non-object")),
    }
}
