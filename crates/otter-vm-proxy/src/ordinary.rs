//! Ordinary object internal methods (ES §10.1)
//!
//! Every function here re-enters the engine only through [`Object`]
//! dispatch or [`NativeContext::call_function`], and never while holding a
//! property-table lock.

use crate::context::NativeContext;
use crate::descriptor::PropertyDescriptor;
use crate::error::VmResult;
use crate::gc::GcRef;
use crate::object::{JsObject, Object, PropertyAttributes, PropertyKey, PropertySlot};
use crate::value::{Value, same_value};

/// OrdinaryGetPrototypeOf
pub(crate) fn ordinary_get_prototype_of(obj: &JsObject) -> Option<Object> {
    obj.prototype()
}

/// OrdinarySetPrototypeOf, including the prototype-cycle check
pub(crate) fn ordinary_set_prototype_of(obj: &GcRef<JsObject>, proto: Option<Object>) -> bool {
    let current = obj.prototype();
    if current == proto {
        return true;
    }
    if !obj.extensible() {
        return false;
    }

    let this = Object::Ordinary(obj.clone());
    let mut p = proto.clone();
    while let Some(candidate) = p {
        if candidate == this {
            return false;
        }
        match &candidate {
            // A proxy's [[GetPrototypeOf]] is not the ordinary one; stop here.
            Object::Proxy(_) => break,
            Object::Ordinary(o) => p = o.prototype(),
        }
    }

    obj.set_prototype_slot(proto);
    true
}

/// OrdinaryIsExtensible
pub(crate) fn ordinary_is_extensible(obj: &JsObject) -> bool {
    obj.extensible()
}

/// OrdinaryPreventExtensions
pub(crate) fn ordinary_prevent_extensions(obj: &JsObject) -> bool {
    obj.clear_extensible();
    true
}

/// OrdinaryGetOwnProperty
pub(crate) fn ordinary_get_own_property(
    obj: &JsObject,
    key: &PropertyKey,
) -> Option<PropertyDescriptor> {
    obj.get_own_slot(key).as_ref().map(PropertyDescriptor::from_slot)
}

/// OrdinaryDefineOwnProperty
pub(crate) fn ordinary_define_own_property(
    obj: &JsObject,
    key: &PropertyKey,
    desc: PropertyDescriptor,
) -> bool {
    let current = ordinary_get_own_property(obj, key);
    let extensible = obj.extensible();
    validate_and_apply_property_descriptor(Some(obj), key, extensible, desc, current)
}

/// IsCompatiblePropertyDescriptor (ES §10.1.6.2)
pub fn is_compatible_property_descriptor(
    extensible: bool,
    desc: &PropertyDescriptor,
    current: Option<&PropertyDescriptor>,
) -> bool {
    validate_and_apply_property_descriptor(
        None,
        &PropertyKey::Index(0),
        extensible,
        desc.clone(),
        current.cloned(),
    )
}

/// ValidateAndApplyPropertyDescriptor (ES §10.1.6.3)
///
/// With `obj == None` this only validates. `current`, when present, must be
/// fully populated.
pub(crate) fn validate_and_apply_property_descriptor(
    obj: Option<&JsObject>,
    key: &PropertyKey,
    extensible: bool,
    desc: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    let Some(current) = current else {
        if !extensible {
            return false;
        }
        if let Some(obj) = obj {
            obj.write_slot(key.clone(), desc.into_slot());
        }
        return true;
    };

    if !desc.has_fields() {
        return true;
    }

    if !current.is_configurable() {
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some() && desc.enumerable != current.enumerable {
            return false;
        }
        if !desc.is_generic_descriptor()
            && desc.is_accessor_descriptor() != current.is_accessor_descriptor()
        {
            return false;
        }
        if current.is_accessor_descriptor() {
            if let Some(get) = &desc.get {
                if !same_value(get, current.get.as_ref().unwrap_or(&Value::Undefined)) {
                    return false;
                }
            }
            if let Some(set) = &desc.set {
                if !same_value(set, current.set.as_ref().unwrap_or(&Value::Undefined)) {
                    return false;
                }
            }
        } else if !current.is_writable() {
            if desc.writable == Some(true) {
                return false;
            }
            if let Some(value) = &desc.value {
                if !same_value(value, current.value.as_ref().unwrap_or(&Value::Undefined)) {
                    return false;
                }
            }
        }
    }

    if let Some(obj) = obj {
        let configurable = desc.configurable.or(current.configurable).unwrap_or(false);
        let enumerable = desc.enumerable.or(current.enumerable).unwrap_or(false);
        let slot = if current.is_data_descriptor() && desc.is_accessor_descriptor() {
            PropertySlot::Accessor {
                get: desc.getter(),
                set: desc.setter(),
                attributes: PropertyAttributes {
                    writable: false,
                    enumerable,
                    configurable,
                },
            }
        } else if current.is_accessor_descriptor() && desc.is_data_descriptor() {
            PropertySlot::Data {
                value: desc.value.unwrap_or_default(),
                attributes: PropertyAttributes {
                    writable: desc.writable.unwrap_or(false),
                    enumerable,
                    configurable,
                },
            }
        } else {
            let merged = PropertyDescriptor {
                value: desc.value.or(current.value),
                writable: desc.writable.or(current.writable),
                get: desc.get.or(current.get),
                set: desc.set.or(current.set),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
            };
            merged.into_slot()
        };
        obj.write_slot(key.clone(), slot);
    }

    true
}

/// OrdinaryHasProperty
pub(crate) fn ordinary_has_property(
    ncx: &mut NativeContext,
    obj: &JsObject,
    key: &PropertyKey,
) -> VmResult<bool> {
    if obj.has_own(key) {
        return Ok(true);
    }
    match obj.prototype() {
        Some(parent) => parent.has_property(ncx, key),
        None => Ok(false),
    }
}

/// OrdinaryGet
pub(crate) fn ordinary_get(
    ncx: &mut NativeContext,
    obj: &JsObject,
    key: &PropertyKey,
    receiver: &Value,
) -> VmResult<Value> {
    match obj.get_own_slot(key) {
        None => match obj.prototype() {
            Some(parent) => parent.get(ncx, key, receiver),
            None => Ok(Value::Undefined),
        },
        Some(PropertySlot::Data { value, .. }) => Ok(value),
        Some(PropertySlot::Accessor { get, .. }) => match get {
            Some(getter) => getter.call(ncx, receiver.clone(), &[]),
            None => Ok(Value::Undefined),
        },
    }
}

/// OrdinarySet / OrdinarySetWithOwnDescriptor
pub(crate) fn ordinary_set(
    ncx: &mut NativeContext,
    obj: &JsObject,
    key: &PropertyKey,
    value: Value,
    receiver: &Value,
) -> VmResult<bool> {
    let own = match obj.get_own_slot(key) {
        Some(slot) => slot,
        None => match obj.prototype() {
            Some(parent) => return parent.set(ncx, key, value, receiver),
            None => PropertySlot::data(Value::Undefined),
        },
    };

    match own {
        PropertySlot::Data { attributes, .. } => {
            if !attributes.writable {
                return Ok(false);
            }
            let Some(receiver) = receiver.as_object() else {
                return Ok(false);
            };
            match receiver.get_own_property(ncx, key)? {
                Some(existing) => {
                    if existing.is_accessor_descriptor() || !existing.is_writable() {
                        return Ok(false);
                    }
                    let value_desc = PropertyDescriptor {
                        value: Some(value),
                        ..Default::default()
                    };
                    receiver.define_own_property(ncx, key, value_desc)
                }
                None => receiver.define_own_property(
                    ncx,
                    key,
                    PropertyDescriptor::new_data_descriptor(value),
                ),
            }
        }
        PropertySlot::Accessor { set, .. } => match set {
            Some(setter) => {
                setter.call(ncx, receiver.clone(), &[value])?;
                Ok(true)
            }
            None => Ok(false),
        },
    }
}

/// OrdinaryDelete
pub(crate) fn ordinary_delete(obj: &JsObject, key: &PropertyKey) -> bool {
    match obj.get_own_slot(key) {
        None => true,
        Some(slot) if slot.is_configurable() => {
            obj.remove_slot(key);
            true
        }
        Some(_) => false,
    }
}

/// OrdinaryOwnPropertyKeys
pub(crate) fn ordinary_own_property_keys(obj: &JsObject) -> Vec<PropertyKey> {
    obj.own_keys()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen_x(value: Value) -> PropertyDescriptor {
        PropertyDescriptor::data(value, PropertyAttributes::frozen())
    }

    #[test]
    fn test_define_on_non_extensible_fails() {
        let obj = JsObject::new(None);
        ordinary_prevent_extensions(&obj);
        let key = PropertyKey::string("x");
        assert!(!ordinary_define_own_property(
            &obj,
            &key,
            PropertyDescriptor::new_data_descriptor(Value::int32(1))
        ));
    }

    #[test]
    fn test_non_configurable_rules() {
        let obj = JsObject::new(None);
        let key = PropertyKey::string("x");
        assert!(ordinary_define_own_property(&obj, &key, frozen_x(Value::int32(5))));

        // Same value redefinition is allowed
        assert!(ordinary_define_own_property(&obj, &key, frozen_x(Value::int32(5))));
        // Different value is not
        assert!(!ordinary_define_own_property(&obj, &key, frozen_x(Value::int32(6))));
        // Cannot become configurable
        let desc = PropertyDescriptor {
            configurable: Some(true),
            ..Default::default()
        };
        assert!(!ordinary_define_own_property(&obj, &key, desc));
        // Cannot flip to accessor
        let desc = PropertyDescriptor {
            get: Some(Value::Undefined),
            ..Default::default()
        };
        assert!(!ordinary_define_own_property(&obj, &key, desc));
    }

    #[test]
    fn test_partial_define_keeps_other_fields() {
        let obj = JsObject::new(None);
        let key = PropertyKey::string("x");
        obj.set(key.clone(), Value::int32(1));
        let desc = PropertyDescriptor {
            enumerable: Some(false),
            ..Default::default()
        };
        assert!(ordinary_define_own_property(&obj, &key, desc));
        let now = ordinary_get_own_property(&obj, &key).unwrap();
        assert_eq!(now.value, Some(Value::int32(1)));
        assert_eq!(now.writable, Some(true));
        assert_eq!(now.enumerable, Some(false));
        assert_eq!(now.configurable, Some(true));
    }

    #[test]
    fn test_data_to_accessor_conversion() {
        let obj = JsObject::new(None);
        let key = PropertyKey::string("x");
        obj.set(key.clone(), Value::int32(1));
        let desc = PropertyDescriptor {
            set: Some(Value::Undefined),
            ..Default::default()
        };
        assert!(ordinary_define_own_property(&obj, &key, desc));
        let now = ordinary_get_own_property(&obj, &key).unwrap();
        assert!(now.is_accessor_descriptor());
        assert_eq!(now.enumerable, Some(true));
        assert_eq!(now.configurable, Some(true));
    }

    #[test]
    fn test_delete() {
        let obj = JsObject::new(None);
        obj.set(PropertyKey::string("a"), Value::int32(1));
        obj.define_property(
            PropertyKey::string("b"),
            PropertySlot::data_with_attrs(Value::int32(2), PropertyAttributes::frozen()),
        );
        assert!(ordinary_delete(&obj, &PropertyKey::string("a")));
        assert!(!ordinary_delete(&obj, &PropertyKey::string("b")));
        assert!(ordinary_delete(&obj, &PropertyKey::string("missing")));
        assert_eq!(obj.own_keys(), vec![PropertyKey::string("b")]);
    }

    #[test]
    fn test_set_prototype_cycle_rejected() {
        let a = GcRef::new(JsObject::new(None));
        let b = GcRef::new(JsObject::new(Some(Object::Ordinary(a.clone()))));
        assert!(!ordinary_set_prototype_of(&a, Some(Object::Ordinary(b.clone()))));
        assert!(ordinary_set_prototype_of(&a, None));
    }

    #[test]
    fn test_set_prototype_non_extensible() {
        let a = GcRef::new(JsObject::new(None));
        let p = GcRef::new(JsObject::new(None));
        ordinary_prevent_extensions(&a);
        assert!(!ordinary_set_prototype_of(&a, Some(Object::Ordinary(p))));
        // Unchanged prototype still reports success
        assert!(ordinary_set_prototype_of(&a, None));
    }

    #[test]
    fn test_compatible_descriptor() {
        let current = frozen_x(Value::int32(5));
        let same = frozen_x(Value::int32(5));
        let other = frozen_x(Value::int32(6));
        assert!(is_compatible_property_descriptor(false, &same, Some(&current)));
        assert!(!is_compatible_property_descriptor(true, &other, Some(&current)));
        assert!(!is_compatible_property_descriptor(false, &other, None));
        assert!(is_compatible_property_descriptor(true, &other, None));
    }
}
