//! Fundamental internal methods on [`Object`]
//!
//! Each method dispatches on the object's kind: ordinary objects run the
//! algorithms in `ordinary.rs`, proxies go through `proxy_operations.rs`.
//! Proxy dispatch counts against the context's call-depth guard so that
//! chains of proxies (or a proxy that is its own target's handler) cannot
//! exhaust the native stack.

use crate::context::NativeContext;
use crate::descriptor::PropertyDescriptor;
use crate::error::{TypeErrorKind, VmError, VmResult};
use crate::object::{Object, ObjectKind, PropertyKey};
use crate::ordinary::{
    ordinary_define_own_property, ordinary_delete, ordinary_get, ordinary_get_own_property,
    ordinary_get_prototype_of, ordinary_has_property, ordinary_is_extensible,
    ordinary_own_property_keys, ordinary_prevent_extensions, ordinary_set,
    ordinary_set_prototype_of,
};
use crate::proxy_operations as proxy_ops;
use crate::value::Value;

/// Which own keys [`Object::own_property_keys_with`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnKeysFlags {
    /// Include string (and index) keys
    pub strings: bool,
    /// Include symbol keys
    pub symbols: bool,
    /// Keep only keys whose own descriptor is enumerable
    pub only_enumerable: bool,
}

impl OwnKeysFlags {
    /// Every own key
    pub const ALL: Self = Self {
        strings: true,
        symbols: true,
        only_enumerable: false,
    };

    /// `Object.getOwnPropertyNames`
    pub const STRINGS: Self = Self {
        strings: true,
        symbols: false,
        only_enumerable: false,
    };

    /// `Object.getOwnPropertySymbols`
    pub const SYMBOLS: Self = Self {
        strings: false,
        symbols: true,
        only_enumerable: false,
    };

    /// `Object.keys`
    pub const ENUMERABLE_STRINGS: Self = Self {
        strings: true,
        symbols: false,
        only_enumerable: true,
    };

    fn admits(&self, key: &PropertyKey) -> bool {
        if key.is_symbol() {
            self.symbols
        } else {
            self.strings
        }
    }
}

impl Object {
    /// `[[GetPrototypeOf]]`
    pub fn get_prototype_of(&self, ncx: &mut NativeContext) -> VmResult<Option<Object>> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_get_prototype_of(o)),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_get_prototype_of(ncx, p)),
        }
    }

    /// `[[SetPrototypeOf]]`
    pub fn set_prototype_of(
        &self,
        ncx: &mut NativeContext,
        proto: Option<Object>,
    ) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_set_prototype_of(o, proto)),
            Self::Proxy(p) => {
                ncx.with_frame(|ncx| proxy_ops::proxy_set_prototype_of(ncx, p, proto))
            }
        }
    }

    /// `[[IsExtensible]]`
    pub fn is_extensible(&self, ncx: &mut NativeContext) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_is_extensible(o)),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_is_extensible(ncx, p)),
        }
    }

    /// `[[PreventExtensions]]`
    pub fn prevent_extensions(&self, ncx: &mut NativeContext) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_prevent_extensions(o)),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_prevent_extensions(ncx, p)),
        }
    }

    /// `[[GetOwnProperty]]`
    pub fn get_own_property(
        &self,
        ncx: &mut NativeContext,
        key: &PropertyKey,
    ) -> VmResult<Option<PropertyDescriptor>> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_get_own_property(o, key)),
            Self::Proxy(p) => {
                ncx.with_frame(|ncx| proxy_ops::proxy_get_own_property_descriptor(ncx, p, key))
            }
        }
    }

    /// `[[DefineOwnProperty]]`
    pub fn define_own_property(
        &self,
        ncx: &mut NativeContext,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_define_own_property(o, key, desc)),
            Self::Proxy(p) => {
                ncx.with_frame(|ncx| proxy_ops::proxy_define_property(ncx, p, key, desc))
            }
        }
    }

    /// `[[HasProperty]]`
    pub fn has_property(&self, ncx: &mut NativeContext, key: &PropertyKey) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => ordinary_has_property(ncx, o, key),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_has(ncx, p, key)),
        }
    }

    /// `[[Get]]`
    pub fn get(
        &self,
        ncx: &mut NativeContext,
        key: &PropertyKey,
        receiver: &Value,
    ) -> VmResult<Value> {
        match self {
            Self::Ordinary(o) => ordinary_get(ncx, o, key, receiver),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_get(ncx, p, key, receiver)),
        }
    }

    /// `[[Set]]`
    pub fn set(
        &self,
        ncx: &mut NativeContext,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => ordinary_set(ncx, o, key, value, receiver),
            Self::Proxy(p) => {
                ncx.with_frame(|ncx| proxy_ops::proxy_set(ncx, p, key, value, receiver))
            }
        }
    }

    /// `[[Delete]]`
    pub fn delete(&self, ncx: &mut NativeContext, key: &PropertyKey) -> VmResult<bool> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_delete(o, key)),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_delete_property(ncx, p, key)),
        }
    }

    /// `[[OwnPropertyKeys]]`
    pub fn own_property_keys(&self, ncx: &mut NativeContext) -> VmResult<Vec<PropertyKey>> {
        match self {
            Self::Ordinary(o) => Ok(ordinary_own_property_keys(o)),
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_own_keys(ncx, p)),
        }
    }

    /// `[[Call]]`
    pub fn call(&self, ncx: &mut NativeContext, this: Value, args: &[Value]) -> VmResult<Value> {
        match self {
            Self::Ordinary(o) => match o.kind() {
                ObjectKind::Function(f) => ncx.with_frame(|ncx| (f.call)(&this, args, ncx)),
                _ => Err(VmError::not_callable("object")),
            },
            Self::Proxy(p) => ncx.with_frame(|ncx| proxy_ops::proxy_call(ncx, p, this, args)),
        }
    }

    /// `[[Construct]]`
    pub fn construct(
        &self,
        ncx: &mut NativeContext,
        args: &[Value],
        new_target: &Object,
    ) -> VmResult<Object> {
        match self {
            Self::Ordinary(o) => {
                let ctor = o
                    .as_function()
                    .and_then(|f| f.construct.clone())
                    .ok_or_else(|| VmError::not_constructor("object"))?;
                let result = ncx.with_frame(|ncx| ctor(args, new_target, ncx))?;
                result
                    .as_object()
                    .ok_or_else(|| VmError::type_error("Constructor did not return an object"))
            }
            Self::Proxy(p) => {
                ncx.with_frame(|ncx| proxy_ops::proxy_construct(ncx, p, args, new_target))
            }
        }
    }

    /// Own keys filtered by kind and, optionally, enumerability
    ///
    /// Enumerability is read with `[[GetOwnProperty]]` per key, so on a proxy
    /// this runs the `getOwnPropertyDescriptor` trap for each candidate.
    pub fn own_property_keys_with(
        &self,
        ncx: &mut NativeContext,
        flags: OwnKeysFlags,
    ) -> VmResult<Vec<PropertyKey>> {
        let keys = self.own_property_keys(ncx)?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if !flags.admits(&key) {
                continue;
            }
            if flags.only_enumerable {
                match self.get_own_property(ncx, &key)? {
                    Some(desc) if desc.enumerable == Some(true) => {}
                    _ => continue,
                }
            }
            out.push(key);
        }
        Ok(out)
    }
}

/// IsArray (ES §7.2.2), seeing through proxies
pub fn is_array(value: &Value) -> VmResult<bool> {
    let mut current = match value {
        Value::Object(obj) => obj.clone(),
        _ => return Ok(false),
    };
    loop {
        match current {
            Object::Ordinary(o) => return Ok(o.is_array()),
            Object::Proxy(p) => match p.target() {
                Some(target) => current = target,
                None => {
                    return Err(VmError::type_error_with(
                        TypeErrorKind::ProxyRevoked,
                        "Cannot perform 'IsArray' on a proxy that has been revoked",
                    ));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::create_array_from_list;
    use crate::function::{create_native_constructor, create_native_function};
    use crate::gc::GcRef;
    use crate::object::{JsObject, PropertyAttributes, PropertySlot};
    use crate::proxy::JsProxy;
    use crate::runtime::VmRuntime;
    use crate::value::Symbol;

    #[test]
    fn test_ordinary_get_walks_prototype() {
        let mut ncx = VmRuntime::new().create_context();
        let parent = ncx.new_object();
        parent.set("inherited".into(), Value::int32(1));
        let child = Object::Ordinary(GcRef::new(JsObject::new(Some(parent.into()))));
        let receiver = Value::Object(child.clone());

        let got = child.get(&mut ncx, &"inherited".into(), &receiver).unwrap();
        assert_eq!(got, Value::int32(1));
        assert!(child.has_property(&mut ncx, &"inherited".into()).unwrap());
        assert!(child.get_own_property(&mut ncx, &"inherited".into()).unwrap().is_none());
    }

    #[test]
    fn test_ordinary_set_creates_on_receiver() {
        let mut ncx = VmRuntime::new().create_context();
        let parent = ncx.new_object();
        parent.set("x".into(), Value::int32(1));
        let child = GcRef::new(JsObject::new(Some(parent.clone().into())));
        let obj = Object::Ordinary(child.clone());

        let receiver = Value::Object(obj.clone());
        assert!(obj.set(&mut ncx, &"x".into(), Value::int32(2), &receiver).unwrap());
        assert_eq!(child.get_own_value(&"x".into()), Some(Value::int32(2)));
        assert_eq!(parent.get_own_value(&"x".into()), Some(Value::int32(1)));
    }

    #[test]
    fn test_setter_receives_receiver() {
        let mut ncx = VmRuntime::new().create_context();
        let obj = ncx.new_object();
        let setter = create_native_function(&ncx, "set", 1, |this, args, _| {
            if let Some(Object::Ordinary(o)) = this.as_object() {
                o.set("seen".into(), args[0].clone());
            }
            Ok(Value::Undefined)
        });
        obj.define_property(
            "x".into(),
            PropertySlot::Accessor {
                get: None,
                set: Some(setter.into()),
                attributes: PropertyAttributes::data(),
            },
        );
        let handle = Object::Ordinary(obj.clone());
        let receiver = Value::Object(handle.clone());
        assert!(handle.set(&mut ncx, &"x".into(), Value::int32(9), &receiver).unwrap());
        assert_eq!(obj.get_own_value(&"seen".into()), Some(Value::int32(9)));
        // Getter is absent
        assert!(handle.get(&mut ncx, &"x".into(), &receiver).unwrap().is_undefined());
    }

    #[test]
    fn test_call_and_construct_ordinary() {
        let mut ncx = VmRuntime::new().create_context();
        let plain = Object::Ordinary(ncx.new_object());
        let err = plain.call(&mut ncx, Value::Undefined, &[]).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::NotCallable));

        let ctor = create_native_constructor(
            &ncx,
            "Point",
            0,
            |_, _, _| Ok(Value::Undefined),
            |_, _, ncx| Ok(Value::object(ncx.new_object())),
        );
        let ctor = Object::Ordinary(ctor);
        assert!(ctor.construct(&mut ncx, &[], &ctor).is_ok());

        let f = create_native_function(&ncx, "f", 0, |_, _, _| Ok(Value::Undefined));
        let f = Object::Ordinary(f);
        let err = f.construct(&mut ncx, &[], &f).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::NotConstructor));
    }

    #[test]
    fn test_own_keys_with_flags() {
        let mut ncx = VmRuntime::new().create_context();
        let obj = ncx.new_object();
        let sym = PropertyKey::symbol(Symbol::new(Some("s")));
        obj.set("a".into(), Value::int32(1));
        obj.set(sym.clone(), Value::int32(2));
        obj.define_property(
            "hidden".into(),
            PropertySlot::data_with_attrs(Value::int32(3), PropertyAttributes::frozen()),
        );
        let obj = Object::Ordinary(obj);

        assert_eq!(
            obj.own_property_keys_with(&mut ncx, OwnKeysFlags::STRINGS).unwrap(),
            vec![PropertyKey::string("a"), PropertyKey::string("hidden")]
        );
        assert_eq!(
            obj.own_property_keys_with(&mut ncx, OwnKeysFlags::SYMBOLS).unwrap(),
            vec![sym]
        );
        assert_eq!(
            obj.own_property_keys_with(&mut ncx, OwnKeysFlags::ENUMERABLE_STRINGS).unwrap(),
            vec![PropertyKey::string("a")]
        );
        assert_eq!(obj.own_property_keys_with(&mut ncx, OwnKeysFlags::ALL).unwrap().len(), 3);
    }

    #[test]
    fn test_is_array_through_proxy() {
        let ncx = VmRuntime::new().create_context();
        let arr = Value::object(create_array_from_list(&ncx, &[]));
        let handler = Value::object(ncx.new_object());
        let proxy = JsProxy::create(&arr, &handler).unwrap();
        let outer = JsProxy::create(&Value::proxy(proxy.clone()), &handler).unwrap();

        assert!(is_array(&arr).unwrap());
        assert!(is_array(&Value::proxy(outer.clone())).unwrap());
        assert!(!is_array(&Value::object(ncx.new_object())).unwrap());
        assert!(!is_array(&Value::int32(1)).unwrap());

        proxy.revoke();
        let err = is_array(&Value::proxy(outer)).unwrap_err();
        assert!(err.is_kind(&TypeErrorKind::ProxyRevoked));
    }
}
