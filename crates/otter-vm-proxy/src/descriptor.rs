//! Property Descriptor records (ES §6.2.6)
//!
//! Unlike [`PropertySlot`], a descriptor may be partial: every field is
//! independently present or absent. `get`/`set` use `Some(Value::Undefined)`
//! for an explicitly undefined accessor half.

use crate::context::NativeContext;
use crate::error::{VmError, VmResult};
use crate::object::{Object, PropertyAttributes, PropertyKey, PropertySlot};
use crate::string::well_known;
use crate::value::Value;

/// Partial property descriptor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// \[\[Value]]
    pub value: Option<Value>,
    /// \[\[Writable]]
    pub writable: Option<bool>,
    /// \[\[Get]]
    pub get: Option<Value>,
    /// \[\[Set]]
    pub set: Option<Value>,
    /// \[\[Enumerable]]
    pub enumerable: Option<bool>,
    /// \[\[Configurable]]
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Fully populated data descriptor
    pub fn data(value: Value, attributes: PropertyAttributes) -> Self {
        Self {
            value: Some(value),
            writable: Some(attributes.writable),
            enumerable: Some(attributes.enumerable),
            configurable: Some(attributes.configurable),
            ..Default::default()
        }
    }

    /// Data descriptor as produced by CreateDataProperty
    pub fn new_data_descriptor(value: Value) -> Self {
        Self::data(value, PropertyAttributes::data())
    }

    /// Fully populated accessor descriptor
    pub fn accessor(
        get: Option<Object>,
        set: Option<Object>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            get: Some(accessor_half(get)),
            set: Some(accessor_half(set)),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    /// Descriptor for a stored slot
    pub fn from_slot(slot: &PropertySlot) -> Self {
        match slot {
            PropertySlot::Data { value, attributes } => Self::data(value.clone(), *attributes),
            PropertySlot::Accessor {
                get,
                set,
                attributes,
            } => Self::accessor(
                get.clone(),
                set.clone(),
                attributes.enumerable,
                attributes.configurable,
            ),
        }
    }

    /// IsAccessorDescriptor
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// IsDataDescriptor
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// IsGenericDescriptor
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// True if no field is present
    pub fn has_fields(&self) -> bool {
        self.value.is_some()
            || self.writable.is_some()
            || self.get.is_some()
            || self.set.is_some()
            || self.enumerable.is_some()
            || self.configurable.is_some()
    }

    /// `[[Configurable]]` is present and true
    pub fn is_configurable(&self) -> bool {
        self.configurable == Some(true)
    }

    /// `[[Writable]]` is present and true
    pub fn is_writable(&self) -> bool {
        self.writable == Some(true)
    }

    /// Getter as a callable object, if present and not undefined
    pub fn getter(&self) -> Option<Object> {
        self.get.as_ref().and_then(Value::as_object)
    }

    /// Setter as a callable object, if present and not undefined
    pub fn setter(&self) -> Option<Object> {
        self.set.as_ref().and_then(Value::as_object)
    }

    /// CompletePropertyDescriptor (ES §6.2.6.6)
    pub fn complete(&mut self) {
        if self.is_generic_descriptor() || self.is_data_descriptor() {
            self.value.get_or_insert(Value::Undefined);
            self.writable.get_or_insert(false);
        } else {
            self.get.get_or_insert(Value::Undefined);
            self.set.get_or_insert(Value::Undefined);
        }
        self.enumerable.get_or_insert(false);
        self.configurable.get_or_insert(false);
    }

    /// Convert a complete descriptor into a stored slot; absent fields
    /// take their defaults
    pub fn into_slot(self) -> PropertySlot {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor_descriptor() {
            PropertySlot::Accessor {
                get: self.getter(),
                set: self.setter(),
                attributes: PropertyAttributes {
                    writable: false,
                    enumerable,
                    configurable,
                },
            }
        } else {
            PropertySlot::Data {
                value: self.value.unwrap_or_default(),
                attributes: PropertyAttributes {
                    writable: self.writable.unwrap_or(false),
                    enumerable,
                    configurable,
                },
            }
        }
    }
}

fn accessor_half(func: Option<Object>) -> Value {
    func.map_or(Value::Undefined, Value::Object)
}

/// FromPropertyDescriptor (ES §6.2.6.4): a fresh descriptor object
pub fn from_property_descriptor(ncx: &NativeContext, desc: &PropertyDescriptor) -> Value {
    let obj = ncx.new_object();
    let fields: [(&PropertyKey, Option<Value>); 6] = [
        (&*well_known_key::VALUE, desc.value.clone()),
        (&*well_known_key::WRITABLE, desc.writable.map(Value::boolean)),
        (&*well_known_key::GET, desc.get.clone()),
        (&*well_known_key::SET, desc.set.clone()),
        (&*well_known_key::ENUMERABLE, desc.enumerable.map(Value::boolean)),
        (&*well_known_key::CONFIGURABLE, desc.configurable.map(Value::boolean)),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            obj.set(key.clone(), value);
        }
    }
    Value::object(obj)
}

/// ToPropertyDescriptor (ES §6.2.6.5)
///
/// Reads through `[[HasProperty]]` and `[[Get]]`, so `value` may itself be a
/// proxy whose traps run here.
pub fn to_property_descriptor(
    ncx: &mut NativeContext,
    value: &Value,
) -> VmResult<PropertyDescriptor> {
    let obj = value
        .as_object()
        .ok_or_else(|| VmError::type_error("Property description must be an object"))?;

    let mut desc = PropertyDescriptor::default();
    if let Some(v) = read_field(ncx, &obj, &well_known_key::ENUMERABLE)? {
        desc.enumerable = Some(v.to_boolean());
    }
    if let Some(v) = read_field(ncx, &obj, &well_known_key::CONFIGURABLE)? {
        desc.configurable = Some(v.to_boolean());
    }
    if let Some(v) = read_field(ncx, &obj, &well_known_key::VALUE)? {
        desc.value = Some(v);
    }
    if let Some(v) = read_field(ncx, &obj, &well_known_key::WRITABLE)? {
        desc.writable = Some(v.to_boolean());
    }
    if let Some(getter) = read_field(ncx, &obj, &well_known_key::GET)? {
        if !getter.is_callable() && !getter.is_undefined() {
            return Err(VmError::type_error(format!(
                "Getter must be a function: {getter:?}"
            )));
        }
        desc.get = Some(getter);
    }
    if let Some(setter) = read_field(ncx, &obj, &well_known_key::SET)? {
        if !setter.is_callable() && !setter.is_undefined() {
            return Err(VmError::type_error(format!(
                "Setter must be a function: {setter:?}"
            )));
        }
        desc.set = Some(setter);
    }
    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(VmError::type_error(
            "Invalid property descriptor. \
             Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

fn read_field(ncx: &mut NativeContext, obj: &Object, key: &PropertyKey) -> VmResult<Option<Value>> {
    if !obj.has_property(ncx, key)? {
        return Ok(None);
    }
    let receiver = Value::Object(obj.clone());
    obj.get(ncx, key, &receiver).map(Some)
}

/// Descriptor field names as property keys
pub(crate) mod well_known_key {
    use super::*;
    use std::sync::LazyLock;

    macro_rules! key {
        ($name:ident) => {
            pub static $name: LazyLock<PropertyKey> =
                LazyLock::new(|| PropertyKey::String(well_known::$name.clone()));
        };
    }

    key!(VALUE);
    key!(WRITABLE);
    key!(GET);
    key!(SET);
    key!(ENUMERABLE);
    key!(CONFIGURABLE);
    key!(LENGTH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let data = PropertyDescriptor {
            writable: Some(true),
            ..Default::default()
        };
        assert!(data.is_data_descriptor());
        assert!(!data.is_accessor_descriptor());

        let accessor = PropertyDescriptor {
            get: Some(Value::Undefined),
            ..Default::default()
        };
        assert!(accessor.is_accessor_descriptor());

        let generic = PropertyDescriptor {
            enumerable: Some(true),
            ..Default::default()
        };
        assert!(generic.is_generic_descriptor());
        assert!(generic.has_fields());
        assert!(!PropertyDescriptor::default().has_fields());
    }

    #[test]
    fn test_complete_generic_becomes_data() {
        let mut desc = PropertyDescriptor {
            configurable: Some(true),
            ..Default::default()
        };
        desc.complete();
        assert_eq!(desc.value, Some(Value::Undefined));
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.enumerable, Some(false));
        assert_eq!(desc.configurable, Some(true));
        assert!(desc.get.is_none());
    }

    #[test]
    fn test_complete_accessor() {
        let mut desc = PropertyDescriptor {
            set: Some(Value::Undefined),
            ..Default::default()
        };
        desc.complete();
        assert_eq!(desc.get, Some(Value::Undefined));
        assert!(desc.value.is_none());
        assert!(desc.writable.is_none());
    }

    #[test]
    fn test_round_trip_through_object() {
        let mut ncx = crate::runtime::VmRuntime::new().create_context();
        let desc = PropertyDescriptor {
            value: Some(Value::int32(1)),
            writable: Some(false),
            ..Default::default()
        };
        let obj = from_property_descriptor(&ncx, &desc);
        let back = to_property_descriptor(&mut ncx, &obj).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn test_mixed_descriptor_rejected() {
        let mut ncx = crate::runtime::VmRuntime::new().create_context();
        let obj = ncx.new_object();
        obj.set(PropertyKey::string("value"), Value::int32(1));
        obj.set(PropertyKey::string("get"), Value::Undefined);
        let err = to_property_descriptor(&mut ncx, &Value::object(obj)).unwrap_err();
        assert!(err.to_string().contains("Invalid property descriptor"));
    }

    #[test]
    fn test_non_object_rejected() {
        let mut ncx = crate::runtime::VmRuntime::new().create_context();
        assert!(to_property_descriptor(&mut ncx, &Value::int32(3)).is_err());
    }
}
