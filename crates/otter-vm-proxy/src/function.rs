//! Native functions
//!
//! A function is an ordinary object whose [`ObjectKind`] carries Rust
//! closures for `[[Call]]` and, optionally, `[[Construct]]`.

use std::sync::Arc;

use crate::context::NativeContext;
use crate::error::VmResult;
use crate::gc::GcRef;
use crate::object::{JsObject, Object, ObjectKind, PropertyAttributes, PropertyKey, PropertySlot};
use crate::string::{JsString, well_known};
use crate::value::Value;

/// Native `[[Call]]` handler: `(this, args, ncx)`
pub type NativeFn =
    Arc<dyn Fn(&Value, &[Value], &mut NativeContext) -> VmResult<Value> + Send + Sync>;

/// Native `[[Construct]]` handler: `(args, new_target, ncx)`
pub type NativeCtorFn =
    Arc<dyn Fn(&[Value], &Object, &mut NativeContext) -> VmResult<Value> + Send + Sync>;

/// Call/construct behaviour of a native function object
#[derive(Clone)]
pub struct NativeFunction {
    /// Function name, for diagnostics
    pub name: Arc<JsString>,
    /// `[[Call]]`
    pub call: NativeFn,
    /// `[[Construct]]`, if this function is a constructor
    pub construct: Option<NativeCtorFn>,
}

impl NativeFunction {
    /// Does this function have `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        self.construct.is_some()
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Create a plain (non-constructor) native function object
pub fn create_native_function<F>(
    ncx: &NativeContext,
    name: &str,
    length: u32,
    f: F,
) -> GcRef<JsObject>
where
    F: Fn(&Value, &[Value], &mut NativeContext) -> VmResult<Value> + Send + Sync + 'static,
{
    alloc_function(ncx, name, length, Arc::new(f), None)
}

/// Create a native function object that can also be used with `new`
pub fn create_native_constructor<F, C>(
    ncx: &NativeContext,
    name: &str,
    length: u32,
    call: F,
    construct: C,
) -> GcRef<JsObject>
where
    F: Fn(&Value, &[Value], &mut NativeContext) -> VmResult<Value> + Send + Sync + 'static,
    C: Fn(&[Value], &Object, &mut NativeContext) -> VmResult<Value> + Send + Sync + 'static,
{
    alloc_function(ncx, name, length, Arc::new(call), Some(Arc::new(construct)))
}

fn alloc_function(
    ncx: &NativeContext,
    name: &str,
    length: u32,
    call: NativeFn,
    construct: Option<NativeCtorFn>,
) -> GcRef<JsObject> {
    let name = JsString::intern(name);
    let func = GcRef::new(JsObject::with_kind(
        Some(ncx.function_prototype()),
        ObjectKind::Function(NativeFunction {
            name: name.clone(),
            call,
            construct,
        }),
    ));

    // `length` and `name` are non-writable, non-enumerable, configurable.
    let attrs = PropertyAttributes {
        writable: false,
        enumerable: false,
        configurable: true,
    };
    func.define_property(
        PropertyKey::String(well_known::LENGTH.clone()),
        PropertySlot::data_with_attrs(Value::number(length as f64), attrs),
    );
    func.define_property(
        PropertyKey::String(well_known::NAME.clone()),
        PropertySlot::data_with_attrs(Value::string(name), attrs),
    );
    func
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    #[test]
    fn test_function_metadata() {
        let ncx = VmRuntime::new().create_context();
        let f = create_native_function(&ncx, "answer", 0, |_, _, _| Ok(Value::int32(42)));
        assert_eq!(f.get_own_value(&PropertyKey::string("name")), Some(Value::from("answer")));
        assert_eq!(f.get_own_value(&PropertyKey::string("length")), Some(Value::int32(0)));
        assert!(Object::Ordinary(f.clone()).is_callable());
        assert!(!Object::Ordinary(f).is_constructor());
    }

    #[test]
    fn test_call_native_function() {
        let mut ncx = VmRuntime::new().create_context();
        let f = create_native_function(&ncx, "add", 2, |_, args, _| {
            let a = args.first().and_then(Value::as_number).unwrap_or(0.0);
            let b = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::number(a + b))
        });
        let result = ncx
            .call_function(&Value::object(f), Value::Undefined, &[Value::int32(2), Value::int32(3)])
            .unwrap();
        assert_eq!(result, Value::int32(5));
    }
}
