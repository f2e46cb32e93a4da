//! Native execution context
//!
//! The context is what native code and internal methods thread through every
//! operation: the intrinsic prototypes, the global object, and the call-depth
//! guard that bounds recursion through functions and proxies.

use crate::error::{VmError, VmResult};
use crate::gc::GcRef;
use crate::object::{JsObject, Object, ObjectKind};
use crate::runtime::RuntimeConfig;
use crate::value::Value;

/// Intrinsic objects shared by everything created in one context
#[derive(Clone, Debug)]
pub struct Intrinsics {
    /// `%Object.prototype%`
    pub object_prototype: GcRef<JsObject>,
    /// `%Function.prototype%`
    pub function_prototype: GcRef<JsObject>,
    /// `%Array.prototype%`
    pub array_prototype: GcRef<JsObject>,
}

impl Intrinsics {
    fn new() -> Self {
        let object_prototype = GcRef::new(JsObject::new(None));
        let function_prototype =
            GcRef::new(JsObject::new(Some(Object::Ordinary(object_prototype.clone()))));
        let array_prototype = GcRef::new(JsObject::with_kind(
            Some(Object::Ordinary(object_prototype.clone())),
            ObjectKind::Array,
        ));
        Self {
            object_prototype,
            function_prototype,
            array_prototype,
        }
    }
}

/// Context passed to native functions and internal methods
pub struct NativeContext {
    config: RuntimeConfig,
    intrinsics: Intrinsics,
    global: GcRef<JsObject>,
    /// Current nesting of calls and proxy dispatches
    depth: usize,
}

impl NativeContext {
    /// Create a context with fresh intrinsics
    pub fn new(config: RuntimeConfig) -> Self {
        let intrinsics = Intrinsics::new();
        let global = GcRef::new(JsObject::new(Some(Object::Ordinary(
            intrinsics.object_prototype.clone(),
        ))));
        Self {
            config,
            intrinsics,
            global,
            depth: 0,
        }
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Global object
    pub fn global(&self) -> &GcRef<JsObject> {
        &self.global
    }

    /// `%Function.prototype%` as an object handle
    pub fn function_prototype(&self) -> Object {
        Object::Ordinary(self.intrinsics.function_prototype.clone())
    }

    /// A fresh ordinary object inheriting from `%Object.prototype%`
    pub fn new_object(&self) -> GcRef<JsObject> {
        GcRef::new(JsObject::new(Some(Object::Ordinary(
            self.intrinsics.object_prototype.clone(),
        ))))
    }

    /// A fresh empty array inheriting from `%Array.prototype%`
    pub fn new_array(&self) -> GcRef<JsObject> {
        GcRef::new(JsObject::with_kind(
            Some(Object::Ordinary(self.intrinsics.array_prototype.clone())),
            ObjectKind::Array,
        ))
    }

    /// Current call depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting allowed: the tighter of the stack and native limits
    pub fn depth_limit(&self) -> usize {
        self.config.max_stack_depth.min(self.config.max_native_depth)
    }

    /// Run `f` one level deeper, failing with a stack overflow once the
    /// depth limit is reached
    pub fn with_frame<T>(&mut self, f: impl FnOnce(&mut Self) -> VmResult<T>) -> VmResult<T> {
        if self.depth >= self.depth_limit() {
            tracing::debug!(target: "otter::proxy", depth = self.depth, "native depth exceeded");
            return Err(VmError::StackOverflow);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Call(F, thisArgument, argumentsList)
    pub fn call_function(&mut self, func: &Value, this: Value, args: &[Value]) -> VmResult<Value> {
        match func {
            Value::Object(obj) if obj.is_callable() => obj.call(self, this, args),
            other => Err(VmError::not_callable(&format!("{other:?}"))),
        }
    }

    /// Construct(F, argumentsList, newTarget)
    pub fn construct(
        &mut self,
        ctor: &Value,
        args: &[Value],
        new_target: Option<&Object>,
    ) -> VmResult<Value> {
        match ctor {
            Value::Object(obj) if obj.is_constructor() => {
                let new_target = new_target.unwrap_or(obj).clone();
                obj.construct(self, args, &new_target).map(Value::Object)
            }
            other => Err(VmError::not_constructor(&format!("{other:?}"))),
        }
    }
}
