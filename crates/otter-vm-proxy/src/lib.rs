//! # Otter VM Proxy
//!
//! Proxy exotic objects for the Otter JavaScript/TypeScript runtime.
//!
//! ## Design Principles
//!
//! - **Transparent by default**: a handler without a trap forwards the
//!   operation to the target unchanged
//! - **Validated traps**: every trap result is checked against the target's
//!   real state and rejected with a `TypeError` when it lies
//! - **Reentrancy safe**: traps run arbitrary managed code; no lock is held
//!   across a trap call and proxy state is re-read per operation
//! - **Thread-safe**: Values are `Send + Sync`, matching the rest of the VM

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod array;
pub mod builtins;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod function;
pub mod gc;
pub mod internal_methods;
pub mod object;
mod ordinary;
pub mod proxy;
pub mod proxy_operations;
pub mod runtime;
pub mod string;
pub mod trap;
pub mod value;

pub use context::NativeContext;
pub use descriptor::PropertyDescriptor;
pub use error::{TypeErrorKind, VmError, VmResult};
pub use gc::GcRef;
pub use internal_methods::{OwnKeysFlags, is_array};
pub use object::{JsObject, Object, PropertyAttributes, PropertyKey, PropertySlot};
pub use ordinary::is_compatible_property_descriptor;
pub use proxy::{JsProxy, RevocableProxy};
pub use runtime::{RuntimeConfig, VmRuntime};
pub use string::JsString;
pub use trap::ProxyTrap;
pub use value::{Symbol, Value};
