//! VM runtime - the main entry point
//!
//! The runtime owns configuration and hands out execution contexts.

use crate::context::NativeContext;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum call stack depth
    pub max_stack_depth: usize,
    /// Maximum native call depth
    ///
    /// Calls and proxy dispatches recurse on the host stack, so this bounds
    /// them well before the host thread's stack runs out.
    pub max_native_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: 10_000,
            max_native_depth: 256,
        }
    }
}

/// The VM runtime
///
/// It is `Send + Sync` and can be shared across threads; each thread of
/// managed code runs in its own [`NativeContext`].
#[derive(Debug, Default)]
pub struct VmRuntime {
    config: RuntimeConfig,
}

impl VmRuntime {
    /// Create a new runtime with default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Create a new execution context
    pub fn create_context(&self) -> NativeContext {
        NativeContext::new(self.config.clone())
    }

    /// Get runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_creation() {
        let runtime = VmRuntime::new();
        assert_eq!(runtime.config().max_stack_depth, 10_000);
        assert_eq!(runtime.config().max_native_depth, 256);
    }

    #[test]
    fn test_context_inherits_config() {
        let runtime = VmRuntime::with_config(RuntimeConfig {
            max_stack_depth: 7,
            ..Default::default()
        });
        let ncx = runtime.create_context();
        assert_eq!(ncx.config().max_stack_depth, 7);
        assert_eq!(ncx.depth_limit(), 7);
    }

    #[test]
    fn test_runtime_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VmRuntime>();
    }
}
