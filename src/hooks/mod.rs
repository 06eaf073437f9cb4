//! Extension points for the download pipeline
//!
//! The original action exposed two hook points to collaborators: one to
//! veto a download before anything is written, and one to contribute
//! extra HTTP headers before the core download headers are emitted.
//! Both are modeled here as ordered lists of registered callbacks,
//! invoked synchronously.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};

/// Outcome of a permission hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Continue with the download
    Proceed,
    /// Abort the request; the client receives a Forbidden response
    Halt,
}

/// Callback invoked with the resource id before any header is written.
/// Returning [`HookDecision::Halt`] aborts the request.
pub trait PermissionHook: Send + Sync {
    fn check(&self, resource_id: i64) -> HookDecision;
}

/// Callback invoked with the resource id immediately before the core
/// download headers are emitted. Returned headers are added to the
/// response in registration order.
pub trait HeaderHook: Send + Sync {
    fn headers(&self, resource_id: i64) -> Vec<(HeaderName, HeaderValue)>;
}

/// Ordered registry of download hooks.
///
/// Hooks are registered at construction time and the registry is shared
/// read-only across requests.
#[derive(Clone, Default)]
pub struct HookRegistry {
    permission: Vec<Arc<dyn PermissionHook>>,
    header: Vec<Arc<dyn HeaderHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_permission(&mut self, hook: Arc<dyn PermissionHook>) {
        self.permission.push(hook);
    }

    pub fn register_header(&mut self, hook: Arc<dyn HeaderHook>) {
        self.header.push(hook);
    }

    /// Run the permission hooks in order. The first `Halt` wins and
    /// later hooks are not consulted.
    pub fn check_permissions(&self, resource_id: i64) -> HookDecision {
        for hook in &self.permission {
            if hook.check(resource_id) == HookDecision::Halt {
                return HookDecision::Halt;
            }
        }
        HookDecision::Proceed
    }

    /// Collect extension headers from every header hook, in
    /// registration order.
    pub fn collect_headers(&self, resource_id: i64) -> Vec<(HeaderName, HeaderValue)> {
        self.header
            .iter()
            .flat_map(|hook| hook.headers(resource_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Allow(Arc<AtomicUsize>);

    impl PermissionHook for Allow {
        fn check(&self, _resource_id: i64) -> HookDecision {
            self.0.fetch_add(1, Ordering::SeqCst);
            HookDecision::Proceed
        }
    }

    struct Deny;

    impl PermissionHook for Deny {
        fn check(&self, _resource_id: i64) -> HookDecision {
            HookDecision::Halt
        }
    }

    struct Tag(&'static str, &'static str);

    impl HeaderHook for Tag {
        fn headers(&self, _resource_id: i64) -> Vec<(HeaderName, HeaderValue)> {
            vec![(
                HeaderName::from_static(self.0),
                HeaderValue::from_static(self.1),
            )]
        }
    }

    #[test]
    fn empty_registry_proceeds() {
        let registry = HookRegistry::new();
        assert_eq!(registry.check_permissions(1), HookDecision::Proceed);
        assert!(registry.collect_headers(1).is_empty());
    }

    #[test]
    fn halt_short_circuits_later_hooks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HookRegistry::new();
        registry.register_permission(Arc::new(Allow(calls.clone())));
        registry.register_permission(Arc::new(Deny));
        registry.register_permission(Arc::new(Allow(calls.clone())));

        assert_eq!(registry.check_permissions(7), HookDecision::Halt);
        // the hook after Deny never ran
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn headers_collected_in_registration_order() {
        let mut registry = HookRegistry::new();
        registry.register_header(Arc::new(Tag("x-first", "1")));
        registry.register_header(Arc::new(Tag("x-second", "2")));

        let headers = registry.collect_headers(7);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0.as_str(), "x-first");
        assert_eq!(headers[1].0.as_str(), "x-second");
    }
}
