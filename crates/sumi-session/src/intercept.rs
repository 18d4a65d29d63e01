//! Update interceptors: caller-supplied predicates that can suppress
//! default change handling.
//!
//! On every change event the chain is evaluated in registration order. The
//! first interceptor returning `true` wins: no update callback fires, no
//! debounced write is scheduled, and no later interceptor runs. Interceptors
//! inspect the event but never transform it.

use std::sync::Arc;

use sumi_types::ChangeEvent;

/// A predicate over change events.
///
/// Blanket-implemented for closures, so hosts can register either a type
/// implementing this trait or a plain `Fn(&ChangeEvent) -> bool`.
pub trait UpdateInterceptor: Send + Sync {
    /// Return `true` to suppress default handling of this event.
    fn should_suppress(&self, event: &ChangeEvent) -> bool;
}

impl<F> UpdateInterceptor for F
where
    F: Fn(&ChangeEvent) -> bool + Send + Sync,
{
    fn should_suppress(&self, event: &ChangeEvent) -> bool {
        self(event)
    }
}

/// Ordered interceptor list with short-circuit evaluation.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn UpdateInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(interceptors: Vec<Arc<dyn UpdateInterceptor>>) -> Self {
        Self { interceptors }
    }

    /// Append an interceptor; evaluation order is registration order.
    pub fn push(&mut self, interceptor: Arc<dyn UpdateInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Logical-OR fold: stops at the first interceptor that returns `true`.
    pub fn suppresses(&self, event: &ChangeEvent) -> bool {
        self.interceptors
            .iter()
            .any(|i| i.should_suppress(event))
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
