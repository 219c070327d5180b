//! Ambient current-context tracking.
//!
//! Each thread carries a stack of entered contexts. Registry operations
//! resolve the context from the top of this stack instead of taking one
//! as an argument, so the code that registers an extension does not need
//! to know which container it runs in.

use std::cell::RefCell;
use std::marker::PhantomData;

use super::{Context, ContextId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Context>> = const { RefCell::new(Vec::new()) };
}

impl Context {
    /// Make this context the calling thread's current context.
    ///
    /// Returns a guard; the previous current context is restored when the
    /// guard drops. Guards nest and must drop in LIFO order.
    #[must_use = "the context stops being current when the guard is dropped"]
    pub fn enter(&self) -> ContextGuard {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(self.clone()));
        ContextGuard {
            id: self.id(),
            _not_send: PhantomData,
        }
    }

    /// The calling thread's current context, if any.
    pub fn current() -> Option<Context> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }
}

/// Guard returned by [`Context::enter`].
///
/// Thread-bound: the stack it pushed onto belongs to the entering thread.
#[derive(Debug)]
pub struct ContextGuard {
    id: ContextId,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(
                popped.map(|context| context.id()),
                Some(self.id),
                "context guards must drop in LIFO order"
            );
        });
    }
}
