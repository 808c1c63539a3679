//! Bridges the engine's arbitrary-thread frame callback onto the designated
//! context, coalescing redundant signals.
//!
//! The engine may signal far faster than a pass can render; at most one pass
//! is ever queued per session. The pending flag is cleared by the pass
//! itself, first thing, so a signal arriving mid-render queues a fresh pass
//! instead of being dropped.

use crate::main_context::ContextHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type PassFn = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct RenderScheduler {
    pending: Arc<AtomicBool>,
    alive: AtomicBool,
    context_ready: AtomicBool,
    handle: ContextHandle,
    pass: Mutex<Option<PassFn>>,
}

impl RenderScheduler {
    pub(crate) fn new(handle: ContextHandle) -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
            alive: AtomicBool::new(true),
            context_ready: AtomicBool::new(false),
            handle,
            pass: Mutex::new(None),
        }
    }

    /// Shared pending flag, cleared by the render pass on entry.
    pub(crate) fn pending_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pending)
    }

    /// Install the render pass and start accepting signals. Idempotent;
    /// re-arming replaces the pass.
    pub(crate) fn arm(&self, pass: PassFn) {
        *self.pass.lock() = Some(pass);
        self.context_ready.store(true, Ordering::SeqCst);
    }

    /// New-frame signal from the engine. Callable from any thread, at any
    /// time: before the render context is ready and after shutdown it is a
    /// silent no-op.
    pub(crate) fn on_decode_signal(&self) {
        if !self.alive.load(Ordering::SeqCst) || !self.context_ready.load(Ordering::SeqCst) {
            return;
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            // A pass is already queued; coalesce.
            return;
        }
        let pass = self.pass.lock().clone();
        match pass {
            Some(pass) => self.handle.post(move || (*pass)()),
            None => self.pending.store(false, Ordering::SeqCst),
        }
    }

    /// Stop accepting signals. Safe to call more than once.
    pub(crate) fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.context_ready.store(false, Ordering::SeqCst);
        *self.pass.lock() = None;
    }
}
