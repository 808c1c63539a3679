//! The designated single-threaded execution context.
//!
//! Render passes, frame-available notifications, and the status timer all
//! run as posted tasks on one worker thread, so they never execute
//! concurrently with each other. Posting is cheap and non-blocking; posting
//! after shutdown is a silent no-op.

use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for posting tasks onto the context thread.
#[derive(Clone)]
pub(crate) struct ContextHandle {
    alive: Arc<AtomicBool>,
    tx: Sender<Task>,
}

impl ContextHandle {
    /// Queue `task` for execution on the context thread. Dropped silently
    /// once the context has shut down.
    pub(crate) fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.alive.load(Ordering::Acquire) {
            return;
        }
        let _ = self.tx.send(Box::new(task));
    }
}

/// Owner of the context worker thread; joined on shutdown/drop.
pub(crate) struct MainContext {
    handle: ContextHandle,
    worker: Option<JoinHandle<()>>,
}

impl MainContext {
    pub(crate) fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<Task>();
        let alive = Arc::new(AtomicBool::new(true));
        let alive_ref = Arc::clone(&alive);

        let worker = std::thread::spawn(move || Self::run(rx, alive_ref));

        Self {
            handle: ContextHandle { alive, tx },
            worker: Some(worker),
        }
    }

    fn run(rx: Receiver<Task>, alive: Arc<AtomicBool>) {
        while let Ok(task) = rx.recv() {
            if !alive.load(Ordering::Acquire) {
                break;
            }
            task();
        }
    }

    pub(crate) fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    /// Stop accepting tasks and join the worker. Queued tasks that have not
    /// started yet are discarded.
    pub(crate) fn shutdown(&mut self) {
        self.handle.alive.store(false, Ordering::Release);
        // Wake the worker in case the queue is empty.
        let _ = self.handle.tx.send(Box::new(|| {}));
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.join() {
                match err.downcast_ref::<String>() {
                    Some(e) => log::error!("context thread panicked: {e}"),
                    None => log::error!("context thread panicked with unknown reason"),
                }
            }
        }
    }
}

impl Drop for MainContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Periodic timer that posts a tick task onto the context until dropped.
pub(crate) struct Timer {
    alive: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Timer {
    pub(crate) fn start<F>(handle: ContextHandle, period: Duration, tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let alive = Arc::new(AtomicBool::new(true));
        let alive_ref = Arc::clone(&alive);
        let tick = Arc::new(tick);

        let thread = std::thread::spawn(move || {
            while alive_ref.load(Ordering::Acquire) {
                std::thread::sleep(period);
                if !alive_ref.load(Ordering::Acquire) {
                    break;
                }
                let tick = Arc::clone(&tick);
                handle.post(move || (*tick)());
            }
        });

        Self {
            alive,
            thread: Some(thread),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
