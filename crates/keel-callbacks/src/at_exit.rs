//! Exit-time closures
//!
//! An [`AtExitManager`] collects [`Closure`]s and runs them newest first,
//! either on demand or when the manager is dropped. Managers live on a
//! process-wide stack and registration always targets the topmost one.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use keel_callbacks::{bind, AtExitManager};
//!
//! let flushed = Arc::new(AtomicUsize::new(0));
//! {
//!     let _manager = AtExitManager::new()?;
//!     let counter = flushed.clone();
//!     AtExitManager::register_closure(bind(
//!         move || {
//!             counter.fetch_add(1, Ordering::SeqCst);
//!         },
//!         (),
//!     ))?;
//!     assert_eq!(flushed.load(Ordering::SeqCst), 0);
//! }
//! assert_eq!(flushed.load(Ordering::SeqCst), 1);
//! # Ok::<(), keel_callbacks::AtExitError>(())
//! ```
//!
//! # Invariants
//!
//! 1. **Single root**: [`AtExitManager::new`] fails while any manager is
//!    alive; [`AtExitManager::shadow`] stacks a fresh one on top instead
//! 2. **LIFO**: closures run in reverse registration order
//! 3. **Unlocked runs**: closures run without the stack lock held, so they
//!    may register more closures; those wait for the next run

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::bind::bind;
use crate::callback::Closure;
use crate::error::AtExitError;

struct Frame {
    id: u64,
    callbacks: Vec<Closure>,
}

static FRAMES: Mutex<Vec<Frame>> = Mutex::new(Vec::new());
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn frames() -> MutexGuard<'static, Vec<Frame>> {
    FRAMES.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_lifo(callbacks: Vec<Closure>) {
    for callback in callbacks.into_iter().rev() {
        if callback.run(()).is_none() {
            tracing::trace!("exit closure skipped, receiver gone");
        }
    }
}

/// Scope that runs its registered closures when dropped.
#[derive(Debug)]
#[must_use = "closures run when the manager is dropped"]
pub struct AtExitManager {
    id: u64,
}

impl AtExitManager {
    /// Create the root manager.
    pub fn new() -> Result<Self, AtExitError> {
        let mut frames = frames();
        if !frames.is_empty() {
            tracing::error!(depth = frames.len(), "exit manager already exists");
            return Err(AtExitError::ManagerExists);
        }
        Ok(Self::push(&mut frames))
    }

    /// Create a manager that hides any existing ones until it is dropped.
    pub fn shadow() -> Self {
        Self::push(&mut frames())
    }

    fn push(frames: &mut Vec<Frame>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        frames.push(Frame {
            id,
            callbacks: Vec::new(),
        });
        tracing::debug!(id, depth = frames.len(), "exit manager pushed");
        Self { id }
    }

    /// Register `callback(param)` with the topmost manager.
    pub fn register_callback<T>(callback: fn(T), param: T) -> Result<(), AtExitError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::register_closure(bind(callback, (param,)))
    }

    /// Register `closure` with the topmost manager.
    pub fn register_closure(closure: Closure) -> Result<(), AtExitError> {
        if closure.is_empty() {
            tracing::error!("refusing to register an empty exit closure");
            return Err(AtExitError::EmptyClosure);
        }

        let mut frames = frames();
        let Some(top) = frames.last_mut() else {
            tracing::error!("exit closure registered without a manager");
            return Err(AtExitError::NoManager);
        };
        top.callbacks.push(closure);
        Ok(())
    }

    /// Run and clear the topmost manager's closures, newest first.
    pub fn process_callbacks_now() -> Result<(), AtExitError> {
        let callbacks = {
            let mut frames = frames();
            let Some(top) = frames.last_mut() else {
                tracing::error!("exit closures processed without a manager");
                return Err(AtExitError::NoManager);
            };
            core::mem::take(&mut top.callbacks)
        };

        tracing::debug!(count = callbacks.len(), "running exit closures");
        run_lifo(callbacks);
        Ok(())
    }

    /// Number of live managers.
    pub fn depth() -> usize {
        frames().len()
    }
}

impl Drop for AtExitManager {
    fn drop(&mut self) {
        {
            let frames = frames();
            if frames.last().map(|top| top.id) != Some(self.id) {
                tracing::error!(id = self.id, "exit manager dropped out of order");
            }
        }

        // Closures registered while draining land here again if this frame
        // is still on top.
        loop {
            let callbacks = {
                let mut frames = frames();
                let Some(index) = frames.iter().position(|frame| frame.id == self.id) else {
                    tracing::error!(id = self.id, "exit manager missing from the stack");
                    return;
                };
                if frames[index].callbacks.is_empty() {
                    frames.remove(index);
                    tracing::debug!(id = self.id, depth = frames.len(), "exit manager popped");
                    return;
                }
                core::mem::take(&mut frames[index].callbacks)
            };
            run_lifo(callbacks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::weak;
    use crate::functor::method;
    use std::sync::Arc;

    /// Managers share one process-wide stack, so tests run one at a time.
    static SERIAL: Mutex<()> = Mutex::new(());

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn record(log: Log, entry: &'static str) {
        log.lock().unwrap().push(entry);
    }

    fn push(log: &Log, entry: &'static str) {
        AtExitManager::register_closure(bind(record, (log.clone(), entry))).unwrap();
    }

    fn entries(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_process_runs_all() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();
        let log = Log::default();

        push(&log, "one");
        push(&log, "two");
        push(&log, "one");
        assert!(entries(&log).is_empty());

        AtExitManager::process_callbacks_now().unwrap();
        assert_eq!(entries(&log).len(), 3);

        AtExitManager::process_callbacks_now().unwrap();
        assert_eq!(entries(&log).len(), 3);
    }

    #[test]
    fn test_lifo_order() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();
        let log = Log::default();

        push(&log, "first");
        push(&log, "second");
        push(&log, "third");
        AtExitManager::process_callbacks_now().unwrap();

        assert_eq!(entries(&log), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_register_callback_passes_param() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();

        fn tally(param: (Log, &'static str)) {
            record(param.0, param.1);
        }

        let log = Log::default();
        AtExitManager::register_callback(tally, (log.clone(), "param")).unwrap();
        AtExitManager::process_callbacks_now().unwrap();

        assert_eq!(entries(&log), vec!["param"]);
    }

    #[test]
    fn test_drop_runs_closures() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let log = Log::default();

        let manager = AtExitManager::new().unwrap();
        push(&log, "a");
        push(&log, "b");
        assert_eq!(AtExitManager::depth(), 1);

        drop(manager);
        assert_eq!(entries(&log), vec!["b", "a"]);
        assert_eq!(AtExitManager::depth(), 0);
    }

    #[test]
    fn test_shadow_hides_outer_manager() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let log = Log::default();

        let outer = AtExitManager::new().unwrap();
        push(&log, "outer");
        {
            let _inner = AtExitManager::shadow();
            assert_eq!(AtExitManager::depth(), 2);
            push(&log, "inner");
            AtExitManager::process_callbacks_now().unwrap();
            assert_eq!(entries(&log), vec!["inner"]);
            push(&log, "inner-late");
        }
        assert_eq!(entries(&log), vec!["inner", "inner-late"]);

        drop(outer);
        assert_eq!(entries(&log), vec!["inner", "inner-late", "outer"]);
    }

    #[test]
    fn test_second_root_rejected() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();

        assert_eq!(
            AtExitManager::new().unwrap_err(),
            AtExitError::ManagerExists
        );
        assert_eq!(AtExitManager::depth(), 1);
    }

    #[test]
    fn test_no_manager() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let log = Log::default();

        assert_eq!(
            AtExitManager::register_closure(bind(record, (log.clone(), "lost"))),
            Err(AtExitError::NoManager)
        );
        assert_eq!(
            AtExitManager::process_callbacks_now(),
            Err(AtExitError::NoManager)
        );
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_empty_closure_rejected() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();

        assert_eq!(
            AtExitManager::register_closure(Closure::default()),
            Err(AtExitError::EmptyClosure)
        );
    }

    #[test]
    fn test_closure_can_register_during_processing() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let _manager = AtExitManager::new().unwrap();
        let log = Log::default();

        let later = log.clone();
        AtExitManager::register_closure(bind(
            move || {
                record(later.clone(), "outer");
                push(&later, "nested");
            },
            (),
        ))
        .unwrap();

        AtExitManager::process_callbacks_now().unwrap();
        assert_eq!(entries(&log), vec!["outer"]);

        AtExitManager::process_callbacks_now().unwrap();
        assert_eq!(entries(&log), vec!["outer", "nested"]);
    }

    #[test]
    fn test_drop_drains_closures_registered_while_running() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let log = Log::default();

        let manager = AtExitManager::new().unwrap();
        let later = log.clone();
        AtExitManager::register_closure(bind(move || push(&later, "nested"), ())).unwrap();

        drop(manager);
        assert_eq!(entries(&log), vec!["nested"]);
        assert_eq!(AtExitManager::depth(), 0);
    }

    #[test]
    fn test_weak_receiver_gone_at_exit() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);

        struct Sink {
            log: Log,
        }

        impl Sink {
            fn flush(&self) {
                record(self.log.clone(), "flush");
            }
        }

        let log = Log::default();
        let manager = AtExitManager::new().unwrap();
        let kept = Arc::new(Sink { log: log.clone() });
        let gone = Arc::new(Sink { log: log.clone() });
        AtExitManager::register_closure(bind(method(Sink::flush), (weak(&kept),))).unwrap();
        AtExitManager::register_closure(bind(method(Sink::flush), (weak(&gone),))).unwrap();

        drop(gone);
        drop(manager);
        assert_eq!(entries(&log), vec!["flush"]);
    }
}
