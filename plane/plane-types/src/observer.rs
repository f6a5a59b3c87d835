//! Fire-and-forget progress notifications.
//!
//! Engines report progress (a plane was segmented, two planes were matched)
//! through an injected [`Observer`]. The engine never reads anything back, so
//! a viewer, a logger or a test probe can all sit behind the same hook.
//!
//! Closures implement [`Observer`] directly:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use plane_types::{Observer, SharedObserver};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let observer = SharedObserver::new(move |event: &u32| sink.lock().unwrap().push(*event));
//!
//! observer.notify(&7);
//! assert_eq!(*seen.lock().unwrap(), vec![7]);
//! ```

use std::fmt;
use std::sync::Arc;

/// Receiver of engine events of type `E`.
pub trait Observer<E>: Send + Sync {
    /// Called once per event, synchronously, on the engine's thread.
    fn notify(&self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn notify(&self, event: &E) {
        self(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<E> Observer<E> for NoopObserver {
    fn notify(&self, _event: &E) {}
}

/// Cloneable, thread-safe handle around an [`Observer`] that implements
/// `Debug`, so engines holding one can still derive it.
pub struct SharedObserver<E>(Arc<dyn Observer<E>>);

impl<E> SharedObserver<E> {
    /// Wraps an observer.
    pub fn new<O>(observer: O) -> Self
    where
        O: Observer<E> + 'static,
    {
        Self(Arc::new(observer))
    }

    /// Forwards an event to the wrapped observer.
    pub fn notify(&self, event: &E) {
        self.0.notify(event);
    }
}

impl<E> Clone for SharedObserver<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for SharedObserver<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedObserver(<observer>)")
    }
}

impl<E: 'static> Default for SharedObserver<E> {
    fn default() -> Self {
        Self::new(NoopObserver)
    }
}
