use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic nanosecond time source supplied by the host.
///
/// Only differences between readings are meaningful; the epoch is arbitrary.
pub trait HostClock {
    /// Returns the current monotonic time, in nanoseconds.
    fn now_ns(&self) -> u64;
}

impl<C: HostClock + ?Sized> HostClock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

impl<C: HostClock + ?Sized> HostClock for Box<C> {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

impl<C: HostClock + ?Sized> HostClock for Arc<C> {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// Host wall clock backed by [`Instant`], measured from the moment it was created.
#[derive(Clone, Copy, Debug)]
pub struct StdHostClock {
    origin: Instant,
}

impl StdHostClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdHostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for StdHostClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        // `u64` nanoseconds is ~584 years of uptime.
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Manually driven clock for tests.
///
/// Clones share the same underlying time, so a test can keep one handle while the device
/// under test owns another.
#[derive(Clone, Debug, Default)]
pub struct FakeHostClock {
    now_ns: Arc<AtomicU64>,
}

impl FakeHostClock {
    pub fn new(start_ns: u64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    /// Advances the clock by `ns` nanoseconds.
    ///
    /// # Panics
    ///
    /// Panics if advancing would overflow `u64`.
    pub fn advance(&self, ns: u64) {
        self.now_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| now.checked_add(ns))
            .expect("fake clock overflowed u64::MAX");
    }

    /// Sets the current time. This may move time backwards.
    pub fn set_now_ns(&self, now_ns: u64) {
        self.now_ns.store(now_ns, Ordering::SeqCst);
    }
}

impl HostClock for FakeHostClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}
