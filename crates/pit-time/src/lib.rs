//! Host time sources for wall-clock driven device models.
//!
//! Devices in this workspace do not tick on every emulated cycle. Instead they sample a
//! monotonic host clock whenever the guest touches one of their registers and derive the
//! register contents from the elapsed time. In production that clock is backed by
//! [`std::time::Instant`]; unit tests drive devices deterministically via [`FakeHostClock`].

#![forbid(unsafe_code)]

mod clock;
mod ticks;

pub use clock::{FakeHostClock, HostClock, StdHostClock};
pub use ticks::{ticks_from_ns, NS_PER_SEC};
