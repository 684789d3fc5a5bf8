//! Glue between the PIT and a host port-I/O bus.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pit_time::{HostClock, StdHostClock};
use tracing::debug;

use crate::device::Pit8254;

/// A device that services trapped guest `IN`/`OUT` instructions.
///
/// This is the seam a host bus dispatches through. Unlike [`Pit8254::port_read`], the bus
/// cannot surface "not handled" to the guest, so rejected reads float high and rejected
/// writes are dropped.
pub trait PortIoDevice {
    fn read(&mut self, port: u16, size: u8) -> u32;
    fn write(&mut self, port: u16, size: u8, value: u32);

    /// Reset the device back to its power-on state.
    fn reset(&mut self) {}
}

/// Value an unclaimed `size`-byte read returns on a PC I/O bus.
pub fn open_bus(size: u8) -> u32 {
    match size {
        1 => 0xFF,
        2 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}

impl<C: HostClock> PortIoDevice for Pit8254<C> {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        match self.port_read(port, size) {
            Ok(v) => u32::from(v),
            Err(err) => {
                debug!(port, size, "unhandled PIT read: {err}");
                open_bus(size)
            }
        }
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        if let Err(err) = self.port_write(port, size, value) {
            debug!(port, size, value, "unhandled PIT write: {err}");
        }
    }

    fn reset(&mut self) {
        Pit8254::reset(self);
    }
}

/// A PIT shared between the threads that service guest I/O traps.
///
/// Every access takes the one lock, which serializes the whole register router.
pub struct SharedPit8254<C: HostClock = StdHostClock> {
    inner: Arc<Mutex<Pit8254<C>>>,
}

impl<C: HostClock> Clone for SharedPit8254<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: HostClock> SharedPit8254<C> {
    pub fn new(pit: Pit8254<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pit)),
        }
    }

    /// Locks the device.
    ///
    /// The device holds no invariants that a panicking holder could break half-way, so a
    /// poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, Pit8254<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: HostClock> PortIoDevice for SharedPit8254<C> {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        self.lock().read(port, size)
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        self.lock().write(port, size, value);
    }

    fn reset(&mut self) {
        PortIoDevice::reset(&mut *self.lock());
    }
}
