//! Intel 8254 programmable interval timer, emulated from host wall-clock time.
//!
//! Guests mostly touch the PIT to calibrate other clocks during boot: they program a divisor,
//! spin, latch the count and read it back. This model never ticks. Each channel records when
//! its divisor was loaded and synthesizes the count the hardware would show at the moment the
//! guest latches it.
//!
//! Only the periodic modes (2 and 3) with lobyte/hibyte access are modeled. Other control words
//! are rejected with an [`Unsupported`] reason so the caller can decide how to surface them.
//! The IRQ0 output is not modeled.

#![forbid(unsafe_code)]

mod config;
mod control;
mod counter;
mod device;
mod error;
pub mod io;

pub use config::{PitConfig, DEFAULT_GUEST_HZ};
pub use control::{Channel, Command, ControlWord, OperatingMode};
pub use counter::{Counter, MAX_DIVISOR, MIN_DIVISOR};
pub use device::Pit8254;
pub use error::{ConfigError, Unsupported};

/// PIT oscillator frequency.
pub const PIT_INPUT_HZ: u64 = 1_193_182;

pub const PIT_CH0: u16 = 0x40;
pub const PIT_CH1: u16 = 0x41;
pub const PIT_CH2: u16 = 0x42;
pub const PIT_CMD: u16 = 0x43;
