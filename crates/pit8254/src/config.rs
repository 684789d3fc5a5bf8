use crate::counter::{MAX_DIVISOR, MIN_DIVISOR};
use crate::error::ConfigError;
use crate::PIT_INPUT_HZ;

/// Guest tick rate assumed for channels that are latched before being programmed.
pub const DEFAULT_GUEST_HZ: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitConfig {
    /// Nominal guest interrupt frequency, in Hz.
    ///
    /// Only used to synthesize a divisor for a channel that the guest reads before ever
    /// programming it (e.g. after the VMM process was restarted underneath a running guest).
    pub guest_hz: u32,
}

impl Default for PitConfig {
    fn default() -> Self {
        Self {
            guest_hz: DEFAULT_GUEST_HZ,
        }
    }
}

impl PitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guest_hz == 0 {
            return Err(ConfigError::ZeroGuestHz);
        }
        Ok(())
    }

    /// Divisor that makes the PIT fire at `guest_hz`, rounded to the nearest tick and clamped
    /// to what a channel can actually count.
    pub fn default_divisor(&self) -> u32 {
        let hz = u64::from(self.guest_hz.max(1));
        let div = (PIT_INPUT_HZ + hz / 2) / hz;
        div.clamp(u64::from(MIN_DIVISOR), u64::from(MAX_DIVISOR)) as u32
    }
}
