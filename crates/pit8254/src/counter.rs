use pit_time::ticks_from_ns;
use tracing::trace;

use crate::PIT_INPUT_HZ;

/// Largest period a channel can count (a programmed value of 0).
pub const MAX_DIVISOR: u32 = 0x1_0000;
/// Smallest period the periodic modes support. 0 and 1 mean "never programmed".
pub const MIN_DIVISOR: u32 = 2;

/// One PIT channel.
///
/// Rather than decrementing on every oscillator tick, the counter remembers when its divisor
/// was loaded and derives the current count from elapsed host time whenever the guest latches
/// it. In the periodic modes the count is a sawtooth that reloads to `divisor` every `divisor`
/// ticks, so `divisor - (elapsed_ticks % divisor)` is exactly what the hardware would show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    load_ns: u64,
    divisor: u32,
    control_bytes: [u8; 2],
    control_index: usize,
    // Stored as [msb, lsb]; `output_index` counts down so the LSB is read first.
    output_latch: [u8; 2],
    output_index: usize,
}

impl Counter {
    pub const fn new() -> Self {
        Self {
            load_ns: 0,
            divisor: 0,
            control_bytes: [0; 2],
            control_index: 0,
            output_latch: [0; 2],
            output_index: 0,
        }
    }

    /// The effective countdown period, or `None` if the channel has never been programmed.
    pub fn divisor(&self) -> Option<u32> {
        (self.divisor >= MIN_DIVISOR).then_some(self.divisor)
    }

    /// Host time at which the current divisor was loaded.
    pub fn load_ns(&self) -> u64 {
        self.load_ns
    }

    /// Whether a latched value is waiting to be read.
    pub fn is_latched(&self) -> bool {
        self.output_index != 0
    }

    /// Whether the low byte of a new divisor has been written but the high byte has not.
    pub fn is_programming(&self) -> bool {
        self.control_index != 0
    }

    /// Accepts one byte of a lobyte/hibyte divisor load.
    pub fn program(&mut self, byte: u8, now_ns: u64) {
        self.control_bytes[self.control_index] = byte;
        self.control_index += 1;
        if self.control_index < self.control_bytes.len() {
            return;
        }

        self.control_index = 0;
        self.divisor = match u16::from_le_bytes(self.control_bytes) {
            0 => MAX_DIVISOR,
            v => u32::from(v),
        };
        self.load_ns = now_ns;
        // A reload invalidates whatever was latched from the previous period.
        self.output_index = 0;
        trace!(divisor = self.divisor, load_ns = now_ns, "PIT counter loaded");
    }

    /// Starts a fresh lobyte/hibyte program sequence, discarding any partial write.
    pub fn begin_program(&mut self) {
        self.control_index = 0;
        self.output_index = 0;
    }

    /// Freezes the current count into the output latch.
    ///
    /// The latch is single-deep: while a previous value has not been fully read this is a
    /// no-op.
    pub fn latch(&mut self, now_ns: u64, default_divisor: u32) {
        if self.output_index != 0 {
            return;
        }

        if self.divisor < MIN_DIVISOR {
            debug_assert!((MIN_DIVISOR..=MAX_DIVISOR).contains(&default_divisor));
            self.divisor = default_divisor;
            self.load_ns = now_ns;
            trace!(
                divisor = default_divisor,
                "PIT counter latched before programming; using default divisor"
            );
        }

        // 0x10000 truncates to 0x0000, which is how the hardware presents a full period.
        let count = self.count_at(now_ns) as u16;
        let [lsb, msb] = count.to_le_bytes();
        self.output_latch = [msb, lsb];
        self.output_index = self.output_latch.len();
    }

    /// Returns the next latched byte, LSB first, latching first if nothing is pending.
    ///
    /// Real hardware reverts to following the live count once a latched value has been fully
    /// read. Any guest that reads a meaningful value latches first, so a read without a latch
    /// simply latches implicitly.
    pub fn read_byte(&mut self, now_ns: u64, default_divisor: u32) -> u8 {
        if self.output_index == 0 {
            self.latch(now_ns, default_divisor);
        }
        self.output_index -= 1;
        self.output_latch[self.output_index]
    }

    /// Returns the channel to its power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn count_at(&self, now_ns: u64) -> u32 {
        let divisor = u64::from(self.divisor);
        let elapsed_ticks = ticks_from_ns(now_ns.saturating_sub(self.load_ns), PIT_INPUT_HZ);
        (divisor - elapsed_ticks % divisor) as u32
    }
}
