use pit_time::{HostClock, StdHostClock};
use tracing::debug;

use crate::config::PitConfig;
use crate::control::{Channel, Command, ControlWord};
use crate::counter::Counter;
use crate::error::{ConfigError, Unsupported};
use crate::{PIT_CH0, PIT_CH1, PIT_CH2, PIT_CMD};

/// Three-channel i8254 register model.
///
/// The device performs no locking. Hosts that trap port I/O on several vCPU threads must
/// serialize all accesses to one instance (a single `Mutex` around it is enough; see
/// [`crate::io::SharedPit8254`]).
#[derive(Debug)]
pub struct Pit8254<C: HostClock = StdHostClock> {
    default_divisor: u32,
    clock: C,
    counters: [Counter; 3],
}

impl Pit8254<StdHostClock> {
    /// Creates a PIT with the default configuration, driven by the host wall clock.
    pub fn new() -> Self {
        Self::with_clock(StdHostClock::new())
    }
}

impl Default for Pit8254<StdHostClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HostClock> Pit8254<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::build(PitConfig::default(), clock)
    }

    pub fn with_config(cfg: PitConfig, clock: C) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(cfg, clock))
    }

    fn build(cfg: PitConfig, clock: C) -> Self {
        Self {
            default_divisor: cfg.default_divisor(),
            clock,
            counters: [Counter::new(), Counter::new(), Counter::new()],
        }
    }

    /// The clock the counters are sampled against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn counter(&self, channel: Channel) -> &Counter {
        &self.counters[channel.index()]
    }

    /// Returns every channel to its power-on (unprogrammed) state.
    pub fn reset(&mut self) {
        for counter in &mut self.counters {
            counter.reset();
        }
    }

    /// Write to the control register (port 0x43).
    pub fn write_command(&mut self, value: u8) -> Result<(), Unsupported> {
        let word = ControlWord::decode(value)?;
        let counter = &mut self.counters[word.channel.index()];
        match word.command {
            Command::Latch => counter.latch(self.clock.now_ns(), self.default_divisor),
            Command::Program(_) => counter.begin_program(),
        }
        Ok(())
    }

    /// Read the next latched byte from a channel data port.
    pub fn read_counter(&mut self, channel: Channel) -> u8 {
        let now_ns = self.clock.now_ns();
        self.counters[channel.index()].read_byte(now_ns, self.default_divisor)
    }

    /// Write one divisor byte to a channel data port.
    pub fn write_counter(&mut self, channel: Channel, value: u8) {
        let now_ns = self.clock.now_ns();
        self.counters[channel.index()].program(value, now_ns);
    }

    /// Handle a guest `IN` from `port`.
    pub fn port_read(&mut self, port: u16, size: u8) -> Result<u8, Unsupported> {
        if size != 1 {
            return Err(Unsupported::AccessSize { size });
        }
        match decode_port(port)? {
            Register::Control => Err(Unsupported::ControlRead),
            Register::Counter(channel) => Ok(self.read_counter(channel)),
        }
    }

    /// Handle a guest `OUT` to `port`. Only the low byte of `value` is used.
    pub fn port_write(&mut self, port: u16, size: u8, value: u32) -> Result<(), Unsupported> {
        if size != 1 {
            return Err(Unsupported::AccessSize { size });
        }
        let value = value as u8;
        match decode_port(port)? {
            Register::Control => self.write_command(value),
            Register::Counter(channel) => {
                self.write_counter(channel, value);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Register {
    Control,
    Counter(Channel),
}

fn decode_port(port: u16) -> Result<Register, Unsupported> {
    match port {
        PIT_CH0 => Ok(Register::Counter(Channel::Ch0)),
        PIT_CH1 => Ok(Register::Counter(Channel::Ch1)),
        PIT_CH2 => Ok(Register::Counter(Channel::Ch2)),
        PIT_CMD => Ok(Register::Control),
        _ => {
            debug!(port, "access to non-PIT port routed to PIT");
            Err(Unsupported::UnmappedPort { port })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pit_time::FakeHostClock;

    fn pit() -> (Pit8254<FakeHostClock>, FakeHostClock) {
        let clock = FakeHostClock::new(1_000_000_000);
        (Pit8254::with_clock(clock.clone()), clock)
    }

    fn read_word(pit: &mut Pit8254<FakeHostClock>, port: u16) -> u16 {
        let lo = pit.port_read(port, 1).unwrap();
        let hi = pit.port_read(port, 1).unwrap();
        u16::from_le_bytes([lo, hi])
    }

    #[test]
    fn program_latch_and_read_through_ports() {
        let (mut pit, clock) = pit();
        pit.port_write(PIT_CMD, 1, 0x34).unwrap();
        pit.port_write(PIT_CH0, 1, 0xA9).unwrap();
        pit.port_write(PIT_CH0, 1, 0x04).unwrap();
        assert_eq!(pit.counter(Channel::Ch0).divisor(), Some(1193));

        clock.advance(500_000);
        pit.port_write(PIT_CMD, 1, 0x00).unwrap();
        assert_eq!(read_word(&mut pit, PIT_CH0), 1193 - 596);
    }

    #[test]
    fn elapsed_ticks_from_device_clock_match_latched_count() {
        let (mut pit, clock) = pit();
        pit.write_command(0x34).unwrap();
        pit.write_counter(Channel::Ch0, 0xE8);
        pit.write_counter(Channel::Ch0, 0x03);

        clock.advance(2_700_000);
        pit.write_command(0x00).unwrap();
        let count = read_word(&mut pit, PIT_CH0);

        let elapsed_ns = pit.clock().now_ns() - pit.counter(Channel::Ch0).load_ns();
        let ticks = pit_time::ticks_from_ns(elapsed_ns, crate::PIT_INPUT_HZ);
        assert_eq!(ticks, 3221);
        assert_eq!(u64::from(count), 1000 - ticks % 1000);
    }

    #[test]
    fn only_low_byte_of_write_value_is_used() {
        let (mut pit, _clock) = pit();
        pit.port_write(PIT_CMD, 1, 0xFFFF_FF34).unwrap();
        pit.port_write(PIT_CH1, 1, 0x1234_5610).unwrap();
        pit.port_write(PIT_CH1, 1, 0x0000_0027).unwrap();
        assert_eq!(pit.counter(Channel::Ch1).divisor(), Some(0x2710));
    }

    #[test]
    fn control_port_is_write_only() {
        let (mut pit, _clock) = pit();
        assert_eq!(pit.port_read(PIT_CMD, 1), Err(Unsupported::ControlRead));
    }

    #[test]
    fn wide_accesses_are_rejected_without_side_effects() {
        let (mut pit, _clock) = pit();
        for size in [0u8, 2, 4] {
            assert_eq!(
                pit.port_write(PIT_CH0, size, 0x10),
                Err(Unsupported::AccessSize { size })
            );
            assert_eq!(
                pit.port_read(PIT_CH0, size),
                Err(Unsupported::AccessSize { size })
            );
        }
        let ch0 = pit.counter(Channel::Ch0);
        assert!(!ch0.is_programming());
        assert!(!ch0.is_latched());
        assert_eq!(ch0.divisor(), None);
    }

    #[test]
    fn foreign_ports_are_rejected() {
        let (mut pit, _clock) = pit();
        assert_eq!(
            pit.port_read(0x61, 1),
            Err(Unsupported::UnmappedPort { port: 0x61 })
        );
        assert_eq!(
            pit.port_write(0x44, 1, 0),
            Err(Unsupported::UnmappedPort { port: 0x44 })
        );
    }

    #[test]
    fn unprogrammed_channel_counts_at_guest_hz() {
        let clock = FakeHostClock::new(0);
        let mut pit =
            Pit8254::with_config(PitConfig { guest_hz: 1000 }, clock.clone()).unwrap();
        pit.write_command(0x80).unwrap();
        assert_eq!(pit.counter(Channel::Ch2).divisor(), Some(1193));
        assert_eq!(pit.counter(Channel::Ch0).divisor(), None);
        assert_eq!(pit.read_counter(Channel::Ch2), 0xA9);
        assert_eq!(pit.read_counter(Channel::Ch2), 0x04);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Pit8254::with_config(PitConfig { guest_hz: 0 }, FakeHostClock::new(0))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroGuestHz);
    }

    #[test]
    fn reset_forgets_programmed_divisors() {
        let (mut pit, _clock) = pit();
        pit.write_command(0x74).unwrap();
        pit.write_counter(Channel::Ch1, 0x00);
        pit.write_counter(Channel::Ch1, 0x10);
        assert_eq!(pit.counter(Channel::Ch1).divisor(), Some(0x1000));

        pit.reset();
        assert_eq!(pit.counter(Channel::Ch1).divisor(), None);
    }
}
