//! Control word (port 0x43) decoding.
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +-------+-------+-----------+---+
//! |  SEL  |  RW   |   MODE    |BCD|
//! +-------+-------+-----------+---+
//! ```

use crate::error::Unsupported;

const SELECT_SHIFT: u8 = 6;

const ACCESS_SHIFT: u8 = 4;
const ACCESS_MASK: u8 = 0b11;
const ACCESS_LATCH: u8 = 0b00;
const ACCESS_LOHI: u8 = 0b11;

// The mode field is compared together with the BCD bit; BCD counting is not supported.
const MODE_MASK: u8 = 0x0F;
const MODE_RATEGEN: u8 = 0x04;
const MODE_SQWAVE: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Ch0, Channel::Ch1, Channel::Ch2];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Mode 2.
    RateGenerator,
    /// Mode 3.
    SquareWave,
}

impl OperatingMode {
    fn bits(self) -> u8 {
        match self {
            OperatingMode::RateGenerator => MODE_RATEGEN,
            OperatingMode::SquareWave => MODE_SQWAVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Counter latch command. The operating mode bits are ignored.
    Latch,
    /// Prepare the channel for a lobyte/hibyte divisor load.
    Program(OperatingMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord {
    pub channel: Channel,
    pub command: Command,
}

impl ControlWord {
    pub fn latch(channel: Channel) -> Self {
        Self {
            channel,
            command: Command::Latch,
        }
    }

    pub fn program(channel: Channel, mode: OperatingMode) -> Self {
        Self {
            channel,
            command: Command::Program(mode),
        }
    }

    pub fn decode(value: u8) -> Result<Self, Unsupported> {
        // SEL == 0b11 is the read-back command.
        let channel = Channel::from_index(value >> SELECT_SHIFT).ok_or(Unsupported::ReadBack)?;

        let command = match (value >> ACCESS_SHIFT) & ACCESS_MASK {
            ACCESS_LATCH => Command::Latch,
            ACCESS_LOHI => match value & MODE_MASK {
                MODE_RATEGEN => Command::Program(OperatingMode::RateGenerator),
                MODE_SQWAVE => Command::Program(OperatingMode::SquareWave),
                mode => return Err(Unsupported::OperatingMode { mode }),
            },
            access => return Err(Unsupported::AccessMode { access }),
        };

        Ok(Self { channel, command })
    }

    pub fn encode(self) -> u8 {
        let select = (self.channel as u8) << SELECT_SHIFT;
        match self.command {
            Command::Latch => select | (ACCESS_LATCH << ACCESS_SHIFT),
            Command::Program(mode) => select | (ACCESS_LOHI << ACCESS_SHIFT) | mode.bits(),
        }
    }
}
