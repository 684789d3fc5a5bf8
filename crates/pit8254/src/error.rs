use thiserror::Error;

/// Reason a guest register access was not handled.
///
/// Rejections never mutate device state; the caller decides whether to ignore the access,
/// fault the guest, or log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("unsupported access size {size} (only single-byte accesses are decoded)")]
    AccessSize { size: u8 },

    #[error("I/O port {port:#06x} is not a PIT register")]
    UnmappedPort { port: u16 },

    #[error("the PIT control register is write-only")]
    ControlRead,

    #[error("read-back command is not supported")]
    ReadBack,

    #[error("unsupported access mode {access:#04b} (only latch and lobyte/hibyte)")]
    AccessMode { access: u8 },

    #[error("unsupported operating mode bits {mode:#03x} (only rate generator and square wave)")]
    OperatingMode { mode: u8 },
}

/// Invalid device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("guest tick frequency must be non-zero")]
    ZeroGuestHz,
}
