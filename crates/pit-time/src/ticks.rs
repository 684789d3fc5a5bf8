pub const NS_PER_SEC: u64 = 1_000_000_000;

/// Converts a nanosecond interval into whole ticks of a `freq_hz` oscillator (rounding down).
pub fn ticks_from_ns(ns: u64, freq_hz: u64) -> u64 {
    ((ns as u128) * (freq_hz as u128) / (NS_PER_SEC as u128)) as u64
}
