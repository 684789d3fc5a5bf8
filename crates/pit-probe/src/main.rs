#![forbid(unsafe_code)]

//! Drives a [`Pit8254`] against the host wall clock the way a guest calibration loop would:
//! program a channel, spin for a while, latch, and read the count back.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pit8254::{
    Channel, ControlWord, OperatingMode, Pit8254, PitConfig, DEFAULT_GUEST_HZ, PIT_CH0, PIT_CMD,
    PIT_INPUT_HZ,
};
use pit_time::{ticks_from_ns, HostClock, StdHostClock};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Probe the wall-clock driven i8254 model like a guest calibration loop")]
struct Args {
    /// Nominal guest tick rate used for channels latched before being programmed.
    #[arg(long, default_value_t = DEFAULT_GUEST_HZ)]
    guest_hz: u32,

    /// Channel to probe.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    channel: u8,

    /// Divisor to program (0 means 65536).
    #[arg(long, default_value_t = 1193)]
    divisor: u16,

    /// Use the square-wave mode (3) instead of the rate generator (2).
    #[arg(long)]
    square_wave: bool,

    /// Host time to wait before each latch, in microseconds.
    #[arg(long, default_value_t = 1000)]
    wait_us: u64,

    /// Number of latch/read samples to take.
    #[arg(long, default_value_t = 4)]
    samples: u32,

    /// Do not program the channel; read whatever the default divisor produces.
    #[arg(long)]
    latch_only: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = PitConfig {
        guest_hz: args.guest_hz,
    };
    let mut pit = Pit8254::with_config(cfg, StdHostClock::new()).context("invalid PIT config")?;

    let channel = Channel::from_index(args.channel).context("channel out of range")?;
    let data_port = PIT_CH0 + u16::from(args.channel);

    if !args.latch_only {
        let mode = if args.square_wave {
            OperatingMode::SquareWave
        } else {
            OperatingMode::RateGenerator
        };
        let word = ControlWord::program(channel, mode).encode();
        let [lo, hi] = args.divisor.to_le_bytes();
        pit.port_write(PIT_CMD, 1, u32::from(word))
            .context("control word rejected")?;
        pit.port_write(data_port, 1, u32::from(lo))?;
        pit.port_write(data_port, 1, u32::from(hi))?;
    }

    tracing::info!(
        channel = args.channel,
        guest_hz = args.guest_hz,
        default_divisor = cfg.default_divisor(),
        latch_only = args.latch_only,
        "probing PIT"
    );

    let latch = ControlWord::latch(channel).encode();
    for sample in 0..args.samples {
        thread::sleep(Duration::from_micros(args.wait_us));

        pit.port_write(PIT_CMD, 1, u32::from(latch))
            .context("latch command rejected")?;
        let lo = pit.port_read(data_port, 1)?;
        let hi = pit.port_read(data_port, 1)?;
        let count = u16::from_le_bytes([lo, hi]);

        let counter = pit.counter(channel);
        let divisor = counter
            .divisor()
            .context("channel has no divisor after latch")?;
        // Sampled after the read, so this is an upper bound on the ticks the latch saw.
        let elapsed_ns = pit.clock().now_ns().saturating_sub(counter.load_ns());
        let elapsed_ticks_est = ticks_from_ns(elapsed_ns, PIT_INPUT_HZ);
        println!(
            "sample={sample} channel={} divisor={divisor} count={count} elapsed_ticks_est={elapsed_ticks_est}",
            args.channel
        );
    }

    Ok(())
}
