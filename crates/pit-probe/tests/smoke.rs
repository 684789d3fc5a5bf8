use std::process::Command;

fn probe() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pit-probe"))
}

struct Sample {
    divisor: u64,
    count: u64,
    elapsed_ticks_est: u64,
}

fn parse_samples(stdout: &str) -> Vec<Sample> {
    stdout
        .lines()
        .filter(|l| l.starts_with("sample="))
        .map(|line| {
            let field = |name: &str| -> u64 {
                line.split_whitespace()
                    .find_map(|kv| kv.strip_prefix(name))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| panic!("missing {name} in {line:?}"))
            };
            Sample {
                divisor: field("divisor="),
                count: field("count="),
                elapsed_ticks_est: field("elapsed_ticks_est="),
            }
        })
        .collect()
}

#[test]
fn probes_programmed_channel() {
    let output = probe()
        .args(["--divisor", "1193", "--wait-us", "200", "--samples", "3"])
        .output()
        .expect("failed to run pit-probe");
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    // 200us of host time is at least 238 PIT ticks.
    const TICKS_PER_WAIT: u64 = 238;

    let samples = parse_samples(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(samples.len(), 3);
    let mut prev_ticks = 0;
    for (n, s) in (1..).zip(&samples) {
        assert_eq!(s.divisor, 1193);
        assert!((1..=1193).contains(&s.count), "count={}", s.count);
        assert!(
            s.elapsed_ticks_est >= n * TICKS_PER_WAIT,
            "sample {n}: elapsed_ticks_est={}",
            s.elapsed_ticks_est
        );
        assert!(s.elapsed_ticks_est > prev_ticks);
        prev_ticks = s.elapsed_ticks_est;
    }
}

#[test]
fn latch_only_uses_guest_hz_default() {
    let output = probe()
        .args([
            "--latch-only",
            "--channel",
            "2",
            "--guest-hz",
            "1000",
            "--wait-us",
            "0",
            "--samples",
            "1",
        ])
        .output()
        .expect("failed to run pit-probe");
    assert!(output.status.success());

    let samples = parse_samples(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].divisor, 1193);
    // The default divisor is loaded by the latch itself, just before the estimate is taken.
    assert!(samples[0].elapsed_ticks_est < 1_193_182, "well under a second");
}

#[test]
fn zero_guest_hz_is_an_error() {
    let output = probe()
        .args(["--guest-hz", "0", "--samples", "1"])
        .output()
        .expect("failed to run pit-probe");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid PIT config"), "stderr:\n{stderr}");
}
