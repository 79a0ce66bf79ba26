//! Utilities shared by the demonstration programs.

#![allow(dead_code)]

use std::{fmt, time::Duration};

use console::style;
use mhe::bfv::BfvParameters;

/// Prints a duration in the most readable unit.
pub struct DisplayDuration(pub Duration);

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration_ns = self.0.as_nanos();
        if duration_ns < 1_000_u128 {
            write!(f, "{duration_ns} ns")
        } else if duration_ns < 1_000_000_u128 {
            write!(f, "{} μs", (duration_ns + 500) / 1_000)
        } else {
            let duration_ms_times_10 = (duration_ns + 50_000) / (100_000);
            write!(f, "{} ms", (duration_ms_times_10 as f64) / 10.0)
        }
    }
}

pub mod timeit {
    /// Run `$code` `$loops` times and print the average duration.
    macro_rules! timeit_n {
        ($name:expr, $loops:expr, $code:expr) => {{
            use util::DisplayDuration;
            let start = std::time::Instant::now();
            let r = $code;
            for _ in 1..$loops {
                let _ = $code;
            }
            println!(
                "{} {}: {}",
                console::style("⏱").yellow(),
                $name,
                DisplayDuration(start.elapsed() / $loops)
            );
            r
        }};
    }

    /// Run `$code` once and print its duration.
    macro_rules! timeit {
        ($name:expr, $code:expr) => {{
            use util::DisplayDuration;
            let start = std::time::Instant::now();
            let r = $code;
            println!(
                "{} {}: {}",
                console::style("⏱").yellow(),
                $name,
                DisplayDuration(start.elapsed())
            );
            r
        }};
    }

    #[allow(unused_imports)]
    pub(crate) use timeit;
    #[allow(unused_imports)]
    pub(crate) use timeit_n;
}

/// Install a `tracing` subscriber honouring `RUST_LOG`, `info` by default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .try_init();
}

/// Parse a `--name=value` argument, if `arg` is one.
pub fn parse_flag(arg: &str, name: &str) -> Option<Result<usize, String>> {
    let value = arg.strip_prefix(name)?.strip_prefix('=');
    Some(
        value
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| format!("Invalid `{name}` argument")),
    )
}

/// The demonstration parameters: degree 2048, a 65537 plaintext modulus
/// enabling slot encoding, and three 62-bit ciphertext moduli.
pub fn demo_parameters() -> Result<std::sync::Arc<BfvParameters>, mhe::Error> {
    mhe::bfv::BfvParametersBuilder::new()
        .set_degree(2048)
        .set_plaintext_modulus(65537)
        .set_moduli_sizes(&[62, 62, 62])
        .set_smudging_variance(1 << 40)
        .build_arc()
}

/// Print the first and last 8 slots of a decrypted vector.
pub fn print_slots(label: &str, values: &[u64]) {
    let head = values.iter().take(8).collect::<Vec<_>>();
    let tail = values
        .iter()
        .skip(values.len().saturating_sub(8))
        .collect::<Vec<_>>();
    println!(
        "{} {:?} ... {:?}",
        style(format!("{label}:")).green().bold(),
        head,
        tail
    );
}
