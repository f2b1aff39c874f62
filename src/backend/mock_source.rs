//! Simulated load cell
//!
//! Produces a plausible filling curve so the application can be run
//! without hardware. Selected by setting `serial.port = "MOCK"` in
//! `config.toml` with the `mock-serial` feature enabled:
//!
//! ```bash
//! cargo run --features mock-serial
//! ```
//!
//! Lines are emitted every [`SAMPLE_PERIOD`] in the device's
//! `time,weight,rate` format. The first line is deliberately truncated, as
//! happens when the host opens the port mid-transmission.

use crate::backend::{LineSource, ReadOutcome};
use std::time::{Duration, Instant};

/// Interval between simulated samples
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Weight the simulated load settles at
const TARGET_KG: f64 = 25.0;

/// Time constant of the filling curve
const TAU_S: f64 = 8.0;

/// Simulated load cell line source
pub struct SimulatedLoadCell {
    started: Instant,
    next_due: Duration,
    emitted: u64,
    noise_seed: u64,
}

impl SimulatedLoadCell {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            next_due: SAMPLE_PERIOD,
            emitted: 0,
            noise_seed: 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Small deterministic jitter in [-0.02, 0.02] kg
    fn noise(&mut self) -> f64 {
        let mut s = self.noise_seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.noise_seed = s;
        ((s as f64 / u64::MAX as f64) - 0.5) * 0.04
    }

    /// Line for device time `t`
    fn line_at(&mut self, t: f64) -> String {
        let weight = TARGET_KG * (1.0 - (-t / TAU_S).exp()) + self.noise();
        let rate = TARGET_KG / TAU_S * (-t / TAU_S).exp();
        format!("{:.2},{:.3},{:.3}\n", t, weight, rate)
    }
}

impl Default for SimulatedLoadCell {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for SimulatedLoadCell {
    fn read_line(&mut self) -> std::io::Result<ReadOutcome> {
        let elapsed = self.started.elapsed();
        if elapsed < self.next_due {
            std::thread::sleep(self.next_due - elapsed);
        }

        let t = self.next_due.as_secs_f64();
        self.next_due += SAMPLE_PERIOD;
        self.emitted += 1;

        let line = self.line_at(t);
        if self.emitted == 1 {
            // Tail of a line whose start was missed
            let cut = line.len() / 2;
            return Ok(ReadOutcome::Line(line[cut..].to_string()));
        }
        Ok(ReadOutcome::Line(line))
    }

    fn describe(&self) -> String {
        "simulated load cell".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::parse_sample;

    #[test]
    fn test_first_line_is_partial_then_valid() {
        let mut source = SimulatedLoadCell::new();

        let ReadOutcome::Line(first) = source.read_line().unwrap() else {
            panic!("expected a line");
        };
        assert!(parse_sample(&first).is_err());

        let ReadOutcome::Line(second) = source.read_line().unwrap() else {
            panic!("expected a line");
        };
        let sample = parse_sample(&second).unwrap();
        assert!((sample.time_s - 0.2).abs() < 1e-9);
        assert!(sample.weight_kg > 0.0 && sample.weight_kg < TARGET_KG);
    }
}
