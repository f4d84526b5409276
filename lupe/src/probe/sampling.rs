use std::time::Duration;

use crate::probe::{series, ProbeError};


pub const DELIMITER: &str = "======";

// Absorbs process startup and per-iteration overhead on top of the
// sampling window itself.
const TIMEOUT_MARGIN: Duration = Duration::from_secs(2);


/// Immutable polling configuration of a repeated probe. Computed once at
/// construction; the generated command loops the subcommand `count` times
/// inside a single shell invocation, emitting a delimiter per iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampling {
    interval: Duration,
    count: usize,
}


impl Sampling {
    pub fn new(interval: Duration, count: usize) -> Sampling {
        return Sampling { interval, count };
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn interval_s(&self) -> f64 {
        self.interval.as_secs_f64()
    }

    pub fn timeout(&self) -> Duration {
        return self.interval * self.count as u32 + TIMEOUT_MARGIN;
    }

    pub fn command(&self, subcommand: &str) -> String {
        return format!(
            "for i in $(seq 1 {}); do {}; sleep {}; echo \"{}\"; done",
            self.count,
            subcommand,
            format_interval(self.interval),
            DELIMITER,
        );
    }

    pub fn split(&self, raw: &str) -> Result<Vec<String>, ProbeError> {
        return series::split_samples(raw, DELIMITER, self.count);
    }

    pub fn time_axis(&self) -> Vec<f64> {
        return series::time_axis(self.interval_s(), self.count);
    }
}


/// Renders a duration the way `sleep` expects it: "1" for whole seconds,
/// "0.5" for fractional ones.
fn format_interval(interval: Duration) -> String {
    let seconds = interval.as_secs_f64();
    if seconds.fract() == 0.0 {
        return format!("{}", seconds as u64);
    }
    return format!("{}", seconds);
}
