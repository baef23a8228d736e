//! An optional wrapping span for timing top-level engine calls. Callers apply it around engine
//! calls; the engine itself never times anything.

use std::time::{Duration, Instant};

use tracing::{info, info_span};

#[cfg(test)]
#[path = "timing_test.rs"]
mod timing_test;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Runs `f` inside an `info` span named after `description` and measures its wall-clock time.
pub fn timed<T>(description: &str, f: impl FnOnce() -> T) -> Timed<T> {
    let span = info_span!("timed", description);
    let _entered = span.enter();

    info!("Running {description}.");
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    info!("{description} done. Execution time: {:.3} seconds", elapsed.as_secs_f64());

    Timed { value, elapsed }
}
