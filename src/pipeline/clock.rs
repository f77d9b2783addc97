use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Millisecond time source of the pipeline.
pub trait FrameClock: Send {
    fn now_ms(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Caller-driven time. Clones share one reading, so a test can keep a handle after moving a
/// clone into the pipeline.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    ms_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, ms: f64) {
        self.ms_bits.store(ms.to_bits(), Ordering::Relaxed);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.set_ms(self.now_ms() + ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.ms_bits.load(Ordering::Relaxed))
    }
}
