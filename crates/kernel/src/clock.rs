use std::time::Duration;

/// Slack, as a fraction of the interval, when draining leftover time.
///
/// Deltas that sum to an exact multiple of the interval can land a few ulps
/// short of it after repeated addition; without slack the final tick of such
/// a run would be deferred to the next frame.
const DRAIN_SLACK: f64 = 1e-9;

/// Errors from driving the clock.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("frame delta must be finite and non-negative, got {delta}")]
    InvalidInput { delta: f64 },
    #[error("tick interval must be finite and positive, got {interval}")]
    InvalidInterval { interval: f64 },
}

/// Result of a single [`FixedStepClock::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockAdvance {
    /// Number of fixed ticks the caller should run this frame.
    pub ticks: u64,
    /// Fraction in `[0, 1)` between the last completed tick and the next.
    pub alpha: f64,
}

/// Accumulates wall-clock time into discrete fixed-interval ticks.
///
/// There is no cap on ticks per call: a long stall produces a long catch-up.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    interval: f64,
    leftover: f64,
    tick_count: u64,
}

impl FixedStepClock {
    /// Create a clock with the given tick interval in seconds.
    pub fn new(interval: f64) -> Result<Self, ClockError> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ClockError::InvalidInterval { interval });
        }
        Ok(Self {
            interval,
            leftover: 0.0,
            tick_count: 0,
        })
    }

    /// Create a clock running at `hz` ticks per second.
    pub fn from_rate(hz: f64) -> Result<Self, ClockError> {
        Self::new(1.0 / hz)
    }

    /// Feed elapsed frame time and drain whole ticks from it.
    pub fn advance(&mut self, delta: f64) -> Result<ClockAdvance, ClockError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ClockError::InvalidInput { delta });
        }

        self.leftover += delta;
        let whole = ((self.leftover + self.interval * DRAIN_SLACK) / self.interval).floor();
        // `as` saturates, so an absurd stall caps at u64::MAX ticks.
        let ticks = whole as u64;
        self.leftover = (self.leftover - whole * self.interval).max(0.0);
        if self.leftover >= self.interval {
            self.leftover = 0.0;
        }
        self.tick_count = self.tick_count.saturating_add(ticks);

        if ticks > 1 {
            tracing::trace!(ticks, delta, "clock catching up");
        }

        Ok(ClockAdvance {
            ticks,
            alpha: self.interpolation_alpha(),
        })
    }

    /// Same as [`advance`](Self::advance) for a `Duration`, which cannot be negative.
    pub fn advance_duration(&mut self, delta: Duration) -> Result<ClockAdvance, ClockError> {
        self.advance(delta.as_secs_f64())
    }

    /// Fixed tick interval in seconds.
    pub fn tick_interval(&self) -> f64 {
        self.interval
    }

    /// Total ticks drained since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Undrained time in seconds.
    pub fn leftover(&self) -> f64 {
        self.leftover
    }

    pub fn interpolation_alpha(&self) -> f64 {
        self.leftover / self.interval
    }
}
