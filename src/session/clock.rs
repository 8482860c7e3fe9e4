use std::time::{Duration, Instant};

/// Monotonic time source the step scheduler paces against.
pub trait Clock: Send {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;
    /// Block until `now() >= deadline`.
    fn sleep_until(&mut self, deadline: Duration);
}

/// Clock that jumps straight to every deadline; offline renders never wait.
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    now: Duration,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

/// Wall-clock pacing against absolute deadlines, so per-step overhead does not accumulate.
#[derive(Debug, Clone)]
pub struct RealtimeClock {
    origin: Instant,
}

impl RealtimeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RealtimeClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Paces reveal steps. [`StepScheduler::wait`] is the only place a reveal suspends.
pub struct StepScheduler {
    clock: Box<dyn Clock>,
    timeline: Duration,
    waits: u64,
}

impl std::fmt::Debug for StepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScheduler")
            .field("timeline", &self.timeline)
            .field("waits", &self.waits)
            .finish_non_exhaustive()
    }
}

impl StepScheduler {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let timeline = clock.now();
        Self {
            clock,
            timeline,
            waits: 0,
        }
    }

    pub fn virtual_time() -> Self {
        Self::new(Box::new(VirtualClock::new()))
    }

    pub fn realtime() -> Self {
        Self::new(Box::new(RealtimeClock::new()))
    }

    /// Advance the timeline by `d` and sleep until it is reached.
    pub fn wait(&mut self, d: Duration) {
        self.timeline += d;
        self.waits += 1;
        self.clock.sleep_until(self.timeline);
    }

    /// Scheduled time of the last deadline.
    pub fn timeline(&self) -> Duration {
        self.timeline
    }

    pub fn waits(&self) -> u64 {
        self.waits
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
