use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::core::UNIT_FRAMES_PER_MS;

/// Monotonic millisecond clock read once per frame.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and deterministic hosts.
///
/// Clones share the same time, so a test can keep one handle while the chart
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

/// Lifecycle of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerState {
    /// Not started yet.
    Idle,
    /// Started, waiting for the start delay to elapse.
    Pending { ready_at_ms: f64 },
    Running,
    /// Every trajectory settled; only pointer input wakes the loop.
    Asleep,
    Stopped,
}

/// What the host should do after a frame or pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Call `on_frame` again on the next display refresh.
    Continue,
    /// Nothing is animating; wait for pointer input.
    Sleep,
}

/// Frame pacing and Running/Asleep transitions for one chart.
#[derive(Debug)]
pub struct AnimationScheduler<C> {
    clock: C,
    state: SchedulerState,
    last_frame_ms: Option<f64>,
    frames: u64,
}

impl<C: Clock> AnimationScheduler<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: SchedulerState::Idle,
            last_frame_ms: None,
            frames: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames run since start.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Arms the loop; the first frame runs once `delay_ms` has elapsed.
    ///
    /// Returns `false` when the scheduler was already started or stopped.
    pub fn start(&mut self, delay_ms: f64) -> bool {
        if self.state != SchedulerState::Idle {
            warn!(state = ?self.state, "chart already started, start request ignored");
            return false;
        }
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        self.state = SchedulerState::Pending {
            ready_at_ms: self.clock.now_ms() + delay_ms,
        };
        debug!(delay_ms, "animation scheduled");
        true
    }

    /// Pointer input is only accepted once the first frame has run.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self.state, SchedulerState::Running | SchedulerState::Asleep)
    }

    /// Reads the clock once and returns the unit-frame delta when a frame is
    /// due, or `None` when the loop is idle, waiting, asleep or stopped.
    pub fn begin_frame(&mut self) -> Option<f64> {
        match self.state {
            SchedulerState::Pending { ready_at_ms } => {
                let now = self.clock.now_ms();
                if now < ready_at_ms {
                    return None;
                }
                debug!("animation running");
                self.state = SchedulerState::Running;
                Some(self.advance(now))
            }
            SchedulerState::Running => {
                let now = self.clock.now_ms();
                Some(self.advance(now))
            }
            SchedulerState::Idle | SchedulerState::Asleep | SchedulerState::Stopped => None,
        }
    }

    /// Wakes a sleeping loop for one synchronous frame.
    pub fn wake(&mut self) -> Option<f64> {
        if self.state != SchedulerState::Asleep {
            return None;
        }
        trace!("animation woken by pointer input");
        self.state = SchedulerState::Running;
        let now = self.clock.now_ms();
        Some(self.advance(now))
    }

    /// Records the outcome of the animate step of the current frame.
    pub fn end_frame(&mut self, settled: bool) -> FrameRequest {
        if self.state != SchedulerState::Running {
            return self.request();
        }
        if settled {
            trace!(frames = self.frames, "animation settled, going to sleep");
            self.state = SchedulerState::Asleep;
            self.last_frame_ms = None;
        }
        self.request()
    }

    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            debug!(frames = self.frames, "animation stopped");
        }
        self.state = SchedulerState::Stopped;
        self.last_frame_ms = None;
    }

    /// Request matching the current state.
    #[must_use]
    pub fn request(&self) -> FrameRequest {
        match self.state {
            SchedulerState::Pending { .. } | SchedulerState::Running => FrameRequest::Continue,
            SchedulerState::Idle | SchedulerState::Asleep | SchedulerState::Stopped => {
                FrameRequest::Sleep
            }
        }
    }

    fn advance(&mut self, now: f64) -> f64 {
        let time_delta = match self.last_frame_ms {
            Some(last) => (now - last).max(0.0) * UNIT_FRAMES_PER_MS,
            None => 1.0,
        };
        self.last_frame_ms = Some(now);
        self.frames += 1;
        time_delta
    }
}
