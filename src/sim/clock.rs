//! Frame loop control
//!
//! A `FrameLoop` keeps at most one frame request outstanding with its
//! scheduler. Every fired frame has to be accepted by `begin_frame` and closed
//! by `end_frame`; that pair is where stale callbacks, re-entrant steps and
//! stop-during-frame are filtered out. `FixedStep` turns the wall-clock
//! timestamps of accepted frames into whole simulation ticks.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Opaque id of one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Something that can call back once per display refresh
pub trait FrameScheduler {
    /// Schedule one callback and return its handle
    fn request_frame(&mut self) -> FrameHandle;
    /// Drop a previously scheduled callback; unknown handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What the frame body wants after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopControl {
    #[default]
    Continue,
    Stop,
}

/// Proof that a frame was accepted; consumed by `end_frame`
#[derive(Debug)]
#[must_use = "an accepted frame must be closed with end_frame"]
pub struct FrameTicket {
    generation: u64,
}

/// Start/stop state of one animation loop
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    /// Frame request currently outstanding with the scheduler
    pending: Option<FrameHandle>,
    /// Set between begin_frame and end_frame
    stepping: bool,
    /// Bumped on every start so frames from an older run are recognized
    generation: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin requesting frames. Returns false if already running.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.generation += 1;
        if let Some(stale) = self.pending.take() {
            scheduler.cancel_frame(stale);
        }
        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Cancel the outstanding request. Returns false if already stopped.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The request this loop is waiting on, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Accept a fired frame
    ///
    /// Returns `None` (and the caller must do nothing) when the loop is
    /// stopped, the handle is not the outstanding request, or a frame is
    /// already in progress.
    pub fn begin_frame(&mut self, handle: FrameHandle) -> Option<FrameTicket> {
        if !self.running || self.stepping || self.pending != Some(handle) {
            return None;
        }
        self.pending = None;
        self.stepping = true;
        Some(FrameTicket {
            generation: self.generation,
        })
    }

    /// Close an accepted frame, requesting the next one unless the loop stopped
    pub fn end_frame<S: FrameScheduler + ?Sized>(&mut self, ticket: FrameTicket, scheduler: &mut S, control: LoopControl) {
        self.stepping = false;
        if ticket.generation != self.generation {
            // Stopped and restarted while the frame ran; start already requested
            return;
        }
        if control == LoopControl::Stop {
            self.running = false;
        }
        if self.running && self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }
}

/// Scheduler driven by hand: frames fire only when the owner says so
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    queued: Vec<FrameHandle>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled, oldest first
    pub fn queued(&self) -> &[FrameHandle] {
        &self.queued
    }

    /// Take every outstanding request, as a display refresh would
    pub fn fire(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.queued)
    }

    /// How many requests were cancelled over this scheduler's lifetime
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.queued.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(i) = self.queued.iter().position(|h| *h == handle) {
            self.queued.remove(i);
            self.cancelled += 1;
        }
    }
}

/// Longest frame gap honored before clamping (seconds)
const MAX_FRAME_GAP: f32 = 0.1;

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
    last_ms: Option<f64>,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            last_ms: None,
        }
    }

    /// Feed a frame timestamp (milliseconds) and get the number of ticks to run
    ///
    /// The first frame after a reset counts as exactly one step.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => self.step,
        };
        self.last_ms = Some(now_ms);
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_GAP) } else { 0.0 };

        self.accumulator += dt;
        // Tolerate float error on frames that land a hair under one step
        let epsilon = self.step * 1e-3;
        let mut ticks = 0;
        while self.accumulator + epsilon >= self.step && ticks < self.max_substeps {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            ticks += 1;
        }
        if ticks == self.max_substeps {
            // Drop the backlog instead of carrying it into the next frame
            self.accumulator = self.accumulator.min(self.step * 0.5);
        }
        ticks
    }

    /// Forget timing history (e.g. after the loop was stopped)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_idempotent() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        assert!(lp.start(&mut sched));
        assert!(!lp.start(&mut sched));
        assert_eq!(sched.queued().len(), 1);
        assert!(lp.is_running());
    }

    #[test]
    fn test_stop_cancels_pending() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        assert!(lp.stop(&mut sched));
        assert!(!lp.stop(&mut sched));
        assert!(sched.queued().is_empty());
        assert_eq!(sched.cancelled(), 1);
    }

    #[test]
    fn test_each_frame_reschedules_once() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        for _ in 0..5 {
            let fired = sched.fire();
            assert_eq!(fired.len(), 1);
            let ticket = lp.begin_frame(fired[0]).unwrap();
            lp.end_frame(ticket, &mut sched, LoopControl::Continue);
            assert_eq!(sched.queued().len(), 1);
        }
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        let first = sched.fire()[0];
        lp.stop(&mut sched);
        assert!(lp.begin_frame(first).is_none());

        lp.start(&mut sched);
        assert!(lp.begin_frame(first).is_none());
        assert!(lp.begin_frame(FrameHandle(999)).is_none());
    }

    #[test]
    fn test_reentrant_frame_rejected() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        let handle = sched.fire()[0];
        let ticket = lp.begin_frame(handle).unwrap();
        assert!(lp.begin_frame(handle).is_none());
        lp.end_frame(ticket, &mut sched, LoopControl::Continue);
    }

    #[test]
    fn test_stop_during_frame_does_not_reschedule() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        let ticket = lp.begin_frame(sched.fire()[0]).unwrap();
        lp.stop(&mut sched);
        lp.end_frame(ticket, &mut sched, LoopControl::Continue);
        assert!(sched.queued().is_empty());
        assert!(!lp.is_running());
    }

    #[test]
    fn test_restart_during_frame_keeps_single_request() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        let ticket = lp.begin_frame(sched.fire()[0]).unwrap();
        lp.stop(&mut sched);
        lp.start(&mut sched);
        lp.end_frame(ticket, &mut sched, LoopControl::Continue);
        assert_eq!(sched.queued().len(), 1);
    }

    #[test]
    fn test_control_stop_ends_loop() {
        let mut sched = ManualScheduler::new();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched);
        let ticket = lp.begin_frame(sched.fire()[0]).unwrap();
        lp.end_frame(ticket, &mut sched, LoopControl::Stop);
        assert!(!lp.is_running());
        assert!(sched.queued().is_empty());
        assert!(lp.start(&mut sched));
    }

    #[test]
    fn test_fixed_step_first_frame_is_one_tick() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(1000.0), 1);
    }

    #[test]
    fn test_fixed_step_is_frame_rate_independent() {
        let mut fast = FixedStep::default();
        let mut slow = FixedStep::default();
        let mut fast_ticks = 0;
        let mut slow_ticks = 0;
        // One second at 120 Hz vs 30 Hz
        for i in 0..=120 {
            fast_ticks += fast.advance(i as f64 * 1000.0 / 120.0);
        }
        for i in 0..=30 {
            slow_ticks += slow.advance(i as f64 * 1000.0 / 30.0);
        }
        assert!((fast_ticks as i32 - 61).abs() <= 1, "fast {}", fast_ticks);
        assert!((slow_ticks as i32 - 61).abs() <= 1, "slow {}", slow_ticks);
    }

    #[test]
    fn test_fixed_step_caps_substeps() {
        let mut step = FixedStep::default();
        step.advance(0.0);
        assert_eq!(step.advance(5000.0), MAX_SUBSTEPS);
        // Time going backwards runs nothing
        assert_eq!(step.advance(4000.0), 0);
    }
}
