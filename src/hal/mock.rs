//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the hardware and endpoint traits,
//! enabling development and testing on desktop without a physical closure.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockIndicator`] | [`PositionIndicator`] | Records indicator levels |
//! | [`ManualScheduler`] | [`TickScheduler`] | Holds the pending tick for the test to fire |
//! | [`MockEndpoint`] | [`ClosureEndpoint`] | Records published states and completions |
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::hal::{ManualScheduler, MockIndicator};
//! use closure_emulator::traits::PhysicalDevice;
//! use closure_emulator::config::MotionConfig;
//! use closure_emulator::MotionEmulator;
//!
//! let mut emu = MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &MotionConfig::default());
//! emu.move_to(10_000, 5000).unwrap();
//!
//! // Fire ticks by hand until the emulator stops re-arming
//! while let Some(tick) = emu.scheduler_mut().take() {
//!     emu.on_tick(tick);
//! }
//! assert_eq!(emu.position(), 10_000);
//! assert_eq!(emu.indicator().level, 255);
//! ```

extern crate alloc;
use alloc::vec::Vec;

use crate::error::EndpointError;
use crate::state::{ClosureState, CurrentState, MainState, TargetState};
use crate::traits::{ClosureEndpoint, PositionIndicator, Tick, TickScheduler};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock position indicator.
///
/// Records every level written. Set `fail` to make writes error.
///
/// # Example
///
/// ```rust
/// use closure_emulator::hal::MockIndicator;
/// use closure_emulator::traits::PositionIndicator;
///
/// let mut led = MockIndicator::new();
/// led.set_level(10).unwrap();
/// led.set_level(20).unwrap();
///
/// assert_eq!(led.level, 20);
/// assert_eq!(led.history, [10, 20]);
///
/// led.fail = true;
/// assert!(led.set_level(30).is_err());
/// assert_eq!(led.level, 20);
/// ```
#[derive(Debug, Default)]
pub struct MockIndicator {
    /// Last level written.
    pub level: u8,
    /// Every level written, oldest first.
    pub history: Vec<u8>,
    /// When set, writes fail and are not recorded.
    pub fail: bool,
}

impl MockIndicator {
    /// Creates a new mock indicator at level 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionIndicator for MockIndicator {
    type Error = &'static str;

    fn set_level(&mut self, level: u8) -> Result<(), Self::Error> {
        if self.fail {
            return Err("mock indicator failure");
        }
        self.level = level;
        self.history.push(level);
        Ok(())
    }
}

/// Tick scheduler driven by hand.
///
/// Keeps the most recently scheduled tick. Tests call [`take`](Self::take)
/// to fire it, which is how time advances.
///
/// # Example
///
/// ```rust
/// use closure_emulator::hal::ManualScheduler;
/// use closure_emulator::traits::{Tick, TickScheduler};
///
/// let mut sched = ManualScheduler::new();
/// sched.schedule(Tick::new(1), 100);
/// sched.schedule(Tick::new(2), 100); // replaces the first
///
/// assert_eq!(sched.take(), Some(Tick::new(2)));
/// assert_eq!(sched.take(), None);
/// assert_eq!(sched.scheduled, 2);
/// ```
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Option<(Tick, u32)>,
    /// Number of `schedule` calls.
    pub scheduled: usize,
    /// Number of `cancel` calls.
    pub cancelled: usize,
}

impl ManualScheduler {
    /// Creates a scheduler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending tick.
    pub fn take(&mut self) -> Option<Tick> {
        self.pending.take().map(|(tick, _)| tick)
    }

    /// Pending tick and its delay, if any.
    pub fn pending(&self) -> Option<(Tick, u32)> {
        self.pending
    }

    /// Whether a tick is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, tick: Tick, after_ms: u32) {
        self.pending = Some((tick, after_ms));
        self.scheduled += 1;
    }

    fn cancel(&mut self) {
        self.pending = None;
        self.cancelled += 1;
    }
}

// ============================================================================
// Endpoint Mock
// ============================================================================

/// Mock attribute endpoint.
///
/// Captures every successful publication and counts completion signals.
/// Set `fail_writes` to reject publications.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    /// Every state published, oldest first.
    pub writes: Vec<ClosureState>,
    /// When set, writes fail with [`EndpointError::Rejected`].
    pub fail_writes: bool,
    /// `on_move_to_complete` calls.
    pub move_to_complete: usize,
    /// `on_stop_motion_complete` calls.
    pub stop_motion_complete: usize,
    /// `on_calibrate_complete` calls.
    pub calibrate_complete: usize,
    /// `on_stop_calibrate_complete` calls.
    pub stop_calibrate_complete: usize,
}

impl MockEndpoint {
    /// Creates an empty endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent publication.
    pub fn last(&self) -> Option<&ClosureState> {
        self.writes.last()
    }
}

impl ClosureEndpoint for MockEndpoint {
    type Error = EndpointError;

    fn write_all_attributes(
        &mut self,
        main: MainState,
        current: &CurrentState,
        target: &TargetState,
    ) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(EndpointError::Rejected("mock endpoint failure"));
        }
        self.writes.push(ClosureState {
            main,
            current: *current,
            target: *target,
        });
        Ok(())
    }

    fn on_stop_calibrate_complete(&mut self) {
        self.stop_calibrate_complete += 1;
    }

    fn on_stop_motion_complete(&mut self) {
        self.stop_motion_complete += 1;
    }

    fn on_calibrate_complete(&mut self) {
        self.calibrate_complete += 1;
    }

    fn on_move_to_complete(&mut self) {
        self.move_to_complete += 1;
    }
}
