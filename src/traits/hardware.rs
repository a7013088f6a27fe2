//! Physical-side abstractions: position indicator, tick scheduling, and the
//! physical device driven by the coordinator.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`PositionIndicator`] | Proportional output (LED/PWM) tracking position |
//! | [`TickScheduler`] | Posts a [`Tick`] back to the control thread later |
//! | [`PhysicalDevice`] | Something that can move to a position and stop |
//! | [`MotionObserver`] | Receives progress and stop notifications |
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::traits::{PositionIndicator, TickScheduler, Tick};
//! use closure_emulator::hal::{MockIndicator, ManualScheduler};
//!
//! let mut indicator = MockIndicator::new();
//! indicator.set_level(128).unwrap();
//! assert_eq!(indicator.level, 128);
//!
//! let mut scheduler = ManualScheduler::new();
//! scheduler.schedule(Tick::new(1), 100);
//! assert_eq!(scheduler.take(), Some(Tick::new(1)));
//! ```

use crate::error::MotionError;

/// Proportional hardware indicator driven by the current position.
///
/// The level range is `0..=255`; implementations scale it to their own
/// resolution.
pub trait PositionIndicator {
    /// Error type for indicator writes.
    type Error: core::fmt::Debug;

    /// Set the output level.
    fn set_level(&mut self, level: u8) -> Result<(), Self::Error>;
}

/// A scheduled interpolation step.
///
/// Each tick carries the generation of the trajectory that armed it. When a
/// new trajectory starts or motion stops, the generation changes and any tick
/// still in flight is ignored on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tick {
    generation: u32,
}

impl Tick {
    /// Create a tick for the given trajectory generation.
    pub const fn new(generation: u32) -> Self {
        Self { generation }
    }

    /// Trajectory generation this tick belongs to.
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Timer service that delivers ticks back onto the control thread.
///
/// Scheduling replaces any pending tick. Implementations must deliver the
/// tick on the same thread that owns the device.
pub trait TickScheduler {
    /// Deliver `tick` after `after_ms` milliseconds.
    fn schedule(&mut self, tick: Tick, after_ms: u32);

    /// Drop any pending tick.
    fn cancel(&mut self);
}

/// Why motion ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// The target position was reached.
    Arrived,
    /// A stop was requested.
    Commanded,
}

/// Notification produced by a [`PhysicalDevice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    /// Motion in progress.
    Progress {
        /// Current physical position.
        position: u16,
        /// Estimated time to reach the target.
        time_left_ms: u32,
        /// `true` for the notification emitted when motion starts.
        just_started: bool,
    },
    /// Motion has ended and no further ticks are pending.
    Stopped {
        /// Physical position at which motion ended.
        position: u16,
        /// Why it ended.
        reason: StopReason,
    },
}

impl MotionEvent {
    /// Forward this event to an observer.
    pub fn notify<O: MotionObserver + ?Sized>(self, observer: &mut O) {
        match self {
            MotionEvent::Progress {
                position,
                time_left_ms,
                just_started,
            } => observer.on_movement_update(position, time_left_ms, just_started),
            MotionEvent::Stopped { position, reason } => {
                observer.on_movement_stopped(position, reason)
            }
        }
    }

    /// Physical position carried by the event.
    pub fn position(&self) -> u16 {
        match self {
            MotionEvent::Progress { position, .. } | MotionEvent::Stopped { position, .. } => {
                *position
            }
        }
    }
}

/// Receiver of [`MotionEvent`]s.
pub trait MotionObserver {
    /// Motion has ended at `position`.
    fn on_movement_stopped(&mut self, position: u16, reason: StopReason);

    /// Motion is in progress.
    fn on_movement_update(&mut self, position: u16, time_left_ms: u32, just_started: bool);
}

/// A closure drive that can travel to a physical position.
///
/// Implemented by [`MotionEmulator`](crate::MotionEmulator). The coordinator
/// is generic over this trait so tests can substitute their own device.
pub trait PhysicalDevice {
    /// Prepare the hardware.
    fn init(&mut self) -> Result<(), MotionError>;

    /// Start travelling to `position` at `rate` units per second.
    ///
    /// Supersedes any trajectory already in progress.
    fn move_to(&mut self, position: u16, rate: u16) -> Result<MotionEvent, MotionError>;

    /// Stop immediately. Always yields a [`MotionEvent::Stopped`].
    fn stop(&mut self) -> MotionEvent;

    /// Handle a scheduled tick. Returns `None` for stale or idle ticks.
    fn on_tick(&mut self, tick: Tick) -> Option<MotionEvent>;

    /// Current physical position.
    fn position(&self) -> u16;

    /// Whether a trajectory is in progress.
    fn is_running(&self) -> bool;
}
