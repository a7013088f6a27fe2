//! Motion emulator: gradual travel of the closure toward a target position.
//!
//! [`MotionEmulator`] owns a single physical trajectory. A move arms a
//! periodic [`Tick`]; each tick advances the position by
//! `rate * interval / 1000` units (rounded down) toward the target, clamping
//! exactly onto it, and drives the position indicator. When the target is
//! reached the emulator stops itself and reports
//! [`MotionEvent::Stopped`] with [`StopReason::Arrived`].
//!
//! # Stale ticks
//!
//! Every call to [`move_to`](PhysicalDevice::move_to) or
//! [`stop`](PhysicalDevice::stop) starts a new generation. A tick carrying an
//! older generation is dropped on arrival, so a superseded trajectory can
//! never move the closure after the new one has started.
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::{MotionEmulator, MotionEvent, StopReason};
//! use closure_emulator::config::MotionConfig;
//! use closure_emulator::hal::{ManualScheduler, MockIndicator};
//! use closure_emulator::traits::PhysicalDevice;
//!
//! let mut emu = MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &MotionConfig::default());
//! emu.move_to(1000, 5000).unwrap();
//!
//! // 5000 units/s at 100 ms per tick = 500 units per tick
//! let tick = emu.scheduler_mut().take().unwrap();
//! assert!(matches!(emu.on_tick(tick), Some(MotionEvent::Progress { position: 500, .. })));
//!
//! let tick = emu.scheduler_mut().take().unwrap();
//! assert_eq!(
//!     emu.on_tick(tick),
//!     Some(MotionEvent::Stopped { position: 1000, reason: StopReason::Arrived })
//! );
//! assert!(!emu.is_running());
//! ```

use crate::config::MotionConfig;
use crate::error::MotionError;
use crate::traits::{
    MotionEvent, PhysicalDevice, PositionIndicator, StopReason, Tick, TickScheduler,
};

/// Highest level accepted by a [`PositionIndicator`].
pub const INDICATOR_MAX: u8 = u8::MAX;

/// Working state of the emulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionState {
    /// Physical position now.
    pub current_position: u16,
    /// Physical position being travelled to.
    pub target_position: u16,
    /// Travel rate in units per second.
    pub speed: u16,
    /// Whether a trajectory is in progress.
    pub running: bool,
    /// Identifier of the current trajectory.
    pub generation: u32,
}

/// Units moved per tick for a rate and interval, rounded down.
///
/// ```
/// use closure_emulator::emulator::step_per_tick;
///
/// assert_eq!(step_per_tick(5000, 100), 500);
/// assert_eq!(step_per_tick(9, 100), 0);
/// assert_eq!(step_per_tick(u16::MAX, 60_000), u16::MAX);
/// ```
pub fn step_per_tick(rate: u16, interval_ms: u32) -> u16 {
    let step = u64::from(rate) * u64::from(interval_ms) / 1000;
    step.min(u64::from(u16::MAX)) as u16
}

/// Emulated closure drive.
///
/// # Type Parameters
///
/// - `I`: the [`PositionIndicator`] mirroring the position
/// - `S`: the [`TickScheduler`] delivering ticks back to the control thread
pub struct MotionEmulator<I: PositionIndicator, S: TickScheduler> {
    indicator: I,
    scheduler: S,
    state: MotionState,
    tick_interval_ms: u32,
    max_travel: u16,
}

impl<I: PositionIndicator, S: TickScheduler> MotionEmulator<I, S> {
    /// Create an idle emulator at `config.initial_position`.
    pub fn new(indicator: I, scheduler: S, config: &MotionConfig) -> Self {
        let start = config.initial_position.min(config.max_travel);
        Self {
            indicator,
            scheduler,
            state: MotionState {
                current_position: start,
                target_position: start,
                speed: 0,
                running: false,
                generation: 0,
            },
            tick_interval_ms: config.tick_interval_ms.max(1),
            max_travel: config.max_travel.max(1),
        }
    }

    /// Snapshot of the working state.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Units moved per tick at the current rate.
    pub fn step(&self) -> u16 {
        step_per_tick(self.state.speed, self.tick_interval_ms)
    }

    /// Estimated time until the target is reached.
    pub fn time_left_ms(&self) -> u32 {
        let step = u32::from(self.step());
        if !self.state.running || step == 0 {
            return 0;
        }
        let remaining = u32::from(self.state.current_position.abs_diff(self.state.target_position));
        remaining.div_ceil(step).saturating_mul(self.tick_interval_ms)
    }

    /// Indicator level for a physical position, rounded to nearest.
    pub fn indicator_level(&self, position: u16) -> u8 {
        let max = u32::from(self.max_travel);
        let pos = u32::from(position).min(max);
        ((pos * u32::from(INDICATOR_MAX) + max / 2) / max) as u8
    }

    /// Tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    /// Upper bound of travel.
    pub fn max_travel(&self) -> u16 {
        self.max_travel
    }

    /// The position indicator.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Mutable access to the position indicator.
    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    /// The tick scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the tick scheduler.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn drive_indicator(&mut self) -> Result<(), I::Error> {
        let level = self.indicator_level(self.state.current_position);
        self.indicator.set_level(level)
    }

    /// Move one step toward the target. Returns `true` on arrival.
    fn advance(&mut self) -> bool {
        let step = self.step();
        let s = &mut self.state;

        if s.current_position <= s.target_position {
            if s.target_position - s.current_position <= step {
                s.current_position = s.target_position;
                return true;
            }
            s.current_position += step;
        } else {
            if s.current_position - s.target_position <= step {
                s.current_position = s.target_position;
                return true;
            }
            s.current_position -= step;
        }
        false
    }

    fn next_generation(&mut self) -> u32 {
        self.state.generation = self.state.generation.wrapping_add(1);
        self.state.generation
    }
}

impl<I: PositionIndicator, S: TickScheduler> PhysicalDevice for MotionEmulator<I, S> {
    fn init(&mut self) -> Result<(), MotionError> {
        self.drive_indicator()
            .map_err(|_| MotionError::Indicator("cannot initialize the position indicator"))?;
        tracing::info!(
            position = self.state.current_position,
            interval_ms = self.tick_interval_ms,
            "motion emulator initialized"
        );
        Ok(())
    }

    fn move_to(&mut self, position: u16, rate: u16) -> Result<MotionEvent, MotionError> {
        if rate == 0 {
            return Err(MotionError::ZeroRate);
        }
        if position > self.max_travel {
            return Err(MotionError::TargetOutOfRange {
                target: position,
                max_travel: self.max_travel,
            });
        }
        if step_per_tick(rate, self.tick_interval_ms) == 0 {
            return Err(MotionError::StepTooSmall {
                rate,
                interval_ms: self.tick_interval_ms,
            });
        }

        self.state.target_position = position;
        self.state.speed = rate;
        self.state.running = true;
        let generation = self.next_generation();
        self.scheduler
            .schedule(Tick::new(generation), self.tick_interval_ms);

        tracing::info!(
            from = self.state.current_position,
            to = position,
            rate,
            "starting movement"
        );

        Ok(MotionEvent::Progress {
            position: self.state.current_position,
            time_left_ms: self.time_left_ms(),
            just_started: true,
        })
    }

    fn stop(&mut self) -> MotionEvent {
        self.scheduler.cancel();
        self.state.running = false;
        self.next_generation();
        tracing::info!(position = self.state.current_position, "movement stopped");

        MotionEvent::Stopped {
            position: self.state.current_position,
            reason: StopReason::Commanded,
        }
    }

    fn on_tick(&mut self, tick: Tick) -> Option<MotionEvent> {
        if !self.state.running || tick.generation() != self.state.generation {
            tracing::debug!(
                tick = tick.generation(),
                current = self.state.generation,
                "dropping stale tick"
            );
            return None;
        }

        let arrived = self.advance();
        if let Err(e) = self.drive_indicator() {
            tracing::warn!(error = ?e, "position indicator update failed");
        }
        tracing::debug!(
            position = self.state.current_position,
            to = self.state.target_position,
            "tick"
        );

        if arrived {
            self.scheduler.cancel();
            self.state.running = false;
            tracing::info!(position = self.state.current_position, "target reached");
            return Some(MotionEvent::Stopped {
                position: self.state.current_position,
                reason: StopReason::Arrived,
            });
        }

        self.scheduler
            .schedule(Tick::new(self.state.generation), self.tick_interval_ms);
        Some(MotionEvent::Progress {
            position: self.state.current_position,
            time_left_ms: self.time_left_ms(),
            just_started: false,
        })
    }

    fn position(&self) -> u16 {
        self.state.current_position
    }

    fn is_running(&self) -> bool {
        self.state.running
    }
}

// ============================================================================
// Tests
// ============================================================================
