//! Protocol-facing abstractions: command delegate and state endpoint.
//!
//! The protocol layer that exposes the closure to remote clients is not part
//! of this crate. It talks to the coordinator through
//! [`ClosureControlDelegate`] and receives state through [`ClosureEndpoint`].

use crate::error::CommandError;
use crate::mapping::{SpeedClass, TargetPosition};
use crate::state::{CurrentState, MainState, TargetState};

/// Countdown reported for calibration, motion, and waiting phases.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 30;

/// Command capability of a closure.
///
/// Implemented by [`ClosureManager`](crate::ClosureManager). Protocol glue
/// depends only on this trait, so the manager can be swapped for a double.
pub trait ClosureControlDelegate {
    /// Handle a Calibrate command.
    fn handle_calibrate(&mut self) -> Result<(), CommandError>;

    /// Handle a MoveTo command.
    fn handle_move_to(
        &mut self,
        position: Option<TargetPosition>,
        latch: Option<bool>,
        speed: Option<SpeedClass>,
    ) -> Result<(), CommandError>;

    /// Handle a Stop command.
    fn handle_stop(&mut self) -> Result<(), CommandError>;

    /// Whether the closure can accept motion right now.
    fn is_ready_to_move(&self) -> bool {
        true
    }

    /// Seconds reported as the calibration countdown.
    fn calibration_countdown_secs(&self) -> u32 {
        DEFAULT_COUNTDOWN_SECS
    }

    /// Seconds reported as the motion countdown.
    fn moving_countdown_secs(&self) -> u32 {
        DEFAULT_COUNTDOWN_SECS
    }

    /// Seconds reported while waiting for motion to begin.
    fn waiting_for_motion_countdown_secs(&self) -> u32 {
        DEFAULT_COUNTDOWN_SECS
    }
}

/// Sink for the externally visible closure state.
///
/// `write_all_attributes` is called after every state-affecting event.
/// Failures are logged by the caller and never retried. The completion hooks
/// are observation points for countdown resets and event emission.
pub trait ClosureEndpoint {
    /// Error type for attribute writes.
    type Error: core::fmt::Display;

    /// Publish the full state.
    fn write_all_attributes(
        &mut self,
        main: MainState,
        current: &CurrentState,
        target: &TargetState,
    ) -> Result<(), Self::Error>;

    /// A stop interrupted calibration.
    fn on_stop_calibrate_complete(&mut self) {
        tracing::info!("stop-calibrate action complete");
    }

    /// A stop ended motion.
    fn on_stop_motion_complete(&mut self) {
        tracing::info!("stop-motion action complete");
    }

    /// Calibration finished.
    fn on_calibrate_complete(&mut self) {
        tracing::info!("calibrate action complete");
    }

    /// A move-to reached its target.
    fn on_move_to_complete(&mut self) {
        tracing::info!("move-to action complete");
    }
}
