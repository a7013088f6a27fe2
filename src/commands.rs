//! Inbound closure commands and their result codes.
//!
//! Commands arrive from the protocol layer either as direct calls on a
//! [`ClosureControlDelegate`] or as [`ClosureCommand`] values posted to the
//! event loop. Either way the outcome is reported as a [`Status`].
//!
//! ```rust
//! use closure_emulator::{ClosureCommand, SpeedClass, TargetPosition};
//!
//! let cmd = ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::High);
//! assert_eq!(cmd.name(), "move_to");
//! ```

use crate::error::CommandError;
use crate::mapping::{SpeedClass, TargetPosition};
use crate::traits::ClosureControlDelegate;

/// Result code returned to the protocol layer for every command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    /// Command accepted.
    Success,
    /// Command rejected (invalid input or device refusal).
    Failure,
    /// Command is not implemented by this device.
    UnsupportedCommand,
}

impl Status {
    /// `true` for [`Status::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl From<&Result<(), CommandError>> for Status {
    fn from(result: &Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl From<Result<(), CommandError>> for Status {
    fn from(result: Result<(), CommandError>) -> Self {
        Status::from(&result)
    }
}

/// A command addressed to the closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClosureCommand {
    /// Run calibration. Currently unsupported.
    Calibrate,
    /// Move to a named position.
    ///
    /// `position` is mandatory; a command without it is rejected with
    /// [`Status::Failure`]. `latch` and `speed` are optional.
    MoveTo {
        /// Target position.
        position: Option<TargetPosition>,
        /// Requested latch state.
        latch: Option<bool>,
        /// Requested speed; falls back to the current speed when absent.
        speed: Option<SpeedClass>,
    },
    /// Stop any motion in progress.
    Stop,
}

impl ClosureCommand {
    /// MoveTo with only a position.
    pub fn move_to(position: TargetPosition) -> Self {
        Self::MoveTo {
            position: Some(position),
            latch: None,
            speed: None,
        }
    }

    /// Set the speed on a MoveTo command. Other commands are returned unchanged.
    pub fn with_speed(self, speed: SpeedClass) -> Self {
        match self {
            Self::MoveTo {
                position, latch, ..
            } => Self::MoveTo {
                position,
                latch,
                speed: Some(speed),
            },
            other => other,
        }
    }

    /// Set the latch flag on a MoveTo command. Other commands are returned unchanged.
    pub fn with_latch(self, latch: bool) -> Self {
        match self {
            Self::MoveTo {
                position, speed, ..
            } => Self::MoveTo {
                position,
                latch: Some(latch),
                speed,
            },
            other => other,
        }
    }

    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Calibrate => "calibrate",
            Self::MoveTo { .. } => "move_to",
            Self::Stop => "stop",
        }
    }

    /// Deliver this command to a delegate.
    pub fn apply<D: ClosureControlDelegate + ?Sized>(
        self,
        delegate: &mut D,
    ) -> Result<(), CommandError> {
        match self {
            Self::Calibrate => delegate.handle_calibrate(),
            Self::MoveTo {
                position,
                latch,
                speed,
            } => delegate.handle_move_to(position, latch, speed),
            Self::Stop => delegate.handle_stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDelegate {
        calls: heapless::Vec<&'static str, 8>,
    }

    impl ClosureControlDelegate for RecordingDelegate {
        fn handle_calibrate(&mut self) -> Result<(), CommandError> {
            let _ = self.calls.push("calibrate");
            Err(CommandError::Unsupported)
        }

        fn handle_move_to(
            &mut self,
            position: Option<TargetPosition>,
            _latch: Option<bool>,
            _speed: Option<SpeedClass>,
        ) -> Result<(), CommandError> {
            let _ = self.calls.push("move_to");
            position.map(|_| ()).ok_or(CommandError::MissingPosition)
        }

        fn handle_stop(&mut self) -> Result<(), CommandError> {
            let _ = self.calls.push("stop");
            Ok(())
        }
    }

    #[test]
    fn apply_routes_each_command() {
        let mut delegate = RecordingDelegate::default();
        let results = [
            ClosureCommand::Calibrate.apply(&mut delegate),
            ClosureCommand::move_to(TargetPosition::FullyOpen).apply(&mut delegate),
            ClosureCommand::Stop.apply(&mut delegate),
        ];
        assert_eq!(delegate.calls.as_slice(), ["calibrate", "move_to", "stop"]);
        assert_eq!(Status::from(&results[0]), Status::UnsupportedCommand);
        assert_eq!(Status::from(&results[1]), Status::Success);
        assert_eq!(Status::from(&results[2]), Status::Success);
    }

    #[test]
    fn move_to_without_position_maps_to_failure() {
        let mut delegate = RecordingDelegate::default();
        let cmd = ClosureCommand::MoveTo {
            position: None,
            latch: None,
            speed: Some(SpeedClass::High),
        };
        assert_eq!(Status::from(cmd.apply(&mut delegate)), Status::Failure);
    }

    #[test]
    fn builders_only_touch_move_to() {
        let cmd = ClosureCommand::move_to(TargetPosition::Ventilation)
            .with_speed(SpeedClass::Low)
            .with_latch(true);
        assert_eq!(
            cmd,
            ClosureCommand::MoveTo {
                position: Some(TargetPosition::Ventilation),
                latch: Some(true),
                speed: Some(SpeedClass::Low),
            }
        );
        assert_eq!(ClosureCommand::Stop.with_speed(SpeedClass::High), ClosureCommand::Stop);
    }

    #[test]
    fn status_is_success() {
        assert!(Status::Success.is_success());
        assert!(!Status::Failure.is_success());
        assert!(!Status::UnsupportedCommand.is_success());
    }
}
