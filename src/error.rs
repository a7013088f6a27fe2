//! Error types for configuration, motion, commands, and state publication.
//!
//! Nothing here is fatal. Command errors are surfaced to the caller as a
//! [`Status`](crate::Status); motion and endpoint errors raised from the
//! tick path are logged and leave the state consistent.

use crate::commands::Status;
use crate::mapping::PositionClass;

/// Invalid configuration detected by [`ClosureConfig::validate`] or the
/// mapping table constructors.
///
/// [`ClosureConfig::validate`]: crate::config::ClosureConfig::validate
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two named positions share the same physical value, which would make
    /// reverse classification ambiguous.
    #[error("positions {first:?} and {second:?} both map to {value}")]
    DuplicatePosition {
        /// Class declared first in the table.
        first: PositionClass,
        /// Class declared later with the same value.
        second: PositionClass,
        /// The shared physical value.
        value: u16,
    },
    /// A named position lies beyond the configured travel range.
    #[error("position {class:?} = {value} exceeds max travel {max_travel}")]
    PositionOutOfRange {
        /// Offending class.
        class: PositionClass,
        /// Configured value.
        value: u16,
        /// Upper bound of travel.
        max_travel: u16,
    },
    /// A speed class was configured with a zero travel rate.
    #[error("speed rate must be greater than zero")]
    ZeroRate,
    /// The tick interval is zero.
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    /// The travel range is empty.
    #[error("max travel must be greater than zero")]
    ZeroMaxTravel,
}

/// Errors raised by a [`PhysicalDevice`](crate::traits::PhysicalDevice).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    /// Travel rate of zero would never reach the target.
    #[error("travel rate must be greater than zero")]
    ZeroRate,
    /// Rate is positive but rounds down to a zero step per tick.
    #[error("rate {rate} moves less than one unit per {interval_ms} ms tick")]
    StepTooSmall {
        /// Requested rate in units per second.
        rate: u16,
        /// Tick interval in milliseconds.
        interval_ms: u32,
    },
    /// Target lies outside `[0, max_travel]`.
    #[error("target {target} exceeds max travel {max_travel}")]
    TargetOutOfRange {
        /// Requested target.
        target: u16,
        /// Upper bound of travel.
        max_travel: u16,
    },
    /// The position indicator rejected a level update.
    #[error("position indicator failure: {0}")]
    Indicator(&'static str),
}

/// Reasons a closure command was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// MoveTo was issued without the mandatory position field.
    #[error("move-to requires a target position")]
    MissingPosition,
    /// The command exists in the interface but is not implemented.
    #[error("command not supported")]
    Unsupported,
    /// The physical device refused the motion request.
    #[error("device rejected command: {0}")]
    Device(#[from] MotionError),
}

impl CommandError {
    /// Result code reported back to the protocol layer.
    pub fn status(&self) -> Status {
        match self {
            CommandError::Unsupported => Status::UnsupportedCommand,
            CommandError::MissingPosition | CommandError::Device(_) => Status::Failure,
        }
    }
}

/// Failures writing the externally visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// Another thread panicked while holding the attribute lock.
    #[error("attribute lock poisoned")]
    LockPoisoned,
    /// The attribute store refused the write.
    #[error("attribute write rejected: {0}")]
    Rejected(&'static str),
}

/// Failures talking to a running closure task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The closure task has exited.
    #[error("closure runtime has shut down")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_status_mapping() {
        assert_eq!(CommandError::Unsupported.status(), Status::UnsupportedCommand);
        assert_eq!(CommandError::MissingPosition.status(), Status::Failure);
        assert_eq!(
            CommandError::Device(MotionError::ZeroRate).status(),
            Status::Failure
        );
    }

    #[test]
    fn motion_error_converts_into_command_error() {
        let err: CommandError = MotionError::ZeroRate.into();
        assert_eq!(err, CommandError::Device(MotionError::ZeroRate));
    }
}
