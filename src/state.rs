//! Externally visible closure state.
//!
//! The [`ClosureManager`](crate::ClosureManager) owns one [`ClosureState`]
//! and publishes it through a [`ClosureEndpoint`](crate::traits::ClosureEndpoint)
//! after every state-affecting event.

use crate::mapping::{PositionClass, SpeedClass, TargetPosition};

/// Overall operating state of the closure.
///
/// The emulator only ever produces [`Stopped`](Self::Stopped) and
/// [`Moving`](Self::Moving); the other variants exist so the state can be
/// published and matched against the full protocol enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MainState {
    /// Not moving.
    #[default]
    Stopped,
    /// Travelling toward a target.
    Moving,
    /// Waiting for a precondition before motion.
    WaitingForMotion,
    /// Fault condition.
    Error,
    /// Calibration in progress.
    Calibrating,
    /// Protection mechanism engaged.
    Protected,
    /// Drive disengaged from the closure.
    Disengaged,
    /// Installation or calibration required.
    SetupRequired,
}

impl MainState {
    /// Returns the state as a snake_case string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MainState::Stopped => "stopped",
            MainState::Moving => "moving",
            MainState::WaitingForMotion => "waiting_for_motion",
            MainState::Error => "error",
            MainState::Calibrating => "calibrating",
            MainState::Protected => "protected",
            MainState::Disengaged => "disengaged",
            MainState::SetupRequired => "setup_required",
        }
    }
}

/// Where the closure is now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrentState {
    /// Last reconciled position class.
    pub position: Option<PositionClass>,
    /// Whether the closure is latched, if known.
    pub latch: Option<bool>,
    /// Speed class of the last completed motion.
    pub speed: Option<SpeedClass>,
    /// Whether the closure is secured.
    pub secure_state: Option<bool>,
}

impl Default for CurrentState {
    fn default() -> Self {
        Self {
            position: Some(PositionClass::FullyOpened),
            latch: None,
            speed: Some(SpeedClass::Auto),
            secure_state: Some(false),
        }
    }
}

/// Where the closure has been asked to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetState {
    /// Requested position; present only while moving.
    pub position: Option<TargetPosition>,
    /// Requested latch state.
    pub latch: Option<bool>,
    /// Requested speed class.
    pub speed: Option<SpeedClass>,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            position: None,
            latch: None,
            speed: Some(SpeedClass::Auto),
        }
    }
}

/// Full `{main, current, target}` snapshot.
///
/// # Example
///
/// ```rust
/// use closure_emulator::{ClosureState, MainState, PositionClass};
///
/// let state = ClosureState::default();
/// assert_eq!(state.main, MainState::Stopped);
/// assert_eq!(state.current.position, Some(PositionClass::FullyOpened));
/// assert!(state.target.position.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosureState {
    /// Overall operating state.
    pub main: MainState,
    /// Current position, speed, and latch.
    pub current: CurrentState,
    /// Requested position, speed, and latch.
    pub target: TargetState,
}

impl ClosureState {
    /// `true` when the target position is present exactly while moving.
    pub fn is_consistent(&self) -> bool {
        self.target.position.is_some() == (self.main == MainState::Moving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_matches_power_on() {
        let state = ClosureState::default();
        assert_eq!(state.main, MainState::Stopped);
        assert_eq!(state.current.speed, Some(SpeedClass::Auto));
        assert_eq!(state.current.secure_state, Some(false));
        assert_eq!(state.target.speed, Some(SpeedClass::Auto));
        assert!(state.is_consistent());
    }

    #[test]
    fn moving_without_target_is_inconsistent() {
        let state = ClosureState {
            main: MainState::Moving,
            ..ClosureState::default()
        };
        assert!(!state.is_consistent());
    }

    #[test]
    fn main_state_names() {
        assert_eq!(MainState::Stopped.as_str(), "stopped");
        assert_eq!(MainState::WaitingForMotion.as_str(), "waiting_for_motion");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn state_serializes_with_snake_case_enums() {
        let json = serde_json::to_value(ClosureState::default()).unwrap();
        assert_eq!(json["main"], "stopped");
        assert_eq!(json["current"]["position"], "fully_opened");
        assert_eq!(json["current"]["speed"], "auto");
        assert!(json["target"]["position"].is_null());
    }
}
