//! Closure coordinator.
//!
//! [`ClosureManager`] owns the externally visible [`ClosureState`], accepts
//! commands through [`ClosureControlDelegate`], drives a [`PhysicalDevice`],
//! and writes every state change to a [`ClosureEndpoint`].
//!
//! # Flow
//!
//! ```text
//! command ─► ClosureManager ─► PhysicalDevice::move_to / stop
//!                 ▲                     │
//!                 │    MotionEvent      │
//!                 └─────────────────────┘
//!                 │
//!                 └─► ClosureEndpoint::write_all_attributes
//! ```
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::{ClosureManager, MainState, MotionEmulator, PositionClass, SpeedClass, TargetPosition};
//! use closure_emulator::config::ClosureConfig;
//! use closure_emulator::hal::{ManualScheduler, MockEndpoint, MockIndicator};
//!
//! let config = ClosureConfig::default();
//! let device = MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
//! let mut manager = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
//! manager.init();
//!
//! manager
//!     .on_move_to_command(Some(TargetPosition::FullyClosed), None, Some(SpeedClass::High))
//!     .unwrap();
//! assert_eq!(manager.main_state(), MainState::Moving);
//!
//! while let Some(tick) = manager.device_mut().scheduler_mut().take() {
//!     manager.on_tick(tick);
//! }
//! assert_eq!(manager.main_state(), MainState::Stopped);
//! assert_eq!(manager.current_state().position, Some(PositionClass::FullyClosed));
//! ```

use crate::commands::{ClosureCommand, Status};
use crate::config::{ClosureConfig, CountdownConfig};
use crate::emulator::step_per_tick;
use crate::error::{CommandError, ConfigError};
use crate::mapping::{PositionMap, SpeedClass, SpeedTable, TargetPosition};
use crate::state::{ClosureState, CurrentState, MainState, TargetState};
use crate::traits::{
    ClosureControlDelegate, ClosureEndpoint, MotionObserver, PhysicalDevice, StopReason, Tick,
};

/// Coordinator between protocol commands and the physical closure.
///
/// # Type Parameters
///
/// - `D`: the [`PhysicalDevice`] being driven
/// - `E`: the [`ClosureEndpoint`] receiving state publications
pub struct ClosureManager<D: PhysicalDevice, E: ClosureEndpoint> {
    device: D,
    endpoint: E,
    positions: PositionMap,
    speeds: SpeedTable,
    countdown: CountdownConfig,
    state: ClosureState,
}

impl<D: PhysicalDevice, E: ClosureEndpoint> ClosureManager<D, E> {
    /// Create a coordinator from a validated configuration.
    pub fn new(device: D, endpoint: E, config: &ClosureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let slowest = config.speeds.min_rate();
        if step_per_tick(slowest, config.motion.tick_interval_ms) == 0 {
            tracing::warn!(
                rate = slowest,
                interval_ms = config.motion.tick_interval_ms,
                "slowest speed moves less than one unit per tick and will be rejected"
            );
        }
        Ok(Self {
            device,
            endpoint,
            positions: config.position_map()?,
            speeds: config.speeds,
            countdown: config.countdown,
            state: ClosureState::default(),
        })
    }

    /// Initialize the device and publish the power-on state.
    ///
    /// A device failure is logged; the state is still classified and
    /// published so the closure stays controllable.
    pub fn init(&mut self) {
        if let Err(e) = self.device.init() {
            tracing::warn!(error = %e, "device initialization failed");
        }
        self.state.current.position = Some(self.positions.classify(self.device.position()));
        tracing::info!(
            main = self.state.main.as_str(),
            position = self.device.position(),
            "closure initialized"
        );
        self.publish();
    }

    /// Calibration is not implemented by this closure.
    pub fn on_calibrate_command(&mut self) -> Result<(), CommandError> {
        tracing::info!("calibrate command received, not supported");
        Err(CommandError::Unsupported)
    }

    /// Start moving to a named position.
    ///
    /// Without a position nothing changes and
    /// [`CommandError::MissingPosition`] is returned. A missing speed falls
    /// back to the current speed, then to [`SpeedClass::Auto`]. A device
    /// rejection leaves the state untouched.
    pub fn on_move_to_command(
        &mut self,
        position: Option<TargetPosition>,
        latch: Option<bool>,
        speed: Option<SpeedClass>,
    ) -> Result<(), CommandError> {
        let Some(target) = position else {
            tracing::warn!("move-to without a target position");
            return Err(CommandError::MissingPosition);
        };

        let speed = speed.or(self.state.current.speed).unwrap_or_default();
        let physical = self.positions.forward(target);
        let rate = self.speeds.rate(speed);

        tracing::info!(
            position = target.as_str(),
            speed = speed.as_str(),
            physical,
            rate,
            "move-to command"
        );

        let event = self.device.move_to(physical, rate).map_err(|e| {
            tracing::warn!(error = %e, "device rejected move-to");
            CommandError::from(e)
        })?;

        self.state.main = MainState::Moving;
        self.state.target = TargetState {
            position: Some(target),
            latch,
            speed: Some(speed),
        };
        self.publish();
        event.notify(self);
        Ok(())
    }

    /// Stop any motion.
    pub fn on_stop_command(&mut self) {
        tracing::info!("stop command");
        let event = self.device.stop();
        event.notify(self);
    }

    /// Deliver a scheduled tick to the device.
    pub fn on_tick(&mut self, tick: Tick) {
        if let Some(event) = self.device.on_tick(tick) {
            event.notify(self);
        }
    }

    /// Apply a command and report its protocol status.
    pub fn dispatch(&mut self, command: ClosureCommand) -> Status {
        let result = command.apply(self);
        if let Err(e) = &result {
            tracing::info!(command = command.name(), error = %e, "command not accepted");
        }
        Status::from(&result)
    }

    /// Fold a device state change into the closure state.
    ///
    /// Only [`MainState::Stopped`] is meaningful here: the position is
    /// classified, the target speed becomes current, the target position is
    /// cleared, and the state is published. Anything else is logged and
    /// ignored.
    pub fn handle_closure_callback(&mut self, new_state: MainState, position: u16) {
        match new_state {
            MainState::Stopped => {
                self.state.current.position = Some(self.positions.classify(position));
                self.state.current.speed = self.state.target.speed;
                self.state.main = MainState::Stopped;
                self.state.target.position = None;
                tracing::info!(
                    position,
                    class = ?self.state.current.position,
                    "closure stopped"
                );
                self.publish();
            }
            other => {
                tracing::error!(state = other.as_str(), "unexpected state in closure callback");
            }
        }
    }

    fn publish(&mut self) {
        let s = self.state;
        if let Err(e) = self
            .endpoint
            .write_all_attributes(s.main, &s.current, &s.target)
        {
            tracing::warn!(error = %e, "failed to publish closure state");
        }
    }

    /// Overall operating state.
    pub fn main_state(&self) -> MainState {
        self.state.main
    }

    /// Current position, speed, and latch.
    pub fn current_state(&self) -> CurrentState {
        self.state.current
    }

    /// Requested position, speed, and latch.
    pub fn target_state(&self) -> TargetState {
        self.state.target
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> ClosureState {
        self.state
    }

    /// Position mapping in use.
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    /// Speed table in use.
    pub fn speeds(&self) -> &SpeedTable {
        &self.speeds
    }

    /// The driven device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the driven device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The publication endpoint.
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Mutable access to the publication endpoint.
    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }
}

impl<D: PhysicalDevice, E: ClosureEndpoint> MotionObserver for ClosureManager<D, E> {
    fn on_movement_stopped(&mut self, position: u16, reason: StopReason) {
        self.handle_closure_callback(MainState::Stopped, position);
        match reason {
            StopReason::Arrived => self.endpoint.on_move_to_complete(),
            StopReason::Commanded => self.endpoint.on_stop_motion_complete(),
        }
    }

    fn on_movement_update(&mut self, position: u16, time_left_ms: u32, just_started: bool) {
        tracing::debug!(position, time_left_ms, just_started, "movement update");
    }
}

impl<D: PhysicalDevice, E: ClosureEndpoint> ClosureControlDelegate for ClosureManager<D, E> {
    fn handle_calibrate(&mut self) -> Result<(), CommandError> {
        self.on_calibrate_command()
    }

    fn handle_move_to(
        &mut self,
        position: Option<TargetPosition>,
        latch: Option<bool>,
        speed: Option<SpeedClass>,
    ) -> Result<(), CommandError> {
        self.on_move_to_command(position, latch, speed)
    }

    fn handle_stop(&mut self) -> Result<(), CommandError> {
        self.on_stop_command();
        Ok(())
    }

    fn calibration_countdown_secs(&self) -> u32 {
        self.countdown.calibration_secs
    }

    fn moving_countdown_secs(&self) -> u32 {
        self.countdown.moving_secs
    }

    fn waiting_for_motion_countdown_secs(&self) -> u32 {
        self.countdown.waiting_for_motion_secs
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::MotionEmulator;
    use crate::error::MotionError;
    use crate::hal::{ManualScheduler, MockEndpoint, MockIndicator};
    use crate::mapping::PositionClass;
    use crate::MotionEvent;

    type Manager = ClosureManager<MotionEmulator<MockIndicator, ManualScheduler>, MockEndpoint>;

    fn manager() -> Manager {
        let config = ClosureConfig::default();
        let device =
            MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
        let mut m = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
        m.init();
        m
    }

    fn run_to_rest(m: &mut Manager) -> usize {
        let mut ticks = 0;
        while let Some(tick) = m.device_mut().scheduler_mut().take() {
            m.on_tick(tick);
            ticks += 1;
        }
        ticks
    }

    /// Device that refuses every move.
    struct StuckDevice;

    impl PhysicalDevice for StuckDevice {
        fn init(&mut self) -> Result<(), MotionError> {
            Ok(())
        }
        fn move_to(&mut self, _position: u16, rate: u16) -> Result<MotionEvent, MotionError> {
            Err(MotionError::StepTooSmall {
                rate,
                interval_ms: 100,
            })
        }
        fn stop(&mut self) -> MotionEvent {
            MotionEvent::Stopped {
                position: 0,
                reason: StopReason::Commanded,
            }
        }
        fn on_tick(&mut self, _tick: Tick) -> Option<MotionEvent> {
            None
        }
        fn position(&self) -> u16 {
            0
        }
        fn is_running(&self) -> bool {
            false
        }
    }

    // === Initialization ===

    #[test]
    fn init_publishes_power_on_state() {
        let m = manager();
        assert_eq!(m.endpoint().writes.len(), 1);
        let first = m.endpoint().writes[0];
        assert_eq!(first.main, MainState::Stopped);
        assert_eq!(first.current.position, Some(PositionClass::FullyOpened));
        assert_eq!(first.current.speed, Some(SpeedClass::Auto));
        assert_eq!(first.target.position, None);
    }

    #[test]
    fn init_publishes_despite_indicator_failure() {
        let config = ClosureConfig::default();
        let mut indicator = MockIndicator::new();
        indicator.fail = true;
        let device = MotionEmulator::new(indicator, ManualScheduler::new(), &config.motion);
        let mut m = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
        m.init();

        assert_eq!(m.endpoint().writes.len(), 1);
        assert_eq!(m.current_state().position, Some(PositionClass::FullyOpened));
        assert_eq!(m.main_state(), MainState::Stopped);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ClosureConfig::default().with_positions(crate::mapping::PositionTable {
            ventilation: 5000,
            ..Default::default()
        });
        let device =
            MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
        assert!(matches!(
            ClosureManager::new(device, MockEndpoint::new(), &config),
            Err(ConfigError::DuplicatePosition { .. })
        ));
    }

    // === Commands ===

    #[test]
    fn calibrate_is_unsupported() {
        let mut m = manager();
        assert_eq!(m.on_calibrate_command(), Err(CommandError::Unsupported));
        assert_eq!(m.dispatch(ClosureCommand::Calibrate), Status::UnsupportedCommand);
        assert_eq!(m.endpoint().writes.len(), 1);
    }

    #[test]
    fn move_to_without_position_changes_nothing() {
        let mut m = manager();
        let before = m.snapshot();
        assert_eq!(
            m.on_move_to_command(None, Some(true), Some(SpeedClass::High)),
            Err(CommandError::MissingPosition)
        );
        assert_eq!(m.snapshot(), before);
        assert!(!m.device().is_running());
        assert_eq!(m.endpoint().writes.len(), 1);
    }

    #[test]
    fn move_to_sets_moving_and_target() {
        let mut m = manager();
        m.on_move_to_command(Some(TargetPosition::Pedestrian), Some(true), Some(SpeedClass::Low))
            .unwrap();

        assert_eq!(m.main_state(), MainState::Moving);
        assert_eq!(
            m.target_state(),
            TargetState {
                position: Some(TargetPosition::Pedestrian),
                latch: Some(true),
                speed: Some(SpeedClass::Low),
            }
        );
        assert_eq!(m.device().state().target_position, 5000);
        assert_eq!(m.device().state().speed, 1000);
        assert_eq!(m.endpoint().writes.last().map(|s| s.main), Some(MainState::Moving));
    }

    #[test]
    fn move_to_falls_back_to_current_speed() {
        let mut m = manager();
        m.on_move_to_command(Some(TargetPosition::Signature), None, Some(SpeedClass::High))
            .unwrap();
        run_to_rest(&mut m);
        assert_eq!(m.current_state().speed, Some(SpeedClass::High));

        m.on_move_to_command(Some(TargetPosition::FullyOpen), None, None)
            .unwrap();
        assert_eq!(m.target_state().speed, Some(SpeedClass::High));
        assert_eq!(m.device().state().speed, 5000);
    }

    #[test]
    fn device_rejection_leaves_state_untouched() {
        let config = ClosureConfig::default();
        let mut m = ClosureManager::new(StuckDevice, MockEndpoint::new(), &config).unwrap();
        m.init();
        let before = m.snapshot();

        let result = m.on_move_to_command(Some(TargetPosition::FullyClosed), None, None);
        assert!(matches!(result, Err(CommandError::Device(_))));
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.endpoint().writes.len(), 1);
    }

    // === Completion ===

    #[test]
    fn arrival_classifies_and_clears_target() {
        let mut m = manager();
        m.on_move_to_command(Some(TargetPosition::FullyClosed), None, Some(SpeedClass::High))
            .unwrap();
        assert_eq!(run_to_rest(&mut m), 20);

        let state = m.snapshot();
        assert_eq!(state.main, MainState::Stopped);
        assert_eq!(state.current.position, Some(PositionClass::FullyClosed));
        assert_eq!(state.current.speed, Some(SpeedClass::High));
        assert_eq!(state.target.position, None);
        assert!(state.is_consistent());
        assert_eq!(m.endpoint().move_to_complete, 1);
        assert_eq!(m.endpoint().stop_motion_complete, 0);
    }

    #[test]
    fn stop_mid_travel_reports_partially_opened() {
        let mut m = manager();
        m.on_move_to_command(Some(TargetPosition::FullyClosed), None, Some(SpeedClass::High))
            .unwrap();
        for _ in 0..3 {
            let tick = m.device_mut().scheduler_mut().take().unwrap();
            m.on_tick(tick);
        }

        m.on_stop_command();
        assert_eq!(m.main_state(), MainState::Stopped);
        assert_eq!(m.current_state().position, Some(PositionClass::PartiallyOpened));
        assert_eq!(m.target_state().position, None);
        assert_eq!(m.endpoint().stop_motion_complete, 1);
        assert!(!m.device().scheduler().is_armed());
    }

    #[test]
    fn stop_when_idle_is_harmless() {
        let mut m = manager();
        let before = m.snapshot();
        assert_eq!(m.dispatch(ClosureCommand::Stop), Status::Success);
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.endpoint().writes.len(), 2);
    }

    #[test]
    fn callback_ignores_non_stopped_states() {
        let mut m = manager();
        let before = m.snapshot();
        let writes = m.endpoint().writes.len();

        for state in [
            MainState::Moving,
            MainState::WaitingForMotion,
            MainState::Calibrating,
            MainState::Error,
        ] {
            m.handle_closure_callback(state, 1234);
        }
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.endpoint().writes.len(), writes);
    }

    #[test]
    fn publish_failure_keeps_state() {
        let mut m = manager();
        m.endpoint_mut().fail_writes = true;
        m.on_move_to_command(Some(TargetPosition::Ventilation), None, None)
            .unwrap();
        assert_eq!(m.main_state(), MainState::Moving);
        assert_eq!(m.endpoint().writes.len(), 1);
    }

    #[test]
    fn countdowns_follow_config() {
        let config = ClosureConfig::default().with_countdown(CountdownConfig {
            calibration_secs: 5,
            moving_secs: 10,
            waiting_for_motion_secs: 15,
        });
        let device =
            MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
        let m = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
        assert!(m.is_ready_to_move());
        assert_eq!(m.calibration_countdown_secs(), 5);
        assert_eq!(m.moving_countdown_secs(), 10);
        assert_eq!(m.waiting_for_motion_countdown_secs(), 15);
    }
}
