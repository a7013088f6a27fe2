//! Integration tests for the closure coordinator and motion emulator

use closure_emulator::{
    config::ClosureConfig,
    hal::{ManualScheduler, MockEndpoint, MockIndicator},
    ClosureCommand, ClosureManager, MainState, MotionEmulator, PhysicalDevice, PositionClass,
    SpeedClass, Status, TargetPosition,
};

type Closure = ClosureManager<MotionEmulator<MockIndicator, ManualScheduler>, MockEndpoint>;

fn closure_with(config: ClosureConfig) -> Closure {
    let device = MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
    let mut closure = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
    closure.init();
    closure
}

fn closure() -> Closure {
    closure_with(ClosureConfig::default())
}

/// Fire pending ticks until none remain, returning how many fired.
fn run_to_rest(closure: &mut Closure) -> usize {
    let mut fired = 0;
    while let Some(tick) = closure.device_mut().scheduler_mut().take() {
        closure.on_tick(tick);
        fired += 1;
    }
    fired
}

fn fire(closure: &mut Closure, n: usize) {
    for _ in 0..n {
        let tick = closure.device_mut().scheduler_mut().take().unwrap();
        closure.on_tick(tick);
    }
}

#[test]
fn close_fully_at_high_speed() {
    let mut closure = closure();
    let cmd = ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::High);
    assert_eq!(closure.dispatch(cmd), Status::Success);
    assert_eq!(closure.main_state(), MainState::Moving);

    // 10000 units at 500 per tick
    assert_eq!(run_to_rest(&mut closure), 20);

    let state = closure.snapshot();
    assert_eq!(state.main, MainState::Stopped);
    assert_eq!(state.current.position, Some(PositionClass::FullyClosed));
    assert_eq!(state.current.speed, Some(SpeedClass::High));
    assert_eq!(state.target.position, None);
    assert_eq!(closure.device().position(), 10_000);
    assert_eq!(closure.device().indicator().level, 255);
}

#[test]
fn open_to_ventilation_travels_downward() {
    let mut closure = closure();
    closure.dispatch(ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::High));
    run_to_rest(&mut closure);

    let before = closure.device().indicator().history.len();
    assert_eq!(
        closure.dispatch(ClosureCommand::move_to(TargetPosition::Ventilation)),
        Status::Success
    );
    // Inherits High from the previous move: 2500 units at 500 per tick
    assert_eq!(run_to_rest(&mut closure), 5);

    let levels = &closure.device().indicator().history[before..];
    assert!(levels.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(closure.device().position(), 7500);
    assert_eq!(
        closure.current_state().position,
        Some(PositionClass::OpenedForVentilation)
    );
}

#[test]
fn every_named_position_is_reported_on_arrival() {
    let mut closure = closure();
    for target in TargetPosition::ALL {
        closure.dispatch(ClosureCommand::move_to(target).with_speed(SpeedClass::High));
        run_to_rest(&mut closure);
        assert_eq!(closure.current_state().position, Some(PositionClass::from(target)));
        assert_eq!(closure.main_state(), MainState::Stopped);
    }
}

#[test]
fn stop_mid_travel_is_partially_opened() {
    let mut closure = closure();
    closure.dispatch(ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::Low));
    fire(&mut closure, 7);

    assert_eq!(closure.dispatch(ClosureCommand::Stop), Status::Success);
    assert_eq!(closure.device().position(), 700);
    assert_eq!(closure.main_state(), MainState::Stopped);
    assert_eq!(
        closure.current_state().position,
        Some(PositionClass::PartiallyOpened)
    );
    assert_eq!(closure.endpoint().stop_motion_complete, 1);
    assert_eq!(closure.endpoint().move_to_complete, 0);
    assert_eq!(run_to_rest(&mut closure), 0);
}

#[test]
fn stop_after_arrival_reports_once() {
    let mut closure = closure();
    closure.dispatch(
        ClosureCommand::move_to(TargetPosition::Pedestrian).with_speed(SpeedClass::High),
    );
    run_to_rest(&mut closure);
    assert_eq!(closure.endpoint().move_to_complete, 1);
    let arrived = closure.snapshot();
    let writes = closure.endpoint().writes.len();

    assert_eq!(closure.dispatch(ClosureCommand::Stop), Status::Success);

    assert_eq!(closure.endpoint().stop_motion_complete, 1);
    assert_eq!(closure.endpoint().move_to_complete, 1);
    assert_eq!(closure.endpoint().writes.len(), writes + 1);
    assert_eq!(closure.snapshot(), arrived);
    assert_eq!(closure.device().position(), 5000);
    assert!(!closure.device().scheduler().is_armed());
}

#[test]
fn new_target_supersedes_move_in_progress() {
    let mut closure = closure();
    closure.dispatch(ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::High));
    fire(&mut closure, 4);

    closure.dispatch(ClosureCommand::move_to(TargetPosition::Signature).with_speed(SpeedClass::Low));
    assert_eq!(closure.target_state().position, Some(TargetPosition::Signature));

    // From 2000 to 2500 at 100 per tick
    assert_eq!(run_to_rest(&mut closure), 5);
    assert_eq!(
        closure.current_state().position,
        Some(PositionClass::OpenedAtSignature)
    );
    assert_eq!(closure.endpoint().move_to_complete, 1);
}

#[test]
fn publication_sequence_for_one_move() {
    let mut closure = closure();
    closure.dispatch(ClosureCommand::move_to(TargetPosition::Pedestrian).with_latch(true));
    run_to_rest(&mut closure);

    let mains: Vec<MainState> = closure.endpoint().writes.iter().map(|s| s.main).collect();
    assert_eq!(
        mains,
        [MainState::Stopped, MainState::Moving, MainState::Stopped]
    );
    let moving = closure.endpoint().writes[1];
    assert_eq!(moving.target.position, Some(TargetPosition::Pedestrian));
    assert_eq!(moving.target.latch, Some(true));
    assert!(closure.endpoint().writes.iter().all(|s| s.is_consistent()));
}

#[test]
fn auto_speed_is_medium_rate() {
    let mut closure = closure();
    closure.dispatch(ClosureCommand::move_to(TargetPosition::Pedestrian));
    // Default current speed is Auto: 2500 units/s -> 250 per tick
    assert_eq!(closure.device().state().speed, 2500);
    assert_eq!(run_to_rest(&mut closure), 20);
}

#[test]
fn calibrate_reports_unsupported_without_side_effects() {
    let mut closure = closure();
    let before = closure.snapshot();
    assert_eq!(
        closure.dispatch(ClosureCommand::Calibrate),
        Status::UnsupportedCommand
    );
    assert_eq!(closure.snapshot(), before);
    assert_eq!(closure.endpoint().calibrate_complete, 0);
}
