//! # closure-emulator
//!
//! A motorized closure (garage door, gate, window) emulated in software:
//! named positions are commanded, travel happens gradually on a periodic
//! tick, and the externally visible state is published after every change.
//!
//! ## Features
//!
//! - **Position mapping**: named targets to physical travel units and back
//! - **Gradual motion**: fixed-interval interpolation with a PWM-style position indicator
//! - **State coordination**: Stopped/Moving state machine with publication and completion signals
//! - **Stale-tick safety**: every trajectory carries a generation, superseded ticks are dropped
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and endpoint abstractions
//! - `mapping` - Position and speed tables
//! - `emulator` - The physical motion emulator
//! - `manager` - Coordinator that ties commands, motion, and state together
//! - `hal` - Concrete implementations (mocks for testing, embedded-hal PWM indicator)
//! - `services` - Shared attribute store and the tokio runtime
//!
//! ## Example
//!
//! ```rust
//! use closure_emulator::{
//!     ClosureCommand, ClosureManager, MainState, MotionEmulator, PositionClass, SpeedClass,
//!     Status, TargetPosition,
//!     config::ClosureConfig,
//!     hal::{ManualScheduler, MockEndpoint, MockIndicator},
//! };
//!
//! let config = ClosureConfig::default();
//! let device = MotionEmulator::new(MockIndicator::new(), ManualScheduler::new(), &config.motion);
//! let mut closure = ClosureManager::new(device, MockEndpoint::new(), &config).unwrap();
//! closure.init();
//!
//! let cmd = ClosureCommand::move_to(TargetPosition::FullyClosed).with_speed(SpeedClass::High);
//! assert_eq!(closure.dispatch(cmd), Status::Success);
//!
//! // Drive the ticks by hand
//! while let Some(tick) = closure.device_mut().scheduler_mut().take() {
//!     closure.on_tick(tick);
//! }
//! assert_eq!(closure.main_state(), MainState::Stopped);
//! assert_eq!(closure.current_state().position, Some(PositionClass::FullyClosed));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Command types and protocol status codes.
pub mod commands;
/// Shared configuration for the closure.
pub mod config;
/// Physical motion emulator.
pub mod emulator;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Closure coordinator owning the published state.
pub mod manager;
/// Named position and speed tables.
pub mod mapping;
/// Externally visible closure state.
pub mod state;
/// Core traits for the physical and protocol sides.
pub mod traits;

/// Shared attribute store and tokio runtime (requires `std`).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use commands::{ClosureCommand, Status};
pub use emulator::{MotionEmulator, MotionState};
pub use error::{CommandError, ConfigError, EndpointError, MotionError, RuntimeError};
pub use manager::ClosureManager;
pub use mapping::{PositionClass, PositionMap, SpeedClass, SpeedTable, TargetPosition};
pub use state::{ClosureState, CurrentState, MainState, TargetState};
pub use traits::{
    // Protocol side
    ClosureControlDelegate,
    ClosureEndpoint,
    // Physical side
    MotionEvent,
    MotionObserver,
    PhysicalDevice,
    PositionIndicator,
    StopReason,
    Tick,
    TickScheduler,
};

// Config re-exports
pub use config::{ClosureConfig, CountdownConfig, DeviceConfig, MotionConfig};
