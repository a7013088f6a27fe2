//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `pwm`: Position indicator on an embedded-hal PWM channel (requires `embedded-hal` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod pwm;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use pwm::*;
