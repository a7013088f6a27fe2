//! Trait definitions for the physical side and the protocol side of the closure.
//!
//! # Submodules
//!
//! - `hardware`: position indicator, tick scheduling, physical device, motion events
//! - `endpoint`: command delegate and state publication
//!
//! The coordinator sits between the two: commands come in through
//! [`ClosureControlDelegate`], motion goes out through [`PhysicalDevice`],
//! and state is written back through [`ClosureEndpoint`].

pub mod endpoint;
pub mod hardware;

pub use endpoint::*;
pub use hardware::*;
