//! Services for hosting the closure outside a bare control loop.
//!
//! - `shared`: lock-protected attribute store readable from any thread (`std`)
//! - `runtime`: tokio task owning the closure, driven by a command/tick queue
//!   (`runtime` feature)
//!
//! # Shared State Pattern
//!
//! The runtime writes attributes into a [`SharedAttributes`]; any other
//! thread keeps a clone and reads snapshots:
//!
//! ```ignore
//! let attrs = SharedAttributes::new();
//! let (runtime, handle) = ClosureRuntime::new(indicator, attrs.clone(), &config)?;
//! tokio::spawn(runtime.run());
//!
//! handle.move_to(Some(TargetPosition::FullyClosed), None, None).await?;
//! let state = attrs.snapshot()?;
//! ```

pub mod shared;

#[cfg(feature = "runtime")]
pub mod runtime;

pub use shared::*;

#[cfg(feature = "runtime")]
pub use runtime::*;
