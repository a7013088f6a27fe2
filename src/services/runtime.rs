//! Tokio runtime hosting a single closure.
//!
//! [`ClosureRuntime`] owns the [`ClosureManager`] and processes one
//! [`ClosureEvent`] at a time, so commands and ticks never interleave.
//! Callers hold a cloneable [`ClosureHandle`]. Ticks are posted back to the
//! same event queue by [`TokioTickScheduler`].
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use closure_emulator::config::ClosureConfig;
//! use closure_emulator::hal::MockIndicator;
//! use closure_emulator::services::{ClosureRuntime, SharedAttributes};
//! use closure_emulator::{Status, TargetPosition};
//!
//! let attrs = SharedAttributes::new();
//! let (runtime, handle) =
//!     ClosureRuntime::new(MockIndicator::new(), attrs.clone(), &ClosureConfig::default()).unwrap();
//! let task = tokio::spawn(runtime.run());
//!
//! let status = handle.move_to(Some(TargetPosition::Pedestrian), None, None).await.unwrap();
//! assert_eq!(status, Status::Success);
//!
//! handle.shutdown().await.unwrap();
//! task.await.unwrap();
//! # }
//! ```

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::commands::{ClosureCommand, Status};
use crate::config::ClosureConfig;
use crate::emulator::MotionEmulator;
use crate::error::{ConfigError, RuntimeError};
use crate::manager::ClosureManager;
use crate::mapping::{SpeedClass, TargetPosition};
use crate::traits::{ClosureEndpoint, PhysicalDevice, PositionIndicator, Tick, TickScheduler};

/// Message processed by the closure task.
#[derive(Debug)]
pub enum ClosureEvent {
    /// A command and the channel its status is returned on.
    Command(ClosureCommand, oneshot::Sender<Status>),
    /// A scheduled interpolation step.
    Tick(Tick),
    /// Stop processing and return the manager.
    Shutdown,
}

// ============================================================================
// Tick Scheduler
// ============================================================================

/// Scheduler that posts ticks onto the closure event queue.
///
/// Each schedule spawns a `tokio::time::sleep` task and aborts the previous
/// one. It holds only a weak sender, so it does not keep the queue open once
/// every [`ClosureHandle`] is gone.
#[derive(Debug)]
pub struct TokioTickScheduler {
    events: mpsc::WeakUnboundedSender<ClosureEvent>,
    pending: Option<JoinHandle<()>>,
}

impl TokioTickScheduler {
    /// Create a scheduler feeding `events`.
    pub fn new(events: &mpsc::UnboundedSender<ClosureEvent>) -> Self {
        Self {
            events: events.downgrade(),
            pending: None,
        }
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule(&mut self, tick: Tick, after_ms: u32) {
        self.cancel();
        let events = self.events.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(u64::from(after_ms))).await;
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(ClosureEvent::Tick(tick));
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTickScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Device type driven by the runtime.
pub type RuntimeDevice<I> = MotionEmulator<I, TokioTickScheduler>;

// ============================================================================
// Runtime
// ============================================================================

/// Owner of the closure, driven by its event queue.
pub struct ClosureRuntime<I: PositionIndicator, E: ClosureEndpoint> {
    manager: ClosureManager<RuntimeDevice<I>, E>,
    events: mpsc::UnboundedReceiver<ClosureEvent>,
}

impl<I: PositionIndicator, E: ClosureEndpoint> ClosureRuntime<I, E> {
    /// Build the closure and the handle that controls it.
    pub fn new(
        indicator: I,
        endpoint: E,
        config: &ClosureConfig,
    ) -> Result<(Self, ClosureHandle), ConfigError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let device = MotionEmulator::new(indicator, TokioTickScheduler::new(&tx), &config.motion);
        let manager = ClosureManager::new(device, endpoint, config)?;
        Ok((
            Self {
                manager,
                events: rx,
            },
            ClosureHandle { events: tx },
        ))
    }

    /// The hosted manager.
    pub fn manager(&self) -> &ClosureManager<RuntimeDevice<I>, E> {
        &self.manager
    }

    /// Initialize the closure and process events until shutdown or until
    /// every handle is dropped. Motion still in progress is stopped on exit.
    /// Returns the manager for inspection.
    pub async fn run(mut self) -> ClosureManager<RuntimeDevice<I>, E> {
        self.manager.init();
        tracing::info!("closure runtime started");

        while let Some(event) = self.events.recv().await {
            match event {
                ClosureEvent::Command(command, reply) => {
                    let status = self.manager.dispatch(command);
                    if reply.send(status).is_err() {
                        tracing::debug!(command = command.name(), "caller dropped reply");
                    }
                }
                ClosureEvent::Tick(tick) => self.manager.on_tick(tick),
                ClosureEvent::Shutdown => break,
            }
        }

        if self.manager.device().is_running() {
            self.manager.on_stop_command();
        }
        tracing::info!("closure runtime stopped");
        self.manager
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable control handle for a running closure.
#[derive(Clone, Debug)]
pub struct ClosureHandle {
    events: mpsc::UnboundedSender<ClosureEvent>,
}

impl ClosureHandle {
    /// Send a command and wait for its status.
    pub async fn command(&self, command: ClosureCommand) -> Result<Status, RuntimeError> {
        let (reply, status) = oneshot::channel();
        self.events
            .send(ClosureEvent::Command(command, reply))
            .map_err(|_| RuntimeError::Closed)?;
        status.await.map_err(|_| RuntimeError::Closed)
    }

    /// Request calibration.
    pub async fn calibrate(&self) -> Result<Status, RuntimeError> {
        self.command(ClosureCommand::Calibrate).await
    }

    /// Request a move to a named position.
    pub async fn move_to(
        &self,
        position: Option<TargetPosition>,
        latch: Option<bool>,
        speed: Option<SpeedClass>,
    ) -> Result<Status, RuntimeError> {
        self.command(ClosureCommand::MoveTo {
            position,
            latch,
            speed,
        })
        .await
    }

    /// Request a stop.
    pub async fn stop(&self) -> Result<Status, RuntimeError> {
        self.command(ClosureCommand::Stop).await
    }

    /// Ask the closure task to exit.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.events
            .send(ClosureEvent::Shutdown)
            .map_err(|_| RuntimeError::Closed)
    }

    /// Whether the closure task is still accepting events.
    pub fn is_running(&self) -> bool {
        !self.events.is_closed()
    }
}
