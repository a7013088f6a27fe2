//! Desktop closure simulator.
//!
//! Runs the closure on a tokio current-thread runtime, with the position
//! indicator printed through `tracing` and the attributes kept in a shared
//! store that the main task polls for changes.
//!
//! # Usage
//!
//! ```bash
//! # Default demo: close at high speed, then open to ventilation
//! cargo run --features sim --bin closure_sim
//!
//! # Single move
//! cargo run --features sim --bin closure_sim -- pedestrian low
//!
//! # More detail
//! RUST_LOG=closure_emulator=debug cargo run --features sim --bin closure_sim
//! ```

use std::time::Duration;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use closure_emulator::services::{ClosureHandle, ClosureRuntime, SharedAttributes};
use closure_emulator::traits::PositionIndicator;
use closure_emulator::{ClosureConfig, ClosureState, MainState, SpeedClass, Status, TargetPosition};

/// How often the main task polls the attribute store.
const POLL_INTERVAL_MS: u64 = 50;

/// Give up waiting for a move after this long.
const MOVE_TIMEOUT_MS: u64 = 30_000;

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "closure_emulator=info";

/// Indicator that logs its level.
struct LogIndicator;

impl PositionIndicator for LogIndicator {
    type Error = core::convert::Infallible;

    fn set_level(&mut self, level: u8) -> Result<(), Self::Error> {
        tracing::debug!(level, "indicator");
        Ok(())
    }
}

fn print_state(state: &ClosureState) {
    println!(
        "  main={:<8} current={:?} speed={:?} target={:?}",
        state.main.as_str(),
        state.current.position,
        state.current.speed,
        state.target.position,
    );
}

/// Issue a move and print every published change until the closure stops.
async fn run_move(
    handle: &ClosureHandle,
    attrs: &SharedAttributes,
    target: TargetPosition,
    speed: Option<SpeedClass>,
) -> anyhow::Result<ClosureState> {
    println!(
        "move-to {} at {}",
        target.as_str(),
        speed.map_or("current speed", |s| s.as_str())
    );

    let seen = attrs.version()?;
    let status = handle.move_to(Some(target), None, speed).await?;
    if status != Status::Success {
        bail!("move-to {} was not accepted: {:?}", target.as_str(), status);
    }

    tokio::time::timeout(
        Duration::from_millis(MOVE_TIMEOUT_MS),
        wait_for_stop(attrs, seen),
    )
    .await
    .context("closure did not stop in time")?
}

/// Print published changes after `seen` until the closure reports Stopped.
async fn wait_for_stop(attrs: &SharedAttributes, mut seen: u64) -> anyhow::Result<ClosureState> {
    loop {
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        if let Some((version, state)) = attrs.changed_since(seen)? {
            seen = version;
            print_state(&state);
            if state.main == MainState::Stopped {
                return Ok(state);
            }
        }
    }
}

fn parse_args() -> anyhow::Result<Option<(TargetPosition, Option<SpeedClass>)>> {
    let mut args = std::env::args().skip(1);
    let Some(target) = args.next() else {
        return Ok(None);
    };
    let target = TargetPosition::from_text(&target)
        .with_context(|| format!("unknown target position '{target}'"))?;
    let speed = match args.next() {
        Some(s) => Some(
            SpeedClass::from_text(&s).with_context(|| format!("unknown speed '{s}'"))?,
        ),
        None => None,
    };
    Ok(Some((target, speed)))
}

/// Log filter from the `RUST_LOG` value, falling back to [`DEFAULT_FILTER`].
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .init();

    let request = parse_args()?;

    let config = ClosureConfig::default();
    config.validate()?;
    println!("{} (endpoint {})", config.device.name, config.device.endpoint_id);

    let attrs = SharedAttributes::new();
    let (runtime, handle) = ClosureRuntime::new(LogIndicator, attrs.clone(), &config)?;
    let task = tokio::spawn(runtime.run());

    match request {
        Some((target, speed)) => {
            run_move(&handle, &attrs, target, speed).await?;
        }
        None => {
            let closed =
                run_move(&handle, &attrs, TargetPosition::FullyClosed, Some(SpeedClass::High))
                    .await?;
            print_state(&closed);
            let vent = run_move(&handle, &attrs, TargetPosition::Ventilation, None).await?;
            print_state(&vent);
        }
    }

    handle.shutdown().await?;
    let manager = task.await?;
    println!("final: {}", manager.main_state().as_str());
    Ok(())
}
