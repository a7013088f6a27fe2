//! Thread-safe attribute store for the published closure state.
//!
//! `SharedAttributes` is the [`ClosureEndpoint`] used when the closure runs on
//! its own task: the coordinator writes under the lock, and any other thread
//! reads a copy through [`SharedAttributes::snapshot`]. Clones share the same
//! store.
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::services::SharedAttributes;
//! use closure_emulator::traits::ClosureEndpoint;
//! use closure_emulator::{ClosureState, MainState};
//!
//! let attrs = SharedAttributes::new();
//! let reader = attrs.clone();
//!
//! let mut writer = attrs;
//! let state = ClosureState::default();
//! writer.write_all_attributes(MainState::Moving, &state.current, &state.target).unwrap();
//!
//! assert_eq!(reader.snapshot().unwrap().main, MainState::Moving);
//! ```

use std::sync::{Arc, Mutex};

use crate::error::EndpointError;
use crate::state::{ClosureState, CurrentState, MainState, TargetState};
use crate::traits::ClosureEndpoint;

#[derive(Debug, Default)]
struct Store {
    state: ClosureState,
    /// Incremented on every write.
    version: u64,
}

/// Shared, lock-protected copy of the closure attributes.
///
/// Uses `Mutex` rather than `RwLock`: writes arrive on every state change and
/// reads are brief copies.
#[derive(Clone, Debug, Default)]
pub struct SharedAttributes {
    store: Arc<Mutex<Store>>,
}

impl SharedAttributes {
    /// Create a store holding the power-on state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last published state.
    pub fn snapshot(&self) -> Result<ClosureState, EndpointError> {
        let store = self.store.lock().map_err(|_| EndpointError::LockPoisoned)?;
        Ok(store.state)
    }

    /// Number of writes so far.
    pub fn version(&self) -> Result<u64, EndpointError> {
        let store = self.store.lock().map_err(|_| EndpointError::LockPoisoned)?;
        Ok(store.version)
    }

    /// Returns the state and its version if anything was written after
    /// `seen`, `None` otherwise. Used to report only changes.
    ///
    /// ```rust
    /// use closure_emulator::services::SharedAttributes;
    /// use closure_emulator::traits::ClosureEndpoint;
    /// use closure_emulator::ClosureState;
    ///
    /// let mut attrs = SharedAttributes::new();
    /// assert!(attrs.changed_since(0).unwrap().is_none());
    ///
    /// let s = ClosureState::default();
    /// attrs.write_all_attributes(s.main, &s.current, &s.target).unwrap();
    /// let (version, _) = attrs.changed_since(0).unwrap().unwrap();
    /// assert_eq!(version, 1);
    /// assert!(attrs.changed_since(version).unwrap().is_none());
    /// ```
    pub fn changed_since(&self, seen: u64) -> Result<Option<(u64, ClosureState)>, EndpointError> {
        let store = self.store.lock().map_err(|_| EndpointError::LockPoisoned)?;
        if store.version > seen {
            Ok(Some((store.version, store.state)))
        } else {
            Ok(None)
        }
    }
}

impl ClosureEndpoint for SharedAttributes {
    type Error = EndpointError;

    fn write_all_attributes(
        &mut self,
        main: MainState,
        current: &CurrentState,
        target: &TargetState,
    ) -> Result<(), Self::Error> {
        let mut store = self.store.lock().map_err(|_| EndpointError::LockPoisoned)?;
        store.state = ClosureState {
            main,
            current: *current,
            target: *target,
        };
        store.version += 1;
        Ok(())
    }
}
