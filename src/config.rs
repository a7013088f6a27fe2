//! Closure configuration shared by the emulator, the coordinator, and the
//! demo binary.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::config::{ClosureConfig, DeviceConfig, MotionConfig};
//!
//! let config = ClosureConfig::default()
//!     .with_device(DeviceConfig::default().with_name("Garage"))
//!     .with_motion(MotionConfig::default().with_tick_interval_ms(50));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.motion.tick_interval_ms, 50);
//! ```

use heapless::String as HString;

use crate::error::ConfigError;
use crate::mapping::{PositionMap, PositionTable, SpeedTable, DEFAULT_MAX_TRAVEL};
use crate::traits::DEFAULT_COUNTDOWN_SECS;

/// Maximum length for names
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating on a char boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut end = s.len().min(MAX_SHORT_STRING);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut hs = ShortString::new();
    let _ = hs.push_str(&s[..end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete closure configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosureConfig {
    /// Device identification
    pub device: DeviceConfig,
    /// Motion emulation parameters
    pub motion: MotionConfig,
    /// Physical value of each named position
    pub positions: PositionTable,
    /// Travel rate of each speed class
    pub speeds: SpeedTable,
    /// Countdown times reported to the protocol layer
    pub countdown: CountdownConfig,
}

impl ClosureConfig {
    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Set motion configuration
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Set the position table
    pub fn with_positions(mut self, positions: PositionTable) -> Self {
        self.positions = positions;
        self
    }

    /// Set the speed table
    pub fn with_speeds(mut self, speeds: SpeedTable) -> Self {
        self.speeds = speeds;
        self
    }

    /// Set countdown configuration
    pub fn with_countdown(mut self, countdown: CountdownConfig) -> Self {
        self.countdown = countdown;
        self
    }

    /// Build the validated position map.
    pub fn position_map(&self) -> Result<PositionMap, ConfigError> {
        PositionMap::new(self.positions, self.motion.max_travel)
    }

    /// Check every section for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.position_map()?;
        self.speeds.validate()
    }
}

// ============================================================================
// Motion Config
// ============================================================================

/// Motion emulation parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Interval between interpolation ticks in milliseconds
    pub tick_interval_ms: u32,
    /// Physical travel range (0 = fully open)
    pub max_travel: u16,
    /// Position reported at power-on
    pub initial_position: u16,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_travel: DEFAULT_MAX_TRAVEL,
            initial_position: 0,
        }
    }
}

impl MotionConfig {
    /// Set the tick interval
    pub fn with_tick_interval_ms(mut self, ms: u32) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Set the travel range
    pub fn with_max_travel(mut self, max_travel: u16) -> Self {
        self.max_travel = max_travel;
        self
    }

    /// Set the power-on position (clamped to the travel range)
    pub fn with_initial_position(mut self, position: u16) -> Self {
        self.initial_position = position.min(self.max_travel);
        self
    }

    /// Reject zero interval or zero travel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.max_travel == 0 {
            return Err(ConfigError::ZeroMaxTravel);
        }
        Ok(())
    }
}

// ============================================================================
// Countdown Config
// ============================================================================

/// Countdown times in seconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountdownConfig {
    /// Reported while calibrating
    pub calibration_secs: u32,
    /// Reported while moving
    pub moving_secs: u32,
    /// Reported while waiting for motion
    pub waiting_for_motion_secs: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            calibration_secs: DEFAULT_COUNTDOWN_SECS,
            moving_secs: DEFAULT_COUNTDOWN_SECS,
            waiting_for_motion_secs: DEFAULT_COUNTDOWN_SECS,
        }
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Protocol endpoint hosting the closure
    pub endpoint_id: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("Closure.GarageDoor"),
            endpoint_id: 1,
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the endpoint ID
    pub fn with_endpoint_id(mut self, id: u16) -> Self {
        self.endpoint_id = id;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
