//! Mapping between named closure positions/speeds and physical travel units.
//!
//! Callers never deal in raw travel units. They request a [`TargetPosition`]
//! and a [`SpeedClass`]; the [`PositionMap`] and [`SpeedTable`] resolve those
//! into a physical target and a travel rate, and classify the exact physical
//! position back into a [`PositionClass`] once motion stops.
//!
//! # Example
//!
//! ```rust
//! use closure_emulator::mapping::{PositionClass, PositionMap, SpeedClass, SpeedTable, TargetPosition};
//!
//! let positions = PositionMap::default();
//! let speeds = SpeedTable::default();
//!
//! assert_eq!(positions.forward(TargetPosition::FullyClosed), 10_000);
//! assert_eq!(positions.classify(10_000), PositionClass::FullyClosed);
//! assert_eq!(positions.classify(1234), PositionClass::PartiallyOpened);
//! assert_eq!(speeds.rate(SpeedClass::High), 5000);
//! ```

use crate::error::ConfigError;

/// Default travel range: 0 is fully open, 10000 fully closed.
pub const DEFAULT_MAX_TRAVEL: u16 = 10_000;

/// Named position a caller can ask the closure to move to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetPosition {
    /// Fully closed.
    FullyClosed,
    /// Fully open.
    FullyOpen,
    /// Opened wide enough for a person to pass.
    Pedestrian,
    /// Opened a little for airflow.
    Ventilation,
    /// User-defined signature position.
    Signature,
}

impl TargetPosition {
    /// Every target, in mapping table order.
    pub const ALL: [TargetPosition; 5] = [
        TargetPosition::FullyClosed,
        TargetPosition::FullyOpen,
        TargetPosition::Pedestrian,
        TargetPosition::Ventilation,
        TargetPosition::Signature,
    ];

    /// Returns the target as a kebab-case string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TargetPosition::FullyClosed => "fully-closed",
            TargetPosition::FullyOpen => "fully-open",
            TargetPosition::Pedestrian => "pedestrian",
            TargetPosition::Ventilation => "ventilation",
            TargetPosition::Signature => "signature",
        }
    }

    /// Parse a target from text input.
    ///
    /// Accepts the [`as_str`](Self::as_str) names plus the short forms
    /// `"closed"`, `"close"`, `"open"`, `"vent"`. Input is trimmed and
    /// case-insensitive.
    ///
    /// ```
    /// use closure_emulator::TargetPosition;
    ///
    /// assert_eq!(TargetPosition::from_text("closed"), Some(TargetPosition::FullyClosed));
    /// assert_eq!(TargetPosition::from_text(" VENT "), Some(TargetPosition::Ventilation));
    /// assert_eq!(TargetPosition::from_text("halfway"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let matches = |names: &[&str]| names.iter().any(|n| s.eq_ignore_ascii_case(n));
        if matches(&["fully-closed", "closed", "close"]) {
            Some(TargetPosition::FullyClosed)
        } else if matches(&["fully-open", "open"]) {
            Some(TargetPosition::FullyOpen)
        } else if matches(&["pedestrian"]) {
            Some(TargetPosition::Pedestrian)
        } else if matches(&["ventilation", "vent"]) {
            Some(TargetPosition::Ventilation)
        } else if matches(&["signature"]) {
            Some(TargetPosition::Signature)
        } else {
            None
        }
    }
}

/// Position reported back once the closure stops.
///
/// [`PartiallyOpened`](Self::PartiallyOpened) is the catch-all for any
/// physical position that does not exactly match a named entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PositionClass {
    /// Fully closed.
    FullyClosed,
    /// Fully opened.
    FullyOpened,
    /// Somewhere between named positions.
    PartiallyOpened,
    /// At the pedestrian opening.
    OpenedForPedestrian,
    /// At the ventilation opening.
    OpenedForVentilation,
    /// At the signature position.
    OpenedAtSignature,
}

impl From<TargetPosition> for PositionClass {
    fn from(target: TargetPosition) -> Self {
        match target {
            TargetPosition::FullyClosed => PositionClass::FullyClosed,
            TargetPosition::FullyOpen => PositionClass::FullyOpened,
            TargetPosition::Pedestrian => PositionClass::OpenedForPedestrian,
            TargetPosition::Ventilation => PositionClass::OpenedForVentilation,
            TargetPosition::Signature => PositionClass::OpenedAtSignature,
        }
    }
}

/// Travel speed selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpeedClass {
    /// Slow travel.
    Low,
    /// Medium travel.
    Medium,
    /// Fast travel.
    High,
    /// Device chooses.
    #[default]
    Auto,
}

impl SpeedClass {
    /// Returns the speed as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpeedClass::Low => "low",
            SpeedClass::Medium => "medium",
            SpeedClass::High => "high",
            SpeedClass::Auto => "auto",
        }
    }

    /// Parse a speed from text input (trimmed, case-insensitive).
    ///
    /// ```
    /// use closure_emulator::SpeedClass;
    ///
    /// assert_eq!(SpeedClass::from_text("HIGH"), Some(SpeedClass::High));
    /// assert_eq!(SpeedClass::from_text("med"), Some(SpeedClass::Medium));
    /// assert_eq!(SpeedClass::from_text("warp"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let matches = |names: &[&str]| names.iter().any(|n| s.eq_ignore_ascii_case(n));
        if matches(&["low", "slow"]) {
            Some(SpeedClass::Low)
        } else if matches(&["medium", "med"]) {
            Some(SpeedClass::Medium)
        } else if matches(&["high", "fast"]) {
            Some(SpeedClass::High)
        } else if matches(&["auto"]) {
            Some(SpeedClass::Auto)
        } else {
            None
        }
    }
}

// ============================================================================
// Position table
// ============================================================================

/// Physical value of every named position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionTable {
    /// Fully closed.
    pub fully_closed: u16,
    /// Fully open.
    pub fully_open: u16,
    /// Pedestrian opening.
    pub pedestrian: u16,
    /// Ventilation opening.
    pub ventilation: u16,
    /// Signature position.
    pub signature: u16,
}

impl Default for PositionTable {
    fn default() -> Self {
        Self {
            fully_closed: DEFAULT_MAX_TRAVEL,
            fully_open: 0,
            pedestrian: 5000,
            ventilation: 7500,
            signature: 2500,
        }
    }
}

/// Validated lookup between named positions and physical travel units.
///
/// Deserialization goes through [`PositionMap::new`], so a stored map is
/// held to the same checks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPositionMap"))]
pub struct PositionMap {
    table: PositionTable,
    max_travel: u16,
}

/// Unchecked serialized form of a [`PositionMap`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPositionMap {
    table: PositionTable,
    max_travel: u16,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPositionMap> for PositionMap {
    type Error = ConfigError;

    fn try_from(raw: RawPositionMap) -> Result<Self, Self::Error> {
        Self::new(raw.table, raw.max_travel)
    }
}

impl Default for PositionMap {
    fn default() -> Self {
        Self {
            table: PositionTable::default(),
            max_travel: DEFAULT_MAX_TRAVEL,
        }
    }
}

impl PositionMap {
    /// Build a map, rejecting out-of-range and duplicate values.
    ///
    /// ```
    /// use closure_emulator::mapping::{PositionMap, PositionTable};
    /// use closure_emulator::ConfigError;
    ///
    /// let table = PositionTable { pedestrian: 0, ..PositionTable::default() };
    /// assert!(matches!(
    ///     PositionMap::new(table, 10_000),
    ///     Err(ConfigError::DuplicatePosition { value: 0, .. })
    /// ));
    /// ```
    pub fn new(table: PositionTable, max_travel: u16) -> Result<Self, ConfigError> {
        if max_travel == 0 {
            return Err(ConfigError::ZeroMaxTravel);
        }
        let map = Self { table, max_travel };
        let entries = map.entries();

        for (i, &(class, value)) in entries.iter().enumerate() {
            if value > max_travel {
                return Err(ConfigError::PositionOutOfRange {
                    class,
                    value,
                    max_travel,
                });
            }
            if let Some(&(first, _)) = entries[..i].iter().find(|(_, v)| *v == value) {
                return Err(ConfigError::DuplicatePosition {
                    first,
                    second: class,
                    value,
                });
            }
        }
        Ok(map)
    }

    /// Named entries in classification order.
    pub fn entries(&self) -> [(PositionClass, u16); 5] {
        let t = &self.table;
        [
            (PositionClass::FullyClosed, t.fully_closed),
            (PositionClass::FullyOpened, t.fully_open),
            (PositionClass::OpenedForPedestrian, t.pedestrian),
            (PositionClass::OpenedForVentilation, t.ventilation),
            (PositionClass::OpenedAtSignature, t.signature),
        ]
    }

    /// Physical value for a requested target.
    pub fn forward(&self, target: TargetPosition) -> u16 {
        let t = &self.table;
        match target {
            TargetPosition::FullyClosed => t.fully_closed,
            TargetPosition::FullyOpen => t.fully_open,
            TargetPosition::Pedestrian => t.pedestrian,
            TargetPosition::Ventilation => t.ventilation,
            TargetPosition::Signature => t.signature,
        }
    }

    /// Classify an exact physical position.
    ///
    /// The first entry whose value equals `position` wins; anything else is
    /// [`PositionClass::PartiallyOpened`].
    pub fn classify(&self, position: u16) -> PositionClass {
        self.entries()
            .iter()
            .find(|(_, value)| *value == position)
            .map(|(class, _)| *class)
            .unwrap_or(PositionClass::PartiallyOpened)
    }

    /// Upper bound of physical travel.
    pub fn max_travel(&self) -> u16 {
        self.max_travel
    }

    /// The underlying table.
    pub fn table(&self) -> &PositionTable {
        &self.table
    }
}

// ============================================================================
// Speed table
// ============================================================================

/// Travel rate (physical units per second) for each [`SpeedClass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedTable {
    low: u16,
    medium: u16,
    high: u16,
    auto: u16,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            low: 1000,
            medium: 2500,
            high: 5000,
            auto: 2500,
        }
    }
}

impl SpeedTable {
    /// Build a table; every rate must be positive.
    pub fn new(low: u16, medium: u16, high: u16, auto: u16) -> Result<Self, ConfigError> {
        let table = Self {
            low,
            medium,
            high,
            auto,
        };
        table.validate()?;
        Ok(table)
    }

    /// Reject zero rates (e.g. in a deserialized table).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if [self.low, self.medium, self.high, self.auto].contains(&0) {
            return Err(ConfigError::ZeroRate);
        }
        Ok(())
    }

    /// Travel rate for a speed class.
    pub fn rate(&self, speed: SpeedClass) -> u16 {
        match speed {
            SpeedClass::Low => self.low,
            SpeedClass::Medium => self.medium,
            SpeedClass::High => self.high,
            SpeedClass::Auto => self.auto,
        }
    }

    /// Slowest configured rate.
    pub fn min_rate(&self) -> u16 {
        self.low.min(self.medium).min(self.high).min(self.auto)
    }
}
