//! Shared types used across the ROX-2X firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time and provide type safety throughout the codebase.

use core::fmt;

use crate::config::{MAX_TUNE_FREQ_HZ, MIN_TUNE_FREQ_HZ};

/// Frequency in Hertz with validation
///
/// Represents a frequency inside the tunable 2 m band
/// (`MIN_TUNE_FREQ_HZ..=MAX_TUNE_FREQ_HZ`, both ends inclusive).
/// The frequency is stored in Hz for precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Minimum supported frequency
    pub const MIN_HZ: u32 = MIN_TUNE_FREQ_HZ;

    /// Maximum supported frequency
    pub const MAX_HZ: u32 = MAX_TUNE_FREQ_HZ;

    /// Create a new Frequency from Hz, returns None if out of range
    #[must_use]
    pub const fn from_hz(hz: u32) -> Option<Self> {
        if Self::is_valid(hz) {
            Some(Self(hz))
        } else {
            None
        }
    }

    /// Create a new Frequency from a wide value (e.g. synthesizer arithmetic)
    #[must_use]
    pub fn from_hz_u64(hz: u64) -> Option<Self> {
        u32::try_from(hz).ok().and_then(Self::from_hz)
    }

    /// Check whether a raw value lies inside the tunable band
    #[must_use]
    pub const fn is_valid(hz: u32) -> bool {
        hz >= Self::MIN_HZ && hz <= Self::MAX_HZ
    }

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self.0
    }

    /// Get the frequency in kHz (truncated)
    #[must_use]
    pub const fn as_khz(self) -> u32 {
        self.0 / 1000
    }
}

impl TryFrom<u32> for Frequency {
    type Error = u32;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        Self::from_hz(hz).ok_or(hz)
    }
}

impl From<Frequency> for u32 {
    fn from(freq: Frequency) -> Self {
        freq.0
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} Hz)", self.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 145.000.000 style, as shown on the front panel
        let mhz = self.0 / 1_000_000;
        let khz = (self.0 / 1000) % 1000;
        let hz = self.0 % 1000;
        write!(f, "{mhz}.{khz:03}.{hz:03}")
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}
