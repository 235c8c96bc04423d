//! Channel Memory
//!
//! Persists up to nine tuned frequencies as a flat list of 32-bit words.
//! The list is valid up to its first out-of-band word; everything after that
//! slot is ignored on recall.

pub mod medium;

use core::fmt;

use heapless::Vec;

use crate::config::{DEFAULT_FREQUENCIES_HZ, EMPTY_SLOT, FREQUENCY_SLOTS, MEDIUM_SIZE, SLOT_SIZE};
use crate::types::Frequency;

pub use medium::{MediumError, PersistentMedium, RamMedium};

/// Recalled channel list, always holding between one and nine frequencies
pub type FrequencyList = Vec<Frequency, FREQUENCY_SLOTS>;

/// Errors from channel memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError<E> {
    /// The persistent medium failed
    Medium(E),
}

impl<E> From<E> for StoreError<E> {
    fn from(error: E) -> Self {
        Self::Medium(error)
    }
}

impl<E: fmt::Debug> fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium(e) => write!(f, "persistent medium error: {e:?}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<E: defmt::Format> defmt::Format for StoreError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Medium(e) => defmt::write!(f, "persistent medium error: {}", e),
        }
    }
}

/// Byte offset of a channel slot (slot 0 is channel 1)
const fn slot_offset(slot: usize) -> usize {
    slot * SLOT_SIZE
}

/// Channel memory on top of a [`PersistentMedium`]
pub struct FrequencyStore<M> {
    medium: M,
}

impl<M: PersistentMedium> FrequencyStore<M> {
    /// Wrap a medium; call [`initialize_medium`](Self::initialize_medium) before use
    #[must_use]
    pub const fn new(medium: M) -> Self {
        Self { medium }
    }

    /// Map the channel memory region on the medium
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Medium`] if the region cannot be prepared.
    pub fn initialize_medium(&mut self) -> Result<(), StoreError<M::Error>> {
        self.medium.begin(MEDIUM_SIZE)?;
        Ok(())
    }

    /// Persist the leading run of in-band frequencies
    ///
    /// Slots are written in order until the first out-of-band or missing
    /// value, which is replaced by the empty-slot marker. Later slots keep
    /// whatever the medium already held. Values past the ninth are ignored.
    /// Everything is flushed with a single commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Medium`] if a write or the commit fails.
    pub fn store(&mut self, values: &[u32]) -> Result<(), StoreError<M::Error>> {
        for slot in 0..FREQUENCY_SLOTS {
            match values.get(slot).copied().and_then(Frequency::from_hz) {
                Some(freq) => self.medium.put_u32(slot_offset(slot), freq.as_hz())?,
                None => {
                    self.medium.put_u32(slot_offset(slot), EMPTY_SLOT)?;
                    break;
                }
            }
        }
        self.medium.commit()?;

        #[cfg(feature = "embedded")]
        defmt::debug!("channel memory committed");

        Ok(())
    }

    /// Read back the leading run of valid frequencies
    ///
    /// If not even the first slot holds a valid frequency, the two default
    /// channels are returned instead, so the list is never empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Medium`] if a read fails.
    pub fn recall(&mut self) -> Result<FrequencyList, StoreError<M::Error>> {
        let mut raw = [EMPTY_SLOT; FREQUENCY_SLOTS];
        for (slot, word) in raw.iter_mut().enumerate() {
            *word = self.medium.get_u32(slot_offset(slot))?;
            if Frequency::from_hz(*word).is_none() {
                break;
            }
        }

        let mut list: FrequencyList = raw.iter().copied().map_while(Frequency::from_hz).collect();

        if list.is_empty() {
            #[cfg(feature = "embedded")]
            defmt::warn!("channel memory empty, using default channels");

            list.extend(DEFAULT_FREQUENCIES_HZ.iter().copied().filter_map(Frequency::from_hz));
        }

        Ok(list)
    }

    /// Borrow the underlying medium
    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Release the underlying medium
    #[must_use]
    pub fn into_inner(self) -> M {
        self.medium
    }
}
