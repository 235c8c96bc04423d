//! Byte-addressable persistent medium
//!
//! The channel memory sits on an EEPROM-like region: reads and writes go to
//! a working copy, and nothing survives a power cycle until `commit`.

use core::fmt;

/// EEPROM-style persistent storage
///
/// Offsets are relative to the start of the region handed out by
/// [`begin`](Self::begin).
pub trait PersistentMedium {
    /// Error raised by the underlying storage
    type Error;

    /// Prepare a region of `len` bytes for access
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be mapped or loaded.
    fn begin(&mut self, len: usize) -> Result<(), Self::Error>;

    /// Read `bytes.len()` bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the region.
    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<(), Self::Error>;

    /// Stage `bytes` at `offset`; not durable until [`commit`](Self::commit)
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the region.
    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Make all staged writes durable in one flush
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn commit(&mut self) -> Result<(), Self::Error>;

    /// Read a little-endian `u32` at `offset`
    ///
    /// # Errors
    ///
    /// Propagates [`read`](Self::read) failures.
    fn get_u32(&mut self, offset: usize) -> Result<u32, Self::Error> {
        let mut word = [0u8; 4];
        self.read(offset, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Stage a little-endian `u32` at `offset`
    ///
    /// # Errors
    ///
    /// Propagates [`write`](Self::write) failures.
    fn put_u32(&mut self, offset: usize, value: u32) -> Result<(), Self::Error> {
        self.write(offset, &value.to_le_bytes())
    }
}

/// Errors from the in-memory medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumError {
    /// Accessed before `begin`
    NotInitialized,
    /// Range lies outside the initialized region
    OutOfBounds,
    /// Requested region is larger than the backing store
    TooLarge,
}

impl fmt::Display for MediumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "medium not initialized"),
            Self::OutOfBounds => write!(f, "access outside medium region"),
            Self::TooLarge => write!(f, "region exceeds medium capacity"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for MediumError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NotInitialized => defmt::write!(f, "NotInitialized"),
            Self::OutOfBounds => defmt::write!(f, "OutOfBounds"),
            Self::TooLarge => defmt::write!(f, "TooLarge"),
        }
    }
}

/// RAM-backed medium with explicit commit
///
/// Keeps a committed image (what would survive power loss) and a staged copy.
/// Erased cells read `0xFF`, like blank EEPROM or flash.
#[derive(Clone, Debug)]
pub struct RamMedium<const N: usize> {
    committed: [u8; N],
    staged: [u8; N],
    len: Option<usize>,
    commits: u32,
}

impl<const N: usize> RamMedium<N> {
    /// Erased value of a storage cell
    pub const ERASED: u8 = 0xFF;

    /// Create a blank (fully erased) medium
    #[must_use]
    pub const fn new() -> Self {
        Self {
            committed: [Self::ERASED; N],
            staged: [Self::ERASED; N],
            len: None,
            commits: 0,
        }
    }

    /// Create a medium whose committed image starts with `image`
    ///
    /// Bytes past the end of `image` stay erased; excess input is ignored.
    #[must_use]
    pub fn with_contents(image: &[u8]) -> Self {
        let mut medium = Self::new();
        let n = image.len().min(N);
        medium.committed[..n].copy_from_slice(&image[..n]);
        medium.staged = medium.committed;
        medium
    }

    /// Simulate a power cycle: drop staged writes and require a new `begin`
    pub fn reload(&mut self) {
        self.staged = self.committed;
        self.len = None;
    }

    /// The durable contents
    #[must_use]
    pub fn committed(&self) -> &[u8; N] {
        &self.committed
    }

    /// Number of completed commits
    #[must_use]
    pub const fn commit_count(&self) -> u32 {
        self.commits
    }

    fn range(&self, offset: usize, count: usize) -> Result<core::ops::Range<usize>, MediumError> {
        let len = self.len.ok_or(MediumError::NotInitialized)?;
        let end = offset.checked_add(count).ok_or(MediumError::OutOfBounds)?;
        if end > len {
            return Err(MediumError::OutOfBounds);
        }
        Ok(offset..end)
    }
}

impl<const N: usize> Default for RamMedium<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PersistentMedium for RamMedium<N> {
    type Error = MediumError;

    fn begin(&mut self, len: usize) -> Result<(), Self::Error> {
        if len > N {
            return Err(MediumError::TooLarge);
        }
        self.staged = self.committed;
        self.len = Some(len);
        Ok(())
    }

    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.staged[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        self.staged[range].copy_from_slice(bytes);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        if self.len.is_none() {
            return Err(MediumError::NotInitialized);
        }
        self.committed = self.staged;
        self.commits += 1;
        Ok(())
    }
}
