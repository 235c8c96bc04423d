//! Flash-backed Persistent Medium
//!
//! Emulates a small EEPROM in the last flash page. The page is mirrored into
//! RAM on `begin`; `commit` erases the page and programs the mirror back.

use embassy_stm32::flash::{Blocking, Error as FlashError, Flash};

use crate::config::{flash, MEDIUM_SIZE};
use crate::storage::PersistentMedium;

/// Errors from the flash medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashMediumError {
    /// Flash controller reported an error
    Flash(FlashError),
    /// Accessed before `begin`
    NotInitialized,
    /// Range lies outside the mapped region
    OutOfBounds,
}

impl From<FlashError> for FlashMediumError {
    fn from(error: FlashError) -> Self {
        Self::Flash(error)
    }
}

impl defmt::Format for FlashMediumError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Flash(e) => defmt::write!(f, "flash error: {}", e),
            Self::NotInitialized => defmt::write!(f, "NotInitialized"),
            Self::OutOfBounds => defmt::write!(f, "OutOfBounds"),
        }
    }
}

/// Channel memory page in internal flash
pub struct FlashMedium<'d> {
    flash: Flash<'d, Blocking>,
    mirror: [u8; MEDIUM_SIZE],
    len: Option<usize>,
}

impl<'d> FlashMedium<'d> {
    /// Wrap the blocking flash driver
    #[must_use]
    pub fn new(flash: Flash<'d, Blocking>) -> Self {
        Self {
            flash,
            mirror: [0xFF; MEDIUM_SIZE],
            len: None,
        }
    }

    fn range(&self, offset: usize, count: usize) -> Result<core::ops::Range<usize>, FlashMediumError> {
        let len = self.len.ok_or(FlashMediumError::NotInitialized)?;
        let end = offset.checked_add(count).ok_or(FlashMediumError::OutOfBounds)?;
        if end > len {
            return Err(FlashMediumError::OutOfBounds);
        }
        Ok(offset..end)
    }
}

impl PersistentMedium for FlashMedium<'_> {
    type Error = FlashMediumError;

    fn begin(&mut self, len: usize) -> Result<(), Self::Error> {
        if len > MEDIUM_SIZE {
            return Err(FlashMediumError::OutOfBounds);
        }
        self.flash
            .blocking_read(flash::CHANNEL_PAGE_OFFSET, &mut self.mirror)?;
        self.len = Some(len);
        Ok(())
    }

    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.mirror[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        self.mirror[range].copy_from_slice(bytes);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        if self.len.is_none() {
            return Err(FlashMediumError::NotInitialized);
        }
        let page = flash::CHANNEL_PAGE_OFFSET;
        self.flash.blocking_erase(page, page + flash::PAGE_SIZE)?;
        self.flash.blocking_write(page, &self.mirror)?;
        defmt::info!("channel page programmed at 0x{:08X}", page);
        Ok(())
    }
}
