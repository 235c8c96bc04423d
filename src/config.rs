//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the ROX-2X controller.
//! Band limits, channel memory layout, and pin mappings are centralized here.

/// Lowest tunable frequency (the 2 m band starts at 144 MHz, with margin)
pub const MIN_TUNE_FREQ_HZ: u32 = 143_500_000;

/// Highest tunable frequency (the 2 m band ends at 146 MHz, with margin)
pub const MAX_TUNE_FREQ_HZ: u32 = 146_500_000;

/// Number of channel memory slots
pub const FREQUENCY_SLOTS: usize = 9;

/// Size of one persisted frequency word in bytes
pub const SLOT_SIZE: usize = core::mem::size_of::<u32>();

/// Marker written to a slot that holds no valid frequency (erased flash pattern)
pub const EMPTY_SLOT: u32 = 0xFFFF_FFFF;

/// Bytes reserved on the persistent medium for channel memory
pub const MEDIUM_SIZE: usize = 256;

/// Channels seeded when the medium holds no valid frequency at all
pub const DEFAULT_FREQUENCIES_HZ: [u32; 2] = [144_710_000, 145_000_000];

/// Interval between encoder position reports in the main loop
pub const ENCODER_POLL_MS: u64 = 50;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Encoder A input (EXTI line 0)
    pub const ENCODER_A: &str = "PA0";

    /// Encoder B input (EXTI line 1)
    pub const ENCODER_B: &str = "PA1";
}

/// Flash partition used as channel memory
pub mod flash {
    //! Flash layout for the STM32G474RE (512 KiB, 2 KiB pages).
    //! The last page is reserved for channel memory.

    /// Total flash size in bytes
    pub const FLASH_SIZE: u32 = 512 * 1024;

    /// Erase granularity in bytes
    pub const PAGE_SIZE: u32 = 2 * 1024;

    /// Offset of the channel memory page, relative to the flash base
    pub const CHANNEL_PAGE_OFFSET: u32 = FLASH_SIZE - PAGE_SIZE;

    /// Program granularity in bytes (double word)
    pub const WRITE_SIZE: usize = 8;
}

const _: () = assert!(FREQUENCY_SLOTS * SLOT_SIZE <= MEDIUM_SIZE);
const _: () = assert!(MEDIUM_SIZE % flash::WRITE_SIZE == 0);
const _: () = assert!(MEDIUM_SIZE as u32 <= flash::PAGE_SIZE);
