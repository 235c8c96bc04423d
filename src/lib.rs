//! ROX-2X Controller Firmware Library
//!
//! Front-panel support for a handheld 2 m band radio controller built on an
//! STM32G474: an interrupt-driven quadrature decoder for the tuning knob and
//! a validated channel memory for up to nine frequencies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION (main.rs)                     │
//! │        setup: activate encoder, recall channel memory        │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │   drivers::encoder           │   storage                    │
//! │   QuadratureDecoder          │   FrequencyStore             │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │   EdgeDispatch / InputLine   │   PersistentMedium           │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │           hal (embedded): EXTI lines, flash page             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - `std` (default): host build; provides a `critical-section`
//!   implementation so the drivers can be tested off-target.
//! - `embedded`: embassy/defmt target build. Build firmware with
//!   `--no-default-features --features embedded`.

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// EXTI edge dispatch and flash-backed channel memory for STM32G474.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// Quadrature decoder for the tuning knob.
pub mod drivers;

/// Channel Memory
///
/// Validated persistence of the tuned frequency list.
pub mod storage;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::drivers::encoder::{EdgeDispatch, QuadratureDecoder};
    pub use crate::storage::{FrequencyStore, PersistentMedium};

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
