//! Hardware Abstraction Layer
//!
//! Binds the hardware-independent drivers to STM32G474 peripherals:
//! EXTI lines for encoder edges and internal flash for channel memory.

pub mod exti;
pub mod flash;
