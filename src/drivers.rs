//! Peripheral Drivers
//!
//! Hardware-independent drivers for the controller's front-panel inputs.
//! Hardware access is reached through small capability traits so the
//! drivers can be exercised on a host.

pub mod encoder;
