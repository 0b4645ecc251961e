//! Hardware drivers — thin wrappers over ESP-IDF peripherals.
//!
//! Each driver is dual-target: real register/sys-call access under
//! `target_os = "espidf"`, simulation stubs everywhere else so the full
//! stack runs in host tests.

pub mod button;
pub mod hw_init;
pub mod relay;
pub mod watchdog;
