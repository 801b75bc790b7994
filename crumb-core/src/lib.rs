//! Board-agnostic control logic for the Crumb toaster firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (sensors, input, display, heater)
//! - Sensor aggregation into per-tick snapshots
//! - Encoder counting and button debouncing
//! - Menu and confirmation dialog navigation
//! - The toasting flow and its termination decision
//! - State machine and the tick-driven controller
//! - Configuration and calibration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod input;
pub mod sensors;
pub mod state;
pub mod toast;
pub mod traits;
pub mod ui;

pub use controller::Controller;

/// Milliseconds elapsed between two wrapping `u32` timestamps
#[inline]
pub(crate) fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Absolute difference of two floats
#[inline]
pub(crate) fn abs_diff(a: f32, b: f32) -> f32 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}
