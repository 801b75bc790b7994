//! RP2040-specific HAL for the toaster firmware
//!
//! Implements the `crumb-hal` traits for the RP2040. Currently that is
//! the flash storage driver; every other peripheral is used through
//! `embassy-rp` and `embedded-hal` directly.

#![no_std]

pub mod flash;

pub use crumb_hal::{FlashStorage as FlashStorageTrait, StorageKey};
pub use flash::Rp2040FlashStorage;
