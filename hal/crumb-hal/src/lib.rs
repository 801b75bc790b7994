//! Crumb Hardware Abstraction Layer
//!
//! Chip-independent traits the firmware needs beyond what `embedded-hal`
//! already covers. Sensors, the heater pin and the encoder use the
//! `embedded-hal` traits directly; persistent storage has no standard
//! trait, so it is defined here and implemented per chip.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (crumb-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  crumb-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ crumb-hal-    │
//!             │    rp2040     │
//!             └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey, MAX_CALIBRATION_SIZE};
