//! Shared I2C bus helpers

pub mod mux;

pub use mux::{channel_mask, MuxChannel, MUX_ADDRESS};
