//! User input drivers

pub mod rotary;

pub use rotary::RotaryInput;
