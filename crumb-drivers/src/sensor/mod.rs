//! Sensor drivers

pub mod color_array;
pub mod load_cell;
pub mod mlx90614;
pub mod nau7802;
pub mod tcs34725;

#[cfg(test)]
pub(crate) mod mock;

pub use color_array::ColorArray;
pub use load_cell::{LoadCell, LoadCellAdc, LoadCellConfig};
pub use mlx90614::Mlx90614;
pub use nau7802::Nau7802;
pub use tcs34725::{RawColor, Tcs34725};
