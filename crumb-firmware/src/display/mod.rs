//! OLED output
//!
//! The panel shares I2C0 with the sensors. [`Oled`] turns controller
//! views into embedded-graphics drawing on a buffered SSD1306.

pub mod renderer;
pub mod ssd1306;

pub use renderer::Oled;
pub use ssd1306::Ssd1306;
