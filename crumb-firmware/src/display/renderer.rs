//! View rendering
//!
//! Every [`View`] is drawn from scratch: clear, draw, flush. Text uses
//! the 6x10 font, giving 21 columns and 6 rows on the 128x64 panel.

use core::fmt::Write;

use defmt::*;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_hal::i2c::I2c;
use heapless::String;

use crumb_core::sensors::SensorSnapshot;
use crumb_core::traits::DisplaySink;
use crumb_core::ui::{Mode, Question, View};

use super::ssd1306::{Ssd1306, WIDTH};

/// Height of one text row (px)
const ROW_H: i32 = 10;
const CENTER_X: i32 = WIDTH as i32 / 2;

type Line = String<22>;

/// SSD1306 panel rendering controller views
pub struct Oled<I> {
    panel: Ssd1306<I>,
    ready: bool,
}

impl<I: I2c> Oled<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            panel: Ssd1306::new(i2c),
            ready: false,
        }
    }

    fn text(&mut self, text: &str, row: i32, font: &'static MonoFont<'static>, color: BinaryColor) {
        let style = MonoTextStyle::new(font, color);
        let _ = Text::with_baseline(text, Point::new(2, row * ROW_H), style, Baseline::Top)
            .draw(&mut self.panel);
    }

    fn line(&mut self, text: &str, row: i32) {
        self.text(text, row, &FONT_6X10, BinaryColor::On);
    }

    fn centered(&mut self, text: &str, y: i32, font: &'static MonoFont<'static>) {
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let layout = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        let _ = Text::with_text_style(text, Point::new(CENTER_X, y), style, layout)
            .draw(&mut self.panel);
    }

    /// Row drawn inverted when selected
    fn option(&mut self, text: &str, row: i32, selected: bool) {
        if selected {
            let _ = Rectangle::new(Point::new(0, row * ROW_H), Size::new(WIDTH as u32, ROW_H as u32))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut self.panel);
            self.text(text, row, &FONT_6X10, BinaryColor::Off);
        } else {
            self.line(text, row);
        }
    }

    fn progress_bar(&mut self, percent: u8, y: i32) {
        let outline = Rectangle::new(Point::new(4, y), Size::new(WIDTH as u32 - 8, 12));
        let _ = outline
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.panel);

        let fill_w = (WIDTH as u32 - 12) * percent.min(100) as u32 / 100;
        if fill_w > 0 {
            let _ = Rectangle::new(Point::new(6, y + 2), Size::new(fill_w, 8))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut self.panel);
        }
    }

    fn draw_splash(&mut self) {
        self.centered("Crumb", 14, &FONT_10X20);
        self.centered("smart toaster", 40, &FONT_6X10);
    }

    fn draw_menu(&mut self, selected: Mode) {
        self.line("Select mode", 0);
        for (i, mode) in Mode::ALL.iter().enumerate() {
            self.option(mode.label(), i as i32 + 2, *mode == selected);
        }
    }

    fn draw_sensors(&mut self, snapshot: &SensorSnapshot) {
        let (r, g, b) = snapshot.color;
        let mut s = Line::new();

        self.line("Sensors", 0);
        if snapshot.temperature_c.is_finite() {
            let _ = write!(s, "Temp  {:.1} C", snapshot.temperature_c);
        } else {
            let _ = s.push_str("Temp  --");
        }
        self.line(&s, 1);

        s.clear();
        let _ = write!(s, "Weight {:.1} g", snapshot.weight_g);
        self.line(&s, 2);

        s.clear();
        let _ = write!(s, "RGB {} {} {}", r, g, b);
        self.line(&s, 3);

        s.clear();
        let _ = write!(s, "Bright {:.0}%", snapshot.brightness * 100.0);
        self.line(&s, 4);
    }

    fn draw_dialog(&mut self, question: Question, index: u8) {
        self.line(question.text(), 0);
        for (i, label) in question.options().iter().enumerate() {
            self.option(label, i as i32 + 2, i == index as usize);
        }
    }

    fn draw_place_bread(&mut self, show_frozen: bool, extra_percent: f32) {
        self.line("Place bread", 0);
        self.line("on the scale", 1);
        if show_frozen {
            let mut s = Line::new();
            self.line("Cold bread:", 3);
            let _ = write!(s, "+{:.1}% more loss", extra_percent);
            self.line(&s, 4);
        }
    }

    fn draw_calibrating(&mut self, weight_g: f32) {
        let mut s = Line::new();
        self.line("Weighing...", 0);
        let _ = write!(s, "{:.1} g", weight_g);
        self.centered(&s, 24, &FONT_10X20);
    }

    fn draw_toasting(&mut self, percent: u8) {
        let mut s = Line::new();
        self.line("Toasting", 0);
        self.progress_bar(percent, 24);
        let _ = write!(s, "{}%", percent);
        self.centered(&s, 44, &FONT_6X10);
    }

    fn draw_ready(&mut self) {
        self.centered("Toast ready!", 14, &FONT_10X20);
        self.centered("Press to continue", 44, &FONT_6X10);
    }
}

impl<I: I2c> DisplaySink for Oled<I> {
    fn begin(&mut self) -> bool {
        self.ready = self.panel.init().is_ok();
        if !self.ready {
            error!("OLED did not respond");
        }
        self.ready
    }

    fn render(&mut self, view: View) {
        if !self.ready {
            return;
        }

        self.panel.clear_buffer();
        match view {
            View::Splash => self.draw_splash(),
            View::InitError => self.line("Init error", 0),
            View::ModeSelection { selected } => self.draw_menu(selected),
            View::SensorShowcase(snapshot) => self.draw_sensors(&snapshot),
            View::YesNo { question, index } => self.draw_dialog(question, index),
            View::PlaceBread {
                show_frozen,
                extra_percent,
            } => self.draw_place_bread(show_frozen, extra_percent),
            View::Calibrating { weight_g } => self.draw_calibrating(weight_g),
            View::Toasting { .. } => self.draw_toasting(view.progress_percent().unwrap_or(0)),
            View::ToastReady => self.draw_ready(),
        }

        if self.panel.flush().is_err() {
            warn!("OLED flush failed");
        }
    }
}
