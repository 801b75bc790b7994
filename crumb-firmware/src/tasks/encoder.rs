//! Rotary encoder edge task
//!
//! Waits on channel A edges and pushes decoded steps into the shared
//! counter. This is the counter's only writer.

use embassy_rp::gpio::Input;

use crumb_core::input::QuadratureDecoder;

use crate::channels::ENCODER;

#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, b: Input<'static>) {
    defmt::info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new(a.is_high());

    loop {
        a.wait_for_any_edge().await;
        ENCODER.step(decoder.decode(a.is_high(), b.is_high()));
    }
}
