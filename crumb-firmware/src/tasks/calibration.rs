//! Calibration persistence task
//!
//! Owns the flash and writes calibration whenever the controller signals
//! a change, so flash erase/program never stalls a controller tick.

use defmt::*;

use crumb_hal_rp2040::Rp2040FlashStorage;

use crate::channels::CALIBRATION_SAVE;
use crate::config::save_calibration;

#[embassy_executor::task]
pub async fn calibration_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Calibration task started");

    loop {
        let mut data = CALIBRATION_SAVE.wait().await;

        match save_calibration(&mut storage, &mut data).await {
            Ok(()) => info!("Calibration saved"),
            Err(e) => error!("Failed to save calibration: {:?}", e),
        }
    }
}
