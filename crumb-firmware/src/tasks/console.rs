//! Serial maintenance console
//!
//! Single-character commands on UART0:
//!
//! - `t` tare the scale
//! - `c` calibrate the scale with the 200 g reference mass
//! - `b` take the current weight as baseline
//! - `w` white-calibrate colour sensor 0
//!
//! Commands are queued for the controller, which only runs them while the
//! menu is showing. The result is echoed back on the serial line.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Timer;
use embedded_io_async::{Read, Write};

use crumb_core::config::CalibrationCommand;
use crumb_core::controller::CalibrationError;

use crate::channels::{CALIBRATION_CMD, CALIBRATION_RESULT};

const RX_BUF_SIZE: usize = 16;

/// Pause after a receive error before reading again (ms)
const READ_ERROR_BACKOFF_MS: u64 = 100;

#[embassy_executor::task]
pub async fn console_task(mut rx: BufferedUartRx, mut tx: BufferedUartTx) {
    info!("Console task started");
    let _ = tx.write_all(b"crumb console: t=tare c=calibrate b=baseline w=white\r\n").await;

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Console read error: {:?}", e);
                Timer::after_millis(READ_ERROR_BACKOFF_MS).await;
                continue;
            }
        };

        for &byte in &buf[..n] {
            if byte.is_ascii_whitespace() {
                continue;
            }

            let Some(command) = CalibrationCommand::from_console_byte(byte) else {
                let _ = tx.write_all(b"?\r\n").await;
                continue;
            };

            debug!("Console command: {:?}", command);
            CALIBRATION_RESULT.reset();
            CALIBRATION_CMD.send(command).await;

            let reply: &[u8] = match CALIBRATION_RESULT.wait().await {
                Ok(()) => b"ok\r\n",
                Err(CalibrationError::Busy) => b"busy\r\n",
                Err(CalibrationError::Sensor(_)) => b"failed\r\n",
            };
            let _ = tx.write_all(reply).await;
        }
    }
}
