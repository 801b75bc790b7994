//! Main controller task
//!
//! Boots the controller, then ticks it forever at the interval it asks
//! for. Console calibration commands are applied between ticks.

use core::cell::RefCell;

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Instant, Timer};
use embedded_hal_bus::i2c::RefCellDevice;

use crumb_core::sensors::SensorHub;
use crumb_core::state::Event;
use crumb_core::Controller;
use crumb_drivers::bus::MuxChannel;
use crumb_drivers::heater::GpioHeater;
use crumb_drivers::input::RotaryInput;
use crumb_drivers::sensor::{ColorArray, LoadCell, Mlx90614, Nau7802};

use crate::channels::{CALIBRATION_CMD, CALIBRATION_RESULT, CALIBRATION_SAVE};
use crate::display::Oled;

pub type I2cBus = RefCell<I2c<'static, I2C0, Blocking>>;
pub type I2cDev = RefCellDevice<'static, I2c<'static, I2C0, Blocking>>;

pub type Sensors = SensorHub<
    LoadCell<Nau7802<I2cDev>, Delay>,
    Mlx90614<MuxChannel<I2cDev>>,
    ColorArray<MuxChannel<I2cDev>, Delay>,
>;

/// The fully wired appliance
pub type Toaster = Controller<
    Sensors,
    RotaryInput<'static, Input<'static>>,
    Oled<I2cDev>,
    GpioHeater<Output<'static>>,
>;

fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[embassy_executor::task]
pub async fn controller_task(mut toaster: Toaster) {
    info!("Controller task started");

    let event = toaster.boot(now_ms());
    log_event(&event);
    if matches!(event, Event::DisplayInitFailed) {
        error!("Display init failed, controller halted");
    }

    loop {
        if let Ok(command) = CALIBRATION_CMD.try_receive() {
            let result = toaster.handle_calibration(command).map(|event| {
                log_event(&event);
                CALIBRATION_SAVE.signal(toaster.calibration());
            });
            if let Err(e) = result {
                warn!("Calibration command {:?} rejected: {:?}", command, e);
            }
            CALIBRATION_RESULT.signal(result);
        }

        if let Some(event) = toaster.tick(now_ms()) {
            log_event(&event);
        }

        Timer::after_millis(toaster.poll_interval_ms() as u64).await;
    }
}

fn log_event(event: &Event) {
    match event {
        Event::DisplayInitFailed => error!("Event: {:?}", event),
        Event::SensorsStarted(report) if !report.all_ok() => {
            warn!("Some sensors failed to start: {:?}", report)
        }
        e if e.is_timeout() => warn!("Event: {:?}", e),
        e if e.starts_heating() => info!("Heater on: {:?}", e),
        Event::ToastFinished(reason) => info!("Toast finished: {:?}", reason),
        e => debug!("Event: {:?}", e),
    }
}
