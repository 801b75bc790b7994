//! Crumb - Smart Toaster Firmware
//!
//! Main firmware binary for RP2040-based toaster boards. A load cell,
//! an IR thermometer and three colour sensors share I2C0 (the latter
//! behind a TCA9548A); the core decides when the toast is done.
//!
//! Pin map:
//!
//! | Function        | GPIO |
//! |-----------------|------|
//! | Console TX / RX | 0 / 1 |
//! | I2C0 SDA / SCL  | 4 / 5 |
//! | Encoder A / B   | 10 / 11 |
//! | Encoder button  | 12 |
//! | Heater SSR      | 15 |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crumb_core::config::{SensorConfig, ToastParams};
use crumb_core::sensors::SensorHub;
use crumb_core::Controller;
use crumb_drivers::bus::MuxChannel;
use crumb_drivers::heater::GpioHeater;
use crumb_drivers::input::RotaryInput;
use crumb_drivers::sensor::{ColorArray, LoadCell, LoadCellConfig, Mlx90614, Nau7802, Tcs34725};
use crumb_hal_rp2040::Rp2040FlashStorage;

use crate::channels::ENCODER;
use crate::config::load_calibration;
use crate::display::Oled;
use crate::tasks::controller::I2cBus;

mod channels;
mod config;
mod display;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

const I2C_FREQUENCY_HZ: u32 = 400_000;

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();
static TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 32]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Crumb firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Heater first, so the element is off before anything else runs
    let heater = GpioHeater::new_active_high(Output::new(p.PIN_15, Level::Low));

    let params = ToastParams::default();
    if let Err(e) = params.validate() {
        error!("Invalid toast parameters: {:?}", e);
    }
    let sensor_config = SensorConfig::default();
    if !sensor_config.channels_valid() {
        error!("Invalid multiplexer channel assignment");
    }

    // Shared I2C0: OLED and load cell upstream, the rest behind the mux
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let bus: &'static I2cBus = I2C_BUS.init(RefCell::new(I2c::new_blocking(
        p.I2C0, p.PIN_5, p.PIN_4, i2c_config,
    )));

    let load_cell = LoadCell::new(
        Nau7802::new(RefCellDevice::new(bus)),
        Delay,
        LoadCellConfig {
            period_ms: sensor_config.weight_period_ms,
            tare_samples: sensor_config.tare_samples,
            ..Default::default()
        },
    );
    let thermometer = Mlx90614::new(MuxChannel::new(
        RefCellDevice::new(bus),
        sensor_config.mux_address,
        sensor_config.thermometer_channel,
    ))
    .with_period(sensor_config.temperature_period_ms);
    let colors = ColorArray::new(
        sensor_config.color_channels.map(|channel| {
            Tcs34725::new(MuxChannel::new(
                RefCellDevice::new(bus),
                sensor_config.mux_address,
                channel,
            ))
        }),
        Delay,
    )
    .with_period(sensor_config.color_period_ms);
    let sensors = SensorHub::new(load_cell, thermometer, colors)
        .with_white_samples(sensor_config.white_samples);

    let display = Oled::new(RefCellDevice::new(bus));

    // Encoder: A/B edges go to their own task, the button is polled
    let enc_a = Input::new(p.PIN_10, Pull::Up);
    let enc_b = Input::new(p.PIN_11, Pull::Up);
    let input = RotaryInput::new(&ENCODER, Input::new(p.PIN_12, Pull::Up));

    let mut toaster = Controller::new(sensors, input, display, heater, params);

    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let calibration = load_calibration(&mut storage).await;
    toaster.restore_calibration(&calibration);

    // Maintenance console on UART0
    let tx_buf = TX_BUF.init([0u8; 128]);
    let rx_buf = RX_BUF.init([0u8; 32]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default())
        .into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    spawner.spawn(tasks::encoder_task(enc_a, enc_b)).unwrap();
    spawner.spawn(tasks::console_task(rx, tx)).unwrap();
    spawner.spawn(tasks::calibration_task(storage)).unwrap();
    spawner.spawn(tasks::controller_task(toaster)).unwrap();

    info!("All tasks spawned");
}
