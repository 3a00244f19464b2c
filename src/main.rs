//! Drinkmon firmware entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PwmLight    GpioButton   Vl53l0x      HttpSessionRegistry     │
//! │  (LightPort) (ManualInput)(Presence)   (SessionRegistry)       │
//! │  Esp32Time   LogEventSink ProvisioningStore  WiFi STA          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   Presence · Button · Peer poll · Breath  (app/)       │    │
//! │  │   DeviceState · LightBus                               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (single-threaded cooperative executor)              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot: NVS record → WiFi → peripherals → scheduler.  Without a usable
//! record or link the light runs the spectrum fade until reset.

use core::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
use esp_idf_hal::prelude::*;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use drinkmon::adapters::http_registry::{EspHttpTransport, HttpSessionRegistry};
use drinkmon::adapters::log_sink::LogEventSink;
use drinkmon::adapters::nvs::ProvisioningStore;
use drinkmon::adapters::time::Esp32TimeAdapter;
use drinkmon::adapters::wifi::{WifiCredentials, connect_station};
use drinkmon::app::ports::LightPort;
use drinkmon::drivers::button::GpioButton;
use drinkmon::drivers::led_patterns::run_spectrum_fade;
use drinkmon::drivers::rgb_led::PwmLight;
use drinkmon::pins;
use drinkmon::scheduler::{ControllerHardware, Scheduler};
use drinkmon::sensors::vl53l0x::Vl53l0x;

/// Spectrum fade until reset.  The captive portal runs elsewhere and
/// reboots the device once it has saved a record.
fn await_provisioning<L: LightPort>(light: L) -> Result<()> {
    futures_lite::future::block_on(run_spectrum_fade(light));
    Ok(())
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Drinkmon v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Light (needed by both the fade and the controller) ─
    let ledc_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(pins::LED_PWM_FREQ_HZ.Hz()),
    )?;
    let light = PwmLight::new(
        LedcDriver::new(peripherals.ledc.channel0, &ledc_timer, peripherals.pins.gpio19)?,
        LedcDriver::new(peripherals.ledc.channel1, &ledc_timer, peripherals.pins.gpio18)?,
        LedcDriver::new(peripherals.ledc.channel2, &ledc_timer, peripherals.pins.gpio5)?,
    );
    info!(
        "LED: R=GPIO{} G=GPIO{} B=GPIO{} @ {} Hz",
        pins::LED_R_GPIO,
        pins::LED_G_GPIO,
        pins::LED_B_GPIO,
        pins::LED_PWM_FREQ_HZ
    );

    // ── 3. Provisioning record ─────────────────────────────────
    let store = ProvisioningStore::open(nvs_partition.clone())?;
    let provisioned = match store.load() {
        Ok(Some(record)) => record,
        Ok(None) => return await_provisioning(light),
        Err(e) => {
            warn!("Provisioning record unusable ({}), awaiting provisioning", e);
            return await_provisioning(light);
        }
    };

    let config = provisioned.device_config();
    config.validate()?;

    // ── 4. WiFi ───────────────────────────────────────────────
    let creds = match WifiCredentials::new(&provisioned.ssid, &provisioned.pw) {
        Ok(c) => c,
        Err(e) => {
            warn!("WiFi credentials rejected ({}), awaiting provisioning", e);
            return await_provisioning(light);
        }
    };
    let _wifi = match connect_station(peripherals.modem, sysloop, nvs_partition, &creds) {
        Ok(w) => w,
        Err(e) => {
            warn!("WiFi: {}, awaiting provisioning", e);
            return await_provisioning(light);
        }
    };

    // ── 5. Sensor and button ──────────────────────────────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(pins::I2C_BAUDRATE_HZ.Hz()),
    )?;
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{}",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO
    );
    let sensor = match Vl53l0x::new(i2c, FreeRtos) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("VL53L0X: {}, presence disabled", e);
            None
        }
    };

    let mut button_pin = PinDriver::input(peripherals.pins.gpio23)?;
    button_pin.set_pull(Pull::Up)?;
    info!("Button: GPIO{} (active low)", pins::BUTTON_GPIO);

    // ── 6. Registry + controller ──────────────────────────────
    let registry = HttpSessionRegistry::new(
        EspHttpTransport::new(Duration::from_millis(u64::from(config.request_timeout_ms))),
        &config.api_base_url,
    );
    info!("Registry: {}", registry.base_url());

    let scheduler = Scheduler::new(
        &config,
        ControllerHardware {
            sensor,
            light,
            button: GpioButton::new(button_pin),
        },
        registry,
        Esp32TimeAdapter::new(),
        LogEventSink::new(),
    );
    scheduler.run();

    Ok(())
}
