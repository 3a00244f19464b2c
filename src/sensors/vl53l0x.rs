//! VL53L0X time-of-flight ranging sensor (I²C, default address 0x29).
//!
//! Only what presence detection needs: probe the model ID, put the I/O in
//! 2V8 mode, capture the stop variable, then take one single-shot range per
//! [`PresenceSensor::read_distance_mm`] call.  SPAD and reference
//! calibration stay at the factory defaults.
//!
//! Every wait is a bounded poll (`max_polls × POLL_STEP_MS`), so a wedged
//! sensor surfaces as [`SensorError::NotReady`] instead of stalling the
//! scheduler.
//!
//! Out-of-range readings (8190/8191 mm) are passed through as distances;
//! they are "far away", not "no reading".

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::PresenceSensor;
use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x29;
pub const EXPECTED_MODEL_ID: u8 = 0xEE;

/// Default poll budget: 100 × 1 ms, about three nominal ranging periods.
pub const DEFAULT_MAX_POLLS: u16 = 100;
const POLL_STEP_MS: u32 = 1;

mod reg {
    pub const SYSRANGE_START: u8 = 0x00;
    pub const SYSTEM_INTERRUPT_CONFIG_GPIO: u8 = 0x0A;
    pub const SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
    pub const RESULT_INTERRUPT_STATUS: u8 = 0x13;
    pub const RESULT_RANGE_MM: u8 = 0x1E;
    pub const POWER_MANAGEMENT: u8 = 0x80;
    pub const GPIO_HV_MUX_ACTIVE_HIGH: u8 = 0x84;
    pub const I2C_MODE: u8 = 0x88;
    pub const VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV: u8 = 0x89;
    pub const STOP_VARIABLE: u8 = 0x91;
    pub const IDENTIFICATION_MODEL_ID: u8 = 0xC0;
    pub const PAGE_SELECT: u8 = 0xFF;
}

pub struct Vl53l0x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    stop_variable: u8,
    max_polls: u16,
}

impl<I2C: I2c, D: DelayNs> Vl53l0x<I2C, D> {
    /// Probe and initialise the sensor at [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, delay: D) -> Result<Self, SensorError> {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Result<Self, SensorError> {
        let mut dev = Self {
            i2c,
            delay,
            address,
            stop_variable: 0,
            max_polls: DEFAULT_MAX_POLLS,
        };
        dev.init()?;
        info!("VL53L0X: ready at 0x{:02x}", address);
        Ok(dev)
    }

    pub fn set_max_polls(&mut self, polls: u16) {
        self.max_polls = polls.max(1);
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::BusFailed)?;
        Ok(buf[0])
    }

    fn read_reg16(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::BusFailed)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::BusFailed)
    }

    fn init(&mut self) -> Result<(), SensorError> {
        let id = self
            .read_reg(reg::IDENTIFICATION_MODEL_ID)
            .map_err(|_| SensorError::NotPresent)?;
        if id != EXPECTED_MODEL_ID {
            debug!("VL53L0X: unexpected model id 0x{:02x}", id);
            return Err(SensorError::NotPresent);
        }

        let pad = self.read_reg(reg::VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV)?;
        self.write_reg(reg::VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV, pad | 0x01)?;
        self.write_reg(reg::I2C_MODE, 0x00)?;

        self.write_reg(reg::POWER_MANAGEMENT, 0x01)?;
        self.write_reg(reg::PAGE_SELECT, 0x01)?;
        self.write_reg(reg::SYSRANGE_START, 0x00)?;
        self.stop_variable = self.read_reg(reg::STOP_VARIABLE)?;
        self.write_reg(reg::SYSRANGE_START, 0x01)?;
        self.write_reg(reg::PAGE_SELECT, 0x00)?;
        self.write_reg(reg::POWER_MANAGEMENT, 0x00)?;

        // New-sample-ready interrupt, active low.
        self.write_reg(reg::SYSTEM_INTERRUPT_CONFIG_GPIO, 0x04)?;
        let mux = self.read_reg(reg::GPIO_HV_MUX_ACTIVE_HIGH)?;
        self.write_reg(reg::GPIO_HV_MUX_ACTIVE_HIGH, mux & !0x10)?;
        self.write_reg(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)
    }

    fn poll_until(
        &mut self,
        mut done: impl FnMut(&mut Self) -> Result<bool, SensorError>,
    ) -> Result<(), SensorError> {
        for _ in 0..self.max_polls {
            if done(self)? {
                return Ok(());
            }
            self.delay.delay_ms(POLL_STEP_MS);
        }
        Err(SensorError::NotReady)
    }

    /// One single-shot range in millimetres.
    pub fn measure_single(&mut self) -> Result<u16, SensorError> {
        self.write_reg(reg::POWER_MANAGEMENT, 0x01)?;
        self.write_reg(reg::PAGE_SELECT, 0x01)?;
        self.write_reg(reg::SYSRANGE_START, 0x00)?;
        self.write_reg(reg::STOP_VARIABLE, self.stop_variable)?;
        self.write_reg(reg::SYSRANGE_START, 0x01)?;
        self.write_reg(reg::PAGE_SELECT, 0x00)?;
        self.write_reg(reg::POWER_MANAGEMENT, 0x00)?;

        self.write_reg(reg::SYSRANGE_START, 0x01)?;
        self.poll_until(|s| Ok(s.read_reg(reg::SYSRANGE_START)? & 0x01 == 0))?;
        self.poll_until(|s| Ok(s.read_reg(reg::RESULT_INTERRUPT_STATUS)? & 0x07 != 0))?;

        let mm = self.read_reg16(reg::RESULT_RANGE_MM)?;
        self.write_reg(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)?;
        Ok(mm)
    }
}

impl<I2C: I2c, D: DelayNs> PresenceSensor for Vl53l0x<I2C, D> {
    fn read_distance_mm(&mut self) -> Result<u16, SensorError> {
        self.measure_single()
    }
}
