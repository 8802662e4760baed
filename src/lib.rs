//! Blocking driver for the MS5607 barometric pressure sensor on I2C.
//!
//! The driver resets the part, reads the eight factory calibration words
//! from PROM once, and then converts raw 24 bit ADC samples into pascals and
//! hundredths of a degree Celsius using the integer compensation from the
//! datasheet, optionally with the second order low temperature terms.
//!
//! ```ignore
//! let mut sensor = Ms5607::new(i2c, delay)?;
//! sensor.set_high_precision(true);
//! let raw_p = sensor.raw_pressure()?;
//! let raw_t = sensor.raw_temperature()?;
//! let pascals = sensor.to_pascals(raw_p, raw_t);
//! let centi_celsius = sensor.to_celsius_hundredths(raw_t);
//! ```
//!
//! Every call blocks for the bus transfer and, when sampling, for the
//! conversion time of the selected oversampling ratio. The driver takes
//! `&mut self` for all bus access; to share one sensor between contexts,
//! wrap it (or the bus) in a mutex.
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

mod calibration;
mod command;
mod compensation;
mod error;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub use calibration::{Calibration, OversamplingRatio};
pub use command::Command;
pub use error::DeviceError;

/// 7-bit address with CSB pulled high, the only strapping most breakouts use.
pub const DEFAULT_ADDRESS: u8 = 0x76;

/// Settle time after a reset command, in microseconds.
const RESET_TIME_US: u32 = 3_000;

/// A compensated pressure / temperature pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Pascals.
    pub pressure: i32,
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
}

pub struct Ms5607<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    calibration: Calibration,
    oversampling_ratio: OversamplingRatio,
    high_precision: bool,
}

impl<I2C, D> Ms5607<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Resets the sensor at [`DEFAULT_ADDRESS`] and loads its calibration.
    ///
    /// The PROM CRC is not checked; see [`Ms5607::new_verified`].
    /// Pass `&mut i2c` to keep using the bus elsewhere once the driver is
    /// dropped.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, DeviceError<I2C::Error>> {
        Self::new_with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn new_with_address(
        i2c: I2C,
        delay: D,
        address: u8,
    ) -> Result<Self, DeviceError<I2C::Error>> {
        let mut sensor = Self {
            i2c,
            delay,
            address,
            calibration: Calibration::new(&[0; 8]),
            oversampling_ratio: OversamplingRatio::default(),
            high_precision: false,
        };
        sensor.reset()?;
        sensor.calibration = Calibration::new(&sensor.read_calibration()?);
        Ok(sensor)
    }

    /// Like [`Ms5607::new`], but fails with [`DeviceError::InvalidCrc`] when
    /// the PROM contents do not match their stored CRC-4.
    pub fn new_verified(i2c: I2C, delay: D) -> Result<Self, DeviceError<I2C::Error>> {
        let sensor = Self::new(i2c, delay)?;
        let stored = sensor.calibration.stored_crc();
        let computed = sensor.calibration.crc4();
        if stored != computed {
            warn!("PROM crc mismatch: stored {}, computed {}", stored, computed);
            return Err(DeviceError::InvalidCrc { stored, computed });
        }
        Ok(sensor)
    }

    /// Sends the reset command and waits for the sensor to come back up.
    ///
    /// Calibration is not reloaded.
    pub fn reset(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        debug!("reset ms5607 at {}", self.address);
        self.send(Command::Reset)?;
        self.delay.delay_us(RESET_TIME_US);
        Ok(())
    }

    /// Reads PROM words 0..=7, each a big endian u16.
    fn read_calibration(&mut self) -> Result<[u16; 8], DeviceError<I2C::Error>> {
        let mut prom = [0u16; 8];
        for (index, word) in (0u8..).zip(prom.iter_mut()) {
            let mut buf = [0u8; 2];
            self.send(Command::ReadProm(index))?;
            self.i2c
                .read(self.address, &mut buf)
                .map_err(DeviceError::Io)?;
            *word = u16::from_be_bytes(buf);
        }
        debug!("PROM: {:?}", prom);
        Ok(prom)
    }

    fn send(&mut self, command: Command) -> Result<(), DeviceError<I2C::Error>> {
        self.i2c
            .write(self.address, &[command.value()])
            .map_err(DeviceError::Io)
    }

    /// Starts a conversion, waits it out, then reads the 24 bit result.
    ///
    /// There is no "conversion done" flag to poll; the wait is the whole
    /// handshake.
    fn take_sample(&mut self, command: Command) -> Result<u32, DeviceError<I2C::Error>> {
        trace!("convert {}", command.value());
        self.send(command)?;
        self.delay
            .delay_us(self.oversampling_ratio.conversion_time_us());

        let mut buf = [0u8; 4];
        self.send(Command::ReadAdc)?;
        self.i2c
            .read(self.address, &mut buf[1..])
            .map_err(DeviceError::Io)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Raw pressure count (D1).
    ///
    /// Pressure compensation needs a temperature sample as well. The two are
    /// not taken atomically: pair this with a [`Ms5607::raw_temperature`]
    /// read close enough in time that the temperature still holds.
    pub fn raw_pressure(&mut self) -> Result<u32, DeviceError<I2C::Error>> {
        self.take_sample(Command::D1Conversion(self.oversampling_ratio))
    }

    /// Raw temperature count (D2). See [`Ms5607::raw_pressure`] on pairing.
    pub fn raw_temperature(&mut self) -> Result<u32, DeviceError<I2C::Error>> {
        self.take_sample(Command::D2Conversion(self.oversampling_ratio))
    }

    /// Samples pressure, then temperature, and compensates the pair.
    pub fn measure(&mut self) -> Result<Measurement, DeviceError<I2C::Error>> {
        let raw_pressure = self.raw_pressure()?;
        let raw_temperature = self.raw_temperature()?;
        Ok(Measurement {
            pressure: self.to_pascals(raw_pressure, raw_temperature),
            temperature: self.to_celsius_hundredths(raw_temperature),
        })
    }
}

impl<I2C, D> Ms5607<I2C, D> {
    /// Hundredths of a degree Celsius, 2000 being 20.00 °C.
    pub fn to_celsius_hundredths(&self, raw_temperature: u32) -> i32 {
        self.calibration
            .temperature(raw_temperature, self.high_precision)
    }

    /// Compensated pressure in pascals.
    pub fn to_pascals(&self, raw_pressure: u32, raw_temperature: u32) -> i32 {
        self.calibration
            .pressure(raw_pressure, raw_temperature, self.high_precision)
    }

    pub fn set_oversampling_ratio(&mut self, ratio: OversamplingRatio) {
        self.oversampling_ratio = ratio;
    }

    pub fn oversampling_ratio(&self) -> OversamplingRatio {
        self.oversampling_ratio
    }

    /// Enables the second order compensation below 20.00 °C.
    pub fn set_high_precision(&mut self, enabled: bool) {
        self.high_precision = enabled;
    }

    pub fn high_precision(&self) -> bool {
        self.high_precision
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
