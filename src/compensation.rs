//! First and second order compensation of raw ADC counts.
//!
//! All intermediates are `i64`: `dT * C6`, `C4 * dT` and `D1 * SENS` overflow
//! 32 bits. Right shifts are arithmetic, so negative terms round toward
//! negative infinity, exactly as the datasheet reference code does.

use crate::calibration::Calibration;

/// 20.00 °C, the temperature the factory coefficients are referenced to.
const REFERENCE_TEMP: i64 = 2000;
/// -15.00 °C, below which the extended low temperature terms kick in.
const VERY_LOW_TEMP: i64 = -1500;

impl Calibration {
    /// Difference between actual and reference temperature counts.
    fn delta_t(&self, raw_temperature: u32) -> i64 {
        raw_temperature as i64 - ((self.t_ref as i64) << 8)
    }

    fn first_order_temperature(&self, d_t: i64) -> i64 {
        REFERENCE_TEMP + ((d_t * self.temp_sens as i64) >> 23)
    }

    /// Temperature in hundredths of a degree Celsius.
    ///
    /// With `high_precision` the second order term `dT² / 2³¹` is subtracted
    /// below 20.00 °C. That correction stays local to the temperature result
    /// and never feeds back into [`Calibration::pressure`].
    pub fn temperature(&self, raw_temperature: u32, high_precision: bool) -> i32 {
        let d_t = self.delta_t(raw_temperature);
        let mut temp = self.first_order_temperature(d_t);
        if high_precision && temp < REFERENCE_TEMP {
            let t2 = (d_t * d_t) >> 31;
            temp -= t2;
        }
        temp as i32
    }

    /// Offset and sensitivity at the actual temperature.
    pub(crate) fn pressure_terms(&self, raw_temperature: u32, high_precision: bool) -> (i64, i64) {
        let d_t = self.delta_t(raw_temperature);
        let mut off = ((self.off_t1 as i64) << 17) + ((self.tco as i64 * d_t) >> 6);
        let mut sens = ((self.sens_t1 as i64) << 16) + ((self.tcs as i64 * d_t) >> 7);

        if high_precision {
            // First order temperature on purpose, not the value returned by
            // `temperature`.
            let temp = self.first_order_temperature(d_t);
            if temp < REFERENCE_TEMP {
                let mut d_t2 = (temp - REFERENCE_TEMP).pow(2);
                let mut off2 = (61 * d_t2) >> 4;
                let mut sens2 = d_t2 << 1;
                if temp < VERY_LOW_TEMP {
                    d_t2 = (temp - VERY_LOW_TEMP).pow(2);
                    off2 += 15 * d_t2;
                    sens2 += d_t2 << 3;
                }
                off -= off2;
                sens -= sens2;
            }
        }
        (off, sens)
    }

    /// Temperature compensated pressure in pascals.
    ///
    /// `raw_temperature` must have been sampled close enough in time to
    /// `raw_pressure` that it still describes the die temperature.
    pub fn pressure(&self, raw_pressure: u32, raw_temperature: u32, high_precision: bool) -> i32 {
        let (off, sens) = self.pressure_terms(raw_temperature, high_precision);
        // The offset is subtracted before the final shift; shifting each term
        // separately rounds differently.
        ((((raw_pressure as i64 * sens) >> 21) - off) >> 15) as i32
    }
}
