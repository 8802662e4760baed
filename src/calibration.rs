/// Oversampling Ratio
///
/// Higher ratios trade conversion time for lower noise. The command bits and
/// the wait before the ADC may be read come from the same table row so the
/// two can never disagree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OversamplingRatio {
    OSR256,
    OSR512,
    OSR1024,
    OSR2048,
    #[default]
    OSR4096,
}

impl OversamplingRatio {
    /// Every ratio, lowest first.
    pub const ALL: [OversamplingRatio; 5] = [
        OversamplingRatio::OSR256,
        OversamplingRatio::OSR512,
        OversamplingRatio::OSR1024,
        OversamplingRatio::OSR2048,
        OversamplingRatio::OSR4096,
    ];

    // (command bits, conversion wait in microseconds)
    const fn row(&self) -> (u8, u32) {
        match *self {
            OversamplingRatio::OSR256 => (0x00, 900),
            OversamplingRatio::OSR512 => (0x02, 3_000),
            OversamplingRatio::OSR1024 => (0x04, 4_000),
            OversamplingRatio::OSR2048 => (0x06, 6_000),
            OversamplingRatio::OSR4096 => (0x08, 10_000),
        }
    }

    /// Bits ORed into the D1/D2 conversion command.
    pub const fn value(&self) -> u8 {
        self.row().0
    }

    /// Minimum time in MICROSECONDS between starting a conversion and
    /// reading the ADC. Reading earlier returns a stale or garbage value.
    pub const fn conversion_time_us(&self) -> u32 {
        self.row().1
    }
}

/// Factory calibration data read from PROM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// PROM[0]: reserved for the manufacturer
    pub reserved: u16,
    /// C1: Pressure sensitivity | SENST1
    pub sens_t1: u16,
    /// C2: Pressure offset | OFFT1
    pub off_t1: u16,
    /// C3: Temperature coefficient of pressure sensitivity | TCS
    pub tcs: u16,
    /// C4: Temperature coefficient of pressure offset | TCO
    pub tco: u16,
    /// C5: Reference temperature | TREF
    pub t_ref: u16,
    /// C6: Temperature coefficient of the temperature | TEMPSENS
    pub temp_sens: u16,
    /// PROM[7]: serial code, CRC-4 in the low nibble
    pub crc: u16,
}

impl Calibration {
    pub fn new(buf: &[u16; 8]) -> Calibration {
        Calibration {
            reserved: buf[0],
            sens_t1: buf[1],
            off_t1: buf[2],
            tcs: buf[3],
            tco: buf[4],
            t_ref: buf[5],
            temp_sens: buf[6],
            crc: buf[7],
        }
    }

    /// The PROM image in read order.
    pub fn words(&self) -> [u16; 8] {
        [
            self.reserved,
            self.sens_t1,
            self.off_t1,
            self.tcs,
            self.tco,
            self.t_ref,
            self.temp_sens,
            self.crc,
        ]
    }

    /// CRC-4 stored by the factory in the low nibble of PROM[7].
    pub fn stored_crc(&self) -> u8 {
        (self.crc & 0x000F) as u8
    }

    /// CRC-4 over the PROM image as described in application note AN520.
    /// The stored CRC nibble itself (low byte of PROM[7]) is excluded.
    pub fn crc4(&self) -> u8 {
        let mut prom = self.words();
        prom[7] &= 0xFF00;

        let mut rem: u16 = 0;
        for cnt in 0..16 {
            let word = prom[cnt >> 1];
            rem ^= if cnt % 2 == 1 { word & 0x00FF } else { word >> 8 };
            for _ in 0..8 {
                rem = if rem & 0x8000 != 0 {
                    (rem << 1) ^ 0x3000
                } else {
                    rem << 1
                };
            }
        }
        ((rem >> 12) & 0x000F) as u8
    }

    pub fn is_valid(&self) -> bool {
        self.crc4() == self.stored_crc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASHEET_PROM: [u16; 8] = [0x0000, 46372, 43981, 29059, 27842, 31553, 28165, 0x0008];

    #[test]
    fn ratio_bits_and_wait_follow_the_table() {
        let expected = [
            (OversamplingRatio::OSR256, 0x00, 900),
            (OversamplingRatio::OSR512, 0x02, 3_000),
            (OversamplingRatio::OSR1024, 0x04, 4_000),
            (OversamplingRatio::OSR2048, 0x06, 6_000),
            (OversamplingRatio::OSR4096, 0x08, 10_000),
        ];
        for (ratio, bits, wait) in expected {
            assert_eq!(ratio.value(), bits);
            assert_eq!(ratio.conversion_time_us(), wait);
        }
    }

    #[test]
    fn ratio_bits_and_wait_change_together() {
        for (i, a) in OversamplingRatio::ALL.iter().enumerate() {
            for b in &OversamplingRatio::ALL[i + 1..] {
                assert_ne!(a.value(), b.value());
                assert!(a.conversion_time_us() < b.conversion_time_us());
            }
        }
    }

    #[test]
    fn default_ratio_is_highest() {
        assert_eq!(OversamplingRatio::default(), OversamplingRatio::OSR4096);
    }

    #[test]
    fn coefficients_keep_prom_order() {
        let cal = Calibration::new(&[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(cal.sens_t1, 1);
        assert_eq!(cal.off_t1, 2);
        assert_eq!(cal.tcs, 3);
        assert_eq!(cal.tco, 4);
        assert_eq!(cal.t_ref, 5);
        assert_eq!(cal.temp_sens, 6);
        assert_eq!(cal.words(), [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn crc_accepts_consistent_prom() {
        let cal = Calibration::new(&DATASHEET_PROM);
        assert_eq!(cal.crc4(), 0x8);
        assert!(cal.is_valid());
    }

    #[test]
    fn crc_ignores_upper_bits_of_last_word_low_byte() {
        // Only the low nibble of PROM[7] carries the CRC; the rest of the
        // low byte is masked before computing it.
        let mut prom = DATASHEET_PROM;
        prom[7] = 0x00F8;
        assert_eq!(Calibration::new(&prom).crc4(), 0x8);
    }

    #[test]
    fn crc_rejects_corrupted_prom() {
        let cal = Calibration::new(&[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(cal.crc4(), 0x9);
        assert_eq!(cal.stored_crc(), 0x7);
        assert!(!cal.is_valid());

        let mut prom = DATASHEET_PROM;
        prom[3] ^= 0x0100;
        assert!(!Calibration::new(&prom).is_valid());
    }
}
