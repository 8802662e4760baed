use crate::calibration::OversamplingRatio;

/// Device command bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Reset,
    /// PROM word index, 0..=7.
    ReadProm(u8),
    /// Start a pressure conversion.
    D1Conversion(OversamplingRatio),
    /// Start a temperature conversion.
    D2Conversion(OversamplingRatio),
    /// 24 bit result of the last conversion.
    ReadAdc,
}

impl Command {
    pub fn value(&self) -> u8 {
        match *self {
            Command::Reset => 0x1E,
            Command::ReadProm(index) => 0xA0 + ((index & 0x07) << 1),
            Command::D1Conversion(ratio) => 0x40 | ratio.value(),
            Command::D2Conversion(ratio) => 0x50 | ratio.value(),
            Command::ReadAdc => 0x00,
        }
    }
}
