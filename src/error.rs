use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// The bus transfer failed (device absent, NACK, arbitration loss, ...).
    Io(E),
    /// The PROM CRC-4 does not match the coefficients that were read.
    InvalidCrc { stored: u8, computed: u8 },
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Io(e) => write!(f, "i2c transfer failed: {e:?}"),
            DeviceError::InvalidCrc { stored, computed } => write!(
                f,
                "bad calibration data: PROM crc {stored:#x}, computed {computed:#x}"
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DeviceError<E> {}
