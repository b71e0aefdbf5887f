//! Store-level errors.

/// Errors produced by register store implementations.
///
/// `E` is the transport's own error type (the I2C bus error for
/// [`I2cStore`](crate::I2cStore)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError<E> {
    /// The underlying bus transfer failed.
    Bus(E),
    /// The access starts or ends beyond the device's `max_register`.
    OutOfRange {
        /// Base register of the rejected access.
        reg: u8,
    },
}

impl<E> From<E> for StoreError<E> {
    fn from(err: E) -> Self {
        Self::Bus(err)
    }
}

impl<E: core::fmt::Display> core::fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "bus transfer failed: {err}"),
            Self::OutOfRange { reg } => write!(f, "register 0x{reg:02X} out of range"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for StoreError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(err) => defmt::write!(f, "bus transfer failed: {}", err),
            Self::OutOfRange { reg } => defmt::write!(f, "register {=u8:#04x} out of range", reg),
        }
    }
}
