//! Driver error type.

/// Errors surfaced by codec operations.
///
/// `E` is the register store's transport error type; every store failure is
/// wrapped in [`CodecError::Transport`] and aborts the operation that hit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError<E> {
    /// A parameter has no hardware mapping: unsupported sample rate, BCLK
    /// ratio, PLL input frequency, or coefficient window size/address.
    /// Retrying with the same value cannot succeed.
    InvalidParameter,
    /// The hardware missed its deadline: the PLL did not report lock within
    /// the poll budget (the PLL is left enabled), or the coefficient port
    /// stayed busy past its bound.
    HardwareTimeout,
    /// A register read or write failed on the transport.
    Transport(E),
    /// An internal precondition did not hold; driver-side bug, not a
    /// hardware condition.
    InvariantViolation,
    /// The device ID readback matched no supported part.
    UnknownDevice {
        /// The 16-bit ID that was read back.
        id: u16,
    },
}

impl<E> From<E> for CodecError<E> {
    fn from(err: E) -> Self {
        Self::Transport(err)
    }
}

impl<E: core::fmt::Display> core::fmt::Display for CodecError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParameter => f.write_str("parameter has no hardware mapping"),
            Self::HardwareTimeout => f.write_str("hardware missed its deadline"),
            Self::Transport(err) => write!(f, "register transport failed: {err}"),
            Self::InvariantViolation => f.write_str("internal precondition violated"),
            Self::UnknownDevice { id } => write!(f, "unknown device id 0x{id:04X}"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for CodecError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(f, "parameter has no hardware mapping"),
            Self::HardwareTimeout => defmt::write!(f, "hardware missed its deadline"),
            Self::Transport(err) => defmt::write!(f, "register transport failed: {}", err),
            Self::InvariantViolation => defmt::write!(f, "internal precondition violated"),
            Self::UnknownDevice { id } => defmt::write!(f, "unknown device id {=u16:#06x}", id),
        }
    }
}
