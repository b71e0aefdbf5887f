//! Shadow memory for the DSP coefficient RAM.
//!
//! The device's coefficient RAM is reachable only through the write port and
//! only while a PLL is locked, so the driver keeps a full byte-for-byte
//! shadow here and tracks divergence with a single `synced` flag. Mutations
//! always land in the shadow first; hardware catches up at the next lock
//! event or through an opportunistic window flush.

/// Bytes per coefficient.
pub const COEFF_SIZE: usize = 3;
/// Coefficients per biquad stage.
pub const BIQUAD_COEFF_COUNT: usize = 5;
/// Bytes per biquad window.
pub const BIQUAD_SIZE: usize = COEFF_SIZE * BIQUAD_COEFF_COUNT;
/// Highest coefficient RAM address.
pub const COEFF_RAM_MAX_ADDR: u8 = 0xCD;
/// Number of coefficient addresses.
pub const COEFF_COUNT: usize = COEFF_RAM_MAX_ADDR as usize + 1;
/// Shadow buffer size in bytes.
pub const COEFF_RAM_SIZE: usize = COEFF_COUNT * COEFF_SIZE;

/// Unity gain in the device's fixed-point coefficient format, placed in the
/// last byte of a coefficient.
const NORMALIZATION_VALUE: u8 = 0x40;

/// Coefficient addresses whose power-on default is unity gain rather than
/// zero: the biquad normalization slots, prescales, and mixes.
pub const NORMALIZATION_ADDRS: [u8; 45] = [
    0x00, 0x05, 0x0A, 0x0F, 0x14, 0x19, 0x1F, 0x20, 0x25, 0x2A, 0x2F, 0x34, 0x39, 0x3F, 0x40,
    0x45, 0x4A, 0x4F, 0x54, 0x59, 0x5F, 0x60, 0x65, 0x6A, 0x6F, 0x74, 0x79, 0x7F, 0x80, 0x85,
    0x8C, 0x91, 0x96, 0x97, 0x9C, 0xA3, 0xA8, 0xAD, 0xAF, 0xB0, 0xB5, 0xBA, 0xBF, 0xC4, 0xC9,
];

/// Size classes of the addressable coefficient windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowSize {
    /// One coefficient, 3 bytes.
    Single,
    /// One biquad stage: five coefficients, 15 bytes.
    Biquad,
}

impl WindowSize {
    /// Payload length in bytes.
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Single => COEFF_SIZE,
            Self::Biquad => BIQUAD_SIZE,
        }
    }

    /// Number of coefficient addresses covered.
    pub const fn coeff_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Biquad => BIQUAD_COEFF_COUNT,
        }
    }

    /// Classify a payload length. Anything but 3 or 15 bytes is rejected.
    pub const fn from_byte_len(len: usize) -> Option<Self> {
        match len {
            COEFF_SIZE => Some(Self::Single),
            BIQUAD_SIZE => Some(Self::Biquad),
            _ => None,
        }
    }
}

/// The shadow buffer plus its dirty flag.
///
/// `synced == true` means the device RAM is byte-identical to the shadow.
/// The flag is cleared on any mutation and set again only by the driver
/// after a successful write-back.
#[derive(Debug)]
pub(crate) struct CoeffRam {
    data: [u8; COEFF_RAM_SIZE],
    synced: bool,
}

impl CoeffRam {
    /// Shadow preloaded with the power-on defaults, marked out of sync so the
    /// first lock event programs the device.
    pub(crate) fn new() -> Self {
        let mut ram = Self {
            data: [0; COEFF_RAM_SIZE],
            synced: false,
        };
        for addr in NORMALIZATION_ADDRS {
            if let Some(byte) = ram.byte_mut(addr, COEFF_SIZE - 1) {
                *byte = NORMALIZATION_VALUE;
            }
        }
        ram
    }

    fn offset(addr: u8, byte: usize) -> Option<usize> {
        usize::from(addr).checked_mul(COEFF_SIZE)?.checked_add(byte)
    }

    fn byte_mut(&mut self, addr: u8, byte: usize) -> Option<&mut u8> {
        let idx = Self::offset(addr, byte)?;
        self.data.get_mut(idx)
    }

    /// Whether a window of `size` starting at `addr` stays inside the RAM.
    pub(crate) fn window_in_range(addr: u8, size: WindowSize) -> bool {
        let last = usize::from(addr).checked_add(size.coeff_count().saturating_sub(1));
        last.is_some_and(|l| l <= usize::from(COEFF_RAM_MAX_ADDR))
    }

    /// Borrow a window's bytes.
    pub(crate) fn window(&self, addr: u8, size: WindowSize) -> Option<&[u8]> {
        if !Self::window_in_range(addr, size) {
            return None;
        }
        let start = Self::offset(addr, 0)?;
        let end = start.checked_add(size.byte_len())?;
        self.data.get(start..end)
    }

    /// Borrow a window's bytes mutably. The caller owns the dirty flag.
    pub(crate) fn window_mut(&mut self, addr: u8, size: WindowSize) -> Option<&mut [u8]> {
        if !Self::window_in_range(addr, size) {
            return None;
        }
        let start = Self::offset(addr, 0)?;
        let end = start.checked_add(size.byte_len())?;
        self.data.get_mut(start..end)
    }

    /// The 3 bytes of one coefficient, in write-port burst order.
    pub(crate) fn coeff(&self, addr: u8) -> Option<&[u8; COEFF_SIZE]> {
        let start = Self::offset(addr, 0)?;
        let end = start.checked_add(COEFF_SIZE)?;
        self.data.get(start..end)?.try_into().ok()
    }

    pub(crate) fn is_synced(&self) -> bool {
        self.synced
    }

    pub(crate) fn set_synced(&mut self, synced: bool) {
        self.synced = synced;
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )]

    use super::*;

    #[test]
    fn geometry() {
        assert_eq!(BIQUAD_SIZE, 15);
        assert_eq!(COEFF_COUNT, 0xCE);
        assert_eq!(COEFF_RAM_SIZE, 618);
        assert_eq!(NORMALIZATION_ADDRS.len(), 45);
    }

    /// Defaults: zeros everywhere except the last byte of each normalization
    /// coefficient, and the shadow starts out of sync.
    #[test]
    fn new_applies_normalization_defaults() {
        let ram = CoeffRam::new();
        assert!(!ram.is_synced());

        let first = ram.coeff(0x00).unwrap();
        assert_eq!(first, &[0x00, 0x00, 0x40]);

        // 0x01 is not a normalization slot.
        assert_eq!(ram.coeff(0x01).unwrap(), &[0x00, 0x00, 0x00]);

        for addr in NORMALIZATION_ADDRS {
            assert_eq!(ram.coeff(addr).unwrap()[COEFF_SIZE - 1], 0x40);
        }
    }

    #[test]
    fn window_bounds() {
        assert!(CoeffRam::window_in_range(0x00, WindowSize::Biquad));
        assert!(CoeffRam::window_in_range(0xC9, WindowSize::Biquad));
        assert!(CoeffRam::window_in_range(0xCD, WindowSize::Single));
        // 0xCA..=0xCE would run past the last address.
        assert!(!CoeffRam::window_in_range(0xCA, WindowSize::Biquad));
        assert!(!CoeffRam::window_in_range(0xCE, WindowSize::Single));

        let ram = CoeffRam::new();
        assert!(ram.window(0xCA, WindowSize::Biquad).is_none());
        assert_eq!(ram.window(0xC9, WindowSize::Biquad).unwrap().len(), 15);
    }

    #[test]
    fn size_classification() {
        assert_eq!(WindowSize::from_byte_len(3), Some(WindowSize::Single));
        assert_eq!(WindowSize::from_byte_len(15), Some(WindowSize::Biquad));
        assert_eq!(WindowSize::from_byte_len(0), None);
        assert_eq!(WindowSize::from_byte_len(6), None);
        assert_eq!(WindowSize::from_byte_len(618), None);
    }

    #[test]
    fn window_mut_roundtrip() {
        let mut ram = CoeffRam::new();
        let window = ram.window_mut(0x20, WindowSize::Biquad).unwrap();
        window.copy_from_slice(&[0xAB; 15]);
        assert_eq!(ram.window(0x20, WindowSize::Biquad).unwrap(), &[0xAB; 15]);
        // Neighbouring coefficients untouched.
        assert_eq!(ram.coeff(0x1F).unwrap()[2], 0x40);
        assert_eq!(ram.coeff(0x25).unwrap(), &[0x00, 0x00, 0x40]);
    }
}
