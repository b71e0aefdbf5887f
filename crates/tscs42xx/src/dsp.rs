//! Named DSP control windows over the coefficient RAM.
//!
//! The effect chain (four biquad cascades, bass/treble enhancement, 3D, and
//! the three-band compressor) is programmed entirely through coefficient
//! windows. This table names each window and pins its base address and size
//! class; the control surface (`get`/`put` on the driver) consumes it. The
//! coefficient bytes themselves stay opaque to this crate.

use crate::coeff::WindowSize;

/// One addressable control window.
#[derive(Debug, Clone, Copy)]
pub struct ControlWindow {
    /// Control name as exposed to the host.
    pub name: &'static str,
    /// Base coefficient RAM address.
    pub addr: u8,
    /// Single coefficient or full biquad stage.
    pub size: WindowSize,
}

const fn biquad(name: &'static str, addr: u8) -> ControlWindow {
    ControlWindow {
        name,
        addr,
        size: WindowSize::Biquad,
    }
}

const fn single(name: &'static str, addr: u8) -> ControlWindow {
    ControlWindow {
        name,
        addr,
        size: WindowSize::Single,
    }
}

/// Every control window the DSP block exposes, in device documentation order.
/// The last biquad ends exactly at the top of the coefficient RAM.
pub const CONTROL_WINDOWS: &[ControlWindow] = &[
    biquad("Cascade1L BiQuad1", 0x00),
    biquad("Cascade1L BiQuad2", 0x05),
    biquad("Cascade1L BiQuad3", 0x0A),
    biquad("Cascade1L BiQuad4", 0x0F),
    biquad("Cascade1L BiQuad5", 0x14),
    biquad("Cascade1L BiQuad6", 0x19),
    biquad("Cascade1R BiQuad1", 0x20),
    biquad("Cascade1R BiQuad2", 0x25),
    biquad("Cascade1R BiQuad3", 0x2A),
    biquad("Cascade1R BiQuad4", 0x2F),
    biquad("Cascade1R BiQuad5", 0x34),
    biquad("Cascade1R BiQuad6", 0x39),
    single("Cascade1L Prescale", 0x1F),
    single("Cascade1R Prescale", 0x3F),
    biquad("Cascade2L BiQuad1", 0x40),
    biquad("Cascade2L BiQuad2", 0x45),
    biquad("Cascade2L BiQuad3", 0x4A),
    biquad("Cascade2L BiQuad4", 0x4F),
    biquad("Cascade2L BiQuad5", 0x54),
    biquad("Cascade2L BiQuad6", 0x59),
    biquad("Cascade2R BiQuad1", 0x60),
    biquad("Cascade2R BiQuad2", 0x65),
    biquad("Cascade2R BiQuad3", 0x6A),
    biquad("Cascade2R BiQuad4", 0x6F),
    biquad("Cascade2R BiQuad5", 0x74),
    biquad("Cascade2R BiQuad6", 0x79),
    single("Cascade2L Prescale", 0x5F),
    single("Cascade2R Prescale", 0x7F),
    biquad("Bass Extraction BiQuad1", 0x80),
    biquad("Bass Extraction BiQuad2", 0x85),
    single("Bass Non Linear Function 1", 0x8A),
    single("Bass Non Linear Function 2", 0x8B),
    biquad("Bass Limiter BiQuad", 0x8C),
    biquad("Bass Cut Off BiQuad", 0x91),
    single("Bass Mix", 0x96),
    biquad("Treb Extraction BiQuad1", 0x97),
    biquad("Treb Extraction BiQuad2", 0x9C),
    single("Treb Non Linear Function 1", 0xA1),
    single("Treb Non Linear Function 2", 0xA2),
    biquad("Treb Limiter BiQuad", 0xA3),
    biquad("Treb Cut Off BiQuad", 0xA8),
    single("Treb Mix", 0xAD),
    single("3D", 0xAE),
    single("3D Mix", 0xAF),
    biquad("MBC1 BiQuad1", 0xB0),
    biquad("MBC1 BiQuad2", 0xB5),
    biquad("MBC2 BiQuad1", 0xBA),
    biquad("MBC2 BiQuad2", 0xBF),
    biquad("MBC3 BiQuad1", 0xC4),
    biquad("MBC3 BiQuad2", 0xC9),
];

/// Look a window up by its control name.
pub fn find_window(name: &str) -> Option<&'static ControlWindow> {
    CONTROL_WINDOWS.iter().find(|w| w.name == name)
}
