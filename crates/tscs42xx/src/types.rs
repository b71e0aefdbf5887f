//! Stream parameter types shared across the driver surface.

use crate::registers::{
    RV_AIC1_WL_16, RV_AIC1_WL_20, RV_AIC1_WL_24, RV_AIC1_WL_32, RV_PLLREFSEL_PLL1_MCLK2,
    RV_PLLREFSEL_PLL1_XTAL_MCLK1, RV_PLLREFSEL_PLL2_MCLK2, RV_PLLREFSEL_PLL2_XTAL_MCLK1,
};

/// Audio word length on the serial interface.
///
/// The interface negotiation that could produce an unsupported width lives
/// outside this crate; by the time a width reaches the driver it is one of
/// the four the part implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWidth {
    /// 16-bit words.
    W16,
    /// 20-bit words.
    W20,
    /// 24-bit words.
    W24,
    /// 32-bit words.
    W32,
}

impl SampleWidth {
    /// Word-length field value for R_AIC1.
    pub(crate) const fn aic1_wl(self) -> u8 {
        match self {
            Self::W16 => RV_AIC1_WL_16,
            Self::W20 => RV_AIC1_WL_20,
            Self::W24 => RV_AIC1_WL_24,
            Self::W32 => RV_AIC1_WL_32,
        }
    }
}

/// Stream direction: playback runs through the DAC, capture through the ADC.
///
/// Mute and power sequencing track each direction independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamDirection {
    /// DAC path.
    Playback,
    /// ADC path.
    Capture,
}

/// Reference-clock input feeding the PLLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysclkSource {
    /// Crystal on the XTAL/MCLK1 pin.
    Xtal,
    /// External master clock on the XTAL/MCLK1 pin.
    Mclk1,
    /// External master clock on the MCLK2 pin.
    Mclk2,
}

impl SysclkSource {
    /// R_PLLREFSEL value selecting this source for both PLLs at once.
    ///
    /// XTAL and MCLK1 share a pin and therefore an encoding.
    pub(crate) const fn pllrefsel(self) -> u8 {
        match self {
            Self::Xtal | Self::Mclk1 => {
                RV_PLLREFSEL_PLL1_XTAL_MCLK1 | RV_PLLREFSEL_PLL2_XTAL_MCLK1
            }
            Self::Mclk2 => RV_PLLREFSEL_PLL1_MCLK2 | RV_PLLREFSEL_PLL2_MCLK2,
        }
    }
}

/// Parameters negotiated by the stream hooks, guarded by the driver's
/// audio-params lock.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AudioParams {
    /// Negotiated sample rate in Hz. Zero until the first `on_hw_params`.
    pub sample_rate: u32,
    /// Negotiated BCLK/LRCLK ratio. Zero until the first `on_set_bclk_ratio`.
    pub bclk_ratio: u32,
}
