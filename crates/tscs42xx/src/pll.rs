//! PLL selection and input-clock programming tables.
//!
//! The part carries two audio PLLs with fixed output frequencies, one per
//! sample-rate family: PLL1 at 122.88 MHz feeds the 8/16/32/48/96 kHz rates,
//! PLL2 at 112.896 MHz feeds 11.025/22.05/44.1/88.2 kHz. Divider programming
//! depends only on the reference input frequency and is table-driven; each
//! supported input maps to thirteen masked register writes applied in a
//! fixed order.

use crate::registers::{
    R_PLLCTL10, R_PLLCTL11, R_PLLCTL12, R_PLLCTL1B, R_PLLCTL9, R_PLLCTLA, R_PLLCTLB, R_PLLCTLC,
    R_PLLCTLD, R_PLLCTLE, R_PLLCTLF, R_TIMEBASE, RM_PLLCTL1C_PDB_PLL1, RM_PLLCTL1C_PDB_PLL2,
    RV_PLLCTL1C_PDB_PLL1_ENABLE, RV_PLLCTL1C_PDB_PLL2_ENABLE,
};

/// Which of the two audio PLLs serves a sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSelect {
    /// 122.88 MHz output, 8/16/32/48/96 kHz family.
    Pll1,
    /// 112.896 MHz output, 11.025/22.05/44.1/88.2 kHz family.
    Pll2,
}

impl PllSelect {
    /// PLL for `sample_rate`, or `None` when neither family covers it.
    ///
    /// 24 kHz is deliberately absent: the rate is configurable on the serial
    /// interface but has no PLL mapping in the part.
    pub const fn for_sample_rate(sample_rate: u32) -> Option<Self> {
        match sample_rate {
            8_000 | 16_000 | 32_000 | 48_000 | 96_000 => Some(Self::Pll1),
            11_025 | 22_050 | 44_100 | 88_200 => Some(Self::Pll2),
            _ => None,
        }
    }

    /// Output frequency in Hz.
    pub const fn freq_out(self) -> u32 {
        match self {
            Self::Pll1 => 122_880_000,
            Self::Pll2 => 112_896_000,
        }
    }

    /// Power-down-bar field of R_PLLCTL1C.
    pub(crate) const fn power_mask(self) -> u8 {
        match self {
            Self::Pll1 => RM_PLLCTL1C_PDB_PLL1,
            Self::Pll2 => RM_PLLCTL1C_PDB_PLL2,
        }
    }

    /// Field value that powers this PLL up.
    pub(crate) const fn power_enable(self) -> u8 {
        match self {
            Self::Pll1 => RV_PLLCTL1C_PDB_PLL1_ENABLE,
            Self::Pll2 => RV_PLLCTL1C_PDB_PLL2_ENABLE,
        }
    }
}

/// One masked register write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegSetting {
    pub reg: u8,
    pub mask: u8,
    pub val: u8,
}

/// Number of register writes programming the dividers for one input.
pub(crate) const PLL_REG_SETTINGS_COUNT: usize = 13;

/// Divider programming for one supported reference input frequency.
pub(crate) struct PllCtl {
    pub input_freq: u32,
    pub settings: [RegSetting; PLL_REG_SETTINGS_COUNT],
}

/// Builds one table row. The settings order is fixed: timebase first, the
/// two nibbles of R_PLLCTL1B programmed separately.
#[allow(clippy::too_many_arguments)]
const fn pll_ctl(
    input_freq: u32,
    rt: u8,
    rd: u8,
    r1b_l: u8,
    r9: u8,
    ra: u8,
    rb: u8,
    rc: u8,
    r12: u8,
    r1b_h: u8,
    re: u8,
    rf: u8,
    r10: u8,
    r11: u8,
) -> PllCtl {
    PllCtl {
        input_freq,
        settings: [
            RegSetting { reg: R_TIMEBASE, mask: 0xFF, val: rt },
            RegSetting { reg: R_PLLCTLD, mask: 0xFF, val: rd },
            RegSetting { reg: R_PLLCTL1B, mask: 0x0F, val: r1b_l },
            RegSetting { reg: R_PLLCTL9, mask: 0xFF, val: r9 },
            RegSetting { reg: R_PLLCTLA, mask: 0xFF, val: ra },
            RegSetting { reg: R_PLLCTLB, mask: 0xFF, val: rb },
            RegSetting { reg: R_PLLCTLC, mask: 0xFF, val: rc },
            RegSetting { reg: R_PLLCTL12, mask: 0xFF, val: r12 },
            RegSetting { reg: R_PLLCTL1B, mask: 0xF0, val: r1b_h },
            RegSetting { reg: R_PLLCTLE, mask: 0xFF, val: re },
            RegSetting { reg: R_PLLCTLF, mask: 0xFF, val: rf },
            RegSetting { reg: R_PLLCTL10, mask: 0xFF, val: r10 },
            RegSetting { reg: R_PLLCTL11, mask: 0xFF, val: r11 },
        ],
    }
}

/// Divider programming for every supported reference input.
#[rustfmt::skip]
pub(crate) static PLL_CTLS: [PllCtl; 23] = [
    pll_ctl(1_411_200,  0x05, 0x39, 0x04, 0x07, 0x02, 0xC3, 0x04, 0x1B, 0x10, 0x03, 0x03, 0xD0, 0x02),
    pll_ctl(1_536_000,  0x05, 0x1A, 0x04, 0x02, 0x03, 0xE0, 0x01, 0x1A, 0x10, 0x02, 0x03, 0xB9, 0x01),
    pll_ctl(2_822_400,  0x0A, 0x23, 0x04, 0x07, 0x04, 0xC3, 0x04, 0x22, 0x10, 0x05, 0x03, 0x58, 0x02),
    pll_ctl(3_072_000,  0x0B, 0x22, 0x04, 0x07, 0x03, 0x48, 0x03, 0x1A, 0x10, 0x04, 0x03, 0xB9, 0x01),
    pll_ctl(5_644_800,  0x15, 0x23, 0x04, 0x0E, 0x04, 0xC3, 0x04, 0x1A, 0x10, 0x08, 0x03, 0xE0, 0x01),
    pll_ctl(6_144_000,  0x17, 0x1A, 0x04, 0x08, 0x03, 0xE0, 0x01, 0x1A, 0x10, 0x08, 0x03, 0xB9, 0x01),
    pll_ctl(12_000_000, 0x2E, 0x1B, 0x04, 0x19, 0x03, 0x00, 0x03, 0x2A, 0x10, 0x19, 0x05, 0x98, 0x04),
    pll_ctl(19_200_000, 0x4A, 0x13, 0x04, 0x14, 0x03, 0x80, 0x01, 0x1A, 0x10, 0x19, 0x03, 0xB9, 0x01),
    pll_ctl(22_000_000, 0x55, 0x2A, 0x04, 0x37, 0x05, 0x00, 0x06, 0x22, 0x10, 0x26, 0x03, 0x49, 0x02),
    pll_ctl(22_579_200, 0x57, 0x22, 0x04, 0x31, 0x03, 0x20, 0x03, 0x1A, 0x10, 0x1D, 0x03, 0xB3, 0x01),
    pll_ctl(24_000_000, 0x5D, 0x13, 0x04, 0x19, 0x03, 0x80, 0x01, 0x1B, 0x10, 0x19, 0x05, 0x4C, 0x02),
    pll_ctl(24_576_000, 0x5F, 0x13, 0x04, 0x1D, 0x03, 0xB3, 0x01, 0x22, 0x10, 0x40, 0x03, 0x72, 0x03),
    pll_ctl(27_000_000, 0x68, 0x22, 0x04, 0x4B, 0x03, 0x00, 0x04, 0x2A, 0x10, 0x7D, 0x03, 0x20, 0x06),
    pll_ctl(36_000_000, 0x8C, 0x1B, 0x04, 0x4B, 0x03, 0x00, 0x03, 0x2A, 0x10, 0x7D, 0x03, 0x98, 0x04),
    pll_ctl(25_000_000, 0x61, 0x1B, 0x04, 0x37, 0x03, 0x2B, 0x03, 0x1A, 0x10, 0x2A, 0x03, 0x39, 0x02),
    pll_ctl(26_000_000, 0x65, 0x23, 0x04, 0x41, 0x05, 0x00, 0x06, 0x1A, 0x10, 0x26, 0x03, 0xEF, 0x01),
    pll_ctl(12_288_000, 0x2F, 0x1A, 0x04, 0x12, 0x03, 0x1C, 0x02, 0x22, 0x10, 0x20, 0x03, 0x72, 0x03),
    pll_ctl(40_000_000, 0x9B, 0x22, 0x08, 0x7D, 0x03, 0x80, 0x04, 0x23, 0x10, 0x7D, 0x05, 0xE4, 0x06),
    pll_ctl(512_000,    0x01, 0x22, 0x04, 0x01, 0x03, 0xD0, 0x02, 0x1B, 0x10, 0x01, 0x04, 0x72, 0x03),
    pll_ctl(705_600,    0x02, 0x22, 0x04, 0x02, 0x03, 0x15, 0x04, 0x22, 0x10, 0x01, 0x04, 0x80, 0x02),
    pll_ctl(1_024_000,  0x03, 0x22, 0x04, 0x02, 0x03, 0xD0, 0x02, 0x1B, 0x10, 0x02, 0x04, 0x72, 0x03),
    pll_ctl(2_048_000,  0x07, 0x22, 0x04, 0x04, 0x03, 0xD0, 0x02, 0x1B, 0x10, 0x04, 0x04, 0x72, 0x03),
    pll_ctl(2_400_000,  0x08, 0x22, 0x04, 0x05, 0x03, 0x00, 0x03, 0x23, 0x10, 0x05, 0x05, 0x98, 0x04),
];

/// Look up the divider programming for a reference input frequency.
pub(crate) fn find_pll_ctl(input_freq: u32) -> Option<&'static PllCtl> {
    PLL_CTLS.iter().find(|ctl| ctl.input_freq == input_freq)
}
