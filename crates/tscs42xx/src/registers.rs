//! TSCS42A1/A2 register map
//!
//! Source: Tempo Semiconductor TSCS42xx "Soul" series datasheet. Naming
//! follows the vendor convention: `R_*` register addresses, `RM_*` field
//! masks, `RV_*` field values (already shifted into field position, ready to
//! be OR'd together or passed to `update_bits`).
//!
//! # Key access constraints
//!
//! ## Coefficient port (0x2A–0x31)
//! DSP coefficients are not memory-mapped. They are moved through a port:
//! write the coefficient address to R_DACCRADDR, then the 3 data bytes to
//! R_DACCRWRL/M/H as one auto-increment burst. R_DACCRSTAT must read zero
//! before each transfer. The port hardware pops data on access, so the eight
//! port registers are volatile and the six data registers are additionally
//! precious: a stray cache-fill read would corrupt a transfer in flight.
//!
//! ## PLL lock status
//! R_PLLCTL0 reflects the analog lock detectors and changes without bus
//! writes; it must never be cached. A non-zero value means the active PLL
//! reports lock.

use regmap::AccessMap;

// ---------------------------------------------------------------------------
// Device identity and reset
// ---------------------------------------------------------------------------

/// Device ID, low byte.
pub const R_DEVIDL: u8 = 0x02;
/// Device ID, high byte.
pub const R_DEVIDH: u8 = 0x03;
/// Soft reset. Writing RV_RESET_ENABLE restores power-on register defaults.
pub const R_RESET: u8 = 0x04;
/// Trigger value for R_RESET.
pub const RV_RESET_ENABLE: u8 = 0x01;

/// Device ID readback for the TSCS42A1 part.
pub const DEVICE_ID_TSCS42A1: u16 = 0x4A74;
/// Device ID readback for the TSCS42A2 part.
pub const DEVICE_ID_TSCS42A2: u16 = 0x4A73;

/// Default 7-bit bus address of the part.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x69;

// ---------------------------------------------------------------------------
// Audio interface
// ---------------------------------------------------------------------------

/// Audio interface control 1: word length, master/slave.
pub const R_AIC1: u8 = 0x13;
/// Word-length field of R_AIC1.
pub const RM_AIC1_WL: u8 = 0x0C;
/// 16-bit words.
pub const RV_AIC1_WL_16: u8 = 0x00;
/// 20-bit words.
pub const RV_AIC1_WL_20: u8 = 0x04;
/// 24-bit words.
pub const RV_AIC1_WL_24: u8 = 0x08;
/// 32-bit words.
pub const RV_AIC1_WL_32: u8 = 0x0C;
/// Master/slave field of R_AIC1.
pub const RM_AIC1_MS: u8 = 0x20;
/// The codec drives BCLK and LRCLK (the only supported mode).
pub const RV_AIC1_MS_MASTER: u8 = 0x20;

/// Audio interface control 2: bit/frame clock sharing.
pub const R_AIC2: u8 = 0x14;
/// Bit/LR clock mode field of R_AIC2.
pub const RM_AIC2_BLRCM: u8 = 0xE0;
/// DAC and ADC share the DAC's BCLK and LRCLK (driver default).
pub const RV_AIC2_BLRCM_DAC_BCLK_LRCLK_SHARED: u8 = 0x40;

// ---------------------------------------------------------------------------
// Converters and sample-rate control
// ---------------------------------------------------------------------------

/// ADC converter control, including the ADC mute field.
pub const R_CNVRTR0: u8 = 0x16;
/// ADC mute field of R_CNVRTR0.
pub const RM_CNVRTR0_ADCMU: u8 = 0x04;
/// ADC mute asserted.
pub const RV_CNVRTR0_ADCMU_ENABLE: u8 = 0x04;
/// ADC mute released.
pub const RV_CNVRTR0_ADCMU_DISABLE: u8 = 0x00;

/// ADC sample-rate control.
pub const R_ADCSR: u8 = 0x17;

/// DAC converter control, including the DAC mute field.
pub const R_CNVRTR1: u8 = 0x18;
/// DAC mute field of R_CNVRTR1.
pub const RM_CNVRTR1_DACMU: u8 = 0x04;
/// DAC mute asserted.
pub const RV_CNVRTR1_DACMU_ENABLE: u8 = 0x04;
/// DAC mute released.
pub const RV_CNVRTR1_DACMU_DISABLE: u8 = 0x00;

/// DAC sample-rate control.
pub const R_DACSR: u8 = 0x19;

// R_DACSR and R_ADCSR carry the same field layout: base rate in bits [1:0],
// rate multiplier in bits [4:2], BCLK ratio in bits [6:5].

/// Base-rate field of R_DACSR.
pub const RM_DACSR_DBR: u8 = 0x03;
/// 32 kHz base rate.
pub const RV_DACSR_DBR_32: u8 = 0x00;
/// 44.1 kHz base rate.
pub const RV_DACSR_DBR_44_1: u8 = 0x01;
/// 48 kHz base rate.
pub const RV_DACSR_DBR_48: u8 = 0x02;
/// Rate-multiplier field of R_DACSR.
pub const RM_DACSR_DBM: u8 = 0x1C;
/// Base rate × 0.25.
pub const RV_DACSR_DBM_PT25: u8 = 0x00;
/// Base rate × 0.5.
pub const RV_DACSR_DBM_PT5: u8 = 0x04;
/// Base rate × 1.
pub const RV_DACSR_DBM_1: u8 = 0x08;
/// Base rate × 2.
pub const RV_DACSR_DBM_2: u8 = 0x0C;
/// BCLK-ratio field of R_DACSR.
pub const RM_DACSR_DBCM: u8 = 0x60;
/// 32 BCLKs per frame.
pub const RV_DACSR_DBCM_32: u8 = 0x00;
/// 40 BCLKs per frame.
pub const RV_DACSR_DBCM_40: u8 = 0x20;
/// 64 BCLKs per frame (power-on default applied by probe).
pub const RV_DACSR_DBCM_64: u8 = 0x40;

/// Base-rate field of R_ADCSR.
pub const RM_ADCSR_ABR: u8 = 0x03;
/// 32 kHz base rate.
pub const RV_ADCSR_ABR_32: u8 = 0x00;
/// 44.1 kHz base rate.
pub const RV_ADCSR_ABR_44_1: u8 = 0x01;
/// 48 kHz base rate.
pub const RV_ADCSR_ABR_48: u8 = 0x02;
/// Rate-multiplier field of R_ADCSR.
pub const RM_ADCSR_ABM: u8 = 0x1C;
/// Base rate × 0.25.
pub const RV_ADCSR_ABM_PT25: u8 = 0x00;
/// Base rate × 0.5.
pub const RV_ADCSR_ABM_PT5: u8 = 0x04;
/// Base rate × 1.
pub const RV_ADCSR_ABM_1: u8 = 0x08;
/// Base rate × 2.
pub const RV_ADCSR_ABM_2: u8 = 0x0C;
/// BCLK-ratio field of R_ADCSR.
pub const RM_ADCSR_ABCM: u8 = 0x60;
/// 32 BCLKs per frame.
pub const RV_ADCSR_ABCM_32: u8 = 0x00;
/// 40 BCLKs per frame.
pub const RV_ADCSR_ABCM_40: u8 = 0x20;
/// 64 BCLKs per frame (power-on default applied by probe).
pub const RV_ADCSR_ABCM_64: u8 = 0x40;

// ---------------------------------------------------------------------------
// DSP coefficient port
// ---------------------------------------------------------------------------

/// Coefficient write port, low byte. Base of the 3-byte auto-increment burst.
pub const R_DACCRWRL: u8 = 0x2A;
/// Coefficient write port, middle byte.
pub const R_DACCRWRM: u8 = 0x2B;
/// Coefficient write port, high byte.
pub const R_DACCRWRH: u8 = 0x2C;
/// Coefficient read port, low byte.
pub const R_DACCRRDL: u8 = 0x2D;
/// Coefficient read port, middle byte.
pub const R_DACCRRDM: u8 = 0x2E;
/// Coefficient read port, high byte.
pub const R_DACCRRDH: u8 = 0x2F;
/// Coefficient RAM address latch for the next port transfer.
pub const R_DACCRADDR: u8 = 0x30;
/// Coefficient port status. Non-zero while a transfer is in flight.
pub const R_DACCRSTAT: u8 = 0x31;

// ---------------------------------------------------------------------------
// Timebase and PLL block
// ---------------------------------------------------------------------------

/// Timebase divider (input-frequency dependent, see the pll module table).
pub const R_TIMEBASE: u8 = 0x32;

/// PLL lock status. Non-zero = the active PLL reports lock. Volatile.
pub const R_PLLCTL0: u8 = 0x38;
/// PLL1 lock detector bit of R_PLLCTL0.
pub const RM_PLLCTL0_PLL1_LOCK: u8 = 0x01;
/// PLL2 lock detector bit of R_PLLCTL0.
pub const RM_PLLCTL0_PLL2_LOCK: u8 = 0x02;

/// PLL divider control 9.
pub const R_PLLCTL9: u8 = 0x41;
/// PLL divider control A.
pub const R_PLLCTLA: u8 = 0x42;
/// PLL divider control B.
pub const R_PLLCTLB: u8 = 0x43;
/// PLL divider control C.
pub const R_PLLCTLC: u8 = 0x44;
/// PLL divider control D.
pub const R_PLLCTLD: u8 = 0x45;
/// PLL divider control E.
pub const R_PLLCTLE: u8 = 0x46;
/// PLL divider control F.
pub const R_PLLCTLF: u8 = 0x47;
/// PLL divider control 10.
pub const R_PLLCTL10: u8 = 0x48;
/// PLL divider control 11.
pub const R_PLLCTL11: u8 = 0x49;
/// PLL divider control 12.
pub const R_PLLCTL12: u8 = 0x4A;
/// PLL divider control 1B. Low and high nibbles are programmed separately.
pub const R_PLLCTL1B: u8 = 0x53;
/// PLL power control.
pub const R_PLLCTL1C: u8 = 0x54;
/// PLL1 power-down-bar field of R_PLLCTL1C.
pub const RM_PLLCTL1C_PDB_PLL1: u8 = 0x04;
/// PLL1 running.
pub const RV_PLLCTL1C_PDB_PLL1_ENABLE: u8 = 0x04;
/// PLL1 powered down.
pub const RV_PLLCTL1C_PDB_PLL1_DISABLE: u8 = 0x00;
/// PLL2 power-down-bar field of R_PLLCTL1C.
pub const RM_PLLCTL1C_PDB_PLL2: u8 = 0x08;
/// PLL2 running.
pub const RV_PLLCTL1C_PDB_PLL2_ENABLE: u8 = 0x08;
/// PLL2 powered down.
pub const RV_PLLCTL1C_PDB_PLL2_DISABLE: u8 = 0x00;

/// PLL reference-clock select. Both PLL nibbles are written in one go.
pub const R_PLLREFSEL: u8 = 0x55;
/// PLL1 reference = XTAL/MCLK1 pin (low nibble).
pub const RV_PLLREFSEL_PLL1_XTAL_MCLK1: u8 = 0x00;
/// PLL1 reference = MCLK2 pin (low nibble).
pub const RV_PLLREFSEL_PLL1_MCLK2: u8 = 0x01;
/// PLL2 reference = XTAL/MCLK1 pin (high nibble).
pub const RV_PLLREFSEL_PLL2_XTAL_MCLK1: u8 = 0x00;
/// PLL2 reference = MCLK2 pin (high nibble).
pub const RV_PLLREFSEL_PLL2_MCLK2: u8 = 0x10;

/// Highest implemented register (end of the MBC block).
pub const MAX_REGISTER: u8 = 0x7F;

// ---------------------------------------------------------------------------
// Access annotations
// ---------------------------------------------------------------------------

/// Registers hardware changes behind the driver's back.
pub const fn is_volatile(reg: u8) -> bool {
    matches!(
        reg,
        R_DACCRWRL..=R_DACCRRDH | R_DACCRADDR | R_DACCRSTAT | R_PLLCTL0
    )
}

/// Registers a read of which disturbs hardware state (coefficient port pops
/// data on access).
pub const fn is_precious(reg: u8) -> bool {
    matches!(reg, R_DACCRWRL..=R_DACCRRDH)
}

/// Access map handed to the register store.
pub const ACCESS: AccessMap = AccessMap {
    max_register: MAX_REGISTER,
    volatile: is_volatile,
    precious: is_precious,
};
