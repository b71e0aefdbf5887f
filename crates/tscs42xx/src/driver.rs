//! The codec driver: PLL power sequencing, coefficient synchronization,
//! mute orchestration and the stream-facing hooks.
//!
//! All methods take `&self`. Internal state lives behind three async
//! mutexes with a strict acquisition order (coefficient lock before the
//! PLL-transition lock, the audio-parameter lock never nested inside
//! either), so concurrent control writes and stream callbacks cannot
//! deadlock or observe a half-programmed part.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use heapless::Vec;
use regmap::RegisterStore;

use crate::coeff::{CoeffRam, WindowSize, BIQUAD_SIZE, COEFF_RAM_MAX_ADDR, COEFF_SIZE};
use crate::dsp::ControlWindow;
use crate::error::CodecError;
use crate::pll::{find_pll_ctl, PllSelect};
use crate::registers::{
    DEVICE_ID_TSCS42A1, DEVICE_ID_TSCS42A2, R_ADCSR, R_AIC1, R_AIC2, R_CNVRTR0, R_CNVRTR1,
    R_DACCRADDR, R_DACCRSTAT, R_DACCRWRL, R_DACSR, R_DEVIDH, R_DEVIDL, R_PLLCTL0, R_PLLCTL1C,
    R_PLLREFSEL, R_RESET, RM_ADCSR_ABCM, RM_ADCSR_ABM, RM_ADCSR_ABR, RM_AIC1_MS, RM_AIC1_WL,
    RM_CNVRTR0_ADCMU, RM_CNVRTR1_DACMU, RM_DACSR_DBCM, RM_DACSR_DBM, RM_DACSR_DBR,
    RM_PLLCTL1C_PDB_PLL1, RM_PLLCTL1C_PDB_PLL2, RV_ADCSR_ABCM_64, RV_AIC1_MS_MASTER,
    RV_AIC2_BLRCM_DAC_BCLK_LRCLK_SHARED, RV_CNVRTR0_ADCMU_DISABLE, RV_CNVRTR0_ADCMU_ENABLE,
    RV_CNVRTR1_DACMU_DISABLE, RV_CNVRTR1_DACMU_ENABLE, RV_DACSR_DBCM_32, RV_DACSR_DBCM_40,
    RV_DACSR_DBCM_64, RV_DACSR_DBM_1, RV_DACSR_DBM_2, RV_DACSR_DBM_PT25, RV_DACSR_DBM_PT5,
    RV_DACSR_DBR_32, RV_DACSR_DBR_44_1, RV_DACSR_DBR_48, RV_PLLCTL1C_PDB_PLL1_DISABLE,
    RV_PLLCTL1C_PDB_PLL2_DISABLE, RV_RESET_ENABLE,
};
use crate::types::{AudioParams, SampleWidth, StreamDirection, SysclkSource};

/// Milliseconds between PLL lock-status reads.
pub const PLL_LOCK_POLL_INTERVAL_MS: u64 = 20;

/// Additional lock-status reads after the initial one.
pub const MAX_PLL_LOCK_WAITS: u32 = 1;

/// Busy polls of the coefficient port before declaring the part wedged.
pub const COEFF_BUSY_POLL_BUDGET: u32 = 100;

/// TSCS42A1/A2 codec driver over a shared register store.
///
/// The store is typically a [`regmap::I2cStore`]; tests hand in a
/// [`regmap::MockStore`] reference instead. The driver never assumes
/// exclusive bus ownership and performs no traffic at construction.
pub struct Tscs42xx<S: RegisterStore> {
    store: S,
    audio_params: Mutex<CriticalSectionRawMutex, AudioParams>,
    coeff_ram: Mutex<CriticalSectionRawMutex, CoeffRam>,
    pll_transition: Mutex<CriticalSectionRawMutex, ()>,
}

impl<S: RegisterStore> Tscs42xx<S> {
    /// Wraps a register store. No bus traffic happens until [`probe`].
    ///
    /// [`probe`]: Self::probe
    pub fn new(store: S) -> Self {
        Self {
            store,
            audio_params: Mutex::new(AudioParams::default()),
            coeff_ram: Mutex::new(CoeffRam::new()),
            pll_transition: Mutex::new(()),
        }
    }

    /// The underlying register store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Bring-up ──────────────────────────────────────────────────────────

    /// Verifies the device ID, soft-resets the part and applies the driver
    /// register defaults.
    ///
    /// Both the TSCS42A1 and the TSCS42A2 are accepted; anything else fails
    /// with [`CodecError::UnknownDevice`] before any write reaches the bus.
    pub async fn probe(&self) -> Result<(), CodecError<S::Error>> {
        let high = self.store.read(R_DEVIDH).await?;
        let low = self.store.read(R_DEVIDL).await?;
        let id = u16::from_be_bytes([high, low]);
        if id != DEVICE_ID_TSCS42A1 && id != DEVICE_ID_TSCS42A2 {
            #[cfg(feature = "defmt")]
            defmt::error!("unrecognized device id {=u16:#06x}", id);
            return Err(CodecError::UnknownDevice { id });
        }

        self.store.write(R_RESET, RV_RESET_ENABLE).await?;

        // Defaults the part does not reset to: 64-bit frames on both
        // converters, bit and frame clocks shared between DAC and ADC.
        self.store.write(R_ADCSR, RV_ADCSR_ABCM_64).await?;
        self.store.write(R_DACSR, RV_DACSR_DBCM_64).await?;
        self.store
            .write(R_AIC2, RV_AIC2_BLRCM_DAC_BCLK_LRCLK_SHARED)
            .await?;
        Ok(())
    }

    /// Puts the audio interface in master mode, the only mode the part
    /// supports as clock source for the serial bus.
    pub async fn set_master(&self) -> Result<(), CodecError<S::Error>> {
        self.store
            .update_bits(R_AIC1, RM_AIC1_MS, RV_AIC1_MS_MASTER)
            .await?;
        Ok(())
    }

    // ── PLL power ─────────────────────────────────────────────────────────

    /// One live reading of the lock detectors. Any set bit counts: the part
    /// reports per-PLL lock and only the powered PLL matters.
    async fn pll_locked_now(&self) -> Result<bool, CodecError<S::Error>> {
        let stat = self.store.read(R_PLLCTL0).await?;
        Ok(stat != 0)
    }

    /// Polls for lock, sleeping [`PLL_LOCK_POLL_INTERVAL_MS`] between reads.
    async fn wait_for_pll_lock(&self) -> Result<bool, CodecError<S::Error>> {
        let mut remaining = MAX_PLL_LOCK_WAITS;
        loop {
            if self.pll_locked_now().await? {
                return Ok(true);
            }
            if remaining == 0 {
                return Ok(false);
            }
            remaining = remaining.saturating_sub(1);
            Timer::after_millis(PLL_LOCK_POLL_INTERVAL_MS).await;
        }
    }

    /// Powers up the PLL serving `sample_rate`, waits for lock and flushes
    /// the coefficient shadow if it has diverged from the hardware.
    ///
    /// On [`CodecError::HardwareTimeout`] the PLL is left enabled so a
    /// caller can retry or inspect the part; [`power_down`] reverses it.
    ///
    /// [`power_down`]: Self::power_down
    pub async fn power_up(&self, sample_rate: u32) -> Result<(), CodecError<S::Error>> {
        let pll = match PllSelect::for_sample_rate(sample_rate) {
            Some(pll) => pll,
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!("no pll serves sample rate {=u32}", sample_rate);
                return Err(CodecError::InvalidParameter);
            }
        };

        let mut ram = self.coeff_ram.lock().await;
        let _pll_section = self.pll_transition.lock().await;

        self.store
            .update_bits(R_PLLCTL1C, pll.power_mask(), pll.power_enable())
            .await?;
        if !self.wait_for_pll_lock().await? {
            #[cfg(feature = "defmt")]
            defmt::warn!("pll failed to report lock");
            return Err(CodecError::HardwareTimeout);
        }
        self.sync_all(&mut ram).await
    }

    /// Powers both PLLs down. Idempotent.
    pub async fn power_down(&self) -> Result<(), CodecError<S::Error>> {
        let _pll_section = self.pll_transition.lock().await;
        self.store
            .update_bits(
                R_PLLCTL1C,
                RM_PLLCTL1C_PDB_PLL1,
                RV_PLLCTL1C_PDB_PLL1_DISABLE,
            )
            .await?;
        self.store
            .update_bits(
                R_PLLCTL1C,
                RM_PLLCTL1C_PDB_PLL2,
                RV_PLLCTL1C_PDB_PLL2_DISABLE,
            )
            .await?;
        Ok(())
    }

    // ── Coefficient synchronizer ──────────────────────────────────────────

    /// Pushes one coefficient through the write port: wait for the port to
    /// go idle, latch the address, then the three data bytes.
    async fn write_coefficient(
        &self,
        addr: u8,
        bytes: &[u8; COEFF_SIZE],
    ) -> Result<(), CodecError<S::Error>> {
        let mut polls: u32 = 0;
        while self.store.read(R_DACCRSTAT).await? != 0 {
            polls = polls.saturating_add(1);
            if polls >= COEFF_BUSY_POLL_BUDGET {
                #[cfg(feature = "defmt")]
                defmt::warn!("coefficient port stuck busy at addr {=u8:#04x}", addr);
                return Err(CodecError::HardwareTimeout);
            }
        }
        self.store.write(R_DACCRADDR, addr).await?;
        self.store.bulk_write(R_DACCRWRL, bytes).await?;
        Ok(())
    }

    /// Flushes the whole shadow in ascending address order if it has
    /// diverged. The caller holds the coefficient lock and has confirmed
    /// PLL lock.
    async fn sync_all(&self, ram: &mut CoeffRam) -> Result<(), CodecError<S::Error>> {
        if ram.is_synced() {
            return Ok(());
        }
        for addr in 0..=COEFF_RAM_MAX_ADDR {
            let bytes = ram.coeff(addr).ok_or(CodecError::InvariantViolation)?;
            self.write_coefficient(addr, bytes).await?;
        }
        ram.set_synced(true);
        #[cfg(feature = "defmt")]
        defmt::debug!("coefficient ram synchronized");
        Ok(())
    }

    /// Opportunistic write-through of one region, only if the PLL reports
    /// lock right now. Returns whether the region reached the device; a
    /// skipped region is flushed at the next lock event.
    async fn write_region(
        &self,
        ram: &mut CoeffRam,
        addr: u8,
        size: WindowSize,
    ) -> Result<bool, CodecError<S::Error>> {
        if !CoeffRam::window_in_range(addr, size) {
            return Err(CodecError::InvariantViolation);
        }
        let _pll_section = self.pll_transition.lock().await;
        if !self.pll_locked_now().await? {
            return Ok(false);
        }
        let mut cur = addr;
        for _ in 0..size.coeff_count() {
            let bytes = ram.coeff(cur).ok_or(CodecError::InvariantViolation)?;
            self.write_coefficient(cur, bytes).await?;
            cur = cur.wrapping_add(1);
        }
        // Every other region was drained by the flush at the last lock
        // event, so this window was the only divergence.
        ram.set_synced(true);
        Ok(true)
    }

    // ── Control surface ───────────────────────────────────────────────────

    /// Copies a coefficient window out of the shadow. Never touches the
    /// bus, so reads work with the PLLs down.
    pub async fn get_coeff(
        &self,
        addr: u8,
        size: WindowSize,
    ) -> Result<Vec<u8, BIQUAD_SIZE>, CodecError<S::Error>> {
        let ram = self.coeff_ram.lock().await;
        let window = ram.window(addr, size).ok_or(CodecError::InvalidParameter)?;
        let mut out = Vec::new();
        out.extend_from_slice(window)
            .map_err(|_| CodecError::InvariantViolation)?;
        Ok(out)
    }

    /// Writes a coefficient window into the shadow and pushes it to the
    /// hardware when possible.
    ///
    /// The window size comes from `bytes.len()`: 3 bytes for a single
    /// coefficient, 15 for a biquad. Success means the shadow holds the
    /// new value. If a PLL is locked the window is also written through
    /// immediately; a transport failure there is logged and deferred, and
    /// the shadow stays marked out of sync until the next lock event.
    pub async fn put_coeff(&self, addr: u8, bytes: &[u8]) -> Result<(), CodecError<S::Error>> {
        let size = WindowSize::from_byte_len(bytes.len()).ok_or(CodecError::InvalidParameter)?;
        if !CoeffRam::window_in_range(addr, size) {
            return Err(CodecError::InvalidParameter);
        }

        let mut ram = self.coeff_ram.lock().await;
        ram.set_synced(false);
        let window = ram
            .window_mut(addr, size)
            .ok_or(CodecError::InvalidParameter)?;
        window.copy_from_slice(bytes);

        if let Err(_err) = self.write_region(&mut ram, addr, size).await {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "write-through of window {=u8:#04x} failed, deferred to next lock",
                addr
            );
        }
        Ok(())
    }

    /// [`get_coeff`] addressed by a named control window.
    ///
    /// [`get_coeff`]: Self::get_coeff
    pub async fn get_control(
        &self,
        window: &ControlWindow,
    ) -> Result<Vec<u8, BIQUAD_SIZE>, CodecError<S::Error>> {
        self.get_coeff(window.addr, window.size).await
    }

    /// [`put_coeff`] addressed by a named control window.
    ///
    /// [`put_coeff`]: Self::put_coeff
    pub async fn put_control(
        &self,
        window: &ControlWindow,
        bytes: &[u8],
    ) -> Result<(), CodecError<S::Error>> {
        self.put_coeff(window.addr, bytes).await
    }

    // ── Mute orchestration ────────────────────────────────────────────────

    /// Mute hook for one stream direction. `mute == false` powers the PLL
    /// back up before unmuting.
    pub async fn on_mute(
        &self,
        direction: StreamDirection,
        mute: bool,
    ) -> Result<(), CodecError<S::Error>> {
        if mute {
            self.mute_direction(direction).await
        } else {
            self.unmute_direction(direction).await
        }
    }

    async fn mute_direction(
        &self,
        direction: StreamDirection,
    ) -> Result<(), CodecError<S::Error>> {
        let (reg, mask, enable) = match direction {
            StreamDirection::Playback => (R_CNVRTR1, RM_CNVRTR1_DACMU, RV_CNVRTR1_DACMU_ENABLE),
            StreamDirection::Capture => (R_CNVRTR0, RM_CNVRTR0_ADCMU, RV_CNVRTR0_ADCMU_ENABLE),
        };
        // Converter first: a failed mute write must leave the PLLs running.
        self.store.update_bits(reg, mask, enable).await?;
        self.power_down().await
    }

    async fn unmute_direction(
        &self,
        direction: StreamDirection,
    ) -> Result<(), CodecError<S::Error>> {
        let (reg, mask, disable) = match direction {
            StreamDirection::Playback => (R_CNVRTR1, RM_CNVRTR1_DACMU, RV_CNVRTR1_DACMU_DISABLE),
            StreamDirection::Capture => (R_CNVRTR0, RM_CNVRTR0_ADCMU, RV_CNVRTR0_ADCMU_DISABLE),
        };
        let sample_rate = self.audio_params.lock().await.sample_rate;
        self.power_up(sample_rate).await?;
        if let Err(err) = self.store.update_bits(reg, mask, disable).await {
            // A failed unmute must not leave the PLLs running.
            #[cfg(feature = "defmt")]
            defmt::error!("unmute failed, powering plls back down");
            let _ = self.power_down().await;
            return Err(err.into());
        }
        Ok(())
    }

    // ── Stream hooks ──────────────────────────────────────────────────────

    /// hw_params hook: programs the word length and the sample rate, then
    /// records the rate for the next power-up.
    pub async fn on_hw_params(
        &self,
        sample_rate: u32,
        width: SampleWidth,
    ) -> Result<(), CodecError<S::Error>> {
        self.set_sample_format(width).await?;
        self.set_sample_rate(sample_rate).await
    }

    async fn set_sample_format(&self, width: SampleWidth) -> Result<(), CodecError<S::Error>> {
        self.store
            .update_bits(R_AIC1, RM_AIC1_WL, width.aic1_wl())
            .await?;
        Ok(())
    }

    async fn set_sample_rate(&self, sample_rate: u32) -> Result<(), CodecError<S::Error>> {
        // Base-rate and multiplier fields share values between DACSR and
        // ADCSR, so one pair programs both converters.
        let (br, bm) = match sample_rate {
            8_000 => (RV_DACSR_DBR_32, RV_DACSR_DBM_PT25),
            16_000 => (RV_DACSR_DBR_32, RV_DACSR_DBM_PT5),
            24_000 => (RV_DACSR_DBR_48, RV_DACSR_DBM_PT5),
            32_000 => (RV_DACSR_DBR_32, RV_DACSR_DBM_1),
            48_000 => (RV_DACSR_DBR_48, RV_DACSR_DBM_1),
            96_000 => (RV_DACSR_DBR_48, RV_DACSR_DBM_2),
            11_025 => (RV_DACSR_DBR_44_1, RV_DACSR_DBM_PT25),
            22_050 => (RV_DACSR_DBR_44_1, RV_DACSR_DBM_PT5),
            44_100 => (RV_DACSR_DBR_44_1, RV_DACSR_DBM_1),
            88_200 => (RV_DACSR_DBR_44_1, RV_DACSR_DBM_2),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::error!("unsupported sample rate {=u32}", sample_rate);
                return Err(CodecError::InvalidParameter);
            }
        };
        self.store.update_bits(R_DACSR, RM_DACSR_DBR, br).await?;
        self.store.update_bits(R_DACSR, RM_DACSR_DBM, bm).await?;
        self.store.update_bits(R_ADCSR, RM_ADCSR_ABR, br).await?;
        self.store.update_bits(R_ADCSR, RM_ADCSR_ABM, bm).await?;

        self.audio_params.lock().await.sample_rate = sample_rate;
        Ok(())
    }

    /// BCLK/LRCLK ratio hook. The part supports 32, 40 and 64 bit clocks
    /// per frame.
    pub async fn on_set_bclk_ratio(&self, ratio: u32) -> Result<(), CodecError<S::Error>> {
        let value = match ratio {
            32 => RV_DACSR_DBCM_32,
            40 => RV_DACSR_DBCM_40,
            64 => RV_DACSR_DBCM_64,
            _ => return Err(CodecError::InvalidParameter),
        };
        self.store.update_bits(R_DACSR, RM_DACSR_DBCM, value).await?;
        self.store.update_bits(R_ADCSR, RM_ADCSR_ABCM, value).await?;

        self.audio_params.lock().await.bclk_ratio = ratio;
        Ok(())
    }

    /// Reference-clock hook: selects the input pin for both PLLs and
    /// programs the dividers for `freq` from the static input table.
    pub async fn on_set_sysclk_source(
        &self,
        source: SysclkSource,
        freq: u32,
    ) -> Result<(), CodecError<S::Error>> {
        self.store.write(R_PLLREFSEL, source.pllrefsel()).await?;
        self.set_pll_input_freq(freq).await
    }

    async fn set_pll_input_freq(&self, freq: u32) -> Result<(), CodecError<S::Error>> {
        let ctl = match find_pll_ctl(freq) {
            Some(ctl) => ctl,
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!("no pll programming for input freq {=u32}", freq);
                return Err(CodecError::InvalidParameter);
            }
        };
        for setting in &ctl.settings {
            self.store
                .update_bits(setting.reg, setting.mask, setting.val)
                .await?;
        }
        Ok(())
    }
}
