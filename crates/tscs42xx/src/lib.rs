//! Control core for the Tempo Semiconductor TSCS42A1/A2 ("Soul") audio codec.
//!
//! The TSCS42xx pairs stereo converters with an on-chip multi-effect DSP
//! whose coefficient RAM is only writable while one of the two audio PLLs is
//! locked. This crate owns the bookkeeping that makes that safe:
//!
//! ```text
//! Stream hooks (on_hw_params, on_mute, ...)   Control surface (get/put)
//!                    ↓                                   ↓
//!              Tscs42xx driver object: three async critical sections
//!      (audio params · coefficient shadow memory · PLL transitions)
//!                    ↓
//!              regmap::RegisterStore (cached I2C or mock)
//! ```
//!
//! Coefficient writes land in a 618-byte shadow buffer first. A single
//! `synced` flag records whether the device RAM matches the shadow; every
//! confirmed PLL lock triggers a full ascending flush, and a `put` while the
//! PLL is already locked flushes just its own window.
//!
//! # Features
//!
//! - `std`: re-export the register-store mock for downstream tests
//! - `defmt`: enable `defmt::Format` impls and warn/error logging
//!
//! # Example
//!
//! ```no_run
//! use tscs42xx::{SampleWidth, StreamDirection, Tscs42xx};
//!
//! async fn bring_up<S: regmap::RegisterStore>(store: S) -> Result<(), tscs42xx::CodecError<S::Error>> {
//!     let codec = Tscs42xx::new(store);
//!     codec.probe().await?;
//!     codec.on_hw_params(48_000, SampleWidth::W24).await?;
//!     codec.on_mute(StreamDirection::Playback, false).await?;
//!     Ok(())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
// Pedantic lints suppressed for this driver crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // register accessors, callers decide what to keep
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod coeff;
pub mod driver;
pub mod dsp;
pub mod error;
pub mod pll;
pub mod registers;
pub mod types;

pub use coeff::{WindowSize, BIQUAD_COEFF_COUNT, BIQUAD_SIZE, COEFF_RAM_MAX_ADDR, COEFF_SIZE};
pub use driver::Tscs42xx;
pub use dsp::{find_window, ControlWindow, CONTROL_WINDOWS};
pub use error::CodecError;
pub use pll::PllSelect;
pub use types::{SampleWidth, StreamDirection, SysclkSource};
