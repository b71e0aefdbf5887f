//! Register map access for byte-addressed I2C control ports.
//!
//! Audio codecs and DACs in this family expose an 8-bit register file over
//! I2C. This crate provides the access layer a driver builds on:
//!
//! ```text
//! Driver crate (tscs42xx, ...)
//!         ↓
//! RegisterStore trait (read/write/bulk/update_bits)
//!         ↓
//! I2cStore (write-through cache) ─── MockStore (host tests)
//!         ↓
//! embedded-hal-async I2C bus
//! ```
//!
//! The cache layer follows the usual codec-register discipline: registers are
//! cached write-through unless the device's [`AccessMap`] marks them
//! *volatile* (hardware changes them behind the driver's back) or *precious*
//! (a read has side effects), in which case every access goes to the bus.
//!
//! # Features
//!
//! - `std`: expose [`MockStore`] to downstream integration tests
//! - `defmt`: enable `defmt::Format` impls on store types
//!
//! # Example
//!
//! ```no_run
//! use regmap::{AccessMap, I2cStore, RegisterStore};
//!
//! async fn example<I: embedded_hal_async::i2c::I2c>(bus: I) {
//!     let access = AccessMap {
//!         max_register: 0x7F,
//!         volatile: |reg| reg == 0x10,
//!         precious: |_| false,
//!     };
//!     let store = I2cStore::new(bus, 0x34, access);
//!     let _ = store.update_bits(0x02, 0x0C, 0x04).await;
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
// Pedantic lints suppressed for this access-layer crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // accessors, callers decide what to keep
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod access;
pub mod error;
pub mod i2c;
pub mod mock;
pub mod store;

pub use access::AccessMap;
pub use error::StoreError;
pub use i2c::I2cStore;
#[cfg(any(test, feature = "std"))]
pub use mock::{MockError, MockStore, Transaction};
pub use store::RegisterStore;
