//! The [`RegisterStore`] contract.
//!
//! A register store is the single gateway to a device's register file. It
//! serializes its own bus access internally, so all methods take `&self` and
//! a store can be shared between tasks by reference.

/// Byte-register access with interior locking.
///
/// Implementations decide caching policy per register; callers see one
/// uniform surface. `bulk_write` targets consecutive register addresses
/// starting at `reg` (device auto-increment).
pub trait RegisterStore {
    /// Transport-level error type.
    type Error;

    /// Read one register.
    async fn read(&self, reg: u8) -> Result<u8, Self::Error>;

    /// Write one register.
    async fn write(&self, reg: u8, val: u8) -> Result<(), Self::Error>;

    /// Write `data` to consecutive registers starting at `reg`.
    async fn bulk_write(&self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read-modify-write the bits selected by `mask` to `val`.
    ///
    /// The write is skipped when the masked update leaves the register value
    /// unchanged. Implementations with an internal cache or lock may override
    /// this to hold the lock across the whole sequence.
    async fn update_bits(&self, reg: u8, mask: u8, val: u8) -> Result<(), Self::Error> {
        let old = self.read(reg).await?;
        let new = (old & !mask) | (val & mask);
        if new != old {
            self.write(reg, new).await?;
        }
        Ok(())
    }
}

impl<T: RegisterStore + ?Sized> RegisterStore for &T {
    type Error = T::Error;

    async fn read(&self, reg: u8) -> Result<u8, Self::Error> {
        (**self).read(reg).await
    }

    async fn write(&self, reg: u8, val: u8) -> Result<(), Self::Error> {
        (**self).write(reg, val).await
    }

    async fn bulk_write(&self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).bulk_write(reg, data).await
    }

    async fn update_bits(&self, reg: u8, mask: u8, val: u8) -> Result<(), Self::Error> {
        (**self).update_bits(reg, mask, val).await
    }
}
