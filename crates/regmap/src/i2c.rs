//! Write-through cached register store over an async I2C bus.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::{I2c, Operation};

use crate::access::AccessMap;
use crate::error::StoreError;
use crate::store::RegisterStore;

/// Cached register store for a device on an async I2C bus.
///
/// Register values are cached write-through: a read of a non-volatile
/// register hits the bus once and is served from the cache afterwards, and
/// every successful write refreshes the cached value. Registers the
/// [`AccessMap`] marks volatile or precious bypass the cache entirely.
///
/// An internal mutex serializes bus access and keeps read-modify-write
/// sequences atomic, so the store is shared by `&self`.
pub struct I2cStore<I> {
    addr: u8,
    access: AccessMap,
    inner: Mutex<CriticalSectionRawMutex, Inner<I>>,
}

struct Inner<I> {
    bus: I,
    cache: Cache,
}

/// Flat value cache with per-register validity.
struct Cache {
    vals: [u8; 256],
    valid: [bool; 256],
}

impl Cache {
    const fn new() -> Self {
        Self {
            vals: [0; 256],
            valid: [false; 256],
        }
    }

    fn get(&self, reg: u8) -> Option<u8> {
        match self.valid.get(usize::from(reg)) {
            Some(true) => self.vals.get(usize::from(reg)).copied(),
            _ => None,
        }
    }

    fn put(&mut self, reg: u8, val: u8) {
        if let Some(slot) = self.vals.get_mut(usize::from(reg)) {
            *slot = val;
        }
        if let Some(flag) = self.valid.get_mut(usize::from(reg)) {
            *flag = true;
        }
    }
}

impl<I: I2c> I2cStore<I> {
    /// Create a store for the device at 7-bit address `addr`.
    pub const fn new(bus: I, addr: u8, access: AccessMap) -> Self {
        Self {
            addr,
            access,
            inner: Mutex::new(Inner {
                bus,
                cache: Cache::new(),
            }),
        }
    }

    fn bypasses_cache(&self, reg: u8) -> bool {
        self.access.is_volatile(reg) || self.access.is_precious(reg)
    }

    async fn read_locked(
        &self,
        inner: &mut Inner<I>,
        reg: u8,
    ) -> Result<u8, StoreError<I::Error>> {
        if !self.bypasses_cache(reg) {
            if let Some(val) = inner.cache.get(reg) {
                return Ok(val);
            }
        }
        let mut buf = [0u8; 1];
        inner
            .bus
            .write_read(self.addr, &[reg], &mut buf)
            .await
            .map_err(StoreError::Bus)?;
        let [val] = buf;
        if !self.bypasses_cache(reg) {
            inner.cache.put(reg, val);
        }
        Ok(val)
    }

    async fn write_locked(
        &self,
        inner: &mut Inner<I>,
        reg: u8,
        val: u8,
    ) -> Result<(), StoreError<I::Error>> {
        inner
            .bus
            .write(self.addr, &[reg, val])
            .await
            .map_err(StoreError::Bus)?;
        if !self.bypasses_cache(reg) {
            inner.cache.put(reg, val);
        }
        Ok(())
    }
}

impl<I: I2c> RegisterStore for I2cStore<I> {
    type Error = StoreError<I::Error>;

    async fn read(&self, reg: u8) -> Result<u8, Self::Error> {
        if !self.access.contains(reg) {
            return Err(StoreError::OutOfRange { reg });
        }
        let mut inner = self.inner.lock().await;
        self.read_locked(&mut inner, reg).await
    }

    async fn write(&self, reg: u8, val: u8) -> Result<(), Self::Error> {
        if !self.access.contains(reg) {
            return Err(StoreError::OutOfRange { reg });
        }
        let mut inner = self.inner.lock().await;
        self.write_locked(&mut inner, reg, val).await
    }

    async fn bulk_write(&self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }
        let last = usize::from(reg).checked_add(data.len().saturating_sub(1));
        if !last.is_some_and(|l| l <= usize::from(self.access.max_register)) {
            return Err(StoreError::OutOfRange { reg });
        }
        let mut inner = self.inner.lock().await;
        // Register byte and payload coalesce into one bus write (no repeated
        // start between adjacent write operations).
        let prefix = [reg];
        let mut ops = [Operation::Write(&prefix), Operation::Write(data)];
        inner
            .bus
            .transaction(self.addr, &mut ops)
            .await
            .map_err(StoreError::Bus)?;
        let mut r = reg;
        for &byte in data {
            if !self.bypasses_cache(r) {
                inner.cache.put(r, byte);
            }
            r = r.wrapping_add(1);
        }
        Ok(())
    }

    async fn update_bits(&self, reg: u8, mask: u8, val: u8) -> Result<(), Self::Error> {
        if !self.access.contains(reg) {
            return Err(StoreError::OutOfRange { reg });
        }
        // One lock hold across the whole read-modify-write.
        let mut inner = self.inner.lock().await;
        let old = self.read_locked(&mut inner, reg).await?;
        let new = (old & !mask) | (val & mask);
        if new != old {
            self.write_locked(&mut inner, reg, new).await?;
        }
        Ok(())
    }
}
