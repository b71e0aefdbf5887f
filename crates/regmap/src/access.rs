//! Static register access metadata.
//!
//! Devices describe their register file with an [`AccessMap`]: the highest
//! valid address plus two predicates that drive the cache policy of
//! [`I2cStore`](crate::I2cStore).

/// Access annotations for one device's register file.
#[derive(Clone, Copy)]
pub struct AccessMap {
    /// Highest valid register address; accesses beyond it are rejected.
    pub max_register: u8,
    /// Volatile: hardware changes the register behind the driver's back, so
    /// reads must always go to the bus and the value is never cached.
    pub volatile: fn(u8) -> bool,
    /// Precious: a bus read has side effects (FIFO pop, flag clear), so the
    /// store must never read the register except on an explicit request and
    /// must never serve it from a cache.
    pub precious: fn(u8) -> bool,
}

impl AccessMap {
    /// Whether `reg` is a valid address for this device.
    pub fn contains(&self, reg: u8) -> bool {
        reg <= self.max_register
    }

    /// Whether reads of `reg` must bypass any cache.
    pub fn is_volatile(&self, reg: u8) -> bool {
        (self.volatile)(reg)
    }

    /// Whether `reg` must never be accessed speculatively.
    pub fn is_precious(&self, reg: u8) -> bool {
        (self.precious)(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::AccessMap;

    const MAP: AccessMap = AccessMap {
        max_register: 0x40,
        volatile: |reg| reg == 0x10,
        precious: |reg| reg == 0x11,
    };

    #[test]
    fn bounds_are_inclusive() {
        assert!(MAP.contains(0x00));
        assert!(MAP.contains(0x40));
        assert!(!MAP.contains(0x41));
    }

    #[test]
    fn predicates_dispatch() {
        assert!(MAP.is_volatile(0x10));
        assert!(!MAP.is_volatile(0x11));
        assert!(MAP.is_precious(0x11));
        assert!(!MAP.is_precious(0x10));
    }
}
