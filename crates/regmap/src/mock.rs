#![cfg(any(test, feature = "std"))]

//! Scriptable in-memory register store for host tests.
//!
//! [`MockStore`] backs the driver test suites: it records every transaction,
//! serves register values from a 256-byte backing array, lets tests enqueue
//! read sequences for individual registers (status bits that change between
//! polls), and injects failures per register. All state sits behind a
//! blocking mutex + `RefCell`, so the `&self` trait methods work and the
//! mock can be shared through the blanket `&T` store impl.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{Deque, Vec};

use crate::store::RegisterStore;

/// Transaction log capacity. A full coefficient-memory flush is roughly 600
/// transactions; double that plus orchestration traffic leaves headroom.
const LOG_CAPACITY: usize = 4096;
/// Longest bulk payload the log keeps verbatim.
const MAX_BULK: usize = 16;
/// Scripted-read queue depth per register.
const SCRIPT_DEPTH: usize = 8;
/// Number of registers that can carry a read script at once.
const SCRIPT_REGS: usize = 8;
/// Number of registers that can carry an injected failure at once.
const FAIL_REGS: usize = 8;

/// One recorded bus access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Single-register read.
    Read {
        /// Register address.
        reg: u8,
    },
    /// Single-register write.
    Write {
        /// Register address.
        reg: u8,
        /// Value written.
        val: u8,
    },
    /// Auto-increment bulk write starting at `reg`.
    BulkWrite {
        /// Base register address.
        reg: u8,
        /// Payload (truncated to [`MAX_BULK`] bytes in the log).
        data: Vec<u8, MAX_BULK>,
    },
}

/// Error returned for registers armed with [`MockStore::fail_reads_of`] or
/// [`MockStore::fail_writes_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("injected bus failure")
    }
}

struct MockInner {
    regs: [u8; 256],
    log: Vec<Transaction, LOG_CAPACITY>,
    overflowed: bool,
    scripts: Vec<(u8, Deque<u8, SCRIPT_DEPTH>), SCRIPT_REGS>,
    fail_reads: Vec<u8, FAIL_REGS>,
    fail_writes: Vec<u8, FAIL_REGS>,
}

impl MockInner {
    fn new() -> Self {
        Self {
            regs: [0; 256],
            log: Vec::new(),
            overflowed: false,
            scripts: Vec::new(),
            fail_reads: Vec::new(),
            fail_writes: Vec::new(),
        }
    }

    fn record(&mut self, t: Transaction) {
        if self.log.push(t).is_err() {
            self.overflowed = true;
        }
    }

    fn reg_value(&self, reg: u8) -> u8 {
        self.regs.get(usize::from(reg)).copied().unwrap_or(0)
    }

    fn set_reg(&mut self, reg: u8, val: u8) {
        if let Some(slot) = self.regs.get_mut(usize::from(reg)) {
            *slot = val;
        }
    }

    fn pop_script(&mut self, reg: u8) -> Option<u8> {
        self.scripts
            .iter_mut()
            .find(|(r, _)| *r == reg)
            .and_then(|(_, queue)| queue.pop_front())
    }
}

/// In-memory register store with a transaction log, scriptable reads, and
/// per-register failure injection.
pub struct MockStore {
    inner: Mutex<CriticalSectionRawMutex, RefCell<MockInner>>,
}

impl MockStore {
    /// Fresh store: all registers zero, empty log, nothing armed.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(MockInner::new())),
        }
    }

    /// Set a backing register value without logging a transaction.
    pub fn set(&self, reg: u8, val: u8) {
        self.inner.lock(|cell| cell.borrow_mut().set_reg(reg, val));
    }

    /// Current backing value of `reg`.
    pub fn value(&self, reg: u8) -> u8 {
        self.inner.lock(|cell| cell.borrow().reg_value(reg))
    }

    /// Enqueue values served by the next reads of `reg`, in order. Once the
    /// queue drains, reads fall back to the backing value.
    pub fn enqueue_read(&self, reg: u8, vals: &[u8]) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if let Some((_, queue)) = inner.scripts.iter_mut().find(|(r, _)| *r == reg) {
                for &val in vals {
                    let _ = queue.push_back(val);
                }
                return;
            }
            let mut queue = Deque::new();
            for &val in vals {
                let _ = queue.push_back(val);
            }
            let _ = inner.scripts.push((reg, queue));
        });
    }

    /// Make every read of `reg` fail with [`MockError`].
    pub fn fail_reads_of(&self, reg: u8) {
        self.inner.lock(|cell| {
            let _ = cell.borrow_mut().fail_reads.push(reg);
        });
    }

    /// Make every write touching `reg` fail with [`MockError`].
    pub fn fail_writes_to(&self, reg: u8) {
        self.inner.lock(|cell| {
            let _ = cell.borrow_mut().fail_writes.push(reg);
        });
    }

    /// Disarm all injected read and write failures.
    pub fn clear_failures(&self) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.fail_reads.clear();
            inner.fail_writes.clear();
        });
    }

    /// Run `f` over the transaction log.
    pub fn with_log<R>(&self, f: impl FnOnce(&[Transaction]) -> R) -> R {
        self.inner.lock(|cell| f(cell.borrow().log.as_slice()))
    }

    /// Forget all recorded transactions (armed failures and scripts stay).
    pub fn clear_log(&self) {
        self.inner.lock(|cell| cell.borrow_mut().log.clear());
    }

    /// Whether the log ran out of capacity. Tests asserting the *absence* of
    /// transactions must check this is false.
    pub fn overflowed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().overflowed)
    }

    /// Number of reads of `reg`.
    pub fn read_count(&self, reg: u8) -> usize {
        self.with_log(|log| {
            log.iter()
                .filter(|t| matches!(t, Transaction::Read { reg: r } if *r == reg))
                .count()
        })
    }

    /// Number of writes addressed at `reg` (bulk writes count at their base).
    pub fn write_count(&self, reg: u8) -> usize {
        self.with_log(|log| {
            log.iter()
                .filter(|t| match t {
                    Transaction::Write { reg: r, .. } | Transaction::BulkWrite { reg: r, .. } => {
                        *r == reg
                    }
                    Transaction::Read { .. } => false,
                })
                .count()
        })
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore for MockStore {
    type Error = MockError;

    async fn read(&self, reg: u8) -> Result<u8, MockError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.record(Transaction::Read { reg });
            if inner.fail_reads.contains(&reg) {
                return Err(MockError);
            }
            let scripted = inner.pop_script(reg);
            Ok(scripted.unwrap_or_else(|| inner.reg_value(reg)))
        })
    }

    async fn write(&self, reg: u8, val: u8) -> Result<(), MockError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.record(Transaction::Write { reg, val });
            if inner.fail_writes.contains(&reg) {
                return Err(MockError);
            }
            inner.set_reg(reg, val);
            Ok(())
        })
    }

    async fn bulk_write(&self, reg: u8, data: &[u8]) -> Result<(), MockError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let mut copy = Vec::new();
            for &byte in data.iter().take(MAX_BULK) {
                let _ = copy.push(byte);
            }
            if data.len() > MAX_BULK {
                inner.overflowed = true;
            }
            inner.record(Transaction::BulkWrite { reg, data: copy });

            let mut r = reg;
            for _ in data {
                if inner.fail_writes.contains(&r) {
                    return Err(MockError);
                }
                r = r.wrapping_add(1);
            }
            let mut r = reg;
            for &byte in data {
                inner.set_reg(r, byte);
                r = r.wrapping_add(1);
            }
            Ok(())
        })
    }
}
