//! Peripheral hook tables for direct-addressed internal-RAM accesses.
//!
//! A registered write hook observes every direct-addressed store at its
//! address in addition to the underlying RAM update, so peripheral emulation
//! (memory-mapped GPIO ports and the like) can be layered on without the
//! engine knowing concrete device types. Hooks observe stores but cannot
//! suppress them; the RAM byte stays the single source of truth for reads.

use crate::CoreError;

/// Number of hookable direct addresses, one per internal-RAM byte.
pub const HOOK_SLOTS: usize = 256;

/// Write-intercept callback: receives the resolved direct address and the
/// byte being stored. Its result is ignored for store purposes.
pub type WriteHook<'a> = Box<dyn FnMut(u8, u8) -> Result<(), CoreError> + 'a>;

/// Read-intercept callback: receives the direct address being read.
///
/// Reserved for read interception; no shipped instruction consults it yet,
/// but registration and replacement are part of the contract.
pub type ReadHook<'a> = Box<dyn FnMut(u8) -> Result<u8, CoreError> + 'a>;

/// Parallel write/read hook tables keyed by direct address.
pub struct HookTable<'a> {
    write: [Option<WriteHook<'a>>; HOOK_SLOTS],
    read: [Option<ReadHook<'a>>; HOOK_SLOTS],
}

impl Default for HookTable<'_> {
    fn default() -> Self {
        Self {
            write: std::array::from_fn(|_| None),
            read: std::array::from_fn(|_| None),
        }
    }
}

impl<'a> HookTable<'a> {
    /// Creates a table with no hooks installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the hook pair at a direct address, replacing both slots.
    /// `None` clears the corresponding slot.
    pub fn register(
        &mut self,
        addr: u8,
        write: Option<WriteHook<'a>>,
        read: Option<ReadHook<'a>>,
    ) {
        self.write[usize::from(addr)] = write;
        self.read[usize::from(addr)] = read;
    }

    /// Returns the write hook at `addr` for invocation.
    pub fn write_hook_mut(&mut self, addr: u8) -> Option<&mut WriteHook<'a>> {
        self.write[usize::from(addr)].as_mut()
    }

    /// Returns the read hook at `addr` for invocation.
    pub fn read_hook_mut(&mut self, addr: u8) -> Option<&mut ReadHook<'a>> {
        self.read[usize::from(addr)].as_mut()
    }

    /// Returns `true` when a write hook is installed at `addr`.
    #[must_use]
    pub const fn has_write_hook(&self, addr: u8) -> bool {
        self.write[addr as usize].is_some()
    }

    /// Returns `true` when a read hook is installed at `addr`.
    #[must_use]
    pub const fn has_read_hook(&self, addr: u8) -> bool {
        self.read[addr as usize].is_some()
    }
}
