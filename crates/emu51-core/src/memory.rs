//! Memory-model constants and the injected code-fetch contract.
//!
//! The core owns only the 256-byte internal data RAM. External data RAM is a
//! buffer borrowed from the owner, and code storage is reached exclusively
//! through [`CodeSource`], so code may live in flash, a host buffer, or be
//! generated on the fly without the engine copying or owning it.

use crate::CoreError;

/// Size of the internal data RAM in bytes (direct addresses `0x00..=0xFF`).
pub const IRAM_SIZE: usize = 256;
/// Internal-RAM address backing the data-pointer high byte.
pub const DPH_ADDRESS: u8 = 0x82;
/// Internal-RAM address backing the data-pointer low byte.
pub const DPL_ADDRESS: u8 = 0x83;
/// Maximum number of operand bytes any descriptor may declare.
pub const MAX_OPERAND_BYTES: usize = 4;

/// Borrowed code-storage contract.
///
/// Implementations fill `buf` with the bytes starting at `addr` or report
/// [`CoreError::CodeOutOfRange`] when `addr + buf.len()` exceeds their
/// logical bound. The bound is owned and enforced by the implementation,
/// not by the engine. Reads must be deterministic and side-effect free from
/// the engine's perspective.
pub trait CodeSource {
    /// Copies `buf.len()` code bytes starting at `addr` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CodeOutOfRange`] when the requested range falls
    /// outside the source's bound.
    fn read_code(&self, addr: u16, buf: &mut [u8]) -> Result<(), CoreError>;
}

impl CodeSource for [u8] {
    fn read_code(&self, addr: u16, buf: &mut [u8]) -> Result<(), CoreError> {
        let start = usize::from(addr);
        let end = start
            .checked_add(buf.len())
            .ok_or(CoreError::CodeOutOfRange)?;
        let source = self.get(start..end).ok_or(CoreError::CodeOutOfRange)?;
        buf.copy_from_slice(source);
        Ok(())
    }
}

impl<const N: usize> CodeSource for [u8; N] {
    fn read_code(&self, addr: u16, buf: &mut [u8]) -> Result<(), CoreError> {
        self.as_slice().read_code(addr, buf)
    }
}

impl CodeSource for Vec<u8> {
    fn read_code(&self, addr: u16, buf: &mut [u8]) -> Result<(), CoreError> {
        self.as_slice().read_code(addr, buf)
    }
}
