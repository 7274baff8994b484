//! Per-opcode instruction descriptors and the 256-entry dispatch table.

use std::fmt::Write;

use crate::memory::MAX_OPERAND_BYTES;
use crate::{Core, CoreError};

/// Number of opcode slots in the dispatch table.
pub const OPCODE_COUNT: usize = 256;

/// Width of a mnemonic cell in the rendered opcode grid.
const GRID_MNEMONIC_WIDTH: usize = 4;

/// Execution handler invoked for a decoded instruction.
///
/// Handlers receive the core and the execution event and apply exactly the
/// architectural effect of their mnemonic. A handler that performs a jump
/// must set the core's one-shot jump flag together with the new program
/// counter (see [`Core::jump_to`]); every other handler is written without
/// knowing whether the default sequential advance applies.
pub type ExecHandler = fn(&mut Core<'_>, &ExecEvent) -> Result<(), CoreError>;

/// Static metadata for one opcode value.
#[derive(Debug, Clone, Copy)]
pub struct InstructionDescriptor {
    /// Human-readable mnemonic; empty for undefined opcodes.
    pub mnemonic: &'static str,
    /// Number of operand bytes following the opcode (`0..=4`).
    pub length: u8,
    /// Declared cycle cost; `0` doubles as the undefined sentinel.
    pub cycles: u8,
    /// Execution handler, when the instruction has observable effects.
    pub exec: Option<ExecHandler>,
}

impl InstructionDescriptor {
    /// The undefined-opcode sentinel: no mnemonic, zero cycles, no handler.
    pub const UNDEFINED: Self = Self {
        mnemonic: "",
        length: 0,
        cycles: 0,
        exec: None,
    };

    /// Returns `true` when this slot holds a defined instruction.
    ///
    /// An empty mnemonic or a zero cycle cost marks the slot undefined;
    /// both conditions are required for a defined instruction.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !self.mnemonic.is_empty() && self.cycles > 0
    }

    /// Returns the first mnemonic token, truncated to four characters, for
    /// the opcode-grid dump.
    #[must_use]
    pub fn short_mnemonic(&self) -> &'static str {
        let token = match self.mnemonic.split_once(' ') {
            Some((head, _)) => head,
            None => self.mnemonic,
        };
        token.get(..GRID_MNEMONIC_WIDTH).unwrap_or(token)
    }
}

impl Default for InstructionDescriptor {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

/// Event passed to execution handlers for one fetch-decode-execute cycle.
#[derive(Debug, Clone, Copy)]
pub struct ExecEvent {
    /// The fetched opcode byte.
    pub opcode: u8,
    /// The descriptor selected by the opcode.
    pub descriptor: InstructionDescriptor,
    operands: [u8; MAX_OPERAND_BYTES],
}

impl ExecEvent {
    pub(crate) const fn new(
        opcode: u8,
        descriptor: InstructionDescriptor,
        operands: [u8; MAX_OPERAND_BYTES],
    ) -> Self {
        Self {
            opcode,
            descriptor,
            operands,
        }
    }

    /// Returns the operand bytes declared by the descriptor, in fetch order.
    #[must_use]
    pub fn operands(&self) -> &[u8] {
        &self.operands[..usize::from(self.descriptor.length)]
    }

    /// Returns one operand byte. Valid for `index < 4`; bytes past the
    /// descriptor's declared length are stale scratch content.
    #[must_use]
    pub const fn operand(&self, index: usize) -> u8 {
        self.operands[index]
    }
}

/// Dispatch table mapping each opcode value to its descriptor.
///
/// Populated at setup time by instruction-set modules; later registrations
/// overwrite earlier ones at the same opcode. There is no removal
/// operation; constructing a new table is the only reset path.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    entries: [InstructionDescriptor; OPCODE_COUNT],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self {
            entries: [InstructionDescriptor::UNDEFINED; OPCODE_COUNT],
        }
    }
}

impl OpcodeTable {
    /// Creates a table with every opcode undefined.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a descriptor at a single opcode, overwriting any previous
    /// registration.
    pub const fn register_one(&mut self, opcode: u8, descriptor: InstructionDescriptor) {
        self.entries[opcode as usize] = descriptor;
    }

    /// Installs a descriptor at `count` contiguous opcodes starting at
    /// `start`. A zero `count` or a range reaching past the opcode space is
    /// a silent no-op.
    pub fn register_range(&mut self, start: u8, count: u8, descriptor: InstructionDescriptor) {
        if count == 0 {
            return;
        }
        let end = usize::from(start) + usize::from(count);
        if end > OPCODE_COUNT {
            return;
        }
        for entry in &mut self.entries[usize::from(start)..end] {
            *entry = descriptor;
        }
    }

    /// Returns the descriptor registered at `opcode`.
    #[must_use]
    pub const fn descriptor(&self, opcode: u8) -> &InstructionDescriptor {
        &self.entries[opcode as usize]
    }

    /// Counts the defined opcodes.
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_defined()).count()
    }

    /// Renders the table as a 16x16 mnemonic grid.
    ///
    /// Each cell shows the short mnemonic of the registered instruction or
    /// `----` for an undefined opcode. Rendering never mutates the table,
    /// so repeated dumps of an unchanged table are identical.
    #[must_use]
    pub fn render_grid(&self) -> String {
        let mut out = String::new();

        out.push_str("  ");
        for col in 0..16_u32 {
            let _ = write!(out, " {col:<4X}");
        }
        out.push('\n');

        for row in 0..16_usize {
            let base = row * 16;
            let _ = write!(out, "{base:02X}");
            for col in 0..16_usize {
                let descriptor = &self.entries[base + col];
                if descriptor.is_defined() {
                    let _ = write!(out, " {:<4}", descriptor.short_mnemonic());
                } else {
                    out.push_str(" ----");
                }
            }
            out.push('\n');
        }

        out
    }
}
