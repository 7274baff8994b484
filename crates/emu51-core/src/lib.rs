//! Instruction-set emulator core for 8051-family microcontrollers.
//!
//! The crate provides the CPU core only: a register file, 256 bytes of
//! internal data RAM, an opcode dispatch table and peripheral hook tables.
//! The host supplies the code store through the [`CodeSource`] trait and an
//! optional external RAM buffer, then drives execution one instruction at a
//! time with [`Core::step`]. Failures latch into a sticky fault that makes
//! the core terminal until [`Core::reset`].
//!
//! ```
//! use emu51_core::Core;
//!
//! // MOV DPTR, #0x0102 followed by INC DPTR.
//! let code: [u8; 4] = [0x90, 0x01, 0x02, 0xA3];
//! let mut core = Core::with_base_isa(&code);
//!
//! core.step().unwrap();
//! core.step().unwrap();
//! assert_eq!(core.dptr(), 0x0103);
//! ```

/// Failure taxonomy with stable numeric codes.
pub mod error;
pub use error::CoreError;

/// Register file and status-word bit layout.
pub mod regs;
pub use regs::{
    RegisterFile, GENERAL_REGISTER_COUNT, PSW_AC, PSW_CY, PSW_F0, PSW_F1, PSW_OV, PSW_P,
    PSW_RS_MASK, PSW_RS_SHIFT, REGISTER_BANK_COUNT,
};

/// Memory-model constants and the host code-store trait.
pub mod memory;
pub use memory::{CodeSource, DPH_ADDRESS, DPL_ADDRESS, IRAM_SIZE, MAX_OPERAND_BYTES};

/// Instruction descriptors and the opcode dispatch table.
pub mod descriptor;
pub use descriptor::{
    ExecEvent, ExecHandler, InstructionDescriptor, OpcodeTable, OPCODE_COUNT,
};

/// Peripheral hook tables for direct-addressed RAM traffic.
pub mod hooks;
pub use hooks::{HookTable, ReadHook, WriteHook, HOOK_SLOTS};

/// The core aggregate and its step engine.
pub mod core;
pub use crate::core::Core;

/// The base instruction set.
pub mod isa;
pub use isa::{
    install_base_isa, OPCODE_CLR_A, OPCODE_CLR_BIT, OPCODE_DJNZ_RN_BASE, OPCODE_INC_DPTR,
    OPCODE_LJMP, OPCODE_MOVX_DPTR_A, OPCODE_MOV_AT_RI_A_BASE, OPCODE_MOV_DIRECT_IMM,
    OPCODE_MOV_DPTR_IMM, OPCODE_MOV_RN_IMM_BASE, OPCODE_NOP, OPCODE_SET_BIT, OPCODE_SJMP,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
