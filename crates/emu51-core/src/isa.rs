//! The base instruction set.
//!
//! Each instruction is a static [`InstructionDescriptor`] paired with an
//! execution handler; [`install_base_isa`] registers the set into an opcode
//! table. Handlers receive the decoded [`ExecEvent`] and touch machine state
//! only through the core's accessors, so further instruction modules can
//! follow the same shape.

// Branch offsets are reinterpretations of the raw operand byte.
#![allow(clippy::cast_possible_wrap)]

use crate::core::Core;
use crate::descriptor::{ExecEvent, InstructionDescriptor, OpcodeTable};
use crate::CoreError;

/// `NOP`.
pub const OPCODE_NOP: u8 = 0x00;
/// `LJMP addr16`.
pub const OPCODE_LJMP: u8 = 0x02;
/// `MOV direct, #immediate`.
pub const OPCODE_MOV_DIRECT_IMM: u8 = 0x75;
/// First of the eight `MOV Rn, #immediate` opcodes (`0x78..=0x7F`).
pub const OPCODE_MOV_RN_IMM_BASE: u8 = 0x78;
/// `SJMP offset`.
pub const OPCODE_SJMP: u8 = 0x80;
/// `MOV DPTR, #immediate`.
pub const OPCODE_MOV_DPTR_IMM: u8 = 0x90;
/// `INC DPTR`.
pub const OPCODE_INC_DPTR: u8 = 0xA3;
/// `CLR bit`.
pub const OPCODE_CLR_BIT: u8 = 0xC2;
/// `SET bit`.
pub const OPCODE_SET_BIT: u8 = 0xD2;
/// First of the eight `DJNZ Rn, offset` opcodes (`0xD8..=0xDF`).
pub const OPCODE_DJNZ_RN_BASE: u8 = 0xD8;
/// `CLR A`.
pub const OPCODE_CLR_A: u8 = 0xE4;
/// `MOVX @DPTR, A`.
pub const OPCODE_MOVX_DPTR_A: u8 = 0xF0;
/// First of the two `MOV @Ri, A` opcodes (`0xF6..=0xF7`).
pub const OPCODE_MOV_AT_RI_A_BASE: u8 = 0xF6;

const NOP: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "NOP",
    length: 0,
    cycles: 1,
    exec: None,
};

const LJMP: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "LJMP addr16",
    length: 2,
    cycles: 2,
    exec: Some(exec_ljmp),
};

const MOV_DIRECT_IMM: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "MOV direct, #immediate",
    length: 2,
    cycles: 2,
    exec: Some(exec_mov_direct_imm),
};

const MOV_RN_IMM: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "MOV Rn, #immediate",
    length: 1,
    cycles: 1,
    exec: Some(exec_mov_rn_imm),
};

const SJMP: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "SJMP offset",
    length: 1,
    cycles: 2,
    exec: Some(exec_sjmp),
};

const MOV_DPTR_IMM: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "MOV DPTR, #immediate",
    length: 2,
    cycles: 2,
    exec: Some(exec_mov_dptr_imm),
};

const INC_DPTR: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "INC DPTR",
    length: 0,
    cycles: 1,
    exec: Some(exec_inc_dptr),
};

const CLR_BIT: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "CLR bit",
    length: 1,
    cycles: 1,
    exec: Some(exec_clr_bit),
};

const SET_BIT: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "SET bit",
    length: 1,
    cycles: 1,
    exec: Some(exec_set_bit),
};

const DJNZ_RN: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "DJNZ Rn, offset",
    length: 1,
    cycles: 1,
    exec: Some(exec_djnz_rn),
};

const CLR_A: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "CLR A",
    length: 0,
    cycles: 1,
    exec: Some(exec_clr_a),
};

const MOVX_DPTR_A: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "MOVX @DPTR, A",
    length: 0,
    cycles: 1,
    exec: Some(exec_movx_dptr_a),
};

const MOV_AT_RI_A: InstructionDescriptor = InstructionDescriptor {
    mnemonic: "MOV @Ri, A",
    length: 0,
    cycles: 1,
    exec: Some(exec_mov_at_ri_a),
};

fn exec_ljmp(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    let target = u16::from_be_bytes([event.operand(0), event.operand(1)]);
    core.jump_to(target);
    Ok(())
}

fn exec_mov_direct_imm(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    core.write_direct(event.operand(0), event.operand(1));
    Ok(())
}

fn exec_mov_rn_imm(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    let n = event.opcode & 0x07;
    let addr = core.gpr_address(n)?;
    core.write_direct(addr, event.operand(0));
    Ok(())
}

fn exec_sjmp(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    core.relative_jump(event.operand(0) as i8);
    Ok(())
}

fn exec_mov_dptr_imm(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    core.set_dptr(u16::from_be_bytes([event.operand(0), event.operand(1)]));
    Ok(())
}

fn exec_inc_dptr(core: &mut Core<'_>, _event: &ExecEvent) -> Result<(), CoreError> {
    core.set_dptr(core.dptr().wrapping_add(1));
    Ok(())
}

// The bit instructions act on the whole direct byte. The operand is a
// direct address, not an 8051 bit address; the stored values are 0x00
// and 0x01.
fn exec_clr_bit(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    core.write_direct(event.operand(0), 0x00);
    Ok(())
}

fn exec_set_bit(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    core.write_direct(event.operand(0), 0x01);
    Ok(())
}

fn exec_djnz_rn(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    let n = event.opcode - OPCODE_DJNZ_RN_BASE;
    let value = core.read_gpr(n)?.wrapping_sub(1);
    core.write_gpr(n, value)?;
    if value != 0 {
        core.relative_jump(event.operand(0) as i8);
    }
    Ok(())
}

fn exec_clr_a(core: &mut Core<'_>, _event: &ExecEvent) -> Result<(), CoreError> {
    core.regs_mut().set_a(0x00);
    Ok(())
}

fn exec_movx_dptr_a(core: &mut Core<'_>, _event: &ExecEvent) -> Result<(), CoreError> {
    let addr = core.dptr();
    let value = core.regs().a();
    // Out-of-bounds external stores are discarded, not faulted.
    let _ = core.store_xdata(addr, value);
    Ok(())
}

fn exec_mov_at_ri_a(core: &mut Core<'_>, event: &ExecEvent) -> Result<(), CoreError> {
    let i = event.opcode - OPCODE_MOV_AT_RI_A_BASE;
    let addr = core.read_gpr(i)?;
    let value = core.regs().a();
    core.write_direct(addr, value);
    Ok(())
}

/// Registers the base instruction set into `table`.
pub fn install_base_isa(table: &mut OpcodeTable) {
    table.register_one(OPCODE_NOP, NOP);
    table.register_one(OPCODE_LJMP, LJMP);
    table.register_one(OPCODE_MOV_DIRECT_IMM, MOV_DIRECT_IMM);
    table.register_range(OPCODE_MOV_RN_IMM_BASE, 8, MOV_RN_IMM);
    table.register_one(OPCODE_SJMP, SJMP);
    table.register_one(OPCODE_MOV_DPTR_IMM, MOV_DPTR_IMM);
    table.register_one(OPCODE_INC_DPTR, INC_DPTR);
    table.register_one(OPCODE_CLR_BIT, CLR_BIT);
    table.register_one(OPCODE_SET_BIT, SET_BIT);
    table.register_range(OPCODE_DJNZ_RN_BASE, 8, DJNZ_RN);
    table.register_one(OPCODE_CLR_A, CLR_A);
    table.register_one(OPCODE_MOVX_DPTR_A, MOVX_DPTR_A);
    table.register_range(OPCODE_MOV_AT_RI_A_BASE, 2, MOV_AT_RI_A);
}
