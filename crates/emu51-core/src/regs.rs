//! Architectural register file and PSW flag-word layout.

/// `PSW` bit mask for the parity flag (bit 0).
pub const PSW_P: u8 = 1 << 0;
/// `PSW` bit mask for the user-defined F1 flag (bit 1).
pub const PSW_F1: u8 = 1 << 1;
/// `PSW` bit mask for the overflow flag (bit 2).
pub const PSW_OV: u8 = 1 << 2;
/// Shift of the register-bank-select field within `PSW`.
pub const PSW_RS_SHIFT: u8 = 3;
/// Mask of the two register-bank-select bits (bits 3-4).
pub const PSW_RS_MASK: u8 = 0b11 << PSW_RS_SHIFT;
/// `PSW` bit mask for the user-defined F0 flag (bit 5).
pub const PSW_F0: u8 = 1 << 5;
/// `PSW` bit mask for the auxiliary carry flag (bit 6).
pub const PSW_AC: u8 = 1 << 6;
/// `PSW` bit mask for the carry flag (bit 7).
pub const PSW_CY: u8 = 1 << 7;

/// Number of general-purpose registers per bank (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: u8 = 8;
/// Number of selectable 8-byte register banks in internal RAM.
pub const REGISTER_BANK_COUNT: u8 = 4;

/// Architectural register state for the emulated core.
///
/// The general-purpose registers `R0..R7` are not stored here; they live in
/// the banked window of internal RAM selected by the `PSW` bank bits and are
/// accessed through the core's register accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    a: u8,
    b: u8,
    sp: u8,
    pc: u16,
    psw: u8,
}

impl RegisterFile {
    /// Reads the accumulator.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.a
    }

    /// Writes the accumulator.
    pub const fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    /// Reads the `B` register.
    #[must_use]
    pub const fn b(&self) -> u8 {
        self.b
    }

    /// Writes the `B` register.
    pub const fn set_b(&mut self, value: u8) {
        self.b = value;
    }

    /// Reads the stack pointer.
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.sp
    }

    /// Writes the stack pointer. The engine never manages the stack itself;
    /// only instructions manipulate it.
    pub const fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the raw `PSW` flag word. Peripheral code may depend on the
    /// exact bit layout, so the raw byte is part of the contract.
    #[must_use]
    pub const fn psw(&self) -> u8 {
        self.psw
    }

    /// Writes the raw `PSW` flag word.
    pub const fn set_psw(&mut self, value: u8) {
        self.psw = value;
    }

    /// Returns `true` when a single-bit `PSW` flag is set.
    #[must_use]
    pub const fn flag_is_set(&self, mask: u8) -> bool {
        (self.psw & mask) != 0
    }

    /// Sets or clears a single-bit `PSW` flag.
    pub const fn set_flag(&mut self, mask: u8, enabled: bool) {
        if enabled {
            self.psw |= mask;
        } else {
            self.psw &= !mask;
        }
    }

    /// Reads the selected register bank, always in `0..=3`.
    #[must_use]
    pub const fn bank(&self) -> u8 {
        (self.psw & PSW_RS_MASK) >> PSW_RS_SHIFT
    }

    /// Selects a register bank; values above 3 are masked to two bits.
    pub const fn set_bank(&mut self, bank: u8) {
        self.psw = (self.psw & !PSW_RS_MASK) | ((bank << PSW_RS_SHIFT) & PSW_RS_MASK);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        RegisterFile, PSW_AC, PSW_CY, PSW_F0, PSW_F1, PSW_OV, PSW_P, PSW_RS_MASK, PSW_RS_SHIFT,
    };

    #[test]
    fn register_file_defaults_to_zero() {
        let regs = RegisterFile::default();
        assert_eq!(regs.a(), 0);
        assert_eq!(regs.b(), 0);
        assert_eq!(regs.sp(), 0);
        assert_eq!(regs.pc(), 0);
        assert_eq!(regs.psw(), 0);
        assert_eq!(regs.bank(), 0);
    }

    #[test]
    fn psw_bit_layout_matches_contract() {
        assert_eq!(PSW_P, 0x01);
        assert_eq!(PSW_F1, 0x02);
        assert_eq!(PSW_OV, 0x04);
        assert_eq!(PSW_RS_MASK, 0x18);
        assert_eq!(PSW_RS_SHIFT, 3);
        assert_eq!(PSW_F0, 0x20);
        assert_eq!(PSW_AC, 0x40);
        assert_eq!(PSW_CY, 0x80);
    }

    #[test]
    fn single_bit_flags_are_independent() {
        let mut regs = RegisterFile::default();

        for mask in [PSW_P, PSW_F1, PSW_OV, PSW_F0, PSW_AC, PSW_CY] {
            regs.set_flag(mask, true);
            assert!(regs.flag_is_set(mask));
        }
        assert_eq!(regs.psw() & PSW_RS_MASK, 0);

        regs.set_flag(PSW_CY, false);
        assert!(!regs.flag_is_set(PSW_CY));
        assert!(regs.flag_is_set(PSW_AC));
    }

    #[test]
    fn bank_select_is_always_in_range() {
        let mut regs = RegisterFile::default();

        for bank in 0_u8..=3 {
            regs.set_bank(bank);
            assert_eq!(regs.bank(), bank);
        }

        regs.set_bank(0xFF);
        assert_eq!(regs.bank(), 3);

        regs.set_psw(0xFF);
        assert_eq!(regs.bank(), 3);
    }

    #[test]
    fn bank_select_does_not_disturb_other_flags() {
        let mut regs = RegisterFile::default();
        regs.set_flag(PSW_CY, true);
        regs.set_flag(PSW_P, true);

        regs.set_bank(2);

        assert!(regs.flag_is_set(PSW_CY));
        assert!(regs.flag_is_set(PSW_P));
        assert_eq!(regs.bank(), 2);
    }
}
