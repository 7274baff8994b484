//! Engine-level suite: fetch bounds, sticky faults, dispatch-table edges
//! and property coverage over arbitrary code images.

#![allow(clippy::pedantic, clippy::nursery)]

use std::cell::RefCell;
use std::rc::Rc;

use emu51_core::{
    install_base_isa, Core, CoreError, InstructionDescriptor, OpcodeTable, OPCODE_COUNT,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[test]
fn undefined_opcode_latches_and_freezes_the_program_counter() {
    let code = [0x00_u8, 0x01]; // 0x01 has no descriptor in the base set
    let mut core = Core::with_base_isa(&code);

    assert_eq!(core.step(), Ok(()));
    assert_eq!(core.step(), Err(CoreError::UnknownInstruction));
    assert_eq!(core.regs().pc(), 1);
    assert_eq!(core.cycles(), 1);

    // Terminal: the latched failure is replayed without any fetch.
    for _ in 0..3 {
        assert_eq!(core.step(), Err(CoreError::UnknownInstruction));
        assert_eq!(core.regs().pc(), 1);
    }
}

#[test]
fn a_run_of_nops_advances_one_address_and_one_cycle_each() {
    let code = vec![0x00_u8; 100];
    let mut core = Core::with_base_isa(&code);

    for n in 1..=100_u64 {
        assert_eq!(core.step(), Ok(()));
        assert_eq!(u64::from(core.regs().pc()), n);
        assert_eq!(core.cycles(), n);
    }
}

#[test]
fn fetch_past_the_end_of_the_code_image_faults() {
    let code = [0x00_u8];
    let mut core = Core::with_base_isa(&code);

    assert_eq!(core.step(), Ok(()));
    assert_eq!(core.step(), Err(CoreError::CodeOutOfRange));
    assert_eq!(core.fault(), Some(CoreError::CodeOutOfRange));
}

#[test]
fn truncated_operands_fault_before_the_handler_runs() {
    // LJMP with only one of its two operand bytes present.
    let code = [0x02_u8, 0x12];
    let mut core = Core::with_base_isa(&code);

    assert_eq!(core.step(), Err(CoreError::CodeOutOfRange));
    assert_eq!(core.regs().pc(), 0);
}

#[test]
fn the_last_code_address_is_executable_but_not_passable() {
    let code = vec![0x00_u8; 0x10000];
    let mut core = Core::with_base_isa(&code);

    // A NOP at 0xFFFE still has a valid successor at 0xFFFF.
    core.regs_mut().set_pc(0xFFFE);
    assert_eq!(core.step(), Ok(()));
    assert_eq!(core.regs().pc(), 0xFFFF);

    // A NOP at 0xFFFF has no successor; the advance would leave the
    // 16-bit code space.
    assert_eq!(core.step(), Err(CoreError::CodeOutOfRange));
    assert_eq!(core.regs().pc(), 0xFFFF);
}

#[test]
fn jumps_near_the_top_of_the_code_space_fault_on_the_landing_check() {
    // LJMP 0xFFFF: the bound is applied to the post-execution counter, so
    // the landing address itself is rejected while the jump is recorded.
    let code = [0x02_u8, 0xFF, 0xFF];
    let mut core = Core::with_base_isa(&code);

    assert_eq!(core.step(), Err(CoreError::CodeOutOfRange));
    assert_eq!(core.regs().pc(), 0xFFFF);
    assert_eq!(core.cycles(), 0);
}

#[test]
fn reset_recovers_a_terminal_core_without_reinstalling_anything() {
    let code = [0x01_u8, 0x00];
    let mut core = Core::with_base_isa(&code);

    assert_eq!(core.step(), Err(CoreError::UnknownInstruction));
    core.reset();

    // pc is back at 0 where the bad opcode still sits.
    assert_eq!(core.step(), Err(CoreError::UnknownInstruction));
    core.reset();

    core.regs_mut().set_pc(1);
    assert_eq!(core.step(), Ok(()));
    assert_eq!(core.regs().pc(), 2);
}

#[test]
fn last_registration_wins_in_the_dispatch_table() {
    let code = [0x00_u8];
    let mut core = Core::with_base_isa(&code);

    fn trap(_core: &mut Core<'_>, _event: &emu51_core::ExecEvent) -> Result<(), CoreError> {
        Err(CoreError::General)
    }

    core.register_opcode(
        0x00,
        InstructionDescriptor {
            mnemonic: "TRAP",
            length: 0,
            cycles: 1,
            exec: Some(trap),
        },
    );

    assert_eq!(core.step(), Err(CoreError::General));
    assert_eq!(core.fault(), Some(CoreError::General));
}

#[test]
fn handler_failure_latches_before_the_counter_advances() {
    let code = [0x07_u8];
    let mut core = Core::new(&code);

    fn trap(_core: &mut Core<'_>, _event: &emu51_core::ExecEvent) -> Result<(), CoreError> {
        Err(CoreError::XdataOutOfRange)
    }

    core.register_opcode(
        0x07,
        InstructionDescriptor {
            mnemonic: "TRAP",
            length: 0,
            cycles: 1,
            exec: Some(trap),
        },
    );

    assert_eq!(core.step(), Err(CoreError::XdataOutOfRange));
    assert_eq!(core.regs().pc(), 0);
    assert_eq!(core.cycles(), 0);
}

#[test]
fn opcode_grid_is_stable_and_marks_undefined_slots() {
    let code = [0x00_u8];
    let core = Core::with_base_isa(&code);

    let first = core.opcode_grid();
    let second = core.opcode_grid();
    assert_eq!(first, second);

    assert!(first.contains("----"));
    assert!(first.contains("NOP"));
    assert!(first.contains("LJMP"));
    assert!(first.contains("DJNZ"));
    // 16 row labels plus the column header line.
    assert_eq!(first.lines().count(), 17);
}

#[test]
fn hook_write_sequence_matches_ram_for_a_toggle_program() {
    // MOV R7,#3 ; loop: SET 0x80 ; CLR 0x80 ; DJNZ R7,loop
    let code = [0x7F_u8, 0x03, 0xD2, 0x80, 0xC2, 0x80, 0xDF, 0xFA];
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);

    let mut core = Core::with_base_isa(&code);
    core.register_hooks(
        0x80,
        Some(Box::new(move |_, value| {
            sink.borrow_mut().push(value);
            Ok(())
        })),
        None,
    );

    while core.fault().is_none() && core.regs().pc() < 8 {
        if core.step().is_err() {
            break;
        }
    }

    assert_eq!(log.borrow().as_slice(), &[1, 0, 1, 0, 1, 0]);
    assert_eq!(core.read_internal(0x80), 0x00);
    assert_eq!(core.read_gpr(7), Ok(0));
}

proptest! {
    /// Arbitrary code images never panic the engine; every step either
    /// retires an instruction or latches a failure that then replays.
    #[test]
    fn arbitrary_images_step_without_panicking(
        code in proptest::collection::vec(any::<u8>(), 1..512),
        steps in 1_usize..256,
    ) {
        let mut core = Core::with_base_isa(&code);
        let mut latched = None;

        for _ in 0..steps {
            match core.step() {
                Ok(()) => prop_assert!(core.fault().is_none()),
                Err(err) => {
                    prop_assert_eq!(core.fault(), Some(err));
                    latched = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = latched {
            prop_assert_eq!(core.step(), Err(err));
        }
    }

    /// The dispatch table accepts any registration pattern without
    /// overrunning its 256 slots.
    #[test]
    fn registration_ranges_never_escape_the_table(start in any::<u8>(), count in any::<u8>()) {
        let mut table = OpcodeTable::new();
        install_base_isa(&mut table);

        let marker = InstructionDescriptor {
            mnemonic: "MARK",
            length: 0,
            cycles: 1,
            exec: None,
        };
        table.register_range(start, count, marker);

        let fits = count > 0 && usize::from(start) + usize::from(count) <= OPCODE_COUNT;
        for opcode in 0..=u8::MAX {
            let marked = table.descriptor(opcode).mnemonic == "MARK";
            let in_range = fits && opcode >= start && u16::from(opcode) < u16::from(start) + u16::from(count);
            prop_assert_eq!(marked, in_range);
        }
    }

    /// Register-bank addressing stays inside the four-bank window for
    /// every PSW value.
    #[test]
    fn bank_resolution_is_always_in_bounds(psw in any::<u8>(), n in 0_u8..8) {
        let code = [0x00_u8];
        let mut core = Core::with_base_isa(&code);
        core.regs_mut().set_psw(psw);

        let addr = core.gpr_address(n).unwrap();
        prop_assert!(addr < 32);
        prop_assert_eq!(addr % 8, n);
    }
}
