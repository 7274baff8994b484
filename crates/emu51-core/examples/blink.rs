//! Runs a firmware image that clears external RAM and then toggles the
//! P0 latch forever.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p emu51-core --example blink
//! ```
//!
//! The image is the compiler output for a small C program: the startup
//! stub zeroes internal RAM through `MOV @Ri, A`, the firmware clears a
//! 1 KiB external RAM window through `MOVX @DPTR, A` in a nested `DJNZ`
//! loop, and the main loop alternates `CLR 0x80` / `SET 0x80`. A write
//! hook at P0 prints each latch update.

#![allow(clippy::pedantic)]

use emu51_core::Core;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const FIRMWARE: [u8; 35] = [
    0x02, 0x00, 0x03, 0x78, 0x7F, 0xE4, 0xF6, 0xD8, 0xFD, 0x90, 0x00, 0x00, 0x7F, 0x00, 0x7E,
    0x04, 0xE4, 0xF0, 0xA3, 0xDF, 0xFC, 0xDE, 0xFA, 0x75, 0x81, 0x07, 0x02, 0x00, 0x1D, 0xC2,
    0x80, 0xD2, 0x80, 0x80, 0xFA,
];

const P0_ADDRESS: u8 = 0x80;
const MAX_STEPS: u32 = 100_000;
const MAX_TOGGLES: usize = 16;

fn main() {
    let mut xdata = vec![0xFF_u8; 1024];

    let mut core = Core::with_base_isa(&FIRMWARE);
    core.set_xdata(&mut xdata);
    core.register_hooks(
        P0_ADDRESS,
        Some(Box::new(|_, value| {
            println!("P0 <- 0x{value:02X}");
            Ok(())
        })),
        None,
    );

    println!("{}", core.opcode_grid());

    let mut toggles = 0_usize;
    for _ in 0..MAX_STEPS {
        if let Err(err) = core.step() {
            println!(
                "halted: {err} ({}) at pc=0x{:04X} after {} cycles",
                err.name(),
                core.regs().pc(),
                core.cycles()
            );
            return;
        }

        // The main loop starts once the XDATA clear is done.
        if core.regs().pc() == 0x1D {
            toggles += 1;
            if toggles > MAX_TOGGLES {
                break;
            }
        }
    }

    let cleared = (0..1024_u16).all(|addr| core.read_xdata(addr) == Some(0));
    println!(
        "done: pc=0x{:04X}, cycles={}, xdata cleared={cleared}",
        core.regs().pc(),
        core.cycles()
    );
}
