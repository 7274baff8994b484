//! The core aggregate and its fetch-decode-execute step operation.

use crate::descriptor::{ExecEvent, InstructionDescriptor, OpcodeTable};
use crate::hooks::{HookTable, ReadHook, WriteHook};
use crate::memory::{CodeSource, DPH_ADDRESS, DPL_ADDRESS, IRAM_SIZE, MAX_OPERAND_BYTES};
use crate::regs::{RegisterFile, GENERAL_REGISTER_COUNT};
use crate::{isa, CoreError};

/// Highest addressable code byte; the next sequential instruction must
/// start at or below this address.
const CODE_ADDRESS_MAX: u32 = 0xFFFF;

/// The emulated CPU core.
///
/// Owns the register file, the internal data RAM, the opcode dispatch table
/// and the peripheral hook tables. The code store and the external data RAM
/// are borrowed from the owner and must stay valid for every [`Core::step`]
/// call. A core is exclusively owned and mutated by a single caller; the
/// caller's own loop acts as the scheduler.
pub struct Core<'a> {
    regs: RegisterFile,
    iram: [u8; IRAM_SIZE],
    xdata: Option<&'a mut [u8]>,
    code: &'a dyn CodeSource,
    table: OpcodeTable,
    hooks: HookTable<'a>,
    operands: [u8; MAX_OPERAND_BYTES],
    fault: Option<CoreError>,
    jumped: bool,
    cycles: u64,
}

impl<'a> Core<'a> {
    /// Creates a core with zeroed state and an empty opcode table.
    ///
    /// Instruction-set modules must be installed before stepping; until
    /// then every opcode decodes as unknown.
    #[must_use]
    pub fn new(code: &'a dyn CodeSource) -> Self {
        Self {
            regs: RegisterFile::default(),
            iram: [0; IRAM_SIZE],
            xdata: None,
            code,
            table: OpcodeTable::new(),
            hooks: HookTable::new(),
            operands: [0; MAX_OPERAND_BYTES],
            fault: None,
            jumped: false,
            cycles: 0,
        }
    }

    /// Creates a core with the base instruction set pre-installed.
    #[must_use]
    pub fn with_base_isa(code: &'a dyn CodeSource) -> Self {
        let mut core = Self::new(code);
        isa::install_base_isa(&mut core.table);
        core
    }

    /// Configures the external data RAM buffer; the slice length is the
    /// configured bound for external accesses.
    pub fn set_xdata(&mut self, xdata: &'a mut [u8]) {
        self.xdata = Some(xdata);
    }

    /// Returns the configured external data RAM length in bytes.
    #[must_use]
    pub fn xdata_len(&self) -> usize {
        self.xdata.as_deref().map_or(0, <[u8]>::len)
    }

    /// Reads one external data RAM byte, or `None` when no buffer is
    /// configured or `addr` is past the configured bound.
    #[must_use]
    pub fn read_xdata(&self, addr: u16) -> Option<u8> {
        self.xdata
            .as_deref()
            .and_then(|buf| buf.get(usize::from(addr)))
            .copied()
    }

    /// Stores one byte into external data RAM.
    ///
    /// Out-of-bounds stores are discarded without raising the sticky
    /// error; the return value reports whether the byte was stored.
    pub fn store_xdata(&mut self, addr: u16, value: u8) -> bool {
        let Some(slot) = self
            .xdata
            .as_deref_mut()
            .and_then(|buf| buf.get_mut(usize::from(addr)))
        else {
            return false;
        };
        *slot = value;
        true
    }

    /// Installs a descriptor at a single opcode (last write wins).
    pub const fn register_opcode(&mut self, opcode: u8, descriptor: InstructionDescriptor) {
        self.table.register_one(opcode, descriptor);
    }

    /// Installs a descriptor at a contiguous opcode range; empty or
    /// overflowing ranges are silent no-ops.
    pub fn register_opcode_range(
        &mut self,
        start: u8,
        count: u8,
        descriptor: InstructionDescriptor,
    ) {
        self.table.register_range(start, count, descriptor);
    }

    /// Installs a peripheral hook pair at a direct address, replacing any
    /// previous registration there.
    pub fn register_hooks(
        &mut self,
        addr: u8,
        write: Option<WriteHook<'a>>,
        read: Option<ReadHook<'a>>,
    ) {
        self.hooks.register(addr, write, read);
    }

    /// Returns the opcode dispatch table.
    #[must_use]
    pub const fn opcode_table(&self) -> &OpcodeTable {
        &self.table
    }

    /// Returns the opcode dispatch table for direct population by
    /// instruction-set modules.
    pub const fn opcode_table_mut(&mut self) -> &mut OpcodeTable {
        &mut self.table
    }

    /// Renders the populated opcode table as a 16x16 mnemonic grid.
    #[must_use]
    pub fn opcode_grid(&self) -> String {
        self.table.render_grid()
    }

    /// Returns the register file.
    #[must_use]
    pub const fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Returns the register file for mutation.
    pub const fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// Returns the sticky fault, if one is latched.
    #[must_use]
    pub const fn fault(&self) -> Option<CoreError> {
        self.fault
    }

    /// Returns the accumulated cycle cost of retired instructions.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns `true` while a handler-requested jump is pending for the
    /// current step.
    #[must_use]
    pub const fn jump_flag(&self) -> bool {
        self.jumped
    }

    /// Resets the execution state: zeroes the register file and clears the
    /// sticky fault, the jump flag and the cycle counter. Internal RAM,
    /// the opcode table, hooks and the XDATA configuration are preserved.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::default();
        self.fault = None;
        self.jumped = false;
        self.cycles = 0;
    }

    /// Reads one internal-RAM byte without hook dispatch.
    #[must_use]
    pub const fn read_internal(&self, addr: u8) -> u8 {
        self.iram[addr as usize]
    }

    /// Writes one internal-RAM byte without hook dispatch.
    pub const fn write_internal(&mut self, addr: u8, value: u8) {
        self.iram[addr as usize] = value;
    }

    /// Performs a direct-addressed store: invokes the write hook at `addr`
    /// when present, then unconditionally updates the RAM byte.
    ///
    /// The hook's result is ignored for store purposes; hooks observe
    /// stores but cannot suppress them.
    pub fn write_direct(&mut self, addr: u8, value: u8) {
        if let Some(hook) = self.hooks.write_hook_mut(addr) {
            let _ = hook(addr, value);
        }
        self.iram[usize::from(addr)] = value;
    }

    /// Resolves a general-purpose register number to its internal-RAM
    /// address in the currently selected bank.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::General`] when `n > 7`.
    pub const fn gpr_address(&self, n: u8) -> Result<u8, CoreError> {
        if n >= GENERAL_REGISTER_COUNT {
            return Err(CoreError::General);
        }
        Ok(self.regs.bank() * GENERAL_REGISTER_COUNT + n)
    }

    /// Reads general-purpose register `Rn` from the selected bank.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::General`] when `n > 7`.
    pub fn read_gpr(&self, n: u8) -> Result<u8, CoreError> {
        let addr = self.gpr_address(n)?;
        Ok(self.iram[usize::from(addr)])
    }

    /// Writes general-purpose register `Rn` in the selected bank, without
    /// hook dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::General`] when `n > 7`.
    pub fn write_gpr(&mut self, n: u8, value: u8) -> Result<(), CoreError> {
        let addr = self.gpr_address(n)?;
        self.iram[usize::from(addr)] = value;
        Ok(())
    }

    /// Reads the 16-bit data pointer from its backing internal-RAM pair.
    #[must_use]
    pub const fn dptr(&self) -> u16 {
        u16::from_be_bytes([
            self.iram[DPH_ADDRESS as usize],
            self.iram[DPL_ADDRESS as usize],
        ])
    }

    /// Writes the 16-bit data pointer to its backing internal-RAM pair.
    pub const fn set_dptr(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.iram[DPH_ADDRESS as usize] = high;
        self.iram[DPL_ADDRESS as usize] = low;
    }

    /// Requests an absolute jump: sets the program counter and the one-shot
    /// jump flag so the engine skips the default sequential advance for the
    /// current step.
    pub const fn jump_to(&mut self, target: u16) {
        self.regs.set_pc(target);
        self.jumped = true;
    }

    /// Requests a relative branch: `pc := pc + 2 + offset` modulo the
    /// 16-bit code space, with the jump flag set.
    pub fn relative_jump(&mut self, offset: i8) {
        let target = self
            .regs
            .pc()
            .wrapping_add(2)
            .wrapping_add_signed(i16::from(offset));
        self.jump_to(target);
    }

    /// Latches a failure into the sticky fault slot and returns it.
    const fn latch(&mut self, err: CoreError) -> CoreError {
        self.fault = Some(err);
        err
    }

    /// Performs exactly one fetch-decode-execute cycle.
    ///
    /// Once a failure is latched the core is terminal: every further call
    /// returns the stored failure without attempting a fetch, until the
    /// owner calls [`Core::reset`] or constructs a new core. Side effects a
    /// handler applied before a failure was detected in the same step are
    /// not rolled back.
    ///
    /// # Errors
    ///
    /// Returns the sticky failure when one is already latched,
    /// [`CoreError::CodeOutOfRange`] on a failed fetch or when the next
    /// sequential instruction would start past the 16-bit code space,
    /// [`CoreError::UnknownInstruction`] for an undefined opcode, and any
    /// failure reported by the instruction's execution handler.
    pub fn step(&mut self) -> Result<(), CoreError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let mut opcode_buf = [0_u8; 1];
        if let Err(err) = self.code.read_code(self.regs.pc(), &mut opcode_buf) {
            return Err(self.latch(err));
        }
        let opcode = opcode_buf[0];

        let descriptor = *self.table.descriptor(opcode);
        if !descriptor.is_defined() {
            return Err(self.latch(CoreError::UnknownInstruction));
        }

        let length = usize::from(descriptor.length);
        if length > 0 {
            let start = self.regs.pc().wrapping_add(1);
            if let Err(err) = self.code.read_code(start, &mut self.operands[..length]) {
                return Err(self.latch(err));
            }
        }

        if let Some(exec) = descriptor.exec {
            let event = ExecEvent::new(opcode, descriptor, self.operands);
            if let Err(err) = exec(self, &event) {
                return Err(self.latch(err));
            }
        }

        // Checked against the post-execution program counter, so a jump
        // close to the top of the code space faults here as well.
        if u32::from(self.regs.pc()) + 1 + u32::from(descriptor.length) > CODE_ADDRESS_MAX {
            return Err(self.latch(CoreError::CodeOutOfRange));
        }

        if self.jumped {
            self.jumped = false;
        } else {
            let advance = u16::from(descriptor.length) + 1;
            self.regs.set_pc(self.regs.pc().wrapping_add(advance));
        }

        self.cycles += u64::from(descriptor.cycles);
        Ok(())
    }
}
