use std::convert::TryFrom;

use crate::memory::{AddressBus, Byte, Word, BREAK_VECTOR, RESET_VECTOR, STACK_PAGE};
use log::*;

mod instruction;
mod status;

pub use instruction::{AddressingMode, Instruction, Operand};
pub use status::{Flag, Status};

/// Stack pointer after power on and reset
pub const STACK_POINTER_RESET: Byte = 0xFD;

/// Emulates a MOS 6502 (subset) over an owned memory bus
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Processor<M> {
    /// Accumulator
    pub a: Byte,
    /// X index register
    pub x: Byte,
    /// Y index register
    pub y: Byte,
    /// Status register
    pub status: Status,
    /// Program counter
    pub pc: Word,
    /// Stack pointer, offset into page 0x01
    pub sp: Byte,
    memory: M,
}

impl<M: AddressBus + Default> Default for Processor<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M> Processor<M> {
    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn into_memory(self) -> M {
        self.memory
    }

    /// Starts execution at `address`, bypassing the reset vector
    pub fn set_program_counter(&mut self, address: Word) {
        self.pc = address;
    }
}

impl<M: AddressBus> Processor<M> {
    /// Initializes a new CPU over `memory`
    pub fn new(memory: M) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            status: Status::default().with(Flag::Unused),
            pc: 0,
            sp: STACK_POINTER_RESET,
            memory,
        }
    }

    /// Clears the registers and loads PC from the reset vector
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.status = Status::default();
        self.sp = STACK_POINTER_RESET;
        self.pc = self.memory.read_word(RESET_VECTOR);

        debug!("Reset, PC = 0x{:04X}", self.pc);
    }

    /// Reads the opcode at PC and moves past it
    pub fn fetch_opcode(&mut self) -> Byte {
        self.next_byte()
    }

    /// Executes a raw opcode whose byte has already been fetched.
    ///
    /// Unknown opcodes are reported and skipped.
    pub fn execute(&mut self, opcode: Byte) {
        match Instruction::try_from(opcode) {
            Ok(instruction) => self.execute_instruction(instruction),
            Err(_) => warn!(
                "Unknown opcode 0x{:02X} at 0x{:04X}",
                opcode,
                self.pc.wrapping_sub(1)
            ),
        }
    }

    /// Runs one execution step and returns the opcode it processed
    pub fn step(&mut self) -> Byte {
        let opcode = self.fetch_opcode();
        self.execute(opcode);
        opcode
    }

    /// Steps until a `BRK` has been processed and returns the number of steps.
    ///
    /// The `BRK` is executed like any other opcode: when this returns, PC and
    /// status have been pushed and PC holds the address from [`BREAK_VECTOR`].
    pub fn execute_until_brk(&mut self) -> usize {
        let mut steps = 0;
        loop {
            steps += 1;
            if self.step() == Byte::from(Instruction::BRK) {
                break;
            }
        }

        info!("Program terminated after {} steps", steps);
        steps
    }

    /// Executes a single, already fetched instruction
    pub fn execute_instruction(&mut self, instruction: Instruction) {
        let address = self.pc.wrapping_sub(1);
        let operand = self.resolve(instruction.mode());
        debug!("{:04X}  {} {}", address, instruction, operand);

        use Instruction::*;
        match instruction {
            LDA_IMM | LDA_ZP | LDA_ABS => {
                self.a = self.read_operand(operand);
                self.status.update_zero_and_negative(self.a);
            }
            LDX_IMM | LDX_ZP | LDX_ABS => {
                self.x = self.read_operand(operand);
                self.status.update_zero_and_negative(self.x);
            }
            LDY_IMM | LDY_ZP | LDY_ABS => {
                self.y = self.read_operand(operand);
                self.status.update_zero_and_negative(self.y);
            }
            STA_ZP | STA_ABS => self.write_operand(operand, self.a),
            STX_ZP | STX_ABS => self.write_operand(operand, self.x),
            STY_ZP | STY_ABS => self.write_operand(operand, self.y),

            TAX => {
                self.x = self.a;
                self.status.update_zero_and_negative(self.x);
            }
            TAY => {
                self.y = self.a;
                self.status.update_zero_and_negative(self.y);
            }
            TXA => {
                self.a = self.x;
                self.status.update_zero_and_negative(self.a);
            }
            TYA => {
                self.a = self.y;
                self.status.update_zero_and_negative(self.a);
            }
            TSX => {
                self.x = self.sp;
                self.status.update_zero_and_negative(self.x);
            }
            TXS => self.sp = self.x,

            PHA => self.push(self.a),
            PHP => self.push(self.status.bits()),
            PLA => {
                self.a = self.pull();
                self.status.update_zero_and_negative(self.a);
            }
            PLP => self.status = Status::from_bits(self.pull()),

            AND_IMM | AND_ZP | AND_ABS => {
                self.a &= self.read_operand(operand);
                self.status.update_zero_and_negative(self.a);
            }
            EOR_IMM | EOR_ZP | EOR_ABS => {
                self.a ^= self.read_operand(operand);
                self.status.update_zero_and_negative(self.a);
            }
            ORA_IMM | ORA_ZP | ORA_ABS => {
                self.a |= self.read_operand(operand);
                self.status.update_zero_and_negative(self.a);
            }
            BIT_ZP | BIT_ABS => {
                let value = self.read_operand(operand);
                self.status.set(Flag::Zero, self.a & value == 0);
                self.status.set(Flag::Negative, value & 0x80 != 0);
                self.status.set(Flag::Overflow, value & 0x40 != 0);
            }

            ADC_IMM | ADC_ZP | ADC_ABS => {
                let value = self.read_operand(operand);
                self.add_with_carry(value);
            }
            SBC_IMM | SBC_ZP | SBC_ABS => {
                let value = self.read_operand(operand);
                self.add_with_carry(!value);
            }
            CMP_IMM | CMP_ZP | CMP_ABS => {
                let value = self.read_operand(operand);
                self.compare(self.a, value);
            }
            CPX_IMM | CPX_ZP | CPX_ABS => {
                let value = self.read_operand(operand);
                self.compare(self.x, value);
            }
            CPY_IMM | CPY_ZP | CPY_ABS => {
                let value = self.read_operand(operand);
                self.compare(self.y, value);
            }

            INC_ZP | INC_ABS => self.modify(operand, |_, value| value.wrapping_add(1)),
            DEC_ZP | DEC_ABS => self.modify(operand, |_, value| value.wrapping_sub(1)),
            INX => {
                self.x = self.x.wrapping_add(1);
                self.status.update_zero_and_negative(self.x);
            }
            INY => {
                self.y = self.y.wrapping_add(1);
                self.status.update_zero_and_negative(self.y);
            }
            DEX => {
                self.x = self.x.wrapping_sub(1);
                self.status.update_zero_and_negative(self.x);
            }
            DEY => {
                self.y = self.y.wrapping_sub(1);
                self.status.update_zero_and_negative(self.y);
            }

            ASL_ACC | ASL_ZP | ASL_ABS => self.modify(operand, |status, value| {
                status.set(Flag::Carry, value & 0x80 != 0);
                value << 1
            }),
            LSR_ACC | LSR_ZP | LSR_ABS => self.modify(operand, |status, value| {
                status.set(Flag::Carry, value & 0x01 != 0);
                value >> 1
            }),
            ROL_ACC | ROL_ZP | ROL_ABS => self.modify(operand, |status, value| {
                let carry_in = status.get(Flag::Carry) as Byte;
                status.set(Flag::Carry, value & 0x80 != 0);
                value << 1 | carry_in
            }),
            ROR_ACC | ROR_ZP | ROR_ABS => self.modify(operand, |status, value| {
                let carry_in = status.get(Flag::Carry) as Byte;
                status.set(Flag::Carry, value & 0x01 != 0);
                value >> 1 | carry_in << 7
            }),

            JMP_ABS => {
                if let Operand::Memory(target) = operand {
                    self.pc = target;
                }
            }
            JSR_ABS => {
                if let Operand::Memory(target) = operand {
                    // RTS adds the missing one back
                    self.push_word(self.pc.wrapping_sub(1));
                    self.pc = target;
                }
            }
            RTS => self.pc = self.pull_word().wrapping_add(1),

            BPL => self.branch_if(operand, !self.status.get(Flag::Negative)),
            BMI => self.branch_if(operand, self.status.get(Flag::Negative)),
            BVC => self.branch_if(operand, !self.status.get(Flag::Overflow)),
            BVS => self.branch_if(operand, self.status.get(Flag::Overflow)),
            BCC => self.branch_if(operand, !self.status.get(Flag::Carry)),
            BCS => self.branch_if(operand, self.status.get(Flag::Carry)),
            BNE => self.branch_if(operand, !self.status.get(Flag::Zero)),
            BEQ => self.branch_if(operand, self.status.get(Flag::Zero)),

            CLC => self.status.set(Flag::Carry, false),
            SEC => self.status.set(Flag::Carry, true),
            CLI => self.status.set(Flag::Interrupt, false),
            SEI => self.status.set(Flag::Interrupt, true),
            CLV => self.status.set(Flag::Overflow, false),
            CLD => self.status.set(Flag::Decimal, false),
            SED => self.status.set(Flag::Decimal, true),

            BRK => {
                // skip the padding byte
                self.pc = self.pc.wrapping_add(1);
                self.push_word(self.pc);
                self.push(self.status.with(Flag::Break).bits());
                self.pc = self.memory.read_word(BREAK_VECTOR);
            }
            NOP => {}
            RTI => {
                self.status = Status::from_bits(self.pull());
                let low = self.pull() as Word;
                let high = self.pull() as Word;
                self.pc = high << 8 | low;
            }
        }
    }

    /// Consumes the operand bytes of `mode`
    fn resolve(&mut self, mode: AddressingMode) -> Operand {
        match mode {
            AddressingMode::Implied => Operand::Implied,
            AddressingMode::Accumulator => Operand::Accumulator,
            AddressingMode::Immediate => Operand::Immediate(self.next_byte()),
            AddressingMode::ZeroPage => Operand::Memory(self.next_byte() as Word),
            AddressingMode::Absolute => {
                let low = self.next_byte() as Word;
                let high = self.next_byte() as Word;
                Operand::Memory(high << 8 | low)
            }
            AddressingMode::Relative => Operand::Relative(self.next_byte() as i8),
        }
    }

    fn read_operand(&mut self, operand: Operand) -> Byte {
        match operand {
            Operand::Immediate(value) => value,
            Operand::Memory(address) => self.memory.read_byte(address),
            Operand::Accumulator => self.a,
            Operand::Relative(offset) => offset as Byte,
            Operand::Implied => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: Byte) {
        match operand {
            Operand::Memory(address) => self.memory.write_byte(address, value),
            Operand::Accumulator => self.a = value,
            _ => {}
        }
    }

    /// Read-modify-write on memory or the accumulator
    fn modify<F>(&mut self, operand: Operand, f: F)
    where
        F: FnOnce(&mut Status, Byte) -> Byte,
    {
        let value = self.read_operand(operand);
        let result = f(&mut self.status, value);
        self.status.update_zero_and_negative(result);
        self.write_operand(operand, result);
    }

    fn add_with_carry(&mut self, value: Byte) {
        let sum = self.a as Word + value as Word + self.status.get(Flag::Carry) as Word;
        let result = sum as Byte;

        self.status.set(Flag::Carry, sum & 0x0100 != 0);
        // both addends share a sign the result does not have
        self.status
            .set(Flag::Overflow, (!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0);
        self.status.update_zero_and_negative(result);
        self.a = result;
    }

    fn compare(&mut self, register: Byte, value: Byte) {
        self.status.set(Flag::Carry, register >= value);
        self.status.set(Flag::Zero, register == value);
        self.status
            .set(Flag::Negative, register.wrapping_sub(value) & 0x80 != 0);
    }

    fn branch_if(&mut self, operand: Operand, condition: bool) {
        if let Operand::Relative(offset) = operand {
            if condition {
                self.pc = self.pc.wrapping_add(offset as i16 as Word);
            }
        }
    }

    fn next_byte(&mut self) -> Byte {
        let value = self.memory.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn push(&mut self, value: Byte) {
        self.memory.write_byte(STACK_PAGE + self.sp as Word, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self) -> Byte {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read_byte(STACK_PAGE + self.sp as Word)
    }

    /// Pushes high byte first
    fn push_word(&mut self, value: Word) {
        self.push((value >> 8) as Byte);
        self.push((value & 0xFF) as Byte);
    }

    /// Pulls low byte first
    fn pull_word(&mut self) -> Word {
        let low = self.pull() as Word;
        let high = self.pull() as Word;
        high << 8 | low
    }
}
