use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::memory::{Byte, Word};

/// How an instruction finds its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    /// Operates on the accumulator register itself
    Accumulator,
    /// One operand byte holding the value
    Immediate,
    /// One operand byte holding an address in page zero
    ZeroPage,
    /// Two operand bytes holding a little endian address
    Absolute,
    /// One operand byte holding a signed branch offset
    Relative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode
    pub fn operand_len(self) -> Word {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate | AddressingMode::ZeroPage | AddressingMode::Relative => 1,
            AddressingMode::Absolute => 2,
        }
    }
}

/// An operand after its addressing mode has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(Byte),
    Memory(Word),
    Relative(i8),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Implied => Ok(()),
            Operand::Accumulator => f.write_str("A"),
            Operand::Immediate(value) => write!(f, "#${:02X}", value),
            Operand::Memory(address) if *address <= 0xFF => write!(f, "${:02X}", address),
            Operand::Memory(address) => write!(f, "${:04X}", address),
            Operand::Relative(offset) => write!(f, "*{:+}", offset),
        }
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal => $mode:ident , )+ ) => {
        /// Defines the implemented opcodes, named `MNEMONIC_MODE`
        #[allow(non_camel_case_types)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            pub fn mode(&self) -> AddressingMode {
                match self {
                    $( Self::$name => AddressingMode::$mode , )+
                }
            }
        }
    }
}

impl Instruction {
    /// The assembler mnemonic, e.g. `LDA` for `LDA_IMM`
    pub fn mnemonic(&self) -> &'static str {
        let name = self.name();
        name.split('_').next().unwrap_or(name)
    }

    /// Encoded size in bytes, opcode included
    pub fn size(&self) -> Word {
        1 + self.mode().operand_len()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

instructions! {
    // Load/Store
    /// Load accumulator
    LDA_IMM = 0xA9 => Immediate,
    /// Load accumulator
    LDA_ZP = 0xA5 => ZeroPage,
    /// Load accumulator
    LDA_ABS = 0xAD => Absolute,
    /// Load X
    LDX_IMM = 0xA2 => Immediate,
    /// Load X
    LDX_ZP = 0xA6 => ZeroPage,
    /// Load X
    LDX_ABS = 0xAE => Absolute,
    /// Load Y
    LDY_IMM = 0xA0 => Immediate,
    /// Load Y
    LDY_ZP = 0xA4 => ZeroPage,
    /// Load Y
    LDY_ABS = 0xAC => Absolute,
    /// Store accumulator
    STA_ZP = 0x85 => ZeroPage,
    /// Store accumulator
    STA_ABS = 0x8D => Absolute,
    /// Store X
    STX_ZP = 0x86 => ZeroPage,
    /// Store X
    STX_ABS = 0x8E => Absolute,
    /// Store Y
    STY_ZP = 0x84 => ZeroPage,
    /// Store Y
    STY_ABS = 0x8C => Absolute,

    // Register transfers
    /// Transfer A to X
    TAX = 0xAA => Implied,
    /// Transfer A to Y
    TAY = 0xA8 => Implied,
    /// Transfer X to A
    TXA = 0x8A => Implied,
    /// Transfer Y to A
    TYA = 0x98 => Implied,
    /// Transfer stack pointer to X
    TSX = 0xBA => Implied,
    /// Transfer X to stack pointer, flags untouched
    TXS = 0x9A => Implied,

    // Stack
    /// Push accumulator
    PHA = 0x48 => Implied,
    /// Push status
    PHP = 0x08 => Implied,
    /// Pull accumulator
    PLA = 0x68 => Implied,
    /// Pull status
    PLP = 0x28 => Implied,

    // Logical
    /// A & M
    AND_IMM = 0x29 => Immediate,
    /// A & M
    AND_ZP = 0x25 => ZeroPage,
    /// A & M
    AND_ABS = 0x2D => Absolute,
    /// A ^ M
    EOR_IMM = 0x49 => Immediate,
    /// A ^ M
    EOR_ZP = 0x45 => ZeroPage,
    /// A ^ M
    EOR_ABS = 0x4D => Absolute,
    /// A | M
    ORA_IMM = 0x09 => Immediate,
    /// A | M
    ORA_ZP = 0x05 => ZeroPage,
    /// A | M
    ORA_ABS = 0x0D => Absolute,
    /// Bit test
    BIT_ZP = 0x24 => ZeroPage,
    /// Bit test
    BIT_ABS = 0x2C => Absolute,

    // Arithmetic
    /// Add with carry
    ADC_IMM = 0x69 => Immediate,
    /// Add with carry
    ADC_ZP = 0x65 => ZeroPage,
    /// Add with carry
    ADC_ABS = 0x6D => Absolute,
    /// Subtract with carry
    SBC_IMM = 0xE9 => Immediate,
    /// Subtract with carry
    SBC_ZP = 0xE5 => ZeroPage,
    /// Subtract with carry
    SBC_ABS = 0xED => Absolute,
    /// Compare accumulator
    CMP_IMM = 0xC9 => Immediate,
    /// Compare accumulator
    CMP_ZP = 0xC5 => ZeroPage,
    /// Compare accumulator
    CMP_ABS = 0xCD => Absolute,
    /// Compare X
    CPX_IMM = 0xE0 => Immediate,
    /// Compare X
    CPX_ZP = 0xE4 => ZeroPage,
    /// Compare X
    CPX_ABS = 0xEC => Absolute,
    /// Compare Y
    CPY_IMM = 0xC0 => Immediate,
    /// Compare Y
    CPY_ZP = 0xC4 => ZeroPage,
    /// Compare Y
    CPY_ABS = 0xCC => Absolute,

    // Increments & decrements
    /// Increment memory
    INC_ZP = 0xE6 => ZeroPage,
    /// Increment memory
    INC_ABS = 0xEE => Absolute,
    /// Increment X
    INX = 0xE8 => Implied,
    /// Increment Y
    INY = 0xC8 => Implied,
    /// Decrement memory
    DEC_ZP = 0xC6 => ZeroPage,
    /// Decrement memory
    DEC_ABS = 0xCE => Absolute,
    /// Decrement X
    DEX = 0xCA => Implied,
    /// Decrement Y
    DEY = 0x88 => Implied,

    // Shifts
    /// Arithmetic shift left
    ASL_ACC = 0x0A => Accumulator,
    /// Arithmetic shift left
    ASL_ZP = 0x06 => ZeroPage,
    /// Arithmetic shift left
    ASL_ABS = 0x0E => Absolute,
    /// Logical shift right
    LSR_ACC = 0x4A => Accumulator,
    /// Logical shift right
    LSR_ZP = 0x46 => ZeroPage,
    /// Logical shift right
    LSR_ABS = 0x4E => Absolute,
    /// Rotate left through carry
    ROL_ACC = 0x2A => Accumulator,
    /// Rotate left through carry
    ROL_ZP = 0x26 => ZeroPage,
    /// Rotate left through carry
    ROL_ABS = 0x2E => Absolute,
    /// Rotate right through carry
    ROR_ACC = 0x6A => Accumulator,
    /// Rotate right through carry
    ROR_ZP = 0x66 => ZeroPage,
    /// Rotate right through carry
    ROR_ABS = 0x6E => Absolute,

    // Jumps & calls
    /// Jump
    JMP_ABS = 0x4C => Absolute,
    /// Jump to subroutine
    JSR_ABS = 0x20 => Absolute,
    /// Return from subroutine
    RTS = 0x60 => Implied,

    // Branches
    /// Branch if plus
    BPL = 0x10 => Relative,
    /// Branch if minus
    BMI = 0x30 => Relative,
    /// Branch if overflow clear
    BVC = 0x50 => Relative,
    /// Branch if overflow set
    BVS = 0x70 => Relative,
    /// Branch if carry clear
    BCC = 0x90 => Relative,
    /// Branch if carry set
    BCS = 0xB0 => Relative,
    /// Branch if not equal
    BNE = 0xD0 => Relative,
    /// Branch if equal
    BEQ = 0xF0 => Relative,

    // Status flag changes
    /// Clear carry
    CLC = 0x18 => Implied,
    /// Set carry
    SEC = 0x38 => Implied,
    /// Clear interrupt disable
    CLI = 0x58 => Implied,
    /// Set interrupt disable
    SEI = 0x78 => Implied,
    /// Clear overflow
    CLV = 0xB8 => Implied,
    /// Clear decimal
    CLD = 0xD8 => Implied,
    /// Set decimal
    SED = 0xF8 => Implied,

    // System
    /// Software interrupt. The byte after the opcode is padding
    BRK = 0x00 => Implied,
    /// No operation
    NOP = 0xEA => Implied,
    /// Return from interrupt
    RTI = 0x40 => Implied,
}
