use std::fmt;

use num_enum::IntoPrimitive;

use crate::memory::Byte;

/// A single bit of the status register
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
pub enum Flag {
    Carry = 1 << 0,
    Zero = 1 << 1,
    /// Settable, but no interrupt line is modeled
    Interrupt = 1 << 2,
    /// Settable, but arithmetic is always binary
    Decimal = 1 << 3,
    Break = 1 << 4,
    Unused = 1 << 5,
    Overflow = 1 << 6,
    Negative = 1 << 7,
}

impl Flag {
    pub const ALL: [Flag; 8] = [
        Flag::Negative,
        Flag::Overflow,
        Flag::Unused,
        Flag::Break,
        Flag::Decimal,
        Flag::Interrupt,
        Flag::Zero,
        Flag::Carry,
    ];

    fn letter(self) -> char {
        match self {
            Flag::Negative => 'N',
            Flag::Overflow => 'V',
            Flag::Unused => '-',
            Flag::Break => 'B',
            Flag::Decimal => 'D',
            Flag::Interrupt => 'I',
            Flag::Zero => 'Z',
            Flag::Carry => 'C',
        }
    }
}

/// The processor status register (P)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Status(Byte);

impl Status {
    pub fn from_bits(bits: Byte) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> Byte {
        self.0
    }

    pub fn get(self, flag: Flag) -> bool {
        self.0 & Byte::from(flag) != 0
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        if value {
            self.0 |= Byte::from(flag);
        } else {
            self.0 &= !Byte::from(flag);
        }
    }

    /// Sets `Zero` and `Negative` from a freshly produced value
    pub fn update_zero_and_negative(&mut self, value: Byte) {
        self.set(Flag::Zero, value == 0);
        self.set(Flag::Negative, value & 0x80 != 0);
    }

    /// Same register with `flag` forced on
    pub fn with(mut self, flag: Flag) -> Self {
        self.set(flag, true);
        self
    }
}

impl From<Byte> for Status {
    fn from(bits: Byte) -> Self {
        Self(bits)
    }
}

impl From<Status> for Byte {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Display for Status {
    /// `NV-BDIZC`, lowercase for cleared bits
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in Flag::ALL.iter() {
            let letter = flag.letter();
            if self.get(*flag) {
                write!(f, "{}", letter)?;
            } else {
                write!(f, "{}", letter.to_ascii_lowercase())?;
            }
        }
        Ok(())
    }
}
