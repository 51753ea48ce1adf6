use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::*;

pub mod device;
pub mod parse;

pub use device::{CharacterDisplay, DisplayCommand, ExtendedAddressSpace, MappedDevice};

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Number of addressable bytes
pub const MEMORY_SIZE: usize = 0x10000;
/// Page holding the hardware stack
pub const STACK_PAGE: Word = 0x0100;
/// Conventional load address for programs
pub const PROGRAM_START: Word = 0x8000;
/// Legacy console echo. Superseded by the device range of [`ExtendedAddressSpace`].
pub const TELETYPE_ADDRESS: Word = 0xFF00;
/// Little endian address loaded into PC on reset
pub const RESET_VECTOR: Word = 0xFFFC;
/// Little endian address loaded into PC on BRK
pub const BREAK_VECTOR: Word = 0xFFFE;
/// First address claimed by the mapped device
pub const DEVICE_START: Word = 0xD000;
/// Last address claimed by the mapped device
pub const DEVICE_END: Word = 0xDFFF;

/// Byte-wide access to a 16 bit address space.
///
/// Addresses are `Word`s, so every address computation is already taken
/// modulo 65536 before it reaches an implementation.
pub trait AddressBus {
    /// Reads a byte from the bus
    fn read_byte(&mut self, address: Word) -> Byte;

    /// Writes a byte to the bus
    fn write_byte(&mut self, address: Word, value: Byte);

    /// Reads a word from the bus (little endian)
    fn read_word(&mut self, address: Word) -> Word {
        let low = self.read_byte(address) as Word;
        let high = self.read_byte(address.wrapping_add(1)) as Word;
        high << 8 | low
    }

    /// Writes a word to the bus (little endian)
    fn write_word(&mut self, address: Word, value: Word) {
        self.write_byte(address, (value & 0xFF) as Byte);
        self.write_byte(address.wrapping_add(1), (value >> 8) as Byte);
    }

    /// Writes an array of bytes to the bus, wrapping past 0xFFFF
    fn write_array(&mut self, address: Word, data: &[Byte]) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(address.wrapping_add(offset as Word), *byte);
        }
    }

    /// Loads a program image at `base`
    fn load(&mut self, base: Word, program: &[Byte]) {
        debug!("Loading {} bytes at 0x{:04X}", program.len(), base);
        self.write_array(base, program);
    }
}

/// Flat 64KB of zero-initialized memory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressSpace {
    data: Box<[Byte; MEMORY_SIZE]>,
}

impl Default for AddressSpace {
    /// Initializes the memory
    fn default() -> Self {
        Self {
            data: Box::new([0; MEMORY_SIZE]),
        }
    }
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a byte without going through the bus
    pub fn peek(&self, address: Word) -> Byte {
        self.data[address as usize]
    }

    /// Logs a hex dump of `len` bytes starting at `start`
    pub fn dump(&self, start: Word, len: usize) {
        for row in (0..len).step_by(16) {
            let address = start.wrapping_add(row as Word);
            let mut line = format!("{:04X}:", address);
            for offset in row..(row + 16).min(len) {
                line.push_str(&format!(" {:02X}", self.peek(start.wrapping_add(offset as Word))));
            }
            info!("{}", line);
        }
    }

    /// Parses a program listing from a file, see [`parse`] for the format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read listing {}", path.display()))?;
        source.parse::<Self>().map_err(|errors: Vec<parse::ParseError>| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            eyre!("{}: {}", path.display(), messages.join("; "))
        })
    }
}

impl AddressBus for AddressSpace {
    fn read_byte(&mut self, address: Word) -> Byte {
        let value = self.data[address as usize];
        trace!(target: "memory", "read  0x{:04X} -> 0x{:02X}", address, value);
        value
    }

    fn write_byte(&mut self, address: Word, value: Byte) {
        trace!(target: "memory", "write 0x{:04X} <- 0x{:02X}", address, value);
        self.data[address as usize] = value;

        if address == TELETYPE_ADDRESS {
            info!(target: "teletype", "{}", value as char);
        }
    }
}

impl FromStr for AddressSpace {
    type Err = Vec<parse::ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::Parser::new(s, AddressSpace::default()).parse()
    }
}

/// Writes a block of instructions directly onto a bus
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $crate::memory::AddressBus::write_array(&mut $mem, $pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ]);
    };
}
