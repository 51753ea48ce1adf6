//! Byte-level program listings.
//!
//! ```text
//! # countdown
//! 0x8000:
//! %reset
//!     LDX_IMM
//!     !0x05
//!     DEX
//!     BNE
//!     !0xFD
//!     BRK
//!     !0x00
//! ```
//!
//! - `0x8000:` moves the write position (`0b`, `0o`, `0x` or decimal)
//! - `!0x05` writes a byte, `!W0x1234` writes a little endian word
//! - `LDA_IMM` writes the opcode named by [`Instruction::name`]
//! - `%reset` / `%break` point the reset or break vector at the write position

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use crate::processor::Instruction;

use super::{AddressBus, Byte, Word, BREAK_VECTOR, RESET_VECTOR};

macro_rules! propagate {
    ( $res:expr ) => {
        match $res {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidLiteral,
    InvalidMetaCommand,
    InvalidInstruction,
    InvalidAddressLabel,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidLiteral => f.write_str("invalid literal"),
            ParseErrorKind::InvalidMetaCommand => f.write_str("invalid meta command"),
            ParseErrorKind::InvalidInstruction => f.write_str("failed to resolve instruction"),
            ParseErrorKind::InvalidAddressLabel => f.write_str("invalid address label"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

macro_rules! parse_number {
    ( $ty:ty: $s:expr ) => {{
        let line = $s;

        if line.trim().is_empty() {
            None
        } else {
            let (radix, offset) = match line.as_bytes() {
                [b'0', b'b', ..] => (2, 2),
                [b'0', b'o', ..] => (8, 2),
                [b'0', b'x', ..] => (16, 2),
                _ => (10, 0),
            };

            Some(<$ty>::from_str_radix(&line[offset..], radix).map_err(|_| radix))
        }
    }};
}

#[derive(Debug, Clone)]
pub struct Parser<'a, M> {
    lines: Lines<'a>,
    line_nr: usize,
    /// Next address to write; one past 0xFFFF once the end is reached
    position: u32,
    memory: M,
}

impl<'a, M: AddressBus> Parser<'a, M> {
    /// Creates a new parser for `data` which will try to populate `memory`.
    pub fn new(data: &'a str, memory: M) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse the whole listing into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<M, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line of [`Parser::lines`]. Each instruction
    /// should be located on it's own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?.trim();
        self.line_nr += 1;

        if line.is_empty() || line.starts_with('#') {
            // Comment or empty line; skip
            Some(Ok(()))
        } else if let Some(command) = line.strip_prefix('%') {
            self.parse_meta_command(command)
        } else if let Some(literal) = line.strip_prefix('!') {
            self.parse_literal(literal)
        } else if let Some(label) = line.strip_suffix(':') {
            self.parse_address_label(label)
        } else {
            self.parse_instruction(line)
        }
    }

    /// Tries to parse a meta command, without its `%` prefix.
    ///
    /// # Examples
    ///
    /// - `%reset`
    /// - `%break`
    fn parse_meta_command(&mut self, command: &str) -> Option<Result<()>> {
        log::debug!("[{}] Found meta command", self.line_nr);

        let vector = match command.trim() {
            "reset" => RESET_VECTOR,
            "break" => BREAK_VECTOR,
            _ => {
                return Some(Err(ParseError::new(
                    ParseErrorKind::InvalidMetaCommand,
                    format!("unknown command `{}`", command),
                    self.line_nr,
                )))
            }
        };

        let target = propagate!(self.current_address());
        self.memory.write_word(vector, target);

        Some(Ok(()))
    }

    /// Tries to parse a literal, without its `!` prefix.
    ///
    /// # Examples
    ///
    /// - `! 0x22`
    /// - `!W0xdead`
    fn parse_literal(&mut self, literal: &str) -> Option<Result<()>> {
        if let Some(line) = literal.strip_prefix('W') {
            // Literal is a word
            log::debug!("[{}] Found word literal", self.line_nr);

            let word = propagate!(self.literal_number(parse_number!(u16: line.trim()), "word"));
            Some(self.write_word(word))
        } else {
            // Literal is a byte
            log::debug!("[{}] Found byte literal", self.line_nr);

            let byte = propagate!(self.literal_number(parse_number!(u8: literal.trim()), "byte"));
            Some(self.write_byte(byte))
        }
    }

    fn literal_number<T>(
        &self,
        parsed: Option<std::result::Result<T, u32>>,
        width: &str,
    ) -> Result<T> {
        parsed
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidLiteral,
                    "a literal needs to have a number set",
                    self.line_nr,
                )
            })?
            .map_err(|radix| {
                ParseError::new(
                    ParseErrorKind::InvalidLiteral,
                    format!("failed to parse literal as {} with radix `{}`", width, radix),
                    self.line_nr,
                )
            })
    }

    /// Tries to parse an address label, without its `:` suffix.
    ///
    /// # Examples
    ///
    /// - `0x8000:`
    /// - `0o44:`
    fn parse_address_label(&mut self, label: &str) -> Option<Result<()>> {
        log::debug!("[{}] Found address label", self.line_nr);

        // The address is intentionally parsed as an u16 to detect if it's
        // a valid address.
        let address = propagate!(propagate!(parse_number!(u16: label.trim()).ok_or_else(
            || ParseError::new(
                ParseErrorKind::InvalidAddressLabel,
                "an address label needs to have an address set",
                self.line_nr
            )
        ))
        .map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: usize::MAX,
                },
                format!("failed to parse the address with radix `{}`", radix),
                self.line_nr,
            )
        }));

        log::debug!("[{}] Address label `0x{:x}`", self.line_nr, address);

        self.position = address as u32;

        Some(Ok(()))
    }

    /// Tries to parse a instruction name.
    ///
    /// # Examples
    ///
    /// - `LDA_IMM`
    /// - `BRK`
    fn parse_instruction(&mut self, line: &str) -> Option<Result<()>> {
        let instruction = *propagate!(Instruction::ALL
            .iter()
            .find(|instruction| line == instruction.name())
            .ok_or_else(|| ParseError::new(
                ParseErrorKind::InvalidInstruction,
                format!("no instruction named `{}`", line),
                self.line_nr
            )));

        log::debug!("[{}] Found instruction {}", self.line_nr, instruction);

        Some(self.write_byte(instruction))
    }

    /// The address the next byte lands on.
    ///
    /// # Errors
    ///
    /// Fails once the listing has run past 0xFFFF.
    fn current_address(&self) -> Result<Word> {
        if self.position > Word::MAX as u32 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: self.position as usize,
                },
                "address is outside of memory",
                self.line_nr,
            ));
        }

        Ok(self.position as Word)
    }

    /// Writes `byte` at [`Parser::position`] and advances by one.
    fn write_byte<B: Into<Byte>>(&mut self, byte: B) -> Result<()> {
        let address = self.current_address()?;
        self.memory.write_byte(address, byte.into());
        self.position += 1;
        Ok(())
    }

    /// Writes a little endian `word` at [`Parser::position`] and advances by
    /// two.
    fn write_word(&mut self, word: Word) -> Result<()> {
        let [low, high] = word.to_le_bytes();
        self.write_byte(low)?;
        self.write_byte(high)
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::{AddressSpace, PROGRAM_START};
    use std::str::FromStr;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_load_and_break() -> Result<()> {
        let data = r#"
            0x8000:
                LDA_IMM
                !5
                STA_ABS
                !W0xFF00
                BRK
        "#;

        let mem = AddressSpace::from_str(data).unwrap();

        assert_eq!(mem.peek(PROGRAM_START), Byte::from(Instruction::LDA_IMM));
        assert_eq!(mem.peek(PROGRAM_START + 1), 5);
        assert_eq!(mem.peek(PROGRAM_START + 2), Byte::from(Instruction::STA_ABS));
        assert_eq!(mem.peek(PROGRAM_START + 3), 0x00); // little endian
        assert_eq!(mem.peek(PROGRAM_START + 4), 0xFF);
        assert_eq!(mem.peek(PROGRAM_START + 5), Byte::from(Instruction::BRK));

        Ok(())
    }

    #[test]
    fn parse_offset_binary() -> Result<()> {
        const ENTRYPOINT: u16 = 0b110011;
        let data = r#"
            0b110011:
                NOP
                !1
        "#;

        let mem = AddressSpace::from_str(data).unwrap();

        assert_eq!(mem.peek(ENTRYPOINT), Byte::from(Instruction::NOP));
        assert_eq!(mem.peek(ENTRYPOINT + 1), 1);

        Ok(())
    }

    #[test]
    fn parse_offset_octal_and_decimal() -> Result<()> {
        let data = r#"
            0o711:
                !0x11
            1111:
                !0b101
        "#;

        let mem = AddressSpace::from_str(data).unwrap();

        assert_eq!(mem.peek(0o711), 0x11);
        assert_eq!(mem.peek(1111), 0b101);

        Ok(())
    }

    #[test]
    fn parse_vectors() -> Result<()> {
        let data = r#"
            0x9000:
            %break
                RTI
            0x8000:
            %reset
                BRK
        "#;

        let mem = AddressSpace::from_str(data).unwrap();

        assert_eq!(mem.peek(0xFFFC), 0x00);
        assert_eq!(mem.peek(0xFFFD), 0x80);
        assert_eq!(mem.peek(0xFFFE), 0x00);
        assert_eq!(mem.peek(0xFFFF), 0x90);
        assert_eq!(mem.peek(0x9000), Byte::from(Instruction::RTI));

        Ok(())
    }

    #[test]
    fn parse_collects_errors() -> Result<()> {
        let data = r#"
            0x8000:
                LDA
                !0x100
            %org
            0xZZ:
        "#;

        let errors = AddressSpace::from_str(data).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(ParseError::kind).collect();

        assert_eq!(
            kinds,
            vec![
                ParseErrorKind::InvalidInstruction,
                ParseErrorKind::InvalidLiteral,
                ParseErrorKind::InvalidMetaCommand,
                ParseErrorKind::InvalidAddress {
                    address: usize::MAX
                },
            ]
        );
        assert_eq!(errors[0].line_nr(), 3);

        Ok(())
    }

    #[test]
    fn parse_rejects_writes_past_end() -> Result<()> {
        let data = r#"
            0xFFFF:
                !0x01
                !0x02
        "#;

        let errors = AddressSpace::from_str(data).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind(),
            ParseErrorKind::InvalidAddress { address: 0x10000 }
        );

        Ok(())
    }
}
