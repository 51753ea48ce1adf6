//! An instruction-accurate emulator for a subset of the MOS 6502.
//!
//! Load a program into an [`AddressBus`](memory::AddressBus), hand it to a
//! [`Processor`](processor::Processor) and step it until it hits `BRK`.

pub mod memory;
pub mod processor;
