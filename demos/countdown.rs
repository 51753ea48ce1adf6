use color_eyre::eyre::Result;

use cpu6502::memory::{AddressSpace, PROGRAM_START};
use cpu6502::processor::Processor;
use cpu6502::write_instructions;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap(); // logging

    let mut mem = AddressSpace::default();

    // Echo '5' down to '1' on the teletype, then halt
    use cpu6502::processor::Instruction::*;
    write_instructions!(mem : PROGRAM_START =>
        LDX_IMM,
        0x05,
        TXA,
        CLC,
        ADC_IMM,
        b'0',
        STA_ABS,
        0x00,
        0xFF,
        DEX,
        BNE,
        0xF6,
        BRK,
        0x00
    );

    let mut cpu = Processor::new(mem);
    cpu.reset();
    cpu.set_program_counter(PROGRAM_START);
    cpu.execute_until_brk();

    Ok(())
}
