use color_eyre::eyre::Result;

use cpu6502::memory::{AddressBus, Byte, CharacterDisplay, ExtendedAddressSpace, PROGRAM_START};
use cpu6502::processor::{Instruction, Processor};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Even device address: latch a character
const DISPLAY_DATA: u16 = 0xD000;
/// Odd device address: issue a command
const DISPLAY_COMMAND: u16 = 0xD001;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap(); // logging

    let mut mem = ExtendedAddressSpace::new(CharacterDisplay::new());

    let [data_low, data_high] = DISPLAY_DATA.to_le_bytes();
    let [command_low, command_high] = DISPLAY_COMMAND.to_le_bytes();
    let mut program: Vec<Byte> = vec![Instruction::LDX_IMM.into(), 0x01];
    for ch in "HELLO".bytes() {
        program.extend_from_slice(&[
            Instruction::LDA_IMM.into(),
            ch,
            Instruction::STA_ABS.into(),
            data_low,
            data_high,
            Instruction::STX_ABS.into(),
            command_low,
            command_high,
        ]);
    }
    program.push(Instruction::BRK.into());
    mem.load(PROGRAM_START, &program);

    let mut cpu = Processor::new(mem);
    cpu.reset();
    cpu.set_program_counter(PROGRAM_START);
    cpu.execute_until_brk();

    log::info!("Screen: {}", cpu.memory().device().screen());

    Ok(())
}
