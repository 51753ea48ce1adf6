use color_eyre::eyre::Result;

use cpu6502::memory::AddressSpace;
use cpu6502::processor::Processor;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/programs/multiply.lst".to_owned());
    let mem = AddressSpace::from_file(&path)?;
    mem.dump(0x8000, 0x20);

    // the listing points the reset vector at its entry
    let mut cpu = Processor::new(mem);
    cpu.reset();
    cpu.execute_until_brk();

    log::info!("Result: 0x{:02X} / {}", cpu.a, cpu.a);

    Ok(())
}
