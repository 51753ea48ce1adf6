//! Memory-mapped peripherals.
//!
//! An [`ExtendedAddressSpace`] claims `DEVICE_START..=DEVICE_END` for its
//! device and forwards every other address to a flat [`AddressSpace`].

use std::convert::TryFrom;

use log::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::{AddressBus, AddressSpace, Byte, Word, DEVICE_END, DEVICE_START};

/// A peripheral answering reads and writes for a range of the bus.
///
/// Devices receive the absolute bus address.
pub trait MappedDevice {
    fn read_byte(&mut self, address: Word) -> Byte;
    fn write_byte(&mut self, address: Word, value: Byte);
}

/// Commands understood by the odd register of the [`CharacterDisplay`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum DisplayCommand {
    /// Wipe everything rendered so far
    Clear = 0x00,
    /// Render the latched character
    Render = 0x01,
}

/// Write-only character display.
///
/// Any even address latches a character, any odd address takes a
/// [`DisplayCommand`]. Reads always return 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CharacterDisplay {
    character: Byte,
    screen: String,
}

impl CharacterDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently latched character
    pub fn latched(&self) -> Byte {
        self.character
    }

    /// Everything rendered since the last clear
    pub fn screen(&self) -> &str {
        &self.screen
    }

    fn display_character(&mut self, ch: Byte) {
        self.screen.push(ch as char);
        info!("{}", ch as char);
    }

    fn clear(&mut self) {
        self.screen.clear();
        info!("[CLEAR]");
    }
}

impl MappedDevice for CharacterDisplay {
    fn read_byte(&mut self, _address: Word) -> Byte {
        0
    }

    fn write_byte(&mut self, address: Word, value: Byte) {
        if address % 2 == 0 {
            self.character = value;
            return;
        }

        match DisplayCommand::try_from(value) {
            Ok(DisplayCommand::Render) => self.display_character(self.character),
            Ok(DisplayCommand::Clear) => self.clear(),
            Err(_) => debug!("Ignoring display command 0x{:02X}", value),
        }
    }
}

/// Flat memory with a device mapped over `DEVICE_START..=DEVICE_END`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedAddressSpace<D = CharacterDisplay> {
    base: AddressSpace,
    device: D,
}

impl<D: Default> Default for ExtendedAddressSpace<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D> ExtendedAddressSpace<D> {
    pub fn new(device: D) -> Self {
        Self::with_base(AddressSpace::default(), device)
    }

    /// Maps `device` over an existing flat memory
    pub fn with_base(base: AddressSpace, device: D) -> Self {
        Self { base, device }
    }

    pub fn is_device_address(address: Word) -> bool {
        (DEVICE_START..=DEVICE_END).contains(&address)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The flat memory underneath the device range
    pub fn base(&self) -> &AddressSpace {
        &self.base
    }

    pub fn into_parts(self) -> (AddressSpace, D) {
        (self.base, self.device)
    }
}

impl<D: MappedDevice> AddressBus for ExtendedAddressSpace<D> {
    fn read_byte(&mut self, address: Word) -> Byte {
        if Self::is_device_address(address) {
            self.device.read_byte(address)
        } else {
            self.base.read_byte(address)
        }
    }

    fn write_byte(&mut self, address: Word, value: Byte) {
        if Self::is_device_address(address) {
            trace!(target: "memory", "device 0x{:04X} <- 0x{:02X}", address, value);
            self.device.write_byte(address, value);
        } else {
            self.base.write_byte(address, value);
        }
    }
}
