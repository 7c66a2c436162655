use std::fmt;

use super::{
	Hardware,
	LowLevel,
	Pin,
};

/// Two-byte message shifted into the cascaded shift registers
///
/// The upper register holds the high address bits; its top output is wired
/// to the (active-low) OUTPUT ENABLE pin of the EEPROM instead of an address
/// line.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressFrames {
	pub high: u8,
	pub low: u8,
}

impl AddressFrames {
	pub const OUTPUT_DISABLE: u8 = 0x80;

	pub fn encode(address: u16, output_enable: bool) -> Self {
		let oe = if output_enable { 0x00 } else { Self::OUTPUT_DISABLE };
		AddressFrames {
			high: (address >> 8) as u8 | oe,
			low: address as u8,
		}
	}

	/// split latched shift register outputs into (address, output enable)
	pub fn decode(outputs: u16) -> (u16, bool) {
		let frames = AddressFrames {
			high: (outputs >> 8) as u8,
			low: outputs as u8,
		};
		(frames.address(), frames.output_enable())
	}

	pub fn address(&self) -> u16 {
		(((self.high & !Self::OUTPUT_DISABLE) as u16) << 8) | self.low as u16
	}

	pub fn output_enable(&self) -> bool {
		0 == self.high & Self::OUTPUT_DISABLE
	}

	/// shift register outputs after latching; first frame ends up in the upper register
	pub fn outputs(&self) -> u16 {
		((self.high as u16) << 8) | self.low as u16
	}
}

impl fmt::Debug for AddressFrames {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} 0x{:02x} (address: 0x{:04x}", self.high, self.low, self.address())?;
		if self.output_enable() { write!(f, " [OE]")?; }
		write!(f, ")")
	}
}

/// Owner of the pins: the shift register bus and (through `hardware()`) the
/// data bus and WRITE ENABLE line.
pub struct AddressBus<H: Hardware> {
	hardware: H,
	latched: Option<AddressFrames>,
}

impl<H: Hardware> AddressBus<H> {
	pub fn new(mut hardware: H) -> Self {
		hardware.set_pin(Pin::ShiftClock, false);
		hardware.set_pin(Pin::ShiftLatch, false);
		hardware.set_pin(Pin::WriteEnable, true);

		AddressBus {
			hardware,
			latched: None,
		}
	}

	/// `address` must fit into A0..A14; bit 15 of the first frame is /OE
	pub fn set_address(&mut self, address: u16, output_enable: bool) {
		debug_assert!(address & 0x8000 == 0, "address 0x{:04x} collides with /OE", address);
		let frames = AddressFrames::encode(address, output_enable);
		trace!("address bus: {:?}", frames);

		self.hardware.shift_out(frames.high);
		self.hardware.shift_out(frames.low);
		// outputs only change here, never in the middle of shifting
		self.hardware.pulse_latch();

		self.latched = Some(frames);
	}

	/// frames committed by the last `set_address`
	pub fn latched(&self) -> Option<AddressFrames> {
		self.latched
	}

	pub fn hardware(&mut self) -> &mut H {
		&mut self.hardware
	}

	pub fn into_hardware(self) -> H {
		self.hardware
	}
}
