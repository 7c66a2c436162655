use crate::bus::{
	AddressBus,
	DATA_LINES,
	DataDirection,
	Hardware,
	Pin,
};

use super::{
	Capacity,
	Timing,
};

pub struct MemoryDevice<H: Hardware> {
	bus: AddressBus<H>,
	capacity: Capacity,
	timing: Timing,
}

impl<H: Hardware> MemoryDevice<H> {
	pub fn new(bus: AddressBus<H>, capacity: Capacity, timing: Timing) -> Self {
		MemoryDevice {
			bus,
			capacity,
			timing,
		}
	}

	pub fn capacity(&self) -> Capacity {
		self.capacity
	}

	pub fn timing(&self) -> Timing {
		self.timing
	}

	pub fn bus(&mut self) -> &mut AddressBus<H> {
		&mut self.bus
	}

	pub fn into_bus(self) -> AddressBus<H> {
		self.bus
	}

	fn chip_address(&self, address: u32) -> u16 {
		let chip_address = self.capacity.mirror(address);
		if chip_address as u32 != address {
			debug!("address 0x{:04x} mirrored to 0x{:04x} on {}", address, chip_address, self.capacity);
		}
		chip_address
	}

	pub fn read_byte(&mut self, address: u32) -> u8 {
		let address = self.chip_address(address);

		// release the data bus before the EEPROM starts driving it
		self.bus.hardware().set_data_direction(DataDirection::Input);
		self.bus.set_address(address, true);

		let hw = self.bus.hardware();
		let mut data = 0u8;
		for line in (0..DATA_LINES).rev() {
			data = (data << 1) | hw.read_data_line(line) as u8;
		}
		data
	}

	pub fn write_byte(&mut self, address: u32, data: u8) {
		let address = self.chip_address(address);

		self.bus.hardware().set_data_direction(DataDirection::Output);
		self.bus.set_address(address, false);

		let timing = self.timing;
		let hw = self.bus.hardware();
		for line in 0..DATA_LINES {
			hw.write_data_line(line, 0 != data & (1 << line));
		}

		hw.set_pin(Pin::WriteEnable, false);
		hw.delay(timing.write_pulse);
		hw.set_pin(Pin::WriteEnable, true);
		// no completion signal from the chip: every write has to wait this out
		hw.delay(timing.write_settle);
	}

	/// write 0xff to `0..=max_address`; `max_address` is clamped to the chip size
	pub fn erase(&mut self, max_address: u32) {
		let max_address = max_address.min(self.capacity.max_address() as u32);
		for address in 0..=max_address {
			self.write_byte(address, 0xff);
		}
	}
}
