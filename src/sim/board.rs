use std::time::Duration;

use crate::bus::{
	AddressFrames,
	DataDirection,
	Hardware,
	Pin,
	reliable_sleep,
};
use crate::device::Capacity;

use super::{
	Eeprom,
	ShiftRegisterChain,
};

/// Programmer board: controller pins, shift register chain and EEPROM
///
/// Time only passes in `delay`; unless running in realtime mode, delays just
/// advance a virtual clock.
pub struct SimulatedBoard {
	chain: ShiftRegisterChain,
	eeprom: Eeprom,
	direction: DataDirection,
	// levels driven by the controller on D0..D7
	driven: u8,
	write_enable: bool,
	// address latched on the falling /WE edge
	write_address: Option<u16>,
	clock: Duration,
	realtime: bool,
}

impl SimulatedBoard {
	pub fn new(eeprom: Eeprom) -> Self {
		SimulatedBoard {
			chain: ShiftRegisterChain::default(),
			eeprom,
			direction: DataDirection::Input,
			driven: 0,
			write_enable: true,
			write_address: None,
			clock: Duration::from_secs(0),
			realtime: false,
		}
	}

	pub fn with_capacity(capacity: Capacity) -> Self {
		Self::new(Eeprom::new(capacity, Eeprom::WRITE_CYCLE))
	}

	/// actually sleep in `delay` (in addition to advancing the clock)
	pub fn set_realtime(&mut self, realtime: bool) {
		self.realtime = realtime;
	}

	pub fn eeprom(&self) -> &Eeprom {
		&self.eeprom
	}

	pub fn eeprom_mut(&mut self) -> &mut Eeprom {
		&mut self.eeprom
	}

	pub fn chain(&self) -> &ShiftRegisterChain {
		&self.chain
	}

	/// (address, output enable) as seen by the EEPROM pins
	pub fn address_pins(&self) -> (u16, bool) {
		AddressFrames::decode(self.chain.outputs())
	}

	pub fn elapsed(&self) -> Duration {
		self.clock
	}
}

impl Hardware for SimulatedBoard {
	fn set_pin(&mut self, pin: Pin, high: bool) {
		match pin {
			Pin::ShiftData => self.chain.set_serial_input(high),
			Pin::ShiftClock => self.chain.set_shift_clock(high),
			Pin::ShiftLatch => self.chain.set_storage_clock(high),
			Pin::WriteEnable => {
				let (address, output_enable) = self.address_pins();
				if self.write_enable && !high {
					// /OE low inhibits writes
					self.write_address = if output_enable { None } else { Some(address) };
				} else if !self.write_enable && high {
					if let Some(address) = self.write_address.take() {
						let data = match self.direction {
							DataDirection::Output => self.driven,
							DataDirection::Input => 0xff, // floating, pulled up
						};
						self.eeprom.write(address, data, self.clock);
					} else {
						warn!("/WE pulse while /OE active: write inhibited");
					}
				}
				self.write_enable = high;
			},
		}
	}

	fn set_data_direction(&mut self, direction: DataDirection) {
		self.direction = direction;
	}

	fn write_data_line(&mut self, line: u8, high: bool) {
		if high {
			self.driven |= 1 << line;
		} else {
			self.driven &= !(1 << line);
		}
	}

	fn read_data_line(&mut self, line: u8) -> bool {
		let (address, output_enable) = self.address_pins();
		let value = match self.direction {
			DataDirection::Output => self.driven,
			DataDirection::Input if output_enable => self.eeprom.read(address, self.clock),
			DataDirection::Input => 0xff,
		};
		0 != value & (1 << line)
	}

	fn delay(&mut self, duration: Duration) {
		self.clock += duration;
		if self.realtime {
			reliable_sleep(duration);
		}
	}
}
