use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub const DATA_LINES: u8 = 8;

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Output pins driven by the controller (apart from the data bus)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Pin {
	/// serial input of the first shift register
	ShiftData,
	/// shift clock of both shift registers; shifts on the rising edge
	ShiftClock,
	/// storage clock of both shift registers; latches on the rising edge
	ShiftLatch,
	/// active-low write enable of the EEPROM
	WriteEnable,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum DataDirection {
	Input,
	Output,
}

pub trait Hardware {
	fn set_pin(&mut self, pin: Pin, high: bool);

	fn set_data_direction(&mut self, direction: DataDirection);

	// `line` 0 is D0, 7 is D7
	fn write_data_line(&mut self, line: u8, high: bool);
	fn read_data_line(&mut self, line: u8) -> bool;

	// block for (at least) `duration`
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, H: ?Sized + Hardware> Hardware for &'a mut H {
	fn set_pin(&mut self, pin: Pin, high: bool) {
		H::set_pin(*self, pin, high)
	}

	fn set_data_direction(&mut self, direction: DataDirection) {
		H::set_data_direction(*self, direction)
	}

	fn write_data_line(&mut self, line: u8, high: bool) {
		H::write_data_line(*self, line, high)
	}

	fn read_data_line(&mut self, line: u8) -> bool {
		H::read_data_line(*self, line)
	}

	fn delay(&mut self, duration: Duration) {
		H::delay(*self, duration)
	}
}
