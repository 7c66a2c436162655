/// Two cascaded 74HC595: a 16 stage shift register plus 16 storage flip-flops
///
/// Bits are shifted in at the low end on a positive shift clock edge, so after
/// 16 clocks the first bit shifted is output 15. The outputs only change on a
/// positive storage clock edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ShiftRegisterChain {
	stages: u16,
	outputs: u16,
	serial_input: bool,
	shift_clock: bool,
	storage_clock: bool,
	shift_pulses: u64,
	latch_pulses: u64,
}

impl ShiftRegisterChain {
	pub fn set_serial_input(&mut self, high: bool) {
		self.serial_input = high;
	}

	pub fn set_shift_clock(&mut self, high: bool) {
		if high && !self.shift_clock {
			self.stages = (self.stages << 1) | self.serial_input as u16;
			self.shift_pulses += 1;
		}
		self.shift_clock = high;
	}

	pub fn set_storage_clock(&mut self, high: bool) {
		if high && !self.storage_clock {
			self.outputs = self.stages;
			self.latch_pulses += 1;
		}
		self.storage_clock = high;
	}

	pub fn outputs(&self) -> u16 {
		self.outputs
	}

	pub fn shift_pulses(&self) -> u64 {
		self.shift_pulses
	}

	pub fn latch_pulses(&self) -> u64 {
		self.latch_pulses
	}
}
