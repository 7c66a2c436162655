use super::{
	Hardware,
	Pin,
};

pub(super) trait LowLevel: Hardware {
	// same as arduino `shiftOut(.., MSBFIRST, ..)`: put bit on the data line,
	// then clock it in with a positive edge
	fn shift_out(&mut self, byte: u8) {
		for bit in (0..8).rev() {
			self.set_pin(Pin::ShiftData, 0 != byte & (1 << bit));
			self.set_pin(Pin::ShiftClock, true);
			self.set_pin(Pin::ShiftClock, false);
		}
	}

	// storage clock low -> high -> low; the positive edge copies the shift
	// register stages to the outputs
	fn pulse_latch(&mut self) {
		self.set_pin(Pin::ShiftLatch, false);
		self.set_pin(Pin::ShiftLatch, true);
		self.set_pin(Pin::ShiftLatch, false);
	}
}

impl<H: Hardware + ?Sized> LowLevel for H {
}
