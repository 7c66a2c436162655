use std::time::Duration;

use crate::device::Capacity;

/// AT28C64 / AT28C256 memory array with its internal write cycle
///
/// While a write cycle is running the chip ignores writes and reads return
/// DATA polling values (inverted bit 7 of the byte being written) instead of
/// memory contents. Such accesses are counted as timing violations.
pub struct Eeprom {
	capacity: Capacity,
	cells: Vec<u8>,
	write_cycle: Duration,
	// (end of write cycle, data being written)
	busy: Option<(Duration, u8)>,
	writes: u64,
	violations: u64,
}

impl Eeprom {
	pub const WRITE_CYCLE: Duration = Duration::from_millis(5);

	/// erased chip (all 0xff)
	pub fn new(capacity: Capacity, write_cycle: Duration) -> Self {
		Eeprom {
			capacity,
			cells: vec![0xff; capacity.size()],
			write_cycle,
			busy: None,
			writes: 0,
			violations: 0,
		}
	}

	pub fn capacity(&self) -> Capacity {
		self.capacity
	}

	pub fn contents(&self) -> &[u8] {
		&self.cells
	}

	/// preload (e.g. from an image file); longer images are truncated
	pub fn load(&mut self, image: &[u8]) {
		let len = image.len().min(self.cells.len());
		if len < image.len() {
			warn!("image of {} bytes truncated to {} ({})", image.len(), len, self.capacity);
		}
		self.cells[..len].copy_from_slice(&image[..len]);
	}

	pub fn writes(&self) -> u64 {
		self.writes
	}

	pub fn violations(&self) -> u64 {
		self.violations
	}

	fn busy_with(&mut self, now: Duration) -> Option<u8> {
		match self.busy {
			Some((until, data)) if now < until => Some(data),
			_ => {
				self.busy = None;
				None
			},
		}
	}

	pub fn read(&mut self, address: u16, now: Duration) -> u8 {
		if let Some(data) = self.busy_with(now) {
			self.violations += 1;
			debug!("read of 0x{:04x} during write cycle", address);
			return !data & 0x80;
		}
		self.cells[self.capacity.mirror(address as u32) as usize]
	}

	/// data is latched on the rising /WE edge; starts the write cycle
	pub fn write(&mut self, address: u16, data: u8, now: Duration) {
		if self.busy_with(now).is_some() {
			self.violations += 1;
			warn!("write of 0x{:02x} to 0x{:04x} during write cycle: lost", data, address);
			return;
		}
		self.cells[self.capacity.mirror(address as u32) as usize] = data;
		self.busy = Some((now + self.write_cycle, data));
		self.writes += 1;
	}
}
