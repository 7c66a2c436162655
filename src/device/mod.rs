/// Byte-wise access to an AT28C64 / AT28C256 parallel EEPROM.
///
/// - read: /OE low (through the address bus), data bus as input
/// - write: /OE high, data bus as output, pulse /WE low, then wait for the
///   internal write cycle; the chip doesn't tell when it is done (we don't
///   use DATA polling), so the settle delay must cover the worst case.

mod operations;

use std::fmt;
use std::str;
use std::time::Duration;

pub use self::operations::MemoryDevice;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Capacity {
	/// 8 KiB, 0x0000..=0x1fff
	At28c64,
	/// 32 KiB, 0x0000..=0x7fff
	At28c256,
}

impl Capacity {
	pub fn max_address(self) -> u16 {
		match self {
			Capacity::At28c64 => 0x1fff,
			Capacity::At28c256 => 0x7fff,
		}
	}

	pub fn size(self) -> usize {
		self.max_address() as usize + 1
	}

	/// map any host address into the chip; upper address lines aren't
	/// connected, so the contents repeat every `size()` bytes
	pub fn mirror(self, address: u32) -> u16 {
		(address & self.max_address() as u32) as u16
	}
}

impl Default for Capacity {
	fn default() -> Self {
		Capacity::At28c256
	}
}

impl fmt::Display for Capacity {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Capacity::At28c64 => write!(f, "28C64"),
			Capacity::At28c256 => write!(f, "28C256"),
		}
	}
}

impl str::FromStr for Capacity {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim().to_ascii_lowercase();
		match name.trim_start_matches("at").trim_start_matches("28c") {
			"64" => Ok(Capacity::At28c64),
			"256" => Ok(Capacity::At28c256),
			_ => bail!("Unknown EEPROM type {:?} (expected 28C64 or 28C256)", s),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timing {
	/// /WE low time
	pub write_pulse: Duration,
	/// wait after each write before the next access; 6ms or more for
	/// reliable writes
	pub write_settle: Duration,
}

impl Timing {
	pub const WRITE_PULSE: Duration = Duration::from_micros(1);
	pub const WRITE_SETTLE: Duration = Duration::from_millis(6);
}

impl Default for Timing {
	fn default() -> Self {
		Timing {
			write_pulse: Self::WRITE_PULSE,
			write_settle: Self::WRITE_SETTLE,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn capacity_ranges() {
		assert_eq!(Capacity::At28c64.max_address(), 0x1fff);
		assert_eq!(Capacity::At28c256.size(), 0x8000);
		assert_eq!(Capacity::At28c256.mirror(0xfffc), 0x7ffc);
		assert_eq!(Capacity::At28c64.mirror(0x2001), 0x0001);
		assert_eq!(Capacity::At28c64.mirror(0x1234), 0x1234);
	}

	#[test]
	fn parse_capacity() {
		assert_eq!("28c64".parse::<Capacity>().unwrap(), Capacity::At28c64);
		assert_eq!("AT28C256".parse::<Capacity>().unwrap(), Capacity::At28c256);
		assert_eq!("256".parse::<Capacity>().unwrap(), Capacity::At28c256);
		assert!("28c16".parse::<Capacity>().is_err());
	}
}
