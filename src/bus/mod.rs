/// Address bus of a 28Cxx parallel EEPROM driven through two cascaded
/// 74HC595 shift registers.
///
/// Wiring:
/// - shift register data, shift clock and storage clock (latch) on
///   controller outputs; the first register's serial output feeds the second
/// - first register outputs: A0..A7; second register outputs: A8..A14 and
///   /OE (bit 7). The high frame is shifted first and ends up in the second
///   register.
/// - data bus D0..D7 and /WE directly on controller pins
///
/// Addresses are shifted MSB first as two bytes and then latched, so the
/// EEPROM never sees a partially shifted address.

mod address;
mod hardware;
mod low_level;

pub use self::address::{
	AddressBus,
	AddressFrames,
};

pub use self::hardware::{
	DATA_LINES,
	DataDirection,
	Hardware,
	Pin,
	reliable_sleep,
};

use self::low_level::LowLevel;
