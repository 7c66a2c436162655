/// Line based command protocol between host and programmer.
///
/// Host -> programmer (every value in decimal, terminated by a newline):
/// - `READ`, max address: hex dump rows, then `---END---`
/// - `ERASE`, max address: `---END---` when done
/// - `WRITE`, length: echoes the length, then reads the data in chunks
///   and answers every written chunk with `ACK`; `---END---` at the end
///   (after a timeout diagnostic if the host stalls)
/// - `WRITE_BYTE`, address, value: `ACK`
/// - `READ_BYTE`, address: value as two hex digits
///
/// Anything else gets an "Unknown command" line.

mod command;
mod dump;
mod interpreter;
mod transfer;

pub use self::command::Command;

pub use self::dump::{
	HexDumpRow,
	ROW_LENGTH,
};

pub use self::interpreter::{
	Handler,
	Interpreter,
};

pub use self::transfer::{
	ChunkedTransfer,
	TransferOutcome,
	TransferSession,
};

pub const BANNER: &str = "EEPROM Programmer Ready";
pub const ACK: &str = "ACK";
/// ends every READ, ERASE and WRITE response, even failed ones
pub const SENTINEL: &str = "---END---";
