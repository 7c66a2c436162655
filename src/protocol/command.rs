use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Command {
	/// max address; hex dump of `0..=max`
	Read,
	/// max address; fill `0..=max` with 0xff
	Erase,
	/// length, then the raw data in chunks
	Write,
	/// address, value
	WriteByte,
	/// address
	ReadByte,
}

impl Command {
	pub const ALL: [Command; 5] = [
		Command::Read,
		Command::Erase,
		Command::Write,
		Command::WriteByte,
		Command::ReadByte,
	];

	pub fn name(self) -> &'static str {
		match self {
			Command::Read => "READ",
			Command::Erase => "ERASE",
			Command::Write => "WRITE",
			Command::WriteByte => "WRITE_BYTE",
			Command::ReadByte => "READ_BYTE",
		}
	}

	/// case-insensitive; surrounding whitespace is ignored
	pub fn lookup(line: &str) -> Option<Command> {
		let line = line.trim();
		Self::ALL.iter().cloned().find(|c| c.name().eq_ignore_ascii_case(line))
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_ignores_case_and_whitespace() {
		assert_eq!(Command::lookup("READ"), Some(Command::Read));
		assert_eq!(Command::lookup("  write_byte\r"), Some(Command::WriteByte));
		assert_eq!(Command::lookup("Read_Byte"), Some(Command::ReadByte));
		assert_eq!(Command::lookup("erase"), Some(Command::Erase));
		assert_eq!(Command::lookup("WRITE"), Some(Command::Write));
		assert_eq!(Command::lookup("WRITE BYTE"), None);
		assert_eq!(Command::lookup("READX"), None);
		assert_eq!(Command::lookup(""), None);
	}
}
