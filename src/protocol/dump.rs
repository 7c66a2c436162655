use std::fmt;

pub const ROW_LENGTH: usize = 16;

/// One line of a READ response: `base: 16 bytes`, with a wider gap in the
/// middle.
///
/// ```text
/// 010: ea ea ea ea ea ea ea ea   ea ea ea ea ea ea ea ea
/// ```
pub struct HexDumpRow<'a> {
	pub base: u32,
	pub data: &'a [u8],
}

impl<'a> fmt::Display for HexDumpRow<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:03x}:", self.base)?;
		for (i, b) in self.data.iter().enumerate() {
			if i == ROW_LENGTH / 2 {
				write!(f, "  ")?;
			}
			write!(f, " {:02x}", b)?;
		}
		Ok(())
	}
}
