use std::time::Duration;

use super::{
	ArgumentError,
	Channel,
	ChannelClosed,
	Wait,
};

// block until at least one byte is there; no timeout for the host to start
// sending the next line or argument
fn wait_for_input<C: Channel + ?Sized>(channel: &mut C) -> crate::AResult<()> {
	match channel.wait_available(1, None) {
		Wait::Ready => Ok(()),
		Wait::TimedOut | Wait::Closed => Err(ChannelClosed.into()),
	}
}

pub trait TextInput: Channel {
	/// read up to (and excluding) the next `\n`; once the first byte arrived
	/// the line ends early if the next byte takes longer than `timeout`
	fn read_line(&mut self, timeout: Duration) -> crate::AResult<String> {
		wait_for_input(self)?;

		let mut line = Vec::new();
		while let Wait::Ready = self.wait_available(1, Some(timeout)) {
			match self.read_byte() {
				None | Some(b'\n') => break,
				Some(b) => line.push(b),
			}
		}
		Ok(String::from_utf8_lossy(&line).into_owned())
	}

	/// same as arduino `Stream::parseInt`: skip anything before the first
	/// digit (or '-'), stop at the first non-digit. A line break directly
	/// after the number is consumed too.
	fn read_number(&mut self, name: &'static str, timeout: Duration) -> crate::AResult<i64> {
		wait_for_input(self)?;

		let mut negative = false;
		let mut digits = 0usize;
		let mut value = 0i64;
		loop {
			match self.wait_available(1, Some(timeout)) {
				Wait::Ready => (),
				Wait::TimedOut => break,
				Wait::Closed => {
					if digits == 0 {
						return Err(ChannelClosed.into());
					}
					break;
				},
			}
			let b = match self.peek() {
				Some(b) => b,
				None => break,
			};
			match b {
				b'0'..=b'9' => {
					value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
					digits += 1;
				},
				b'-' if digits == 0 && !negative => negative = true,
				_ if digits == 0 && !negative => (), // skip garbage in front
				_ => break,
			}
			self.read_byte();
		}

		if digits == 0 {
			return Err(ArgumentError::Missing { name }.into());
		}

		if self.peek() == Some(b'\r') {
			self.read_byte();
		}
		if self.peek() == Some(b'\n') {
			self.read_byte();
		}

		Ok(if negative { -value } else { value })
	}

	/// `read_number` restricted to `0..=max`
	fn read_argument(&mut self, name: &'static str, max: u64, timeout: Duration) -> crate::AResult<u64> {
		let value = self.read_number(name, timeout)?;
		if value < 0 || value as u64 > max {
			return Err(ArgumentError::OutOfRange { name, value, max }.into());
		}
		Ok(value as u64)
	}
}

impl<C: Channel + ?Sized> TextInput for C {
}
