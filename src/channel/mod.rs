/// Host link: a byte stream in, response lines out.
///
/// The receive side has a bounded buffer (on the reference controller the
/// 64-byte UART ring buffer, of which 63 bytes are usable); waiting for more
/// bytes than fit into it can never succeed.

mod script;
mod stdio;
mod text;

use std::time::Duration;

use failure::Fail;

pub use self::script::ScriptedChannel;
pub use self::stdio::StdioChannel;
pub use self::text::TextInput;

/// size of the UART receive ring buffer on the reference controller
pub const UART_RING_BUFFER: usize = 64;

/// a ring buffer keeps one slot free to tell "full" from "empty"
pub const fn ring_buffer_capacity(ring_size: usize) -> usize {
	ring_size - 1
}

pub const DEFAULT_RECEIVE_CAPACITY: usize = ring_buffer_capacity(UART_RING_BUFFER);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Wait {
	/// requested number of bytes is buffered
	Ready,
	/// timeout elapsed before enough bytes arrived
	TimedOut,
	/// host closed the channel (and not enough bytes are left)
	Closed,
}

#[derive(Debug, Fail)]
#[fail(display = "channel closed by host")]
pub struct ChannelClosed;

#[derive(Debug, Fail)]
pub enum ArgumentError {
	#[fail(display = "expected a decimal number for {}", name)]
	Missing {
		name: &'static str,
	},
	#[fail(display = "{} out of range: {} (expected 0..={})", name, value, max)]
	OutOfRange {
		name: &'static str,
		value: i64,
		max: u64,
	},
}

pub trait Channel {
	/// number of bytes the receive buffer can hold
	fn receive_capacity(&self) -> usize;

	/// number of bytes that can be read without blocking
	fn available(&mut self) -> usize;

	/// block until at least `count` bytes are buffered; `None` waits forever
	fn wait_available(&mut self, count: usize, timeout: Option<Duration>) -> Wait;

	fn peek(&mut self) -> Option<u8>;

	/// non-blocking; `None` if nothing is buffered
	fn read_byte(&mut self) -> Option<u8>;

	/// fill `target` from buffered bytes, returns number of bytes read
	fn read_into(&mut self, target: &mut [u8]) -> usize {
		let mut count = 0;
		for t in target.iter_mut() {
			match self.read_byte() {
				Some(b) => *t = b,
				None => break,
			}
			count += 1;
		}
		count
	}

	/// drop everything currently buffered
	fn discard_input(&mut self) -> usize {
		let mut count = 0;
		while self.read_byte().is_some() {
			count += 1;
		}
		count
	}

	fn write_line(&mut self, line: &str) -> crate::AResult<()>;
}

impl<'a, C: ?Sized + Channel> Channel for &'a mut C {
	fn receive_capacity(&self) -> usize {
		C::receive_capacity(*self)
	}

	fn available(&mut self) -> usize {
		C::available(*self)
	}

	fn wait_available(&mut self, count: usize, timeout: Option<Duration>) -> Wait {
		C::wait_available(*self, count, timeout)
	}

	fn peek(&mut self) -> Option<u8> {
		C::peek(*self)
	}

	fn read_byte(&mut self) -> Option<u8> {
		C::read_byte(*self)
	}

	fn read_into(&mut self, target: &mut [u8]) -> usize {
		C::read_into(*self, target)
	}

	fn discard_input(&mut self) -> usize {
		C::discard_input(*self)
	}

	fn write_line(&mut self, line: &str) -> crate::AResult<()> {
		C::write_line(*self, line)
	}
}
