use std::collections::VecDeque;
use std::io::{
	self,
	Write,
};
use std::time::{
	Duration,
	Instant,
};

use libc::{
	POLLIN,
	c_int,
	c_void,
	poll,
	pollfd,
	read,
};

use super::{
	Channel,
	Wait,
};

const STDIN_FD: c_int = 0;

fn poll_timeout_ms(timeout: Option<Duration>) -> c_int {
	match timeout {
		None => -1,
		Some(timeout) => {
			// round up, otherwise we'd spin with 0ms polls before the deadline
			let ms = timeout.as_secs() as u128 * 1000 + ((timeout.subsec_nanos() + 999_999) / 1_000_000) as u128;
			if ms > c_int::max_value() as u128 { c_int::max_value() } else { ms as c_int }
		},
	}
}

/// Host link over the process' stdin / stdout (e.g. a pty or a pipe)
///
/// Only reads from the input while the receive buffer has room, so a host
/// sending too much is held back by the pipe instead of losing data.
pub struct StdioChannel {
	input: c_int,
	received: VecDeque<u8>,
	capacity: usize,
	eof: bool,
	out: io::Stdout,
}

impl StdioChannel {
	pub fn new(capacity: usize) -> Self {
		Self::with_input(STDIN_FD, capacity)
	}

	/// read from `input` instead of stdin; the fd must stay open as long as
	/// the channel is used
	pub fn with_input(input: c_int, capacity: usize) -> Self {
		assert!(capacity > 0);
		StdioChannel {
			input,
			received: VecDeque::with_capacity(capacity),
			capacity,
			eof: false,
			out: io::stdout(),
		}
	}

	// wait (up to `timeout`) for the input to become readable, then read what
	// fits into the receive buffer
	fn fill(&mut self, timeout: Option<Duration>) -> io::Result<()> {
		let room = self.capacity - self.received.len();
		if self.eof || 0 == room {
			return Ok(());
		}

		let mut fds = pollfd {
			fd: self.input,
			events: POLLIN,
			revents: 0,
		};
		let res = unsafe { poll(&mut fds, 1, poll_timeout_ms(timeout)) };
		if -1 == res {
			let e = io::Error::last_os_error();
			if e.kind() == io::ErrorKind::Interrupted {
				return Ok(());
			}
			return Err(e);
		}
		if 0 == res {
			return Ok(()); // timeout
		}

		let mut buf = [0u8; 256];
		let len = room.min(buf.len());
		let res = unsafe { read(self.input, buf.as_mut_ptr() as *mut c_void, len) };
		if res < 0 {
			let e = io::Error::last_os_error();
			match e.kind() {
				io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => return Ok(()),
				_ => return Err(e),
			}
		}
		if 0 == res {
			debug!("input: end of file");
			self.eof = true;
			return Ok(());
		}
		self.received.extend(&buf[..res as usize]);
		Ok(())
	}

	fn fill_or_close(&mut self, timeout: Option<Duration>) {
		if let Err(e) = self.fill(timeout) {
			error!("Reading from input failed: {}", e);
			self.eof = true;
		}
	}
}

impl Channel for StdioChannel {
	fn receive_capacity(&self) -> usize {
		self.capacity
	}

	fn available(&mut self) -> usize {
		self.fill_or_close(Some(Duration::from_secs(0)));
		self.received.len()
	}

	fn wait_available(&mut self, count: usize, timeout: Option<Duration>) -> Wait {
		// a deadline too far away to represent is as good as none
		let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
		loop {
			if self.received.len() >= count {
				return Wait::Ready;
			}
			if self.eof {
				// a bounded wait behaves as if the host just stopped sending
				return match timeout {
					Some(_) => Wait::TimedOut,
					None => Wait::Closed,
				};
			}

			let remaining = deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()));
			if remaining == Some(Duration::from_secs(0)) {
				return Wait::TimedOut;
			}

			if self.received.len() >= self.capacity {
				// buffer full but still not enough: can't succeed
				match remaining {
					Some(remaining) => {
						crate::bus::reliable_sleep(remaining);
						return Wait::TimedOut;
					},
					None => {
						error!("waiting for {} bytes with a receive buffer of {} bytes", count, self.capacity);
						return Wait::Closed;
					},
				}
			}

			self.fill_or_close(remaining);
		}
	}

	fn peek(&mut self) -> Option<u8> {
		if self.received.is_empty() {
			self.fill_or_close(Some(Duration::from_secs(0)));
		}
		self.received.front().cloned()
	}

	fn read_byte(&mut self) -> Option<u8> {
		if self.received.is_empty() {
			self.fill_or_close(Some(Duration::from_secs(0)));
		}
		self.received.pop_front()
	}

	fn discard_input(&mut self) -> usize {
		let count = self.received.len();
		self.received.clear();
		count
	}

	fn write_line(&mut self, line: &str) -> crate::AResult<()> {
		with_context!("writing response to stdout", {
			let mut out = self.out.lock();
			out.write_all(line.as_bytes())?;
			out.write_all(b"\r\n")?;
			out.flush()?;
			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// host side writes into `tx`, the channel reads `rx`
	struct Pipe {
		rx: c_int,
		tx: Option<c_int>,
	}

	impl Pipe {
		fn new() -> Self {
			let mut fds = [0 as c_int; 2];
			assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
			Pipe { rx: fds[0], tx: Some(fds[1]) }
		}

		fn send(&self, data: &[u8]) {
			let tx = self.tx.unwrap();
			let res = unsafe { libc::write(tx, data.as_ptr() as *const c_void, data.len()) };
			assert_eq!(res, data.len() as isize);
		}

		fn close_tx(&mut self) {
			if let Some(tx) = self.tx.take() {
				unsafe { libc::close(tx) };
			}
		}
	}

	impl Drop for Pipe {
		fn drop(&mut self) {
			self.close_tx();
			unsafe { libc::close(self.rx) };
		}
	}

	const SHORT: Duration = Duration::from_millis(50);

	#[test]
	fn poll_timeout_rounds_up() {
		assert_eq!(poll_timeout_ms(None), -1);
		assert_eq!(poll_timeout_ms(Some(Duration::from_secs(0))), 0);
		assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1))), 1);
		assert_eq!(poll_timeout_ms(Some(Duration::from_millis(5000))), 5000);
		assert_eq!(poll_timeout_ms(Some(Duration::from_secs(u64::max_value()))), c_int::max_value());
	}

	#[test]
	fn ready_once_bytes_arrive() {
		let pipe = Pipe::new();
		let mut ch = StdioChannel::with_input(pipe.rx, 16);
		assert_eq!(ch.available(), 0);

		pipe.send(b"WRITE\n");
		assert_eq!(ch.wait_available(6, Some(Duration::from_secs(5))), Wait::Ready);
		assert_eq!(ch.read_byte(), Some(b'W'));
		assert_eq!(ch.available(), 5);
	}

	#[test]
	fn times_out_after_deadline() {
		let pipe = Pipe::new();
		let mut ch = StdioChannel::with_input(pipe.rx, 16);
		pipe.send(b"abc");

		let start = Instant::now();
		assert_eq!(ch.wait_available(4, Some(SHORT)), Wait::TimedOut);
		assert!(start.elapsed() >= SHORT);
		// what did arrive stays buffered
		assert_eq!(ch.available(), 3);
	}

	#[test]
	fn end_of_input_with_and_without_timeout() {
		let mut pipe = Pipe::new();
		let mut ch = StdioChannel::with_input(pipe.rx, 16);
		pipe.send(b"0123");
		pipe.close_tx();

		// incomplete chunk at end of input: the same as a stalled host
		assert_eq!(ch.wait_available(16, Some(Duration::from_secs(5))), Wait::TimedOut);
		assert_eq!(ch.wait_available(4, Some(SHORT)), Wait::Ready);
		assert_eq!(ch.wait_available(5, None), Wait::Closed);
		assert_eq!(ch.discard_input(), 4);
		assert_eq!(ch.wait_available(1, None), Wait::Closed);
	}

	#[test]
	fn reads_only_what_fits() {
		let pipe = Pipe::new();
		let mut ch = StdioChannel::with_input(pipe.rx, 4);
		pipe.send(b"0123456789");

		assert_eq!(ch.wait_available(4, Some(Duration::from_secs(5))), Wait::Ready);
		assert_eq!(ch.available(), 4);
		// can never be satisfied with a 4 byte buffer
		assert_eq!(ch.wait_available(5, Some(SHORT)), Wait::TimedOut);

		let mut buf = [0u8; 3];
		assert_eq!(ch.read_into(&mut buf), 3);
		assert_eq!(&buf, b"012");
		assert_eq!(ch.wait_available(4, Some(Duration::from_secs(5))), Wait::Ready);
		assert_eq!(ch.read_byte(), Some(b'3'));
		assert_eq!(ch.read_byte(), Some(b'4'));
	}
}
