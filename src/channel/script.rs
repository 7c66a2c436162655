use std::collections::VecDeque;
use std::time::Duration;

use super::{
	Channel,
	DEFAULT_RECEIVE_CAPACITY,
	Wait,
};

enum Event {
	Bytes(VecDeque<u8>),
	Pause(Duration),
}

/// Channel replaying a prepared host transmission on a virtual clock
///
/// Bytes queued with `send` arrive as soon as there is room in the receive
/// buffer; `pause` holds back everything after it until the virtual clock
/// passed the given duration. Waiting never sleeps, it only advances the clock.
/// Response lines are collected.
pub struct ScriptedChannel {
	events: VecDeque<Event>,
	received: VecDeque<u8>,
	capacity: usize,
	clock: Duration,
	lines: Vec<String>,
}

impl ScriptedChannel {
	pub fn new() -> Self {
		Self::with_capacity(DEFAULT_RECEIVE_CAPACITY)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		ScriptedChannel {
			events: VecDeque::new(),
			received: VecDeque::new(),
			capacity,
			clock: Duration::from_secs(0),
			lines: Vec::new(),
		}
	}

	pub fn send<D: AsRef<[u8]>>(&mut self, data: D) -> &mut Self {
		let data = data.as_ref();
		if let Some(Event::Bytes(pending)) = self.events.back_mut() {
			pending.extend(data);
			return self;
		}
		self.events.push_back(Event::Bytes(data.iter().cloned().collect()));
		self
	}

	pub fn send_line(&mut self, line: &str) -> &mut Self {
		self.send(line).send(b"\n")
	}

	pub fn pause(&mut self, duration: Duration) -> &mut Self {
		self.events.push_back(Event::Pause(duration));
		self
	}

	/// time spent waiting so far
	pub fn elapsed(&self) -> Duration {
		self.clock
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub fn take_lines(&mut self) -> Vec<String> {
		::std::mem::replace(&mut self.lines, Vec::new())
	}

	// deliver queued bytes up to the next pause
	fn fill(&mut self) {
		while self.received.len() < self.capacity {
			match self.events.front_mut() {
				Some(Event::Bytes(pending)) => match pending.pop_front() {
					Some(b) => self.received.push_back(b),
					None => { self.events.pop_front(); },
				},
				_ => return,
			}
		}
	}
}

impl Default for ScriptedChannel {
	fn default() -> Self {
		Self::new()
	}
}

impl Channel for ScriptedChannel {
	fn receive_capacity(&self) -> usize {
		self.capacity
	}

	fn available(&mut self) -> usize {
		self.fill();
		self.received.len()
	}

	fn wait_available(&mut self, count: usize, timeout: Option<Duration>) -> Wait {
		let mut waited = Duration::from_secs(0);
		loop {
			self.fill();
			if self.received.len() >= count {
				return Wait::Ready;
			}

			let pause = match self.events.front_mut() {
				Some(Event::Pause(pause)) => pause,
				// script is over, or the receive buffer is full and the
				// rest can't be delivered: nothing will change anymore
				_ => match timeout {
					Some(timeout) => {
						self.clock += timeout - waited;
						return Wait::TimedOut;
					},
					None => return Wait::Closed,
				},
			};

			if let Some(timeout) = timeout {
				let left = timeout - waited;
				if *pause >= left {
					*pause -= left;
					self.clock += left;
					return Wait::TimedOut;
				}
			}
			waited += *pause;
			self.clock += *pause;
			self.events.pop_front();
		}
	}

	fn peek(&mut self) -> Option<u8> {
		self.fill();
		self.received.front().cloned()
	}

	fn read_byte(&mut self) -> Option<u8> {
		self.fill();
		self.received.pop_front()
	}

	fn discard_input(&mut self) -> usize {
		let count = self.received.len();
		self.received.clear();
		count
	}

	fn write_line(&mut self, line: &str) -> crate::AResult<()> {
		trace!("response: {:?}", line);
		self.lines.push(line.to_owned());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pauses_advance_the_clock() {
		let mut ch = ScriptedChannel::new();
		ch.send(b"ab").pause(Duration::from_millis(300)).send(b"c");

		assert_eq!(ch.wait_available(2, Some(Duration::from_millis(10))), Wait::Ready);
		assert_eq!(ch.wait_available(3, Some(Duration::from_millis(100))), Wait::TimedOut);
		assert_eq!(ch.elapsed(), Duration::from_millis(100));
		assert_eq!(ch.wait_available(3, None), Wait::Ready);
		assert_eq!(ch.elapsed(), Duration::from_millis(300));
		assert_eq!(ch.wait_available(4, Some(Duration::from_secs(5))), Wait::TimedOut);
		assert_eq!(ch.wait_available(4, None), Wait::Closed);
	}

	#[test]
	fn receive_buffer_is_bounded() {
		let mut ch = ScriptedChannel::with_capacity(4);
		ch.send(b"0123456789");
		assert_eq!(ch.available(), 4);
		assert_eq!(ch.wait_available(5, Some(Duration::from_secs(5))), Wait::TimedOut);

		let mut buf = [0u8; 3];
		assert_eq!(ch.read_into(&mut buf), 3);
		assert_eq!(&buf, b"012");
		// refilled from the pending bytes
		assert_eq!(ch.available(), 4);
		assert_eq!(ch.discard_input(), 4);
		assert_eq!(ch.available(), 3);
	}
}
