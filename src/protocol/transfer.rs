use std::time::Duration;

use crate::bus::Hardware;
use crate::channel::{
	Channel,
	ChannelClosed,
	TextInput,
	Wait,
};
use crate::config::Config;
use crate::device::MemoryDevice;

use super::ACK;

/// Bookkeeping of one WRITE command
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TransferSession {
	total_length: u32,
	bytes_written: u32,
	chunk_size: usize,
}

impl TransferSession {
	pub fn new(total_length: u32, chunk_size: usize) -> Self {
		assert!(chunk_size > 0);
		TransferSession {
			total_length,
			bytes_written: 0,
			chunk_size,
		}
	}

	pub fn total_length(&self) -> u32 {
		self.total_length
	}

	pub fn bytes_written(&self) -> u32 {
		self.bytes_written
	}

	pub fn remaining(&self) -> u32 {
		self.total_length - self.bytes_written
	}

	pub fn is_complete(&self) -> bool {
		self.bytes_written == self.total_length
	}

	/// length of the next chunk: the configured size, or what is left
	pub fn next_chunk_len(&self) -> usize {
		(self.remaining() as usize).min(self.chunk_size)
	}

	/// number of chunks (and ACKs) a complete session takes
	pub fn chunk_count(&self) -> u32 {
		let chunk_size = self.chunk_size as u64;
		((self.total_length as u64 + chunk_size - 1) / chunk_size) as u32
	}

	fn advance(&mut self, count: usize) {
		assert!(count <= self.next_chunk_len());
		self.bytes_written += count as u32;
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TransferOutcome {
	Completed {
		chunks: u32,
	},
	/// no complete chunk arrived in time; `offset` is the first address not written
	TimedOut {
		offset: u32,
	},
}

enum State {
	AwaitChunk,
	ConsumeChunk(usize),
	Ack,
}

/// Flow controlled WRITE: the host sends the length (echoed back), then
/// chunks of data; every chunk is written to the EEPROM before it is
/// acknowledged with "ACK", and only then the host sends the next one.
pub struct ChunkedTransfer {
	chunk_size: usize,
	chunk_timeout: Duration,
	argument_timeout: Duration,
}

impl ChunkedTransfer {
	pub fn new(config: &Config) -> Self {
		ChunkedTransfer {
			chunk_size: config.chunk_size,
			chunk_timeout: config.chunk_timeout,
			argument_timeout: config.argument_timeout,
		}
	}

	/// full exchange after the WRITE line, except for the final sentinel
	pub fn run<H, C>(&self, device: &mut MemoryDevice<H>, channel: &mut C) -> crate::AResult<TransferOutcome>
	where
		H: Hardware,
		C: Channel,
	{
		let total_length = channel.read_argument("length", u32::max_value() as u64, self.argument_timeout)? as u32;
		channel.write_line(&total_length.to_string())?;

		if total_length as usize > device.capacity().size() {
			warn!("WRITE of {} bytes wraps around on {} ({} bytes)", total_length, device.capacity(), device.capacity().size());
		}

		let mut session = TransferSession::new(total_length, self.chunk_size);
		info!("WRITE: {} bytes in {} chunks", total_length, session.chunk_count());
		self.receive(device, channel, &mut session)
	}

	pub fn receive<H, C>(&self, device: &mut MemoryDevice<H>, channel: &mut C, session: &mut TransferSession) -> crate::AResult<TransferOutcome>
	where
		H: Hardware,
		C: Channel,
	{
		let mut buffer = vec![0u8; self.chunk_size];
		let mut chunks = 0u32;
		let mut state = State::AwaitChunk;

		loop {
			state = match state {
				State::AwaitChunk => {
					if session.is_complete() {
						return Ok(TransferOutcome::Completed { chunks });
					}
					let len = session.next_chunk_len();
					// fresh timeout for every chunk
					match channel.wait_available(len, Some(self.chunk_timeout)) {
						Wait::Ready => State::ConsumeChunk(len),
						Wait::TimedOut => {
							let offset = session.bytes_written();
							warn!("WRITE: timeout after {}/{} bytes", offset, session.total_length());
							channel.write_line(&format!("Timeout waiting for bytes at address: {:X}", offset))?;
							let dropped = channel.discard_input();
							if dropped > 0 {
								debug!("WRITE: dropped {} bytes of incomplete chunk", dropped);
							}
							return Ok(TransferOutcome::TimedOut { offset });
						},
						Wait::Closed => return Err(ChannelClosed.into()),
					}
				},
				State::ConsumeChunk(len) => {
					let chunk = &mut buffer[..len];
					let count = channel.read_into(chunk);
					ensure!(count == len, "receive buffer returned {} of {} available bytes", count, len);

					let base = session.bytes_written();
					for (i, &b) in chunk.iter().enumerate() {
						device.write_byte(base + i as u32, b);
					}
					session.advance(len);
					State::Ack
				},
				State::Ack => {
					// the chunk is physically written now
					channel.write_line(ACK)?;
					chunks += 1;
					trace!("WRITE: {}/{} bytes", session.bytes_written(), session.total_length());
					State::AwaitChunk
				},
			};
		}
	}
}
