use std::time::Duration;

use failure::Fail;

use crate::device::{
	Capacity,
	Timing,
};

/// chunk sizes known to work with the reference controller and host tool
pub const VALIDATED_CHUNK_SIZES: (usize, usize) = (16, 32);

#[derive(Debug, Fail)]
pub enum ConfigError {
	#[fail(display = "chunk size must not be zero")]
	EmptyChunk,
	#[fail(display = "chunk size {} doesn't fit into the receive buffer ({} bytes)", chunk_size, receive_capacity)]
	ChunkTooLarge {
		chunk_size: usize,
		receive_capacity: usize,
	},
	#[fail(display = "chunk timeout must not be zero")]
	ZeroTimeout,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Config {
	pub capacity: Capacity,
	pub timing: Timing,
	/// bytes per WRITE chunk (the last chunk may be shorter)
	pub chunk_size: usize,
	/// how long to wait for a full chunk; restarts for every chunk
	pub chunk_timeout: Duration,
	/// how long to wait for the next character within a line or number
	pub argument_timeout: Duration,
}

impl Config {
	pub const CHUNK_SIZE: usize = 32;
	pub const CHUNK_TIMEOUT: Duration = Duration::from_millis(5000);
	pub const ARGUMENT_TIMEOUT: Duration = Duration::from_millis(1000);

	/// a chunk is only consumed once it is completely buffered, so it must
	/// fit into the receive buffer of the channel
	pub fn validate(&self, receive_capacity: usize) -> crate::AResult<()> {
		if 0 == self.chunk_size {
			return Err(ConfigError::EmptyChunk.into());
		}
		if self.chunk_size > receive_capacity {
			return Err(ConfigError::ChunkTooLarge {
				chunk_size: self.chunk_size,
				receive_capacity,
			}.into());
		}
		if self.chunk_timeout == Duration::from_secs(0) {
			return Err(ConfigError::ZeroTimeout.into());
		}

		let (min, max) = VALIDATED_CHUNK_SIZES;
		if self.chunk_size < min || self.chunk_size > max {
			warn!("chunk size {} outside of tested range {}..={}", self.chunk_size, min, max);
		}
		if self.timing.write_settle < Timing::WRITE_SETTLE {
			warn!("write settle delay {:?} below {:?}: writes might get lost", self.timing.write_settle, Timing::WRITE_SETTLE);
		}
		Ok(())
	}
}

impl Default for Config {
	fn default() -> Self {
		Config {
			capacity: Capacity::default(),
			timing: Timing::default(),
			chunk_size: Self::CHUNK_SIZE,
			chunk_timeout: Self::CHUNK_TIMEOUT,
			argument_timeout: Self::ARGUMENT_TIMEOUT,
		}
	}
}
