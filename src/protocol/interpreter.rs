use crate::bus::{
	AddressBus,
	Hardware,
};
use crate::channel::{
	ArgumentError,
	Channel,
	ChannelClosed,
	TextInput,
};
use crate::config::Config;
use crate::device::MemoryDevice;

use super::{
	ACK,
	BANNER,
	ChunkedTransfer,
	Command,
	HexDumpRow,
	ROW_LENGTH,
	SENTINEL,
	TransferOutcome,
};

/// host addresses are 16-bit; they get mirrored into the chip
const MAX_HOST_ADDRESS: u64 = 0xffff;

pub type Handler<H, C> = fn(&mut Interpreter<H, C>) -> crate::AResult<()>;

pub struct Interpreter<H: Hardware, C: Channel> {
	device: MemoryDevice<H>,
	channel: C,
	config: Config,
}

impl<H: Hardware, C: Channel> Interpreter<H, C> {
	pub fn new(hardware: H, channel: C, config: Config) -> crate::AResult<Self> {
		config.validate(channel.receive_capacity())?;
		let device = MemoryDevice::new(AddressBus::new(hardware), config.capacity, config.timing);
		Ok(Interpreter {
			device,
			channel,
			config,
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn device(&mut self) -> &mut MemoryDevice<H> {
		&mut self.device
	}

	pub fn channel(&mut self) -> &mut C {
		&mut self.channel
	}

	pub fn into_parts(self) -> (H, C) {
		(self.device.into_bus().into_hardware(), self.channel)
	}

	pub fn handler(command: Command) -> Handler<H, C> {
		match command {
			Command::Read => Self::read,
			Command::Erase => Self::erase,
			Command::Write => Self::write,
			Command::WriteByte => Self::write_byte,
			Command::ReadByte => Self::read_byte,
		}
	}

	/// greet the host, then handle commands until the host closes the channel
	pub fn run(&mut self) -> crate::AResult<()> {
		self.channel.write_line(BANNER)?;
		info!("ready ({}, chunk size {})", self.config.capacity, self.config.chunk_size);

		loop {
			if let Err(e) = self.step() {
				if e.downcast_ref::<ChannelClosed>().is_some() {
					info!("host closed the channel");
					return Ok(());
				}
				return Err(e);
			}
		}
	}

	/// read and handle a single command line
	pub fn step(&mut self) -> crate::AResult<()> {
		let line = self.channel.read_line(self.config.argument_timeout)?;
		let line = line.trim();
		if line.is_empty() {
			return Ok(());
		}

		match Command::lookup(line) {
			Some(command) => self.execute(command),
			None => {
				warn!("unknown command {:?}", line);
				self.channel.write_line(&format!(
					"Unknown command: '{}'. Use READ, ERASE, WRITE, WRITE_BYTE, READ_BYTE",
					line,
				))
			},
		}
	}

	/// run the handler for `command`; its arguments are read from the channel
	pub fn execute(&mut self, command: Command) -> crate::AResult<()> {
		debug!("command {}", command);
		match (Self::handler(command))(self) {
			Err(ref e) if e.downcast_ref::<ArgumentError>().is_some() => {
				warn!("{}: {}", command, e);
				self.channel.write_line(&format!("Invalid argument: {}", e))?;
				self.channel.write_line(SENTINEL)
			},
			result => result,
		}
	}

	fn read_address(&mut self, name: &'static str) -> crate::AResult<u32> {
		Ok(self.channel.read_argument(name, MAX_HOST_ADDRESS, self.config.argument_timeout)? as u32)
	}

	fn read_max_address(&mut self) -> crate::AResult<u32> {
		let max_address = self.read_address("max address")?;
		let chip_max = self.device.capacity().max_address() as u32;
		if max_address > chip_max {
			warn!("max address 0x{:04x} beyond {}, using 0x{:04x}", max_address, self.device.capacity(), chip_max);
			return Ok(chip_max);
		}
		Ok(max_address)
	}

	fn read(&mut self) -> crate::AResult<()> {
		let max_address = self.read_max_address()?;

		let mut row = [0u8; ROW_LENGTH];
		let mut base = 0u32;
		while base <= max_address {
			let len = ((max_address - base) as usize + 1).min(ROW_LENGTH);
			for (offset, b) in row[..len].iter_mut().enumerate() {
				*b = self.device.read_byte(base + offset as u32);
			}
			self.channel.write_line(&HexDumpRow { base, data: &row[..len] }.to_string())?;
			base += ROW_LENGTH as u32;
		}

		self.channel.write_line(SENTINEL)
	}

	fn erase(&mut self) -> crate::AResult<()> {
		let max_address = self.read_max_address()?;
		info!("ERASE 0x0000..=0x{:04x}", max_address);
		self.device.erase(max_address);
		self.channel.write_line(SENTINEL)
	}

	fn write(&mut self) -> crate::AResult<()> {
		let transfer = ChunkedTransfer::new(&self.config);
		match transfer.run(&mut self.device, &mut self.channel)? {
			TransferOutcome::Completed { chunks } => debug!("WRITE done ({} chunks)", chunks),
			TransferOutcome::TimedOut { offset } => info!("WRITE aborted at 0x{:04x}", offset),
		}
		self.channel.write_line(SENTINEL)
	}

	fn write_byte(&mut self) -> crate::AResult<()> {
		let address = self.read_address("address")?;
		let value = self.channel.read_argument("value", 0xff, self.config.argument_timeout)? as u8;
		self.device.write_byte(address, value);
		self.channel.write_line(ACK)
	}

	fn read_byte(&mut self) -> crate::AResult<()> {
		let address = self.read_address("address")?;
		let value = self.device.read_byte(address);
		self.channel.write_line(&format!("{:02X}", value))
	}
}
