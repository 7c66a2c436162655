#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate shift_eeprom_programmer;
use shift_eeprom_programmer::*;

use std::path::Path;
use std::process::exit;
use std::time::Duration;

use shift_eeprom_programmer::channel::{
	Channel,
	StdioChannel,
	UART_RING_BUFFER,
	ring_buffer_capacity,
};
use shift_eeprom_programmer::sim::{
	Eeprom,
	SimulatedBoard,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_millis(matches: &clap::ArgMatches, name: &str) -> AResult<Option<Duration>> {
	Ok(get_param::<u64>(matches, name)?.map(Duration::from_millis))
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(about: "Runs the EEPROM programmer command loop on stdin/stdout against a simulated shift register + 28Cxx board")
		(@arg capacity: -c --capacity +takes_value "EEPROM type: 28C64 or 28C256 (default)")
		(@arg chunk_size: --("chunk-size") +takes_value "bytes per WRITE chunk (default 32)")
		(@arg chunk_timeout: --("chunk-timeout") +takes_value "milliseconds to wait for a WRITE chunk (default 5000)")
		(@arg argument_timeout: --("argument-timeout") +takes_value "milliseconds to wait for the next character of a line or number (default 1000)")
		(@arg settle: --settle +takes_value "milliseconds to wait after each byte write (default 6)")
		(@arg pulse: --pulse +takes_value "microseconds /WE is held low (default 1)")
		(@arg rx_buffer: --("rx-buffer") +takes_value "size of the receive ring buffer (default 64)")
		(@arg write_cycle: --("write-cycle") +takes_value "simulated EEPROM write cycle in milliseconds (default 5)")
		(@arg realtime: --realtime "really sleep for all delays")
		(@arg image: -i --image +takes_value "preload EEPROM contents from file")
		(@arg save: -s --save +takes_value "store EEPROM contents to file on exit")
	).get_matches();

	let mut config = Config::default();
	if let Some(capacity) = get_param::<Capacity>(&matches, "capacity")? {
		config.capacity = capacity;
	}
	if let Some(chunk_size) = get_param::<usize>(&matches, "chunk_size")? {
		config.chunk_size = chunk_size;
	}
	if let Some(timeout) = get_millis(&matches, "chunk_timeout")? {
		config.chunk_timeout = timeout;
	}
	if let Some(timeout) = get_millis(&matches, "argument_timeout")? {
		config.argument_timeout = timeout;
	}
	if let Some(settle) = get_millis(&matches, "settle")? {
		config.timing.write_settle = settle;
	}
	if let Some(pulse) = get_param::<u64>(&matches, "pulse")? {
		config.timing.write_pulse = Duration::from_micros(pulse);
	}
	let rx_buffer = get_param::<usize>(&matches, "rx_buffer")?.unwrap_or(UART_RING_BUFFER);
	ensure!(rx_buffer >= 2, "receive ring buffer needs at least 2 bytes");
	let write_cycle = get_millis(&matches, "write_cycle")?.unwrap_or(Eeprom::WRITE_CYCLE);

	let mut eeprom = Eeprom::new(config.capacity, write_cycle);
	if let Some(image) = matches.value_of("image") {
		let image = sim::load_image(Path::new(image))?;
		info!("preloading {} bytes", image.len());
		eeprom.load(&image);
	}
	let mut board = SimulatedBoard::new(eeprom);
	board.set_realtime(matches.is_present("realtime"));

	let channel = StdioChannel::new(ring_buffer_capacity(rx_buffer));
	debug!("receive buffer: {} bytes", channel.receive_capacity());

	let mut interpreter = Interpreter::new(board, channel, config)?;
	let result = interpreter.run();

	let (board, _) = interpreter.into_parts();
	let eeprom = board.eeprom();
	info!(
		"{} writes, {} timing violations, {:?} simulated time",
		eeprom.writes(), eeprom.violations(), board.elapsed(),
	);
	if eeprom.violations() > 0 {
		warn!("EEPROM was accessed during write cycles; contents may be corrupt");
	}
	if let Some(save) = matches.value_of("save") {
		sim::save_image(Path::new(save), eeprom)?;
		info!("stored EEPROM contents in {}", save);
	}

	result
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
