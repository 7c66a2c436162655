extern crate shift_eeprom_programmer;

use std::time::Duration;

use shift_eeprom_programmer::bus::AddressFrames;
use shift_eeprom_programmer::channel::ScriptedChannel;
use shift_eeprom_programmer::protocol::{
	ACK,
	BANNER,
	Command,
	Interpreter,
	SENTINEL,
};
use shift_eeprom_programmer::sim::SimulatedBoard;
use shift_eeprom_programmer::{
	Capacity,
	Config,
};

fn interpreter(config: Config, channel: ScriptedChannel) -> Interpreter<SimulatedBoard, ScriptedChannel> {
	let board = SimulatedBoard::with_capacity(config.capacity);
	Interpreter::new(board, channel, config).unwrap()
}

fn run_session(config: Config, channel: ScriptedChannel) -> (SimulatedBoard, Vec<String>) {
	run_with_image(config, channel, &[])
}

fn run_with_image(config: Config, channel: ScriptedChannel, image: &[u8]) -> (SimulatedBoard, Vec<String>) {
	let mut interp = interpreter(config, channel);
	interp.device().bus().hardware().eeprom_mut().load(image);
	interp.run().unwrap();
	let (board, channel) = interp.into_parts();
	assert_eq!(board.eeprom().violations(), 0);
	(board, channel.lines().to_vec())
}

fn lines(expected: &[&str]) -> Vec<String> {
	let mut v = vec![BANNER.to_string()];
	v.extend(expected.iter().map(|l| l.to_string()));
	v
}

#[test]
fn write_three_bytes_in_chunks_of_two() {
	let mut config = Config::default();
	config.chunk_size = 2;

	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE").send_line("3").send(&[0x01u8, 0x02, 0x03]);
	ch.send_line("READ_BYTE").send_line("1");

	let (board, output) = run_session(config, ch);
	assert_eq!(output, lines(&["3", ACK, ACK, SENTINEL, "02"]));
	assert_eq!(&board.eeprom().contents()[..4], &[0x01, 0x02, 0x03, 0xff]);
}

#[test]
fn reset_vector_patch() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE_BYTE").send_line("65532").send_line("0");
	ch.send_line("READ_BYTE").send_line("65532");

	let (board, output) = run_session(Config::default(), ch);
	assert_eq!(output, lines(&[ACK, "00"]));
	assert_eq!(board.eeprom().contents()[0x7ffc], 0x00);
	assert_eq!(board.eeprom().writes(), 1);
}

#[test]
fn one_ack_per_chunk() {
	let data: Vec<u8> = (0..100u32).map(|i| (i * 7) as u8).collect();
	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE").send_line("100").send(&data);

	let (board, output) = run_session(Config::default(), ch);
	// 100 bytes in chunks of 32: 32 + 32 + 32 + 4
	assert_eq!(output, lines(&["100", ACK, ACK, ACK, ACK, SENTINEL]));
	assert_eq!(&board.eeprom().contents()[..100], &data[..]);
	assert_eq!(board.eeprom().writes(), 100);
}

#[test]
fn chunk_timeout_aborts_session_only() {
	let mut config = Config::default();
	config.chunk_size = 16;

	let data: Vec<u8> = (1..=40).collect();
	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE").send_line("40").send(&data[..26]);
	ch.pause(Duration::from_secs(6));
	ch.send_line("READ_BYTE").send_line("15");

	let (board, output) = run_session(config, ch);
	assert_eq!(output, lines(&[
		"40",
		ACK,
		"Timeout waiting for bytes at address: 10",
		SENTINEL,
		"10",
	]));
	let contents = board.eeprom().contents();
	assert_eq!(&contents[..16], &data[..16]);
	// incomplete second chunk was never written
	assert!(contents[16..40].iter().all(|&b| b == 0xff));
}

#[test]
fn chunk_timeout_restarts_for_every_chunk() {
	let mut config = Config::default();
	config.chunk_size = 16;

	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE").send_line("48");
	for i in 0..3u8 {
		// every chunk arrives just before its own timeout
		ch.pause(Duration::from_millis(4900));
		ch.send(&[i; 16]);
	}

	let mut interp = interpreter(config, ch);
	interp.run().unwrap();
	let (board, channel) = interp.into_parts();
	assert_eq!(channel.lines().to_vec(), lines(&["48", ACK, ACK, ACK, SENTINEL]));
	assert!(channel.elapsed() > config.chunk_timeout);
	assert_eq!(board.eeprom().contents()[47], 2);
}

#[test]
fn empty_write() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("write").send_line("0");

	let (board, output) = run_session(Config::default(), ch);
	assert_eq!(output, lines(&["0", SENTINEL]));
	assert_eq!(board.eeprom().writes(), 0);
}

#[test]
fn erase_fills_range_with_ff() {
	let image = [0x55u8; 200];
	let mut ch = ScriptedChannel::new();
	ch.send_line("ERASE").send_line("100");

	let (board, output) = run_with_image(Config::default(), ch, &image);
	assert_eq!(output, lines(&[SENTINEL]));
	let contents = board.eeprom().contents();
	assert!(contents[..=100].iter().all(|&b| b == 0xff));
	assert_eq!(contents[101], 0x55);
	assert_eq!(board.eeprom().writes(), 101);
}

#[test]
fn read_dumps_rows_of_sixteen() {
	let image: Vec<u8> = (0..0x20).collect();
	let mut ch = ScriptedChannel::new();
	ch.send_line("READ").send_line("20");

	let (_, output) = run_with_image(Config::default(), ch, &image);
	assert_eq!(output, lines(&[
		"000: 00 01 02 03 04 05 06 07   08 09 0a 0b 0c 0d 0e 0f",
		"010: 10 11 12 13 14",
		SENTINEL,
	]));
}

#[test]
fn read_is_clamped_to_capacity() {
	let mut config = Config::default();
	config.capacity = Capacity::At28c64;

	let mut ch = ScriptedChannel::new();
	ch.send_line("READ").send_line("65535");

	let (_, output) = run_session(config, ch);
	assert_eq!(output.len(), 1 + 0x2000 / 16 + 1);
	assert!(output[0x200].starts_with("1ff0: ff"));
	assert_eq!(output.last().unwrap(), SENTINEL);
}

#[test]
fn unknown_command_keeps_interpreter_usable() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("HELLO").send_line("").send_line("  read_byte  ").send_line("0");

	let (_, output) = run_session(Config::default(), ch);
	assert_eq!(output, lines(&[
		"Unknown command: 'HELLO'. Use READ, ERASE, WRITE, WRITE_BYTE, READ_BYTE",
		"FF",
	]));
}

#[test]
fn invalid_argument_is_reported() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE_BYTE").send_line("5").send_line("300");
	ch.send_line("READ_BYTE").send_line("70000");
	ch.send_line("READ_BYTE").send_line("5");

	let (_, output) = run_session(Config::default(), ch);
	assert_eq!(output, lines(&[
		"Invalid argument: value out of range: 300 (expected 0..=255)",
		SENTINEL,
		"Invalid argument: address out of range: 70000 (expected 0..=65535)",
		SENTINEL,
		"FF",
	]));
}

#[test]
fn handlers_can_be_called_directly() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("42").send_line("171");
	ch.send_line("42");

	let mut interp = interpreter(Config::default(), ch);
	Interpreter::handler(Command::WriteByte)(&mut interp).unwrap();
	Interpreter::handler(Command::ReadByte)(&mut interp).unwrap();
	assert_eq!(interp.channel().take_lines(), vec![ACK.to_string(), "AB".to_string()]);
}

#[test]
fn waits_for_arguments_without_timeout() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("READ_BYTE");
	ch.pause(Duration::from_secs(600));
	ch.send_line("0");

	let (_, output) = run_session(Config::default(), ch);
	assert_eq!(output, lines(&["FF"]));
}

#[test]
fn short_settle_delay_loses_writes() {
	let mut config = Config::default();
	config.timing.write_settle = Duration::from_millis(1);

	let mut ch = ScriptedChannel::new();
	ch.send_line("WRITE").send_line("3").send(&[0x01u8, 0x02, 0x03]);

	let mut interp = interpreter(config, ch);
	interp.run().unwrap();
	let (board, channel) = interp.into_parts();
	// still acknowledged: the programmer can't tell
	assert_eq!(channel.lines().to_vec(), lines(&["3", ACK, SENTINEL]));
	assert!(board.eeprom().violations() > 0);
	assert_ne!(&board.eeprom().contents()[..3], &[0x01, 0x02, 0x03]);
}

#[test]
fn single_byte_commands_latch_one_address_each() {
	let mut ch = ScriptedChannel::new();
	ch.send_line("65532").send_line("0");
	ch.send_line("8");

	let mut interp = interpreter(Config::default(), ch);
	Interpreter::handler(Command::WriteByte)(&mut interp).unwrap();
	assert_eq!(interp.device().bus().latched(), Some(AddressFrames::encode(0x7ffc, false)));
	{
		let board = interp.device().bus().hardware();
		assert_eq!(board.chain().latch_pulses(), 1);
		assert_eq!(board.chain().shift_pulses(), 16);
		assert_eq!(board.address_pins(), (0x7ffc, false));
	}

	Interpreter::handler(Command::ReadByte)(&mut interp).unwrap();
	assert_eq!(interp.device().bus().latched(), Some(AddressFrames::encode(0x0008, true)));
	let board = interp.device().bus().hardware();
	assert_eq!(board.chain().latch_pulses(), 2);
	assert_eq!(board.chain().outputs(), 0x0008);
	assert_eq!(interp.channel().take_lines(), vec![ACK.to_string(), "FF".to_string()]);
}
