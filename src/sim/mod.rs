/// Simulated programmer hardware, for running the command loop without a
/// controller (and for tests).

mod board;
mod eeprom;
mod shift_register;

use std::fs;
use std::path::Path;

pub use self::board::SimulatedBoard;
pub use self::eeprom::Eeprom;
pub use self::shift_register::ShiftRegisterChain;

pub fn load_image(path: &Path) -> crate::AResult<Vec<u8>> {
	with_context!(("couldn't read image {}", path.display()), {
		Ok(fs::read(path)?)
	})
}

pub fn save_image(path: &Path, eeprom: &Eeprom) -> crate::AResult<()> {
	with_context!(("couldn't write image {}", path.display()), {
		fs::write(path, eeprom.contents())?;
		Ok(())
	})
}
