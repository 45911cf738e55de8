use crate::line::Line;

/// Single slot between a completed line and its execution.
///
/// Together with the line held in the reassembler this gives a pipeline two
/// commands deep: one staged, one waiting.
#[derive(Debug, Default)]
pub struct CommandStage {
	slot: Option<Line>,
}

impl CommandStage {
	pub const fn new() -> Self {
		Self { slot: None }
	}

	/// Stages a line, handing it back if the slot is still taken.
	pub fn submit(&mut self, line: Line) -> Result<(), Line> {
		if self.slot.is_some() {
			return Err(line);
		}
		self.slot = Some(line);
		Ok(())
	}

	pub fn has_pending(&self) -> bool {
		self.slot.is_some()
	}

	pub fn take_pending(&mut self) -> Option<Line> {
		self.slot.take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn line(text: &[u8]) -> Line {
		Line::from_slice(text).unwrap()
	}

	#[test]
	fn holds_a_single_line() {
		let mut stage = CommandStage::new();
		assert!(!stage.has_pending());
		assert!(stage.submit(line(b"D")).is_ok());
		assert!(stage.has_pending());

		let rejected = stage.submit(line(b"V")).unwrap_err();
		assert_eq!(rejected.as_slice(), b"V");

		assert_eq!(stage.take_pending().unwrap().as_slice(), b"D");
		assert!(!stage.has_pending());
		assert!(stage.take_pending().is_none());
	}
}
