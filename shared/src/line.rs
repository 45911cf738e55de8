use heapless::Vec;

use crate::{LINE_BUFFER_SIZE, LINE_TERMINATOR};

/// One command line, printable bytes only, no terminator.
pub type Line = Vec<u8, LINE_BUFFER_SIZE>;

/// Longest line that is kept, anything past this is dropped until the terminator.
pub const MAX_LINE_LEN: usize = LINE_BUFFER_SIZE - 2;

const FIRST_PRINTABLE: u8 = b' ';

/// What happened to a byte fed into the [`LineReassembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
	/// Control byte, or a line is already waiting for the staging slot.
	Ignored,
	/// Printable byte appended to the line, echo it if enabled.
	Stored(u8),
	/// Printable byte dropped because the line is full.
	Dropped,
	/// Terminator on an empty line.
	Reprompt,
	/// Terminator on a non-empty line, the line is ready to be taken or held.
	Completed,
}

/// Turns link bytes into command lines.
///
/// When the staging slot is busy a completed line is held here, and every
/// line-mode byte is discarded until [`LineReassembler::take`] releases it.
#[derive(Debug, Default)]
pub struct LineReassembler {
	buffer: Line,
	waiting: bool,
}

impl LineReassembler {
	pub const fn new() -> Self {
		Self {
			buffer: Vec::new(),
			waiting: false,
		}
	}

	pub fn feed(&mut self, byte: u8) -> LineEvent {
		if self.waiting {
			return LineEvent::Ignored;
		}

		if byte == LINE_TERMINATOR {
			return if self.buffer.is_empty() {
				LineEvent::Reprompt
			} else {
				LineEvent::Completed
			};
		}

		if byte < FIRST_PRINTABLE {
			return LineEvent::Ignored;
		}

		if self.buffer.len() >= MAX_LINE_LEN {
			return LineEvent::Dropped;
		}

		// length was checked against MAX_LINE_LEN, which is below the capacity
		let _ = self.buffer.push(byte);
		LineEvent::Stored(byte)
	}

	/// Keeps the completed line in place until the staging slot frees up.
	pub fn hold(&mut self) {
		self.waiting = true;
	}

	pub fn is_waiting(&self) -> bool {
		self.waiting
	}

	/// Hands out the current line and starts a fresh one.
	pub fn take(&mut self) -> Line {
		self.waiting = false;
		core::mem::take(&mut self.buffer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn feed_all(reassembler: &mut LineReassembler, bytes: &[u8]) -> LineEvent {
		let mut last = LineEvent::Ignored;
		for &byte in bytes {
			last = reassembler.feed(byte);
		}
		last
	}

	#[test]
	fn completes_on_carriage_return() {
		let mut reassembler = LineReassembler::new();
		assert_eq!(reassembler.feed(b'D'), LineEvent::Stored(b'D'));
		assert_eq!(reassembler.feed(b'\r'), LineEvent::Completed);
		assert_eq!(reassembler.take().as_slice(), b"D");
		assert!(reassembler.take().is_empty());
	}

	#[test]
	fn empty_line_reprompts() {
		let mut reassembler = LineReassembler::new();
		assert_eq!(reassembler.feed(b'\r'), LineEvent::Reprompt);
	}

	#[test]
	fn control_bytes_are_not_stored() {
		let mut reassembler = LineReassembler::new();
		assert_eq!(feed_all(&mut reassembler, b"\n\x00\x1b\t"), LineEvent::Ignored);
		assert_eq!(reassembler.feed(b'\r'), LineEvent::Reprompt);
	}

	#[test]
	fn overflow_drops_until_terminator() {
		let mut reassembler = LineReassembler::new();
		for _ in 0..MAX_LINE_LEN {
			assert!(matches!(reassembler.feed(b'x'), LineEvent::Stored(_)));
		}
		assert_eq!(reassembler.feed(b'y'), LineEvent::Dropped);
		assert_eq!(reassembler.feed(b'z'), LineEvent::Dropped);
		assert_eq!(reassembler.feed(b'\r'), LineEvent::Completed);

		let line = reassembler.take();
		assert_eq!(line.len(), MAX_LINE_LEN);
		assert!(line.iter().all(|&b| b == b'x'));

		assert_eq!(feed_all(&mut reassembler, b"a\r"), LineEvent::Completed);
		assert_eq!(reassembler.take().as_slice(), b"a");
	}

	#[test]
	fn held_line_is_not_overwritten() {
		let mut reassembler = LineReassembler::new();
		feed_all(&mut reassembler, b"V\r");
		reassembler.hold();
		assert!(reassembler.is_waiting());

		assert_eq!(reassembler.feed(b'D'), LineEvent::Ignored);
		assert_eq!(reassembler.feed(b'\r'), LineEvent::Ignored);

		assert_eq!(reassembler.take().as_slice(), b"V");
		assert!(!reassembler.is_waiting());
		assert_eq!(reassembler.feed(b'D'), LineEvent::Stored(b'D'));
	}
}
