use core::fmt;

use heapless::Deque;

use crate::{ECHO_PROMPT, ERROR_MARKER, LINE_FEED, PROMPT, RECEIPT_MARKER};

pub const OUTBOX_SIZE: usize = 256;

/// Bytes waiting to go out on the link.
///
/// The engine never blocks on the link, so when the outbox is full further
/// bytes are dropped and counted instead.
#[derive(Debug, Default)]
pub struct Outbox {
	queue: Deque<u8, OUTBOX_SIZE>,
	dropped: usize,
}

impl Outbox {
	pub const fn new() -> Self {
		Self {
			queue: Deque::new(),
			dropped: 0,
		}
	}

	pub fn push(&mut self, byte: u8) {
		if self.queue.push_back(byte).is_err() {
			self.dropped += 1;
		}
	}

	pub fn push_slice(&mut self, bytes: &[u8]) {
		for &byte in bytes {
			self.push(byte);
		}
	}

	/// Moves as many queued bytes as fit into `out`, returns how many.
	pub fn drain(&mut self, out: &mut [u8]) -> usize {
		let mut written = 0;
		for slot in out.iter_mut() {
			let Some(byte) = self.queue.pop_front() else {
				break;
			};
			*slot = byte;
			written += 1;
		}
		written
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}

	/// Number of bytes lost to a full outbox since the last call.
	pub fn take_dropped(&mut self) -> usize {
		core::mem::take(&mut self.dropped)
	}

	/// `>` when echo is off, `\r\n> ` for interactive terminals.
	pub fn prompt(&mut self, echo: bool) {
		if echo {
			self.push_slice(ECHO_PROMPT);
		} else {
			self.push(PROMPT);
		}
	}

	/// Sent when a line is accepted into the staging slot.
	pub fn receipt(&mut self) {
		self.push(RECEIPT_MARKER);
	}

	/// Reports an error, as a single `E` or as the full message when echo is on.
	pub fn error(&mut self, echo: bool, error: &impl fmt::Display) {
		if echo {
			self.push_slice(LINE_FEED);
			let _ = fmt::Write::write_fmt(self, format_args!("{}", error));
		} else {
			self.push(ERROR_MARKER);
		}
	}

	/// Starts a value reply, which goes on its own line when echo is on.
	pub fn begin_value(&mut self, echo: bool) {
		if echo {
			self.push_slice(LINE_FEED);
		}
	}
}

impl fmt::Write for Outbox {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		self.push_slice(s.as_bytes());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn contents(outbox: &mut Outbox) -> Vec<u8> {
		let mut buf = [0u8; OUTBOX_SIZE];
		let n = outbox.drain(&mut buf);
		buf[..n].to_vec()
	}

	#[test]
	fn prompt_depends_on_echo() {
		let mut outbox = Outbox::new();
		outbox.prompt(false);
		assert_eq!(contents(&mut outbox), b">");
		outbox.prompt(true);
		assert_eq!(contents(&mut outbox), b"\r\n> ");
	}

	#[test]
	fn error_depends_on_echo() {
		let mut outbox = Outbox::new();
		outbox.error(false, &"Invalid parameter");
		assert_eq!(contents(&mut outbox), b"E");
		outbox.error(true, &"Invalid parameter");
		assert_eq!(contents(&mut outbox), b"\r\nInvalid parameter");
	}

	#[test]
	fn drops_when_full() {
		let mut outbox = Outbox::new();
		for _ in 0..OUTBOX_SIZE + 3 {
			outbox.push(b'x');
		}
		assert_eq!(outbox.len(), OUTBOX_SIZE);
		assert_eq!(outbox.take_dropped(), 3);
		assert_eq!(outbox.take_dropped(), 0);
	}

	#[test]
	fn drain_in_chunks() {
		let mut outbox = Outbox::new();
		outbox.push_slice(b"abcde");
		let mut chunk = [0u8; 2];
		assert_eq!(outbox.drain(&mut chunk), 2);
		assert_eq!(&chunk, b"ab");
		assert_eq!(outbox.drain(&mut chunk), 2);
		assert_eq!(outbox.drain(&mut chunk), 1);
		assert_eq!(chunk[0], b'e');
		assert!(outbox.is_empty());
	}
}
