use crate::{color::RGB8, Millis, BYTES_PER_LED, FRAME_TIMEOUT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameStatus {
	Continuing,
	Completed,
}

/// Receives a raw RGB frame, three bytes per LED in index order.
///
/// While active every link byte belongs to the frame, including CR. The
/// receiver leaves binary mode when the last pixel is written or when
/// [`FrameReceiver::poll_timeout`] finds the deadline passed.
#[derive(Debug, Default)]
pub struct FrameReceiver {
	active: bool,
	index: usize,
	partial: [u8; BYTES_PER_LED],
	filled: usize,
	started: Millis,
}

impl FrameReceiver {
	pub const fn new() -> Self {
		Self {
			active: false,
			index: 0,
			partial: [0; BYTES_PER_LED],
			filled: 0,
			started: 0,
		}
	}

	pub fn enter(&mut self, now: Millis) {
		self.reset();
		self.active = true;
		self.started = now;
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	/// Index of the pixel currently being received.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Accumulates one byte, writing a pixel into `pixels` every third byte.
	///
	/// `pixels` is the visible part of the pixel array, its length is the
	/// configured LED count.
	pub fn feed(&mut self, byte: u8, pixels: &mut [RGB8]) -> FrameStatus {
		if !self.active {
			return FrameStatus::Continuing;
		}

		self.partial[self.filled] = byte;
		self.filled += 1;
		if self.filled < BYTES_PER_LED {
			return FrameStatus::Continuing;
		}
		self.filled = 0;

		let [r, g, b] = self.partial;
		if let Some(pixel) = pixels.get_mut(self.index) {
			*pixel = RGB8 { r, g, b };
		}
		self.index += 1;

		if self.index >= pixels.len() {
			trace!("frame: received {} pixels", self.index);
			self.reset();
			return FrameStatus::Completed;
		}
		FrameStatus::Continuing
	}

	/// Aborts the frame if it has been running for longer than the timeout.
	///
	/// Returns `true` when the frame was aborted by this call.
	pub fn poll_timeout(&mut self, now: Millis) -> bool {
		if !self.active || now.saturating_sub(self.started) <= FRAME_TIMEOUT_MS {
			return false;
		}
		warn!("frame: timed out at pixel {}", self.index);
		self.reset();
		true
	}

	fn reset(&mut self) {
		self.active = false;
		self.index = 0;
		self.filled = 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fills_pixels_in_order() {
		let mut pixels = [RGB8::default(); 2];
		let mut receiver = FrameReceiver::new();
		receiver.enter(0);

		let bytes = [1, 2, 3, 4, 5, 6];
		let (last, rest) = bytes.split_last().unwrap();
		for &byte in rest {
			assert_eq!(receiver.feed(byte, &mut pixels), FrameStatus::Continuing);
		}
		assert_eq!(receiver.index(), 1);
		assert_eq!(receiver.feed(*last, &mut pixels), FrameStatus::Completed);

		assert!(!receiver.is_active());
		assert_eq!(receiver.index(), 0);
		assert_eq!(pixels, [RGB8::new(1, 2, 3), RGB8::new(4, 5, 6)]);
	}

	#[test]
	fn any_byte_value_is_payload() {
		let mut pixels = [RGB8::default(); 1];
		let mut receiver = FrameReceiver::new();
		receiver.enter(0);
		receiver.feed(b'\r', &mut pixels);
		receiver.feed(0x00, &mut pixels);
		assert_eq!(receiver.feed(0xFF, &mut pixels), FrameStatus::Completed);
		assert_eq!(pixels[0], RGB8::new(b'\r', 0, 0xFF));
	}

	#[test]
	fn times_out_after_deadline() {
		let mut pixels = [RGB8::default(); 4];
		let mut receiver = FrameReceiver::new();
		receiver.enter(1000);
		for byte in 0..4 {
			receiver.feed(byte, &mut pixels);
		}

		assert!(!receiver.poll_timeout(1000 + FRAME_TIMEOUT_MS));
		assert!(receiver.is_active());
		assert!(receiver.poll_timeout(1001 + FRAME_TIMEOUT_MS));
		assert!(!receiver.is_active());
		assert_eq!(receiver.index(), 0);

		// a fresh frame starts from the first byte of the first pixel
		receiver.enter(9000);
		receiver.feed(7, &mut pixels);
		receiver.feed(8, &mut pixels);
		receiver.feed(9, &mut pixels);
		assert_eq!(pixels[0], RGB8::new(7, 8, 9));
	}

	#[test]
	fn idle_receiver_never_times_out() {
		let mut receiver = FrameReceiver::new();
		assert!(!receiver.poll_timeout(u64::MAX));
	}
}
