//! Interfaces to the hardware the engine drives but does not own.

use crate::color::{ChannelOrder, RGB8};

/// The LED strip driver.
pub trait Strip {
	/// (Re)initializes the driver for `count` LEDs in the given channel order.
	fn configure(&mut self, count: usize, order: ChannelOrder);

	fn set_brightness(&mut self, level: u8);

	/// Renders the visible part of the pixel array.
	fn show(&mut self, pixels: &[RGB8]);

	/// Renders a single color on every LED without touching the pixel array.
	fn show_color(&mut self, color: RGB8);
}

/// The on-board status LED.
pub trait StatusLed {
	fn set(&mut self, on: bool);
}

/// Non-blocking source of received link bytes.
pub trait ByteSource {
	fn read_byte(&mut self) -> Option<u8>;
}

/// Receive queue filled from the link, drained by the engine.
impl<const N: usize> ByteSource for heapless::Deque<u8, N> {
	fn read_byte(&mut self) -> Option<u8> {
		self.pop_front()
	}
}
