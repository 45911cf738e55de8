use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use led_controller_shared::{ChannelOrder, MAX_LEDS, RGB8};

/// Everything the LED task needs to render one frame.
#[derive(Clone)]
pub struct Frame {
	pub pixels: [RGB8; MAX_LEDS],
	pub count: usize,
	pub order: ChannelOrder,
	pub brightness: u8,
}

/// Latest frame wins, a frame that was not picked up yet is replaced.
pub static DISPLAY_SIGNAL: Signal<CriticalSectionRawMutex, Frame> = Signal::new();
