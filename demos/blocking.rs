use std::{thread, time::Duration};

use eyre::Result;
use led_controller::{ChannelOrder, Config, LedController, RGB8};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LEDS: usize = 60;

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let config = Config {
		leds: LEDS,
		order: ChannelOrder::Grb,
	};
	let mut controller = LedController::find(config)?;
	controller.configure()?;

	info!(version = %controller.version()?, "connected");
	info!(description = ?controller.describe()?, "configured");

	controller.set_brightness(32)?;

	let mut frame = [RGB8::default(); LEDS];
	for step in 0..LEDS * 4 {
		for (i, led) in frame.iter_mut().enumerate() {
			let level = if (i + step) % 10 == 0 { 255 } else { 0 };
			*led = RGB8::new(level, 0, 255 - level);
		}

		let (command, data) = controller.send_leds(&frame)?;
		info!(?command, ?data, "frame sent");
		thread::sleep(Duration::from_millis(16));
	}

	controller.fill(RGB8::default())?;
	controller.show()?;

	Ok(())
}
