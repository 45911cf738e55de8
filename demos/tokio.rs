use std::time::Duration;

use eyre::{eyre, Result};
use led_controller::{tokio::LedController, ChannelOrder, Config, RGB8};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LEDS: usize = 60;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let config = Config {
		leds: LEDS,
		order: ChannelOrder::Grb,
	};
	let mut controller = LedController::find(config)?.ok_or_else(|| eyre!("no LED controller connected"))?;
	controller.configure().await?;

	info!(version = %controller.version().await?, "connected");

	let mut interval = tokio::time::interval(Duration::from_millis(16));
	let mut frame = [RGB8::default(); LEDS];
	for step in 0..LEDS * 4 {
		interval.tick().await;

		for (i, led) in frame.iter_mut().enumerate() {
			let level = if (i + step) % 10 == 0 { 255 } else { 0 };
			*led = RGB8::new(0, level, 255 - level);
		}

		let (command, data) = controller.send_leds(&frame).await?;
		info!(?command, ?data, "frame sent");
	}

	// a bad request comes back as the device's error message
	if let Err(error) = controller.set_pixel(LEDS, RGB8::new(255, 0, 0)).await {
		info!(%error, "expected failure");
	}

	Ok(())
}
