use defmt::*;
use embassy_rp::{
	peripherals::{PIN_3, PIO0},
	pio::{Config, FifoJoin, Instance, Pio, ShiftConfig, ShiftDirection, StateMachine},
};
use embassy_time::{Duration, Instant, Timer};
use fixed_macro::fixed;
use led_controller_shared::{ChannelOrder, Strip, DEFAULT_BRIGHTNESS, DEFAULT_LEDS, MAX_LEDS, RGB8};
use pio_proc::pio_asm;
use smart_leds::brightness;

use crate::{
	globals::{Frame, DISPLAY_SIGNAL},
	Irqs,
};

const RESET_DURATION: Duration = Duration::from_micros(280);

#[embassy_executor::task]
pub async fn led_task(pio: PIO0, data_pin: PIN_3) {
	info!("Hello from LED task on core 1");

	let mut sm = setup_ws2812_pio(pio, data_pin);

	let mut last_write = Instant::now();
	loop {
		let frame = DISPLAY_SIGNAL.wait().await;

		// make sure we wait long enough for the ws2812 chips to reset
		let diff = Instant::now() - last_write;
		if diff < RESET_DURATION {
			Timer::after(RESET_DURATION - diff).await;
		}

		debug!("ws2812: writing {} leds", frame.count);
		write_frame(&mut sm, &frame).await;

		while !sm.tx().empty() {
			Timer::after(Duration::from_micros(5)).await;
		}
		last_write = Instant::now();
	}
}

async fn write_frame<PIO: Instance>(sm: &mut StateMachine<'_, PIO, 0>, frame: &Frame) {
	let count = frame.count.min(MAX_LEDS);
	let pixels = brightness(frame.pixels[..count].iter().copied(), frame.brightness);

	let tx = sm.tx();
	for pixel in pixels {
		let [a, b, c] = frame.order.apply(pixel);
		// 24 bits per LED, left aligned since the OSR shifts out MSB first
		tx.wait_push(u32::from_be_bytes([a, b, c, 0])).await;
	}
}

fn setup_ws2812_pio<'a>(pio: PIO0, data_pin: PIN_3) -> StateMachine<'a, PIO0, 0> {
	let Pio {
		mut common,
		sm0: mut sm,
		..
	} = Pio::new(pio, Irqs);

	// side-set drives the data line, the out bit picks a long or short high pulse
	let prg = pio_asm!(
		"
			.side_set 1
			.wrap_target
			bitloop:
				out x, 1        side 0 [2] ; T3: low
				jmp !x do_zero  side 1 [1] ; T1: high
			do_one:
				jmp bitloop     side 1 [4] ; T2: stay high for a one
			do_zero:
				nop             side 0 [4] ; T2: pull low for a zero
			.wrap
		"
	);

	const CYCLES_PER_BIT: u32 = 3 + 2 + 5;

	let pin = common.make_pio_pin(data_pin);

	let mut cfg = Config::default();
	cfg.use_program(&common.load_program(&prg.program), &[&pin]);

	let clock_freq = fixed!(125_000: U24F8);
	let ws2812_freq = fixed!(800: U24F8);
	let bit_freq = ws2812_freq * CYCLES_PER_BIT;

	cfg.clock_divider = clock_freq / bit_freq;

	cfg.shift_out = ShiftConfig {
		auto_fill: true,
		threshold: 24,
		direction: ShiftDirection::Left,
	};

	cfg.fifo_join = FifoJoin::TxOnly;

	sm.set_pin_dirs(embassy_rp::pio::Direction::Out, &[&pin]);
	sm.set_config(&cfg);
	sm.set_enable(true);

	sm
}

/// Strip driver seen by the engine, hands finished frames to the LED task.
pub struct SignalStrip {
	frame: Frame,
}

impl SignalStrip {
	pub const fn new() -> Self {
		Self {
			frame: Frame {
				pixels: [RGB8 { r: 0, g: 0, b: 0 }; MAX_LEDS],
				count: DEFAULT_LEDS,
				order: ChannelOrder::Grb,
				brightness: DEFAULT_BRIGHTNESS,
			},
		}
	}

	fn publish(&self) {
		DISPLAY_SIGNAL.signal(self.frame.clone());
	}
}

impl Strip for SignalStrip {
	fn configure(&mut self, count: usize, order: ChannelOrder) {
		info!("ws2812: {} leds, order {}", count, order);
		self.frame.count = count.min(MAX_LEDS);
		self.frame.order = order;
	}

	fn set_brightness(&mut self, level: u8) {
		self.frame.brightness = level;
	}

	fn show(&mut self, pixels: &[RGB8]) {
		let count = pixels.len().min(MAX_LEDS);
		self.frame.pixels[..count].copy_from_slice(&pixels[..count]);
		self.frame.count = count;
		self.publish();
	}

	fn show_color(&mut self, color: RGB8) {
		let count = self.frame.count;
		self.frame.pixels[..count].fill(color);
		self.publish();
	}
}
