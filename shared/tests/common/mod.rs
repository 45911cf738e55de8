#![allow(dead_code)]

use heapless::Deque;
use led_controller_shared::{
	heartbeat::TICK_MS,
	reply::OUTBOX_SIZE,
	ChannelOrder,
	Engine,
	Settings,
	StatusLed,
	Strip,
	RGB8,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripCall {
	Configure(usize, ChannelOrder),
	Brightness(u8),
	Show(Vec<RGB8>),
	ShowColor(RGB8),
}

#[derive(Debug, Default)]
pub struct FakeStrip {
	pub calls: Vec<StripCall>,
}

impl Strip for FakeStrip {
	fn configure(&mut self, count: usize, order: ChannelOrder) {
		self.calls.push(StripCall::Configure(count, order));
	}

	fn set_brightness(&mut self, level: u8) {
		self.calls.push(StripCall::Brightness(level));
	}

	fn show(&mut self, pixels: &[RGB8]) {
		self.calls.push(StripCall::Show(pixels.to_vec()));
	}

	fn show_color(&mut self, color: RGB8) {
		self.calls.push(StripCall::ShowColor(color));
	}
}

#[derive(Debug, Default)]
pub struct FakeLed {
	pub on: bool,
	pub writes: usize,
}

impl StatusLed for FakeLed {
	fn set(&mut self, on: bool) {
		self.on = on;
		self.writes += 1;
	}
}

/// Engine plus a fake clock that only moves when told to.
pub struct Harness {
	pub engine: Engine<FakeStrip, FakeLed>,
	pub now: u64,
	rx: Deque<u8, 2048>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_settings(Settings::default())
	}

	pub fn with_settings(settings: Settings) -> Self {
		Self {
			engine: Engine::new(settings, FakeStrip::default(), FakeLed::default()),
			now: 0,
			rx: Deque::new(),
		}
	}

	/// Delivers bytes to the engine, calling the link handler until all are consumed.
	pub fn send(&mut self, bytes: &[u8]) {
		for &byte in bytes {
			self.rx.push_back(byte).expect("rx queue full");
		}
		while !self.rx.is_empty() {
			self.engine.service_link(&mut self.rx);
		}
	}

	/// Delivers bytes with a single link handler call, leaving the rest queued.
	pub fn send_once(&mut self, bytes: &[u8]) {
		for &byte in bytes {
			self.rx.push_back(byte).expect("rx queue full");
		}
		self.engine.service_link(&mut self.rx);
	}

	pub fn pending_rx(&self) -> usize {
		self.rx.len()
	}

	pub fn tick(&mut self) {
		self.engine.tick(self.now);
	}

	pub fn advance(&mut self, ms: u64) {
		self.now += ms;
		self.engine.tick(self.now);
	}

	/// Sends a line, runs one tick and returns everything written to the link.
	pub fn command(&mut self, line: &str) -> String {
		self.send(line.as_bytes());
		self.send(b"\r");
		self.advance(TICK_MS);
		self.output()
	}

	pub fn output(&mut self) -> String {
		let mut buf = [0u8; OUTBOX_SIZE];
		let n = self.engine.outbox().drain(&mut buf);
		String::from_utf8_lossy(&buf[..n]).into_owned()
	}

	pub fn strip_calls(&mut self) -> Vec<StripCall> {
		std::mem::take(&mut self.engine.strip_mut().calls)
	}
}
