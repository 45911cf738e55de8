use crate::{hal::StatusLed, Millis};

pub const TICK_MS: Millis = 100;
/// Ticks in one idle blink cycle.
pub const CYCLE_TICKS: u32 = 40;
/// Ticks the LED stays lit after a command.
pub const COMMAND_HOLD_TICKS: u32 = 2;

/// Position of `now` inside the blink cycle.
pub fn phase(now: Millis) -> u32 {
	((now / TICK_MS) % Millis::from(CYCLE_TICKS)) as u32
}

/// Drives the status LED.
///
/// When idle the LED is lit for the last tick of every cycle. A command
/// forces it on and keeps it on for [`COMMAND_HOLD_TICKS`], during which the
/// idle pattern is suspended.
#[derive(Debug, Default)]
pub struct Heartbeat {
	hold_until: Option<u32>,
	lit: bool,
}

impl Heartbeat {
	pub const fn new() -> Self {
		Self {
			hold_until: None,
			lit: false,
		}
	}

	pub fn advance(&mut self, now: Millis, led: &mut impl StatusLed) {
		let phase = phase(now);
		match self.hold_until {
			None if phase >= CYCLE_TICKS - 1 => self.set(led, true),
			None if phase == 0 => self.set(led, false),
			None => {}
			Some(off) if phase == off => {
				self.hold_until = None;
				self.set(led, false);
			}
			Some(_) => {}
		}
	}

	/// Lights the LED until the idle pattern next turns it off.
	pub fn light(&mut self, led: &mut impl StatusLed) {
		self.set(led, true);
	}

	/// Lights the LED while a command runs.
	pub fn command_started(&mut self, led: &mut impl StatusLed) {
		self.set(led, true);
	}

	/// Schedules the LED to go dark two ticks from now.
	pub fn command_finished(&mut self, now: Millis) {
		self.hold_until = Some((phase(now) + COMMAND_HOLD_TICKS) % CYCLE_TICKS);
	}

	pub fn is_lit(&self) -> bool {
		self.lit
	}

	fn set(&mut self, led: &mut impl StatusLed, on: bool) {
		if self.lit != on {
			self.lit = on;
			led.set(on);
		}
	}
}
