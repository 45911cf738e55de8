use crate::{
	budget::Budget,
	color::{ChannelOrder, RGB8},
	dispatch::CommandError,
	frame::{FrameReceiver, FrameStatus},
	hal::{ByteSource, StatusLed, Strip},
	heartbeat::Heartbeat,
	line::{LineEvent, LineReassembler},
	reply::Outbox,
	stage::CommandStage,
	Millis,
	DEFAULT_BRIGHTNESS,
	DEFAULT_DATA_PIN,
	DEFAULT_LEDS,
	LINE_BYTE_BUDGET,
	MAX_LEDS,
	VERSION_STR,
};

/// Power-on values, fixed for the lifetime of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
	/// Strip data pin, only reported by `D`.
	pub data_pin: u8,
	pub leds: usize,
	pub order: ChannelOrder,
	pub brightness: u8,
	pub echo: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			data_pin: DEFAULT_DATA_PIN,
			leds: DEFAULT_LEDS,
			order: ChannelOrder::Grb,
			brightness: DEFAULT_BRIGHTNESS,
			echo: false,
		}
	}
}

/// Strip configuration, changed by the `C` and `B` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
	pub count: usize,
	pub order: ChannelOrder,
	pub brightness: u8,
}

/// Owns all protocol state.
///
/// The firmware calls [`Engine::service_link`] when bytes arrive and
/// [`Engine::tick`] from its main loop. Both take `now` from the same
/// monotonic clock. Replies collect in [`Engine::outbox`] and are written to
/// the link by the caller.
pub struct Engine<S, L> {
	pub(crate) settings: Settings,
	pub(crate) config: StripConfig,
	pub(crate) pixels: [RGB8; MAX_LEDS],
	pub(crate) initialized: bool,
	pub(crate) echo: bool,
	pub(crate) last_error: Option<CommandError>,

	pub(crate) strip: S,
	pub(crate) status: L,

	pub(crate) reassembler: LineReassembler,
	pub(crate) stage: CommandStage,
	pub(crate) frame: FrameReceiver,
	pub(crate) heartbeat: Heartbeat,
	pub(crate) outbox: Outbox,
}

impl<S: Strip, L: StatusLed> Engine<S, L> {
	pub fn new(settings: Settings, strip: S, status: L) -> Self {
		let leds = settings.leds.clamp(1, MAX_LEDS);

		Self {
			settings,
			config: StripConfig {
				count: leds,
				order: settings.order,
				brightness: settings.brightness,
			},
			pixels: [RGB8::default(); MAX_LEDS],
			initialized: false,
			echo: settings.echo,
			last_error: None,

			strip,
			status,

			reassembler: LineReassembler::new(),
			stage: CommandStage::new(),
			frame: FrameReceiver::new(),
			heartbeat: Heartbeat::new(),
			outbox: Outbox::new(),
		}
	}

	/// Queues the startup banner: version string and the first prompt.
	///
	/// The status LED is lit until the heartbeat reaches the start of a cycle.
	pub fn start(&mut self) {
		self.heartbeat.light(&mut self.status);
		self.outbox.push_slice(VERSION_STR.as_bytes());
		self.outbox.prompt(self.echo);
	}

	/// Byte-arrival entry point.
	///
	/// In line mode at most [`LINE_BYTE_BUDGET`] bytes are consumed per call,
	/// the rest stays in `source` for the next call. In frame mode bytes are
	/// consumed until the frame completes or the source runs dry.
	pub fn service_link(&mut self, source: &mut impl ByteSource) {
		let mut budget = Budget::new(LINE_BYTE_BUDGET);

		loop {
			if !self.frame.is_active() && budget.is_exhausted() {
				break;
			}
			let Some(byte) = source.read_byte() else {
				break;
			};

			if self.frame.is_active() {
				self.receive_frame_byte(byte);
			} else {
				budget.spend();
				self.receive_line_byte(byte);
			}
		}
	}

	/// Scheduling tick: runs at most one staged command, otherwise advances
	/// the heartbeat, then checks the frame deadline.
	pub fn tick(&mut self, now: Millis) {
		if let Some(line) = self.stage.take_pending() {
			self.heartbeat.command_started(&mut self.status);
			self.dispatch(&line, now);
			self.outbox.prompt(self.echo);
			self.heartbeat.command_finished(now);

			if self.reassembler.is_waiting() {
				self.stage_line();
			}
		} else {
			self.heartbeat.advance(now, &mut self.status);
		}

		if self.frame.poll_timeout(now) {
			self.fail(CommandError::FrameTimeout);
		}
	}

	fn receive_line_byte(&mut self, byte: u8) {
		match self.reassembler.feed(byte) {
			LineEvent::Stored(byte) => {
				if self.echo {
					self.outbox.push(byte);
				}
			}
			LineEvent::Reprompt => {
				if !self.stage.has_pending() {
					self.outbox.prompt(self.echo);
				}
			}
			LineEvent::Completed => self.stage_line(),
			LineEvent::Ignored | LineEvent::Dropped => {}
		}
	}

	/// Moves the completed line into the staging slot, or holds it in the
	/// reassembler while the slot is busy.
	fn stage_line(&mut self) {
		if self.stage.has_pending() {
			trace!("link: staging slot busy, holding line");
			self.reassembler.hold();
			return;
		}

		let line = self.reassembler.take();
		if self.stage.submit(line).is_ok() {
			self.outbox.receipt();
		}
	}

	fn receive_frame_byte(&mut self, byte: u8) {
		let count = self.config.count;
		if self.frame.feed(byte, &mut self.pixels[..count]) == FrameStatus::Completed {
			self.outbox.prompt(self.echo);
		}
	}

	pub(crate) fn fail(&mut self, error: CommandError) {
		warn!("command failed: {}", error);
		self.last_error = Some(error);
		self.outbox.error(self.echo, &error);
	}

	pub fn outbox(&mut self) -> &mut Outbox {
		&mut self.outbox
	}

	pub fn config(&self) -> StripConfig {
		self.config
	}

	/// The visible part of the pixel array.
	pub fn pixels(&self) -> &[RGB8] {
		&self.pixels[..self.config.count]
	}

	pub fn echo(&self) -> bool {
		self.echo
	}

	pub fn last_error(&self) -> Option<CommandError> {
		self.last_error
	}

	pub fn is_receiving_frame(&self) -> bool {
		self.frame.is_active()
	}

	pub fn has_pending_command(&self) -> bool {
		self.stage.has_pending()
	}

	pub fn is_strip_initialized(&self) -> bool {
		self.initialized
	}

	pub fn strip_mut(&mut self) -> &mut S {
		&mut self.strip
	}

	pub fn status_led(&self) -> &L {
		&self.status
	}
}
