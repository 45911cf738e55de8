use core::fmt::Write;

use crate::{
	color::{parse_color, ChannelOrder, RGB8},
	command::{parse_int, second_param, Command},
	engine::Engine,
	hal::{StatusLed, Strip},
	Millis,
	MAX_LEDS,
	VERSION_STR,
};

/// Everything a command can fail with. The `Display` text is what `L` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
	#[error("LED count value out of range")]
	CountOutOfRange,
	#[error("LED index value out of range")]
	IndexOutOfRange,
	#[error("Invalid pixel color value")]
	InvalidPixelColor,
	#[error("Pixel color param not found")]
	MissingPixelColor,
	#[error("Invalid fill color value")]
	InvalidFillColor,
	#[error("Fill color param not found")]
	MissingFillColor,
	#[error("Invalid parameter")]
	InvalidParameter,
	#[error("Unrecognized command")]
	Unrecognized,
	#[error("Timeout during receive of array data")]
	FrameTimeout,
}

impl<S: Strip, L: StatusLed> Engine<S, L> {
	/// Executes one command line. Every command validates its parameters
	/// before touching any state, so a failed command leaves nothing behind.
	pub(crate) fn dispatch(&mut self, line: &[u8], now: Millis) {
		let text = match core::str::from_utf8(line) {
			Ok(text) => text,
			// only the valid prefix is used, everything past it counts as missing
			Err(e) => core::str::from_utf8(&line[..e.valid_up_to()]).unwrap_or_default(),
		};

		let command = Command::parse(text);
		debug!("dispatch: {}", text);

		let result = match command {
			Command::Configure(params) => self.configure(params),
			Command::Describe => {
				self.describe();
				Ok(())
			}
			Command::MaxLeds => {
				self.outbox.begin_value(self.echo);
				let _ = write!(self.outbox, "{}", MAX_LEDS);
				Ok(())
			}
			Command::SetPixel(params) => self.set_pixel(params),
			Command::GetPixel(params) => self.get_pixel(params),
			Command::Fill(params) => self.fill(params),
			Command::SendAll => {
				info!("dispatch: receiving {} pixels", self.config.count);
				self.frame.enter(now);
				Ok(())
			}
			Command::Show(params) => self.show(params),
			Command::Brightness(params) => {
				self.brightness(params);
				Ok(())
			}
			Command::Echo(params) => self.echo_mode(params),
			Command::LastError => {
				self.outbox.begin_value(self.echo);
				if let Some(error) = self.last_error {
					let _ = write!(self.outbox, "{}", error);
				}
				Ok(())
			}
			Command::Version => {
				self.outbox.begin_value(self.echo);
				self.outbox.push_slice(VERSION_STR.as_bytes());
				Ok(())
			}
			Command::Unrecognized(_) => Err(CommandError::Unrecognized),
		};

		if let Err(error) = result {
			self.fail(error);
		}
	}

	fn configure(&mut self, params: &str) -> Result<(), CommandError> {
		if params.is_empty() {
			return Ok(());
		}

		let count = parse_int(params);
		if count <= 0 || count as usize > MAX_LEDS {
			return Err(CommandError::CountOutOfRange);
		}

		self.config.count = count as usize;
		if let Some(order) = second_param(params) {
			self.config.order = ChannelOrder::parse(order);
		}
		self.initialize_strip();
		Ok(())
	}

	fn describe(&mut self) {
		self.outbox.begin_value(self.echo);
		let _ = write!(
			self.outbox,
			"NumLEDs={} ClrOrder={} LEDPin={} Bright={}",
			self.config.count,
			self.config.order.as_str(),
			self.settings.data_pin,
			self.config.brightness,
		);
	}

	fn set_pixel(&mut self, params: &str) -> Result<(), CommandError> {
		if params.is_empty() {
			return Ok(());
		}

		let index = self.pixel_index(params)?;
		let token = second_param(params).ok_or(CommandError::MissingPixelColor)?;
		let color = parse_color(token).ok_or(CommandError::InvalidPixelColor)?;

		self.pixels[index] = color;
		Ok(())
	}

	fn get_pixel(&mut self, params: &str) -> Result<(), CommandError> {
		if params.is_empty() {
			return Ok(());
		}

		let index = self.pixel_index(params)?;
		let RGB8 { r, g, b } = self.pixels[index];

		self.outbox.begin_value(self.echo);
		let _ = write!(self.outbox, "{:02X}{:02X}{:02X}", r, g, b);
		Ok(())
	}

	fn fill(&mut self, params: &str) -> Result<(), CommandError> {
		if params.is_empty() {
			return Err(CommandError::MissingFillColor);
		}

		let color = parse_color(params).ok_or(CommandError::InvalidFillColor)?;
		self.pixels[..self.config.count].fill(color);
		Ok(())
	}

	fn show(&mut self, params: &str) -> Result<(), CommandError> {
		let color = if params.is_empty() {
			None
		} else {
			Some(parse_color(params).ok_or(CommandError::InvalidPixelColor)?)
		};

		if !self.initialized {
			self.initialize_strip();
		}

		match color {
			Some(color) => self.strip.show_color(color),
			None => self.strip.show(&self.pixels[..self.config.count]),
		}
		Ok(())
	}

	fn brightness(&mut self, params: &str) {
		if params.is_empty() {
			self.outbox.begin_value(self.echo);
			let _ = write!(self.outbox, "{}", self.config.brightness);
			return;
		}

		// only the low byte is kept, so 300 wraps to 44
		self.config.brightness = parse_int(params) as u8;
		if self.initialized {
			self.strip.set_brightness(self.config.brightness);
			self.strip.show(&self.pixels[..self.config.count]);
		}
	}

	fn echo_mode(&mut self, params: &str) -> Result<(), CommandError> {
		if params.is_empty() {
			self.outbox.begin_value(self.echo);
			self.outbox.push(if self.echo { b'1' } else { b'0' });
			return Ok(());
		}

		self.echo = if params.starts_with('0') || params.eq_ignore_ascii_case("off") {
			false
		} else if params.starts_with('1') || params.eq_ignore_ascii_case("on") {
			true
		} else {
			return Err(CommandError::InvalidParameter);
		};
		Ok(())
	}

	fn pixel_index(&self, params: &str) -> Result<usize, CommandError> {
		let index = parse_int(params);
		if index < 0 || index as usize >= self.config.count {
			return Err(CommandError::IndexOutOfRange);
		}
		Ok(index as usize)
	}

	pub(crate) fn initialize_strip(&mut self) {
		info!(
			"strip: {} leds, order {}, brightness {}",
			self.config.count,
			self.config.order.as_str(),
			self.config.brightness
		);
		self.strip.configure(self.config.count, self.config.order);
		self.strip.set_brightness(self.config.brightness);
		self.initialized = true;
	}
}
