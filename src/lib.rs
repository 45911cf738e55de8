use std::{
	io,
	io::{Read, Write},
	time::Duration,
};
#[cfg(feature = "timings")]
use std::time::Instant;

use led_controller_shared::{BAUD_RATE, DEVICE_PRODUCT_NAME, PROMPT};
pub use led_controller_shared::{ChannelOrder, MAX_LEDS, RGB8};
use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info};

pub mod protocol;
#[cfg(feature = "tokio")]
pub mod tokio;

use crate::protocol::{
	frame_payload,
	parse_color_reply,
	parse_description,
	parse_number,
	parse_reply,
	Reply,
	Request,
};
pub use crate::protocol::Description;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("serial port error")]
	Serial(#[from] serialport::Error),
	#[error("io error")]
	Io(#[from] io::Error),
	#[error("no serial LED controller found")]
	NotFound,
	#[error("device rejected the command: {0}")]
	Device(String),
	#[error("unexpected response (expected {expected:?}, received {received:?})")]
	UnexpectedResponse { expected: String, received: String },
	#[error("frame has {received} pixels, the strip is configured for {expected}")]
	FrameLength { expected: usize, received: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Time spent on the `A` command and on the pixel payload.
#[cfg(feature = "timings")]
pub type WriteResult = (Duration, Duration);
#[cfg(not(feature = "timings"))]
pub type WriteResult = ();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	pub leds: usize,
	pub order: ChannelOrder,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			leds: led_controller_shared::DEFAULT_LEDS,
			order: ChannelOrder::Grb,
		}
	}
}

pub(crate) const READ_TIMEOUT: Duration = Duration::from_millis(500);
pub(crate) const SYNC_TIMEOUT: Duration = Duration::from_millis(10);

pub struct LedController {
	config: Config,
	port: Box<dyn SerialPort>,

	initialized: bool,
}

impl LedController {
	/// Create a new instance with the given serial device and config.
	pub fn new(serial_device: String, config: Config) -> Result<Self> {
		let builder = serialport::new(&serial_device, BAUD_RATE).timeout(READ_TIMEOUT);
		let port = builder.open()?;

		Ok(Self {
			config,
			port,

			initialized: false,
		})
	}

	/// Finds the first serial device with product name "LED Controller" and opens it.
	///
	/// If more than one device is connected the returned device will be the first the OS lists.
	pub fn find(config: Config) -> Result<Self> {
		let serial_device = serialport::available_ports()?
			.into_iter()
			.find_map(|p| match p.port_type {
				SerialPortType::UsbPort(usb)
					if usb.product.as_deref() == Some(DEVICE_PRODUCT_NAME)
						|| usb.product == Some(DEVICE_PRODUCT_NAME.replace(' ', "_")) =>
				{
					Some(p.port_name)
				}
				_ => None,
			})
			.ok_or(Error::NotFound)?;

		Self::new(serial_device, config)
	}

	/// Brings the device back to an idle prompt with echo off.
	///
	/// Sends CR until a prompt comes back. If nothing answers the device is
	/// probably stuck in a binary frame, so zero bytes are pushed to finish it.
	pub fn sync(&mut self) -> Result<()> {
		let mut buffer = [0u8; 64];
		let mut has_printed = false;
		let mut counter = 0;

		info!("trying to reset device to the prompt");
		self.port.set_timeout(SYNC_TIMEOUT)?;

		loop {
			let read_bytes = match self.port.read(&mut buffer) {
				Ok(n) => n,
				Err(e) if e.kind() == io::ErrorKind::TimedOut => {
					if !has_printed {
						info!("read timeout, writing to force a prompt");
						has_printed = true;
					}

					counter += 1;
					if counter < 8 {
						self.port.write_all(&[b'\r'])?;
					} else {
						self.port.write_all(&[0u8; 32])?;
						self.port.write_all(&[b'\r'])?;
						counter = 0;
					}
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			if buffer[..read_bytes].contains(&PROMPT) {
				break;
			}
		}

		// drain whatever else the device had queued
		while let Ok(n) = self.port.read(&mut buffer) {
			if n == 0 {
				break;
			}
		}
		self.port.set_timeout(READ_TIMEOUT)?;

		self.port.write_all(Request::Echo(false).to_line().as_bytes())?;
		self.read_until_prompt()?;
		info!("reset successful");

		Ok(())
	}

	/// Sets the configuration for the instance.
	pub fn set_config(&mut self, config: Config) -> Result<()> {
		self.config = config;
		self.configure()
	}

	pub fn configure(&mut self) -> Result<()> {
		if !self.initialized {
			self.sync()?;
			self.initialized = true;
		}

		self.request(Request::Configure {
			leds: self.config.leds,
			order: self.config.order,
		})?;
		Ok(())
	}

	pub fn describe(&mut self) -> Result<Description> {
		parse_description(&self.request(Request::Describe)?)
	}

	pub fn max_leds(&mut self) -> Result<usize> {
		parse_number(&self.request(Request::MaxLeds)?)
	}

	pub fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<()> {
		self.request(Request::SetPixel { index, color })?;
		Ok(())
	}

	pub fn get_pixel(&mut self, index: usize) -> Result<RGB8> {
		parse_color_reply(&self.request(Request::GetPixel(index))?)
	}

	pub fn fill(&mut self, color: RGB8) -> Result<()> {
		self.request(Request::Fill(color))?;
		Ok(())
	}

	pub fn show(&mut self) -> Result<()> {
		self.request(Request::Show(None))?;
		Ok(())
	}

	pub fn show_color(&mut self, color: RGB8) -> Result<()> {
		self.request(Request::Show(Some(color)))?;
		Ok(())
	}

	pub fn brightness(&mut self) -> Result<u8> {
		parse_number(&self.request(Request::Brightness(None))?)
	}

	pub fn set_brightness(&mut self, level: u8) -> Result<()> {
		self.request(Request::Brightness(Some(level)))?;
		Ok(())
	}

	pub fn last_error(&mut self) -> Result<String> {
		self.request(Request::LastError)
	}

	pub fn version(&mut self) -> Result<String> {
		self.request(Request::Version)
	}

	/// Loads every pixel in one binary frame and renders it.
	///
	/// The slice must hold exactly the configured number of LEDs.
	pub fn send_leds(&mut self, leds: &[RGB8]) -> Result<WriteResult> {
		if !self.initialized {
			self.configure()?;
		}

		if leds.len() != self.config.leds {
			return Err(Error::FrameLength {
				expected: self.config.leds,
				received: leds.len(),
			});
		}

		#[cfg(feature = "timings")]
		let command_start = Instant::now();

		self.request(Request::SendAll)?;

		#[cfg(feature = "timings")]
		let data_start = Instant::now();

		self.port.write_all(&frame_payload(leds))?;
		let completion = self.read_until_prompt()?;
		if !completion.is_empty() {
			return Err(Error::UnexpectedResponse {
				expected: ">".to_string(),
				received: String::from_utf8_lossy(&completion).to_string(),
			});
		}

		self.show()?;

		#[cfg(feature = "timings")]
		return Ok((data_start - command_start, Instant::now() - data_start));

		#[cfg(not(feature = "timings"))]
		Ok(())
	}

	/// Sends one request and returns its reply payload.
	///
	/// When the device answers with an error marker the message is fetched
	/// with `L` and returned as [`Error::Device`].
	pub fn request(&mut self, request: Request) -> Result<String> {
		let line = request.to_line();
		debug!(line = line.trim_end(), "sending request");

		self.port.write_all(line.as_bytes())?;
		match parse_reply(&self.read_until_prompt()?)? {
			Reply::Value(value) => Ok(value),
			Reply::Failed => {
				let message = self.request(Request::LastError)?;
				Err(Error::Device(message))
			}
		}
	}

	/// Reads up to the next prompt and returns what came before it.
	fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
		let mut received = Vec::new();
		let mut byte = [0u8; 1];

		loop {
			self.port.read_exact(&mut byte)?;
			if byte[0] == PROMPT {
				return Ok(received);
			}
			received.push(byte[0]);
		}
	}
}
