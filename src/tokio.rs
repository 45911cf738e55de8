#[cfg(feature = "timings")]
use std::time::Instant;
use std::io;

use led_controller_shared::{BAUD_RATE, DEVICE_PRODUCT_NAME, PROMPT};
use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	time::timeout,
};
use tokio_serial::{SerialPortBuilderExt, SerialPortType, SerialStream};
use tracing::{debug, info};

use crate::{
	protocol::{
		frame_payload,
		parse_color_reply,
		parse_description,
		parse_number,
		parse_reply,
		Reply,
		Request,
	},
	Config,
	Description,
	Error,
	Result,
	WriteResult,
	READ_TIMEOUT,
	RGB8,
	SYNC_TIMEOUT,
};

pub struct LedController {
	config: Config,
	port: SerialStream,

	initialized: bool,
}

impl LedController {
	/// Create a new instance with the given serial device and config.
	pub fn new(serial_device: String, config: Config) -> Result<Self> {
		let builder = tokio_serial::new(serial_device, BAUD_RATE).timeout(READ_TIMEOUT);
		let port = builder.open_native_async()?;

		Ok(Self {
			config,
			port,

			initialized: false,
		})
	}

	/// Finds the first available serial device with product name "LED Controller" and creates a new instance of this controller struct from it.
	///
	/// If more than one device is connected the returned device will be the first the OS lists.
	pub fn find(config: Config) -> Result<Option<Self>> {
		let ports = tokio_serial::available_ports()?;
		let mut serial_device = None;

		for p in ports {
			if let SerialPortType::UsbPort(usb) = p.port_type {
				if usb.product == Some(DEVICE_PRODUCT_NAME.to_string())
					|| usb.product == Some(DEVICE_PRODUCT_NAME.replace(' ', "_"))
				{
					serial_device = Some(p.port_name);
					break;
				}
			}
		}

		let Some(serial_device) = serial_device else {
			return Ok(None);
		};

		Ok(Some(Self::new(serial_device, config)?))
	}

	/// Brings the device back to an idle prompt with echo off.
	pub async fn sync(&mut self) -> Result<()> {
		let mut buffer = [0u8; 64];
		let mut has_printed = false;
		let mut counter = 0;

		info!("trying to reset device to the prompt");

		loop {
			let read_bytes = match timeout(SYNC_TIMEOUT, self.port.read(&mut buffer)).await {
				Ok(res) => res?,
				Err(_) => {
					if !has_printed {
						info!("read timeout, writing to force a prompt");
						has_printed = true;
					}

					counter += 1;
					if counter < 8 {
						self.port.write_all(&[b'\r']).await?;
					} else {
						self.port.write_all(&[0u8; 32]).await?;
						self.port.write_all(&[b'\r']).await?;
						counter = 0;
					}
					continue;
				}
			};

			if buffer[..read_bytes].contains(&PROMPT) {
				break;
			}
		}

		// drain whatever else the device had queued
		while let Ok(Ok(n)) = timeout(SYNC_TIMEOUT, self.port.read(&mut buffer)).await {
			if n == 0 {
				break;
			}
		}

		self.port.write_all(Request::Echo(false).to_line().as_bytes()).await?;
		self.read_until_prompt().await?;
		info!("reset successful");

		Ok(())
	}

	/// Sets the configuration for the instance.
	pub async fn set_config(&mut self, config: Config) -> Result<()> {
		self.config = config;
		self.configure().await
	}

	pub async fn configure(&mut self) -> Result<()> {
		if !self.initialized {
			self.sync().await?;
			self.initialized = true;
		}

		self.request(Request::Configure {
			leds: self.config.leds,
			order: self.config.order,
		})
		.await?;
		Ok(())
	}

	pub async fn describe(&mut self) -> Result<Description> {
		parse_description(&self.request(Request::Describe).await?)
	}

	pub async fn max_leds(&mut self) -> Result<usize> {
		parse_number(&self.request(Request::MaxLeds).await?)
	}

	pub async fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<()> {
		self.request(Request::SetPixel { index, color }).await?;
		Ok(())
	}

	pub async fn get_pixel(&mut self, index: usize) -> Result<RGB8> {
		parse_color_reply(&self.request(Request::GetPixel(index)).await?)
	}

	pub async fn fill(&mut self, color: RGB8) -> Result<()> {
		self.request(Request::Fill(color)).await?;
		Ok(())
	}

	pub async fn show(&mut self) -> Result<()> {
		self.request(Request::Show(None)).await?;
		Ok(())
	}

	pub async fn show_color(&mut self, color: RGB8) -> Result<()> {
		self.request(Request::Show(Some(color))).await?;
		Ok(())
	}

	pub async fn brightness(&mut self) -> Result<u8> {
		parse_number(&self.request(Request::Brightness(None)).await?)
	}

	pub async fn set_brightness(&mut self, level: u8) -> Result<()> {
		self.request(Request::Brightness(Some(level))).await?;
		Ok(())
	}

	pub async fn last_error(&mut self) -> Result<String> {
		self.request(Request::LastError).await
	}

	pub async fn version(&mut self) -> Result<String> {
		self.request(Request::Version).await
	}

	/// Send all pixels in one binary frame and render them, the length must be the configured amount of leds.
	pub async fn send_leds(&mut self, leds: &[RGB8]) -> Result<WriteResult> {
		if !self.initialized {
			self.configure().await?;
		}

		if leds.len() != self.config.leds {
			return Err(Error::FrameLength {
				expected: self.config.leds,
				received: leds.len(),
			});
		}

		#[cfg(feature = "timings")]
		let command_start = Instant::now();

		self.request(Request::SendAll).await?;

		#[cfg(feature = "timings")]
		let data_start = Instant::now();

		self.port.write_all(&frame_payload(leds)).await?;
		let completion = self.read_until_prompt().await?;
		if !completion.is_empty() {
			return Err(Error::UnexpectedResponse {
				expected: ">".to_string(),
				received: String::from_utf8_lossy(&completion).to_string(),
			});
		}

		self.show().await?;

		#[cfg(feature = "timings")]
		return Ok((data_start - command_start, Instant::now() - data_start));

		#[cfg(not(feature = "timings"))]
		Ok(())
	}

	/// Sends one request and returns its reply payload, see [`crate::LedController::request`].
	pub async fn request(&mut self, request: Request) -> Result<String> {
		let line = request.to_line();
		debug!(line = line.trim_end(), "sending request");

		self.port.write_all(line.as_bytes()).await?;
		match parse_reply(&self.read_until_prompt().await?)? {
			Reply::Value(value) => Ok(value),
			Reply::Failed => {
				self.port.write_all(Request::LastError.to_line().as_bytes()).await?;
				let message = match parse_reply(&self.read_until_prompt().await?)? {
					Reply::Value(message) => message,
					Reply::Failed => String::new(),
				};
				Err(Error::Device(message))
			}
		}
	}

	async fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
		let mut received = Vec::new();

		loop {
			let byte = timeout(READ_TIMEOUT, self.port.read_u8())
				.await
				.map_err(|_| io::Error::from(io::ErrorKind::TimedOut))??;
			if byte == PROMPT {
				return Ok(received);
			}
			received.push(byte);
		}
	}
}
