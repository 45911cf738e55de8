use std::fmt::Write;

use led_controller_shared::{color, ChannelOrder, ERROR_MARKER, LINE_TERMINATOR, RECEIPT_MARKER, RGB8};

use crate::{Error, Result};

/// A command line the host can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
	Configure { leds: usize, order: ChannelOrder },
	Describe,
	MaxLeds,
	SetPixel { index: usize, color: RGB8 },
	GetPixel(usize),
	Fill(RGB8),
	SendAll,
	Show(Option<RGB8>),
	Brightness(Option<u8>),
	Echo(bool),
	LastError,
	Version,
}

impl Request {
	/// The line as it goes on the wire, terminator included.
	pub fn to_line(&self) -> String {
		let mut line = String::new();
		let _ = match *self {
			Request::Configure { leds, order } => write!(line, "C {},{}", leds, order.as_str()),
			Request::Describe => write!(line, "D"),
			Request::MaxLeds => write!(line, "M"),
			Request::SetPixel { index, color } => write!(line, "P {} {}", index, color_token(color)),
			Request::GetPixel(index) => write!(line, "R {}", index),
			Request::Fill(color) => write!(line, "F {}", color_token(color)),
			Request::SendAll => write!(line, "A"),
			Request::Show(None) => write!(line, "S"),
			Request::Show(Some(color)) => write!(line, "S {}", color_token(color)),
			Request::Brightness(None) => write!(line, "B"),
			Request::Brightness(Some(level)) => write!(line, "B {}", level),
			Request::Echo(on) => write!(line, "E {}", u8::from(on)),
			Request::LastError => write!(line, "L"),
			Request::Version => write!(line, "V"),
		};
		line.push(char::from(LINE_TERMINATOR));
		line
	}
}

/// Six digit hex token, always accepted by the device, black included.
pub fn color_token(color: RGB8) -> String {
	format!("{:06X}", color::to_u32(color))
}

/// Outcome of one request, read up to (not including) the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	Value(String),
	Failed,
}

/// Parses `.` + payload, where a payload of `E` marks a failed command.
pub fn parse_reply(raw: &[u8]) -> Result<Reply> {
	let Some((&first, payload)) = raw.split_first() else {
		return Err(Error::UnexpectedResponse {
			expected: ".".to_string(),
			received: String::new(),
		});
	};

	if first != RECEIPT_MARKER {
		return Err(Error::UnexpectedResponse {
			expected: ".".to_string(),
			received: String::from_utf8_lossy(raw).to_string(),
		});
	}

	if payload == [ERROR_MARKER] {
		return Ok(Reply::Failed);
	}

	Ok(Reply::Value(String::from_utf8_lossy(payload).to_string()))
}

/// Device configuration as reported by `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Description {
	pub leds: usize,
	pub order: ChannelOrder,
	pub pin: u8,
	pub brightness: u8,
}

pub fn parse_description(text: &str) -> Result<Description> {
	let invalid = || Error::UnexpectedResponse {
		expected: "NumLEDs=.. ClrOrder=.. LEDPin=.. Bright=..".to_string(),
		received: text.to_string(),
	};

	let mut leds = None;
	let mut order = None;
	let mut pin = None;
	let mut brightness = None;

	for field in text.split_whitespace() {
		let (key, value) = field.split_once('=').ok_or_else(invalid)?;
		match key {
			"NumLEDs" => leds = value.parse().ok(),
			"ClrOrder" => order = Some(ChannelOrder::parse(value)),
			"LEDPin" => pin = value.parse().ok(),
			"Bright" => brightness = value.parse().ok(),
			_ => return Err(invalid()),
		}
	}

	Ok(Description {
		leds: leds.ok_or_else(invalid)?,
		order: order.ok_or_else(invalid)?,
		pin: pin.ok_or_else(invalid)?,
		brightness: brightness.ok_or_else(invalid)?,
	})
}

pub fn parse_color_reply(text: &str) -> Result<RGB8> {
	u32::from_str_radix(text, 16)
		.ok()
		.filter(|_| text.len() == 6)
		.map(color::from_u32)
		.ok_or_else(|| Error::UnexpectedResponse {
			expected: "RRGGBB".to_string(),
			received: text.to_string(),
		})
}

pub fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T> {
	text.parse().map_err(|_| Error::UnexpectedResponse {
		expected: "a number".to_string(),
		received: text.to_string(),
	})
}

/// Flattens pixels into the raw payload that follows `A`.
pub fn frame_payload(pixels: &[RGB8]) -> Vec<u8> {
	pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect()
}
