pub use smart_leds::RGB8;

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

const COLOR_MASK: u32 = 0x00FF_FFFF;

/// Single letter color names, matched case-insensitively.
pub const NAMED_COLORS: [(u8, u32); 13] = [
	(b'R', 0xFF0000), // red
	(b'G', 0x008000), // green
	(b'B', 0x0000FF), // blue
	(b'Y', 0xFFFF00), // yellow
	(b'W', 0xFFFFFF), // white
	(b'O', 0xFFA500), // orange
	(b'V', 0xEE82EE), // violet
	(b'P', 0xFFC0CB), // pink
	(b'M', 0xFF00FF), // magenta
	(b'C', 0x00FFFF), // cyan
	(b'T', 0x008080), // teal
	(b'A', 0x808080), // gray
	(b'N', 0xA52A2A), // brown
];

pub fn from_u32(value: u32) -> RGB8 {
	let [_, r, g, b] = (value & COLOR_MASK).to_be_bytes();
	RGB8 { r, g, b }
}

pub fn to_u32(color: RGB8) -> u32 {
	u32::from_be_bytes([0, color.r, color.g, color.b])
}

/// Parses a color token.
///
/// A single character is looked up in [`NAMED_COLORS`], anything longer is
/// read as a hexadecimal `RRGGBB` value (leading hex digits only, bits above
/// 24 dropped). Black is only accepted when the token starts with `0`, every
/// other way of producing black counts as a parse failure.
pub fn parse_color(token: &str) -> Option<RGB8> {
	let color = if token.len() > 1 {
		from_u32(parse_hex_prefix(token))
	} else {
		token
			.bytes()
			.next()
			.and_then(named_color)
			.unwrap_or(BLACK)
	};

	if color == BLACK && !token.starts_with('0') {
		return None;
	}
	Some(color)
}

pub fn named_color(letter: u8) -> Option<RGB8> {
	let letter = letter.to_ascii_uppercase();
	NAMED_COLORS
		.iter()
		.find(|(name, _)| *name == letter)
		.map(|&(_, value)| from_u32(value))
}

fn parse_hex_prefix(token: &str) -> u32 {
	let s = token.trim_start_matches(' ');
	let (negative, s) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};
	let s = s
		.strip_prefix("0x")
		.or_else(|| s.strip_prefix("0X"))
		.unwrap_or(s);

	let mut value = 0u32;
	for digit in s.chars().map_while(|c| c.to_digit(16)) {
		value = ((value << 4) | digit) & COLOR_MASK;
	}

	if negative {
		value.wrapping_neg() & COLOR_MASK
	} else {
		value
	}
}

/// Order in which the stored red, green and blue bytes go out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelOrder {
	Rgb,
	Rbg,
	#[default]
	Grb,
	Gbr,
	Brg,
	Bgr,
}

impl ChannelOrder {
	pub const ALL: [ChannelOrder; 6] = [
		ChannelOrder::Rgb,
		ChannelOrder::Rbg,
		ChannelOrder::Grb,
		ChannelOrder::Gbr,
		ChannelOrder::Brg,
		ChannelOrder::Bgr,
	];

	/// Case-insensitive lookup, unknown names fall back to the default order.
	pub fn parse(name: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|order| order.as_str().eq_ignore_ascii_case(name))
			.unwrap_or_default()
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ChannelOrder::Rgb => "RGB",
			ChannelOrder::Rbg => "RBG",
			ChannelOrder::Grb => "GRB",
			ChannelOrder::Gbr => "GBR",
			ChannelOrder::Brg => "BRG",
			ChannelOrder::Bgr => "BGR",
		}
	}

	/// Reorders a color into the byte sequence the strip expects.
	pub fn apply(self, color: RGB8) -> [u8; 3] {
		let RGB8 { r, g, b } = color;
		match self {
			ChannelOrder::Rgb => [r, g, b],
			ChannelOrder::Rbg => [r, b, g],
			ChannelOrder::Grb => [g, r, b],
			ChannelOrder::Gbr => [g, b, r],
			ChannelOrder::Brg => [b, r, g],
			ChannelOrder::Bgr => [b, g, r],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn named_colors_are_case_insensitive() {
		assert_eq!(parse_color("R"), Some(RGB8::new(0xFF, 0, 0)));
		assert_eq!(parse_color("r"), Some(RGB8::new(0xFF, 0, 0)));
		assert_eq!(parse_color("g"), Some(RGB8::new(0, 0x80, 0)));
		assert_eq!(parse_color("N"), Some(RGB8::new(0xA5, 0x2A, 0x2A)));
	}

	#[test]
	fn unknown_letter_is_rejected() {
		assert_eq!(parse_color("X"), None);
		assert_eq!(parse_color("5"), None);
	}

	#[test]
	fn hex_tokens() {
		assert_eq!(parse_color("00FF00"), Some(RGB8::new(0, 0xFF, 0)));
		assert_eq!(parse_color("abc"), Some(RGB8::new(0, 0x0A, 0xBC)));
		assert_eq!(parse_color("0x123456"), Some(RGB8::new(0x12, 0x34, 0x56)));
		// bits above 24 are dropped
		assert_eq!(parse_color("AB123456"), Some(RGB8::new(0x12, 0x34, 0x56)));
		// parsing stops at the first non hex digit
		assert_eq!(parse_color("FFzz"), Some(RGB8::new(0, 0, 0xFF)));
	}

	#[test]
	fn black_only_from_literal_zero() {
		assert_eq!(parse_color("0"), Some(BLACK));
		assert_eq!(parse_color("000000"), Some(BLACK));
		assert_eq!(parse_color("zz"), None);
		assert_eq!(parse_color("1000000"), None);
		assert_eq!(parse_color(""), None);
	}

	#[test]
	fn channel_order_lookup() {
		assert_eq!(ChannelOrder::parse("rgb"), ChannelOrder::Rgb);
		assert_eq!(ChannelOrder::parse("BGR"), ChannelOrder::Bgr);
		assert_eq!(ChannelOrder::parse("XYZ"), ChannelOrder::Grb);
		for order in ChannelOrder::ALL {
			assert_eq!(ChannelOrder::parse(order.as_str()), order);
		}
	}

	#[test]
	fn channel_order_reorders_bytes() {
		let color = RGB8::new(1, 2, 3);
		assert_eq!(ChannelOrder::Grb.apply(color), [2, 1, 3]);
		assert_eq!(ChannelOrder::Brg.apply(color), [3, 1, 2]);
		assert_eq!(ChannelOrder::Rgb.apply(color), [1, 2, 3]);
	}

	#[test]
	fn u32_conversion() {
		assert_eq!(to_u32(from_u32(0x12_34_56)), 0x12_34_56);
		assert_eq!(from_u32(0xFF_00_00_01), RGB8::new(0, 0, 1));
	}
}
