/// A parsed command line, borrowing its parameter text from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
	/// `C NUMLEDS [CLRORDER]`
	Configure(&'a str),
	/// `D`
	Describe,
	/// `M`
	MaxLeds,
	/// `P LEDIDX COLOR`
	SetPixel(&'a str),
	/// `R LEDIDX`
	GetPixel(&'a str),
	/// `F COLOR`
	Fill(&'a str),
	/// `A`, switches the link into binary frame mode
	SendAll,
	/// `S [COLOR]`
	Show(&'a str),
	/// `B [LEVEL]`
	Brightness(&'a str),
	/// `E 0 | 1 | off | on`
	Echo(&'a str),
	/// `L`
	LastError,
	/// `V`
	Version,
	Unrecognized(u8),
}

impl<'a> Command<'a> {
	/// Splits a line into its code letter and parameter string.
	///
	/// The code is the first non-space character, case-folded. Spaces between
	/// the code and the parameters are skipped.
	pub fn parse(line: &'a str) -> Self {
		let line = line.trim_start_matches(' ');
		let Some(code) = line.bytes().next() else {
			return Command::Unrecognized(0);
		};
		// the code is checked to be ascii below, so slicing after it is on a char boundary
		let params = if code.is_ascii() {
			line[1..].trim_start_matches(' ')
		} else {
			""
		};

		match code.to_ascii_uppercase() {
			b'C' => Command::Configure(params),
			b'D' => Command::Describe,
			b'M' => Command::MaxLeds,
			b'P' => Command::SetPixel(params),
			b'R' => Command::GetPixel(params),
			b'F' => Command::Fill(params),
			b'A' => Command::SendAll,
			b'S' => Command::Show(params),
			b'B' => Command::Brightness(params),
			b'E' => Command::Echo(params),
			b'L' => Command::LastError,
			b'V' => Command::Version,
			other => Command::Unrecognized(other),
		}
	}
}

/// Reads a leading decimal integer the way C `atoi` does.
///
/// Leading spaces and a sign are allowed, parsing stops at the first
/// non-digit and an input without digits yields 0.
pub fn parse_int(text: &str) -> i32 {
	let text = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
	let (negative, digits) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};

	let mut value: i32 = 0;
	for digit in digits.bytes().take_while(u8::is_ascii_digit) {
		value = value.saturating_mul(10).saturating_add(i32::from(digit - b'0'));
	}

	if negative {
		-value
	} else {
		value
	}
}

/// Returns the text after the first parameter and its separator.
///
/// The first parameter ends at a space or comma, and any run of spaces and
/// commas after it is skipped. `None` when there is nothing left.
pub fn second_param(params: &str) -> Option<&str> {
	let is_separator = |c: char| c == ' ' || c == ',';
	let end = params.find(is_separator)?;
	let rest = params[end..].trim_start_matches(is_separator);
	(!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_codes_case_insensitively() {
		assert_eq!(Command::parse("d"), Command::Describe);
		assert_eq!(Command::parse("D"), Command::Describe);
		assert_eq!(Command::parse("  v"), Command::Version);
		assert_eq!(Command::parse("a"), Command::SendAll);
		assert_eq!(Command::parse("x 1"), Command::Unrecognized(b'X'));
	}

	#[test]
	fn skips_spaces_before_params() {
		assert_eq!(Command::parse("C   4,RGB"), Command::Configure("4,RGB"));
		assert_eq!(Command::parse("p0 R"), Command::SetPixel("0 R"));
		assert_eq!(Command::parse("S"), Command::Show(""));
	}

	#[test]
	fn empty_line_is_unrecognized() {
		assert_eq!(Command::parse(""), Command::Unrecognized(0));
		assert_eq!(Command::parse("   "), Command::Unrecognized(0));
	}

	#[test]
	fn int_parsing_follows_atoi() {
		assert_eq!(parse_int("42"), 42);
		assert_eq!(parse_int("  7 R"), 7);
		assert_eq!(parse_int("-3"), -3);
		assert_eq!(parse_int("+5"), 5);
		assert_eq!(parse_int("12,GRB"), 12);
		assert_eq!(parse_int("abc"), 0);
		assert_eq!(parse_int(""), 0);
		assert_eq!(parse_int("99999999999"), i32::MAX);
	}

	#[test]
	fn second_param_split() {
		assert_eq!(second_param("4,RGB"), Some("RGB"));
		assert_eq!(second_param("4 , BGR"), Some("BGR"));
		assert_eq!(second_param("0 FF00FF"), Some("FF00FF"));
		assert_eq!(second_param("4"), None);
		assert_eq!(second_param("4,  "), None);
	}
}
