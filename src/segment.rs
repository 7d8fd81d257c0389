use tracing::debug;

use crate::bits::BitBuffer;
use crate::charset::Charset;
use crate::error::{HxError, HxResult};

/// Largest run a single byte-mode segment can announce in its 13-bit count field.
pub const MAX_BYTE_COUNT: usize = (1 << 13) - 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum HxMode {
	Numeric,
	Text,
	Byte,
	Region1,
	Region2,
	DoubleByte,
	FourByte,
	Eci,
}

/// One run of input encoded in a single mode.
///
/// Segments only come out of the `make_*` constructors, so the packed bits always match
/// the source bytes:
///
/// ```compile_fail
/// use fast_hanxin::{HxMode, HxSegment};
/// let seg = HxSegment::new(HxMode::Numeric, 1, b"7".to_vec(), vec![true; 3]);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HxSegment {
	mode: HxMode,
	numchars: usize,
	source: Vec<u8>,
	data: Vec<bool>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CharClass {
	Digit,
	Text,
	Region1,
	Region2,
	DoubleByte,
	FourByte,
	Other,
}

#[derive(Clone, Copy, Debug)]
struct Unit {
	start: usize,
	len: usize,
	class: CharClass,
}

#[derive(Clone, Copy, Debug)]
struct Run {
	mode: HxMode,
	first: usize,
	end: usize,
}

impl HxMode {
	pub(crate) fn mode_bits(self) -> u32 {
		use HxMode::*;
		match self {
			Numeric    => 0x1,
			Text       => 0x2,
			Byte       => 0x3,
			Region1    => 0x4,
			Region2    => 0x5,
			DoubleByte => 0x6,
			FourByte   => 0x7,
			Eci        => 0x8,
		}
	}

	fn natural(class: CharClass) -> Self {
		match class {
			CharClass::Digit      => HxMode::Numeric,
			CharClass::Text       => HxMode::Text,
			CharClass::Region1    => HxMode::Region1,
			CharClass::Region2    => HxMode::Region2,
			CharClass::DoubleByte => HxMode::DoubleByte,
			CharClass::FourByte   => HxMode::FourByte,
			CharClass::Other      => HxMode::Byte,
		}
	}

	fn can_encode(self, class: CharClass) -> bool {
		use CharClass as C;
		match self {
			HxMode::Numeric    => class == C::Digit,
			HxMode::Text       => matches!(class, C::Digit | C::Text),
			HxMode::Byte       => true,
			HxMode::Region1    => class == C::Region1,
			HxMode::Region2    => class == C::Region2,
			HxMode::DoubleByte => matches!(class, C::Region1 | C::Region2 | C::DoubleByte),
			HxMode::FourByte   => class == C::FourByte,
			HxMode::Eci        => false,
		}
	}

	/// Bits needed to encode `units` as one segment of this mode, indicator and terminator included.
	fn cost(self, units: &[Unit], data: &[u8]) -> usize {
		let n: usize = units.len();
		match self {
			HxMode::Numeric => 4 + 10 * ((n + 2) / 3) + 10,
			HxMode::Text => {
				let mut submode: u8 = 1;
				let mut bits: usize = 4 + 6;
				for u in units {
					let s: u8 = text_submode(data[u.start]);
					if s != submode {
						bits += 6;
						submode = s;
					}
					bits += 6;
				}
				bits
			}
			HxMode::Byte => {
				let bytes: usize = units.iter().map(|u| u.len).sum();
				let pieces: usize = std::cmp::max(1, (bytes + MAX_BYTE_COUNT - 1) / MAX_BYTE_COUNT);
				pieces * (4 + 13) + 8 * bytes
			}
			HxMode::Region1 | HxMode::Region2 => 4 + 12 * n + 12,
			HxMode::DoubleByte => 4 + 15 * n + 15,
			HxMode::FourByte => 25 * n,
			HxMode::Eci => 0,
		}
	}
}

impl HxSegment {
	pub fn make_bytes(data: &[u8]) -> Self {
		assert!(data.len() <= MAX_BYTE_COUNT, "Byte segment too long");
		let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
		for &b in data {
			bb.append_bits(u32::from(b), 8);
		}
		HxSegment::new(HxMode::Byte, data.len(), data.to_vec(), bb.0)
	}

	/// Three digits per 10-bit group; a shorter final group is still 10 bits wide,
	/// its length is carried by the terminator.
	pub fn make_numeric(digits: &[u8]) -> Self {
		assert!(!digits.is_empty() && HxSegment::is_numeric(digits), "Data contains non-numeric characters");
		let mut bb = BitBuffer(Vec::with_capacity((digits.len() + 2) / 3 * 10));
		for group in digits.chunks(3) {
			let value: u32 = group.iter().fold(0, |acc, &b| acc * 10 + u32::from(b - b'0'));
			bb.append_bits(value, 10);
		}
		HxSegment::new(HxMode::Numeric, digits.len(), digits.to_vec(), bb.0)
	}

	pub fn make_text(text: &[u8]) -> Self {
		assert!(HxSegment::is_text(text), "Data contains characters not encodable in text mode");
		let mut bb = BitBuffer(Vec::with_capacity(text.len() * 6));
		let mut submode: u8 = 1;
		for &b in text {
			let s: u8 = text_submode(b);
			if s != submode {
				bb.append_bits(TEXT_SUBMODE_SWITCH, 6);
				submode = s;
			}
			bb.append_bits(text_value(b, submode), 6);
		}
		HxSegment::new(HxMode::Text, text.len(), text.to_vec(), bb.0)
	}

	pub fn make_region1(text: &[u8]) -> Self {
		HxSegment::make_double_width(HxMode::Region1, text, 12, |b1, b2| {
			let pair: u16 = u16::from(b1) << 8 | u16::from(b2);
			if (0xA8A1 ..= 0xA8C0).contains(&pair) {
				u32::from(b2 - 0xA1) + 0xFCA
			} else if (0xA1 ..= 0xA3).contains(&b1) {
				0x5E * u32::from(b1 - 0xA1) + u32::from(b2 - 0xA1) + 0xEB0
			} else {
				0x5E * u32::from(b1 - 0xB0) + u32::from(b2 - 0xA1)
			}
		})
	}

	pub fn make_region2(text: &[u8]) -> Self {
		HxSegment::make_double_width(HxMode::Region2, text, 12, |b1, b2| {
			0x5E * u32::from(b1 - 0xD8) + u32::from(b2 - 0xA1)
		})
	}

	pub fn make_double_byte(text: &[u8]) -> Self {
		HxSegment::make_double_width(HxMode::DoubleByte, text, 15, |b1, b2| {
			let col: u32 = if b2 <= 0x7E { u32::from(b2 - 0x40) } else { u32::from(b2 - 0x41) };
			0xBE * u32::from(b1 - 0x81) + col
		})
	}

	fn make_double_width(mode: HxMode, text: &[u8], width: u8, glyph: impl Fn(u8, u8) -> u32) -> Self {
		assert!(!text.is_empty() && text.len() % 2 == 0, "Data is not a sequence of byte pairs");
		let mut bb = BitBuffer(Vec::with_capacity(text.len() / 2 * usize::from(width)));
		for pair in text.chunks(2) {
			let class: CharClass = classify_pair(pair[0], pair[1]);
			assert!(mode.can_encode(class), "Byte pair {:02X}{:02X} not encodable in {:?} mode", pair[0], pair[1], mode);
			bb.append_bits(glyph(pair[0], pair[1]), width);
		}
		HxSegment::new(mode, text.len() / 2, text.to_vec(), bb.0)
	}

	/// GB18030 four-byte characters. Every character carries its own mode indicator;
	/// the first one is written by the bitstream encoder, the rest are part of the payload.
	pub fn make_four_byte(text: &[u8]) -> Self {
		assert!(!text.is_empty() && text.len() % 4 == 0, "Data is not a sequence of four-byte characters");
		let mut bb = BitBuffer(Vec::with_capacity(text.len() / 4 * 25));
		for (i, q) in text.chunks(4).enumerate() {
			assert!(is_four_byte(q), "Bytes are not a GB18030 four-byte character");
			if i > 0 {
				bb.append_bits(HxMode::FourByte.mode_bits(), 4);
			}
			let value: u32 = 0x3138 * u32::from(q[0] - 0x81)
				+ 0x04EC * u32::from(q[1] - 0x30)
				+ 0x0A * u32::from(q[2] - 0x81)
				+ u32::from(q[3] - 0x30);
			bb.append_bits(value, 21);
		}
		HxSegment::new(HxMode::FourByte, text.len() / 4, text.to_vec(), bb.0)
	}

	pub fn make_eci(assignval: u32) -> HxResult<Self> {
		let mut bb = BitBuffer(Vec::with_capacity(24));
		if assignval < (1 << 7) {
			bb.append_bits(assignval, 8);
		} else if assignval < (1 << 14) {
			bb.append_bits(0b10, 2);
			bb.append_bits(assignval, 14);
		} else if assignval < 1_000_000 {
			bb.append_bits(0b110, 3);
			bb.append_bits(assignval, 21);
		} else {
			return Err(HxError::UnsupportedEci(assignval));
		}
		Ok(HxSegment::new(HxMode::Eci, 0, Vec::new(), bb.0))
	}

	/// Splits `data` into segments, greedily: every run of characters sharing a cheapest mode
	/// is either folded into the previous segment (when that costs no more bits than opening
	/// a new segment) or starts a segment of its own.
	pub fn make_segments(data: &[u8], charset: &Charset) -> HxResult<Vec<Self>> {
		if data.is_empty() {
			return Err(HxError::InputEmpty);
		}
		let units: Vec<Unit> = split_units(data, charset.supports_chinese_modes());

		let mut runs: Vec<Run> = Vec::new();
		let mut i: usize = 0;
		while i < units.len() {
			let mode: HxMode = HxMode::natural(units[i].class);
			let mut end: usize = i + 1;
			while end < units.len() && HxMode::natural(units[end].class) == mode {
				end += 1;
			}
			let run = Run { mode, first: i, end };
			i = end;

			if let Some(prev) = runs.last_mut() {
				let prevunits: &[Unit] = &units[prev.first .. prev.end];
				let newunits: &[Unit] = &units[run.first .. run.end];
				let joined: &[Unit] = &units[prev.first .. run.end];
				let alone: usize = run.mode.cost(newunits, data);
				if newunits.iter().all(|u| prev.mode.can_encode(u.class)) {
					let absorbed: usize = prev.mode.cost(joined, data) - prev.mode.cost(prevunits, data);
					if absorbed <= alone {
						prev.end = run.end;
						continue;
					}
				}
				if prevunits.iter().all(|u| run.mode.can_encode(u.class))
						&& run.mode.cost(joined, data) < prev.mode.cost(prevunits, data) + alone {
					prev.mode = run.mode;
					prev.end = run.end;
					continue;
				}
			}
			runs.push(run);
		}

		let mut result: Vec<Self> = Vec::with_capacity(runs.len() + 1);
		if charset.needs_eci_header() {
			result.push(HxSegment::make_eci(charset.eci())?);
		}
		for run in &runs {
			let start: usize = units[run.first].start;
			let last: &Unit = &units[run.end - 1];
			let bytes: &[u8] = &data[start .. last.start + last.len];
			match run.mode {
				HxMode::Numeric    => result.push(HxSegment::make_numeric(bytes)),
				HxMode::Text       => result.push(HxSegment::make_text(bytes)),
				HxMode::Byte       => result.extend(bytes.chunks(MAX_BYTE_COUNT).map(HxSegment::make_bytes)),
				HxMode::Region1    => result.push(HxSegment::make_region1(bytes)),
				HxMode::Region2    => result.push(HxSegment::make_region2(bytes)),
				HxMode::DoubleByte => result.push(HxSegment::make_double_byte(bytes)),
				HxMode::FourByte   => result.push(HxSegment::make_four_byte(bytes)),
				HxMode::Eci        => unreachable!(),
			}
		}
		debug!(bytes = data.len(), segments = result.len(), eci = charset.eci(), "segmented input");
		Ok(result)
	}

	pub(crate) fn new(mode: HxMode, numchars: usize, source: Vec<u8>, data: Vec<bool>) -> Self {
		Self { mode, numchars, source, data }
	}

	pub fn mode(&self) -> HxMode {
		self.mode
	}

	pub fn num_chars(&self) -> usize {
		self.numchars
	}

	/// Input bytes covered by this segment (empty for ECI).
	pub fn source(&self) -> &[u8] {
		&self.source
	}

	pub fn data(&self) -> &Vec<bool> {
		&self.data
	}

	/// Mode terminator as (value, width), if the mode has one.
	pub(crate) fn terminator(&self) -> Option<(u32, u8)> {
		match self.mode {
			HxMode::Numeric => {
				let lastgroup: u32 = [3, 1, 2][self.numchars % 3];
				Some((1020 + lastgroup, 10))
			}
			HxMode::Text => Some((63, 6)),
			HxMode::Region1 | HxMode::Region2 => Some((4095, 12)),
			HxMode::DoubleByte => Some((32767, 15)),
			HxMode::Byte | HxMode::FourByte | HxMode::Eci => None,
		}
	}

	pub fn is_numeric(text: &[u8]) -> bool {
		text.iter().all(u8::is_ascii_digit)
	}

	pub fn is_text(text: &[u8]) -> bool {
		text.iter().all(|&b| is_text_char(b))
	}
}

const TEXT_SUBMODE_SWITCH: u32 = 62;

fn is_text_char(b: u8) -> bool {
	b <= 27 || (b' ' ..= 127).contains(&b)
}

fn text_submode(b: u8) -> u8 {
	if b.is_ascii_alphanumeric() { 1 } else { 2 }
}

fn text_value(b: u8, submode: u8) -> u32 {
	match (submode, b) {
		(1, b'0' ..= b'9') => u32::from(b - b'0'),
		(1, b'A' ..= b'Z') => u32::from(b - b'A') + 10,
		(1, b'a' ..= b'z') => u32::from(b - b'a') + 36,
		(2, 0 ..= 27)      => u32::from(b),
		(2, b' ' ..= b'/') => u32::from(b - b' ') + 28,
		(2, b':' ..= b'@') => u32::from(b - b':') + 44,
		(2, b'[' ..= b'`') => u32::from(b - b'[') + 51,
		(2, b'{' ..= 127)  => u32::from(b - b'{') + 57,
		_ => panic!("Byte {:#04x} not encodable in text sub-mode {}", b, submode),
	}
}

fn classify_pair(b1: u8, b2: u8) -> CharClass {
	let pair: u16 = u16::from(b1) << 8 | u16::from(b2);
	let high: bool = (0xA1 ..= 0xFE).contains(&b2);
	if high && ((0xB0 ..= 0xD7).contains(&b1) || (0xA1 ..= 0xA3).contains(&b1)) || (0xA8A1 ..= 0xA8C0).contains(&pair) {
		CharClass::Region1
	} else if high && (0xD8 ..= 0xF7).contains(&b1) {
		CharClass::Region2
	} else if (0x81 ..= 0xFE).contains(&b1) && ((0x40 ..= 0x7E).contains(&b2) || (0x80 ..= 0xFE).contains(&b2)) {
		CharClass::DoubleByte
	} else {
		CharClass::Other
	}
}

fn is_four_byte(q: &[u8]) -> bool {
	q.len() == 4
		&& (0x81 ..= 0xFE).contains(&q[0]) && q[1].is_ascii_digit()
		&& (0x81 ..= 0xFE).contains(&q[2]) && q[3].is_ascii_digit()
}

/// Cuts the input into characters. Multi-byte GB18030 characters are only recognised when
/// `chinese` is set; anything that is not a well-formed character is a single `Other` byte.
fn split_units(data: &[u8], chinese: bool) -> Vec<Unit> {
	let mut units: Vec<Unit> = Vec::with_capacity(data.len());
	let mut pos: usize = 0;
	while pos < data.len() {
		let b: u8 = data[pos];
		let (class, len) = if b.is_ascii_digit() {
			(CharClass::Digit, 1)
		} else if is_text_char(b) {
			(CharClass::Text, 1)
		} else if chinese && pos + 4 <= data.len() && is_four_byte(&data[pos .. pos + 4]) {
			(CharClass::FourByte, 4)
		} else if chinese && pos + 1 < data.len() {
			match classify_pair(b, data[pos + 1]) {
				CharClass::Other => (CharClass::Other, 1),
				class => (class, 2),
			}
		} else {
			(CharClass::Other, 1)
		};
		units.push(Unit { start: pos, len, class });
		pos += len;
	}
	units
}
