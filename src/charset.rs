use encoding_rs::{Encoding, GB18030, GBK};
use tracing::warn;

use crate::error::{HxError, HxResult};

/// ECI value meaning "no ECI header, data is GB18030".
pub const DEFAULT_ECI: u32 = 0;

const ECI_LATIN1: u32 = 3;
const ECI_LATIN5: u32 = 11;
const ECI_THAI: u32 = 13;
const ECI_UTF8: u32 = 26;
const ECI_ASCII: u32 = 27;
const ECI_GB2312: u32 = 29;
const ECI_EUC_KR: u32 = 30;
const ECI_BINARY: u32 = 899;

// ECI assignment -> WHATWG label understood by encoding_rs. Some labels resolve to a
// Windows superset (iso-8859-1, us-ascii, iso-8859-9, iso-8859-11, gb2312, euc-kr);
// `encode_strict` narrows those back to the declared charset.
static ECI_TABLE: [(u32, &str); 30] = [
	(  3, "iso-8859-1"),
	(  4, "iso-8859-2"),
	(  5, "iso-8859-3"),
	(  6, "iso-8859-4"),
	(  7, "iso-8859-5"),
	(  8, "iso-8859-6"),
	(  9, "iso-8859-7"),
	( 10, "iso-8859-8"),
	( 11, "iso-8859-9"),
	( 12, "iso-8859-10"),
	( 13, "iso-8859-11"),
	( 15, "iso-8859-13"),
	( 16, "iso-8859-14"),
	( 17, "iso-8859-15"),
	( 18, "iso-8859-16"),
	( 20, "shift_jis"),
	( 21, "windows-1250"),
	( 22, "windows-1251"),
	( 23, "windows-1252"),
	( 24, "windows-1256"),
	( 25, "utf-16be"),
	( 26, "utf-8"),
	( 27, "us-ascii"),
	( 28, "big5"),
	( 29, "gb2312"),
	( 30, "euc-kr"),
	( 31, "gbk"),
	( 32, "gb18030"),
	( 33, "utf-16le"),
	(899, "binary"),
];

/// Character encoding declared for the data, together with the ECI value
/// announcing it in the symbol (0 = implicit GB18030, no ECI segment).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
	eci: u32,
	label: &'static str,
	encoding: Option<&'static Encoding>,
}

impl Default for Charset {
	fn default() -> Self {
		Self {
			eci: DEFAULT_ECI,
			label: "gb18030",
			encoding: Some(GB18030),
		}
	}
}

impl Charset {
	pub fn from_eci(eci: u32) -> HxResult<Self> {
		if eci == DEFAULT_ECI {
			return Ok(Self::default());
		}
		let &(_, label) = ECI_TABLE.iter()
			.find(|&&(value, _)| value == eci)
			.ok_or(HxError::UnsupportedEci(eci))?;
		Self::resolve(eci, label)
	}

	/// Looks a charset up by name, e.g. `"utf-8"`, `"Shift_JIS"`, `"binary"`.
	pub fn from_label(label: &str) -> HxResult<Self> {
		let wanted: String = label.trim().to_ascii_lowercase();
		if let Some(&(eci, label)) = ECI_TABLE.iter().find(|&&(_, l)| l == wanted) {
			return Self::resolve(eci, label);
		}
		let encoding: &'static Encoding = Encoding::for_label(wanted.as_bytes())
			.ok_or_else(|| HxError::UnsupportedCharset(label.to_string()))?;
		// only the entry whose own name is the resolved encoding, so "cp1252" is not taken for latin-1
		for &(eci, l) in ECI_TABLE.iter() {
			if l.eq_ignore_ascii_case(encoding.name()) {
				return Self::resolve(eci, l);
			}
		}
		Err(HxError::UnsupportedCharset(label.to_string()))
	}

	fn resolve(eci: u32, label: &'static str) -> HxResult<Self> {
		let encoding: Option<&'static Encoding> = if eci == ECI_BINARY {
			None
		} else {
			Some(Encoding::for_label(label.as_bytes())
				.ok_or_else(|| HxError::UnsupportedCharset(label.to_string()))?)
		};
		Ok(Self { eci, label, encoding })
	}

	pub fn eci(&self) -> u32 {
		self.eci
	}

	pub fn name(&self) -> &'static str {
		self.label
	}

	/// Whether an ECI segment has to be written ahead of the data.
	pub fn needs_eci_header(&self) -> bool {
		self.eci != DEFAULT_ECI
	}

	/// The Chinese character modes interpret byte pairs as GB2312/GBK/GB18030 code points,
	/// so they only apply when the data is declared in that family.
	pub fn supports_chinese_modes(&self) -> bool {
		self.encoding == Some(GB18030) || self.encoding == Some(GBK)
	}

	/// Converts text to bytes in this charset. When the charset cannot represent the
	/// text, the result is UTF-8 and the returned charset is ECI 26.
	pub fn encode_text(&self, text: &str) -> (Vec<u8>, Charset) {
		match self.encode_strict(text) {
			Some(bytes) => (bytes, *self),
			None => {
				warn!(charset = self.label, "text not representable, falling back to UTF-8");
				let utf8: Charset = ECI_TABLE.iter()
					.find(|&&(eci, _)| eci == ECI_UTF8)
					.map(|&(eci, label)| Charset { eci, label, encoding: Some(encoding_rs::UTF_8) })
					.unwrap_or(*self);
				(text.as_bytes().to_vec(), utf8)
			}
		}
	}

	// `None` when some character has no code in exactly this charset.
	fn encode_strict(&self, text: &str) -> Option<Vec<u8>> {
		match self.eci {
			ECI_LATIN1 => return text.chars().map(|c| u8::try_from(c).ok()).collect(),
			ECI_ASCII => return if text.is_ascii() { Some(text.as_bytes().to_vec()) } else { None },
			_ => {}
		}
		match self.label {
			"binary" => return Some(text.as_bytes().to_vec()),
			"utf-16be" => return Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
			"utf-16le" => return Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
			_ => {}
		}
		let encoding: &'static Encoding = match self.encoding {
			Some(enc) => enc,
			None => return Some(text.as_bytes().to_vec()),
		};
		let (bytes, _, had_errors) = encoding.encode(text);
		if had_errors {
			return None;
		}
		let fits: bool = match self.eci {
			// the Windows supersets put extra characters in the C1 range
			ECI_LATIN5 | ECI_THAI => !bytes.iter().any(|b| (0x80 ..= 0x9F).contains(b)),
			// GBK and UHC extend the EUC row range below 0xA1
			ECI_GB2312 | ECI_EUC_KR => bytes.iter().all(|&b| b < 0x80 || (0xA1 ..= 0xFE).contains(&b)),
			_ => true,
		};
		if fits { Some(bytes.into_owned()) } else { None }
	}
}
