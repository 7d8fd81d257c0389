//! Han Xin Code symbol encoder.
//!
//! Input bytes are split into mode segments, packed into data codewords for the smallest
//! version that holds them, protected with Reed-Solomon parity and laid out on a
//! `21 + 2 * version` module square together with the finder, alignment and function
//! information patterns, then masked.
#![forbid(unsafe_code)]

mod bits;
mod bitstream;
mod charset;
mod ecc;
mod error;
mod mask;
mod matrix;
mod segment;
mod version;

use tracing::debug;

pub use bits::BitBuffer;
pub use bitstream::{encode_segments, make_codewords};
pub use charset::{Charset, DEFAULT_ECI};
pub use ecc::{CodewordBlock, GaloisField, ReedSolomon, GF16, GF256};
pub use error::{HxError, HxResult};
pub use mask::{penalty_score, Mask, AUTO_MASK};
pub use matrix::{Module, ModuleMatrix, FUNCTION_INFO_BITS};
pub use segment::{HxMode, HxSegment, MAX_BYTE_COUNT};
pub use version::{BlockLayout, HxEcl, Version};

/// A finished Han Xin Code symbol.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HanXin {
	version: Version,
	size: i32,
	errorcorrectionlevel: HxEcl,
	mask: Mask,
	matrix: ModuleMatrix,
}

/// Knobs of [`HanXin::encode_with_options`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
	/// Requested level; `None` starts at level 2.
	pub ecl: Option<HxEcl>,
	/// Smallest version to use; raised as needed up to `max_version`.
	pub min_version: Version,
	pub max_version: Version,
	/// Raise the level while the data still fits the chosen version.
	pub boost_ecl: bool,
	/// `None` selects the mask with the lowest penalty.
	pub mask: Option<Mask>,
	pub charset: Charset,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		Self {
			ecl: None,
			min_version: Version::MIN,
			max_version: Version::MAX,
			boost_ecl: true,
			mask: None,
			charset: Charset::default(),
		}
	}
}

impl HanXin {
	/// Encodes text as GB18030 at the given level, version chosen automatically.
	pub fn encode_text(text: &str, ecl: HxEcl) -> HxResult<Self> {
		let (bytes, charset) = Charset::default().encode_text(text);
		let segs: Vec<HxSegment> = HxSegment::make_segments(&bytes, &charset)?;
		HanXin::seg_encode(&segs, ecl)
	}

	/// Encodes arbitrary bytes in byte mode only.
	pub fn encode_binary(data: &[u8], ecl: HxEcl) -> HxResult<Self> {
		if data.is_empty() {
			return Err(HxError::InputEmpty);
		}
		let segs: Vec<HxSegment> = data.chunks(MAX_BYTE_COUNT).map(HxSegment::make_bytes).collect();
		HanXin::seg_encode(&segs, ecl)
	}

	pub fn seg_encode(segs: &[HxSegment], ecl: HxEcl) -> HxResult<Self> {
		HanXin::seg_encode_advanced(segs, ecl, Version::MIN, Version::MAX, None, true)
	}

	/// `version` and `ecl` are in/out: 0 asks for automatic choice, and on success both
	/// hold the values used. A non-zero `version` is binding. `eci` 0 means GB18030 with no
	/// ECI header; `mask` is `AUTO_MASK` or 0 to 7.
	pub fn encode(data: &[u8], version: &mut i32, ecl: &mut i32, eci: u32, mask: i32) -> HxResult<Self> {
		let (minversion, maxversion) = if *version == 0 {
			(Version::MIN, Version::MAX)
		} else {
			let v: Version = Version::from_value(*version)?;
			(v, v)
		};
		let (level, boostecl) = if *ecl == 0 {
			(HxEcl::DEFAULT, true)
		} else {
			(HxEcl::from_value(*ecl)?, false)
		};
		let charset: Charset = Charset::from_eci(eci)?;
		let mask: Option<Mask> = Mask::from_value(mask)?;

		let segs: Vec<HxSegment> = HxSegment::make_segments(data, &charset)?;
		let result: HanXin = HanXin::seg_encode_advanced(&segs, level, minversion, maxversion, mask, boostecl)?;
		*version = i32::from(result.version.value());
		*ecl = i32::from(result.errorcorrectionlevel.value());
		Ok(result)
	}

	/// Text is converted to GB18030 and encoded without ECI, mask chosen automatically.
	pub fn encode_from_common_data(text: &str, version: &mut i32, ecl: &mut i32) -> HxResult<Self> {
		let (bytes, charset) = Charset::default().encode_text(text);
		HanXin::encode(&bytes, version, ecl, charset.eci(), AUTO_MASK)
	}

	pub fn encode_with_options(data: &[u8], opts: &EncodeOptions) -> HxResult<Self> {
		let segs: Vec<HxSegment> = HxSegment::make_segments(data, &opts.charset)?;
		HanXin::seg_encode_advanced(&segs, opts.ecl.unwrap_or(HxEcl::DEFAULT),
			opts.min_version, opts.max_version, opts.mask, opts.boost_ecl)
	}

	/// Like `encode_with_options`, converting `text` with the configured charset first.
	pub fn encode_text_with_options(text: &str, opts: &EncodeOptions) -> HxResult<Self> {
		let (bytes, charset) = opts.charset.encode_text(text);
		HanXin::encode_with_options(&bytes, &EncodeOptions { charset, ..*opts })
	}

	pub fn seg_encode_advanced(segs: &[HxSegment], mut ecl: HxEcl,
			minversion: Version, maxversion: Version, mask: Option<Mask>, boostecl: bool)
			-> HxResult<Self> {
		if segs.is_empty() {
			return Err(HxError::InputEmpty);
		}
		if minversion > maxversion {
			return Err(HxError::InvalidVersion(i32::from(minversion.value())));
		}
		let bb: BitBuffer = bitstream::encode_segments(segs);
		let datausedbits: usize = bb.len();
		let version: Version = Version::select(datausedbits, ecl, minversion, maxversion)?;

		while let Some(newecl) = ecl.higher() {
			if boostecl && (datausedbits + 7) / 8 <= version.data_codewords(newecl) {
				ecl = newecl;
			} else {
				break;
			}
		}
		debug!(bits = datausedbits, version = version.value(), ecl = ecl.value(), "version resolved");

		let datacodewords: Vec<u8> = bitstream::make_codewords(bb, version.data_codewords(ecl))?;
		Ok(HanXin::encode_codewords(version, ecl, &datacodewords, mask))
	}

	/// Builds the symbol from exactly `ver.data_codewords(ecl)` data codewords.
	pub fn encode_codewords(ver: Version, ecl: HxEcl, datacodewords: &[u8], msk: Option<Mask>) -> Self {
		let mut matrix: ModuleMatrix = ModuleMatrix::with_function_patterns(ver);
		let allcodewords: Vec<u8> = ecc::add_ecc_and_interleave(datacodewords, ver, ecl);
		matrix.draw_codewords(&allcodewords);

		// Function information stays blank while candidates are scored
		let msk: Mask = match msk {
			Some(m) => m,
			None => {
				let (best, scores) = mask::choose_mask(&matrix);
				debug!(mask = best.value(), ?scores, "mask selected");
				best
			}
		};
		matrix.apply_mask(msk);
		matrix.draw_format_bits(ver, ecl, msk);
		Self {
			version: ver,
			size: ver.size(),
			errorcorrectionlevel: ecl,
			mask: msk,
			matrix,
		}
	}

	pub fn version(&self) -> Version {
		self.version
	}

	pub fn size(&self) -> i32 {
		self.size
	}

	pub fn error_correction_level(&self) -> HxEcl {
		self.errorcorrectionlevel
	}

	pub fn mask(&self) -> Mask {
		self.mask
	}

	pub fn matrix(&self) -> &ModuleMatrix {
		&self.matrix
	}

	pub fn get_module(&self, x: i32, y: i32) -> bool {
		self.matrix.get_module(x, y)
	}

	/// Rows of 1 (dark) and 0 (light), top row first.
	pub fn to_byte_matrix(&self) -> Vec<Vec<u8>> {
		(0 .. self.size)
			.map(|y| (0 .. self.size).map(|x| u8::from(self.get_module(x, y))).collect())
			.collect()
	}
}
