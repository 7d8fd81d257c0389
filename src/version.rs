use once_cell::sync::Lazy;

use crate::error::{HxError, HxResult};
use crate::matrix::ModuleMatrix;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum HxEcl {
	L1,
	L2,
	L3,
	L4,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

/// How the codewords of one (version, level) pair are cut into Reed-Solomon blocks.
/// Short blocks come first; long blocks carry one extra data codeword.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockLayout {
	pub num_blocks: usize,
	pub ecc_per_block: usize,
	pub total_codewords: usize,
	pub data_codewords: usize,
}

// Free modules per version once the function patterns are drawn
static RAW_DATA_MODULES: Lazy<Vec<usize>> = Lazy::new(|| {
	(Version::MIN.value() ..= Version::MAX.value())
		.map(|v| ModuleMatrix::with_function_patterns(Version(v)).count_free())
		.collect()
});

// Rows are levels L1 to L4, columns are versions (index 0 unused)
static ECC_CODEWORDS_PER_BLOCK: [[i8; 85]; 4] = [
	[-1,  4,  5,  8,  8, 10, 12, 15, 18, 20, 24, 25, 28, 31, 35, 39, 21, 23, 25, 27, 30, 32, 33, 36, 38, 27, 29, 31, 33, 34, 36, 39, 40, 31, 33, 34, 36, 38, 40, 33, 35, 35, 37, 39, 40, 35, 36, 38, 39, 40, 35, 37, 38, 39, 36, 37, 38, 39, 40, 37, 38, 39, 40, 37, 38, 39, 40, 37, 38, 39, 37, 38, 39, 40, 38, 38, 39, 38, 39, 39, 38, 39, 40, 38, 39],  // L1
	[-1,  7, 11, 15, 15, 19, 24, 28, 33, 39, 45, 47, 53, 59, 33, 36, 40, 44, 48, 52, 56, 40, 41, 45, 48, 51, 54, 58, 46, 49, 51, 54, 56, 59, 49, 52, 55, 57, 50, 52, 55, 56, 58, 52, 54, 56, 58, 53, 55, 56, 58, 54, 56, 58, 54, 55, 57, 59, 55, 56, 58, 55, 57, 58, 55, 57, 58, 59, 57, 58, 56, 57, 59, 57, 58, 59, 57, 58, 56, 58, 59, 57, 59, 57, 58],  // L2
	[-1, 11, 17, 23, 23, 30, 37, 44, 51, 60, 69, 72, 40, 45, 51, 56, 62, 67, 49, 53, 57, 62, 64, 69, 55, 59, 63, 67, 71, 60, 63, 67, 69, 72, 63, 67, 70, 63, 66, 69, 72, 64, 67, 70, 73, 67, 70, 73, 68, 69, 72, 67, 70, 72, 69, 71, 68, 70, 71, 68, 70, 72, 69, 72, 69, 71, 72, 70, 72, 70, 72, 70, 71, 70, 71, 72, 71, 72, 71, 73, 71, 73, 71, 70, 72],  // L3
	[-1, 15, 22, 30, 31, 39, 48, 57, 67, 39, 45, 47, 53, 59, 66, 49, 54, 59, 64, 69, 56, 60, 62, 67, 57, 61, 65, 69, 61, 65, 69, 62, 64, 67, 71, 65, 68, 64, 67, 70, 66, 67, 70, 66, 69, 66, 68, 71, 68, 69, 67, 69, 67, 69, 67, 69, 67, 70, 71, 69, 71, 69, 68, 70, 69, 71, 68, 70, 69, 71, 70, 69, 71, 70, 69, 70, 69, 71, 70, 69, 71, 70, 70, 69, 71],  // L4
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 85]; 4] = [
	[-1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  2,  2,  2,  3,  3,  3,  3,  3,  3,  3,  3,  4,  4,  4,  4,  4,  4,  5,  5,  5,  5,  5,  5,  6,  6,  6,  6,  6,  7,  7,  7,  7,  8,  8,  8,  8,  8,  9,  9,  9,  9, 10, 10, 10, 10, 11, 11, 11, 12, 12, 12, 12, 13, 13, 13, 14, 14, 14, 15, 15, 15, 16, 16],  // L1
	[-1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  2,  3,  3,  3,  3,  3,  3,  3,  4,  4,  4,  4,  4,  4,  5,  5,  5,  5,  6,  6,  6,  6,  6,  7,  7,  7,  7,  8,  8,  8,  8,  9,  9,  9, 10, 10, 10, 10, 11, 11, 11, 12, 12, 12, 13, 13, 13, 13, 14, 14, 15, 15, 15, 16, 16, 16, 17, 17, 18, 18, 18, 19, 19, 20, 20],  // L2
	[-1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  3,  3,  3,  3,  3,  3,  4,  4,  4,  4,  4,  5,  5,  5,  5,  5,  6,  6,  6,  7,  7,  7,  7,  8,  8,  8,  8,  9,  9,  9, 10, 10, 10, 11, 11, 11, 12, 12, 13, 13, 13, 14, 14, 14, 15, 15, 16, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 20, 21, 21, 22, 22, 23, 23, 24, 25, 25],  // L3
	[-1,  1,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  3,  3,  3,  3,  3,  4,  4,  4,  4,  5,  5,  5,  5,  6,  6,  6,  7,  7,  7,  7,  8,  8,  9,  9,  9, 10, 10, 10, 11, 11, 12, 12, 12, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 17, 18, 18, 19, 20, 20, 21, 21, 22, 22, 23, 23, 24, 25, 25, 26, 27, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33],  // L4
];

impl HxEcl {
	pub const DEFAULT: HxEcl = HxEcl::L2;

	pub fn from_value(ecl: i32) -> HxResult<Self> {
		match ecl {
			1 => Ok(HxEcl::L1),
			2 => Ok(HxEcl::L2),
			3 => Ok(HxEcl::L3),
			4 => Ok(HxEcl::L4),
			_ => Err(HxError::InvalidEcl(ecl)),
		}
	}

	/// Level number as printed on the symbol, 1 to 4.
	pub fn value(self) -> u8 {
		self.ordinal() as u8 + 1
	}

	pub(crate) fn ordinal(self) -> usize {
		use HxEcl::*;
		match self {
			L1 => 0,
			L2 => 1,
			L3 => 2,
			L4 => 3,
		}
	}

	pub(crate) fn higher(self) -> Option<Self> {
		use HxEcl::*;
		match self {
			L1 => Some(L2),
			L2 => Some(L3),
			L3 => Some(L4),
			L4 => None,
		}
	}
}

impl Version {
	pub const MIN: Version = Version( 1);
	pub const MAX: Version = Version(84);

	pub fn new(ver: u8) -> Self {
		assert!((Version::MIN.value() ..= Version::MAX.value()).contains(&ver), "Version number out of range");
		Self(ver)
	}

	pub fn from_value(ver: i32) -> HxResult<Self> {
		if (i32::from(Version::MIN.value()) ..= i32::from(Version::MAX.value())).contains(&ver) {
			Ok(Self(ver as u8))
		} else {
			Err(HxError::InvalidVersion(ver))
		}
	}

	pub fn value(self) -> u8 {
		self.0
	}

	/// Side length in modules.
	pub fn size(self) -> i32 {
		21 + 2 * i32::from(self.0)
	}

	/// Modules left for codewords once every function pattern is drawn.
	pub fn raw_data_modules(self) -> usize {
		RAW_DATA_MODULES[usize::from(self.0 - 1)]
	}

	pub fn total_codewords(self) -> usize {
		self.raw_data_modules() / 8
	}

	/// Free modules that no codeword bit reaches; they stay light.
	pub fn remainder_bits(self) -> usize {
		self.raw_data_modules() % 8
	}

	pub fn block_layout(self, ecl: HxEcl) -> BlockLayout {
		let num_blocks: usize = Version::table_get(&NUM_ERROR_CORRECTION_BLOCKS, self, ecl);
		let ecc_per_block: usize = Version::table_get(&ECC_CODEWORDS_PER_BLOCK, self, ecl);
		let total_codewords: usize = self.total_codewords();
		BlockLayout {
			num_blocks,
			ecc_per_block,
			total_codewords,
			data_codewords: total_codewords - num_blocks * ecc_per_block,
		}
	}

	pub fn data_codewords(self, ecl: HxEcl) -> usize {
		self.block_layout(ecl).data_codewords
	}

	pub fn ecc_codewords(self, ecl: HxEcl) -> usize {
		let layout: BlockLayout = self.block_layout(ecl);
		layout.num_blocks * layout.ecc_per_block
	}

	/// Smallest version in `minversion ..= maxversion` holding `databits` at `ecl`.
	pub fn select(databits: usize, ecl: HxEcl, minversion: Version, maxversion: Version) -> HxResult<Version> {
		assert!(minversion <= maxversion, "Invalid value");
		let needed: usize = (databits + 7) / 8;
		let mut version: Version = minversion;
		loop {
			if needed <= version.data_codewords(ecl) {
				return Ok(version);
			} else if version >= maxversion {
				return Err(HxError::CapacityExceeded {
					needed,
					capacity: version.data_codewords(ecl),
					version: version.value(),
					ecl: ecl.value(),
				});
			}
			version = Version(version.0 + 1);
		}
	}

	fn table_get(table: &'static [[i8; 85]; 4], ver: Version, ecl: HxEcl) -> usize {
		table[ecl.ordinal()][usize::from(ver.value())] as usize
	}
}

impl BlockLayout {
	pub fn short_block_len(&self) -> usize {
		self.total_codewords / self.num_blocks
	}

	pub fn num_short_blocks(&self) -> usize {
		self.num_blocks - self.total_codewords % self.num_blocks
	}

	/// Data codewords carried by block `i`.
	pub fn data_len(&self, i: usize) -> usize {
		self.short_block_len() - self.ecc_per_block + usize::from(i >= self.num_short_blocks())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LEVELS: [HxEcl; 4] = [HxEcl::L1, HxEcl::L2, HxEcl::L3, HxEcl::L4];

	fn versions() -> impl Iterator<Item = Version> {
		(1 ..= 84).map(Version::new)
	}

	#[test]
	fn side_length() {
		assert_eq!(Version::MIN.size(), 23);
		assert_eq!(Version::new(4).size(), 29);
		assert_eq!(Version::MAX.size(), 189);
	}

	#[test]
	fn version_one_geometry() {
		// 529 modules minus 4 finders, separators and function-information regions
		let v = Version::new(1);
		assert_eq!(v.raw_data_modules(), 529 - 4 * (49 + 15 + 17));
		assert_eq!(v.total_codewords(), 25);
		assert_eq!(v.remainder_bits(), 5);
	}

	#[test]
	fn known_table_rows() {
		let v1 = Version::new(1);
		assert_eq!(v1.block_layout(HxEcl::L1), BlockLayout { num_blocks: 1, ecc_per_block: 4, total_codewords: 25, data_codewords: 21 });
		let data: Vec<usize> = LEVELS.iter().map(|&e| v1.data_codewords(e)).collect();
		assert_eq!(data, vec![21, 18, 14, 10]);

		let v4 = Version::new(4);
		assert_eq!(v4.total_codewords(), 52);
		assert_eq!(v4.data_codewords(HxEcl::L2), 37);

		assert_eq!(Version::new(11).total_codewords(), 158);
		assert_eq!(Version::MAX.block_layout(HxEcl::L4), BlockLayout { num_blocks: 33, ecc_per_block: 71, total_codewords: 3929, data_codewords: 1586 });
		assert_eq!(Version::MAX.data_codewords(HxEcl::L1), 3305);
	}

	#[test]
	fn table_is_self_consistent() {
		for v in versions() {
			for &ecl in &LEVELS {
				let layout = v.block_layout(ecl);
				assert_eq!(v.data_codewords(ecl) + v.ecc_codewords(ecl), v.total_codewords(), "v{} {:?}", v.value(), ecl);
				let datasum: usize = (0 .. layout.num_blocks).map(|i| layout.data_len(i)).sum();
				assert_eq!(datasum, layout.data_codewords);
				assert!(layout.short_block_len() + 1 <= 255 || layout.num_short_blocks() == layout.num_blocks);
				assert!(layout.short_block_len() <= 255);
				assert!(layout.data_len(0) >= 1);
			}
		}
	}

	#[test]
	fn capacity_grows_with_version_and_shrinks_with_level() {
		for &ecl in &LEVELS {
			let caps: Vec<usize> = versions().map(|v| v.data_codewords(ecl)).collect();
			assert!(caps.windows(2).all(|w| w[0] < w[1]), "{:?}", ecl);
		}
		for v in versions() {
			let caps: Vec<usize> = LEVELS.iter().map(|&e| v.data_codewords(e)).collect();
			assert!(caps.windows(2).all(|w| w[0] > w[1]), "v{}", v.value());
		}
	}

	#[test]
	fn select_picks_smallest_fit() {
		let needed_bits: usize = Version::new(3).data_codewords(HxEcl::L2) * 8;
		assert_eq!(Version::select(needed_bits, HxEcl::L2, Version::MIN, Version::MAX), Ok(Version::new(3)));
		assert_eq!(Version::select(needed_bits + 1, HxEcl::L2, Version::MIN, Version::MAX), Ok(Version::new(4)));
		assert_eq!(Version::select(1, HxEcl::L4, Version::new(7), Version::MAX), Ok(Version::new(7)));
	}

	#[test]
	fn select_reports_capacity_exceeded() {
		let cap: usize = Version::new(1).data_codewords(HxEcl::L4);
		let err = Version::select((cap + 1) * 8, HxEcl::L4, Version::MIN, Version::MIN).unwrap_err();
		assert_eq!(err, HxError::CapacityExceeded { needed: cap + 1, capacity: cap, version: 1, ecl: 4 });
	}

	#[test]
	fn out_of_range_values_are_rejected() {
		assert_eq!(Version::from_value(0), Err(HxError::InvalidVersion(0)));
		assert_eq!(Version::from_value(85), Err(HxError::InvalidVersion(85)));
		assert_eq!(HxEcl::from_value(5), Err(HxError::InvalidEcl(5)));
		assert_eq!(HxEcl::from_value(3).map(HxEcl::value), Ok(3));
	}
}
