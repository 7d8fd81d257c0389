use crate::bits::get_bit;
use crate::ecc::{ReedSolomon, GF16};
use crate::mask::Mask;
use crate::version::{HxEcl, Version};

/// State of one cell of the symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Module {
	Light,
	Dark,
	FunctionLight,
	FunctionDark,
	/// Not yet assigned; waits for a codeword bit.
	Reserved,
}

/// Square grid of modules, row-major, (0, 0) at the top left.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleMatrix {
	size: i32,
	modules: Vec<Module>,
}

/// Bits of function information: four data nibbles, four parity nibbles, two filler bits.
pub const FUNCTION_INFO_BITS: usize = 34;

// Alignment grid per version (index 0 unused, versions 1 to 3 have none): the first `m`
// regions of each side are `k` modules wide, the remaining one is `r - 1`.
static ALIGNMENT_K: [i8; 85] = [-1,  0,  0,  0, 14, 16, 16, 17, 18, 19, 20, 14, 15, 16, 16, 17, 17, 18, 19, 20, 20, 21, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 17, 17, 18, 18, 19, 19, 19, 20, 20, 17, 17, 18, 18, 18, 19, 19, 19, 17, 17, 18, 18, 18, 18, 19, 19, 19, 17, 17, 18, 18, 18, 18, 19, 19, 17, 17, 17, 18, 18, 18, 18, 19, 19, 17, 17, 17, 18, 18, 18, 18, 18, 18, 18];
static ALIGNMENT_R: [i8; 85] = [-1,  0,  0,  0, 15, 15, 17, 18, 19, 20, 21, 15, 15, 15, 17, 17, 19, 19, 19, 19, 21, 21, 17, 16, 18, 17, 19, 18, 20, 19, 21, 20, 17, 19, 17, 19, 17, 19, 21, 19, 21, 18, 20, 17, 19, 21, 18, 20, 22, 17, 19, 15, 17, 19, 21, 17, 19, 21, 18, 20, 15, 17, 19, 21, 16, 18, 17, 19, 21, 15, 17, 19, 21, 15, 17, 18, 20, 22, 15, 17, 19, 21, 23, 25, 27];
static ALIGNMENT_M: [i8; 85] = [-1,  0,  0,  0,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  4,  4,  4,  4,  4,  4,  4,  4,  4,  5,  5,  5,  5,  5,  5,  5,  5,  6,  6,  6,  6,  6,  6,  6,  6,  6,  7,  7,  7,  7,  7,  7,  7,  7,  8,  8,  8,  8,  8,  8,  8,  8,  8,  9,  9,  9,  9,  9,  9,  9,  9,  9,  9];

impl Module {
	pub fn is_dark(self) -> bool {
		matches!(self, Module::Dark | Module::FunctionDark)
	}

	pub fn is_function(self) -> bool {
		matches!(self, Module::FunctionLight | Module::FunctionDark)
	}
}

impl ModuleMatrix {
	/// Lays out finders, separators, alignment patterns and the (still light) function
	/// information cells of `ver`. Every other cell is left `Reserved`.
	pub fn with_function_patterns(ver: Version) -> Self {
		let size: i32 = ver.size();
		let mut result = Self {
			size,
			modules: vec![Module::Reserved; (size * size) as usize],
		};

		result.draw_finder_pattern(0, 0, false, false);
		result.draw_finder_pattern(size - 7, 0, true, false);
		result.draw_finder_pattern(0, size - 7, true, false);
		result.draw_finder_pattern(size - 7, size - 7, true, true);

		for i in 0 .. 8 {
			for &(x, y) in &[(i, 7), (7, i), (size - 1 - i, 7), (7, size - 1 - i),
					(size - 8, i), (i, size - 8), (size - 1 - i, size - 8), (size - 8, size - 1 - i)] {
				result.set_function_module(x, y, false);
			}
		}
		for i in 0 .. 9 {
			for &(x, y) in &[(i, 8), (8, i), (size - 1 - i, 8), (8, size - 1 - i),
					(size - 9, i), (i, size - 9), (size - 1 - i, size - 9), (size - 9, size - 1 - i)] {
				result.set_function_module(x, y, false);
			}
		}

		result.draw_alignment_patterns(ver);
		result
	}

	pub fn size(&self) -> i32 {
		self.size
	}

	pub fn module(&self, x: i32, y: i32) -> Module {
		self.modules[(y * self.size + x) as usize]
	}

	/// Whether the module at (x, y) is dark; coordinates outside the symbol read as light.
	pub fn get_module(&self, x: i32, y: i32) -> bool {
		(0 .. self.size).contains(&x) && (0 .. self.size).contains(&y) && self.module(x, y).is_dark()
	}

	pub fn is_function(&self, x: i32, y: i32) -> bool {
		self.module(x, y).is_function()
	}

	pub fn modules(&self) -> &[Module] {
		&self.modules
	}

	pub fn dark_count(&self) -> usize {
		self.modules.iter().filter(|m| m.is_dark()).count()
	}

	pub(crate) fn count_free(&self) -> usize {
		self.modules.iter().filter(|&&m| m == Module::Reserved).count()
	}

	/// True once no cell is left `Reserved`.
	pub fn is_complete(&self) -> bool {
		self.count_free() == 0
	}

	fn module_mut(&mut self, x: i32, y: i32) -> &mut Module {
		&mut self.modules[(y * self.size + x) as usize]
	}

	fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
		*self.module_mut(x, y) = if isdark { Module::FunctionDark } else { Module::FunctionLight };
	}

	// Alignment and assistant patterns never overwrite another function pattern.
	fn plot_free(&mut self, x: i32, y: i32, isdark: bool) {
		if (0 .. self.size).contains(&x) && (0 .. self.size).contains(&y) && self.module(x, y) == Module::Reserved {
			self.set_function_module(x, y, isdark);
		}
	}

	/// Nested L-shapes; the outer corner of the L sits at the flipped (0, 0) of the 7x7 area.
	fn draw_finder_pattern(&mut self, x0: i32, y0: i32, flipx: bool, flipy: bool) {
		for dy in 0 .. 7 {
			for dx in 0 .. 7 {
				let cx: i32 = if flipx { 6 - dx } else { dx };
				let cy: i32 = if flipy { 6 - dy } else { dy };
				let layer: i32 = cx.min(cy).min(4);
				self.set_function_module(x0 + dx, y0 + dy, layer % 2 == 0);
			}
		}
	}

	fn alignment_get(table: &'static [i8; 85], ver: Version) -> i32 {
		i32::from(table[usize::from(ver.value())])
	}

	/// Width of alignment region `n`, counted from the top (rows) or the right (columns).
	fn alignment_span(ver: Version, n: i32) -> i32 {
		if n < ModuleMatrix::alignment_get(&ALIGNMENT_M, ver) {
			ModuleMatrix::alignment_get(&ALIGNMENT_K, ver)
		} else {
			ModuleMatrix::alignment_get(&ALIGNMENT_R, ver) - 1
		}
	}

	fn draw_alignment_patterns(&mut self, ver: Version) {
		let m: i32 = ModuleMatrix::alignment_get(&ALIGNMENT_M, ver);
		if m == 0 {
			return;
		}
		let size: i32 = self.size;

		let mut y: i32 = 0;
		let mut row: i32 = 0;
		while y < size {
			let h: i32 = ModuleMatrix::alignment_span(ver, row);
			let mut x: i32 = size - 1;
			let mut col: i32 = 0;
			while x >= 0 {
				let w: i32 = ModuleMatrix::alignment_span(ver, col);
				if (row + col) % 2 == 1 {
					self.draw_alignment_pattern(x, y, w, h);
				}
				col += 1;
				x -= w;
			}
			row += 1;
			y += h;
		}

		// assistant patterns on the left and right edges
		let mut y: i32 = 0;
		let mut row: i32 = 0;
		while y < size {
			if (row + m) % 2 == 0 {
				self.draw_assistant_pattern(0, y);
			}
			if row % 2 == 0 {
				self.draw_assistant_pattern(size - 1, y);
			}
			y += ModuleMatrix::alignment_span(ver, row);
			row += 1;
		}

		// and on the top and bottom edges
		let mut x: i32 = size - 1;
		let mut col: i32 = 0;
		while x >= 0 {
			if (col + m) % 2 == 0 {
				self.draw_assistant_pattern(x, size - 1);
			}
			if col % 2 == 0 {
				self.draw_assistant_pattern(x, 0);
			}
			x -= ModuleMatrix::alignment_span(ver, col);
			col += 1;
		}
	}

	/// Dark L running `w` modules left and `h` modules down from (x, y), with a light L inside it.
	fn draw_alignment_pattern(&mut self, x: i32, y: i32, w: i32, h: i32) {
		self.plot_free(x, y, true);
		self.plot_free(x - 1, y + 1, false);
		for i in 1 ..= w {
			self.plot_free(x - i, y, true);
			self.plot_free(x - i - 1, y + 1, false);
		}
		for i in 1 .. h {
			self.plot_free(x, y + i, true);
			self.plot_free(x - 1, y + i + 1, false);
		}
	}

	fn draw_assistant_pattern(&mut self, x: i32, y: i32) {
		for dy in -1 ..= 1 {
			for dx in -1 ..= 1 {
				self.plot_free(x + dx, y + dy, dx == 0 && dy == 0);
			}
		}
	}

	/// Places the final codeword stream into the free modules, row by row, after spreading it
	/// in batches of 13. Free modules past the last bit stay light.
	pub(crate) fn draw_codewords(&mut self, data: &[u8]) {
		assert_eq!(data.len(), self.count_free() / 8, "Illegal argument");
		let fence: Vec<u8> = picket_fence(data);
		let numbits: usize = fence.len() * 8;
		let mut i: usize = 0;
		for cell in self.modules.iter_mut().filter(|m| **m == Module::Reserved) {
			let isdark: bool = i < numbits && get_bit(u32::from(fence[i >> 3]), 7 - (i & 7) as i32);
			*cell = if isdark { Module::Dark } else { Module::Light };
			i += 1;
		}
		debug_assert!(i >= numbits);
		debug_assert!(self.is_complete());
	}

	/// XORs `mask` onto every non-function module.
	pub(crate) fn apply_mask(&mut self, mask: Mask) {
		for y in 0 .. self.size {
			for x in 0 .. self.size {
				if mask.invert(x, y) {
					let cell: &mut Module = self.module_mut(x, y);
					*cell = match *cell {
						Module::Dark => Module::Light,
						Module::Light => Module::Dark,
						other => other,
					};
				}
			}
		}
	}

	/// Writes the two copies of the function information for `ver`, `ecl` and `mask`.
	pub(crate) fn draw_format_bits(&mut self, ver: Version, ecl: HxEcl, mask: Mask) {
		let bits: [bool; FUNCTION_INFO_BITS] = function_information(ver, ecl, mask);
		let size: i32 = self.size;
		for i in 0 .. 9 {
			let n: usize = i as usize;
			self.set_function_module(i, 8, bits[n]);
			self.set_function_module(size - 1 - i, size - 9, bits[n]);
			self.set_function_module(8, 8 - i, bits[n + 8]);
			self.set_function_module(size - 9, size - 9 + i, bits[n + 8]);
			self.set_function_module(size - 9, i, bits[n + 17]);
			self.set_function_module(8, size - 1 - i, bits[n + 17]);
			self.set_function_module(size - 9 + i, 8, bits[n + 25]);
			self.set_function_module(8 - i, size - 9, bits[n + 25]);
		}
	}

	/// Reads back the first copy of the function information.
	pub fn read_format_bits(&self) -> [bool; FUNCTION_INFO_BITS] {
		let mut bits = [false; FUNCTION_INFO_BITS];
		let size: i32 = self.size;
		for i in 0 .. 9 {
			let n: usize = i as usize;
			bits[n] = self.get_module(i, 8);
			bits[n + 8] = self.get_module(8, 8 - i);
			bits[n + 17] = self.get_module(size - 9, i);
			bits[n + 25] = self.get_module(size - 9 + i, 8);
		}
		bits
	}
}

/// Function information: version + 20 (two nibbles), level and low mask bits, high mask bit,
/// then four GF(16) Reed-Solomon parity nibbles and an alternating filler.
pub(crate) fn function_information(ver: Version, ecl: HxEcl, mask: Mask) -> [bool; FUNCTION_INFO_BITS] {
	let v: u8 = ver.value() + 20;
	let nibbles: [u8; 4] = [v >> 4, v & 0xF, (ecl.ordinal() as u8) << 2 | (mask.value() & 3), mask.value() >> 2];
	let parity: Vec<u8> = ReedSolomon::new(&GF16, 4).compute_remainder(&nibbles);
	let mut bits = [false; FUNCTION_INFO_BITS];
	for (i, bit) in bits.iter_mut().enumerate() {
		*bit = match i / 4 {
			0 ..= 3 => get_bit(u32::from(nibbles[i / 4]), 3 - (i % 4) as i32),
			4 ..= 7 => get_bit(u32::from(parity[i / 4 - 4]), 3 - (i % 4) as i32),
			_ => i % 2 == 1,
		};
	}
	bits
}

fn picket_fence(stream: &[u8]) -> Vec<u8> {
	(0 .. 13).flat_map(|start| stream.iter().skip(start).step_by(13).copied()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn finder_at(m: &ModuleMatrix, x0: i32, y0: i32) -> Vec<bool> {
		(0 .. 49).map(|i| m.get_module(x0 + i % 7, y0 + i / 7)).collect()
	}

	#[test]
	fn top_left_finder_matches_reference_rows() {
		let m = ModuleMatrix::with_function_patterns(Version::new(1));
		let rows: [u8; 7] = [0x7F, 0x40, 0x5F, 0x50, 0x57, 0x57, 0x57];
		for (y, &row) in rows.iter().enumerate() {
			for x in 0 .. 7 {
				assert_eq!(m.get_module(x, y as i32), row & (0x40 >> x) != 0, "({}, {})", x, y);
				assert!(m.is_function(x, y as i32));
			}
		}
	}

	#[test]
	fn other_finders_are_mirrored() {
		let m = ModuleMatrix::with_function_patterns(Version::new(5));
		let s = m.size();
		let tl = finder_at(&m, 0, 0);
		let tr = finder_at(&m, s - 7, 0);
		let bl = finder_at(&m, 0, s - 7);
		let br = finder_at(&m, s - 7, s - 7);
		let mirror_x: Vec<bool> = (0 .. 49).map(|i| tl[(i / 7) * 7 + 6 - i % 7]).collect();
		let mirror_xy: Vec<bool> = (0 .. 49).map(|i| tl[(6 - i / 7) * 7 + 6 - i % 7]).collect();
		assert_eq!(tr, mirror_x);
		assert_eq!(bl, mirror_x);
		assert_eq!(br, mirror_xy);
	}

	#[test]
	fn function_regions_do_not_depend_on_data() {
		for v in [1u8, 4, 20, 84] {
			let ver = Version::new(v);
			let a = ModuleMatrix::with_function_patterns(ver);
			let b = ModuleMatrix::with_function_patterns(ver);
			assert_eq!(a, b);
			let s = a.size();
			for i in 0 .. 9 {
				assert!(a.is_function(i, 8) && a.is_function(8, i));
				assert!(a.is_function(s - 1 - i, s - 9) && a.is_function(s - 9, s - 1 - i));
			}
		}
	}

	#[test]
	fn small_versions_have_no_alignment_patterns() {
		for v in 1 ..= 3 {
			let m = ModuleMatrix::with_function_patterns(Version::new(v));
			let fixed: usize = 4 * (49 + 15 + 17);
			assert_eq!(m.modules().iter().filter(|m| m.is_function()).count(), fixed);
		}
		let m = ModuleMatrix::with_function_patterns(Version::new(4));
		assert!(m.modules().iter().filter(|m| m.is_function()).count() > 4 * (49 + 15 + 17));
	}

	#[test]
	fn alignment_regions_tile_each_side() {
		for v in 4 ..= 84 {
			let ver = Version::new(v);
			let k: i32 = ModuleMatrix::alignment_get(&ALIGNMENT_K, ver);
			let r: i32 = ModuleMatrix::alignment_get(&ALIGNMENT_R, ver);
			let m: i32 = ModuleMatrix::alignment_get(&ALIGNMENT_M, ver);
			assert_eq!(k * m + r, ver.size(), "v{}", v);
		}
		assert_eq!(ModuleMatrix::alignment_get(&ALIGNMENT_K, Version::new(4)), 14);
		assert_eq!(ModuleMatrix::alignment_get(&ALIGNMENT_R, Version::MAX), 27);
		assert_eq!(ModuleMatrix::alignment_get(&ALIGNMENT_M, Version::MAX), 9);
	}

	#[test]
	fn version_four_alignment_layout() {
		let m = ModuleMatrix::with_function_patterns(Version::new(4));
		// L pattern hanging from the top edge, its corner at (size - 1 - k, 0)
		assert!(m.get_module(14, 0) && m.is_function(14, 0));
		assert!(m.get_module(14, 13));
		assert!(m.is_function(13, 1) && !m.get_module(13, 1));
		// assistant patterns: a dark centre ringed by light cells
		assert!(m.get_module(0, 14) && !m.get_module(1, 14));
		assert!(m.get_module(14, 28) && !m.get_module(14, 27));
		assert_eq!(m.count_free(), 421);
	}

	#[test]
	fn codewords_fill_every_free_cell() {
		for v in [1u8, 9, 30] {
			let ver = Version::new(v);
			let mut m = ModuleMatrix::with_function_patterns(ver);
			let data: Vec<u8> = (0 .. ver.total_codewords()).map(|i| i as u8).collect();
			m.draw_codewords(&data);
			assert!(m.is_complete());
		}
	}

	#[test]
	fn all_dark_stream_leaves_remainder_light() {
		let ver = Version::new(1);
		let mut m = ModuleMatrix::with_function_patterns(ver);
		m.draw_codewords(&vec![0xFF; ver.total_codewords()]);
		let data_dark: usize = m.modules().iter().filter(|&&c| c == Module::Dark).count();
		let data_light: usize = m.modules().iter().filter(|&&c| c == Module::Light).count();
		assert_eq!(data_dark, ver.total_codewords() * 8);
		assert_eq!(data_light, ver.remainder_bits());
	}

	#[test]
	fn mask_leaves_function_cells_alone() {
		let ver = Version::new(6);
		let mut m = ModuleMatrix::with_function_patterns(ver);
		m.draw_codewords(&vec![0; ver.total_codewords()]);
		let before = m.clone();
		m.apply_mask(Mask::new(1));
		for (a, b) in before.modules().iter().zip(m.modules()) {
			if a.is_function() {
				assert_eq!(a, b);
			}
		}
		m.apply_mask(Mask::new(1));
		assert_eq!(m, before);
	}

	#[test]
	fn format_bits_round_trip_through_the_grid() {
		let ver = Version::new(12);
		let mut m = ModuleMatrix::with_function_patterns(ver);
		m.draw_format_bits(ver, HxEcl::L3, Mask::new(6));
		assert_eq!(m.read_format_bits(), function_information(ver, HxEcl::L3, Mask::new(6)));
	}

	#[test]
	fn function_information_layout() {
		let bits = function_information(Version::new(1), HxEcl::L2, Mask::new(5));
		let nibble = |n: usize| (0 .. 4).fold(0u8, |acc, i| acc << 1 | u8::from(bits[n * 4 + i]));
		assert_eq!(nibble(0), 1);
		assert_eq!(nibble(1), 5);
		assert_eq!(nibble(2), 1 << 2 | 1);
		assert_eq!(nibble(3), 1);
		assert!(!bits[32] && bits[33]);
	}

	#[test]
	fn picket_fence_takes_every_thirteenth() {
		let stream: Vec<u8> = (0 .. 27).collect();
		let fence = picket_fence(&stream);
		assert_eq!(&fence[.. 3], &[0, 13, 26]);
		assert_eq!(&fence[3 .. 5], &[1, 14]);
		assert_eq!(fence.len(), 27);
	}
}
