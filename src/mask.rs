#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::error::{HxError, HxResult};
use crate::matrix::ModuleMatrix;

/// Mask argument that asks for automatic selection.
pub const AUTO_MASK: i32 = -1;

const PENALTY_RUN: i32 = 4;
const PENALTY_BLOCK: i32 = 3;
const PENALTY_FINDER: i32 = 50;
const PENALTY_BALANCE: i32 = 10;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
	pub const COUNT: u8 = 8;

	pub fn new(mask: u8) -> Self {
		assert!(mask < Mask::COUNT, "Mask value out of range");
		Self(mask)
	}

	/// `AUTO_MASK` gives `None`, 0 to 7 a pinned mask.
	pub fn from_value(mask: i32) -> HxResult<Option<Self>> {
		match mask {
			AUTO_MASK => Ok(None),
			0 ..= 7 => Ok(Some(Self(mask as u8))),
			_ => Err(HxError::InvalidMask(mask)),
		}
	}

	pub fn value(self) -> u8 {
		self.0
	}

	/// Whether the data module at column `x`, row `y` is flipped. The formulas use
	/// 1-based row `i` and column `j`; mask 0 leaves the data untouched.
	pub fn invert(self, x: i32, y: i32) -> bool {
		let i: i32 = y + 1;
		let j: i32 = x + 1;
		match self.0 {
			0 => false,
			1 => (i + j) % 2 == 0,
			2 => ((i + j) % 3 + j % 3) % 2 == 0,
			3 => (i % j + j % i + i % 3 + j % 3) % 2 == 0,
			4 => (i / 2 + j / 3) % 2 == 0,
			5 => i * j % 2 + i * j % 3 == 0,
			6 => (i * j % 2 + i * j % 3) % 2 == 0,
			7 => (i * j % 3 + (i + j) % 2) % 2 == 0,
			_ => unreachable!(),
		}
	}
}

/// Penalty of a finished or candidate matrix; lower is better.
pub fn penalty_score(matrix: &ModuleMatrix) -> i32 {
	let size: i32 = matrix.size();
	let mut result: i32 = 0;
	for y in 0 .. size {
		result += line_penalty(size, |x| matrix.get_module(x, y));
	}
	for x in 0 .. size {
		result += line_penalty(size, |y| matrix.get_module(x, y));
	}

	for y in 0 .. size - 1 {
		for x in 0 .. size - 1 {
			let color: bool = matrix.get_module(x, y);
			if color == matrix.get_module(x + 1, y) &&
			   color == matrix.get_module(x, y + 1) &&
			   color == matrix.get_module(x + 1, y + 1) {
				result += PENALTY_BLOCK;
			}
		}
	}

	let dark: i32 = matrix.dark_count() as i32;
	let total: i32 = size * size;
	let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
	debug_assert!((0 ..= 9).contains(&k));
	result += k * PENALTY_BALANCE;
	result
}

/// Runs of three or more equal modules, and 1:1:1:1:3 / 3:1:1:1:1 patterns with three
/// light modules (or the symbol edge) on either side.
fn line_penalty(size: i32, module: impl Fn(i32) -> bool) -> i32 {
	let mut result: i32 = 0;

	let mut runcolor: bool = module(0);
	let mut run: i32 = 1;
	for p in 1 .. size {
		if module(p) == runcolor {
			run += 1;
		} else {
			if run >= 3 {
				result += run * PENALTY_RUN;
			}
			runcolor = module(p);
			run = 1;
		}
	}
	if run >= 3 {
		result += run * PENALTY_RUN;
	}

	let mut p: i32 = 0;
	while p + 7 <= size {
		if module(p) && module(p + 1) != module(p + 5) && module(p + 2) && !module(p + 3)
				&& module(p + 4) && module(p + 6) {
			let lightbefore: bool = (1 ..= 3).all(|d| p - d < 0 || !module(p - d));
			let lightafter: bool = (7 ..= 9).all(|d| p + d >= size || !module(p + d));
			if lightbefore || lightafter {
				result += PENALTY_FINDER;
			}
			p += 1;
		}
		p += 1;
	}
	result
}

/// Scores every mask over `matrix` (data placed, function information still blank) and
/// returns the lowest scoring one, the lowest index winning ties, with all scores.
pub(crate) fn choose_mask(matrix: &ModuleMatrix) -> (Mask, Vec<i32>) {
	let score = |i: u8| -> i32 {
		let mut candidate: ModuleMatrix = matrix.clone();
		candidate.apply_mask(Mask(i));
		penalty_score(&candidate)
	};
	#[cfg(feature = "parallel")]
	let scores: Vec<i32> = (0 .. Mask::COUNT).into_par_iter().map(score).collect();
	#[cfg(not(feature = "parallel"))]
	let scores: Vec<i32> = (0 .. Mask::COUNT).map(score).collect();

	let mut best: u8 = 0;
	for (i, &s) in scores.iter().enumerate() {
		trace!(mask = i, penalty = s, "mask candidate");
		if s < scores[usize::from(best)] {
			best = i as u8;
		}
	}
	(Mask(best), scores)
}
