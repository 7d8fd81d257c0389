use once_cell::sync::Lazy;

use crate::version::{BlockLayout, HxEcl, Version};

/// Log/antilog tables of GF(2^m) for a primitive polynomial, built once and only read afterwards.
#[derive(Debug)]
pub struct GaloisField {
	exp: Vec<u8>,
	log: Vec<u8>,
	order: usize,
}

/// Field of the data codewords, x^8 + x^6 + x^5 + x + 1.
pub static GF256: Lazy<GaloisField> = Lazy::new(|| GaloisField::new(0x163, 8));

/// Field of the function-information nibbles, x^4 + x + 1.
pub static GF16: Lazy<GaloisField> = Lazy::new(|| GaloisField::new(0x13, 4));

impl GaloisField {
	fn new(poly: u32, bits: u32) -> Self {
		let order: usize = (1 << bits) - 1;
		let mut exp = vec![0u8; order * 2];
		let mut log = vec![0u8; order + 1];
		let mut x: u32 = 1;
		for i in 0 .. order {
			exp[i] = x as u8;
			log[x as usize] = i as u8;
			x <<= 1;
			if x >> bits != 0 {
				x ^= poly;
			}
		}
		debug_assert_eq!(x, 1, "Polynomial is not primitive");
		for i in order .. order * 2 {
			exp[i] = exp[i - order];
		}
		Self { exp, log, order }
	}

	/// Number of non-zero elements.
	pub fn order(&self) -> usize {
		self.order
	}

	/// alpha^i
	pub fn exp(&self, i: usize) -> u8 {
		self.exp[i % self.order]
	}

	pub fn multiply(&self, x: u8, y: u8) -> u8 {
		if x == 0 || y == 0 {
			0
		} else {
			self.exp[usize::from(self.log[usize::from(x)]) + usize::from(self.log[usize::from(y)])]
		}
	}
}

/// Systematic Reed-Solomon encoder with generator roots alpha^1 ..= alpha^degree.
pub struct ReedSolomon {
	field: &'static GaloisField,
	divisor: Vec<u8>,
}

impl ReedSolomon {
	pub fn new(field: &'static GaloisField, degree: usize) -> Self {
		Self {
			field,
			divisor: ReedSolomon::compute_divisor(field, degree),
		}
	}

	/// Generator coefficients from highest to lowest power, leading 1 omitted.
	fn compute_divisor(field: &GaloisField, degree: usize) -> Vec<u8> {
		assert!((1 ..= field.order()).contains(&degree), "Degree out of range");
		let mut result = vec![0u8; degree - 1];
		result.push(1);
		let mut root: u8 = field.exp(1);
		for _ in 0 .. degree {
			// Multiply the current product by (x - r)
			for j in 0 .. degree {
				result[j] = field.multiply(result[j], root);
				if j + 1 < result.len() {
					result[j] ^= result[j + 1];
				}
			}
			root = field.multiply(root, field.exp(1));
		}
		result
	}

	pub fn degree(&self) -> usize {
		self.divisor.len()
	}

	pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
		let mut result = vec![0u8; self.divisor.len()];
		for b in data {
			let factor: u8 = b ^ result.remove(0);
			result.push(0);
			for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
				*x ^= self.field.multiply(y, factor);
			}
		}
		result
	}
}

/// Data codewords of one block with their parity.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CodewordBlock {
	pub data: Vec<u8>,
	pub ecc: Vec<u8>,
}

/// Cuts `data` into the blocks of `layout` and computes each block's parity.
pub fn split_blocks(data: &[u8], layout: &BlockLayout) -> Vec<CodewordBlock> {
	assert_eq!(data.len(), layout.data_codewords, "Illegal argument");
	let rs = ReedSolomon::new(&GF256, layout.ecc_per_block);
	let mut blocks = Vec::<CodewordBlock>::with_capacity(layout.num_blocks);
	let mut k: usize = 0;
	for i in 0 .. layout.num_blocks {
		let datlen: usize = layout.data_len(i);
		let dat: Vec<u8> = data[k .. k + datlen].to_vec();
		k += datlen;
		let ecc: Vec<u8> = rs.compute_remainder(&dat);
		blocks.push(CodewordBlock { data: dat, ecc });
	}
	blocks
}

/// Data codewords of all blocks round-robin, then parity codewords the same way.
pub fn interleave(blocks: &[CodewordBlock]) -> Vec<u8> {
	let total: usize = blocks.iter().map(|b| b.data.len() + b.ecc.len()).sum();
	let mut result = Vec::<u8>::with_capacity(total);
	let maxdata: usize = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
	for i in 0 .. maxdata {
		result.extend(blocks.iter().filter_map(|b| b.data.get(i)));
	}
	let maxecc: usize = blocks.iter().map(|b| b.ecc.len()).max().unwrap_or(0);
	for i in 0 .. maxecc {
		result.extend(blocks.iter().filter_map(|b| b.ecc.get(i)));
	}
	result
}

pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: HxEcl) -> Vec<u8> {
	let layout: BlockLayout = ver.block_layout(ecl);
	let result: Vec<u8> = interleave(&split_blocks(data, &layout));
	debug_assert_eq!(result.len(), ver.total_codewords());
	result
}
