/// Growable sequence of bits, most significant bit of every field first.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct BitBuffer(pub Vec<bool>);

impl BitBuffer {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn append_bits(&mut self, val: u32, len: u8) {
		assert!(len <= 31 && val >> len == 0, "Value out of range");
		self.0.extend((0 .. i32::from(len)).rev().map(|i| get_bit(val, i)));
	}

	pub fn append(&mut self, other: &BitBuffer) {
		self.0.extend_from_slice(&other.0);
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Packs the bits into bytes; a trailing partial byte is zero-filled.
	pub fn to_codewords(&self) -> Vec<u8> {
		let mut result = vec![0u8; (self.0.len() + 7) / 8];
		for (i, &bit) in self.0.iter().enumerate() {
			result[i >> 3] |= u8::from(bit) << (7 - (i & 7));
		}
		result
	}
}

pub(crate) fn get_bit(x: u32, i: i32) -> bool {
	(x >> i) & 1 != 0
}
