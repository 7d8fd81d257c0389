use thiserror::Error;

pub type HxResult<T> = Result<T, HxError>;

/// Reasons an encode call can fail. No symbol is produced in any of these cases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HxError {
	#[error("input data is empty")]
	InputEmpty,

	#[error("unsupported character set: {0}")]
	UnsupportedCharset(String),

	#[error("unsupported ECI assignment value: {0}")]
	UnsupportedEci(u32),

	#[error("version {0} out of range (1 to 84)")]
	InvalidVersion(i32),

	#[error("error correction level {0} out of range (1 to 4)")]
	InvalidEcl(i32),

	#[error("mask index {0} out of range (0 to 7, or -1 for automatic)")]
	InvalidMask(i32),

	/// The data does not fit the largest version allowed at the requested level.
	#[error("data needs {needed} codewords, version {version} at level L{ecl} holds {capacity}")]
	CapacityExceeded {
		needed: usize,
		capacity: usize,
		version: u8,
		ecl: u8,
	},

	/// Bit packing overflowed the codeword budget of an already selected version.
	#[error("data length = {0} bits, max capacity = {1} bits")]
	DataTooLong(usize, usize),
}
