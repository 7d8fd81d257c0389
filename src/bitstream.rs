use crate::bits::BitBuffer;
use crate::error::{HxError, HxResult};
use crate::segment::{HxMode, HxSegment};

const BYTE_COUNT_BITS: u8 = 13;
// Region 1 / Region 2 terminator meaning "continue in the other region"
const REGION_SWITCH: u32 = 4094;
const PAD_CODEWORDS: [u32; 2] = [0xEC, 0x11];

fn switches_region(from: Option<HxMode>, to: Option<HxMode>) -> bool {
	matches!((from, to),
		(Some(HxMode::Region1), Some(HxMode::Region2)) | (Some(HxMode::Region2), Some(HxMode::Region1)))
}

/// Mode indicators, counts, payloads and mode terminators of all segments, in order.
pub fn encode_segments(segs: &[HxSegment]) -> BitBuffer {
	let mut bb = BitBuffer::new();
	for (i, seg) in segs.iter().enumerate() {
		let prev: Option<HxMode> = i.checked_sub(1).map(|p| segs[p].mode());
		let next: Option<HxMode> = segs.get(i + 1).map(HxSegment::mode);
		if !switches_region(prev, Some(seg.mode())) {
			bb.append_bits(seg.mode().mode_bits(), 4);
		}
		if seg.mode() == HxMode::Byte {
			bb.append_bits(seg.num_chars() as u32, BYTE_COUNT_BITS);
		}
		bb.0.extend_from_slice(seg.data());
		if let Some((value, width)) = seg.terminator() {
			let value: u32 = if switches_region(Some(seg.mode()), next) { REGION_SWITCH } else { value };
			bb.append_bits(value, width);
		}
	}
	bb
}

/// Appends the end-of-data indicator and padding so that exactly `capacity` codewords result.
pub fn make_codewords(mut bb: BitBuffer, capacity: usize) -> HxResult<Vec<u8>> {
	let capacitybits: usize = capacity * 8;
	if bb.len() > capacitybits {
		return Err(HxError::DataTooLong(bb.len(), capacitybits));
	}
	let numzerobits: usize = std::cmp::min(4, capacitybits - bb.len());
	bb.append_bits(0, numzerobits as u8);
	let numzerobits: usize = bb.len().wrapping_neg() & 7;
	bb.append_bits(0, numzerobits as u8);
	debug_assert_eq!(bb.len() % 8, 0);
	for &padbyte in PAD_CODEWORDS.iter().cycle() {
		if bb.len() >= capacitybits {
			break;
		}
		bb.append_bits(padbyte, 8);
	}
	let result: Vec<u8> = bb.to_codewords();
	debug_assert_eq!(result.len(), capacity);
	Ok(result)
}
