use fast_hanxin::{
	Charset, EncodeOptions, HanXin, HxEcl, HxError, HxMode, HxSegment, Mask, Version, AUTO_MASK,
};

// Rows of the top-left finder, most significant of the low 7 bits is column 0
const FINDER_ROWS: [u8; 7] = [0x7F, 0x40, 0x5F, 0x50, 0x57, 0x57, 0x57];

fn pinned(version: u8, ecl: HxEcl, mask: u8) -> EncodeOptions {
	EncodeOptions {
		ecl: Some(ecl),
		min_version: Version::new(version),
		max_version: Version::new(version),
		boost_ecl: false,
		mask: Some(Mask::new(mask)),
		..EncodeOptions::default()
	}
}

#[test]
fn hello_at_level_two_picks_version_one() {
	let mut version: i32 = 0;
	let mut ecl: i32 = 2;
	let symbol = HanXin::encode(b"HELLO", &mut version, &mut ecl, 0, AUTO_MASK).unwrap();
	assert_eq!(version, 1);
	assert_eq!(ecl, 2);
	assert_eq!(symbol.size(), 23);
	assert_eq!(symbol.error_correction_level(), HxEcl::L2);
	assert!(symbol.matrix().is_complete());
}

#[test]
fn automatic_level_is_reported_back() {
	let mut version: i32 = 0;
	let mut ecl: i32 = 0;
	let symbol = HanXin::encode_from_common_data("HELLO", &mut version, &mut ecl).unwrap();
	assert_eq!(version, 1);
	assert_eq!(ecl, 4);
	assert_eq!(i32::from(symbol.error_correction_level().value()), ecl);
}

#[test]
fn empty_input_is_rejected_everywhere() {
	let mut version: i32 = 0;
	let mut ecl: i32 = 0;
	assert_eq!(HanXin::encode(b"", &mut version, &mut ecl, 0, AUTO_MASK), Err(HxError::InputEmpty));
	assert_eq!(HanXin::encode_from_common_data("", &mut version, &mut ecl), Err(HxError::InputEmpty));
	assert_eq!(HanXin::encode_text("", HxEcl::L1), Err(HxError::InputEmpty));
	assert_eq!(HanXin::encode_binary(&[], HxEcl::L1), Err(HxError::InputEmpty));
	assert_eq!(HanXin::encode_with_options(b"", &EncodeOptions::default()), Err(HxError::InputEmpty));
	assert_eq!((version, ecl), (0, 0));
}

#[test]
fn pinned_version_never_upgrades() {
	let data = vec![0xFFu8; 40];
	let mut version: i32 = 1;
	let mut ecl: i32 = 4;
	let err = HanXin::encode(&data, &mut version, &mut ecl, 0, AUTO_MASK).unwrap_err();
	assert!(matches!(err, HxError::CapacityExceeded { version: 1, ecl: 4, .. }), "{:?}", err);
	assert_eq!((version, ecl), (1, 4));

	// the same data is fine once the version is left open
	let mut version: i32 = 0;
	assert!(HanXin::encode(&data, &mut version, &mut ecl, 0, AUTO_MASK).is_ok());
	assert!(version > 1);
}

#[test]
fn out_of_range_arguments() {
	let mut ecl: i32 = 0;
	assert_eq!(HanXin::encode(b"1", &mut 85, &mut ecl, 0, AUTO_MASK), Err(HxError::InvalidVersion(85)));
	assert_eq!(HanXin::encode(b"1", &mut -1, &mut ecl, 0, AUTO_MASK), Err(HxError::InvalidVersion(-1)));
	assert_eq!(HanXin::encode(b"1", &mut 0, &mut 5, 0, AUTO_MASK), Err(HxError::InvalidEcl(5)));
	assert_eq!(HanXin::encode(b"1", &mut 0, &mut ecl, 0, 8), Err(HxError::InvalidMask(8)));
	assert_eq!(HanXin::encode(b"1", &mut 0, &mut ecl, 14, AUTO_MASK), Err(HxError::UnsupportedEci(14)));
}

#[test]
fn largest_version_overflows_cleanly() {
	let data = vec![0x80u8; Version::MAX.data_codewords(HxEcl::L1) + 1];
	let err = HanXin::encode_binary(&data, HxEcl::L1).unwrap_err();
	assert!(matches!(err, HxError::CapacityExceeded { version: 84, ecl: 1, .. }), "{:?}", err);
}

#[test]
fn chinese_text_uses_region_mode() {
	let (bytes, charset) = Charset::default().encode_text("汉信码");
	let segs = HxSegment::make_segments(&bytes, &charset).unwrap();
	assert_eq!(segs.iter().map(HxSegment::mode).collect::<Vec<_>>(), vec![HxMode::Region1]);
	let symbol = HanXin::encode_text("汉信码", HxEcl::L2).unwrap();
	assert_eq!(symbol.version(), Version::MIN);
}

#[test]
fn declared_eci_is_announced() {
	let opts = EncodeOptions { charset: Charset::from_eci(26).unwrap(), ..EncodeOptions::default() };
	let (bytes, charset) = opts.charset.encode_text("ünïcödé");
	let segs = HxSegment::make_segments(&bytes, &charset).unwrap();
	assert_eq!(segs[0].mode(), HxMode::Eci);
	assert!(HanXin::encode_text_with_options("ünïcödé", &opts).is_ok());
}

#[test]
fn finders_sit_in_the_corners_for_every_payload() {
	for &v in &[1u8, 4, 11, 40, 84] {
		let a = HanXin::encode_with_options(b"0123456789", &pinned(v, HxEcl::L1, 0)).unwrap();
		let b = HanXin::encode_with_options(&[0xA5; 8], &pinned(v, HxEcl::L1, 7)).unwrap();
		let s: i32 = a.size();
		for y in 0 .. 7 {
			for x in 0 .. 7 {
				let dark: bool = FINDER_ROWS[y as usize] & (0x40 >> x) != 0;
				for symbol in [&a, &b] {
					assert_eq!(symbol.get_module(x, y), dark);
					assert_eq!(symbol.get_module(s - 1 - x, y), dark);
					assert_eq!(symbol.get_module(s - 1 - x, s - 1 - y), dark);
					assert!(symbol.matrix().is_function(x, s - 1 - y));
				}
			}
		}
	}
}

#[test]
fn function_information_cells_are_fixed() {
	let options = pinned(9, HxEcl::L3, 5);
	let a = HanXin::encode_with_options(b"HANXIN", &options).unwrap();
	let b = HanXin::encode_with_options(&[0x00, 0xFF, 0x10, 0x20], &options).unwrap();
	assert_eq!(a.matrix().read_format_bits(), b.matrix().read_format_bits());
	let s: i32 = a.size();
	for i in 0 .. 9 {
		for &(x, y) in &[(i, 8), (8, i), (s - 1 - i, 8), (s - 9, i), (8, s - 1 - i), (i, s - 9),
				(s - 1 - i, s - 9), (s - 9, s - 1 - i)] {
			assert!(a.matrix().is_function(x, y), "({}, {})", x, y);
			assert_eq!(a.get_module(x, y), b.get_module(x, y), "({}, {})", x, y);
		}
	}
}

#[test]
fn advisory_minimum_is_raised_when_needed() {
	let opts = EncodeOptions { min_version: Version::new(2), ..EncodeOptions::default() };
	let data = vec![0xFFu8; Version::new(5).data_codewords(HxEcl::L2)];
	let symbol = HanXin::encode_with_options(&data, &opts).unwrap();
	assert!(symbol.version() > Version::new(5));
	let small = HanXin::encode_with_options(b"1", &opts).unwrap();
	assert_eq!(small.version(), Version::new(2));
}

#[test]
fn byte_matrix_is_rows_of_bits() {
	let symbol = HanXin::encode_text("Han Xin", HxEcl::L2).unwrap();
	let rows = symbol.to_byte_matrix();
	assert_eq!(rows.len(), symbol.size() as usize);
	for (y, row) in rows.iter().enumerate() {
		assert_eq!(row.len(), symbol.size() as usize);
		for (x, &cell) in row.iter().enumerate() {
			assert_eq!(cell == 1, symbol.get_module(x as i32, y as i32));
		}
	}
}
