extern crate fast_hanxin;
use fast_hanxin::{EncodeOptions, HanXin, HxEcl, HxError, Mask, Version};
use tracing_subscriber::EnvFilter;

fn print_hanxin(symbol: &HanXin) {
	let border: i32 = 3;
	for y in -border .. symbol.size() + border {
		for x in -border .. symbol.size() + border {
			let c: char = if symbol.get_module(x, y) { '█' } else { ' ' };
			print!("{0}{0}", c);
		}
		println!();
	}
	println!();
}

fn do_basic_demo() -> Result<(), HxError> {
	let symbol: HanXin = HanXin::encode_text("Hello, 汉信码!", HxEcl::L2)?;
	println!("version {} level {} mask {}", symbol.version().value(),
		symbol.error_correction_level().value(), symbol.mask().value());
	print_hanxin(&symbol);
	Ok(())
}

fn do_common_data_demo() -> Result<(), HxError> {
	let mut version: i32 = 0;
	let mut ecl: i32 = 0;
	let symbol: HanXin = HanXin::encode_from_common_data("3141592653589793238462643383", &mut version, &mut ecl)?;
	println!("auto version {} level {}", version, ecl);
	print_hanxin(&symbol);
	Ok(())
}

fn do_options_demo() -> Result<(), HxError> {
	let opts = EncodeOptions {
		ecl: Some(HxEcl::L3),
		min_version: Version::new(5),
		boost_ecl: false,
		mask: Some(Mask::new(2)),
		..EncodeOptions::default()
	};
	let symbol: HanXin = HanXin::encode_with_options(b"https://example.com/hanxin", &opts)?;
	print_hanxin(&symbol);
	Ok(())
}

pub fn main() -> Result<(), HxError> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	do_basic_demo()?;
	do_common_data_demo()?;
	do_options_demo()?;
	Ok(())
}
