use std::{fs::File, io::BufReader, path::PathBuf};

use clap::{Parser, ValueHint};
use miette::IntoDiagnostic;
use sfbundle::decode::locate;
use tracing::info;

#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
	/// File to check.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub input: PathBuf,
}

pub(crate) fn detect(args: DetectArgs) -> miette::Result<()> {
	info!(path=?args.input, "open input file");
	let mut file = BufReader::new(File::open(&args.input).into_diagnostic()?);

	info!("scan for signature");
	let Some(location) = locate(&mut file)? else {
		println!("bundle: no");
		return Ok(());
	};

	println!("bundle: yes");
	println!("signature: {}", location.signature_position);
	println!("back-pointer: {}", location.back_pointer_position);
	if location.has_manifest() {
		println!("manifest: {}", location.manifest_offset);
	} else {
		println!("manifest: none");
	}

	Ok(())
}
