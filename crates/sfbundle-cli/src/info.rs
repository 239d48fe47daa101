use std::{fs::File, io::BufReader, path::PathBuf};

use clap::{Parser, ValueHint};
use miette::IntoDiagnostic;
use sfbundle::decode::Decoder;
use tracing::info;

#[derive(Debug, Clone, Parser)]
pub struct InfoArgs {
	/// Bundle file.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub input: PathBuf,
}

pub(crate) fn info(args: InfoArgs) -> miette::Result<()> {
	info!(path=?args.input, "open input file");
	let mut file = BufReader::new(File::open(&args.input).into_diagnostic()?);

	info!("initialise decoder");
	let decoder = Decoder::open(&mut file)?;
	let header = decoder.header();

	println!("version: {}", header.version);
	println!("bundle id: {}", header.bundle_id);
	println!("entries: {}", header.entry_count);
	println!("manifest offset: {}", decoder.location().manifest_offset);
	if let Some(aux) = &header.auxiliary {
		println!(
			"deps.json: offset {} size {}",
			aux.deps_json_offset, aux.deps_json_size
		);
		println!(
			"runtimeconfig.json: offset {} size {}",
			aux.runtime_config_json_offset, aux.runtime_config_json_size
		);
		println!("flags: {:#x}", aux.flags);
	}

	Ok(())
}
