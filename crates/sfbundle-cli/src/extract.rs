use std::{
	fs::File,
	io::{stdout, BufReader, BufWriter, Write},
	path::PathBuf,
};

use clap::{Parser, ValueHint};
use miette::IntoDiagnostic;
use sfbundle::decode::Decoder;
use tracing::info;

use crate::append::staging_file;

#[derive(Debug, Clone, Parser)]
pub struct ExtractArgs {
	/// Bundle file.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "BUNDLE",
	)]
	pub input: PathBuf,

	/// Path of the file inside the bundle.
	///
	/// Matched without regard to case. If several files match, the first one is extracted.
	#[arg(value_name = "PATH")]
	pub path: String,

	/// Where to write the file.
	///
	/// Defaults to standard output.
	#[arg(long, short,
		value_hint = ValueHint::FilePath,
		value_name = "FILE",
	)]
	pub output: Option<PathBuf>,
}

pub(crate) fn extract(args: ExtractArgs) -> miette::Result<()> {
	info!(path=?args.input, "open input file");
	let mut file = BufReader::new(File::open(&args.input).into_diagnostic()?);

	info!("initialise decoder");
	let mut decoder = Decoder::open(&mut file)?;

	if let Some(output) = &args.output {
		let mut staging = staging_file(output)?;
		{
			let mut writer = BufWriter::new(staging.as_file_mut());
			let entry = decoder.extract(&args.path, &mut writer)?;
			info!(?entry, "extracted");
			writer.flush().into_diagnostic()?;
		}

		info!(path=?output, "write output file");
		staging.persist(output).into_diagnostic()?;
	} else {
		let mut writer = BufWriter::new(stdout().lock());
		let entry = decoder.extract(&args.path, &mut writer)?;
		info!(?entry, "extracted");
		writer.flush().into_diagnostic()?;
	}

	Ok(())
}
