use std::{fs::File, io::BufReader, path::PathBuf};

use clap::{Parser, ValueHint};
use miette::IntoDiagnostic;
use regex::Regex;
use sfbundle::decode::Decoder;
use tracing::info;

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
	/// Bundle file.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub input: PathBuf,

	/// Show the type, offset, size, and compressed size of each file.
	#[arg(long, short)]
	pub long: bool,

	/// Filter files by path (with a regex).
	///
	/// Can be given multiple times, and files will be matched if they match any of the regexes.
	#[arg(long, value_name = "REGEX")]
	pub filter: Vec<Regex>,
}

pub(crate) fn list(args: ListArgs) -> miette::Result<()> {
	info!(path=?args.input, "open input file");
	let mut file = BufReader::new(File::open(&args.input).into_diagnostic()?);

	info!("initialise decoder");
	let mut decoder = Decoder::open(&mut file)?;

	info!("list files");
	for entry in decoder.entries()? {
		let entry = entry?;
		if !args.filter.is_empty()
			&& !args
				.filter
				.iter()
				.any(|filter| filter.is_match(&entry.relative_path))
		{
			continue;
		}

		if args.long {
			println!(
				"{:<18} {:>12} {:>12} {:>12}  {}",
				entry.file_type.to_string(),
				entry.offset,
				entry.size,
				entry.compressed_size(),
				entry.relative_path
			);
		} else {
			println!("{}", entry.relative_path);
		}
	}

	Ok(())
}
