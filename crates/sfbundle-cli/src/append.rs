use std::{
	fs::{metadata, File},
	io::{BufReader, BufWriter, Write},
	path::{Path, PathBuf},
};

use clap::{Parser, ValueHint};
use miette::IntoDiagnostic;
use sfbundle::encode::Appender;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Parser)]
pub struct AppendArgs {
	/// Bundle file to start from.
	///
	/// It's only read from: the new bundle is written to '--output', which may be the same file.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "BUNDLE",
	)]
	pub input: PathBuf,

	/// File to add.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "RESOURCE",
	)]
	pub resource: PathBuf,

	/// Path to give the file inside the bundle.
	#[arg(long = "as", value_name = "PATH")]
	pub as_path: String,

	/// Where to write the new bundle.
	///
	/// The bundle is written to a temporary file next to this one first, and only moved into
	/// place once it's complete.
	#[arg(long, short,
		value_hint = ValueHint::FilePath,
		value_name = "FILE",
	)]
	pub output: PathBuf,
}

pub(crate) fn append(args: AppendArgs) -> miette::Result<()> {
	info!(path=?args.input, "open input file");
	let mut source = BufReader::new(File::open(&args.input).into_diagnostic()?);
	let permissions = metadata(&args.input).into_diagnostic()?.permissions();

	info!(path=?args.resource, "open resource file");
	let mut resource = BufReader::new(File::open(&args.resource).into_diagnostic()?);

	let mut staging = staging_file(&args.output)?;
	{
		let mut target = BufWriter::new(staging.as_file_mut());
		let entry = Appender::new().append(&mut source, &mut target, &mut resource, &args.as_path)?;
		info!(?entry, "appended");
		target.flush().into_diagnostic()?;
	}

	staging
		.as_file()
		.set_permissions(permissions)
		.into_diagnostic()?;

	info!(path=?args.output, "write output file");
	staging.persist(&args.output).into_diagnostic()?;
	Ok(())
}

/// Temporary file in the same directory as `output`, so it can be renamed over it.
///
/// It's deleted if dropped without being persisted.
pub(crate) fn staging_file(output: &Path) -> miette::Result<NamedTempFile> {
	let dir = match output.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let staging = NamedTempFile::new_in(dir).into_diagnostic()?;
	debug!(path=?staging.path(), "created staging file");
	Ok(staging)
}
