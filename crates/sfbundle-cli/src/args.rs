use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::{
	append::AppendArgs, detect::DetectArgs, extract::ExtractArgs, info::InfoArgs, list::ListArgs,
};

/// Inspect and edit single-file application bundles.
#[derive(Debug, Clone, Parser)]
#[command(
	name = "sfbundle",
	bin_name = "sfbundle",
	author,
	version,
	after_help = "Want more detail? Try the long '--help' flag!",
	after_long_help = "Didn't expect this much output? Use the short '-h' flag to get short help."
)]
#[cfg_attr(debug_assertions, command(before_help = "⚠ DEBUG BUILD ⚠"))]
pub struct Args {
	/// Set diagnostic log level.
	///
	/// This enables diagnostic logging, which is useful for investigating bugs. Use multiple
	/// times to increase verbosity: '-v' shows warnings, '-vv' info, '-vvv' debug with span
	/// events, and '-vvvv' everything, pretty-printed.
	///
	/// If the RUST_LOG environment variable is set, it takes precedence over this.
	#[arg(long, short, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	/// Write diagnostic logs to a file.
	///
	/// Logs are written as JSON. If the path is a directory, a timestamped file is created in it.
	/// Has no effect without '-v'.
	#[arg(long,
		global = true,
		value_hint = ValueHint::AnyPath,
		value_name = "PATH",
	)]
	pub log_file: Option<PathBuf>,

	/// What to do.
	#[command(subcommand)]
	pub action: Action,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Action {
	/// Check whether a file is a bundle, and where its manifest is.
	Detect(DetectArgs),

	/// Show the manifest header of a bundle.
	Info(InfoArgs),

	/// List the files in a bundle.
	List(ListArgs),

	/// Extract one file from a bundle.
	Extract(ExtractArgs),

	/// Write a copy of a bundle with one more file in it.
	Append(AppendArgs),
}
