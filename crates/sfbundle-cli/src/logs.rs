use std::{
	env::var,
	fs::File,
	io::{Error, Result},
	path::{Path, PathBuf},
	sync::Mutex,
};

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::args::Args;

/// Set up logging from `RUST_LOG`, if it's set.
///
/// Returns whether logging was set up.
pub fn from_env() -> Result<bool> {
	if var("RUST_LOG").is_ok() {
		tracing_subscriber::fmt::try_init().map_err(Error::other)?;
		Ok(true)
	} else {
		Ok(false)
	}
}

/// Set up logging from the `-v` and `--log-file` options.
pub fn from_args(args: &Args) -> Result<()> {
	let Some(filter) = filter_for(args.verbose) else {
		return Ok(());
	};

	let log_file = args
		.log_file
		.as_deref()
		.map(|path| File::create(log_file_path(path)))
		.transpose()?;

	let mut builder = tracing_subscriber::fmt().with_env_filter(filter);
	if args.verbose > 2 {
		builder = builder.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);
	}

	let init = match log_file {
		Some(file) => builder.json().with_writer(Mutex::new(file)).try_init(),
		None if args.verbose > 3 => builder.pretty().try_init(),
		None => builder.try_init(),
	};

	match init {
		Ok(_) => info!("logging initialised"),
		Err(e) => eprintln!("Failed to initialise logging, continuing with none\n{e}"),
	}

	Ok(())
}

fn filter_for(verbosity: u8) -> Option<&'static str> {
	match verbosity {
		0 => None,
		1 => Some("warn"),
		2 => Some("info"),
		3 => Some("debug"),
		_ => Some("trace"),
	}
}

/// A directory gets a timestamped file inside it, anything else is used as-is.
fn log_file_path(path: &Path) -> PathBuf {
	if path.is_dir() {
		path.join(format!(
			"sfbundle.{}.log",
			chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ")
		))
	} else {
		path.to_owned()
	}
}
