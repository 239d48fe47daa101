#![warn(clippy::unwrap_used)]
#![deny(rust_2018_idioms)]

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::{debug, warn};

use crate::args::Action;

mod append;
mod args;
mod detect;
mod extract;
mod info;
mod list;
mod logs;

fn main() -> miette::Result<()> {
	let logs_on = logs::from_env().into_diagnostic()?;

	debug!("parsing arguments");
	let args = args::Args::parse();

	if logs_on {
		warn!("ignoring logging options from args");
	} else {
		logs::from_args(&args).into_diagnostic()?;
	}

	debug!(?args, "got arguments");

	match args.action {
		Action::Detect(args) => detect::detect(args),
		Action::Info(args) => info::info(args),
		Action::List(args) => list::list(args),
		Action::Extract(args) => extract::extract(args),
		Action::Append(args) => append::append(args),
	}
}
