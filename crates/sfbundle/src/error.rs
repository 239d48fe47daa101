//! Error types for reading and appending to bundles.
use std::borrow::Cow;

use deku::DekuError;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::format::{BundleVersion, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION};

/// Convenience return type.
pub type Result<T> = std::result::Result<T, Error>;

/// Combined return error type.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
	/// I/O error.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Bundle error that's just a message.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Simple(#[from] SimpleError),

	/// Bundle error that includes source.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Source(#[from] SourceError),
}

impl Error {
	/// The kind of this error, if it's not an I/O error.
	pub fn kind(&self) -> Option<ErrorKind> {
		match self {
			Self::Io(_) => None,
			Self::Simple(err) => Some(err.kind),
			Self::Source(err) => Some(err.kind),
		}
	}

	/// Whether this error means the stream simply isn't a usable bundle.
	///
	/// Callers probing arbitrary files should branch on this rather than report it as a failure.
	pub fn is_detection_failure(&self) -> bool {
		matches!(
			self.kind(),
			Some(ErrorKind::NotABundle | ErrorKind::NoManifest)
		)
	}
}

/// Bundle error.
#[derive(Error, Diagnostic, Debug)]
#[error("bundle: {message}")]
pub struct SimpleError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,
}

/// Bundle error with a snippet of the offending bytes.
#[derive(Error, Diagnostic, Debug)]
#[error("bundle: {message}")]
pub struct SourceError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,

	/// Error location in the snippet.
	#[label("here")]
	pub at: SourceSpan,

	/// Snippet of the bundle, in hex.
	#[source_code]
	pub snippet: String,
}

impl SimpleError {
	/// New error without source.
	pub fn new(kind: ErrorKind) -> Self {
		Self {
			kind,
			message: kind.default_message(),
		}
	}

	/// New simple error from deku.
	pub fn from_deku(orig: DekuError) -> Self {
		Self::new(ErrorKind::Parse).with_message(format!("parse error: {orig}"))
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

impl SourceError {
	/// New error with source snippet.
	///
	/// `at_byte` and `length` select the bytes of the snippet to label.
	pub fn new(kind: ErrorKind, snippet: &[u8], at_byte: usize, length: usize) -> Self {
		Self {
			kind,
			message: kind.default_message(),
			snippet: format!("{snippet:02x?}"),
			at: SourceSpan::from((
				// each byte is printed as "xx, " and the snippet starts with "["
				(at_byte * 4) + 1,
				(length.max(1) * 4) - 2,
			)),
		}
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

/// Bundle error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The signature wasn't found: this isn't a bundle.
	NotABundle,

	/// The signature was found but the back-pointer is zero: the host carries no manifest.
	NoManifest,

	/// The back-pointer doesn't point inside the stream.
	BackPointerOutOfRange(i64),

	/// The back-pointer must come before the manifest for the manifest to be moved.
	BackPointerAfterManifest,

	/// Manifest major version outside of what this crate reads.
	UnsupportedVersion(BundleVersion),

	/// The manifest doesn't extend to the end of the stream, so it can't be appended to.
	ManifestNotAtEnd,

	/// No entry with that path.
	EntryNotFound,

	/// An entry's offset or size is unusable.
	InvalidEntry,

	/// A count or offset doesn't fit in its field.
	Overflow(&'static str),

	/// Parse error.
	Parse,
}

impl ErrorKind {
	/// Get the default error message for this error kind.
	pub fn default_message(self) -> Cow<'static, str> {
		match self {
			ErrorKind::NotABundle => Cow::Borrowed("not a bundle: signature not found"),
			ErrorKind::NoManifest => {
				Cow::Borrowed("no manifest: the signature is present but the back-pointer is zero")
			}
			ErrorKind::BackPointerOutOfRange(offset) => Cow::Owned(format!(
				"back-pointer is out of range: manifest offset {offset}"
			)),
			ErrorKind::BackPointerAfterManifest => {
				Cow::Borrowed("back-pointer lies after the manifest start")
			}
			ErrorKind::UnsupportedVersion(version) => Cow::Owned(format!(
				"unsupported manifest version {version}, this supports major versions {MIN_MAJOR_VERSION} to {MAX_MAJOR_VERSION}"
			)),
			ErrorKind::ManifestNotAtEnd => {
				Cow::Borrowed("manifest doesn't end the stream, refusing to append after it")
			}
			ErrorKind::EntryNotFound => Cow::Borrowed("no such entry"),
			ErrorKind::InvalidEntry => Cow::Borrowed("invalid entry"),
			ErrorKind::Overflow(what) => Cow::Owned(format!("{what} overflows")),
			ErrorKind::Parse => Cow::Borrowed("parse error"),
		}
	}
}

impl From<ErrorKind> for SimpleError {
	fn from(ek: ErrorKind) -> Self {
		Self::new(ek)
	}
}

impl From<ErrorKind> for Error {
	fn from(ek: ErrorKind) -> Self {
		Self::Simple(ek.into())
	}
}
