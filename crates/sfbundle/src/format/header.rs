//! Manifest header.
//!
//! The manifest starts with two version numbers. Everything after them depends on the major
//! version, so the version is decoded first, checked, and then passed as context to decode the
//! rest of the header and every entry record.
//!
//! ```text
//! u32     major version
//! u32     minor version
//! i32     entry count
//! string  bundle identifier
//! [major >= 2]
//!   i64   deps.json offset
//!   i64   deps.json size
//!   i64   runtimeconfig.json offset
//!   i64   runtimeconfig.json size
//!   u64   flags
//! ```

use std::fmt;

use deku::{
	bitvec::{BitVec, Msb0},
	ctx::Endian,
	prelude::*,
};

use super::{
	constants::{MAX_MAJOR_VERSION, MIN_MAJOR_VERSION},
	strings::{read_prefixed_string, write_prefixed_string},
};

/// Manifest format version.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct BundleVersion {
	/// Major version. Decides the layout of everything that follows.
	#[deku(bytes = "4")]
	pub major: u32,

	/// Minor version.
	#[deku(bytes = "4")]
	pub minor: u32,
}

impl BundleVersion {
	/// Length of the version on the wire.
	pub const LENGTH: usize = 8;

	/// Whether this crate knows how to read manifests of this version.
	pub const fn is_supported(self) -> bool {
		self.major >= MIN_MAJOR_VERSION && self.major <= MAX_MAJOR_VERSION
	}

	/// Whether the header carries the [`AuxiliaryFields`].
	pub const fn has_auxiliary_fields(self) -> bool {
		self.major >= 2
	}

	/// Whether entry records carry a compressed size.
	pub const fn has_compressed_size(self) -> bool {
		self.major >= 6
	}

	/// Encode the version alone.
	pub fn to_vec(self) -> Result<Vec<u8>, DekuError> {
		let mut output = BitVec::<u8, Msb0>::new();
		self.write(&mut output, Endian::Little)?;
		Ok(output.into_vec())
	}
}

impl fmt::Display for BundleVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

/// Header fields describing the deps.json and runtimeconfig.json files, plus flags.
///
/// These are carried as-is and never interpreted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct AuxiliaryFields {
	/// Offset of the deps.json file.
	#[deku(bytes = "8")]
	pub deps_json_offset: i64,

	/// Size of the deps.json file.
	#[deku(bytes = "8")]
	pub deps_json_size: i64,

	/// Offset of the runtimeconfig.json file.
	#[deku(bytes = "8")]
	pub runtime_config_json_offset: i64,

	/// Size of the runtimeconfig.json file.
	#[deku(bytes = "8")]
	pub runtime_config_json_size: i64,

	/// Bundle flags.
	#[deku(bytes = "8")]
	pub flags: u64,
}

/// Manifest header.
///
/// Decode with the [`BundleVersion`] that precedes it as context; the version is stored in the
/// struct but not read or written again as part of it.
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(
	endian = "endian",
	ctx = "endian: deku::ctx::Endian, bundle_version: BundleVersion"
)]
pub struct ManifestHeader {
	/// Manifest format version.
	#[deku(skip, default = "bundle_version")]
	pub version: BundleVersion,

	/// Number of entry records following the header.
	#[deku(bytes = "4")]
	pub entry_count: i32,

	/// Bundle identifier.
	#[deku(
		reader = "read_prefixed_string(deku::rest)",
		writer = "write_prefixed_string(deku::output, &self.bundle_id)"
	)]
	pub bundle_id: String,

	/// Auxiliary fields, present from major version 2.
	#[deku(cond = "bundle_version.has_auxiliary_fields()")]
	pub auxiliary: Option<AuxiliaryFields>,
}

impl ManifestHeader {
	/// Create a header with no entries.
	///
	/// The auxiliary fields are zeroed if the version has them.
	pub fn new(version: BundleVersion, bundle_id: impl Into<String>) -> Self {
		Self {
			version,
			entry_count: 0,
			bundle_id: bundle_id.into(),
			auxiliary: version
				.has_auxiliary_fields()
				.then(AuxiliaryFields::default),
		}
	}

	/// Encode the full header, version included.
	pub fn to_vec(&self) -> Result<Vec<u8>, DekuError> {
		if self.auxiliary.is_some() != self.version.has_auxiliary_fields() {
			return Err(DekuError::InvalidParam(format!(
				"auxiliary fields must be present iff major version >= 2 (version {})",
				self.version
			)));
		}

		let mut output = BitVec::<u8, Msb0>::new();
		self.version.write(&mut output, Endian::Little)?;
		self.write(&mut output, (Endian::Little, self.version))?;
		Ok(output.into_vec())
	}
}
