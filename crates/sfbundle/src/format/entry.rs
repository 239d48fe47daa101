//! Manifest entry records.
//!
//! ```text
//! i64     offset
//! i64     size
//! [major >= 6]
//!   i64   compressed size
//! u8      file type
//! string  relative path
//! ```

use std::fmt;

use deku::{
	bitvec::{BitVec, Msb0},
	ctx::Endian,
	prelude::*,
};

use super::{
	header::BundleVersion,
	strings::{read_prefixed_string, write_prefixed_string},
};

/// Kind of file embedded in the bundle.
///
/// This tells the host how the file will be used, it doesn't change how it's stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, DekuRead, DekuWrite)]
#[deku(endian = "endian", type = "u8", ctx = "endian: deku::ctx::Endian")]
pub enum FileType {
	/// Type not determined.
	#[deku(id = "0")]
	Unknown,

	/// IL or ReadyToRun assembly.
	#[deku(id = "1")]
	Assembly,

	/// Native binary.
	#[deku(id = "2")]
	NativeBinary,

	/// The `.deps.json` configuration file.
	#[deku(id = "3")]
	DepsJson,

	/// The `.runtimeconfig.json` configuration file.
	#[deku(id = "4")]
	RuntimeConfigJson,

	/// Debug symbols.
	#[deku(id = "5")]
	Symbols,
}

impl FileType {
	/// The byte value of this type on the wire.
	pub const fn to_byte(self) -> u8 {
		match self {
			Self::Unknown => 0,
			Self::Assembly => 1,
			Self::NativeBinary => 2,
			Self::DepsJson => 3,
			Self::RuntimeConfigJson => 4,
			Self::Symbols => 5,
		}
	}
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Unknown => "unknown",
			Self::Assembly => "assembly",
			Self::NativeBinary => "native",
			Self::DepsJson => "deps.json",
			Self::RuntimeConfigJson => "runtimeconfig.json",
			Self::Symbols => "symbols",
		})
	}
}

/// An entry record: one embedded file.
///
/// The layout depends on the manifest version, which is passed as decoding context.
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(
	endian = "endian",
	ctx = "endian: deku::ctx::Endian, bundle_version: BundleVersion"
)]
pub struct EntryRecord {
	/// Offset of the file's bytes from the start of the bundle.
	#[deku(bytes = "8")]
	pub offset: i64,

	/// Size of the file in bytes, as stored.
	#[deku(bytes = "8")]
	pub size: i64,

	/// Compressed size, present from major version 6.
	///
	/// Zero means the file is stored uncompressed. This crate never decompresses.
	#[deku(cond = "bundle_version.has_compressed_size()")]
	pub compressed_size: Option<i64>,

	/// File type.
	pub file_type: FileType,

	/// Path relative to the bundle, may contain directory separators.
	#[deku(
		reader = "read_prefixed_string(deku::rest)",
		writer = "write_prefixed_string(deku::output, &self.relative_path)"
	)]
	pub relative_path: String,
}

impl EntryRecord {
	/// Create a record laid out for the given version.
	///
	/// The compressed size is set to zero if the version has one.
	pub fn new(
		bundle_version: BundleVersion,
		offset: i64,
		size: i64,
		file_type: FileType,
		relative_path: impl Into<String>,
	) -> Self {
		Self {
			offset,
			size,
			compressed_size: bundle_version.has_compressed_size().then_some(0),
			file_type,
			relative_path: relative_path.into(),
		}
	}

	/// The compressed size, or zero if the record doesn't carry one.
	pub fn compressed_size(&self) -> i64 {
		self.compressed_size.unwrap_or(0)
	}

	/// Whether the path matches, ignoring case.
	///
	/// Characters are compared one to one through their uppercase form. Characters whose
	/// uppercase is more than one character (like `ß`) only match themselves.
	pub fn matches_path(&self, path: &str) -> bool {
		self.relative_path
			.chars()
			.map(simple_uppercase)
			.eq(path.chars().map(simple_uppercase))
	}

	/// Offset of the first byte past this file, if it doesn't overflow.
	pub fn end(&self) -> Option<i64> {
		self.offset.checked_add(self.size)
	}

	/// Encode the record with the layout of the given version.
	///
	/// Returns an error if the compressed size presence doesn't match the version.
	pub fn to_vec(&self, bundle_version: BundleVersion) -> Result<Vec<u8>, DekuError> {
		if self.compressed_size.is_some() != bundle_version.has_compressed_size() {
			return Err(DekuError::InvalidParam(format!(
				"compressed size must be present iff major version >= 6 (version {bundle_version})"
			)));
		}

		let mut output = BitVec::<u8, Msb0>::new();
		self.write(&mut output, (Endian::Little, bundle_version))?;
		Ok(output.into_vec())
	}
}

fn simple_uppercase(c: char) -> char {
	let mut upper = c.to_uppercase();
	match (upper.next(), upper.next()) {
		(Some(single), None) => single,
		_ => c,
	}
}

#[cfg(test)]
mod tests {
	use deku::bitvec::BitView;

	use super::*;

	const V5: BundleVersion = BundleVersion { major: 5, minor: 0 };
	const V6: BundleVersion = BundleVersion { major: 6, minor: 0 };

	fn decode(bytes: &[u8], version: BundleVersion) -> Result<EntryRecord, DekuError> {
		EntryRecord::read(bytes.view_bits(), (Endian::Little, version)).map(|(_, entry)| entry)
	}

	#[test]
	fn version_five_has_no_compressed_size() {
		let entry = EntryRecord::new(V5, 0x1234, 42, FileType::Assembly, "app.dll");
		assert_eq!(entry.compressed_size, None);
		assert_eq!(entry.compressed_size(), 0);

		let bytes = entry.to_vec(V5).unwrap();
		assert_eq!(bytes.len(), 8 + 8 + 1 + 1 + 7);
		assert_eq!(&bytes[0..8], &0x1234_i64.to_le_bytes());
		assert_eq!(&bytes[8..16], &42_i64.to_le_bytes());
		assert_eq!(bytes[16], FileType::Assembly.to_byte());
		assert_eq!(bytes[17], 7);
		assert_eq!(&bytes[18..], b"app.dll");

		assert_eq!(decode(&bytes, V5).unwrap(), entry);
	}

	#[test]
	fn version_six_always_has_compressed_size() {
		let mut entry = EntryRecord::new(V6, 10, 5, FileType::Unknown, "a.txt");
		assert_eq!(entry.compressed_size, Some(0));
		entry.compressed_size = Some(3);

		let bytes = entry.to_vec(V6).unwrap();
		assert_eq!(bytes.len(), 8 + 8 + 8 + 1 + 1 + 5);
		assert_eq!(&bytes[16..24], &3_i64.to_le_bytes());
		assert_eq!(bytes[24], FileType::Unknown.to_byte());

		assert_eq!(decode(&bytes, V6).unwrap(), entry);
	}

	#[test]
	fn layout_must_match_version() {
		let entry = EntryRecord::new(V6, 10, 5, FileType::Unknown, "a.txt");
		assert!(entry.to_vec(V5).is_err());

		let entry = EntryRecord::new(V5, 10, 5, FileType::Unknown, "a.txt");
		assert!(entry.to_vec(V6).is_err());
	}

	#[test]
	fn undefined_file_type_is_a_parse_error() {
		let mut bytes = EntryRecord::new(V5, 0, 0, FileType::Symbols, "x.pdb")
			.to_vec(V5)
			.unwrap();
		bytes[16] = 9;
		assert!(decode(&bytes, V5).is_err());
	}

	#[test]
	fn all_file_types_decode() {
		for file_type in [
			FileType::Unknown,
			FileType::Assembly,
			FileType::NativeBinary,
			FileType::DepsJson,
			FileType::RuntimeConfigJson,
			FileType::Symbols,
		] {
			let bytes = EntryRecord::new(V6, 1, 1, file_type, "f")
				.to_vec(V6)
				.unwrap();
			assert_eq!(decode(&bytes, V6).unwrap().file_type, file_type);
		}
	}

	#[test]
	fn path_matching_ignores_case() {
		let entry = EntryRecord::new(V6, 0, 0, FileType::Unknown, "test.txt");
		assert!(entry.matches_path("TEST.TXT"));
		assert!(entry.matches_path("Test.Txt"));
		assert!(!entry.matches_path("test.txt2"));
		assert!(!entry.matches_path("test"));

		let nested = EntryRecord::new(V6, 0, 0, FileType::Unknown, "Runtimes/Ünïcode.dll");
		assert!(nested.matches_path("runtimes/üNÏcode.DLL"));
	}

	#[test]
	fn path_matching_doesnt_expand_characters() {
		let entry = EntryRecord::new(V6, 0, 0, FileType::Unknown, "straße.txt");
		assert!(entry.matches_path("STRAßE.TXT"));
		assert!(!entry.matches_path("STRASSE.TXT"));

		let entry = EntryRecord::new(V6, 0, 0, FileType::Unknown, "ß");
		assert!(!entry.matches_path("SS"));
		assert!(!entry.matches_path("ss"));
	}

	#[test]
	fn end_checks_overflow() {
		let entry = EntryRecord::new(V6, 10, 5, FileType::Unknown, "a");
		assert_eq!(entry.end(), Some(15));
		let entry = EntryRecord::new(V6, i64::MAX, 1, FileType::Unknown, "a");
		assert_eq!(entry.end(), None);
	}
}
