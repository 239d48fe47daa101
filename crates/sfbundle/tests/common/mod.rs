//! Synthetic bundle builder.

#![allow(dead_code)]

use sfbundle::format::{
	AuxiliaryFields, BundleVersion, EntryRecord, FileType, ManifestHeader, BUNDLE_SIGNATURE,
};

/// Builds `[host prefix][back-pointer][signature][host suffix][files][manifest]`.
#[derive(Clone, Debug)]
pub struct BundleBuilder {
	version: BundleVersion,
	bundle_id: String,
	host_prefix: Vec<u8>,
	host_suffix: Vec<u8>,
	files: Vec<(String, FileType, Vec<u8>)>,
}

impl BundleBuilder {
	pub fn new(major: u32) -> Self {
		Self {
			version: BundleVersion { major, minor: 0 },
			bundle_id: "bundle".into(),
			host_prefix: b"MZ host code".to_vec(),
			host_suffix: b"more host code".to_vec(),
			files: Vec::new(),
		}
	}

	pub fn version(&self) -> BundleVersion {
		self.version
	}

	pub fn host(mut self, prefix: &[u8], suffix: &[u8]) -> Self {
		self.host_prefix = prefix.to_vec();
		self.host_suffix = suffix.to_vec();
		self
	}

	pub fn bundle_id(mut self, id: &str) -> Self {
		self.bundle_id = id.into();
		self
	}

	pub fn file(mut self, path: &str, file_type: FileType, content: &[u8]) -> Self {
		self.files.push((path.into(), file_type, content.to_vec()));
		self
	}

	pub fn back_pointer_position(&self) -> u64 {
		self.host_prefix.len() as u64
	}

	pub fn build(&self) -> Vec<u8> {
		let mut bytes = self.host_prefix.clone();
		bytes.extend([0; 8]);
		bytes.extend(BUNDLE_SIGNATURE);
		bytes.extend(&self.host_suffix);

		let mut entries = Vec::new();
		for (path, file_type, content) in &self.files {
			entries.push(EntryRecord::new(
				self.version,
				bytes.len() as i64,
				content.len() as i64,
				*file_type,
				path.as_str(),
			));
			bytes.extend(content);
		}

		let manifest_offset = bytes.len() as i64;
		let bp = self.host_prefix.len();
		bytes[bp..bp + 8].copy_from_slice(&manifest_offset.to_le_bytes());

		let mut header = ManifestHeader::new(self.version, self.bundle_id.as_str());
		header.entry_count = entries.len() as i32;
		if let Some(auxiliary) = header.auxiliary.as_mut() {
			*auxiliary = AuxiliaryFields {
				flags: 1,
				..AuxiliaryFields::default()
			};
		}
		bytes.extend(header.to_vec().unwrap());
		for entry in entries {
			bytes.extend(entry.to_vec(self.version).unwrap());
		}

		bytes
	}
}

pub fn sample(major: u32) -> BundleBuilder {
	BundleBuilder::new(major)
		.file("app.dll", FileType::Assembly, b"assembly bytes")
		.file("app.deps.json", FileType::DepsJson, b"{\"deps\":{}}")
		.file("runtimes/native/libfoo.so", FileType::NativeBinary, &[0x7f, b'E', b'L', b'F'])
		.file("test.txt", FileType::Unknown, b"text")
}
