use std::{
	io::{Read, Seek, SeekFrom},
	iter::FusedIterator,
};

use deku::{bitvec::BitView, ctx::Endian, DekuRead};
use tracing::{debug, instrument, trace};

use crate::{
	error::{ErrorKind, Result, SimpleError, SourceError},
	format::{
		strings::take_prefixed_string, BundleVersion, EntryRecord, ManifestHeader,
		AUXILIARY_FIELDS_LENGTH,
	},
};

use super::BundleLocation;

/// Read the manifest header of a located bundle.
///
/// Seeks to the manifest and decodes its header; see [`decode_header`]. On success, the reader is
/// left at the first entry record.
#[instrument(level = "debug", skip(reader))]
pub fn read_header<R: Read + Seek>(
	reader: &mut R,
	location: &BundleLocation,
) -> Result<ManifestHeader> {
	if !location.has_manifest() {
		return Err(ErrorKind::NoManifest.into());
	}

	let offset = u64::try_from(location.manifest_offset)
		.map_err(|_| ErrorKind::BackPointerOutOfRange(location.manifest_offset))?;
	reader.seek(SeekFrom::Start(offset))?;
	decode_header(reader)
}

/// Decode a manifest header at the reader's current position.
///
/// The version is read and checked before anything else: a major version outside of the
/// supported range is an [`ErrorKind::UnsupportedVersion`] error, and nothing past the version
/// is read in that case.
///
/// On success, the reader is left at the first entry record.
pub fn decode_header<R: Read>(reader: &mut R) -> Result<ManifestHeader> {
	let mut bytes = [0; BundleVersion::LENGTH];
	reader.read_exact(&mut bytes)?;
	let (_, version) =
		BundleVersion::read(bytes.view_bits(), Endian::Little).map_err(SimpleError::from_deku)?;
	debug!(%version, "read manifest version");

	if !version.is_supported() {
		let bytes = version.to_vec().map_err(SimpleError::from_deku)?;
		return Err(SourceError::new(ErrorKind::UnsupportedVersion(version), &bytes, 0, 4).into());
	}

	// entry count, bundle id, and the auxiliary block
	let mut bytes = vec![0; 4];
	reader.read_exact(&mut bytes)?;
	take_prefixed_string(&mut *reader, &mut bytes)?;
	if version.has_auxiliary_fields() {
		let start = bytes.len();
		bytes.resize(start + AUXILIARY_FIELDS_LENGTH, 0);
		reader.read_exact(&mut bytes[start..])?;
	}

	let (_, header) = ManifestHeader::read(bytes.view_bits(), (Endian::Little, version))
		.map_err(SimpleError::from_deku)?;
	debug!(?header, "read manifest header");

	if header.entry_count < 0 {
		return Err(SimpleError::new(ErrorKind::Parse)
			.with_message(format!("negative entry count ({})", header.entry_count))
			.into());
	}

	Ok(header)
}

/// Read a manifest at the reader's current position, and iterate over its entries.
///
/// See [`Entries`].
pub fn read_entries<R: Read>(reader: &mut R) -> Result<Entries<'_, R>> {
	let header = decode_header(reader)?;
	Ok(Entries::new(reader, header))
}

/// Iterator over a manifest's entry records.
///
/// Each call to the iterator decodes one record from the reader, so this must be the only thing
/// reading from it until it's done. There are exactly as many items as the header's entry count,
/// unless decoding fails: the error is yielded and the iterator stops.
///
/// This is single-pass. To go over the entries again, seek back to the first record and create
/// a new iterator, or seek back to the manifest and call [`read_entries`] again.
#[derive(Debug)]
pub struct Entries<'reader, R> {
	reader: &'reader mut R,
	header: ManifestHeader,
	index: u32,
	done: bool,
}

impl<'reader, R: Read> Entries<'reader, R> {
	/// Iterate entries from a reader positioned at the first entry record.
	pub fn new(reader: &'reader mut R, header: ManifestHeader) -> Self {
		Self {
			reader,
			header,
			index: 0,
			done: false,
		}
	}

	/// The manifest header these entries belong to.
	pub fn header(&self) -> &ManifestHeader {
		&self.header
	}

	fn total(&self) -> u32 {
		// negative counts are rejected when reading the header
		u32::try_from(self.header.entry_count).unwrap_or(0)
	}

	fn read_entry(&mut self) -> Result<EntryRecord> {
		let version = self.header.version;

		// offset, size, compressed size, and type, then the path
		let mut bytes = vec![0; if version.has_compressed_size() { 25 } else { 17 }];
		self.reader.read_exact(&mut bytes)?;
		take_prefixed_string(&mut *self.reader, &mut bytes)?;

		EntryRecord::read(bytes.view_bits(), (Endian::Little, version))
			.map(|(_, entry)| entry)
			.map_err(|err| {
				SimpleError::new(ErrorKind::Parse)
					.with_message(format!("parse error in entry {}: {err}", self.index))
					.into()
			})
	}
}

impl<'reader, R: Read> Iterator for Entries<'reader, R> {
	type Item = Result<EntryRecord>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done || self.index >= self.total() {
			return None;
		}

		match self.read_entry() {
			Ok(entry) => {
				trace!(index = %self.index, ?entry, "read entry");
				self.index += 1;
				Some(Ok(entry))
			}
			Err(err) => {
				self.done = true;
				Some(Err(err))
			}
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		if self.done {
			(0, Some(0))
		} else {
			(0, Some((self.total() - self.index) as usize))
		}
	}
}

impl<'reader, R: Read> FusedIterator for Entries<'reader, R> {}
