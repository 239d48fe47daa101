//! Decoder types and functions.
//!
//! Reading a bundle goes: [locate] the signature and back-pointer, [read the header][read_header]
//! of the manifest it points to, then iterate the [entries][Entries]. [`Decoder`] does all that
//! over one borrowed stream, and adds lookup and extraction on top.

use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, instrument};

use crate::{
	copy::ChunkBuffer,
	error::{ErrorKind, Result, SimpleError},
	format::{EntryRecord, ManifestHeader},
};

#[doc(inline)]
pub use self::manifest::{decode_header, read_entries, read_header, Entries};
#[doc(inline)]
pub use self::scan::{locate, BundleLocation};

mod extract;
mod manifest;
mod scan;

/// Decoder context.
///
/// The reader needs to be Seek, as entries are found by offset. It's borrowed for the lifetime of
/// the decoder; opening and closing it is up to the caller.
#[derive(Debug)]
pub struct Decoder<'reader, R> {
	reader: &'reader mut R,

	/// Length of the stream in bytes.
	stream_length: u64,

	/// Where the signature and back-pointer were found.
	location: BundleLocation,

	/// Manifest header, decoded once on open.
	header: ManifestHeader,

	/// Offset of the first entry record.
	entries_offset: u64,

	buffer: ChunkBuffer,
}

impl<'reader, R: Read + Seek> Decoder<'reader, R> {
	/// Open a bundle.
	///
	/// This scans for the signature and decodes the manifest header. Fails with
	/// [`ErrorKind::NotABundle`] or [`ErrorKind::NoManifest`] if the stream isn't a readable
	/// bundle, see [`Error::is_detection_failure`][crate::error::Error::is_detection_failure].
	#[instrument(level = "debug", skip(reader))]
	pub fn open(reader: &'reader mut R) -> Result<Self> {
		let location = locate(reader)?.ok_or(ErrorKind::NotABundle)?;
		if !location.has_manifest() {
			return Err(ErrorKind::NoManifest.into());
		}

		let stream_length = reader.seek(SeekFrom::End(0))?;
		debug!(%stream_length, "got stream length");
		if u64::try_from(location.manifest_offset).map_or(true, |offset| offset >= stream_length) {
			return Err(ErrorKind::BackPointerOutOfRange(location.manifest_offset).into());
		}

		let header = read_header(reader, &location)?;
		let entries_offset = reader.stream_position()?;

		Ok(Self {
			reader,
			stream_length,
			location,
			header,
			entries_offset,
			buffer: ChunkBuffer::default(),
		})
	}

	/// Length of the stream in bytes.
	pub fn stream_length(&self) -> u64 {
		self.stream_length
	}

	/// Where the signature and back-pointer are.
	pub fn location(&self) -> BundleLocation {
		self.location
	}

	/// The manifest header.
	pub fn header(&self) -> &ManifestHeader {
		&self.header
	}

	/// Iterate through the entries.
	///
	/// Every call starts again from the first entry.
	pub fn entries(&mut self) -> Result<Entries<'_, R>> {
		self.reader.seek(SeekFrom::Start(self.entries_offset))?;
		Ok(Entries::new(&mut *self.reader, self.header.clone()))
	}

	/// Find the first entry whose path matches, ignoring case.
	#[instrument(level = "debug", skip(self))]
	pub fn find_entry(&mut self, path: &str) -> Result<Option<EntryRecord>> {
		for entry in self.entries()? {
			let entry = entry?;
			if entry.matches_path(path) {
				debug!(?entry, "found entry");
				return Ok(Some(entry));
			}
		}

		debug!("no entry found");
		Ok(None)
	}

	/// Offset of the first byte past the last entry record.
	///
	/// This reads through all the entries.
	pub fn manifest_end(&mut self) -> Result<u64> {
		for entry in self.entries()? {
			entry?;
		}

		Ok(self.reader.stream_position()?)
	}

	/// Find an entry by path and copy its bytes to the sink.
	///
	/// Returns the entry, or fails with [`ErrorKind::EntryNotFound`].
	pub fn extract<W: Write + ?Sized>(&mut self, path: &str, sink: &mut W) -> Result<EntryRecord> {
		let entry = self.find_entry(path)?.ok_or_else(|| {
			SimpleError::new(ErrorKind::EntryNotFound).with_message(format!("no such entry: {path}"))
		})?;

		self.extract_entry(&entry, sink)?;
		Ok(entry)
	}

	/// Copy an entry's bytes to the sink.
	///
	/// Exactly `entry.size` bytes are copied. If the stream ends first, this fails with an I/O
	/// error of kind [`UnexpectedEof`][std::io::ErrorKind::UnexpectedEof]; what was written to the
	/// sink by then should be discarded.
	pub fn extract_entry<W: Write + ?Sized>(
		&mut self,
		entry: &EntryRecord,
		sink: &mut W,
	) -> Result<()> {
		extract::copy_entry(&mut *self.reader, entry, sink, &mut self.buffer)
	}
}

/// Find an entry by path in a bundle stream.
///
/// Shorthand for [`Decoder::open`] then [`Decoder::find_entry`].
pub fn find_entry<R: Read + Seek>(reader: &mut R, path: &str) -> Result<Option<EntryRecord>> {
	Decoder::open(reader)?.find_entry(path)
}

/// Find an entry by path in a bundle stream and copy its bytes to the sink.
///
/// Shorthand for [`Decoder::open`] then [`Decoder::extract`].
pub fn extract<R, W>(reader: &mut R, path: &str, sink: &mut W) -> Result<EntryRecord>
where
	R: Read + Seek,
	W: Write + ?Sized,
{
	Decoder::open(reader)?.extract(path, sink)
}

/// Copy an already-decoded entry's bytes from a bundle stream to the sink.
///
/// This doesn't look at the manifest at all, see [`Decoder::extract_entry`].
pub fn extract_entry<R, W>(reader: &mut R, entry: &EntryRecord, sink: &mut W) -> Result<()>
where
	R: Read + Seek,
	W: Write + ?Sized,
{
	extract::copy_entry(reader, entry, sink, &mut ChunkBuffer::default())
}
