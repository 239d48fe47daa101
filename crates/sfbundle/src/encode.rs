//! Encoder types and functions.
//!
//! The only edit ever made to a bundle is appending a file to it. That's done by copying the
//! whole bundle to a new stream, inserting the file where the manifest used to start, and moving
//! the manifest after it:
//!
//! ```text
//! source:  [host .. bp=M .. signature .. files][manifest]
//!          0                                  M
//!
//! target:  [host .. bp=M+N .. signature .. files][resource][manifest][new entry]
//!          0                                     M         M+N
//! ```
//!
//! Besides the new entry record at the end, only two values change: the back-pointer, and the
//! manifest's entry count.

use std::io::{Read, Seek, SeekFrom, Write};

use deku::DekuContainerWrite;
use tracing::{debug, instrument, warn};

use crate::{
	copy::ChunkBuffer,
	decode::{BundleLocation, Decoder},
	error::{ErrorKind, Result, SimpleError},
	format::{BackPointer, EntryRecord, FileType, BACK_POINTER_LENGTH, ENTRY_COUNT_OFFSET},
};

/// Appender context.
///
/// This holds the copy buffer, and can be reused for any number of appends.
#[derive(Debug, Default)]
pub struct Appender {
	buffer: ChunkBuffer,
}

/// Everything that's needed to write the target, worked out before writing anything.
#[derive(Debug)]
struct Plan {
	location: BundleLocation,
	manifest_offset: u64,
	new_manifest_offset: u64,
	resource_length: u64,
	entry_count: i32,
	entry: EntryRecord,
	record: Vec<u8>,
}

impl Appender {
	/// New appender.
	pub fn new() -> Self {
		Self::default()
	}

	/// Write a copy of the `source` bundle to `target`, with `resource` added as `relative_path`.
	///
	/// The new entry has type [`FileType::Unknown`] and is laid out for the source's manifest
	/// version. Returns the entry that was added.
	///
	/// The source is fully checked before anything is written: it must be a bundle with a
	/// manifest of a supported version, and the manifest must run to the end of the stream. The
	/// path isn't checked against existing entries; appending a path that's already there (ignoring
	/// case) adds a second entry that lookups won't reach. The resource is read from its start,
	/// regardless of its current position.
	///
	/// If this fails after writing has started, the target holds a partial copy that must be
	/// discarded. Flushing the target is up to the caller.
	#[instrument(level = "debug", skip(self, source, target, resource))]
	pub fn append<S, T, A>(
		&mut self,
		source: &mut S,
		target: &mut T,
		resource: &mut A,
		relative_path: &str,
	) -> Result<EntryRecord>
	where
		S: Read + Seek,
		T: Write + Seek,
		A: Read + Seek,
	{
		let plan = Self::plan(source, resource, relative_path)?;
		debug!(?plan, "planned append");

		// host and files, verbatim
		source.seek(SeekFrom::Start(0))?;
		target.seek(SeekFrom::Start(0))?;
		self.buffer.copy_exact(source, target, plan.manifest_offset)?;

		let back_pointer = BackPointer {
			manifest_offset: plan.entry.offset + plan.entry.size,
		};
		target.seek(SeekFrom::Start(plan.location.back_pointer_position))?;
		target.write_all(&back_pointer.to_bytes().map_err(SimpleError::from_deku)?)?;
		debug!(?back_pointer, "rewrote back-pointer");

		target.seek(SeekFrom::Start(plan.manifest_offset))?;
		resource.seek(SeekFrom::Start(0))?;
		self.buffer.copy_exact(resource, target, plan.resource_length)?;
		debug!(bytes = %plan.resource_length, "wrote resource");

		// source is at the manifest offset
		let manifest_length = self.buffer.copy_to_end(source, target)?;
		debug!(bytes = %manifest_length, "moved manifest");

		target.write_all(&plan.record)?;
		let end = plan.new_manifest_offset + manifest_length + plan.record.len() as u64;

		target.seek(SeekFrom::Start(plan.new_manifest_offset + ENTRY_COUNT_OFFSET))?;
		target.write_all(&plan.entry_count.to_le_bytes())?;
		debug!(entry_count = %plan.entry_count, "patched entry count");

		target.seek(SeekFrom::Start(end))?;
		Ok(plan.entry)
	}

	fn plan<S, A>(source: &mut S, resource: &mut A, relative_path: &str) -> Result<Plan>
	where
		S: Read + Seek,
		A: Read + Seek,
	{
		let mut decoder = Decoder::open(source)?;
		let location = decoder.location();
		let header = decoder.header().clone();

		if relative_path.is_empty() {
			warn!("appending an entry with an empty path");
		}
		if let Some(existing) = decoder.find_entry(relative_path)? {
			warn!(
				existing = %existing.relative_path,
				"an entry with this path already exists, lookups will keep finding the older one"
			);
		}

		let manifest_end = decoder.manifest_end()?;
		if manifest_end != decoder.stream_length() {
			return Err(SimpleError::new(ErrorKind::ManifestNotAtEnd)
				.with_message(format!(
					"manifest ends at {manifest_end} but the stream is {} bytes long, refusing to append after it",
					decoder.stream_length()
				))
				.into());
		}

		// Decoder::open checked the offset is positive and inside the stream
		let manifest_offset = u64::try_from(location.manifest_offset)
			.map_err(|_| ErrorKind::BackPointerOutOfRange(location.manifest_offset))?;
		if location.back_pointer_position + BACK_POINTER_LENGTH as u64 > manifest_offset {
			return Err(ErrorKind::BackPointerAfterManifest.into());
		}

		let resource_length = resource.seek(SeekFrom::End(0))?;
		let resource_size =
			i64::try_from(resource_length).map_err(|_| ErrorKind::Overflow("resource size"))?;
		let new_manifest_offset = location
			.manifest_offset
			.checked_add(resource_size)
			.ok_or(ErrorKind::Overflow("manifest offset"))?;
		let entry_count = header
			.entry_count
			.checked_add(1)
			.ok_or(ErrorKind::Overflow("entry count"))?;

		let entry = EntryRecord::new(
			header.version,
			location.manifest_offset,
			resource_size,
			FileType::Unknown,
			relative_path,
		);
		let record = entry
			.to_vec(header.version)
			.map_err(SimpleError::from_deku)?;

		Ok(Plan {
			location,
			manifest_offset,
			// both operands are non-negative
			new_manifest_offset: new_manifest_offset as u64,
			resource_length,
			entry_count,
			entry,
			record,
		})
	}
}

/// Write a copy of the `source` bundle to `target`, with `resource` added as `relative_path`.
///
/// Shorthand for [`Appender::append`] with a fresh appender.
pub fn append<S, T, A>(
	source: &mut S,
	target: &mut T,
	resource: &mut A,
	relative_path: &str,
) -> Result<EntryRecord>
where
	S: Read + Seek,
	T: Write + Seek,
	A: Read + Seek,
{
	Appender::new().append(source, target, resource, relative_path)
}
