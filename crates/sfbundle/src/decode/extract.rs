use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, instrument, warn};

use crate::{
	copy::ChunkBuffer,
	error::{ErrorKind, Result, SimpleError},
	format::EntryRecord,
};

/// Copy an entry's bytes from the bundle to the sink.
///
/// Exactly `entry.size` bytes are copied, starting at `entry.offset`. The compressed size is not
/// looked at: a compressed entry comes out as its stored bytes.
#[instrument(level = "debug", skip(reader, sink, buffer))]
pub(crate) fn copy_entry<R, W>(
	reader: &mut R,
	entry: &EntryRecord,
	sink: &mut W,
	buffer: &mut ChunkBuffer,
) -> Result<()>
where
	R: Read + Seek,
	W: Write + ?Sized,
{
	let (Ok(offset), Ok(size), Some(_)) = (
		u64::try_from(entry.offset),
		u64::try_from(entry.size),
		entry.end(),
	) else {
		return Err(SimpleError::new(ErrorKind::InvalidEntry)
			.with_message(format!(
				"invalid entry {:?}: offset {} and size {} don't describe a byte range",
				entry.relative_path, entry.offset, entry.size
			))
			.into());
	};

	if entry.compressed_size() != 0 {
		warn!(path = %entry.relative_path, compressed_size = %entry.compressed_size(), "entry is compressed, copying stored bytes as-is");
	}

	debug!(%offset, %size, "copying entry");
	reader.seek(SeekFrom::Start(offset))?;
	buffer.copy_exact(reader, sink, size)?;
	Ok(())
}
