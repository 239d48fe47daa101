use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};

use deku::DekuContainerRead;
use tracing::{debug, instrument, trace};

use crate::{
	error::{Result, SimpleError},
	format::{BackPointer, BACK_POINTER_LENGTH, BUNDLE_SIGNATURE, SIGNATURE_LENGTH},
};

/// How many bytes are read at a time while scanning.
const SCAN_CHUNK: usize = 64 * 1024;

/// Where the trailer was found in a stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BundleLocation {
	/// Offset of the first byte of the signature.
	pub signature_position: u64,

	/// Offset of the back-pointer, right before the signature.
	pub back_pointer_position: u64,

	/// The back-pointer's value: offset of the manifest header.
	///
	/// Zero if there's no manifest.
	pub manifest_offset: i64,
}

impl BundleLocation {
	/// Whether the back-pointer points at a manifest.
	///
	/// A bundle without one can't be read or appended to.
	pub const fn has_manifest(&self) -> bool {
		self.manifest_offset != 0
	}
}

/// Scan a stream for the bundle signature.
///
/// This reads forward from the start of the stream and stops at the first occurrence of the
/// signature that has room for a back-pointer before it, then reads that back-pointer.
///
/// Returns `Ok(None)` if there's no signature: that's not an error, the stream just isn't a
/// bundle. A located bundle may still have [no manifest][BundleLocation::has_manifest].
///
/// Leaves the stream position unspecified.
#[instrument(level = "debug", skip(reader))]
pub fn locate<R: Read + Seek>(reader: &mut R) -> Result<Option<BundleLocation>> {
	reader.seek(SeekFrom::Start(0))?;

	let mut chunk = vec![0; SCAN_CHUNK];
	let mut window: Vec<u8> = Vec::with_capacity(SCAN_CHUNK + SIGNATURE_LENGTH);
	let mut window_start: u64 = 0;

	let signature_position = loop {
		let read = match reader.read(&mut chunk) {
			Ok(0) => {
				debug!(scanned = %(window_start + window.len() as u64), "signature not found");
				return Ok(None);
			}
			Ok(read) => read,
			Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
			Err(err) => return Err(err.into()),
		};
		window.extend_from_slice(&chunk[..read]);

		if let Some(found) = find_signature(&window, window_start) {
			break window_start + found as u64;
		}

		// keep enough of the tail to catch a signature straddling two chunks
		let keep = window.len().min(SIGNATURE_LENGTH - 1);
		let drop = window.len() - keep;
		window.drain(..drop);
		window_start += drop as u64;
		trace!(%window_start, "scanned chunk");
	};

	let back_pointer_position = signature_position - BACK_POINTER_LENGTH as u64;
	debug!(%signature_position, %back_pointer_position, "found signature");

	let mut bytes = [0; BACK_POINTER_LENGTH];
	reader.seek(SeekFrom::Start(back_pointer_position))?;
	reader.read_exact(&mut bytes)?;
	let (_, back_pointer) =
		BackPointer::from_bytes((&bytes[..], 0)).map_err(SimpleError::from_deku)?;
	debug!(?back_pointer, "read back-pointer");

	Ok(Some(BundleLocation {
		signature_position,
		back_pointer_position,
		manifest_offset: back_pointer.manifest_offset,
	}))
}

/// Find the first full signature in the window.
///
/// Matches that start too close to the start of the stream to have a back-pointer are skipped.
fn find_signature(window: &[u8], window_start: u64) -> Option<usize> {
	window
		.windows(SIGNATURE_LENGTH)
		.enumerate()
		.filter(|(index, _)| window_start + *index as u64 >= BACK_POINTER_LENGTH as u64)
		.find(|(_, candidate)| *candidate == BUNDLE_SIGNATURE)
		.map(|(index, _)| index)
}
