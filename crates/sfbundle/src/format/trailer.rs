//! Bundle trailer: the signature and the back-pointer before it.
//!
//! The host executable carries a placeholder region made of an eight-byte back-pointer followed
//! by the 32-byte [signature][super::BUNDLE_SIGNATURE]. There's no fixed offset for this region,
//! as it lives somewhere inside the compiled host, so readers scan for the signature and then
//! step back eight bytes to read where the manifest starts.
//!
//! A back-pointer of zero means the host was never bundled (e.g. a debug build): the signature is
//! there, but there's nothing behind it.

use deku::prelude::*;

/// The back-pointer stored immediately before the signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct BackPointer {
	/// Offset in bytes of the manifest header, from the start of the stream.
	///
	/// Zero if the host carries no manifest.
	#[deku(bytes = "8")]
	pub manifest_offset: i64,
}

impl BackPointer {
	/// Whether this points at a manifest at all.
	pub const fn has_manifest(self) -> bool {
		self.manifest_offset != 0
	}
}
