/// Bundle signature.
///
/// This is the SHA-256 digest of the ASCII line `.net core bundle\n`. It is embedded in the host
/// executable, and the eight bytes immediately before it hold the [back-pointer][super::BackPointer]
/// to the manifest. It's only ever matched byte-for-byte, never computed.
#[rustfmt::skip]
pub const BUNDLE_SIGNATURE: [u8; 32] = [
	0x8b, 0x12, 0x02, 0xb9, 0x6a, 0x61, 0x20, 0x38,
	0x72, 0x7b, 0x93, 0x02, 0x14, 0xd7, 0xa0, 0x32,
	0x13, 0xf5, 0xb9, 0xe6, 0xef, 0xae, 0x33, 0x18,
	0xee, 0x3b, 0x2d, 0xce, 0x24, 0xb3, 0x6a, 0xae,
];

/// Length of the [`BUNDLE_SIGNATURE`] in bytes.
pub const SIGNATURE_LENGTH: usize = BUNDLE_SIGNATURE.len();

/// Length of the back-pointer in bytes.
pub const BACK_POINTER_LENGTH: usize = 8;

/// Lowest manifest major version this crate reads.
pub const MIN_MAJOR_VERSION: u32 = 1;

/// Highest manifest major version this crate reads.
pub const MAX_MAJOR_VERSION: u32 = 6;

/// Position of the entry count field, relative to the start of the manifest.
///
/// The count sits right after the major and minor version numbers.
pub const ENTRY_COUNT_OFFSET: u64 = 8;

/// Length in bytes of the auxiliary header fields present from major version 2.
pub const AUXILIARY_FIELDS_LENGTH: usize = 40;
