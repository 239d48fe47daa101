//! Length-prefixed strings.
//!
//! Strings in the manifest (the bundle identifier and every entry's relative path) are UTF-8
//! bytes preceded by their length. The length is a variable-length unsigned integer in groups of
//! seven bits, least significant group first, with the high bit of each byte set when another
//! byte follows. A length takes at most five bytes and must fit in a signed 32-bit integer.

use std::io::Read;

use deku::{
	bitvec::{BitSlice, BitVec, Msb0},
	error::NeedSize,
	DekuError, DekuRead, DekuWrite,
};

/// Maximum number of bytes in an encoded length.
const MAX_LENGTH_BYTES: usize = 5;

/// Read a length-prefixed UTF-8 string.
///
/// This is used as a custom deku reader on string fields.
pub fn read_prefixed_string(
	rest: &BitSlice<u8, Msb0>,
) -> Result<(&BitSlice<u8, Msb0>, String), DekuError> {
	let mut rest = rest;
	let length = parse_length(|| {
		let (after, byte) = u8::read(rest, ())?;
		rest = after;
		Ok(byte)
	})?;

	let mut bytes = Vec::with_capacity(length.min(4096));
	for _ in 0..length {
		let (after, byte) = u8::read(rest, ())?;
		rest = after;
		bytes.push(byte);
	}

	let string = String::from_utf8(bytes)
		.map_err(|err| DekuError::Parse(format!("string is not valid UTF-8: {err}")))?;
	Ok((rest, string))
}

/// Write a length-prefixed UTF-8 string.
///
/// This is used as a custom deku writer on string fields.
pub fn write_prefixed_string(
	output: &mut BitVec<u8, Msb0>,
	string: &str,
) -> Result<(), DekuError> {
	prefixed_string_bytes(string)?.write(output, ())
}

/// Copy a length-prefixed string, prefix included, from a stream onto the end of `output`.
///
/// Exactly the string's bytes are read, nothing past them. The bytes are not checked to be
/// UTF-8, that's left to [`read_prefixed_string`].
pub fn take_prefixed_string<R: Read>(
	reader: &mut R,
	output: &mut Vec<u8>,
) -> std::io::Result<()> {
	let mut failure = None;
	let length = parse_length(|| {
		let mut byte = [0];
		if let Err(err) = reader.read_exact(&mut byte) {
			failure = Some(err);
			return Err(DekuError::Incomplete(NeedSize::new(8)));
		}
		output.push(byte[0]);
		Ok(byte[0])
	});
	if let Some(err) = failure {
		return Err(err);
	}
	let length = length?;

	// grows as bytes arrive, so a corrupt length can't allocate ahead of the stream
	let read = reader.take(length as u64).read_to_end(output)?;
	if read < length {
		return Err(std::io::Error::new(
			std::io::ErrorKind::UnexpectedEof,
			format!("string is {length} bytes but the stream ended after {read}"),
		));
	}

	Ok(())
}

/// Encode a string with its length prefix into a byte vector.
pub fn prefixed_string_bytes(string: &str) -> Result<Vec<u8>, DekuError> {
	let mut bytes = encode_length(string.len())?;
	bytes.extend_from_slice(string.as_bytes());
	Ok(bytes)
}

/// Encode a length as a 7-bit-group variable-length integer.
///
/// Returns an error if the length doesn't fit in a signed 32-bit integer.
pub fn encode_length(length: usize) -> Result<Vec<u8>, DekuError> {
	let mut value = u32::try_from(length)
		.ok()
		.filter(|value| i32::try_from(*value).is_ok())
		.ok_or_else(|| DekuError::InvalidParam(format!("string too long ({length} bytes)")))?;

	let mut bytes = Vec::with_capacity(MAX_LENGTH_BYTES);
	while value >= 0x80 {
		bytes.push((value as u8 & 0x7F) | 0x80);
		value >>= 7;
	}
	bytes.push(value as u8);
	Ok(bytes)
}

/// Decode a length prefix, pulling one byte at a time.
fn parse_length(mut next: impl FnMut() -> Result<u8, DekuError>) -> Result<usize, DekuError> {
	let mut value: u32 = 0;
	for index in 0..MAX_LENGTH_BYTES {
		let byte = next()?;

		// the fifth group only has room for the top four bits of a u32
		if index == MAX_LENGTH_BYTES - 1 && byte > 0x0F {
			return Err(DekuError::Parse(format!(
				"string length prefix overflows: last byte is 0x{byte:02X}"
			)));
		}

		value |= u32::from(byte & 0x7F) << (7 * index);
		if byte & 0x80 == 0 {
			return i32::try_from(value)
				.map(|length| length as usize)
				.map_err(|_| DekuError::Parse(format!("negative string length ({value})")));
		}
	}

	Err(DekuError::Parse(
		"string length prefix is longer than five bytes".into(),
	))
}
