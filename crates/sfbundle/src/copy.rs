//! Chunked stream copying.
//!
//! All byte moving goes through a fixed-size buffer that's allocated once and reused for every
//! copy made by the same [`Decoder`][crate::decode::Decoder] or
//! [`Appender`][crate::encode::Appender].

use std::{
	fmt,
	io::{Error, ErrorKind, Read, Result, Write},
};

use tracing::trace;

/// Size of the copy buffer in bytes.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Reusable copy buffer.
pub(crate) struct ChunkBuffer {
	buf: Box<[u8]>,
}

impl fmt::Debug for ChunkBuffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChunkBuffer")
			.field("size", &self.buf.len())
			.finish()
	}
}

impl Default for ChunkBuffer {
	fn default() -> Self {
		Self {
			buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
		}
	}
}

impl ChunkBuffer {
	/// Copy exactly `length` bytes from the reader's current position.
	///
	/// Running out of input before `length` bytes is an [`ErrorKind::UnexpectedEof`] error; some
	/// bytes may already have been written by then.
	pub fn copy_exact<R, W>(&mut self, from: &mut R, to: &mut W, length: u64) -> Result<()>
	where
		R: Read + ?Sized,
		W: Write + ?Sized,
	{
		let mut remaining = length;
		while remaining > 0 {
			let want = remaining.min(self.buf.len() as u64) as usize;
			let read = match from.read(&mut self.buf[..want]) {
				Ok(0) => {
					return Err(Error::new(
						ErrorKind::UnexpectedEof,
						format!("stream ended with {remaining} of {length} bytes left to copy"),
					))
				}
				Ok(read) => read,
				Err(err) if err.kind() == ErrorKind::Interrupted => continue,
				Err(err) => return Err(err),
			};

			to.write_all(&self.buf[..read])?;
			remaining -= read as u64;
		}

		trace!(bytes = %length, "copied");
		Ok(())
	}

	/// Copy everything from the reader's current position to its end.
	///
	/// Returns how many bytes were copied.
	pub fn copy_to_end<R, W>(&mut self, from: &mut R, to: &mut W) -> Result<u64>
	where
		R: Read + ?Sized,
		W: Write + ?Sized,
	{
		let mut copied = 0;
		loop {
			let read = match from.read(&mut self.buf) {
				Ok(0) => break,
				Ok(read) => read,
				Err(err) if err.kind() == ErrorKind::Interrupted => continue,
				Err(err) => return Err(err),
			};

			to.write_all(&self.buf[..read])?;
			copied += read as u64;
		}

		trace!(bytes = %copied, "copied to end");
		Ok(copied)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	fn source(len: usize) -> Vec<u8> {
		(0..len).map(|n| (n % 251) as u8).collect()
	}

	#[test]
	fn copies_across_chunk_boundaries() {
		let data = source(CHUNK_SIZE * 2 + 17);
		let mut from = Cursor::new(&data);
		let mut to = Vec::new();

		ChunkBuffer::default()
			.copy_exact(&mut from, &mut to, data.len() as u64)
			.unwrap();
		assert_eq!(to, data);
	}

	#[test]
	fn copies_exactly_and_leaves_the_rest() {
		let data = source(100);
		let mut from = Cursor::new(&data);
		let mut to = Vec::new();
		let mut buffer = ChunkBuffer::default();

		buffer.copy_exact(&mut from, &mut to, 40).unwrap();
		assert_eq!(to, &data[..40]);
		assert_eq!(from.position(), 40);

		let rest = buffer.copy_to_end(&mut from, &mut to).unwrap();
		assert_eq!(rest, 60);
		assert_eq!(to, data);
	}

	#[test]
	fn short_input_is_unexpected_eof() {
		let data = source(10);
		let mut from = Cursor::new(&data);
		let mut to = Vec::new();

		let err = ChunkBuffer::default()
			.copy_exact(&mut from, &mut to, 11)
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
	}

	#[test]
	fn zero_length_copies_nothing() {
		let mut from = Cursor::new(Vec::<u8>::new());
		let mut to = Vec::new();
		ChunkBuffer::default()
			.copy_exact(&mut from, &mut to, 0)
			.unwrap();
		assert!(to.is_empty());
	}
}
