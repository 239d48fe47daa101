//! Binary format structures.
//!
//! A bundle is a host executable with files appended after it, and a manifest appended after
//! those. Everything is little-endian.
//!
//! ```text
//! +-------------------------------------------+
//! | host executable                           |
//! |   ... [back-pointer][signature] ...       |  the back-pointer holds the manifest offset
//! +-------------------------------------------+
//! | embedded files                            |  located by offset and size
//! +-------------------------------------------+
//! | manifest header                           |
//! | entry records                             |
//! +-------------------------------------------+
//! ```

#[doc(inline)]
pub use self::constants::*;
#[doc(inline)]
pub use self::entry::*;
#[doc(inline)]
pub use self::header::*;
#[doc(inline)]
pub use self::trailer::*;

mod constants;
mod entry;
mod header;
pub mod strings;
mod trailer;
