//! sfbundle: read and append to single-file application bundles.
//!
//! A single-file bundle is a host executable with the application's files appended to it, and a
//! manifest after those describing where each file is. The host finds the manifest through a
//! back-pointer stored right before a known signature. See [`format`] for the layout.
//!
//! Reading is done through the [`decode`] module, most easily with a [`decode::Decoder`].
//! Appending a file is done with [`encode::append`], which writes a modified copy of a bundle.
//!
//! Streams are always borrowed: opening, flushing, and closing them is up to the caller.

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod copy;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
