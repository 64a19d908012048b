//! Compression of LAS point records with the LASzip point10 (version 2)
//! and RGB12 (version 2) codecs.
//!
//! The building blocks are an adaptive range coder ([`encoders`], [`decoders`],
//! [`models`]), an integer residual compressor ([`integer`]) and the per item
//! codecs found in [`las`]. The [`record`] module ties the codecs of a point
//! record together.
//!
//! # Example
//!
//! ```
//! use lazcodec::{
//!     LazError, LazItemRecordBuilder, LazItemType, RecordCompressor, RecordDecompressor,
//!     SequentialPointRecordCompressor, SequentialPointRecordDecompressor,
//! };
//!
//! # fn main() -> Result<(), LazError> {
//! let items = LazItemRecordBuilder::new()
//!     .add_item(LazItemType::Point10)
//!     .add_item(LazItemType::RGB12)
//!     .build();
//!
//! let mut compressor = SequentialPointRecordCompressor::new(std::io::Cursor::new(Vec::<u8>::new()));
//! compressor.set_fields_from(&items)?;
//! let points = vec![0u8; 26 * 10];
//! compressor.compress_many(&points)?;
//! compressor.done()?; // don't forget to call done when you are...done compressing
//! let compressed = compressor.into_stream().into_inner();
//!
//! let mut decompressor = SequentialPointRecordDecompressor::new(std::io::Cursor::new(compressed));
//! decompressor.set_fields_from(&items)?;
//! let mut decompressed = vec![0u8; 26 * 10];
//! decompressor.decompress_many(&mut decompressed)?;
//! assert_eq!(points, decompressed);
//! # Ok(())
//! # }
//! ```

pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod integer;
pub mod las;
pub mod models;
pub mod packers;
pub mod record;

pub use errors::LazError;
pub use las::items::{LazItem, LazItemRecordBuilder, LazItemType};
pub use record::{
    RecordCompressor, RecordDecompressor, SequentialPointRecordCompressor,
    SequentialPointRecordDecompressor,
};

pub type Result<T> = std::result::Result<T, LazError>;
