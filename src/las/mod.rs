//! LAS point types and their compressors / decompressors

pub mod items;
pub mod median;
pub mod point10;
pub mod rgb;

mod utils;

pub use point10::Point10;
pub use rgb::{LasRGB, RGB};

pub mod v2 {
    pub use crate::las::point10::v2::{Point10Compressor, Point10Decompressor};
    pub use crate::las::rgb::v2::{RGBCompressor, RGBDecompressor};
}
