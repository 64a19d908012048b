//! Record layer: drives one codec per field of a point over a single
//! range coder.
//!
//! The points data of a block is organized as follow:
//!
//! 1) 1 Raw Point (as per ASPRS LAS definition)
//! 2) n compressed Points

use std::io::{Read, Write};

use tracing::debug;

use crate::decoders::ArithmeticDecoder;
use crate::encoders::ArithmeticEncoder;
use crate::errors::LazError;
use crate::las;
use crate::las::items::{LazItem, LazItemType};

/***************************************************************************************************
                    Decompression Related Traits
***************************************************************************************************/

pub trait FieldDecompressor<R: Read> {
    fn size_of_field(&self) -> usize;

    fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()>;

    fn decompress_with(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        buf: &mut [u8],
    ) -> std::io::Result<()>;
}

pub trait RecordDecompressor<R> {
    fn set_fields_from(&mut self, laz_items: &[LazItem]) -> crate::Result<()>;
    fn record_size(&self) -> usize;

    fn decompress_next(&mut self, out: &mut [u8]) -> std::io::Result<()>;

    /// Fills `out` with as many records as it can hold
    fn decompress_many(&mut self, out: &mut [u8]) -> crate::Result<()> {
        let record_size = self.record_size();
        check_buffer_len(out.len(), record_size)?;
        for record in out.chunks_exact_mut(record_size) {
            self.decompress_next(record)?;
        }
        Ok(())
    }

    fn reset(&mut self);

    fn get_mut(&mut self) -> &mut R;
    fn into_stream(self) -> R;
}

/***************************************************************************************************
                    Compression related Traits
***************************************************************************************************/

pub trait FieldCompressor<W: Write> {
    fn size_of_field(&self) -> usize;

    fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()>;

    fn compress_with(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        buf: &[u8],
    ) -> std::io::Result<()>;
}

pub trait RecordCompressor<W> {
    fn set_fields_from(&mut self, laz_items: &[LazItem]) -> crate::Result<()>;
    fn record_size(&self) -> usize;

    fn compress_next(&mut self, input: &[u8]) -> std::io::Result<()>;

    /// Compresses all the records contained in `input`
    fn compress_many(&mut self, input: &[u8]) -> crate::Result<()> {
        let record_size = self.record_size();
        check_buffer_len(input.len(), record_size)?;
        for record in input.chunks_exact(record_size) {
            self.compress_next(record)?;
        }
        Ok(())
    }

    fn done(&mut self) -> std::io::Result<()>;
    fn reset(&mut self);

    fn get_mut(&mut self) -> &mut W;
    fn into_stream(self) -> W;
}

fn check_buffer_len(buffer_len: usize, point_size: usize) -> crate::Result<()> {
    if point_size == 0 || buffer_len % point_size != 0 {
        Err(LazError::BufferLenNotMultipleOfPointSize {
            buffer_len,
            point_size,
        })
    } else {
        Ok(())
    }
}

fn unsupported(item: &LazItem) -> LazError {
    debug!(
        "unsupported item {:?} with version {}",
        item.item_type, item.version
    );
    LazError::UnsupportedLazItemVersion(item.item_type, item.version)
}

/***************************************************************************************************
                    Record Decompressor implementation
***************************************************************************************************/

pub struct SequentialPointRecordDecompressor<R: Read> {
    field_decompressors: Vec<Box<dyn FieldDecompressor<R> + Send>>,
    decoder: ArithmeticDecoder<R>,
    is_first_decompression: bool,
    record_size: usize,
}

impl<R: Read> SequentialPointRecordDecompressor<R> {
    pub fn new(input: R) -> Self {
        Self {
            field_decompressors: vec![],
            decoder: ArithmeticDecoder::new(input),
            is_first_decompression: true,
            record_size: 0,
        }
    }

    pub fn add_field_decompressor<T: 'static + FieldDecompressor<R> + Send>(&mut self, field: T) {
        self.record_size += field.size_of_field();
        self.field_decompressors.push(Box::new(field));
    }
}

impl<R: Read> RecordDecompressor<R> for SequentialPointRecordDecompressor<R> {
    fn set_fields_from(&mut self, laz_items: &[LazItem]) -> crate::Result<()> {
        for record_item in laz_items {
            match (record_item.version, record_item.item_type) {
                (2, LazItemType::Point10) => {
                    self.add_field_decompressor(las::v2::Point10Decompressor::new())
                }
                (2, LazItemType::RGB12) => {
                    self.add_field_decompressor(las::v2::RGBDecompressor::new())
                }
                _ => return Err(unsupported(record_item)),
            }
        }
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn decompress_next(&mut self, out: &mut [u8]) -> std::io::Result<()> {
        let mut field_start = 0;
        if self.is_first_decompression {
            for field in &mut self.field_decompressors {
                let field_end = field_start + field.size_of_field();
                field.decompress_first(self.decoder.in_stream(), &mut out[field_start..field_end])?;
                field_start = field_end;
            }
            self.is_first_decompression = false;

            // the coded stream starts right after the raw first record
            self.decoder.read_init_bytes()?;
            debug!("read first record ({} bytes)", self.record_size);
        } else {
            for field in &mut self.field_decompressors {
                let field_end = field_start + field.size_of_field();
                field.decompress_with(&mut self.decoder, &mut out[field_start..field_end])?;
                field_start = field_end;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        debug!("resetting record decompressor");
        self.decoder.reset();
        self.is_first_decompression = true;
        self.field_decompressors.clear();
        self.record_size = 0;
    }

    fn get_mut(&mut self) -> &mut R {
        self.decoder.in_stream()
    }

    fn into_stream(self) -> R {
        self.decoder.into_stream()
    }
}

/***************************************************************************************************
                    Record Compressor implementation
***************************************************************************************************/

pub struct SequentialPointRecordCompressor<W: Write> {
    is_first_compression: bool,
    field_compressors: Vec<Box<dyn FieldCompressor<W> + Send>>,
    encoder: ArithmeticEncoder<W>,
    record_size: usize,
}

impl<W: Write> SequentialPointRecordCompressor<W> {
    pub fn new(output: W) -> Self {
        Self {
            is_first_compression: true,
            field_compressors: vec![],
            encoder: ArithmeticEncoder::new(output),
            record_size: 0,
        }
    }

    pub fn add_field_compressor<T: 'static + FieldCompressor<W> + Send>(&mut self, field: T) {
        self.record_size += field.size_of_field();
        self.field_compressors.push(Box::new(field));
    }
}

impl<W: Write> RecordCompressor<W> for SequentialPointRecordCompressor<W> {
    fn set_fields_from(&mut self, laz_items: &[LazItem]) -> crate::Result<()> {
        for record_item in laz_items {
            match (record_item.version, record_item.item_type) {
                (2, LazItemType::Point10) => {
                    self.add_field_compressor(las::v2::Point10Compressor::new())
                }
                (2, LazItemType::RGB12) => self.add_field_compressor(las::v2::RGBCompressor::new()),
                _ => return Err(unsupported(record_item)),
            }
        }
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn compress_next(&mut self, input: &[u8]) -> std::io::Result<()> {
        let mut field_start = 0;
        if self.is_first_compression {
            for field in &mut self.field_compressors {
                let field_end = field_start + field.size_of_field();
                field.compress_first(self.encoder.out_stream(), &input[field_start..field_end])?;
                field_start = field_end;
            }
            self.is_first_compression = false;
            debug!("wrote first record ({} bytes)", self.record_size);
        } else {
            for field in &mut self.field_compressors {
                let field_end = field_start + field.size_of_field();
                field.compress_with(&mut self.encoder, &input[field_start..field_end])?;
                field_start = field_end;
            }
        }
        Ok(())
    }

    fn done(&mut self) -> std::io::Result<()> {
        debug!("flushing the range coder");
        self.encoder.done()
    }

    fn reset(&mut self) {
        debug!("resetting record compressor");
        self.is_first_compression = true;
        self.encoder.reset();
        self.field_compressors.clear();
        self.record_size = 0;
    }

    fn get_mut(&mut self) -> &mut W {
        self.encoder.out_stream()
    }

    fn into_stream(self) -> W {
        self.encoder.into_stream()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::las::items::LazItemRecordBuilder;
    use crate::las::{Point10, RGB};
    use crate::packers::Packable;

    const RECORD_SIZE: usize = Point10::SIZE + RGB::SIZE;

    fn records(count: usize) -> Vec<u8> {
        let mut buf = vec![0u8; count * RECORD_SIZE];
        for (i, record) in buf.chunks_exact_mut(RECORD_SIZE).enumerate() {
            let i = i as i32;
            let point = Point10 {
                x: 1000 + i * 3,
                y: -500 + (i * 7) % 50,
                z: 20 + i % 4,
                intensity: (i * 13 % 400) as u16,
                return_number: (i % 2 + 1) as u8,
                number_of_returns_of_given_pulse: 2,
                classification: 2,
                ..Default::default()
            };
            point.pack_into(&mut record[..Point10::SIZE]);
            let v = (i * 97) as u16;
            RGB {
                red: v,
                green: v.wrapping_add(3),
                blue: v,
            }
            .pack_into(&mut record[Point10::SIZE..]);
        }
        buf
    }

    fn compressor() -> SequentialPointRecordCompressor<Cursor<Vec<u8>>> {
        let mut compressor = SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
        compressor
            .set_fields_from(&LazItemRecordBuilder::default_for_point10(true))
            .unwrap();
        compressor
    }

    fn decompressor(data: Vec<u8>) -> SequentialPointRecordDecompressor<Cursor<Vec<u8>>> {
        let mut decompressor = SequentialPointRecordDecompressor::new(Cursor::new(data));
        decompressor
            .set_fields_from(&LazItemRecordBuilder::default_for_point10(true))
            .unwrap();
        decompressor
    }

    #[test]
    fn test_round_trip() {
        let input = records(500);
        let mut compressor = compressor();
        assert_eq!(compressor.record_size(), RECORD_SIZE);
        compressor.compress_many(&input).unwrap();
        compressor.done().unwrap();
        let data = compressor.into_stream().into_inner();
        assert!(data.len() < input.len());

        let mut decompressor = decompressor(data);
        let mut output = vec![0u8; input.len()];
        decompressor.decompress_many(&mut output).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_first_record_is_stored_raw() {
        let input = records(3);
        let mut compressor = compressor();
        compressor.compress_many(&input).unwrap();
        compressor.done().unwrap();
        let data = compressor.into_stream().into_inner();
        assert_eq!(&data[..RECORD_SIZE], &input[..RECORD_SIZE]);
    }

    #[test]
    fn test_single_record() {
        let input = records(1);
        let mut compressor = compressor();
        compressor.compress_next(&input).unwrap();
        compressor.done().unwrap();
        let data = compressor.into_stream().into_inner();
        // raw record then the flush of an empty coder
        assert_eq!(&data[RECORD_SIZE..], &[1, 0, 0, 0]);

        let mut decompressor = decompressor(data);
        let mut output = vec![0u8; RECORD_SIZE];
        decompressor.decompress_next(&mut output).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_reset_starts_a_new_block() {
        let input = records(50);
        let mut compressor = compressor();
        compressor.compress_many(&input).unwrap();
        compressor.done().unwrap();
        let first_len = compressor.get_mut().get_ref().len();

        compressor.reset();
        assert_eq!(compressor.record_size(), 0);
        compressor
            .set_fields_from(&LazItemRecordBuilder::default_for_point10(true))
            .unwrap();
        compressor.compress_many(&input).unwrap();
        compressor.done().unwrap();
        let data = compressor.into_stream().into_inner();
        assert_eq!(data[..first_len], data[first_len..]);
    }

    #[test]
    fn test_unsupported_version() {
        let items = vec![LazItem::new(LazItemType::Point10, 1)];
        let mut compressor = SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
        match compressor.set_fields_from(&items) {
            Err(LazError::UnsupportedLazItemVersion(LazItemType::Point10, 1)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        let items = vec![LazItem::new(LazItemType::RGB12, 3)];
        let mut decompressor = SequentialPointRecordDecompressor::new(Cursor::new(Vec::<u8>::new()));
        assert!(decompressor.set_fields_from(&items).is_err());
    }

    #[test]
    fn test_buffer_len_must_be_a_multiple_of_record_size() {
        let mut compressor = compressor();
        match compressor.compress_many(&[0u8; RECORD_SIZE + 1]) {
            Err(LazError::BufferLenNotMultipleOfPointSize {
                buffer_len: 27,
                point_size: 26,
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_truncated_stream() {
        let input = records(100);
        let mut compressor = compressor();
        compressor.compress_many(&input).unwrap();
        compressor.done().unwrap();
        let mut data = compressor.into_stream().into_inner();
        data.truncate(RECORD_SIZE + 10);

        let mut decompressor = decompressor(data);
        let mut output = vec![0u8; input.len()];
        assert!(matches!(
            decompressor.decompress_many(&mut output),
            Err(LazError::IoError(_))
        ));
    }
}
