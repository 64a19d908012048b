/*
===============================================================================

  PROGRAMMERS:

    martin.isenburg@rapidlasso.com  -  http://rapidlasso.com
    uday.karan@gmail.com - Hobu, Inc.

  COPYRIGHT:

    (c) 2007-2014, martin isenburg, rapidlasso - tools to catch reality
    (c) 2014, Uday Verma, Hobu, Inc.
    (c) 2019, Thomas Montaigu

    This is free software; you can redistribute and/or modify it under the
    terms of the Apache Public License 2.0 published by the Apache Software
    Foundation. See the COPYING file for more information.

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

  CHANGE HISTORY:
    6 June 2019: Translated to Rust

===============================================================================
*/

// Derived from the arithmetic coding examples of Amir Said & William A. Pearlman,
// see encoders.rs for the full notice.

//! The decoding half of the range coder.

use std::io::Read;

use byteorder::ReadBytesExt;

use crate::models::{ArithmeticBitModel, ArithmeticModel, BM_LENGTH_SHIFT, DM_LENGTH_SHIFT};

// maximum AC interval length
pub const AC_MAX_LENGTH: u32 = 0xFFFF_FFFF;
// threshold for renormalization
pub const AC_MIN_LENGTH: u32 = 0x0100_0000;

/// Range decoder reading from `R`.
///
/// Running out of input is reported as an `UnexpectedEof` io error, there
/// is no way to resume decoding after that.
pub struct ArithmeticDecoder<R: Read> {
    in_stream: R,
    value: u32,
    length: u32,
}

impl<R: Read> ArithmeticDecoder<R> {
    pub fn new(in_stream: R) -> Self {
        Self {
            in_stream,
            value: 0,
            length: AC_MAX_LENGTH,
        }
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.length = AC_MAX_LENGTH;
    }

    /// Loads the first 4 bytes of the coded stream, must be called before decoding.
    pub fn read_init_bytes(&mut self) -> std::io::Result<()> {
        let mut v = [0u8; 4];
        self.in_stream.read_exact(&mut v)?;
        self.value = u32::from_be_bytes(v);
        Ok(())
    }

    pub fn decode_bit(&mut self, model: &mut ArithmeticBitModel) -> std::io::Result<u32> {
        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);
        let sym = self.value >= x;
        if sym {
            self.value -= x;
            self.length -= x;
        } else {
            self.length = x;
            model.bit_0_count += 1;
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval()?;
        }
        model.tick();
        Ok(sym as u32)
    }

    pub fn decode_symbol(&mut self, model: &mut ArithmeticModel) -> std::io::Result<u32> {
        let (sym, x, y) = if model.decoder_table.is_empty() {
            self.bisect(model)
        } else {
            self.table_lookup(model)
        };

        self.value -= x;
        self.length = y - x;
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval()?;
        }
        model.increment(sym);
        Ok(sym)
    }

    /// Returns the symbol and the interval `[x, y)` it covers.
    fn table_lookup(&mut self, model: &ArithmeticModel) -> (u32, u32, u32) {
        let mut y = self.length;
        self.length >>= DM_LENGTH_SHIFT;
        let dv = self.value / self.length;
        let t = (dv >> model.table_shift) as usize;

        // initial decision based on table look-up, finished by bisection
        let mut sym = model.decoder_table[t];
        let mut n = model.decoder_table[t + 1] + 1;
        while n > sym + 1 {
            let k = (sym + n) >> 1;
            if model.distribution[k as usize] > dv {
                n = k;
            } else {
                sym = k;
            }
        }

        let x = model.distribution[sym as usize] * self.length;
        if sym != model.last_symbol {
            y = model.distribution[sym as usize + 1] * self.length;
        }
        (sym, x, y)
    }

    fn bisect(&mut self, model: &ArithmeticModel) -> (u32, u32, u32) {
        let mut x = 0u32;
        let mut y = self.length;
        let mut sym = 0u32;
        let mut n = model.symbols;
        self.length >>= DM_LENGTH_SHIFT;

        let mut k = n >> 1;
        loop {
            let z = self.length * model.distribution[k as usize];
            if z > self.value {
                // value is smaller
                n = k;
                y = z;
            } else {
                // value is larger or equal
                sym = k;
                x = z;
            }
            k = (sym + n) >> 1;
            if k == sym {
                break;
            }
        }
        (sym, x, y)
    }

    /// Reads `bits` raw bits, `bits` must be in `1..=32`.
    pub fn read_bits(&mut self, bits: u32) -> std::io::Result<u32> {
        debug_assert!(bits > 0 && bits <= 32);
        if bits > 19 {
            let lower = u32::from(self.read_short()?);
            let upper = self.read_bits(bits - 16)?;
            Ok(upper << 16 | lower)
        } else {
            self.length >>= bits;
            let sym = self.value / self.length;
            self.value -= self.length * sym;
            if self.length < AC_MIN_LENGTH {
                self.renorm_dec_interval()?;
            }
            Ok(sym)
        }
    }

    fn read_short(&mut self) -> std::io::Result<u16> {
        self.length >>= 16;
        let sym = self.value / self.length;
        self.value -= self.length * sym;
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval()?;
        }
        debug_assert!(sym < (1 << 16));
        Ok(sym as u16)
    }

    fn renorm_dec_interval(&mut self) -> std::io::Result<()> {
        loop {
            self.value = (self.value << 8) | u32::from(self.in_stream.read_u8()?);
            self.length <<= 8;
            if self.length >= AC_MIN_LENGTH {
                break;
            }
        }
        Ok(())
    }

    pub fn in_stream(&mut self) -> &mut R {
        &mut self.in_stream
    }

    pub fn into_stream(self) -> R {
        self.in_stream
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::encoders::ArithmeticEncoder;

    fn encode_with<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut ArithmeticEncoder<Cursor<Vec<u8>>>),
    {
        let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
        f(&mut encoder);
        encoder.done().unwrap();
        encoder.into_stream().into_inner()
    }

    #[test]
    fn test_symbols_with_and_without_table() {
        let symbols: Vec<u32> = (0..3000u32).map(|i| (i * i + 7 * i) % 300).collect();
        let data = encode_with(|encoder| {
            let mut model = ArithmeticModel::new(300, false);
            for &s in &symbols {
                encoder.encode_symbol(&mut model, s).unwrap();
            }
        });

        // a table-less decoding model must give the same symbols
        for &with_table in &[true, false] {
            let mut decoder = ArithmeticDecoder::new(Cursor::new(data.clone()));
            decoder.read_init_bytes().unwrap();
            let mut model = ArithmeticModel::new(300, with_table);
            for &s in &symbols {
                assert_eq!(decoder.decode_symbol(&mut model).unwrap(), s);
            }
        }
    }

    #[test]
    fn test_skewed_bits() {
        let bits: Vec<u32> = (0..10_000u32).map(|i| (i % 17 == 0) as u32).collect();
        let data = encode_with(|encoder| {
            let mut model = ArithmeticBitModel::new();
            for &b in &bits {
                encoder.encode_bit(&mut model, b).unwrap();
            }
        });
        // heavily skewed input compresses well below one bit per symbol
        assert!(data.len() < bits.len() / 8 / 2);

        let mut decoder = ArithmeticDecoder::new(Cursor::new(data));
        decoder.read_init_bytes().unwrap();
        let mut model = ArithmeticBitModel::new();
        for &b in &bits {
            assert_eq!(decoder.decode_bit(&mut model).unwrap(), b);
        }
    }

    #[test]
    fn test_raw_bits_of_every_width() {
        let data = encode_with(|encoder| {
            for bits in 1..=32u32 {
                let max = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
                encoder.write_bits(bits, max).unwrap();
                encoder.write_bits(bits, max / 3).unwrap();
                encoder.write_bits(bits, 0).unwrap();
            }
        });

        let mut decoder = ArithmeticDecoder::new(Cursor::new(data));
        decoder.read_init_bytes().unwrap();
        for bits in 1..=32u32 {
            let max = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
            assert_eq!(decoder.read_bits(bits).unwrap(), max);
            assert_eq!(decoder.read_bits(bits).unwrap(), max / 3);
            assert_eq!(decoder.read_bits(bits).unwrap(), 0);
        }
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let data = encode_with(|encoder| {
            for i in 0..1000u32 {
                encoder.write_bits(16, i * 37 % 65536).unwrap();
            }
        });

        let mut decoder = ArithmeticDecoder::new(Cursor::new(data[..data.len() / 2].to_vec()));
        decoder.read_init_bytes().unwrap();
        let result = (0..1000).try_for_each(|_| decoder.read_bits(16).map(|_| ()));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_init_bytes_need_four_bytes() {
        let mut decoder = ArithmeticDecoder::new(Cursor::new(vec![1u8, 0, 0]));
        assert!(decoder.read_init_bytes().is_err());
    }
}
