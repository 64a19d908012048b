/*
===============================================================================

  CONTENTS:
    Integer compressor

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

//! Coding of integers as corrections to a prediction.
//!
//! A corrector `c = real - pred` is coded in two parts: first the number `k`
//! of the tightest interval `[-(2^k - 1), 2^k]` containing it, then the
//! position of `c` inside that interval.

use std::io::{Read, Write};

use crate::decoders::ArithmeticDecoder;
use crate::encoders::ArithmeticEncoder;
use crate::models::{ArithmeticBitModel, ArithmeticModel, MAX_SYMBOLS};

pub const DEFAULT_BITS: u32 = 16;
pub const DEFAULT_CONTEXTS: u32 = 1;
pub const DEFAULT_BITS_HIGH: u32 = 8;
pub const DEFAULT_RANGE: u32 = 0;

// widest corrector alphabet a symbol model can hold
const MAX_BITS_HIGH: u32 = 31 - MAX_SYMBOLS.leading_zeros();

#[derive(Debug, Clone)]
pub struct IntegerCompressor {
    k: u32,

    contexts: u32,
    bits_high: u32,

    corr_bits: u32,
    corr_range: u32,
    corr_min: i32,
    corr_max: i32,

    m_bits: Vec<ArithmeticModel>,
    m_corrector_0: ArithmeticBitModel,
    m_corrector: Vec<ArithmeticModel>,
}

impl IntegerCompressor {
    /// Creates a compressor whose models are not allocated yet,
    /// [`init`](#method.init) must be called before coding.
    ///
    /// `bits_high` is clamped to `1..=11`.
    pub fn new(bits: u32, contexts: u32, bits_high: u32, mut range: u32) -> Self {
        let (corr_bits, corr_range, corr_min, corr_max) = if range != 0 {
            let corr_range = range;
            let mut corr_bits = 0u32;
            while range != 0 {
                range >>= 1;
                corr_bits += 1;
            }
            // an exact power of two needs one bit less
            if corr_range == (1u32 << (corr_bits - 1)) {
                corr_bits -= 1;
            }
            let corr_min = -((corr_range / 2) as i32);
            (
                corr_bits,
                corr_range,
                corr_min,
                corr_min + (corr_range - 1) as i32,
            )
        } else if bits >= 1 && bits < 32 {
            let corr_range = 1u32 << bits;
            let corr_min = -((corr_range / 2) as i32);
            (bits, corr_range, corr_min, corr_min + (corr_range - 1) as i32)
        } else {
            (32, 0, std::i32::MIN, std::i32::MAX)
        };

        Self {
            k: 0,
            contexts,
            bits_high: num_traits::clamp(bits_high, 1, MAX_BITS_HIGH),
            corr_bits,
            corr_range,
            corr_min,
            corr_max,
            m_bits: vec![],
            m_corrector_0: ArithmeticBitModel::new(),
            m_corrector: vec![],
        }
    }

    /// The interval number of the last coded corrector.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Allocates the models on the first call, puts them back in their
    /// initial state on the following ones.
    pub fn init(&mut self) {
        if self.m_bits.is_empty() {
            self.m_bits = (0..self.contexts)
                .map(|_| ArithmeticModel::new(self.corr_bits + 1, false))
                .collect();
            let bits_high = self.bits_high;
            self.m_corrector = (1..=self.corr_bits)
                .map(|i| ArithmeticModel::new(1u32 << i.min(bits_high), false))
                .collect();
        } else {
            self.m_bits.iter_mut().for_each(ArithmeticModel::init);
            self.m_corrector.iter_mut().for_each(ArithmeticModel::init);
        }
        self.m_corrector_0.init();
    }

    pub fn compress<W: Write>(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        pred: i32,
        real: i32,
        context: u32,
    ) -> std::io::Result<()> {
        // the corrector is within [-(corr_range - 1), corr_range - 1],
        // fold it into [corr_min, corr_max]
        let mut corr = real.wrapping_sub(pred);
        if corr < self.corr_min {
            corr = corr.wrapping_add(self.corr_range as i32);
        } else if corr > self.corr_max {
            corr = corr.wrapping_sub(self.corr_range as i32);
        }
        self.write_corrector(encoder, corr, context)
    }

    fn write_corrector<W: Write>(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        mut c: i32,
        context: u32,
    ) -> std::io::Result<()> {
        // absolute value of c, adjusted for the case that c is 2^k
        let mut c1 = if c <= 0 { c.wrapping_neg() } else { c - 1 } as u32;
        self.k = 0;
        while c1 != 0 {
            c1 >>= 1;
            self.k += 1;
        }

        encoder.encode_symbol(&mut self.m_bits[context as usize], self.k)?;

        if self.k == 0 {
            // c is 0 or 1
            debug_assert!(c == 0 || c == 1);
            return encoder.encode_bit(&mut self.m_corrector_0, c as u32);
        }
        if self.k == 32 {
            // only i32::MIN lands here, it is implied by k alone
            return Ok(());
        }

        // translate c into the k-bit interval [0, 2^k - 1]
        if c >= 0 {
            c -= 1;
        } else {
            c += ((1u32 << self.k) - 1) as i32;
        }

        let model = &mut self.m_corrector[(self.k - 1) as usize];
        if self.k <= self.bits_high {
            encoder.encode_symbol(model, c as u32)
        } else {
            // the high bits_high bits go through the model, the rest raw
            let k1 = self.k - self.bits_high;
            let low = (c as u32) & ((1u32 << k1) - 1);
            encoder.encode_symbol(model, (c >> k1) as u32)?;
            encoder.write_bits(k1, low)
        }
    }

    pub fn decompress<R: Read>(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        pred: i32,
        context: u32,
    ) -> std::io::Result<i32> {
        let corr = self.read_corrector(decoder, context)?;
        let mut real = pred.wrapping_add(corr);
        if real < 0 {
            real = real.wrapping_add(self.corr_range as i32);
        } else if (real as u32) >= self.corr_range && self.corr_range != 0 {
            real -= self.corr_range as i32;
        }
        Ok(real)
    }

    fn read_corrector<R: Read>(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        context: u32,
    ) -> std::io::Result<i32> {
        self.k = decoder.decode_symbol(&mut self.m_bits[context as usize])?;

        if self.k == 0 {
            return Ok(decoder.decode_bit(&mut self.m_corrector_0)? as i32);
        }
        if self.k >= 32 {
            return Ok(self.corr_min);
        }

        let model = &mut self.m_corrector[(self.k - 1) as usize];
        let mut c = if self.k <= self.bits_high {
            decoder.decode_symbol(model)? as i32
        } else {
            let k1 = self.k - self.bits_high;
            let high = decoder.decode_symbol(model)? as i32;
            let low = decoder.read_bits(k1)?;
            (high << k1) | low as i32
        };

        // translate c back into its interval
        if c >= (1u32 << (self.k - 1)) as i32 {
            c += 1;
        } else {
            c -= ((1u32 << self.k) - 1) as i32;
        }
        Ok(c)
    }
}

pub struct IntegerCompressorBuilder {
    bits: u32,
    contexts: u32,
    bits_high: u32,
    range: u32,
}

impl IntegerCompressorBuilder {
    pub fn new() -> Self {
        Self {
            bits: DEFAULT_BITS,
            contexts: DEFAULT_CONTEXTS,
            bits_high: DEFAULT_BITS_HIGH,
            range: DEFAULT_RANGE,
        }
    }

    pub fn bits(&mut self, bits: u32) -> &mut Self {
        self.bits = bits;
        self
    }

    pub fn contexts(&mut self, contexts: u32) -> &mut Self {
        self.contexts = contexts;
        self
    }

    pub fn bits_high(&mut self, bits_high: u32) -> &mut Self {
        self.bits_high = bits_high;
        self
    }

    pub fn range(&mut self, range: u32) -> &mut Self {
        self.range = range;
        self
    }

    pub fn build(&self) -> IntegerCompressor {
        IntegerCompressor::new(self.bits, self.contexts, self.bits_high, self.range)
    }

    pub fn build_initialized(&self) -> IntegerCompressor {
        let mut ic = self.build();
        ic.init();
        ic
    }
}

impl Default for IntegerCompressorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
