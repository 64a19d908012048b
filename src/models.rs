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

//! Adaptive probability models driven by the range coder.

use crate::errors::LazError;

// length bits discarded before mult.
pub(crate) const DM_LENGTH_SHIFT: u32 = 15;
// for adaptive models
pub(crate) const DM_MAX_COUNT: u32 = 1 << DM_LENGTH_SHIFT;

// length bits discarded before mult.
pub(crate) const BM_LENGTH_SHIFT: u32 = 13;
// for adaptive models
pub(crate) const BM_MAX_COUNT: u32 = 1 << BM_LENGTH_SHIFT;

pub const MIN_SYMBOLS: u32 = 2;
pub const MAX_SYMBOLS: u32 = 1 << 11;

/// Adaptive model over an alphabet of `symbols` symbols.
///
/// The cumulative distribution is scaled onto `2^15` and is recomputed
/// every `update_cycle` coded symbols, the cycle growing by 5/4 each time
/// until it reaches `(symbols + 6) * 8`.
#[derive(Debug, Clone)]
pub struct ArithmeticModel {
    pub(crate) symbols: u32,
    pub(crate) last_symbol: u32,

    pub(crate) distribution: Vec<u32>,
    pub(crate) symbol_count: Vec<u32>,
    // only present for decoding models with more than 16 symbols
    pub(crate) decoder_table: Vec<u32>,
    pub(crate) table_shift: u32,

    pub(crate) total_count: u32,
    pub(crate) update_cycle: u32,
    pub(crate) symbols_until_update: u32,
}

impl ArithmeticModel {
    /// Creates and initializes a model.
    ///
    /// # Panics
    ///
    /// Panics if `symbols` is not within `2..=2048`, use [`try_new`]
    /// to get an error instead.
    ///
    /// [`try_new`]: #method.try_new
    pub fn new(symbols: u32, for_decoding: bool) -> Self {
        match Self::try_new(symbols, for_decoding) {
            Ok(model) => model,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(symbols: u32, for_decoding: bool) -> crate::Result<Self> {
        if symbols < MIN_SYMBOLS || symbols > MAX_SYMBOLS {
            return Err(LazError::InvalidSymbolCount(symbols));
        }

        let (decoder_table, table_shift) = if for_decoding && symbols > 16 {
            let mut table_bits = 3u32;
            while symbols > (1u32 << (table_bits + 2)) {
                table_bits += 1;
            }
            let table_size = 1usize << table_bits;
            (vec![0u32; table_size + 2], DM_LENGTH_SHIFT - table_bits)
        } else {
            (Vec::new(), 0)
        };

        let mut model = Self {
            symbols,
            last_symbol: symbols - 1,
            distribution: vec![0u32; symbols as usize],
            symbol_count: vec![0u32; symbols as usize],
            decoder_table,
            table_shift,
            total_count: 0,
            update_cycle: 0,
            symbols_until_update: 0,
        };
        model.init();
        Ok(model)
    }

    /// Resets the model to the equiprobable state it had after construction.
    pub fn init(&mut self) {
        self.symbol_count.iter_mut().for_each(|count| *count = 1);
        self.total_count = 0;
        self.update_cycle = self.symbols;
        self.update();
        self.update_cycle = (self.symbols + 6) >> 1;
        self.symbols_until_update = self.update_cycle;
    }

    pub fn symbols(&self) -> u32 {
        self.symbols
    }

    /// Records one occurrence of `sym`, rescaling when the countdown expires.
    #[inline]
    pub(crate) fn increment(&mut self, sym: u32) {
        self.symbol_count[sym as usize] += 1;
        self.symbols_until_update -= 1;
        if self.symbols_until_update == 0 {
            self.update();
        }
    }

    pub(crate) fn update(&mut self) {
        // halve counts when the threshold is reached
        self.total_count += self.update_cycle;
        if self.total_count > DM_MAX_COUNT {
            self.total_count = 0;
            for count in &mut self.symbol_count {
                *count = (*count + 1) >> 1;
                self.total_count += *count;
            }
        }

        let scale = 0x8000_0000u32 / self.total_count;
        let mut sum = 0u32;

        if self.decoder_table.is_empty() {
            for (distribution, count) in self.distribution.iter_mut().zip(&self.symbol_count) {
                *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += *count;
            }
        } else {
            let table_size = self.decoder_table.len() - 2;
            let mut s = 0usize;
            for (k, (distribution, count)) in self
                .distribution
                .iter_mut()
                .zip(&self.symbol_count)
                .enumerate()
            {
                *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += *count;
                let w = (*distribution >> self.table_shift) as usize;
                while s < w {
                    s += 1;
                    self.decoder_table[s] = (k - 1) as u32;
                }
            }
            self.decoder_table[0] = 0;
            while s <= table_size {
                s += 1;
                self.decoder_table[s] = self.symbols - 1;
            }
        }

        self.update_cycle = (5 * self.update_cycle) >> 2;
        let max_cycle = (self.symbols + 6) << 3;
        if self.update_cycle > max_cycle {
            self.update_cycle = max_cycle;
        }
        self.symbols_until_update = self.update_cycle;
    }
}

/// Adaptive model for binary symbols, the probability of a 0 is scaled onto `2^13`.
#[derive(Debug, Clone)]
pub struct ArithmeticBitModel {
    pub(crate) bit_0_count: u32,
    pub(crate) bit_count: u32,
    pub(crate) bit_0_prob: u32,
    pub(crate) bits_until_update: u32,
    pub(crate) update_cycle: u32,
}

impl ArithmeticBitModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub(crate) fn tick(&mut self) {
        self.bits_until_update -= 1;
        if self.bits_until_update == 0 {
            self.update();
        }
    }

    pub(crate) fn update(&mut self) {
        // halve counts when the threshold is reached
        self.bit_count += self.update_cycle;
        if self.bit_count > BM_MAX_COUNT {
            self.bit_count = (self.bit_count + 1) >> 1;
            self.bit_0_count = (self.bit_0_count + 1) >> 1;
            if self.bit_0_count == self.bit_count {
                self.bit_count += 1;
            }
        }

        let scale = 0x8000_0000u32 / self.bit_count;
        self.bit_0_prob = (self.bit_0_count * scale) >> (31 - BM_LENGTH_SHIFT);

        self.update_cycle = (5 * self.update_cycle) >> 2;
        if self.update_cycle > 64 {
            self.update_cycle = 64;
        }
        self.bits_until_update = self.update_cycle;
    }
}

impl Default for ArithmeticBitModel {
    fn default() -> Self {
        // equiprobable, with frequent updates at first
        Self {
            bit_0_count: 1,
            bit_count: 2,
            bit_0_prob: 1u32 << (BM_LENGTH_SHIFT - 1),
            bits_until_update: 4,
            update_cycle: 4,
        }
    }
}

pub struct ArithmeticModelBuilder {
    symbols: u32,
    for_decoding: bool,
}

impl ArithmeticModelBuilder {
    pub fn new(symbols: u32) -> Self {
        Self {
            symbols,
            for_decoding: false,
        }
    }

    /// Decoding models get a lookup table to speed up the symbol search.
    pub fn for_decoding(mut self, yes: bool) -> Self {
        self.for_decoding = yes;
        self
    }

    pub fn build(self) -> ArithmeticModel {
        ArithmeticModel::new(self.symbols, self.for_decoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_count_bounds() {
        assert!(ArithmeticModel::try_new(1, false).is_err());
        assert!(ArithmeticModel::try_new(2, false).is_ok());
        assert!(ArithmeticModel::try_new(2048, true).is_ok());
        match ArithmeticModel::try_new(2049, true) {
            Err(LazError::InvalidSymbolCount(2049)) => {}
            other => panic!("unexpected: {:?}", other.map(|m| m.symbols)),
        }
    }

    #[test]
    #[should_panic]
    fn test_new_panics_on_zero_symbols() {
        let _ = ArithmeticModelBuilder::new(0).build();
    }

    #[test]
    fn test_initial_distribution_is_uniform() {
        let model = ArithmeticModel::new(4, false);
        // 4 symbols with a count of 1 each, scaled onto 2^15
        assert_eq!(model.distribution, vec![0, 8192, 16384, 24576]);
        assert_eq!(model.symbols_until_update, 5);
    }

    #[test]
    fn test_decoder_table_does_not_change_distribution() {
        let mut enc_model = ArithmeticModel::new(256, false);
        let mut dec_model = ArithmeticModel::new(256, true);
        assert!(enc_model.decoder_table.is_empty());
        assert_eq!(dec_model.decoder_table.len(), (1 << 6) + 2);

        for i in 0..10_000u32 {
            let sym = (i * 7 + i / 13) % 256;
            enc_model.increment(sym);
            dec_model.increment(sym);
        }
        assert_eq!(enc_model.distribution, dec_model.distribution);
        assert_eq!(enc_model.total_count, dec_model.total_count);
    }

    #[test]
    fn test_counts_are_halved_and_never_zero() {
        let mut model = ArithmeticModel::new(2, false);
        for _ in 0..100_000 {
            model.increment(0);
        }
        assert!(model.total_count <= DM_MAX_COUNT + model.update_cycle);
        assert!(model.symbol_count.iter().all(|&c| c > 0));
        assert_eq!(model.update_cycle, (2 + 6) << 3);
    }

    #[test]
    fn test_init_restores_fresh_state() {
        let fresh = ArithmeticModel::new(64, true);
        let mut model = ArithmeticModel::new(64, true);
        for i in 0..500 {
            model.increment(i % 3);
        }
        model.init();
        assert_eq!(model.distribution, fresh.distribution);
        assert_eq!(model.decoder_table, fresh.decoder_table);
        assert_eq!(model.symbols_until_update, fresh.symbols_until_update);
        assert_eq!(model.update_cycle, fresh.update_cycle);
    }

    #[test]
    fn test_bit_model_rescale() {
        let mut model = ArithmeticBitModel::new();
        assert_eq!(model.bit_0_prob, 1 << 12);
        for _ in 0..20_000 {
            model.bit_0_count += 1;
            model.tick();
        }
        assert!(model.bit_count <= BM_MAX_COUNT);
        assert!(model.bit_0_prob > (1 << 12));
        assert_eq!(model.update_cycle, 64);

        model.init();
        assert_eq!(model.bit_0_prob, 1 << 12);
        assert_eq!(model.bits_until_update, 4);
    }
}
