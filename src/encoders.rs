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

// Fast arithmetic coding implementation
// -> 32-bit variables, 32-bit product, periodic updates, table decoding
//
// Derived from the arithmetic coding examples of
// Digital Signal Compression: Principles and Practice
// (Cambridge University Press, 2011, ISBN: 9780511984655)
//
// Copyright (c) 2019 by Amir Said (said@ieee.org) &
//                       William A. Pearlman (pearlw@ecse.rpi.edu)
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright
// notice, this list of conditions and the following disclaimer in the
// documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES ARE DISCLAIMED.

//! The encoding half of the range coder.

use std::io::Write;

use crate::decoders::{AC_MAX_LENGTH, AC_MIN_LENGTH};
use crate::models::{ArithmeticBitModel, ArithmeticModel, BM_LENGTH_SHIFT, DM_LENGTH_SHIFT};

const AC_BUFFER_SIZE: usize = 1024;
const AC_RING_SIZE: usize = 2 * AC_BUFFER_SIZE;

/// Range encoder writing into `W`.
///
/// Output bytes go through a ring buffer of two halves: a half is only
/// handed to the stream once the cursor wraps into it again, so that a
/// carry can still reach the bytes emitted before.
pub struct ArithmeticEncoder<W: Write> {
    out_buffer: Box<[u8]>,
    out_byte: usize,
    end_byte: usize,

    base: u32,
    length: u32,

    out_stream: W,
}

impl<W: Write> ArithmeticEncoder<W> {
    pub fn new(out_stream: W) -> Self {
        Self {
            out_buffer: vec![0u8; AC_RING_SIZE].into_boxed_slice(),
            out_byte: 0,
            end_byte: AC_RING_SIZE,
            base: 0,
            length: AC_MAX_LENGTH,
            out_stream,
        }
    }

    /// Puts the registers and the ring buffer back into their initial state,
    /// bytes not flushed by [`done`](#method.done) are lost.
    pub fn reset(&mut self) {
        self.base = 0;
        self.length = AC_MAX_LENGTH;
        self.out_buffer.iter_mut().for_each(|b| *b = 0);
        self.out_byte = 0;
        self.end_byte = AC_RING_SIZE;
    }

    /// Finishes the encoding: emits the bytes needed for the decoder to
    /// resolve the last interval, then 2 or 3 zero bytes for its lookahead.
    pub fn done(&mut self) -> std::io::Result<()> {
        let init_base = self.base;
        let another_byte = if self.length > 2 * AC_MIN_LENGTH {
            self.base = self.base.wrapping_add(AC_MIN_LENGTH);
            // one more byte
            self.length = AC_MIN_LENGTH >> 1;
            true
        } else {
            self.base = self.base.wrapping_add(AC_MIN_LENGTH >> 1);
            // two more bytes
            self.length = AC_MIN_LENGTH >> 9;
            false
        };

        if init_base > self.base {
            self.propagate_carry();
        }
        self.renorm_enc_interval()?;

        if self.end_byte != AC_RING_SIZE {
            // the cursor is in the first half, the second one is still pending
            debug_assert!(self.out_byte < AC_BUFFER_SIZE);
            self.out_stream
                .write_all(&self.out_buffer[AC_BUFFER_SIZE..AC_RING_SIZE])?;
        }
        if self.out_byte != 0 {
            self.out_stream.write_all(&self.out_buffer[..self.out_byte])?;
        }

        self.out_stream.write_all(&[0u8, 0u8])?;
        if another_byte {
            self.out_stream.write_all(&[0u8])?;
        }
        Ok(())
    }

    pub fn encode_bit(&mut self, model: &mut ArithmeticBitModel, sym: u32) -> std::io::Result<()> {
        debug_assert!(sym <= 1);
        let init_base = self.base;
        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);
        if sym == 0 {
            self.length = x;
            model.bit_0_count += 1;
        } else {
            self.base = self.base.wrapping_add(x);
            self.length -= x;
        }
        self.settle(init_base)?;
        model.tick();
        Ok(())
    }

    pub fn encode_symbol(&mut self, model: &mut ArithmeticModel, sym: u32) -> std::io::Result<()> {
        debug_assert!(sym <= model.last_symbol);
        let init_base = self.base;
        let low = model.distribution[sym as usize];

        if sym == model.last_symbol {
            // the upper end of the interval is kept, no product needed
            let x = low * (self.length >> DM_LENGTH_SHIFT);
            self.base = self.base.wrapping_add(x);
            self.length -= x;
        } else {
            self.length >>= DM_LENGTH_SHIFT;
            let x = low * self.length;
            self.base = self.base.wrapping_add(x);
            self.length = model.distribution[sym as usize + 1] * self.length - x;
        }

        self.settle(init_base)?;
        model.increment(sym);
        Ok(())
    }

    /// Writes the `bits` low bits of `sym` without modelling them.
    pub fn write_bits(&mut self, mut bits: u32, mut sym: u32) -> std::io::Result<()> {
        debug_assert!(bits > 0 && bits <= 32);
        debug_assert!(bits == 32 || sym < (1u32 << bits));

        if bits > 19 {
            self.write_short((sym & 0xFFFF) as u16)?;
            sym >>= 16;
            bits -= 16;
        }

        let init_base = self.base;
        self.length >>= bits;
        self.base = self.base.wrapping_add(sym * self.length);
        self.settle(init_base)
    }

    fn write_short(&mut self, sym: u16) -> std::io::Result<()> {
        let init_base = self.base;
        self.length >>= 16;
        self.base = self.base.wrapping_add(u32::from(sym) * self.length);
        self.settle(init_base)
    }

    pub fn out_stream(&mut self) -> &mut W {
        &mut self.out_stream
    }

    pub fn into_stream(self) -> W {
        self.out_stream
    }

    /// Carry then renormalization, common tail of every interval update.
    #[inline]
    fn settle(&mut self, init_base: u32) -> std::io::Result<()> {
        // overflow = carry
        if init_base > self.base {
            self.propagate_carry();
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval()?;
        }
        Ok(())
    }

    fn propagate_carry(&mut self) {
        let mut b = self.previous(self.out_byte);
        while self.out_buffer[b] == 0xFF {
            self.out_buffer[b] = 0;
            b = self.previous(b);
        }
        self.out_buffer[b] += 1;
    }

    #[inline]
    fn previous(&self, pos: usize) -> usize {
        if pos == 0 {
            AC_RING_SIZE - 1
        } else {
            pos - 1
        }
    }

    fn renorm_enc_interval(&mut self) -> std::io::Result<()> {
        loop {
            self.out_buffer[self.out_byte] = (self.base >> 24) as u8;
            self.out_byte += 1;
            if self.out_byte == self.end_byte {
                self.manage_out_buffer()?;
            }
            self.base <<= 8;
            // length multiplied by 256
            self.length <<= 8;
            if self.length >= AC_MIN_LENGTH {
                break;
            }
        }
        Ok(())
    }

    /// Flushes the half the cursor is about to overwrite.
    fn manage_out_buffer(&mut self) -> std::io::Result<()> {
        if self.out_byte == AC_RING_SIZE {
            self.out_byte = 0;
        }
        let half = self.out_byte..self.out_byte + AC_BUFFER_SIZE;
        self.out_stream.write_all(&self.out_buffer[half])?;
        self.end_byte = self.out_byte + AC_BUFFER_SIZE;
        Ok(())
    }
}
