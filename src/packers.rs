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
    terms of the GNU Lesser General Licence as published by the Free Software
    Foundation. See the COPYING file for more information.

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

  CHANGE HISTORY:
    6 June 2019: Translated to Rust
===============================================================================
*/

//! Conversion between values and their little endian LAS byte layout.

use byteorder::{ByteOrder, LittleEndian};

/// A value with a fixed size little endian layout.
///
/// Both functions panic if the slice is too small, the record layer always
/// hands them slices of exactly the field size.
pub trait Packable: Sized {
    const SIZE: usize;

    fn unpack_from(input: &[u8]) -> Self;
    fn pack_into(&self, output: &mut [u8]);
}

impl Packable for u8 {
    const SIZE: usize = 1;

    fn unpack_from(input: &[u8]) -> Self {
        input[0]
    }

    fn pack_into(&self, output: &mut [u8]) {
        output[0] = *self;
    }
}

impl Packable for i8 {
    const SIZE: usize = 1;

    fn unpack_from(input: &[u8]) -> Self {
        input[0] as i8
    }

    fn pack_into(&self, output: &mut [u8]) {
        output[0] = *self as u8;
    }
}

macro_rules! impl_packable_le {
    ($type:ty, $size:expr, $read:ident, $write:ident) => {
        impl Packable for $type {
            const SIZE: usize = $size;

            #[inline]
            fn unpack_from(input: &[u8]) -> Self {
                LittleEndian::$read(&input[..$size])
            }

            #[inline]
            fn pack_into(&self, output: &mut [u8]) {
                LittleEndian::$write(&mut output[..$size], *self)
            }
        }
    };
}

impl_packable_le!(u16, 2, read_u16, write_u16);
impl_packable_le!(i16, 2, read_i16, write_i16);
impl_packable_le!(u32, 4, read_u32, write_u32);
impl_packable_le!(i32, 4, read_i32, write_i32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packer() {
        let in_val: i32 = -25;
        let mut buf = [0u8; 4];
        in_val.pack_into(&mut buf);
        assert_eq!(buf, [0xE7, 0xFF, 0xFF, 0xFF]);
        assert_eq!(i32::unpack_from(&buf), in_val);
    }

    #[test]
    fn test_u16_is_little_endian() {
        let mut buf = [0u8; 2];
        0xABCDu16.pack_into(&mut buf);
        assert_eq!(buf, [0xCD, 0xAB]);
        assert_eq!(u16::unpack_from(&buf), 0xABCD);
    }

    #[test]
    fn test_ignores_trailing_bytes() {
        let buf = [1u8, 0, 0, 0, 0xFF, 0xFF];
        assert_eq!(u32::unpack_from(&buf), 1);
        assert_eq!(i8::unpack_from(&buf[4..]), -1);
    }

    #[test]
    #[should_panic]
    fn test_short_buffer_panics() {
        let _ = u32::unpack_from(&[0u8; 3]);
    }
}
