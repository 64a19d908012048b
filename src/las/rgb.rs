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

//! Module with the definition of a RGB struct and implementations of
//! Compressors and Decompressors

use crate::las::utils::{lower_byte_changed, upper_byte_changed};
use crate::packers::Packable;

pub trait LasRGB {
    fn red(&self) -> u16;
    fn green(&self) -> u16;
    fn blue(&self) -> u16;

    fn set_red(&mut self, new_val: u16);
    fn set_green(&mut self, new_val: u16);
    fn set_blue(&mut self, new_val: u16);
}

/// Struct representing a RGB component of a point, in compliance with
/// the LAS spec
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct RGB {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RGB {
    pub const SIZE: usize = 6;
}

impl LasRGB for RGB {
    fn red(&self) -> u16 {
        self.red
    }

    fn green(&self) -> u16 {
        self.green
    }

    fn blue(&self) -> u16 {
        self.blue
    }

    fn set_red(&mut self, new_val: u16) {
        self.red = new_val;
    }

    fn set_green(&mut self, new_val: u16) {
        self.green = new_val
    }

    fn set_blue(&mut self, new_val: u16) {
        self.blue = new_val;
    }
}

impl Packable for RGB {
    const SIZE: usize = RGB::SIZE;

    fn unpack_from(input: &[u8]) -> Self {
        Self {
            red: u16::unpack_from(&input[0..2]),
            green: u16::unpack_from(&input[2..4]),
            blue: u16::unpack_from(&input[4..6]),
        }
    }

    fn pack_into(&self, output: &mut [u8]) {
        self.red.pack_into(&mut output[0..2]);
        self.green.pack_into(&mut output[2..4]);
        self.blue.pack_into(&mut output[4..6]);
    }
}

/// Which bytes of a color changed, plus bit 6 telling whether
/// green or blue differ from red.
#[derive(Copy, Clone, Debug, PartialEq)]
struct ColorDiff(u8);

impl ColorDiff {
    fn from_points<P: LasRGB, OP: LasRGB>(current: &P, last: &OP) -> Self {
        let differs_from_red = lower_byte_changed(current.red(), current.green())
            || lower_byte_changed(current.red(), current.blue())
            || upper_byte_changed(current.red(), current.green())
            || upper_byte_changed(current.red(), current.blue());

        let v = (lower_byte_changed(last.red(), current.red()) as u8)
            | (upper_byte_changed(last.red(), current.red()) as u8) << 1
            | (lower_byte_changed(last.green(), current.green()) as u8) << 2
            | (upper_byte_changed(last.green(), current.green()) as u8) << 3
            | (lower_byte_changed(last.blue(), current.blue()) as u8) << 4
            | (upper_byte_changed(last.blue(), current.blue()) as u8) << 5
            | (differs_from_red as u8) << 6;
        ColorDiff(v)
    }

    fn lower_red_byte_changed(self) -> bool {
        self.0 & (1 << 0) != 0
    }

    fn upper_red_byte_changed(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    fn lower_green_byte_changed(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    fn upper_green_byte_changed(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    fn lower_blue_byte_changed(self) -> bool {
        self.0 & (1 << 4) != 0
    }

    fn upper_blue_byte_changed(self) -> bool {
        self.0 & (1 << 5) != 0
    }

    fn green_blue_differ_from_red(self) -> bool {
        self.0 & (1 << 6) != 0
    }
}

pub mod v2 {
    //! Version 2 of the RGB compression.
    //!
    //! Red is coded as byte differences, green and blue bytes are coded
    //! against a prediction made from how much red (and, for blue, green)
    //! moved. Gray colors (`red == green == blue`) only cost the mask.
    use std::io::{Read, Write};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::{lower_byte, u8_clamp, u8_fold, u8_unfold, upper_byte};
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{ColorDiff, LasRGB, RGB};

    struct RGBModels {
        byte_used: ArithmeticModel,
        lower_red_byte: ArithmeticModel,
        upper_red_byte: ArithmeticModel,
        lower_green_byte: ArithmeticModel,
        upper_green_byte: ArithmeticModel,
        lower_blue_byte: ArithmeticModel,
        upper_blue_byte: ArithmeticModel,
    }

    impl RGBModels {
        fn new(for_decoding: bool) -> Self {
            let byte_model = || {
                ArithmeticModelBuilder::new(256)
                    .for_decoding(for_decoding)
                    .build()
            };
            Self {
                byte_used: ArithmeticModelBuilder::new(128)
                    .for_decoding(for_decoding)
                    .build(),
                lower_red_byte: byte_model(),
                upper_red_byte: byte_model(),
                lower_green_byte: byte_model(),
                upper_green_byte: byte_model(),
                lower_blue_byte: byte_model(),
                upper_blue_byte: byte_model(),
            }
        }

        fn init(&mut self) {
            self.byte_used.init();
            self.lower_red_byte.init();
            self.upper_red_byte.init();
            self.lower_green_byte.init();
            self.upper_green_byte.init();
            self.lower_blue_byte.init();
            self.upper_blue_byte.init();
        }
    }

    /// Prediction of a green or blue byte from the last value and a difference.
    #[inline]
    fn predict(diff: i32, last: u8) -> u8 {
        u8_clamp(diff + i32::from(last))
    }

    pub struct RGBCompressor {
        last: RGB,
        models: RGBModels,
    }

    impl RGBCompressor {
        pub fn new() -> Self {
            Self {
                last: RGB::default(),
                models: RGBModels::new(false),
            }
        }

        /// Resets the models and makes `first` the reference of the next color.
        pub fn init<P: LasRGB>(&mut self, first: &P) {
            self.models.init();
            self.last = RGB {
                red: first.red(),
                green: first.green(),
                blue: first.blue(),
            };
        }

        pub fn write<W: Write, P: LasRGB>(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            current: &P,
        ) -> std::io::Result<()> {
            let models = &mut self.models;
            let last = self.last;
            let color_diff = ColorDiff::from_points(current, &last);
            encoder.encode_symbol(&mut models.byte_used, u32::from(color_diff.0))?;

            let mut diff_l = 0i32;
            let mut diff_h = 0i32;
            if color_diff.lower_red_byte_changed() {
                diff_l = i32::from(lower_byte(current.red())) - i32::from(lower_byte(last.red));
                encoder.encode_symbol(&mut models.lower_red_byte, u32::from(u8_fold(diff_l)))?;
            }
            if color_diff.upper_red_byte_changed() {
                diff_h = i32::from(upper_byte(current.red())) - i32::from(upper_byte(last.red));
                encoder.encode_symbol(&mut models.upper_red_byte, u32::from(u8_fold(diff_h)))?;
            }

            if color_diff.green_blue_differ_from_red() {
                if color_diff.lower_green_byte_changed() {
                    let corr = i32::from(lower_byte(current.green()))
                        - i32::from(predict(diff_l, lower_byte(last.green)));
                    encoder
                        .encode_symbol(&mut models.lower_green_byte, u32::from(u8_fold(corr)))?;
                }
                if color_diff.lower_blue_byte_changed() {
                    // average of the red and green moves
                    let diff = (diff_l + i32::from(lower_byte(current.green()))
                        - i32::from(lower_byte(last.green)))
                        / 2;
                    let corr = i32::from(lower_byte(current.blue()))
                        - i32::from(predict(diff, lower_byte(last.blue)));
                    encoder.encode_symbol(&mut models.lower_blue_byte, u32::from(u8_fold(corr)))?;
                }
                if color_diff.upper_green_byte_changed() {
                    let corr = i32::from(upper_byte(current.green()))
                        - i32::from(predict(diff_h, upper_byte(last.green)));
                    encoder
                        .encode_symbol(&mut models.upper_green_byte, u32::from(u8_fold(corr)))?;
                }
                if color_diff.upper_blue_byte_changed() {
                    let diff = (diff_h + i32::from(upper_byte(current.green()))
                        - i32::from(upper_byte(last.green)))
                        / 2;
                    let corr = i32::from(upper_byte(current.blue()))
                        - i32::from(predict(diff, upper_byte(last.blue)));
                    encoder.encode_symbol(&mut models.upper_blue_byte, u32::from(u8_fold(corr)))?;
                }
            }

            self.last = RGB {
                red: current.red(),
                green: current.green(),
                blue: current.blue(),
            };
            Ok(())
        }
    }

    impl Default for RGBCompressor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<W: Write> FieldCompressor<W> for RGBCompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.init(&RGB::unpack_from(buf));
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            self.write(encoder, &RGB::unpack_from(buf))
        }
    }

    pub struct RGBDecompressor {
        last: RGB,
        models: RGBModels,
    }

    impl RGBDecompressor {
        pub fn new() -> Self {
            Self {
                last: RGB::default(),
                models: RGBModels::new(true),
            }
        }

        /// Resets the models and makes `first` the reference of the next color.
        pub fn init<P: LasRGB>(&mut self, first: &P) {
            self.models.init();
            self.last = RGB {
                red: first.red(),
                green: first.green(),
                blue: first.blue(),
            };
        }

        pub fn read<R: Read>(&mut self, decoder: &mut ArithmeticDecoder<R>) -> std::io::Result<RGB> {
            let models = &mut self.models;
            let last = self.last;
            let color_diff = ColorDiff(decoder.decode_symbol(&mut models.byte_used)? as u8);

            let mut this_val = RGB::default();

            let red_low = if color_diff.lower_red_byte_changed() {
                let sym = decoder.decode_symbol(&mut models.lower_red_byte)? as u8;
                u8_unfold(lower_byte(last.red), sym)
            } else {
                lower_byte(last.red)
            };
            let red_high = if color_diff.upper_red_byte_changed() {
                let sym = decoder.decode_symbol(&mut models.upper_red_byte)? as u8;
                u8_unfold(upper_byte(last.red), sym)
            } else {
                upper_byte(last.red)
            };
            this_val.red = u16::from(red_high) << 8 | u16::from(red_low);

            if color_diff.green_blue_differ_from_red() {
                let diff_l = i32::from(red_low) - i32::from(lower_byte(last.red));
                let green_low = if color_diff.lower_green_byte_changed() {
                    let sym = decoder.decode_symbol(&mut models.lower_green_byte)? as u8;
                    u8_unfold(predict(diff_l, lower_byte(last.green)), sym)
                } else {
                    lower_byte(last.green)
                };
                let blue_low = if color_diff.lower_blue_byte_changed() {
                    let sym = decoder.decode_symbol(&mut models.lower_blue_byte)? as u8;
                    let diff =
                        (diff_l + i32::from(green_low) - i32::from(lower_byte(last.green))) / 2;
                    u8_unfold(predict(diff, lower_byte(last.blue)), sym)
                } else {
                    lower_byte(last.blue)
                };

                let diff_h = i32::from(red_high) - i32::from(upper_byte(last.red));
                let green_high = if color_diff.upper_green_byte_changed() {
                    let sym = decoder.decode_symbol(&mut models.upper_green_byte)? as u8;
                    u8_unfold(predict(diff_h, upper_byte(last.green)), sym)
                } else {
                    upper_byte(last.green)
                };
                let blue_high = if color_diff.upper_blue_byte_changed() {
                    let sym = decoder.decode_symbol(&mut models.upper_blue_byte)? as u8;
                    let diff =
                        (diff_h + i32::from(green_high) - i32::from(upper_byte(last.green))) / 2;
                    u8_unfold(predict(diff, upper_byte(last.blue)), sym)
                } else {
                    upper_byte(last.blue)
                };

                this_val.green = u16::from(green_high) << 8 | u16::from(green_low);
                this_val.blue = u16::from(blue_high) << 8 | u16::from(blue_low);
            } else {
                this_val.green = this_val.red;
                this_val.blue = this_val.red;
            }

            self.last = this_val;
            Ok(this_val)
        }
    }

    impl Default for RGBDecompressor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<R: Read> FieldDecompressor<R> for RGBDecompressor {
        fn size_of_field(&self) -> usize {
            RGB::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.init(&RGB::unpack_from(first_point));
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            self.read(decoder)?.pack_into(buf);
            Ok(())
        }
    }

}
