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

//! The Point10 record (point format 0 of LAS <= 1.3) and its compression.

use crate::packers::Packable;

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub struct Point10 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,

    // 3 bits
    pub return_number: u8,
    // 3 bits
    pub number_of_returns_of_given_pulse: u8,
    // 1 bit
    pub scan_direction_flag: bool,
    // 1 bit
    pub edge_of_flight_line: bool,

    // 5 bits for classification the rest are bit flags
    pub classification: u8,

    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
}

impl Point10 {
    pub const SIZE: usize = 20;

    pub fn populate_bit_fields_from(&mut self, byte: u8) {
        self.return_number = byte & 0x7;
        self.number_of_returns_of_given_pulse = (byte >> 3) & 0x7;
        self.scan_direction_flag = ((byte >> 6) & 0x1) != 0;
        self.edge_of_flight_line = ((byte >> 7) & 0x1) != 0;
    }

    pub fn bit_fields_to_byte(&self) -> u8 {
        let a = self.return_number;
        let b = self.number_of_returns_of_given_pulse;
        let c = self.scan_direction_flag as u8;
        let d = self.edge_of_flight_line as u8;

        ((d & 0x1) << 7) | (c & 0x1) << 6 | (b & 0x7) << 3 | (a & 0x7)
    }
}

impl Packable for Point10 {
    const SIZE: usize = Point10::SIZE;

    fn unpack_from(input: &[u8]) -> Self {
        let mut point = Point10 {
            x: i32::unpack_from(&input[0..4]),
            y: i32::unpack_from(&input[4..8]),
            z: i32::unpack_from(&input[8..12]),
            intensity: u16::unpack_from(&input[12..14]),
            classification: input[15],
            scan_angle_rank: i8::unpack_from(&input[16..17]),
            user_data: input[17],
            point_source_id: u16::unpack_from(&input[18..20]),
            ..Default::default()
        };
        point.populate_bit_fields_from(input[14]);
        point
    }

    fn pack_into(&self, output: &mut [u8]) {
        self.x.pack_into(&mut output[0..4]);
        self.y.pack_into(&mut output[4..8]);
        self.z.pack_into(&mut output[8..12]);
        self.intensity.pack_into(&mut output[12..14]);
        output[14] = self.bit_fields_to_byte();
        output[15] = self.classification;
        self.scan_angle_rank.pack_into(&mut output[16..17]);
        output[17] = self.user_data;
        self.point_source_id.pack_into(&mut output[18..20]);
    }
}

pub mod v2 {
    //! Version 2 of the Point10 compression.
    //!
    //! Each point first codes a 6 bit mask of the attributes that changed
    //! since the previous point, then each changed attribute, then always
    //! the x, y and z coordinates:
    //!
    //! - x and y as differences predicted by a running median of the
    //!   previous differences, one median per return context
    //! - z predicted by the last z seen at the same return level, with a
    //!   context derived from how many bits the x and y corrections needed
    use std::io::{Read, Write};

    use tracing::trace;

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::integer::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::las::median::StreamingMedian;
    use crate::las::utils::{self, u8_fold, u8_unfold};
    use crate::models::{ArithmeticModel, ArithmeticModelBuilder};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::Point10;

    const BIT_BYTE_CHANGED: u8 = 1 << 5;
    const INTENSITY_CHANGED: u8 = 1 << 4;
    const CLASSIFICATION_CHANGED: u8 = 1 << 3;
    const SCAN_ANGLE_RANK_CHANGED: u8 = 1 << 2;
    const USER_DATA_CHANGED: u8 = 1 << 1;
    const POINT_SOURCE_ID_CHANGED: u8 = 1;

    /// Bit map of the non coordinate attributes that differ from the previous point.
    #[derive(Copy, Clone, Debug, PartialEq)]
    pub(crate) struct Point10ChangedValues(pub(crate) u8);

    impl Point10ChangedValues {
        /// `last_intensity` is the intensity last seen in the return context
        /// of `current`, not the one of `last`.
        pub(crate) fn from_points(current: &Point10, last: &Point10, last_intensity: u16) -> Self {
            let mut value = 0u8;
            if current.bit_fields_to_byte() != last.bit_fields_to_byte() {
                value |= BIT_BYTE_CHANGED;
            }
            if current.intensity != last_intensity {
                value |= INTENSITY_CHANGED;
            }
            if current.classification != last.classification {
                value |= CLASSIFICATION_CHANGED;
            }
            if current.scan_angle_rank != last.scan_angle_rank {
                value |= SCAN_ANGLE_RANK_CHANGED;
            }
            if current.user_data != last.user_data {
                value |= USER_DATA_CHANGED;
            }
            if current.point_source_id != last.point_source_id {
                value |= POINT_SOURCE_ID_CHANGED;
            }
            Point10ChangedValues(value)
        }

        #[inline]
        fn is_set(self, flag: u8) -> bool {
            self.0 & flag != 0
        }
    }

    /// Return context `m` and level `l` of a point.
    #[inline]
    fn return_contexts(point: &Point10) -> (usize, usize) {
        let n = point.number_of_returns_of_given_pulse as usize;
        let r = point.return_number as usize;
        (
            utils::NUMBER_RETURN_MAP[n][r] as usize,
            utils::NUMBER_RETURN_LEVEL[n][r] as usize,
        )
    }

    #[inline]
    fn dy_context(single_return: bool, k_bits: u32) -> u32 {
        single_return as u32
            + if k_bits < 20 {
                utils::u32_zero_bit(k_bits)
            } else {
                20
            }
    }

    #[inline]
    fn z_context(single_return: bool, k_bits: u32) -> u32 {
        single_return as u32
            + if k_bits < 18 {
                utils::u32_zero_bit(k_bits)
            } else {
                18
            }
    }

    /// Gets the model for the previous value `index`, creating it on first use.
    fn lazy_model(
        models: &mut [Option<ArithmeticModel>],
        index: u8,
        for_decoding: bool,
    ) -> &mut ArithmeticModel {
        models[index as usize].get_or_insert_with(|| {
            trace!("creating symbol model for previous byte value {}", index);
            ArithmeticModelBuilder::new(256)
                .for_decoding(for_decoding)
                .build()
        })
    }

    // Everything both directions must keep in lockstep
    struct Common {
        last_point: Point10,
        last_intensity: [u16; 16],

        last_x_diff_median: [StreamingMedian<i32>; 16],
        last_y_diff_median: [StreamingMedian<i32>; 16],

        last_height: [i32; 8],

        changed_values: ArithmeticModel,
        scan_angle_rank: [ArithmeticModel; 2],
        // 256 each, indexed by the previous value
        bit_byte: Vec<Option<ArithmeticModel>>,
        classification: Vec<Option<ArithmeticModel>>,
        user_data: Vec<Option<ArithmeticModel>>,

        ic_intensity: IntegerCompressor,
        ic_point_source_id: IntegerCompressor,
        ic_dx: IntegerCompressor,
        ic_dy: IntegerCompressor,
        ic_z: IntegerCompressor,

        for_decoding: bool,

        #[cfg(test)]
        context_log: Vec<(usize, usize, u32, u32)>,
    }

    impl Common {
        fn new(for_decoding: bool) -> Self {
            let symbol_model = |symbols| {
                ArithmeticModelBuilder::new(symbols)
                    .for_decoding(for_decoding)
                    .build()
            };
            Self {
                last_point: Point10::default(),
                last_intensity: [0u16; 16],
                last_x_diff_median: [StreamingMedian::new(); 16],
                last_y_diff_median: [StreamingMedian::new(); 16],
                last_height: [0i32; 8],
                changed_values: symbol_model(64),
                scan_angle_rank: [symbol_model(256), symbol_model(256)],
                bit_byte: (0..256).map(|_| None).collect(),
                classification: (0..256).map(|_| None).collect(),
                user_data: (0..256).map(|_| None).collect(),
                ic_intensity: IntegerCompressorBuilder::new()
                    .bits(16)
                    .contexts(4)
                    .build_initialized(),
                ic_point_source_id: IntegerCompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                ic_dx: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(2)
                    .build_initialized(),
                ic_dy: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(22)
                    .build_initialized(),
                ic_z: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(20)
                    .build_initialized(),
                for_decoding,
                #[cfg(test)]
                context_log: Vec::new(),
            }
        }

        fn init(&mut self, first: &Point10) {
            self.last_x_diff_median
                .iter_mut()
                .chain(self.last_y_diff_median.iter_mut())
                .for_each(StreamingMedian::init);
            self.last_intensity = [0u16; 16];
            self.last_height = [0i32; 8];

            self.changed_values.init();
            self.scan_angle_rank.iter_mut().for_each(ArithmeticModel::init);
            self.bit_byte
                .iter_mut()
                .chain(self.classification.iter_mut())
                .chain(self.user_data.iter_mut())
                .for_each(|model| *model = None);

            self.ic_intensity.init();
            self.ic_point_source_id.init();
            self.ic_dx.init();
            self.ic_dy.init();
            self.ic_z.init();

            self.last_point = *first;
            // but set intensity to zero
            self.last_point.intensity = 0;
        }

        #[cfg(test)]
        fn log_contexts(&mut self, m: usize, l: usize) {
            let entry = (m, l, self.ic_dx.k(), self.ic_dy.k());
            self.context_log.push(entry);
        }

        #[cfg(not(test))]
        #[inline(always)]
        fn log_contexts(&mut self, _m: usize, _l: usize) {}
    }

    pub struct Point10Compressor {
        common: Common,
        have_last: bool,
    }

    impl Point10Compressor {
        pub fn new() -> Self {
            Self {
                common: Common::new(false),
                have_last: false,
            }
        }

        /// Resets the compressor and makes `first` the reference of the next point.
        pub fn init(&mut self, first: &Point10) {
            self.common.init(first);
            self.have_last = true;
        }

        pub fn write<W: Write>(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            current: &Point10,
        ) -> std::io::Result<()> {
            let common = &mut self.common;
            let last = common.last_point;
            let n = current.number_of_returns_of_given_pulse;
            let (m, l) = return_contexts(current);

            let changed_values =
                Point10ChangedValues::from_points(current, &last, common.last_intensity[m]);
            encoder.encode_symbol(&mut common.changed_values, u32::from(changed_values.0))?;

            if changed_values.is_set(BIT_BYTE_CHANGED) {
                let model = lazy_model(
                    &mut common.bit_byte,
                    last.bit_fields_to_byte(),
                    common.for_decoding,
                );
                encoder.encode_symbol(model, u32::from(current.bit_fields_to_byte()))?;
            }

            if changed_values.is_set(INTENSITY_CHANGED) {
                common.ic_intensity.compress(
                    encoder,
                    i32::from(common.last_intensity[m]),
                    i32::from(current.intensity),
                    m.min(3) as u32,
                )?;
                common.last_intensity[m] = current.intensity;
            }

            if changed_values.is_set(CLASSIFICATION_CHANGED) {
                let model = lazy_model(
                    &mut common.classification,
                    last.classification,
                    common.for_decoding,
                );
                encoder.encode_symbol(model, u32::from(current.classification))?;
            }

            if changed_values.is_set(SCAN_ANGLE_RANK_CHANGED) {
                let diff = i32::from(current.scan_angle_rank) - i32::from(last.scan_angle_rank);
                encoder.encode_symbol(
                    &mut common.scan_angle_rank[current.scan_direction_flag as usize],
                    u32::from(u8_fold(diff)),
                )?;
            }

            if changed_values.is_set(USER_DATA_CHANGED) {
                let model = lazy_model(
                    &mut common.user_data,
                    last.user_data,
                    common.for_decoding,
                );
                encoder.encode_symbol(model, u32::from(current.user_data))?;
            }

            if changed_values.is_set(POINT_SOURCE_ID_CHANGED) {
                common.ic_point_source_id.compress(
                    encoder,
                    i32::from(last.point_source_id),
                    i32::from(current.point_source_id),
                    0,
                )?;
            }

            // x, then y, then z: each context depends on the previous k
            let median = common.last_x_diff_median[m].get();
            let diff = current.x.wrapping_sub(last.x);
            common.ic_dx.compress(encoder, median, diff, (n == 1) as u32)?;
            common.last_x_diff_median[m].add(diff);

            let k_bits = common.ic_dx.k();
            let median = common.last_y_diff_median[m].get();
            let diff = current.y.wrapping_sub(last.y);
            common
                .ic_dy
                .compress(encoder, median, diff, dy_context(n == 1, k_bits))?;
            common.last_y_diff_median[m].add(diff);

            let k_bits = (common.ic_dx.k() + common.ic_dy.k()) / 2;
            common.ic_z.compress(
                encoder,
                common.last_height[l],
                current.z,
                z_context(n == 1, k_bits),
            )?;
            common.last_height[l] = current.z;

            common.log_contexts(m, l);
            common.last_point = *current;
            Ok(())
        }
    }

    impl Default for Point10Compressor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<W: Write> FieldCompressor<W> for Point10Compressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.init(&Point10::unpack_from(buf));
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            debug_assert!(self.have_last);
            self.write(encoder, &Point10::unpack_from(buf))
        }
    }

    pub struct Point10Decompressor {
        common: Common,
        have_last: bool,
    }

    impl Point10Decompressor {
        pub fn new() -> Self {
            Self {
                common: Common::new(true),
                have_last: false,
            }
        }

        /// Resets the decompressor and makes `first` the reference of the next point.
        pub fn init(&mut self, first: &Point10) {
            self.common.init(first);
            self.have_last = true;
        }

        pub fn read<R: Read>(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
        ) -> std::io::Result<Point10> {
            let common = &mut self.common;
            let mut point = common.last_point;

            let changed_values =
                Point10ChangedValues(decoder.decode_symbol(&mut common.changed_values)? as u8);

            if changed_values.is_set(BIT_BYTE_CHANGED) {
                let model = lazy_model(
                    &mut common.bit_byte,
                    point.bit_fields_to_byte(),
                    common.for_decoding,
                );
                point.populate_bit_fields_from(decoder.decode_symbol(model)? as u8);
            }

            // the return fields are now those of the current point
            let n = point.number_of_returns_of_given_pulse;
            let (m, l) = return_contexts(&point);

            if changed_values.is_set(INTENSITY_CHANGED) {
                point.intensity = common.ic_intensity.decompress(
                    decoder,
                    i32::from(common.last_intensity[m]),
                    m.min(3) as u32,
                )? as u16;
                common.last_intensity[m] = point.intensity;
            } else {
                point.intensity = common.last_intensity[m];
            }

            if changed_values.is_set(CLASSIFICATION_CHANGED) {
                let model = lazy_model(
                    &mut common.classification,
                    point.classification,
                    common.for_decoding,
                );
                point.classification = decoder.decode_symbol(model)? as u8;
            }

            if changed_values.is_set(SCAN_ANGLE_RANK_CHANGED) {
                let sym = decoder.decode_symbol(
                    &mut common.scan_angle_rank[point.scan_direction_flag as usize],
                )? as u8;
                point.scan_angle_rank = u8_unfold(point.scan_angle_rank as u8, sym) as i8;
            }

            if changed_values.is_set(USER_DATA_CHANGED) {
                let model = lazy_model(
                    &mut common.user_data,
                    point.user_data,
                    common.for_decoding,
                );
                point.user_data = decoder.decode_symbol(model)? as u8;
            }

            if changed_values.is_set(POINT_SOURCE_ID_CHANGED) {
                point.point_source_id = common.ic_point_source_id.decompress(
                    decoder,
                    i32::from(point.point_source_id),
                    0,
                )? as u16;
            }

            let median = common.last_x_diff_median[m].get();
            let diff = common.ic_dx.decompress(decoder, median, (n == 1) as u32)?;
            point.x = point.x.wrapping_add(diff);
            common.last_x_diff_median[m].add(diff);

            let k_bits = common.ic_dx.k();
            let median = common.last_y_diff_median[m].get();
            let diff = common
                .ic_dy
                .decompress(decoder, median, dy_context(n == 1, k_bits))?;
            point.y = point.y.wrapping_add(diff);
            common.last_y_diff_median[m].add(diff);

            let k_bits = (common.ic_dx.k() + common.ic_dy.k()) / 2;
            point.z = common.ic_z.decompress(
                decoder,
                common.last_height[l],
                z_context(n == 1, k_bits),
            )?;
            common.last_height[l] = point.z;

            common.log_contexts(m, l);
            common.last_point = point;
            Ok(point)
        }
    }

    impl Default for Point10Decompressor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<R: Read> FieldDecompressor<R> for Point10Decompressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.init(&Point10::unpack_from(first_point));
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            debug_assert!(self.have_last);
            self.read(decoder)?.pack_into(buf);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use std::io::Cursor;

        use super::*;

        fn base_point() -> Point10 {
            Point10 {
                x: 1000,
                y: -2000,
                z: 300,
                intensity: 120,
                return_number: 1,
                number_of_returns_of_given_pulse: 1,
                scan_direction_flag: false,
                edge_of_flight_line: false,
                classification: 2,
                scan_angle_rank: -12,
                user_data: 0,
                point_source_id: 17,
            }
        }

        /// Points with every attribute moving, including wrapping coordinates.
        fn varied_points(count: usize) -> Vec<Point10> {
            let mut seed = 0x2545_F491u32;
            let mut next = move || {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                seed
            };
            let mut point = base_point();
            (0..count)
                .map(|i| {
                    let r = next();
                    point.x = point.x.wrapping_add((r % 200) as i32 - 100);
                    point.y = point.y.wrapping_add((r >> 8) as i32 % 50);
                    point.z = if i % 97 == 0 {
                        std::i32::MIN + (r >> 20) as i32
                    } else {
                        point.z.wrapping_add((r % 7) as i32 - 3)
                    };
                    if r % 3 == 0 {
                        point.intensity = (r >> 3) as u16;
                    }
                    if r % 5 == 0 {
                        point.number_of_returns_of_given_pulse = ((r >> 4) % 8) as u8;
                        point.return_number = ((r >> 7) % 8) as u8;
                        point.scan_direction_flag = r & 0x100 != 0;
                        point.edge_of_flight_line = r & 0x200 != 0;
                    }
                    if r % 11 == 0 {
                        point.classification = (r >> 12) as u8;
                    }
                    if r % 4 == 1 {
                        point.scan_angle_rank = (r >> 16) as i8;
                    }
                    if r % 13 == 0 {
                        point.user_data = (r >> 9) as u8;
                    }
                    if r % 17 == 0 {
                        point.point_source_id = (r >> 5) as u16;
                    }
                    point
                })
                .collect()
        }

        fn compress(points: &[Point10]) -> (Vec<u8>, Point10Compressor) {
            let mut compressor = Point10Compressor::new();
            let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
            compressor.init(&points[0]);
            for point in &points[1..] {
                compressor.write(&mut encoder, point).unwrap();
            }
            encoder.done().unwrap();
            (encoder.into_stream().into_inner(), compressor)
        }

        fn decompress(
            first: &Point10,
            data: Vec<u8>,
            count: usize,
        ) -> (Vec<Point10>, Point10Decompressor) {
            let mut decompressor = Point10Decompressor::new();
            let mut decoder = ArithmeticDecoder::new(Cursor::new(data));
            decoder.read_init_bytes().unwrap();
            decompressor.init(first);
            let mut points = vec![*first];
            for _ in 1..count {
                points.push(decompressor.read(&mut decoder).unwrap());
            }
            (points, decompressor)
        }

        #[test]
        fn test_round_trip() {
            for &count in &[1usize, 2, 1000] {
                let points = varied_points(count);
                let (data, _) = compress(&points);
                let (decoded, _) = decompress(&points[0], data, count);
                assert_eq!(decoded, points, "with {} points", count);
            }
        }

        #[test]
        fn test_is_deterministic() {
            let points = varied_points(500);
            assert_eq!(compress(&points).0, compress(&points).0);
        }

        #[test]
        fn test_contexts_match_on_both_sides() {
            let points = varied_points(1000);
            let (data, compressor) = compress(&points);
            let (_, decompressor) = decompress(&points[0], data, points.len());

            let log = &compressor.common.context_log;
            assert_eq!(log.len(), points.len() - 1);
            assert_eq!(log, &decompressor.common.context_log);
            for (point, &(m, l, _, _)) in points[1..].iter().zip(log) {
                assert_eq!((m, l), return_contexts(point));
            }

            for m in 0..16 {
                assert_eq!(
                    compressor.common.last_x_diff_median[m].get(),
                    decompressor.common.last_x_diff_median[m].get()
                );
                assert_eq!(
                    compressor.common.last_y_diff_median[m].get(),
                    decompressor.common.last_y_diff_median[m].get()
                );
            }
            assert_eq!(compressor.common.last_intensity, decompressor.common.last_intensity);
            assert_eq!(compressor.common.last_height, decompressor.common.last_height);
        }

        #[test]
        fn test_identical_points_compress_well() {
            let points = vec![base_point(); 1000];
            let (data, _) = compress(&points);
            assert!(data.len() < points.len() * Point10::SIZE / 20);

            let (decoded, _) = decompress(&points[0], data, points.len());
            assert_eq!(decoded, points);
        }

        #[test]
        fn test_changed_values_isolate_each_field() {
            let base = base_point();
            let mut cases: Vec<(Point10, u8)> = Vec::new();

            let mut p = base;
            p.classification = 6;
            cases.push((p, CLASSIFICATION_CHANGED));
            let mut p = base;
            p.return_number = 2;
            p.number_of_returns_of_given_pulse = 2;
            cases.push((p, BIT_BYTE_CHANGED));
            let mut p = base;
            p.edge_of_flight_line = true;
            cases.push((p, BIT_BYTE_CHANGED));
            let mut p = base;
            p.scan_angle_rank = 90;
            cases.push((p, SCAN_ANGLE_RANK_CHANGED));
            let mut p = base;
            p.user_data = 255;
            cases.push((p, USER_DATA_CHANGED));
            let mut p = base;
            p.point_source_id = 18;
            cases.push((p, POINT_SOURCE_ID_CHANGED));
            let mut p = base;
            p.x += 1000;
            p.z -= 5;
            cases.push((p, 0));

            for (point, expected) in cases {
                let mask = Point10ChangedValues::from_points(&point, &base, base.intensity);
                assert_eq!(mask.0, expected, "{:?}", point);
            }

            // intensity is compared with the one of the current return context
            let mask = Point10ChangedValues::from_points(&base, &base, 0);
            assert_eq!(mask.0, INTENSITY_CHANGED);
        }

        #[test]
        fn test_first_coded_symbol_is_the_mask() {
            let base = base_point();
            let mut changed = base;
            changed.classification = 9;
            // init forces the last intensity to 0, keep it so
            let mut first = base;
            first.intensity = 0;
            changed.intensity = 0;

            let (data, _) = compress(&[first, changed]);
            let mut decoder = ArithmeticDecoder::new(Cursor::new(data));
            decoder.read_init_bytes().unwrap();
            let mut model = ArithmeticModel::new(64, true);
            let mask = decoder.decode_symbol(&mut model).unwrap();
            assert_eq!(mask, u32::from(CLASSIFICATION_CHANGED));
        }

        #[test]
        fn test_unchanged_intensity_comes_from_return_context() {
            let mut first = base_point();
            first.intensity = 500;
            let mut second = first;
            second.intensity = 40;
            // back in the same context with the same intensity: not coded again
            let third = second;

            let points = vec![first, second, third];
            let (data, _) = compress(&points);
            let (decoded, _) = decompress(&first, data, 3);
            assert_eq!(decoded, points);
        }

        #[test]
        fn test_init_discards_lazy_models() {
            let points = varied_points(200);
            let (_, mut compressor) = compress(&points);
            assert!(compressor.common.classification.iter().any(Option::is_some));

            compressor.init(&points[0]);
            assert!(compressor.common.bit_byte.iter().all(Option::is_none));
            assert!(compressor.common.classification.iter().all(Option::is_none));
            assert!(compressor.common.user_data.iter().all(Option::is_none));
            assert_eq!(compressor.common.last_point.intensity, 0);
            assert_eq!(compressor.common.last_point.x, points[0].x);
        }

        #[test]
        fn test_reinit_gives_same_stream() {
            let points = varied_points(300);
            let (expected, _) = compress(&points);

            let mut compressor = Point10Compressor::new();
            let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
            compressor.init(&points[5]);
            for point in &points[6..50] {
                compressor.write(&mut encoder, point).unwrap();
            }
            encoder.reset();
            encoder.out_stream().get_mut().clear();
            encoder.out_stream().set_position(0);

            compressor.init(&points[0]);
            for point in &points[1..] {
                compressor.write(&mut encoder, point).unwrap();
            }
            encoder.done().unwrap();
            assert_eq!(encoder.into_stream().into_inner(), expected);
        }
    }
}
