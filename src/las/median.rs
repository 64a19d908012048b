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

use num_traits::Zero;

/// Approximate running median over the last values.
///
/// Keeps five sorted values and evicts alternately from the low and the
/// high end, so the middle one tracks the median of recent inputs at the
/// cost of a handful of comparisons.
#[derive(Copy, Clone, Debug)]
pub struct StreamingMedian<T: Zero + Copy + PartialOrd> {
    values: [T; 5],
    high: bool,
}

impl<T: Zero + Copy + PartialOrd> StreamingMedian<T> {
    pub fn new() -> Self {
        Self {
            values: [T::zero(); 5],
            high: true,
        }
    }

    pub fn init(&mut self) {
        *self = Self::new();
    }

    pub fn add(&mut self, v: T) {
        let vals = &mut self.values;
        if self.high {
            // insert into the low part, dropping vals[4]
            if v < vals[2] {
                vals[4] = vals[3];
                vals[3] = vals[2];
                if v < vals[0] {
                    vals[2] = vals[1];
                    vals[1] = vals[0];
                    vals[0] = v;
                } else if v < vals[1] {
                    vals[2] = vals[1];
                    vals[1] = v;
                } else {
                    vals[2] = v;
                }
            } else {
                if v < vals[3] {
                    vals[4] = vals[3];
                    vals[3] = v;
                } else {
                    vals[4] = v;
                }
                self.high = false;
            }
        } else {
            // insert into the high part, dropping vals[0]
            if vals[2] < v {
                vals[0] = vals[1];
                vals[1] = vals[2];
                if vals[4] < v {
                    vals[2] = vals[3];
                    vals[3] = vals[4];
                    vals[4] = v;
                } else if vals[3] < v {
                    vals[2] = vals[3];
                    vals[3] = v;
                } else {
                    vals[2] = v;
                }
            } else {
                if vals[1] < v {
                    vals[0] = vals[1];
                    vals[1] = v;
                } else {
                    vals[0] = v;
                }
                self.high = true;
            }
        }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.values[2]
    }
}

impl<T: Zero + Copy + PartialOrd> Default for StreamingMedian<T> {
    fn default() -> Self {
        Self::new()
    }
}
