//! Line rasterizer
//!
//! Lines are drawn with a fixed-point digital differential analyzer: the
//! longer axis steps one whole pixel per iteration and the shorter axis is
//! accumulated in 16.16 fixed point, starting half a pixel in so the
//! de-fixed coordinate rounds to nearest.
//!
//! No clipping is done. Every pixel of a line lies in the bounding box of
//! its endpoints, so the endpoints are checked up front and a line that
//! leaves the buffer is rejected before anything is written.

use crate::buffer::{BufferError, PixelBuffer};
use crate::color::Color;

/// Number of fractional bits in the minor-axis accumulator
pub const FRAC_BITS: u32 = 16;

/// Half a pixel in fixed point
const HALF: i64 = 1 << (FRAC_BITS - 1);

/// Draw a line from `(x1, y1)` to `(x2, y2)`, both endpoints inclusive
pub fn draw_line(
    buf: &mut PixelBuffer<'_>,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    color: Color,
) -> Result<(), BufferError> {
    if !buf.contains(x1, y1) || !buf.contains(x2, y2) {
        return Err(BufferError::OutOfBounds);
    }

    // The accumulator is 64-bit so `short_len << 16` cannot overflow for any
    // u16-sized buffer; results match 32-bit math wherever that is defined.
    let mut short_len = i64::from(y2) - i64::from(y1);
    let mut long_len = i64::from(x2) - i64::from(x1);

    let y_longer = short_len.abs() > long_len.abs();
    if y_longer {
        core::mem::swap(&mut short_len, &mut long_len);
    }

    let dec_inc = if long_len == 0 {
        0
    } else {
        (short_len << FRAC_BITS) / long_len
    };

    let (major_start, minor_start) = if y_longer {
        (i64::from(y1), i64::from(x1))
    } else {
        (i64::from(x1), i64::from(y1))
    };

    // A zero-length major axis still plots once, at the start point
    let step: i64 = if long_len > 0 { 1 } else { -1 };
    let major_end = major_start + long_len;

    let mut major = major_start;
    let mut acc = HALF + (minor_start << FRAC_BITS);

    loop {
        let minor = acc >> FRAC_BITS;
        // Both values lie between validated endpoints, so they fit in i32
        let (x, y) = if y_longer { (minor, major) } else { (major, minor) };
        buf.write_pixel(x as i32, y as i32, color)?;

        if major == major_end {
            return Ok(());
        }
        major += step;
        acc += step * dec_inc;
    }
}
