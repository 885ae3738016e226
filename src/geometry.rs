//! Bar axes: maps (major, minor) coordinates onto canvas (x, y).

use std::ops::Range;

use image::{Rgb, RgbImage};

/// Direction the bar grows in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A point expressed along the bar's own axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarPoint {
    /// Offset along the bar's length.
    pub major: i64,
    /// Offset across the bar's thickness.
    pub minor: i64,
}

impl Orientation {
    pub fn from_horizontal(is_horizontal: bool) -> Self {
        if is_horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    /// Canvas `(width, height)` for a bar of the given length and thickness.
    pub fn canvas_size(self, length: u32, thickness: u32) -> (u32, u32) {
        match self {
            Self::Horizontal => (length, thickness),
            Self::Vertical => (thickness, length),
        }
    }

    pub fn to_xy(self, p: BarPoint) -> (i64, i64) {
        match self {
            Self::Horizontal => (p.major, p.minor),
            Self::Vertical => (p.minor, p.major),
        }
    }

    /// Splits an `(x, y)` extent into `(major, minor)`.
    pub fn split(self, x: i64, y: i64) -> (i64, i64) {
        match self {
            Self::Horizontal => (x, y),
            Self::Vertical => (y, x),
        }
    }

    /// Major-axis offset that centres `extent` pixels inside `[start, end)`.
    ///
    /// The two orientations round differently when the span and the extent
    /// have different parity; both are kept so output stays pixel-identical.
    pub fn centre_in_segment(self, start: i64, end: i64, extent: i64) -> i64 {
        let span = end - start;
        match self {
            Self::Horizontal => start + (span - extent).div_euclid(2),
            Self::Vertical => start + span.div_euclid(2) - extent.div_euclid(2),
        }
    }
}

/// Minor-axis offset that centres `extent` pixels across the bar.
pub fn centre_across(thickness: u32, extent: i64) -> i64 {
    i64::from(thickness).div_euclid(2) - extent.div_euclid(2)
}

/// Paints the rectangle `major x minor` with `color`, clipped to the canvas.
pub fn fill_span(
    img: &mut RgbImage,
    orientation: Orientation,
    major: Range<i64>,
    minor: Range<i64>,
    color: Rgb<u8>,
) {
    let (x_range, y_range) = match orientation {
        Orientation::Horizontal => (major, minor),
        Orientation::Vertical => (minor, major),
    };
    let x_range = clip(x_range, img.width());
    let y_range = clip(y_range, img.height());

    for y in y_range {
        for x in x_range.clone() {
            img.put_pixel(x, y, color);
        }
    }
}

fn clip(range: Range<i64>, limit: u32) -> Range<u32> {
    let start = range.start.clamp(0, i64::from(limit)) as u32;
    let end = range.end.clamp(0, i64::from(limit)) as u32;
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_swaps_for_vertical() {
        assert_eq!(Orientation::Horizontal.canvas_size(300, 40), (300, 40));
        assert_eq!(Orientation::Vertical.canvas_size(300, 40), (40, 300));
    }

    #[test]
    fn bar_point_maps_to_xy() {
        let p = BarPoint { major: 7, minor: 3 };
        assert_eq!(Orientation::Horizontal.to_xy(p), (7, 3));
        assert_eq!(Orientation::Vertical.to_xy(p), (3, 7));
        assert_eq!(Orientation::Vertical.split(3, 7), (7, 3));
    }

    #[test]
    fn centring_rounds_per_orientation() {
        // span 4, extent 3: (4 - 3) div 2 = 0, but 4 div 2 - 3 div 2 = 1
        assert_eq!(Orientation::Horizontal.centre_in_segment(10, 14, 3), 10);
        assert_eq!(Orientation::Vertical.centre_in_segment(10, 14, 3), 11);
        assert_eq!(Orientation::Horizontal.centre_in_segment(0, 150, 20), 65);
    }

    #[test]
    fn centring_floors_negative_spans() {
        // reversed bars produce segments that run backwards
        assert_eq!(Orientation::Horizontal.centre_in_segment(150, 60, 21), 150 - 56);
        assert_eq!(Orientation::Vertical.centre_in_segment(150, 61, 20), 150 - 45 - 10);
    }

    #[test]
    fn centre_across_uses_floor_division() {
        assert_eq!(centre_across(40, 10), 15);
        assert_eq!(centre_across(41, 11), 15);
        assert_eq!(centre_across(10, 30), -10);
    }

    #[test]
    fn fill_span_clips_to_canvas() {
        let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        fill_span(
            &mut img,
            Orientation::Horizontal,
            -3..2,
            0..10,
            Rgb([9, 9, 9]),
        );
        assert_eq!(*img.get_pixel(0, 0), Rgb([9, 9, 9]));
        assert_eq!(*img.get_pixel(1, 1), Rgb([9, 9, 9]));
        assert_eq!(*img.get_pixel(2, 0), Rgb([0, 0, 0]));

        fill_span(&mut img, Orientation::Horizontal, 4..5, 0..2, Rgb([1, 1, 1]));
        assert!(img.pixels().all(|p| *p != Rgb([1, 1, 1])));
    }

    #[test]
    fn fill_span_vertical_paints_rows() {
        let mut img = RgbImage::from_pixel(2, 4, Rgb([0, 0, 0]));
        fill_span(&mut img, Orientation::Vertical, 1..3, 0..2, Rgb([5, 5, 5]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(1, 1), Rgb([5, 5, 5]));
        assert_eq!(*img.get_pixel(0, 2), Rgb([5, 5, 5]));
        assert_eq!(*img.get_pixel(0, 3), Rgb([0, 0, 0]));
    }
}
