//! Chapter separators and title placement.
//!
//! None of this depends on the frame index, so the overlay is laid out once
//! and replayed over every frame.

use crate::font::TextMask;
use crate::geometry::{BarPoint, Orientation, centre_across};
use crate::timeline::{extent, time_progress};

/// Bar geometry needed to lay out chapters.
#[derive(Clone, Copy, Debug)]
pub struct BarLayout {
    pub orientation: Orientation,
    pub reversed: bool,
    pub fill_length: u32,
    pub bar_thickness: u32,
    pub video_duration: f64,
}

impl BarLayout {
    /// Major-axis position of the separator for a chapter starting at `seconds`.
    pub fn separator_position(&self, seconds: f64) -> i64 {
        extent(
            time_progress(seconds, self.video_duration, self.reversed),
            self.fill_length,
        )
    }

    /// Canvas position of the text origin that centres `mask` in `[start, end)`.
    pub fn place(&self, mask: &TextMask, start: i64, end: i64) -> (i64, i64) {
        let (major_extent, minor_extent) = self.orientation.split(mask.right(), mask.bottom());
        self.orientation.to_xy(BarPoint {
            major: self.orientation.centre_in_segment(start, end, major_extent),
            minor: centre_across(self.bar_thickness, minor_extent),
        })
    }
}

/// One overlay drawing step, applied in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayOp {
    /// Blend `masks[mask]` with its origin at canvas `(x, y)`.
    Title { mask: usize, x: i64, y: i64 },
    /// Separator line at this major-axis position.
    Separator(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterOverlay {
    pub masks: Vec<TextMask>,
    pub ops: Vec<OverlayOp>,
}

impl ChapterOverlay {
    /// Lays out titles and separators.
    ///
    /// Title `i` is centred in the segment ending at chapter `i`'s separator,
    /// and the separator is drawn after it. The last title is then centred again
    /// in the trailing segment up to `fill_length`, so a title list as long as
    /// the chapter list repeats its last entry there.
    ///
    /// Returns `None` unless both `chapters` and `titles` are non-empty. Callers
    /// ensure `titles.len() >= chapters.len()`.
    pub fn build(
        layout: &BarLayout,
        chapters: &[f64],
        titles: &[String],
        mut rasterize: impl FnMut(&str) -> TextMask,
    ) -> Option<Self> {
        let last_title = titles.len().checked_sub(1)?;
        if chapters.is_empty() {
            return None;
        }

        let mut masks = Vec::with_capacity(chapters.len() + 1);
        let mut ops = Vec::with_capacity(chapters.len() * 2 + 1);
        let mut prev = 0i64;

        for (i, &seconds) in chapters.iter().enumerate() {
            let separator = layout.separator_position(seconds);
            let mask = rasterize(&titles[i]);
            let (x, y) = layout.place(&mask, prev, separator);
            masks.push(mask);
            ops.push(OverlayOp::Title {
                mask: masks.len() - 1,
                x,
                y,
            });
            ops.push(OverlayOp::Separator(separator));
            prev = separator;
        }

        let trailing = if last_title < chapters.len() {
            last_title
        } else {
            masks.push(rasterize(&titles[last_title]));
            masks.len() - 1
        };
        let (x, y) = layout.place(&masks[trailing], prev, i64::from(layout.fill_length));
        ops.push(OverlayOp::Title {
            mask: trailing,
            x,
            y,
        });

        Some(Self { masks, ops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(orientation: Orientation, reversed: bool) -> BarLayout {
        BarLayout {
            orientation,
            reversed,
            fill_length: 300,
            bar_thickness: 40,
            video_duration: 10.0,
        }
    }

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fixed_masks(text: &str) -> TextMask {
        // width grows with length so tests can tell titles apart
        TextMask::solid(10 * text.len() as u32, 10)
    }

    #[test]
    fn separator_positions_follow_chapter_times() {
        let l = layout(Orientation::Horizontal, false);
        assert_eq!(l.separator_position(5.0), 150);
        assert_eq!(l.separator_position(8.0), 240);
        assert_eq!(l.separator_position(10.0), 300);
    }

    #[test]
    fn empty_inputs_produce_no_overlay() {
        let l = layout(Orientation::Horizontal, false);
        assert!(ChapterOverlay::build(&l, &[], &titles(&["a"]), fixed_masks).is_none());
        assert!(ChapterOverlay::build(&l, &[5.0], &[], fixed_masks).is_none());
    }

    #[test]
    fn horizontal_titles_centre_in_each_segment() {
        let l = layout(Orientation::Horizontal, false);
        let overlay =
            ChapterOverlay::build(&l, &[5.0, 8.0], &titles(&["aa", "bb", "cc"]), fixed_masks)
                .unwrap();

        assert_eq!(
            overlay.ops,
            vec![
                OverlayOp::Title { mask: 0, x: 65, y: 15 },
                OverlayOp::Separator(150),
                OverlayOp::Title { mask: 1, x: 185, y: 15 },
                OverlayOp::Separator(240),
                OverlayOp::Title { mask: 2, x: 260, y: 15 },
            ]
        );
        assert_eq!(overlay.masks.len(), 3);
    }

    #[test]
    fn vertical_titles_centre_in_each_segment() {
        let l = layout(Orientation::Vertical, false);
        let overlay =
            ChapterOverlay::build(&l, &[5.0, 8.0], &titles(&["aa", "bb", "cc"]), fixed_masks)
                .unwrap();

        // mask 20 wide, 10 tall: x = 20 - 10, y = prev + span / 2 - 5
        assert_eq!(
            overlay.ops,
            vec![
                OverlayOp::Title { mask: 0, x: 10, y: 70 },
                OverlayOp::Separator(150),
                OverlayOp::Title { mask: 1, x: 10, y: 190 },
                OverlayOp::Separator(240),
                OverlayOp::Title { mask: 2, x: 10, y: 265 },
            ]
        );
    }

    #[test]
    fn equal_length_titles_repeat_the_last_one() {
        let l = layout(Orientation::Horizontal, false);
        let overlay =
            ChapterOverlay::build(&l, &[5.0, 8.0], &titles(&["a", "bbb"]), fixed_masks).unwrap();

        assert_eq!(overlay.masks.len(), 2);
        assert_eq!(
            overlay.ops,
            vec![
                OverlayOp::Title { mask: 0, x: 70, y: 15 },
                OverlayOp::Separator(150),
                OverlayOp::Title { mask: 1, x: 180, y: 15 },
                OverlayOp::Separator(240),
                OverlayOp::Title { mask: 1, x: 255, y: 15 },
            ]
        );
    }

    #[test]
    fn extra_titles_are_skipped_except_the_last() {
        let l = layout(Orientation::Horizontal, false);
        let mut seen = Vec::new();
        let overlay = ChapterOverlay::build(&l, &[5.0], &titles(&["a", "b", "c"]), |t| {
            seen.push(t.to_string());
            fixed_masks(t)
        })
        .unwrap();
        assert_eq!(seen, vec!["a", "c"]);
        assert_eq!(overlay.ops.len(), 3);
    }

    #[test]
    fn reversed_bar_mirrors_separators() {
        let l = layout(Orientation::Horizontal, true);
        let overlay =
            ChapterOverlay::build(&l, &[5.0, 10.0], &titles(&["a", "b", "c"]), fixed_masks)
                .unwrap();
        let separators: Vec<i64> = overlay
            .ops
            .iter()
            .filter_map(|op| match op {
                OverlayOp::Separator(p) => Some(*p),
                OverlayOp::Title { .. } => None,
            })
            .collect();
        assert_eq!(separators, vec![150, 0]);
        // segment 150 -> 0 runs backwards: 150 + (-150 - 10) div 2
        assert_eq!(overlay.ops[2], OverlayOp::Title { mask: 1, x: 70, y: 15 });
    }
}
