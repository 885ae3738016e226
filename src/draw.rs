//! Progress bar frame synthesis (image)

use image::{Rgb, RgbImage};

use crate::chapters::OverlayOp;
use crate::config::RenderPlan;
use crate::error::{ProgressError, ProgressResult};
use crate::font::TextMask;
use crate::geometry::fill_span;

/// Draw one frame: background, fill up to the current progress, then the
/// chapter overlay.
/// `frame_index` must lie in `[0, plan.total_frames())`.
pub fn render_frame(plan: &RenderPlan, frame_index: u64) -> ProgressResult<RgbImage> {
    let total = plan.total_frames();
    if frame_index >= total {
        return Err(ProgressError::render(format!(
            "frame {frame_index} is outside 0..{total}"
        )));
    }

    let mut img = RgbImage::from_pixel(
        plan.canvas_width,
        plan.canvas_height,
        plan.background_color,
    );
    let thickness = i64::from(plan.bar_thickness);

    // Anchored at the canvas origin whether or not the bar is reversed.
    fill_span(
        &mut img,
        plan.orientation,
        0..plan.fill_extent(frame_index),
        0..thickness,
        plan.fill_color,
    );

    let Some(overlay) = &plan.overlay else {
        return Ok(img);
    };

    for op in &overlay.ops {
        match *op {
            OverlayOp::Title { mask, x, y } => {
                blend_mask(&mut img, &overlay.masks[mask], x, y, plan.title_color);
            }
            OverlayOp::Separator(position) => fill_span(
                &mut img,
                plan.orientation,
                position..position + 1,
                0..thickness,
                plan.separator_color,
            ),
        }
    }

    Ok(img)
}

/// Blend `color` into `img` through `mask`, with the mask's origin at `(x, y)`.
fn blend_mask(img: &mut RgbImage, mask: &TextMask, x: i64, y: i64, color: Rgb<u8>) {
    let (width, height) = img.dimensions();
    let x0 = x + mask.left;
    let y0 = y + mask.top;

    for my in 0..mask.height {
        let py = y0 + i64::from(my);
        if py < 0 || py >= i64::from(height) {
            continue;
        }
        for mx in 0..mask.width {
            let px = x0 + i64::from(mx);
            if px < 0 || px >= i64::from(width) {
                continue;
            }
            let a = mask.get(mx, my);
            if a == 0 {
                continue;
            }
            let dst = img.get_pixel_mut(px as u32, py as u32);
            for (d, &c) in dst.0.iter_mut().zip(color.0.iter()) {
                *d = mix(*d, c, a);
            }
        }
    }
}

fn mix(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(dst) * (255 - a) + u32::from(src) * a + 127) / 255) as u8
}
