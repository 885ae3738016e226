//! Playback progress arithmetic.
//!
//! Positions are the float product truncated toward zero; nothing here rounds
//! or clamps.

/// Number of frames in a video of `duration` seconds at `fps`.
pub fn total_frames(duration: f64, fps: u32) -> u64 {
    (duration * f64::from(fps)).round() as u64
}

/// Fraction of the timeline represented by `frame_index`, flipped when reversed.
pub fn progress(frame_index: u64, total_frames: u64, reversed: bool) -> f64 {
    let p = frame_index as f64 / total_frames as f64;
    if reversed { 1.0 - p } else { p }
}

/// Fraction of the timeline at `seconds`, flipped when reversed.
pub fn time_progress(seconds: f64, duration: f64, reversed: bool) -> f64 {
    let p = seconds / duration;
    if reversed { 1.0 - p } else { p }
}

/// Pixel offset along a bar of `length` pixels.
pub fn extent(progress: f64, length: u32) -> i64 {
    (progress * f64::from(length)) as i64
}
