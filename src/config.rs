//! Progress-bar configuration document and the render plan resolved from it.

use std::path::{Path, PathBuf};

use image::Rgb;
use serde::Deserialize;

use crate::chapters::{BarLayout, ChapterOverlay};
use crate::error::{ProgressError, ProgressResult};
use crate::font::{TextMask, TitleFont};
use crate::geometry::Orientation;
use crate::timeline;

/// Output frame rate (fps).
pub const FRAME_RATE: u32 = 30;
/// Bar thickness used when `bar_width` is absent or null.
pub const DEFAULT_BAR_THICKNESS: u32 = 40;

/// Configuration document as written by the user.
///
/// Colors are `[blue, green, red]`.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfigDocument {
    /// Destination video path.
    pub output_file: PathBuf,
    /// Total playback duration (seconds).
    pub video_duration: f64,
    /// Fill color.
    pub progress_color: [u8; 3],
    /// Backdrop color.
    pub background_color: [u8; 3],
    /// Bar length along its major axis (pixels).
    pub bar_dimension: u32,
    /// Bar thickness (pixels).
    #[serde(default)]
    pub bar_width: Option<u32>,
    /// Chapter start times (seconds), ascending.
    pub chapters: Vec<f64>,
    /// Chapter labels; title `i` sits before chapter `i`, the last one after the final chapter.
    pub chapter_titles: Vec<String>,
    /// Separator line color.
    pub chapter_separator_color: [u8; 3],
    /// Bar grows left to right when true, top to bottom otherwise.
    pub is_horizontal: bool,
    /// Fill shrinks from full instead of growing from empty.
    pub is_reversed: bool,
    /// Font file used for chapter titles.
    pub title_font: PathBuf,
    /// Title em size (pixels).
    pub title_font_size: u32,
    /// Title text color.
    pub title_font_color: [u8; 3],
}

/// Read and parse a JSON configuration file.
pub fn load_config(path: &Path) -> ProgressResult<ConfigDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ProgressError::config(format!("failed to read config '{}': {e}", path.display()))
    })?;
    ConfigDocument::from_json_str(&text)
}

fn bgr(c: [u8; 3]) -> Rgb<u8> {
    Rgb([c[2], c[1], c[0]])
}

impl ConfigDocument {
    pub fn from_json_str(text: &str) -> ProgressResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ProgressError::config(format!("invalid configuration: {e}")))
    }

    /// Validates the document and resolves it into a render plan.
    ///
    /// The title font is only read when chapters and titles are both present.
    pub fn resolve(&self) -> ProgressResult<RenderPlan> {
        self.resolve_with(|path, size| {
            let font = TitleFont::load(path, size)?;
            Ok(move |text: &str| font.rasterize(text))
        })
    }

    /// Like [`ConfigDocument::resolve`] with a custom title rasterizer factory.
    pub fn resolve_with<F, R>(&self, open_font: F) -> ProgressResult<RenderPlan>
    where
        F: FnOnce(&Path, u32) -> ProgressResult<R>,
        R: FnMut(&str) -> TextMask,
    {
        let duration = self.video_duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ProgressError::config(format!(
                "video_duration must be a positive number of seconds, got {duration}"
            )));
        }
        if timeline::total_frames(duration, FRAME_RATE) == 0 {
            return Err(ProgressError::config(format!(
                "video_duration {duration}s is shorter than one frame at {FRAME_RATE} fps"
            )));
        }
        if self.bar_dimension == 0 {
            return Err(ProgressError::config("bar_dimension must be non-zero"));
        }
        let bar_thickness = self.bar_width.unwrap_or(DEFAULT_BAR_THICKNESS);
        if bar_thickness == 0 {
            return Err(ProgressError::config("bar_width must be non-zero"));
        }
        if self.title_font_size == 0 {
            return Err(ProgressError::config("title_font_size must be non-zero"));
        }
        self.validate_chapters()?;

        let orientation = Orientation::from_horizontal(self.is_horizontal);
        let (canvas_width, canvas_height) =
            orientation.canvas_size(self.bar_dimension, bar_thickness);
        let layout = BarLayout {
            orientation,
            reversed: self.is_reversed,
            fill_length: self.bar_dimension,
            bar_thickness,
            video_duration: duration,
        };

        let overlay = if self.chapters.is_empty() || self.chapter_titles.is_empty() {
            None
        } else {
            let rasterize = open_font(&self.title_font, self.title_font_size)?;
            ChapterOverlay::build(&layout, &self.chapters, &self.chapter_titles, rasterize)
        };

        tracing::debug!(
            ?orientation,
            canvas_width,
            canvas_height,
            fill_length = self.bar_dimension,
            chapters = self.chapters.len(),
            "resolved render plan"
        );

        Ok(RenderPlan {
            orientation,
            reversed: self.is_reversed,
            canvas_width,
            canvas_height,
            bar_thickness,
            fill_length: self.bar_dimension,
            background_color: bgr(self.background_color),
            fill_color: bgr(self.progress_color),
            separator_color: bgr(self.chapter_separator_color),
            title_color: bgr(self.title_font_color),
            chapters: self.chapters.clone(),
            chapter_titles: self.chapter_titles.clone(),
            title_font_path: self.title_font.clone(),
            title_font_size: self.title_font_size,
            video_duration: duration,
            frame_rate: FRAME_RATE,
            overlay,
        })
    }

    fn validate_chapters(&self) -> ProgressResult<()> {
        let duration = self.video_duration;
        for (i, &t) in self.chapters.iter().enumerate() {
            if !t.is_finite() || t < 0.0 || t > duration {
                return Err(ProgressError::config(format!(
                    "chapters[{i}] = {t} is outside [0, {duration}]"
                )));
            }
        }
        if let Some(i) = self.chapters.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ProgressError::config(format!(
                "chapters must be strictly increasing: chapters[{i}] = {} then chapters[{}] = {}",
                self.chapters[i],
                i + 1,
                self.chapters[i + 1]
            )));
        }

        if self.chapters.is_empty() || self.chapter_titles.is_empty() {
            return Ok(());
        }
        if self.chapter_titles.len() < self.chapters.len() {
            return Err(ProgressError::config(format!(
                "{} chapter_titles for {} chapters; need at least one title per chapter",
                self.chapter_titles.len(),
                self.chapters.len()
            )));
        }
        if self.chapter_titles.len() > self.chapters.len() + 1 {
            tracing::warn!(
                titles = self.chapter_titles.len(),
                chapters = self.chapters.len(),
                "only the first {} and the last chapter titles are drawn",
                self.chapters.len()
            );
        }
        Ok(())
    }
}

/// Fully resolved, immutable parameters for a whole video.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub orientation: Orientation,
    pub reversed: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub bar_thickness: u32,
    /// Bar length along the major axis; matches the canvas in that direction.
    pub fill_length: u32,
    pub background_color: Rgb<u8>,
    pub fill_color: Rgb<u8>,
    pub separator_color: Rgb<u8>,
    pub title_color: Rgb<u8>,
    pub chapters: Vec<f64>,
    pub chapter_titles: Vec<String>,
    pub title_font_path: PathBuf,
    pub title_font_size: u32,
    pub video_duration: f64,
    pub frame_rate: u32,
    /// Present when both chapters and titles are configured.
    pub overlay: Option<ChapterOverlay>,
}

impl RenderPlan {
    pub fn total_frames(&self) -> u64 {
        timeline::total_frames(self.video_duration, self.frame_rate)
    }

    /// Pixels along the major axis painted with the fill color at `frame_index`.
    pub fn fill_extent(&self, frame_index: u64) -> i64 {
        let p = timeline::progress(frame_index, self.total_frames(), self.reversed);
        timeline::extent(p, self.fill_length)
    }
}
