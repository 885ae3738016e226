mod chapters;
mod config;
mod draw;
mod encode;
mod error;
mod font;
mod geometry;
mod timeline;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use config::{RenderPlan, load_config};
use draw::render_frame;
use encode::{Codec, EncodeConfig, FfmpegEncoder};
use error::ProgressResult;

#[derive(Parser, Debug)]
#[command(name = "progress-bar-video")]
#[command(about = "Render an animated progress bar video from a JSON configuration")]
struct Args {
    /// JSON configuration file
    config: PathBuf,

    /// Output file. Overrides `output_file` from the configuration
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render only this frame (0-based) as a PNG instead of the whole video
    #[arg(long)]
    frame: Option<u64>,

    /// Video codec
    #[arg(long, value_enum, default_value_t = Codec::Mjpeg)]
    codec: Codec,

    /// Frames synthesized in parallel before being written
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
    batch: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let doc = load_config(&args.config)
        .with_context(|| format!("load configuration '{}'", args.config.display()))?;
    let plan = doc
        .resolve()
        .with_context(|| format!("resolve configuration '{}'", args.config.display()))?;
    tracing::info!(
        width = plan.canvas_width,
        height = plan.canvas_height,
        frames = plan.total_frames(),
        "render plan ready"
    );
    tracing::debug!(
        chapters = plan.chapters.len(),
        titles = plan.chapter_titles.len(),
        font = %plan.title_font_path.display(),
        font_size = plan.title_font_size,
        "chapter overlay {}",
        if plan.overlay.is_some() { "enabled" } else { "disabled" }
    );

    if let Some(index) = args.frame {
        let out = args
            .output
            .unwrap_or_else(|| PathBuf::from(format!("frame_{index:06}.png")));
        let img = render_frame(&plan, index)?;
        img.save(&out)
            .with_context(|| format!("write png '{}'", out.display()))?;
        tracing::info!("wrote {}", out.display());
        return Ok(());
    }

    let out = args.output.unwrap_or(doc.output_file);
    let mut encoder = FfmpegEncoder::new(EncodeConfig {
        width: plan.canvas_width,
        height: plan.canvas_height,
        fps: plan.frame_rate,
        out_path: out.clone(),
        codec: args.codec,
    })?;

    let pb = ProgressBar::new(plan.total_frames());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {msg} {bar:40.cyan/blue} {pos}/{len} frames")?
            .progress_chars("=>-"),
    );
    pb.set_message("Exporting Frames");

    let exported = export_frames(&plan, args.batch, |_, frame| {
        encoder.encode_frame(frame)?;
        pb.inc(1);
        Ok(())
    });
    if let Err(e) = exported {
        pb.abandon_with_message("Export failed");
        encoder.abort();
        return Err(e.into());
    }
    tracing::debug!(frames = encoder.frames_written(), "all frames written");
    encoder.finish()?;
    pb.finish_with_message("Export done");

    tracing::info!("wrote {}", out.display());
    Ok(())
}

/// Renders every frame in parallel batches and hands them to `sink` one at a
/// time in ascending index order. Stops at the first error.
fn export_frames(
    plan: &RenderPlan,
    batch: u64,
    mut sink: impl FnMut(u64, &RgbImage) -> ProgressResult<()>,
) -> ProgressResult<()> {
    let total_frames = plan.total_frames();
    let mut start = 0u64;
    while start < total_frames {
        let end = (start + batch).min(total_frames);
        let frames: Vec<RgbImage> = (start..end)
            .into_par_iter()
            .map(|i| render_frame(plan, i))
            .collect::<ProgressResult<_>>()?;
        for (i, frame) in (start..end).zip(&frames) {
            sink(i, frame)?;
        }
        start = end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ConfigDocument;
    use error::ProgressError;

    fn plan(video_duration: f64) -> RenderPlan {
        let json = format!(
            r#"{{
                "output_file": "unused.avi",
                "video_duration": {video_duration},
                "progress_color": [0, 0, 255],
                "background_color": [0, 0, 0],
                "bar_dimension": 64,
                "bar_width": 4,
                "chapters": [],
                "chapter_titles": [],
                "chapter_separator_color": [255, 255, 255],
                "is_horizontal": true,
                "is_reversed": false,
                "title_font": "unused.ttf",
                "title_font_size": 10,
                "title_font_color": [255, 255, 255]
            }}"#
        );
        ConfigDocument::from_json_str(&json)
            .unwrap()
            .resolve()
            .unwrap()
    }

    #[test]
    fn frames_reach_the_sink_in_ascending_order() {
        let p = plan(1.0);
        let total = p.total_frames();
        assert_eq!(total, 30);

        for batch in [1, 7, total + 5] {
            let mut seen = Vec::new();
            export_frames(&p, batch, |i, frame| {
                assert_eq!(*frame, render_frame(&p, i).unwrap());
                seen.push(i);
                Ok(())
            })
            .unwrap();
            assert_eq!(seen, (0..total).collect::<Vec<_>>(), "batch {batch}");
        }
    }

    #[test]
    fn sink_error_stops_the_export() {
        let p = plan(1.0);
        let mut seen = Vec::new();
        let err = export_frames(&p, 7, |i, _| {
            seen.push(i);
            if i == 10 {
                return Err(ProgressError::encoding("disk full"));
            }
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, ProgressError::Encoding(_)));
        assert_eq!(seen, (0..=10).collect::<Vec<_>>());
    }
}
