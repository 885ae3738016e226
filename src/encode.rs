//! Raw RGB frames → video file through an `ffmpeg` child process.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use image::RgbImage;

use crate::error::{ProgressError, ProgressResult};

/// Video codec for the output stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Codec {
    /// Motion JPEG (lossy, every frame a keyframe).
    #[default]
    Mjpeg,
    /// FFV1 (lossless).
    Ffv1,
}

impl Codec {
    fn ffmpeg_args(self) -> &'static [&'static str] {
        match self {
            Self::Mjpeg => &["-c:v", "mjpeg", "-pix_fmt", "yuvj444p", "-q:v", "2"],
            Self::Ffv1 => &["-c:v", "ffv1", "-pix_fmt", "gbrp"],
        }
    }
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub codec: Codec,
}

impl EncodeConfig {
    pub fn validate(&self) -> ProgressResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ProgressError::encoding(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(ProgressError::encoding("encode fps must be non-zero"));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(ProgressError::encoding("output path is empty"));
        }
        Ok(())
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> ProgressResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                ProgressError::encoding(format!(
                    "failed to create output directory '{}': {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}

/// Single writer for the output stream. Frames must arrive in ascending order.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> ProgressResult<Self> {
        cfg.validate()?;

        if !is_ffmpeg_on_path() {
            return Err(ProgressError::encoding(
                "ffmpeg not found. Please install ffmpeg and add it to your PATH.",
            ));
        }
        ensure_parent_dir(&cfg.out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
        ])
        .args(cfg.codec.ffmpeg_args())
        .args(["-flags", "+bitexact", "-fflags", "+bitexact"])
        .arg(&cfg.out_path);

        tracing::debug!(?cmd, "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            ProgressError::encoding(format!("failed to spawn ffmpeg: {e}"))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProgressError::encoding("failed to open ffmpeg stdin"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn encode_frame(&mut self, frame: &RgbImage) -> ProgressResult<()> {
        if frame.dimensions() != (self.cfg.width, self.cfg.height) {
            return Err(ProgressError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }
        debug_assert_eq!(frame.as_raw().len(), self.cfg.frame_len());

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ProgressError::encoding("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(frame.as_raw()).map_err(|e| {
            ProgressError::encoding(format!(
                "failed to write frame {} to ffmpeg: {e}",
                self.frames_written
            ))
        })?;
        self.frames_written += 1;
        Ok(())
    }

    /// Closes the stream and waits for ffmpeg to finalize the file.
    pub fn finish(mut self) -> ProgressResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            ProgressError::encoding(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if !output.status.success() {
            remove_partial_output(&self.cfg.out_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProgressError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Stops ffmpeg and removes the partially written output.
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        remove_partial_output(&self.cfg.out_path);
    }
}

fn remove_partial_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(error = %e, "no partial output to remove");
    }
}
