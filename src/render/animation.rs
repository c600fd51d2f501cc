//! Animations of the composited frames.

use gif::{Encoder, Frame, Repeat};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::debug;

use super::RenderError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A temporary file next to `path` with the same extension. It only replaces `path` once
/// `persist` is called, so a failed write never leaves a partial output behind.
fn staging_file(path: &Path) -> Result<NamedTempFile, RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(&suffix)
        .tempfile_in(dir)?)
}

fn persist(staged: NamedTempFile, path: &Path) -> Result<(), RenderError> {
    staged.persist(path).map_err(|e| RenderError::Io(e.error))?;
    Ok(())
}

fn frame_size(path: &Path) -> Result<(u32, u32), RenderError> {
    Ok(image::image_dimensions(path)?)
}

/// Looping GIF of `frames`, each shown for `delay` hundredths of a second.
pub fn write_gif(path: &Path, frames: &[PathBuf], delay: u16) -> Result<(), RenderError> {
    let first = frames.first().ok_or(RenderError::NoFrames)?;
    let (width, height) = frame_size(first)?;
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(RenderError::GifSize(width, height));
    }

    let mut staged = staging_file(path)?;
    {
        let mut encoder = Encoder::new(
            BufWriter::new(staged.as_file_mut()),
            width as u16,
            height as u16,
            &[],
        )?;
        encoder.set_repeat(Repeat::Infinite)?;
        write_frames(&mut encoder, frames, (width, height), delay)?;
        encoder.into_inner()?.flush()?;
    }

    persist(staged, path)
}

fn write_frames<W: Write>(
    encoder: &mut Encoder<W>,
    frames: &[PathBuf],
    (width, height): (u32, u32),
    delay: u16,
) -> Result<(), RenderError> {
    for frame_path in frames {
        debug!("Adding \"{}\" ...", frame_path.display());
        let mut image = image::open(frame_path)?.to_rgba8();
        if image.dimensions() != (width, height) {
            return Err(RenderError::FrameSize {
                path: frame_path.clone(),
                expected: (width, height),
                found: image.dimensions(),
            });
        }

        let mut frame = Frame::from_rgba_speed(width as u16, height as u16, &mut image, 10);
        frame.delay = delay;
        encoder.write_frame(&frame)?;
    }

    Ok(())
}

/// Runs `ffmpeg` and kills it if it is still running after `timeout`.
pub fn run_ffmpeg(args: &[String], timeout: Duration) -> Result<(), RenderError> {
    debug!("ffmpeg {}", args.join(" "));

    // Nothing drains stderr until ffmpeg exits, so it cannot be a pipe
    let mut stderr = tempfile::tempfile()?;
    let mut child = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr.try_clone()?))
        .spawn()
        .map_err(|e| RenderError::Subprocess {
            command: "ffmpeg".to_string(),
            message: e.to_string(),
        })?;

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() > timeout {
            child.kill()?;
            child.wait()?;
            return Err(RenderError::Timeout {
                command: "ffmpeg".to_string(),
                seconds: timeout.as_secs_f64(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        let mut bytes = Vec::new();
        stderr.seek(SeekFrom::Start(0))?;
        stderr.read_to_end(&mut bytes)?;
        let message = String::from_utf8_lossy(&bytes);
        return Err(RenderError::Subprocess {
            command: "ffmpeg".to_string(),
            message: message.lines().last().unwrap_or("unknown error").to_string(),
        });
    }
    Ok(())
}

/// Input list for ffmpeg's concat demuxer, one entry per frame.
fn concat_list(frames: &[PathBuf], fps: u32) -> Result<String, RenderError> {
    let duration = 1.0 / fps.max(1) as f64;
    let mut list = String::from("ffconcat version 1.0\n");
    for frame in frames {
        let absolute = std::path::absolute(frame)?;
        let escaped = absolute.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\nduration {}\n", escaped, duration));
    }
    // The last entry's duration is only honoured when it is repeated
    if let Some(last) = list.lines().rev().nth(1).map(str::to_string) {
        list.push_str(&last);
        list.push('\n');
    }
    Ok(list)
}

fn codec_args(path: &Path) -> Result<Vec<String>, RenderError> {
    let args: &[&str] = match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => &[
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-movflags",
            "+faststart",
        ],
        Some("webp") => &["-c:v", "libwebp", "-lossless", "0", "-loop", "0"],
        _ => {
            return Err(RenderError::Subprocess {
                command: "ffmpeg".to_string(),
                message: format!("no encoder for {}", path.display()),
            });
        }
    };
    Ok(args.iter().map(|a| a.to_string()).collect())
}

/// MP4 or WEBP (chosen by the extension of `path`) at `fps` frames per second.
pub fn write_video(
    path: &Path,
    frames: &[PathBuf],
    fps: u32,
    timeout: Duration,
) -> Result<(), RenderError> {
    if frames.is_empty() {
        return Err(RenderError::NoFrames);
    }
    let codec = codec_args(path)?;

    let mut list = tempfile::Builder::new().suffix(".txt").tempfile()?;
    list.write_all(concat_list(frames, fps)?.as_bytes())?;
    list.flush()?;

    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-y",
        "-f",
        "concat",
        "-safe",
        "0",
        "-i",
    ]
    .iter()
    .map(|a| a.to_string())
    .collect();
    args.push(list.path().to_string_lossy().into_owned());
    args.extend(["-r".to_string(), fps.to_string()]);
    args.extend(codec);
    let staged = staging_file(path)?;
    args.push(staged.path().to_string_lossy().into_owned());

    run_ffmpeg(&args, timeout)?;
    persist(staged, path)
}
