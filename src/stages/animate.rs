use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::sorted_glob;
use crate::config::Config;
use crate::error::Result;
use crate::render::animation::{write_gif, write_video};

pub const OUTPUTS: [&str; 3] = ["animation.gif", "animation.mp4", "animation.webp"];

/// GIF frame delay in hundredths of a second for a frame rate.
pub fn gif_delay(fps: u32) -> u16 {
    (100 / fps.max(1)).max(1) as u16
}

pub fn frames(config: &Config) -> Result<Vec<PathBuf>> {
    sorted_glob(&config.frames_dir().join("????-??-??.png"))
}

pub fn run(config: &Config, fps: u32, timeout: Duration) -> Result<()> {
    let frames = frames(config)?;
    if frames.is_empty() {
        warn!("No frames under \"{}\"", config.frames_dir().display());
        return Ok(());
    }

    for name in OUTPUTS {
        let out = config.output_path(name);
        if out.exists() {
            continue;
        }

        info!("Making \"{}\" from {} frames ...", out.display(), frames.len());
        if name.ends_with(".gif") {
            write_gif(&out, &frames, gif_delay(fps))?;
        } else {
            write_video(&out, &frames, fps, timeout)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ensure_dir;
    use crate::render::animation::tests::gif_frame_count;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_gif_delay() {
        assert_eq!(gif_delay(25), 4);
        assert_eq!(gif_delay(10), 10);
        assert_eq!(gif_delay(0), 100);
        assert_eq!(gif_delay(500), 1);
    }

    #[test]
    fn test_nothing_to_animate() {
        let dir = tempdir().unwrap();
        let config = Config::default().with_output_dir(dir.path().to_path_buf());
        ensure_dir(&config.frames_dir()).unwrap();

        run(&config, 25, Duration::from_secs(1)).unwrap();

        assert!(!config.output_path("animation.gif").exists());
    }

    #[test]
    fn test_failed_gif_is_redone_on_the_next_run() {
        let dir = tempdir().unwrap();
        let config = Config::default().with_output_dir(dir.path().to_path_buf());
        ensure_dir(&config.frames_dir()).unwrap();
        let frame = |name: &str, width: u32| {
            RgbImage::from_pixel(width, 6, Rgb([0, 128, 255]))
                .save(config.frames_dir().join(name))
                .unwrap();
        };
        frame("2021-01-01.png", 8);
        frame("2021-01-02.png", 6);

        assert!(run(&config, 25, Duration::from_secs(30)).is_err());
        assert!(!config.output_path("animation.gif").exists());

        frame("2021-01-02.png", 8);
        // The videos need ffmpeg, which may be missing; the GIF comes first either way
        let _ = run(&config, 25, Duration::from_secs(30));

        assert_eq!(gif_frame_count(&config.output_path("animation.gif")), 2);
    }
}
