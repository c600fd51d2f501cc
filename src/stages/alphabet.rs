use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::render::font_strip::render_strip;
use crate::render::save_png;

/// Renders the font strip used to annotate the maps.
pub fn run(config: &Config, font: &Path) -> Result<()> {
    let out = config.font_strip();
    if out.exists() {
        info!("\"{}\" already exists", out.display());
        return Ok(());
    }

    info!("Making \"{}\" ...", out.display());
    let data = fs::read(font)?;
    save_png(&render_strip(&data, config.char_width())?, out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::render::RenderError;
    use tempfile::tempdir;

    #[test]
    fn test_invalid_font() {
        let dir = tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        fs::write(&font, b"not a font").unwrap();
        let config = Config::default().with_font_strip(dir.path().join("strip.png"));

        let result = run(&config, &font);

        assert!(matches!(result, Err(Error::Render(RenderError::Font))));
        assert!(!dir.path().join("strip.png").exists());
    }

    #[test]
    fn test_existing_strip_is_kept() {
        let dir = tempdir().unwrap();
        let strip = dir.path().join("strip.png");
        fs::write(&strip, b"existing").unwrap();
        let config = Config::default().with_font_strip(strip.clone());

        run(&config, &dir.path().join("missing.ttf")).unwrap();

        assert_eq!(fs::read(&strip).unwrap(), b"existing");
    }
}
