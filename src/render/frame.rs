use image::{Rgb, RgbImage, imageops};

const BACKGROUND: Rgb<u8> = Rgb([242, 242, 242]);
const MARGIN: u32 = 10;

/// Places the map and the plot side by side, each centred vertically.
pub fn compose(map: &RgbImage, plot: &RgbImage) -> RgbImage {
    let width = map.width() + plot.width() + 3 * MARGIN;
    let height = map.height().max(plot.height()) + 2 * MARGIN;
    let inner = height - 2 * MARGIN;

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    imageops::replace(
        &mut canvas,
        map,
        MARGIN as i64,
        (MARGIN + (inner - map.height()) / 2) as i64,
    );
    imageops::replace(
        &mut canvas,
        plot,
        (2 * MARGIN + map.width()) as i64,
        (MARGIN + (inner - plot.height()) / 2) as i64,
    );
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_layout() {
        let map = RgbImage::from_pixel(4, 6, Rgb([255, 0, 0]));
        let plot = RgbImage::from_pixel(5, 3, Rgb([0, 0, 255]));

        let frame = compose(&map, &plot);

        assert_eq!(frame.dimensions(), (4 + 5 + 30, 6 + 20));
        assert_eq!(frame.get_pixel(0, 0), &BACKGROUND);
        // Taller image fills the inner height
        assert_eq!(frame.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(13, 15), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(14, 10), &BACKGROUND);
        // Shorter image is offset by (6 - 3) / 2 = 1 px
        assert_eq!(frame.get_pixel(24, 10), &BACKGROUND);
        assert_eq!(frame.get_pixel(24, 11), &Rgb([0, 0, 255]));
        assert_eq!(frame.get_pixel(28, 13), &Rgb([0, 0, 255]));
        assert_eq!(frame.get_pixel(28, 14), &BACKGROUND);
    }
}
