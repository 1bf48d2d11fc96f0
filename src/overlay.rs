//! Fixed annotations drawn over each decoded frame: a centered crosshair and
//! a status label. Drawing is clipped to the image, so any size is accepted.

use image::Rgb;

use crate::decode::DecodedImage;

const GLYPH_COLUMNS: i64 = 5;
const GLYPH_ROWS: i64 = 7;
/// Glyph advance in font pixels (5 columns + 1 spacing).
const GLYPH_ADVANCE: i64 = 6;

#[derive(Clone, Debug)]
pub struct Overlay {
    pub color: Rgb<u8>,
    /// Crosshair arm length from the center, in pixels.
    pub arm_length: u32,
    /// Stroke width of the crosshair.
    pub thickness: u32,
    pub label: String,
    /// Left end of the label baseline.
    pub label_origin: (u32, u32),
    /// Integer scale applied to the 5x7 font.
    pub label_scale: u32,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            color: Rgb([0, 255, 0]),
            arm_length: 20,
            thickness: 2,
            label: "CAMERA LIVE".to_string(),
            label_origin: (10, 30),
            label_scale: 3,
        }
    }
}

impl Overlay {
    pub fn render(&self, mut image: DecodedImage) -> DecodedImage {
        self.draw_crosshair(&mut image);
        self.draw_label(&mut image);
        image
    }

    fn draw_crosshair(&self, image: &mut DecodedImage) {
        let cx = (image.width() / 2) as i64;
        let cy = (image.height() / 2) as i64;
        let arm = self.arm_length as i64;
        let t = self.thickness.max(1) as i64;
        let offset = t / 2;

        fill_rect(image, cx - arm, cy - offset, 2 * arm + 1, t, self.color);
        fill_rect(image, cx - offset, cy - arm, t, 2 * arm + 1, self.color);
    }

    fn draw_label(&self, image: &mut DecodedImage) {
        let scale = self.label_scale.max(1) as i64;
        let (x0, baseline) = (self.label_origin.0 as i64, self.label_origin.1 as i64);
        let top = baseline - GLYPH_ROWS * scale;

        for (i, ch) in self.label.chars().enumerate() {
            let gx = x0 + i as i64 * GLYPH_ADVANCE * scale;
            for (col, bits) in glyph(ch).iter().enumerate() {
                for row in 0..GLYPH_ROWS {
                    if bits & (1u8 << row) == 0 {
                        continue;
                    }
                    fill_rect(
                        image,
                        gx + col as i64 * scale,
                        top + row * scale,
                        scale,
                        scale,
                        self.color,
                    );
                }
            }
        }
    }
}

fn fill_rect(image: &mut DecodedImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + w).min(image.width() as i64);
    let y_end = (y + h).min(image.height() as i64);
    for py in y_start..y_end {
        for px in x_start..x_end {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Column-major 5x7 glyphs, bit 0 at the top row.
fn glyph(ch: char) -> [u8; GLYPH_COLUMNS as usize] {
    match ch.to_ascii_uppercase() {
        'A' => [0x7C, 0x12, 0x11, 0x12, 0x7C],
        'B' => [0x7F, 0x49, 0x49, 0x49, 0x36],
        'C' => [0x3E, 0x41, 0x41, 0x41, 0x22],
        'D' => [0x7F, 0x41, 0x41, 0x22, 0x1C],
        'E' => [0x7F, 0x49, 0x49, 0x49, 0x41],
        'F' => [0x7F, 0x09, 0x09, 0x09, 0x01],
        'G' => [0x3E, 0x41, 0x49, 0x49, 0x7A],
        'H' => [0x7F, 0x08, 0x08, 0x08, 0x7F],
        'I' => [0x00, 0x41, 0x7F, 0x41, 0x00],
        'J' => [0x20, 0x40, 0x41, 0x3F, 0x01],
        'K' => [0x7F, 0x08, 0x14, 0x22, 0x41],
        'L' => [0x7F, 0x40, 0x40, 0x40, 0x40],
        'M' => [0x7F, 0x02, 0x0C, 0x02, 0x7F],
        'N' => [0x7F, 0x04, 0x08, 0x10, 0x7F],
        'O' => [0x3E, 0x41, 0x41, 0x41, 0x3E],
        'P' => [0x7F, 0x09, 0x09, 0x09, 0x06],
        'Q' => [0x3E, 0x41, 0x51, 0x21, 0x5E],
        'R' => [0x7F, 0x09, 0x19, 0x29, 0x46],
        'S' => [0x46, 0x49, 0x49, 0x49, 0x31],
        'T' => [0x01, 0x01, 0x7F, 0x01, 0x01],
        'U' => [0x3F, 0x40, 0x40, 0x40, 0x3F],
        'V' => [0x1F, 0x20, 0x40, 0x20, 0x1F],
        'W' => [0x3F, 0x40, 0x38, 0x40, 0x3F],
        'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
        'Y' => [0x07, 0x08, 0x70, 0x08, 0x07],
        'Z' => [0x61, 0x51, 0x49, 0x45, 0x43],
        '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
        '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
        '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
        '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
        '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
        '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
        '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
        '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
        '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
        ':' => [0x00, 0x36, 0x36, 0x00, 0x00],
        _ => [0x00; GLYPH_COLUMNS as usize],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

    #[test]
    fn crosshair_is_centered_with_fixed_arms() {
        let image = Overlay::default().render(DecodedImage::from_pixel(200, 100, BLACK));
        assert_eq!(*image.get_pixel(100, 50), GREEN);
        assert_eq!(*image.get_pixel(80, 50), GREEN);
        assert_eq!(*image.get_pixel(120, 50), GREEN);
        assert_eq!(*image.get_pixel(100, 30), GREEN);
        assert_eq!(*image.get_pixel(100, 70), GREEN);
        assert_eq!(*image.get_pixel(79, 50), BLACK);
        assert_eq!(*image.get_pixel(121, 50), BLACK);
        assert_eq!(*image.get_pixel(100, 71), BLACK);
    }

    #[test]
    fn label_sits_on_its_baseline() {
        let image = Overlay::default().render(DecodedImage::from_pixel(320, 240, BLACK));
        // First column of 'C' has rows 1..=5 set; scaled x3 from the top at y=9.
        assert_eq!(*image.get_pixel(10, 12), GREEN);
        assert_eq!(*image.get_pixel(10, 9), BLACK);
        assert_eq!(*image.get_pixel(10, 30), BLACK);
    }

    #[test]
    fn tiny_images_are_clipped_not_panicking() {
        let image = Overlay::default().render(DecodedImage::from_pixel(3, 2, BLACK));
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(*image.get_pixel(1, 1), GREEN);

        let empty = Overlay::default().render(DecodedImage::new(0, 0));
        assert_eq!(empty.dimensions(), (0, 0));
    }

    #[test]
    fn render_is_deterministic() {
        let overlay = Overlay::default();
        let a = overlay.render(DecodedImage::from_pixel(64, 48, BLACK));
        let b = overlay.render(DecodedImage::from_pixel(64, 48, BLACK));
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_characters_render_blank() {
        assert_eq!(glyph('~'), [0; 5]);
        assert_eq!(glyph('a'), glyph('A'));
    }
}
