use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of `text` at `scale` (single line).
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    n.saturating_mul(glyph_advance_x(scale))
}

/// 2D drawing interface used by the game. Coordinates are in surface pixels, origin top-left.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    /// Opaque fill.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    /// Opaque filled circle centred on (`cx`, `cy`).
    fn fill_disc(&mut self, cx: u32, cy: u32, radius: u32, color: Color);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: Color) {
        self.draw_text_scaled(x, y, text, color, DEFAULT_TEXT_SCALE);
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom().saturating_sub(1), rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, rect.h), color);
        self.fill_rect(Rect::new(rect.right().saturating_sub(1), rect.y, 1, rect.h), color);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Clips `rect` to the surface. `None` when nothing is visible or the buffer is too small.
    fn clip(&self, rect: Rect) -> Option<Rect> {
        if self.frame.len() < self.size.rgba_len() || self.size.is_empty() {
            return None;
        }
        let x1 = rect.right().min(self.size.width);
        let y1 = rect.bottom().min(self.size.height);
        if rect.x >= x1 || rect.y >= y1 {
            return None;
        }
        Some(Rect::new(rect.x, rect.y, x1 - rect.x, y1 - rect.y))
    }

    fn for_each_pixel(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let Some(rect) = self.clip(rect) else {
            return;
        };
        let stride = self.size.width as usize * 4;
        for y in rect.y..rect.bottom() {
            let start = y as usize * stride + rect.x as usize * 4;
            let end = start + rect.w as usize * 4;
            for px in self.frame[start..end].chunks_exact_mut(4) {
                f(px);
            }
        }
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        if let Some(px) = self.frame.get_mut(idx..idx + 4) {
            px.copy_from_slice(&color);
        }
    }
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.for_each_pixel(rect, |px| px.copy_from_slice(&color));
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        match alpha {
            0 => return,
            255 => return self.fill_rect(rect, color),
            _ => {}
        }
        let a = alpha as u32;
        let inv = 255 - a;
        self.for_each_pixel(rect, |px| {
            for c in 0..3 {
                px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
            }
            px[3] = 255;
        });
    }

    fn fill_disc(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        let r = radius as i64;
        let r2 = r * r;
        for dy in -r..=r {
            let y = cy as i64 + dy;
            if y < 0 {
                continue;
            }
            // Widest dx on this row that stays inside the circle.
            let mut half = 0i64;
            while (half + 1) * (half + 1) + dy * dy <= r2 {
                half += 1;
            }
            let x0 = (cx as i64 - half).max(0) as u32;
            let x1 = (cx as i64 + half + 1).max(0) as u32;
            self.fill_rect(Rect::new(x0, y as u32, x1.saturating_sub(x0), 1), color);
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let scale = scale.max(1);
        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y = cursor_y.saturating_add(line_advance_y(scale));
                continue;
            }
            if ch != ' ' {
                let bits = glyph_bits(ch);
                for row in 0..GLYPH_H {
                    for col in 0..GLYPH_W {
                        let bit = (GLYPH_H - 1 - row) * GLYPH_W + (GLYPH_W - 1 - col);
                        if bits & (1 << bit) == 0 {
                            continue;
                        }
                        let px = cursor_x.saturating_add(col * scale);
                        let py = cursor_y.saturating_add(row * scale);
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(px + dx, py + dy, color);
                            }
                        }
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(glyph_advance_x(scale));
            if cursor_x >= self.size.width {
                break;
            }
        }
    }
}

/// 3x5 block glyph, rows top to bottom, three bits per row (MSB is the left column).
fn glyph_bits(ch: char) -> u16 {
    match ch.to_ascii_uppercase() {
        '0' => 0b111_101_101_101_111,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_001_001_001,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        'A' => 0b010_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b111_100_100_100_111,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_111_100_111,
        'F' => 0b111_100_111_100_100,
        'G' => 0b111_100_101_101_111,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b111_001_001_101_010,
        'K' => 0b101_110_100_110_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_111_101_101,
        'N' => 0b101_111_111_111_101,
        'O' => 0b111_101_101_101_111,
        'P' => 0b111_101_111_100_100,
        'Q' => 0b111_101_101_111_001,
        'R' => 0b111_101_111_110_101,
        'S' => 0b111_100_111_001_111,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_111,
        'V' => 0b101_101_101_101_010,
        'W' => 0b101_101_111_111_101,
        'X' => 0b101_101_010_101_101,
        'Y' => 0b101_101_010_010_010,
        'Z' => 0b111_001_010_100_111,
        '.' => 0b000_000_000_000_010,
        ':' => 0b000_010_000_010_000,
        '-' => 0b000_000_111_000_000,
        '/' => 0b001_001_010_100_100,
        '!' => 0b010_010_010_000_010,
        _ => 0b111_001_010_000_010,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [buf[idx], buf[idx + 1], buf[idx + 2], buf[idx + 3]]
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let size = SurfaceSize::new(4, 4);
        let mut buf = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut buf, size);
        gfx.fill_rect(Rect::new(2, 2, 10, 10), [9, 8, 7, 255]);

        assert_eq!(pixel(&buf, 4, 3, 3), [9, 8, 7, 255]);
        assert_eq!(pixel(&buf, 4, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn blend_rect_mixes_half_and_half() {
        let size = SurfaceSize::new(1, 1);
        let mut buf = vec![0, 0, 0, 255];
        let mut gfx = CpuRenderer::new(&mut buf, size);
        gfx.blend_rect(Rect::from_size(1, 1), [255, 255, 255, 255], 128);
        assert_eq!(pixel(&buf, 1, 0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn disc_covers_centre_but_not_corners() {
        let size = SurfaceSize::new(11, 11);
        let mut buf = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut buf, size);
        gfx.fill_disc(5, 5, 4, [1, 2, 3, 255]);

        assert_eq!(pixel(&buf, 11, 5, 5), [1, 2, 3, 255]);
        assert_eq!(pixel(&buf, 11, 5, 1), [1, 2, 3, 255]);
        assert_eq!(pixel(&buf, 11, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn text_draws_inside_bounds() {
        let size = SurfaceSize::new(32, 12);
        let mut buf = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut buf, size);
        gfx.draw_text(0, 0, "1/5", [255, 255, 255, 255]);
        assert!(buf.chunks_exact(4).any(|px| px == [255, 255, 255, 255]));
        assert_eq!(text_width("1/5", 2), 24);
    }
}
