use crate::color::{map_from_lut, ColorLut};
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Dots fainter than this stay dark
const DOT_THRESHOLD: f32 = 0.05;

/// Which color a stroke is painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Stars, edges and their glow
    Star,
    /// Cursor glow, shown only where no star light dominates
    Accent,
}

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Alpha raster at braille-dot resolution. Drawing calls take coordinates in
/// virtual pixels; `pixels_per_dot` converts them to dots.
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    pixels_per_dot: f32,
    star: Vec<f32>,
    accent: Vec<f32>,
}

impl BrailleCanvas {
    /// Canvas covering `cols` x `rows` terminal cells
    pub fn new(cols: u16, rows: u16, pixels_per_dot: f32) -> Self {
        let width = cols as usize * 2;
        let height = rows as usize * 4;
        Self {
            width,
            height,
            pixels_per_dot,
            star: vec![0.0; width * height],
            accent: vec![0.0; width * height],
        }
    }

    /// Dot resolution (width, height)
    #[cfg(test)]
    pub fn dots(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels_per_dot(&self) -> f32 {
        self.pixels_per_dot
    }

    pub fn clear(&mut self) {
        self.star.fill(0.0);
        self.accent.fill(0.0);
    }

    /// Composite `alpha` over the dot (same hue, so only coverage accumulates)
    fn blend(&mut self, layer: Layer, dx: isize, dy: isize, alpha: f32) {
        if dx < 0 || dy < 0 || dx as usize >= self.width || dy as usize >= self.height || alpha <= 0.0 {
            return;
        }
        let idx = dy as usize * self.width + dx as usize;
        let buf = match layer {
            Layer::Star => &mut self.star,
            Layer::Accent => &mut self.accent,
        };
        let a = alpha.min(1.0);
        buf[idx] = buf[idx] + a * (1.0 - buf[idx]);
    }

    fn to_dot(&self, px: f32) -> f32 {
        px / self.pixels_per_dot
    }

    /// Straight line between two pixel positions
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, alpha: f32) {
        let (dx0, dy0) = (self.to_dot(x0), self.to_dot(y0));
        let (dx1, dy1) = (self.to_dot(x1), self.to_dot(y1));
        let steps = (dx1 - dx0).abs().max((dy1 - dy0).abs()).ceil().max(1.0) as usize;

        let mut last = None;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = (dx0 + (dx1 - dx0) * t).floor() as isize;
            let y = (dy0 + (dy1 - dy0) * t).floor() as isize;
            // Rounding can land two samples on one dot; don't double its alpha
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            self.blend(Layer::Star, x, y, alpha);
        }
    }

    /// Light the single dot under a pixel position
    pub fn plot(&mut self, layer: Layer, x: f32, y: f32, alpha: f32) {
        let (dx, dy) = (self.to_dot(x).floor() as isize, self.to_dot(y).floor() as isize);
        self.blend(layer, dx, dy, alpha);
    }

    /// Solid disc of pixel radius `radius`; the dot under the center is always lit
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, alpha: f32) {
        let (dcx, dcy) = (self.to_dot(cx), self.to_dot(cy));
        let r = self.to_dot(radius);
        let center = (dcx.floor() as isize, dcy.floor() as isize);

        self.for_each_dot_within(dcx, dcy, r, |canvas, x, y, _| {
            if (x, y) != center {
                canvas.blend(Layer::Star, x, y, alpha);
            }
        });
        self.blend(Layer::Star, center.0, center.1, alpha);
    }

    /// Radial gradient from `alpha` at the center to transparent at `radius`
    pub fn radial_glow(&mut self, layer: Layer, cx: f32, cy: f32, radius: f32, alpha: f32) {
        let (dcx, dcy) = (self.to_dot(cx), self.to_dot(cy));
        let r = self.to_dot(radius);
        if r <= 0.0 {
            return;
        }
        self.for_each_dot_within(dcx, dcy, r, |canvas, x, y, dist| {
            canvas.blend(layer, x, y, alpha * (1.0 - dist / r));
        });
    }

    /// Visit every dot whose center lies within `r` dots of (cx, cy)
    fn for_each_dot_within<F>(&mut self, cx: f32, cy: f32, r: f32, mut f: F)
    where
        F: FnMut(&mut Self, isize, isize, f32),
    {
        let min_x = (cx - r).floor().max(0.0) as isize;
        let max_x = ((cx + r).ceil() as isize).min(self.width as isize - 1);
        let min_y = (cy - r).floor().max(0.0) as isize;
        let max_y = ((cy + r).ceil() as isize).min(self.height as isize - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let ddx = x as f32 + 0.5 - cx;
                let ddy = y as f32 + 0.5 - cy;
                let dist = (ddx * ddx + ddy * ddy).sqrt();
                if dist <= r {
                    f(self, x, y, dist);
                }
            }
        }
    }

    /// Alpha at a dot, for the given layer
    pub fn alpha_at(&self, layer: Layer, dx: usize, dy: usize) -> f32 {
        if dx >= self.width || dy >= self.height {
            return 0.0;
        }
        let idx = dy * self.width + dx;
        match layer {
            Layer::Star => self.star[idx],
            Layer::Accent => self.accent[idx],
        }
    }

    /// Collapse the raster into Braille characters (uses LUTs for fast color lookup)
    pub fn to_cells(&self, star_lut: &ColorLut, accent_lut: &ColorLut) -> Vec<BrailleCell> {
        let cols = self.width / 2;
        let rows = self.height / 4;
        let mut cells = Vec::new();

        for cy in 0..rows {
            for cx in 0..cols {
                let mut pattern: u8 = 0;
                let mut star_peak: f32 = 0.0;
                let mut accent_peak: f32 = 0.0;

                for dx in 0..2 {
                    for dy in 0..4 {
                        let x = cx * 2 + dx;
                        let y = cy * 4 + dy;
                        let star = self.alpha_at(Layer::Star, x, y);
                        let accent = self.alpha_at(Layer::Accent, x, y);
                        if star.max(accent) >= DOT_THRESHOLD {
                            pattern |= BRAILLE_DOTS[dx][dy];
                        }
                        star_peak = star_peak.max(star);
                        accent_peak = accent_peak.max(accent);
                    }
                }

                // Only emit cells that have at least one dot
                if pattern != 0 {
                    let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                    let color = if star_peak >= accent_peak {
                        map_from_lut(star_lut, star_peak)
                    } else {
                        map_from_lut(accent_lut, accent_peak)
                    };
                    cells.push(BrailleCell {
                        x: cx as u16,
                        y: cy as u16,
                        char: braille_char,
                        color,
                    });
                }
            }
        }

        cells
    }
}

/// Virtual-pixel viewport covered by a canvas of `cols` x `rows` cells
pub fn calculate_viewport_size(cols: u16, rows: u16, pixels_per_dot: f32) -> (f32, f32) {
    (
        cols as f32 * 2.0 * pixels_per_dot,
        rows as f32 * 4.0 * pixels_per_dot,
    )
}

/// Pixels per dot at which a square `extent` virtual pixels wide fits inside a
/// canvas of `cols` x `rows` cells, never finer than `min_pixels_per_dot`
pub fn fit_pixels_per_dot(cols: u16, rows: u16, min_pixels_per_dot: f32, extent: f32) -> f32 {
    let dots = (cols as f32 * 2.0).min(rows as f32 * 4.0);
    if dots <= 0.0 || !extent.is_finite() {
        return min_pixels_per_dot;
    }
    (extent / dots).max(min_pixels_per_dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;

    fn luts() -> (ColorLut, ColorLut) {
        (Palette::RoseGold.build_lut(), Palette::SoftPink.build_lut())
    }

    #[test]
    fn test_braille_pattern() {
        // Test that single dot patterns work correctly
        assert_eq!(BRAILLE_DOTS[0][0], 0x01); // Top-left
        assert_eq!(BRAILLE_DOTS[1][0], 0x08); // Top-right
        assert_eq!(BRAILLE_DOTS[0][3], 0x40); // Bottom-left
        assert_eq!(BRAILLE_DOTS[1][3], 0x80); // Bottom-right

        // All dots should give 0xFF
        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_empty_canvas_has_no_cells() {
        let canvas = BrailleCanvas::new(10, 5, 1.0);
        let (star, accent) = luts();
        assert!(canvas.to_cells(&star, &accent).is_empty());
    }

    #[test]
    fn test_single_dot_maps_to_bit() {
        let mut canvas = BrailleCanvas::new(2, 2, 1.0);
        // Pixel (3.5, 6.5) is dot (3, 6): cell (1, 1), column 1, row 2
        canvas.fill_circle(3.5, 6.5, 0.1, 1.0);
        let (star, accent) = luts();
        let cells = canvas.to_cells(&star, &accent);
        assert_eq!(cells.len(), 1);
        assert_eq!((cells[0].x, cells[0].y), (1, 1));
        assert_eq!(cells[0].char, char::from_u32(BRAILLE_BASE + 0x20).unwrap());
    }

    #[test]
    fn test_horizontal_line_lights_row() {
        let mut canvas = BrailleCanvas::new(4, 1, 1.0);
        canvas.line(0.5, 0.5, 7.5, 0.5, 1.0);
        for x in 0..8 {
            assert!(canvas.alpha_at(Layer::Star, x, 0) > 0.99);
            assert_eq!(canvas.alpha_at(Layer::Star, x, 1), 0.0);
        }
    }

    #[test]
    fn test_line_alpha_not_doubled() {
        let mut canvas = BrailleCanvas::new(4, 4, 1.0);
        canvas.line(1.5, 1.5, 1.6, 1.6, 0.4);
        assert!((canvas.alpha_at(Layer::Star, 1, 1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_drawing_out_of_bounds_is_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2, 1.0);
        canvas.fill_circle(-50.0, -50.0, 3.0, 1.0);
        canvas.line(-10.0, 100.0, 100.0, 100.0, 1.0);
        canvas.radial_glow(Layer::Star, 500.0, 500.0, 10.0, 1.0);
        let (star, accent) = luts();
        assert!(canvas.to_cells(&star, &accent).is_empty());
    }

    #[test]
    fn test_radial_glow_fades_outward() {
        let mut canvas = BrailleCanvas::new(10, 5, 1.0);
        canvas.radial_glow(Layer::Star, 10.0, 10.0, 6.0, 0.6);
        let center = canvas.alpha_at(Layer::Star, 9, 9);
        let mid = canvas.alpha_at(Layer::Star, 12, 9);
        let edge = canvas.alpha_at(Layer::Star, 17, 9);
        assert!(center > mid);
        assert!(mid > 0.0);
        assert_eq!(edge, 0.0);
    }

    #[test]
    fn test_blending_saturates_below_one() {
        let mut canvas = BrailleCanvas::new(1, 1, 1.0);
        for _ in 0..10 {
            canvas.fill_circle(0.5, 0.5, 0.1, 0.5);
        }
        let a = canvas.alpha_at(Layer::Star, 0, 0);
        assert!(a > 0.99 && a <= 1.0);
    }

    #[test]
    fn test_star_wins_color_over_accent() {
        let mut canvas = BrailleCanvas::new(1, 1, 1.0);
        canvas.radial_glow(Layer::Accent, 1.0, 2.0, 4.0, 0.2);
        canvas.fill_circle(0.5, 0.5, 0.1, 0.8);
        let (star, accent) = luts();
        let cells = canvas.to_cells(&star, &accent);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].color, map_from_lut(&star, canvas.alpha_at(Layer::Star, 0, 0)));
    }

    #[test]
    fn test_clear_resets_both_layers() {
        let mut canvas = BrailleCanvas::new(2, 2, 1.0);
        canvas.fill_circle(1.0, 1.0, 2.0, 1.0);
        canvas.radial_glow(Layer::Accent, 1.0, 1.0, 3.0, 1.0);
        canvas.clear();
        let (star, accent) = luts();
        assert!(canvas.to_cells(&star, &accent).is_empty());
    }

    #[test]
    fn test_viewport_size_scales_with_dots() {
        assert_eq!(calculate_viewport_size(50, 25, 3.0), (300.0, 300.0));
        assert_eq!(calculate_viewport_size(0, 25, 3.0), (0.0, 300.0));
    }

    #[test]
    fn test_fit_pixels_per_dot() {
        // 56x22 cells -> 88 dots tall limits a 610 px sky
        let ppd = fit_pixels_per_dot(56, 22, 3.0, 610.0);
        assert!((ppd * 88.0 - 610.0).abs() < 1e-3);
        let (w, h) = calculate_viewport_size(56, 22, ppd);
        assert!(w.min(h) >= 610.0 - 1e-3);

        // Big canvases keep the configured density
        assert_eq!(fit_pixels_per_dot(300, 100, 3.0, 610.0), 3.0);
        assert_eq!(fit_pixels_per_dot(0, 10, 3.0, 610.0), 3.0);
    }

    #[test]
    fn test_plot_lights_one_dot() {
        let mut canvas = BrailleCanvas::new(2, 2, 2.0);
        canvas.plot(Layer::Accent, 5.0, 3.0, 0.3);
        assert!((canvas.alpha_at(Layer::Accent, 2, 1) - 0.3).abs() < 1e-6);
        assert_eq!(canvas.alpha_at(Layer::Star, 2, 1), 0.0);
        canvas.plot(Layer::Accent, -1.0, 3.0, 0.3);
        canvas.plot(Layer::Accent, 100.0, 3.0, 0.3);
    }
}
