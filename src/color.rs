use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Number of alpha levels in a precomputed lookup table
const LUT_SIZE: usize = 256;

/// Star color palette. Hue and saturation are fixed per palette; only the
/// alpha (and therefore the apparent lightness) animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    #[default]
    RoseGold,
    SoftPink,
    Champagne,
    SoftPurple,
    SoftBlue,
}

impl Palette {
    pub fn name(&self) -> &str {
        match self {
            Palette::RoseGold => "Rose Gold",
            Palette::SoftPink => "Soft Pink",
            Palette::Champagne => "Champagne",
            Palette::SoftPurple => "Soft Purple",
            Palette::SoftBlue => "Soft Blue",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Palette::RoseGold => Palette::SoftPink,
            Palette::SoftPink => Palette::Champagne,
            Palette::Champagne => Palette::SoftPurple,
            Palette::SoftPurple => Palette::SoftBlue,
            Palette::SoftBlue => Palette::RoseGold,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Palette::RoseGold => Palette::SoftBlue,
            Palette::SoftPink => Palette::RoseGold,
            Palette::Champagne => Palette::SoftPink,
            Palette::SoftPurple => Palette::Champagne,
            Palette::SoftBlue => Palette::SoftPurple,
        }
    }

    /// Parse a palette name from the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rose" | "rose-gold" | "rosegold" | "gold" => Some(Palette::RoseGold),
            "pink" | "soft-pink" => Some(Palette::SoftPink),
            "champagne" => Some(Palette::Champagne),
            "purple" | "soft-purple" => Some(Palette::SoftPurple),
            "blue" | "soft-blue" => Some(Palette::SoftBlue),
            _ => None,
        }
    }

    /// (hue degrees, saturation %, lightness %)
    pub fn hsl(&self) -> (f32, f32, f32) {
        match self {
            Palette::RoseGold => (15.0, 45.0, 70.0),
            Palette::SoftPink => (350.0, 40.0, 65.0),
            Palette::Champagne => (30.0, 30.0, 75.0),
            Palette::SoftPurple => (280.0, 30.0, 60.0),
            Palette::SoftBlue => (200.0, 40.0, 70.0),
        }
    }

    /// Palette used for the cursor glow: the next color along, like the
    /// pink inner glow sitting on the rose gold page
    pub fn accent(&self) -> Self {
        self.next()
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let (h, s, l) = self.hsl();
        hsl_to_rgb(h, s, l)
    }

    /// Precompute the palette color composited over black at every alpha level
    pub fn build_lut(&self) -> ColorLut {
        let (r, g, b) = self.rgb();
        let mut colors = [Color::Black; LUT_SIZE];
        for (i, slot) in colors.iter_mut().enumerate() {
            let alpha = i as f32 / (LUT_SIZE - 1) as f32;
            *slot = Color::Rgb(scale(r, alpha), scale(g, alpha), scale(b, alpha));
        }
        ColorLut { colors }
    }
}

/// Alpha-indexed color lookup table for one palette
#[derive(Clone)]
pub struct ColorLut {
    colors: [Color; LUT_SIZE],
}

/// Look up the color for an alpha in [0, 1]
pub fn map_from_lut(lut: &ColorLut, alpha: f32) -> Color {
    let idx = (alpha.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize;
    lut.colors[idx]
}

fn scale(channel: u8, alpha: f32) -> u8 {
    (channel as f32 * alpha).round().clamp(0.0, 255.0) as u8
}

/// Convert HSL (degrees, percent, percent) to 8-bit RGB
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r1), to_u8(g1), to_u8(b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(color: Color) -> u32 {
        match color {
            Color::Rgb(r, g, b) => r as u32 + g as u32 + b as u32,
            _ => panic!("expected rgb color"),
        }
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), (0, 0, 255));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 100.0), (255, 255, 255));
    }

    #[test]
    fn test_rose_gold_is_warm() {
        let (r, g, b) = Palette::RoseGold.rgb();
        assert!(r > g && g > b);
    }

    #[test]
    fn test_lut_brightness_monotone_in_alpha() {
        let lut = Palette::SoftBlue.build_lut();
        let mut last = 0;
        for i in 0..=20 {
            let b = brightness(map_from_lut(&lut, i as f32 / 20.0));
            assert!(b >= last);
            last = b;
        }
        assert_eq!(brightness(map_from_lut(&lut, 0.0)), 0);
    }

    #[test]
    fn test_lut_clamps_out_of_range() {
        let lut = Palette::RoseGold.build_lut();
        assert_eq!(map_from_lut(&lut, 2.0), map_from_lut(&lut, 1.0));
        assert_eq!(map_from_lut(&lut, -1.0), map_from_lut(&lut, 0.0));
    }

    #[test]
    fn test_palette_cycle() {
        let mut p = Palette::default();
        for _ in 0..5 {
            assert_eq!(p.next().prev(), p);
            p = p.next();
        }
        assert_eq!(p, Palette::default());
    }

    #[test]
    fn test_palette_parse() {
        assert_eq!(Palette::parse("Pink"), Some(Palette::SoftPink));
        assert_eq!(Palette::parse("rose-gold"), Some(Palette::RoseGold));
        assert_eq!(Palette::parse("plaid"), None);
    }
}
