use crate::braille::{BrailleCanvas, Layer};
use crate::simulation::ease_toward;

/// Fraction of the remaining distance the glow covers per frame
const FOLLOW_RATE: f32 = 0.1;
/// Opacity change per frame; fades fully in about 0.3s at 60Hz
const FADE_STEP: f32 = 1.0 / 18.0;
/// Peak alpha at the glow center
const PEAK_ALPHA: f32 = 0.12;
/// Glow radius in virtual pixels
const GLOW_RADIUS: f32 = 60.0;

/// Soft glow trailing the pointer across the canvas
#[derive(Debug, Clone, Default)]
pub struct CursorGlow {
    /// Where the pointer is, in virtual pixels; `None` while outside the canvas
    pointer: Option<(f32, f32)>,
    /// Eased glow position
    x: f32,
    y: f32,
    visibility: f32,
}

impl CursorGlow {
    /// Pointer moved to a position inside the canvas
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.pointer.is_none() && self.visibility <= 0.0 {
            // Appear at the pointer instead of sliding in from the last spot
            self.x = x;
            self.y = y;
        }
        self.pointer = Some((x, y));
    }

    /// Pointer left the canvas
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Raw pointer position, if it is over the canvas
    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    #[cfg(test)]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    #[cfg(test)]
    pub fn visibility(&self) -> f32 {
        self.visibility
    }

    /// Advance one frame
    pub fn update(&mut self) {
        match self.pointer {
            Some((px, py)) => {
                self.x = ease_toward(self.x, px, FOLLOW_RATE);
                self.y = ease_toward(self.y, py, FOLLOW_RATE);
                self.visibility = (self.visibility + FADE_STEP).min(1.0);
            }
            None => {
                self.visibility = (self.visibility - FADE_STEP).max(0.0);
            }
        }
    }

    pub fn render(&self, canvas: &mut BrailleCanvas) {
        if self.visibility > 0.0 {
            canvas.radial_glow(Layer::Accent, self.x, self.y, GLOW_RADIUS, PEAK_ALPHA * self.visibility);
        }
    }
}
