use crate::braille::{BrailleCanvas, Layer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Drift amplitude in virtual pixels
const DRIFT: f32 = 6.0;
const DRIFT_X_SPEED: f64 = 0.3;
const DRIFT_Y_SPEED: f64 = 0.2;
/// Per-mote phase offsets so the field doesn't move in lockstep
const PHASE_X: f64 = 0.01;
const PHASE_Y: f64 = 0.02;
/// Motes closer than this to the pointer are pushed away
const POINTER_RADIUS: f32 = 90.0;
/// Push distance for a mote right under the pointer
const POINTER_PUSH: f32 = 15.0;
const MIN_ALPHA: f32 = 0.08;
const MAX_ALPHA: f32 = 0.3;

/// A dim background point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mote {
    /// Rest position as a fraction of the viewport
    pub u: f32,
    pub v: f32,
    /// Current displacement from rest, in virtual pixels
    pub offset_x: f32,
    pub offset_y: f32,
    pub alpha: f32,
}

impl Mote {
    pub fn position(&self, width: f32, height: f32) -> (f32, f32) {
        (self.u * width + self.offset_x, self.v * height + self.offset_y)
    }
}

/// Field of faint drifting motes behind the constellation that shy away from the pointer
pub struct Nebula {
    motes: Vec<Mote>,
}

impl Nebula {
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let motes = (0..count)
            .map(|_| Mote {
                u: rng.gen_range(0.0..1.0),
                v: rng.gen_range(0.0..1.0),
                offset_x: 0.0,
                offset_y: 0.0,
                alpha: rng.gen_range(MIN_ALPHA..MAX_ALPHA),
            })
            .collect();
        Self { motes }
    }

    #[cfg(test)]
    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    /// Recompute every displacement for wall-clock `time` (seconds)
    pub fn update(&mut self, time: f64, width: f32, height: f32, pointer: Option<(f32, f32)>) {
        for (i, mote) in self.motes.iter_mut().enumerate() {
            let phase = i as f64;
            let mut offset_x = (time * DRIFT_X_SPEED + phase * PHASE_X).sin() as f32 * DRIFT;
            let mut offset_y = (time * DRIFT_Y_SPEED + phase * PHASE_Y).cos() as f32 * DRIFT;

            if let Some((px, py)) = pointer {
                let dx = px - (mote.u * width + offset_x);
                let dy = py - (mote.v * height + offset_y);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 && dist < POINTER_RADIUS {
                    let force = (1.0 - dist / POINTER_RADIUS) * POINTER_PUSH;
                    offset_x -= dx / dist * force;
                    offset_y -= dy / dist * force;
                }
            }

            mote.offset_x = offset_x;
            mote.offset_y = offset_y;
        }
    }

    pub fn render(&self, canvas: &mut BrailleCanvas, width: f32, height: f32) {
        for mote in &self.motes {
            let (x, y) = mote.position(width, height);
            canvas.plot(Layer::Accent, x, y, mote.alpha);
        }
    }
}
