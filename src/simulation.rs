use crate::braille::{BrailleCanvas, Layer};
use crate::progress::Interaction;
use crate::settings::SimulationSettings;
use crate::shape::{heart_points, ShapePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::debug;

/// Vertical drift runs slightly slower than horizontal so stars trace ellipses
const DRIFT_Y_FREQUENCY: f64 = 0.8;

/// A single star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Rest position the idle drift oscillates around
    pub base_x: f32,
    pub base_y: f32,
    /// Radius in virtual pixels
    pub size: f32,
    /// Resting opacity
    pub opacity: f32,
}

/// Connective line between two stars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Currently rendered opacity
    pub opacity: f32,
}

/// Move `current` the given fraction of the remaining distance toward `target`
pub fn ease_toward(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Uniform sample in [lo, hi), tolerating an empty range
fn sample_range(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Star constellation state
pub struct ConstellationSimulation {
    pub width: f32,
    pub height: f32,
    pub settings: SimulationSettings,
    particles: Vec<Particle>,
    edges: Vec<Edge>,
    heart: Vec<ShapePoint>,
    rng: StdRng,
}

impl ConstellationSimulation {
    /// Scatter `settings.particle_count` stars on an annulus around the viewport center
    pub fn new(width: f32, height: f32, settings: SimulationSettings, seed: Option<u64>) -> Self {
        let mut sim = Self::empty(width, height, settings, seed);
        sim.reset();
        sim
    }

    /// Place stars at explicit positions; sizes, opacities and edges are still random
    #[cfg(test)]
    pub fn from_positions(
        width: f32,
        height: f32,
        positions: &[(f32, f32)],
        settings: SimulationSettings,
        seed: Option<u64>,
    ) -> Self {
        let mut sim = Self::empty(width, height, settings, seed);
        let mut particles = Vec::with_capacity(positions.len());
        for &(x, y) in positions {
            particles.push(sim.spawn_at(x, y));
        }
        sim.particles = particles;
        sim.edges = sim.sample_edges();
        sim
    }

    fn empty(width: f32, height: f32, settings: SimulationSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            width,
            height,
            heart: heart_points(settings.heart_points),
            settings,
            particles: Vec::new(),
            edges: Vec::new(),
            rng,
        }
    }

    /// Re-roll the whole constellation with the current settings
    pub fn reset(&mut self) {
        let (cx, cy) = self.center();
        let count = self.settings.particle_count;
        let inner = self.settings.inner_radius;
        let outer = self.settings.outer_radius;

        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let radius = sample_range(&mut self.rng, inner, outer);
            particles.push(self.spawn_at(cx + angle.cos() * radius, cy + angle.sin() * radius));
        }
        self.particles = particles;
        self.edges = self.sample_edges();
        self.heart = heart_points(self.settings.heart_points);

        debug!(
            particles = self.particles.len(),
            edges = self.edges.len(),
            "constellation initialized"
        );
    }

    fn spawn_at(&mut self, x: f32, y: f32) -> Particle {
        let size = sample_range(&mut self.rng, self.settings.min_size, self.settings.max_size);
        let opacity = sample_range(&mut self.rng, self.settings.min_opacity, self.settings.max_opacity);
        Particle {
            x,
            y,
            base_x: x,
            base_y: y,
            size,
            opacity,
        }
    }

    /// Sparse random subset of all unordered pairs
    fn sample_edges(&mut self) -> Vec<Edge> {
        let n = self.particles.len();
        let p = self.settings.edge_probability;
        let mut edges = Vec::new();
        for from in 0..n {
            for to in (from + 1)..n {
                if self.rng.gen::<f32>() < p {
                    edges.push(Edge { from, to, opacity: 0.0 });
                }
            }
        }
        edges
    }

    /// Get the center coordinates of the viewport
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Pixel size of the formed heart
    pub fn shape_scale(&self) -> f32 {
        self.width.min(self.height) * self.settings.shape_scale
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[cfg(test)]
    pub fn heart(&self) -> &[ShapePoint] {
        &self.heart
    }

    /// Where star `i` sits in the formed heart
    pub fn heart_target(&self, i: usize) -> (f32, f32) {
        let (cx, cy) = self.center();
        if self.heart.is_empty() {
            return (cx, cy);
        }
        let point = self.heart[i % self.heart.len()];
        let scale = self.shape_scale();
        (cx + point.x * scale, cy + point.y * scale)
    }

    /// Where star `i` drifts toward at wall-clock `time` (seconds) while idle
    pub fn drift_target(&self, i: usize, time: f64) -> (f32, f32) {
        let p = &self.particles[i];
        let amplitude = self.settings.drift_amplitude;
        let phase = i as f64;
        (
            p.base_x + (time + phase).sin() as f32 * amplitude,
            p.base_y + (time * DRIFT_Y_FREQUENCY + phase).cos() as f32 * amplitude,
        )
    }

    /// Advance one frame
    pub fn update(&mut self, time: f64, interaction: Interaction) {
        let forming = interaction.active && interaction.progress > 0.0;

        for i in 0..self.particles.len() {
            let ((tx, ty), rate) = if forming {
                (self.heart_target(i), self.settings.form_ease * interaction.progress)
            } else {
                (self.drift_target(i, time), self.settings.idle_ease)
            };
            let p = &mut self.particles[i];
            p.x = ease_toward(p.x, tx, rate);
            p.y = ease_toward(p.y, ty, rate);
        }

        let edge_target = if interaction.active {
            self.settings.edge_max_opacity * interaction.progress
        } else {
            0.0
        };
        let edge_ease = self.settings.edge_ease;
        for edge in &mut self.edges {
            edge.opacity = ease_toward(edge.opacity, edge_target, edge_ease);
        }
    }

    /// Draw the current frame: edges first, then stars and their glow
    pub fn render(&self, canvas: &mut BrailleCanvas, interaction: Interaction) {
        canvas.clear();

        for edge in &self.edges {
            if edge.opacity > self.settings.edge_visible_threshold {
                let a = &self.particles[edge.from];
                let b = &self.particles[edge.to];
                canvas.line(a.x, a.y, b.x, b.y, edge.opacity);
            }
        }

        for p in &self.particles {
            let alpha = if interaction.active {
                self.settings.highlight_opacity
            } else {
                p.opacity
            };
            canvas.fill_circle(p.x, p.y, p.size, alpha);

            if interaction.active {
                canvas.radial_glow(
                    Layer::Star,
                    p.x,
                    p.y,
                    p.size * self.settings.glow_radius_factor,
                    self.settings.glow_opacity * interaction.progress,
                );
            }
        }
    }

    /// Follow a viewport resize: keep the constellation centered and rescale the heart
    pub fn resize(&mut self, width: f32, height: f32) {
        if width == self.width && height == self.height {
            return;
        }
        let (old_cx, old_cy) = self.center();
        self.width = width;
        self.height = height;
        let (cx, cy) = self.center();
        let (dx, dy) = (cx - old_cx, cy - old_cy);

        for p in &mut self.particles {
            p.x += dx;
            p.y += dy;
            p.base_x += dx;
            p.base_y += dy;
        }
        self.heart = heart_points(self.settings.heart_points);
        debug!(width, height, "viewport resized");
    }
}
