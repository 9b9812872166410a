use serde::{Deserialize, Serialize};

pub const MIN_PARTICLES: usize = 5;
pub const MAX_PARTICLES: usize = 100;
pub const MAX_DRIFT: f32 = 20.0;
pub const MAX_NEBULA: usize = 1000;

/// All simulation settings consolidated into one struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    // === Layout Parameters ===
    /// Number of stars in the constellation (5-100)
    pub particle_count: usize,
    /// Chance that any pair of stars gets a connecting edge (0.0-1.0)
    pub edge_probability: f32,
    /// Inner radius of the spawn annulus, in virtual pixels
    pub inner_radius: f32,
    /// Outer radius of the spawn annulus, in virtual pixels
    pub outer_radius: f32,
    /// Star radius range
    pub min_size: f32,
    pub max_size: f32,
    /// Resting opacity range
    pub min_opacity: f32,
    pub max_opacity: f32,

    // === Motion Parameters ===
    /// Amplitude of the idle sinusoidal drift (0-20)
    pub drift_amplitude: f32,
    /// Fraction of remaining distance covered per frame while idle
    pub idle_ease: f32,
    /// Fraction of remaining distance covered per frame while forming, scaled by progress
    pub form_ease: f32,

    // === Shape Parameters ===
    /// Number of points sampled from the heart curve
    pub heart_points: usize,
    /// Heart size as a fraction of the smaller viewport side
    pub shape_scale: f32,

    // === Interaction Ramp ===
    /// Progress gained per ramp interval while forming
    pub rise_step: f32,
    /// Progress lost per ramp interval while dissolving
    pub fall_step: f32,
    /// Ramp timer interval in milliseconds
    pub ramp_interval_ms: u64,

    // === Visual Parameters ===
    /// Peak edge opacity at full progress
    pub edge_max_opacity: f32,
    /// Fraction of the way edge opacity moves toward its target per frame
    pub edge_ease: f32,
    /// Edges at or below this opacity are not drawn
    pub edge_visible_threshold: f32,
    /// Star opacity while the interaction is active
    pub highlight_opacity: f32,
    /// Glow radius as a multiple of star size
    pub glow_radius_factor: f32,
    /// Glow center opacity at full progress
    pub glow_opacity: f32,
    /// Minimum virtual pixels per braille dot; small canvases zoom out further
    pub pixels_per_dot: f32,

    // === Background ===
    /// Number of dim background motes (0 disables the nebula)
    pub nebula_count: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            // Layout
            particle_count: 25,
            edge_probability: 0.15,
            inner_radius: 100.0,
            outer_radius: 300.0,
            min_size: 2.0,
            max_size: 5.0,
            min_opacity: 0.3,
            max_opacity: 0.7,

            // Motion
            drift_amplitude: 5.0,
            idle_ease: 0.03,
            form_ease: 0.05,

            // Shape
            heart_points: 20,
            shape_scale: 0.35,

            // Ramp - roughly one second to form at 60Hz
            rise_step: 0.02,
            fall_step: 0.03,
            ramp_interval_ms: 16,

            // Visual
            edge_max_opacity: 0.4,
            edge_ease: 0.05,
            edge_visible_threshold: 0.01,
            highlight_opacity: 0.8,
            glow_radius_factor: 3.0,
            glow_opacity: 0.3,
            pixels_per_dot: 3.0,

            // Background
            nebula_count: 240,
        }
    }
}

impl SimulationSettings {
    /// Adjust star count within bounds
    pub fn adjust_particle_count(&mut self, delta: i32) {
        let new_val = (self.particle_count as i32 + delta).clamp(MIN_PARTICLES as i32, MAX_PARTICLES as i32);
        self.particle_count = new_val as usize;
    }

    /// Adjust edge probability within bounds
    pub fn adjust_edge_probability(&mut self, delta: f32) {
        self.edge_probability = (self.edge_probability + delta).clamp(0.0, 1.0);
    }

    /// Adjust drift amplitude within bounds
    pub fn adjust_drift_amplitude(&mut self, delta: f32) {
        self.drift_amplitude = (self.drift_amplitude + delta).clamp(0.0, MAX_DRIFT);
    }

    /// Diameter of the idle sky: the spawn ring plus the furthest drift
    pub fn sky_extent(&self) -> f32 {
        2.0 * (self.outer_radius + self.drift_amplitude)
    }

    /// Bring every field back into a usable range (used after loading a config file)
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        self.particle_count = self.particle_count.min(MAX_PARTICLES);
        self.edge_probability = self.edge_probability.clamp(0.0, 1.0);
        if !(self.inner_radius >= 0.0) {
            self.inner_radius = defaults.inner_radius;
        }
        if !(self.outer_radius >= self.inner_radius) {
            self.outer_radius = self.inner_radius;
        }
        if !(self.min_size > 0.0) {
            self.min_size = defaults.min_size;
        }
        if !(self.max_size >= self.min_size) {
            self.max_size = self.min_size;
        }
        self.min_opacity = self.min_opacity.clamp(0.0, 1.0);
        self.max_opacity = self.max_opacity.clamp(self.min_opacity, 1.0);
        self.drift_amplitude = self.drift_amplitude.clamp(0.0, MAX_DRIFT);
        self.idle_ease = self.idle_ease.clamp(0.0, 1.0);
        self.form_ease = self.form_ease.clamp(0.0, 1.0);
        self.heart_points = self.heart_points.max(1);
        self.shape_scale = self.shape_scale.clamp(0.0, 1.0);
        if !(self.rise_step > 0.0) {
            self.rise_step = defaults.rise_step;
        }
        if !(self.fall_step > 0.0) {
            self.fall_step = defaults.fall_step;
        }
        self.ramp_interval_ms = self.ramp_interval_ms.max(1);
        self.edge_max_opacity = self.edge_max_opacity.clamp(0.0, 1.0);
        self.edge_ease = self.edge_ease.clamp(0.0, 1.0);
        self.highlight_opacity = self.highlight_opacity.clamp(0.0, 1.0);
        self.glow_opacity = self.glow_opacity.clamp(0.0, 1.0);
        if !(self.glow_radius_factor >= 0.0) {
            self.glow_radius_factor = defaults.glow_radius_factor;
        }
        if !(self.pixels_per_dot > 0.0) {
            self.pixels_per_dot = defaults.pixels_per_dot;
        }
        self.nebula_count = self.nebula_count.min(MAX_NEBULA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_particle_count_clamps() {
        let mut settings = SimulationSettings::default();
        settings.adjust_particle_count(1000);
        assert_eq!(settings.particle_count, MAX_PARTICLES);
        settings.adjust_particle_count(-1000);
        assert_eq!(settings.particle_count, MIN_PARTICLES);
    }

    #[test]
    fn test_adjust_edge_probability_clamps() {
        let mut settings = SimulationSettings::default();
        settings.adjust_edge_probability(5.0);
        assert_eq!(settings.edge_probability, 1.0);
        settings.adjust_edge_probability(-5.0);
        assert_eq!(settings.edge_probability, 0.0);
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let mut settings = SimulationSettings {
            edge_probability: 3.0,
            outer_radius: 10.0,
            inner_radius: 50.0,
            pixels_per_dot: 0.0,
            rise_step: f32::NAN,
            ramp_interval_ms: 0,
            nebula_count: 50_000,
            ..SimulationSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.nebula_count, MAX_NEBULA);
        assert_eq!(settings.edge_probability, 1.0);
        assert_eq!(settings.outer_radius, 50.0);
        assert_eq!(settings.pixels_per_dot, 3.0);
        assert_eq!(settings.rise_step, 0.02);
        assert_eq!(settings.ramp_interval_ms, 1);
    }

    #[test]
    fn test_sanitize_keeps_defaults_intact() {
        let mut settings = SimulationSettings::default();
        settings.sanitize();
        assert_eq!(settings, SimulationSettings::default());
    }

    #[test]
    fn test_sky_extent_covers_ring_and_drift() {
        let mut settings = SimulationSettings::default();
        assert_eq!(settings.sky_extent(), 610.0);
        settings.adjust_drift_amplitude(5.0);
        assert_eq!(settings.sky_extent(), 620.0);
    }
}
