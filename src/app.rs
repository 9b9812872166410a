use crate::braille::{self, BrailleCanvas, BrailleCell};
use crate::color::{ColorLut, Palette};
use crate::config::AppConfig;
use crate::cursor::CursorGlow;
use crate::nebula::Nebula;
use crate::progress::{Phase, ProgressController};
use crate::settings::SimulationSettings;
use crate::simulation::ConstellationSimulation;
use crate::ui;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Heart hint shows once the shape is mostly formed
const HINT_THRESHOLD: f32 = 0.8;

/// Focus state for parameter editing in the sidebar
/// Alphabetically ordered for consistent UI display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Drift,
    Edges,
    Palette,
    Particles,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in alphabetical order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Drift,
            Focus::Drift => Focus::Edges,
            Focus::Edges => Focus::Palette,
            Focus::Palette => Focus::Particles,
            Focus::Particles => Focus::Drift,
        }
    }

    /// Shift+Tab cycles through parameters in reverse alphabetical order
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Particles,
            Focus::Drift => Focus::Particles, // Loop back
            Focus::Edges => Focus::Drift,
            Focus::Palette => Focus::Edges,
            Focus::Particles => Focus::Palette,
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Drift => 0,
            Focus::Edges => 1,
            Focus::Palette => 2,
            Focus::Particles => 3,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state
pub struct App {
    /// `None` while the canvas has no drawable area
    pub simulation: Option<ConstellationSimulation>,
    /// Template for creating and re-rolling the simulation
    pub settings: SimulationSettings,
    pub seed: Option<u64>,
    pub progress: ProgressController,
    pub cursor: CursorGlow,
    pub nebula: Nebula,
    pub canvas: BrailleCanvas,
    /// Inner canvas rectangle in terminal cells
    pub canvas_area: Rect,
    pub palette: Palette,
    pub star_lut: ColorLut,
    pub accent_lut: ColorLut,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub paused: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    pub config_path: Option<PathBuf>,
    pub status_message: Option<String>,
    hovering: bool,
    pressed: bool,
    latched: bool,
    started: Instant,
    last_tick: Instant,
}

impl App {
    pub fn new(canvas_area: Rect, config: AppConfig) -> Self {
        let settings = config.settings;
        let now = Instant::now();
        let mut app = Self {
            simulation: None,
            progress: ProgressController::new(
                settings.rise_step,
                settings.fall_step,
                Duration::from_millis(settings.ramp_interval_ms),
            ),
            cursor: CursorGlow::default(),
            nebula: Nebula::new(settings.nebula_count, config.seed.map(|s| s.wrapping_add(1))),
            canvas: BrailleCanvas::new(0, 0, settings.pixels_per_dot),
            canvas_area: Rect::default(),
            star_lut: config.palette.build_lut(),
            accent_lut: config.palette.accent().build_lut(),
            palette: config.palette,
            seed: config.seed,
            settings,
            focus: Focus::Controls,
            fullscreen_mode: false,
            paused: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            config_path: None,
            status_message: None,
            hovering: false,
            pressed: false,
            latched: false,
            started: now,
            last_tick: now,
        };
        app.resize(canvas_area);
        app
    }

    /// Snapshot of everything a config file stores
    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings: self.settings.clone(),
            palette: self.palette,
            seed: self.seed,
            ..AppConfig::default()
        }
    }

    /// Run one frame using wall-clock time
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        let time = now.duration_since(self.started).as_secs_f64();
        self.tick_with(elapsed, time);
    }

    /// Run one frame: advance the ramp, step the stars, redraw the canvas
    pub fn tick_with(&mut self, elapsed: Duration, time: f64) {
        if self.paused {
            return;
        }
        // No surface, no work; the next resize brings it back
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };

        self.progress.advance(elapsed);
        simulation.update(time, self.progress.interaction());
        self.cursor.update();
        self.nebula
            .update(time, simulation.width, simulation.height, self.cursor.pointer());

        self.redraw();
    }

    /// Paint the current state without advancing it
    fn redraw(&mut self) {
        let Some(simulation) = self.simulation.as_ref() else {
            return;
        };
        simulation.render(&mut self.canvas, self.progress.interaction());
        self.nebula.render(&mut self.canvas, simulation.width, simulation.height);
        self.cursor.render(&mut self.canvas);
    }

    /// Current canvas contents as Braille cells
    pub fn cells(&self) -> Vec<BrailleCell> {
        self.canvas.to_cells(&self.star_lut, &self.accent_lut)
    }

    pub fn phase(&self) -> Phase {
        self.progress.phase()
    }

    /// Label for the interactive button
    pub fn button_label(&self) -> &str {
        if self.progress.phase() == Phase::Forming {
            "Keep holding..."
        } else {
            "Hover here"
        }
    }

    pub fn show_heart_hint(&self) -> bool {
        self.progress.progress() > HINT_THRESHOLD
    }

    /// Follow a change of the canvas rectangle. Small canvases zoom out so the
    /// whole idle sky stays visible.
    pub fn resize(&mut self, canvas_area: Rect) {
        self.canvas_area = canvas_area;
        let pixels_per_dot = braille::fit_pixels_per_dot(
            canvas_area.width,
            canvas_area.height,
            self.settings.pixels_per_dot,
            self.settings.sky_extent(),
        );
        self.canvas = BrailleCanvas::new(canvas_area.width, canvas_area.height, pixels_per_dot);

        if canvas_area.width == 0 || canvas_area.height == 0 {
            if self.simulation.take().is_some() {
                debug!("canvas unavailable, constellation suspended");
            }
            return;
        }

        let (width, height) = braille::calculate_viewport_size(canvas_area.width, canvas_area.height, pixels_per_dot);
        match self.simulation.as_mut() {
            Some(simulation) => simulation.resize(width, height),
            None => {
                self.simulation = Some(ConstellationSimulation::new(width, height, self.settings.clone(), self.seed));
                info!(width, height, pixels_per_dot, "constellation created");
            }
        }
        // The fresh canvas is blank; a paused app would otherwise show nothing
        self.redraw();
    }

    // === Interaction ===

    /// Route a terminal mouse event: hovering the button and pressing inside the
    /// canvas both count as interacting
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let pos = Position::new(event.column, event.row);
        let in_canvas = self.canvas_area.contains(pos);

        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.hovering = ui::button_rect(self.canvas_area).contains(pos);
                if in_canvas {
                    let (x, y) = self.cell_to_pixels(event.column, event.row);
                    self.cursor.pointer_moved(x, y);
                } else {
                    self.cursor.pointer_left();
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if in_canvas {
                    self.pressed = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.pressed = false;
            }
            _ => {}
        }
        self.sync_interaction();
    }

    /// Keyboard stand-in for holding the pointer on the button
    pub fn toggle_latch(&mut self) {
        self.latched = !self.latched;
        self.sync_interaction();
    }

    /// Start or end the ramp to match the current input state
    fn sync_interaction(&mut self) {
        if self.paused {
            return;
        }
        if self.hovering || self.pressed || self.latched {
            self.progress.start();
        } else {
            self.progress.end();
        }
    }

    /// Center of a terminal cell in virtual pixels
    fn cell_to_pixels(&self, column: u16, row: u16) -> (f32, f32) {
        let ppd = self.canvas.pixels_per_dot();
        let dx = column.saturating_sub(self.canvas_area.x) as f32 * 2.0 + 1.0;
        let dy = row.saturating_sub(self.canvas_area.y) as f32 * 4.0 + 2.0;
        (dx * ppd, dy * ppd)
    }

    // === Controls ===

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        // Resume with a fresh frame clock so the ramp doesn't jump
        self.last_tick = Instant::now();
        self.sync_interaction();
    }

    /// Re-roll the constellation
    pub fn reset(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.settings = self.settings.clone();
            simulation.reset();
        }
        self.redraw();
    }

    /// Cycle color palette
    pub fn cycle_palette(&mut self) {
        self.set_palette(self.palette.next());
    }

    fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.star_lut = palette.build_lut();
        self.accent_lut = palette.accent().build_lut();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Drift => self.adjust_drift(1.0),
            Focus::Edges => self.adjust_edges(0.05),
            Focus::Palette => self.set_palette(self.palette.next()),
            Focus::Particles => self.adjust_particles(5),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Drift => self.adjust_drift(-1.0),
            Focus::Edges => self.adjust_edges(-0.05),
            Focus::Palette => self.set_palette(self.palette.prev()),
            Focus::Particles => self.adjust_particles(-5),
        }
    }

    /// Drift applies live, no re-roll needed
    fn adjust_drift(&mut self, delta: f32) {
        self.settings.adjust_drift_amplitude(delta);
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.settings.drift_amplitude = self.settings.drift_amplitude;
        }
        // Wider drift needs a little more room
        self.resize(self.canvas_area);
    }

    fn adjust_edges(&mut self, delta: f32) {
        self.settings.adjust_edge_probability(delta);
        self.reset();
    }

    fn adjust_particles(&mut self, delta: i32) {
        self.settings.adjust_particle_count(delta);
        self.reset();
    }

    /// Write the current settings to the config file
    pub fn save_config(&mut self) {
        let path = match self.config_path.clone() {
            Some(path) => Ok(path),
            None => AppConfig::default_path(),
        };
        let result = path.and_then(|path| self.config().save_to_file(&path).map(|_| path));

        self.status_message = Some(match result {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.config_path = Some(path);
                format!("Saved {}", name)
            }
            Err(err) => {
                warn!(error = %err, "saving config failed");
                "Save failed".to_string()
            }
        });
    }

    /// Stop every timer before the view goes away
    pub fn teardown(&mut self) {
        self.progress.cancel();
        self.simulation = None;
        debug!("view torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::Layer;
    use crossterm::event::KeyModifiers;
    use tempfile::tempdir;

    const FRAME: Duration = Duration::from_millis(16);

    fn seeded_config() -> AppConfig {
        AppConfig {
            seed: Some(5),
            ..AppConfig::default()
        }
    }

    fn app() -> App {
        App::new(Rect::new(22, 1, 100, 40), seeded_config())
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn run_frames(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.tick_with(FRAME, 1.0);
        }
    }

    #[test]
    fn test_zero_area_means_no_simulation() {
        let mut app = App::new(Rect::new(0, 0, 0, 10), seeded_config());
        assert!(app.simulation.is_none());

        app.latched = true;
        app.progress.start();
        run_frames(&mut app, 10);
        // No surface, so not even the ramp advances
        assert_eq!(app.progress.progress(), 0.0);
        assert!(app.cells().is_empty());

        app.resize(Rect::new(0, 0, 80, 30));
        assert!(app.simulation.is_some());
        run_frames(&mut app, 10);
        assert!(app.progress.progress() > 0.0);
    }

    #[test]
    fn test_shrinking_to_nothing_suspends() {
        let mut app = app();
        assert!(app.simulation.is_some());
        app.resize(Rect::new(22, 1, 100, 0));
        assert!(app.simulation.is_none());
    }

    #[test]
    fn test_resize_keeps_existing_stars() {
        let mut app = app();
        let count = app.simulation.as_ref().unwrap().particles().len();
        app.resize(Rect::new(0, 1, 120, 40));
        let sim = app.simulation.as_ref().unwrap();
        assert_eq!(sim.particles().len(), count);
        let ppd = app.canvas.pixels_per_dot();
        assert_eq!(sim.width, 120.0 * 2.0 * ppd);
        assert_eq!(sim.height, 40.0 * 4.0 * ppd);
    }

    #[test]
    fn test_small_terminal_shows_whole_sky() {
        let area = ui::get_canvas_area(Rect::new(0, 0, 80, 24), false);
        for seed in 0..20 {
            let config = AppConfig {
                seed: Some(seed),
                ..AppConfig::default()
            };
            let mut app = App::new(area, config);
            assert!(app.canvas.pixels_per_dot() > 3.0);
            for frame in 0..120 {
                app.tick_with(FRAME, frame as f64 / 60.0);
                let sim = app.simulation.as_ref().unwrap();
                for p in sim.particles() {
                    assert!((0.0..sim.width).contains(&p.x), "seed {} x {}", seed, p.x);
                    assert!((0.0..sim.height).contains(&p.y), "seed {} y {}", seed, p.y);
                }
            }
        }
    }

    #[test]
    fn test_large_canvas_keeps_configured_density() {
        let app = App::new(Rect::new(0, 0, 300, 100), seeded_config());
        assert_eq!(app.canvas.pixels_per_dot(), 3.0);
    }

    #[test]
    fn test_wider_drift_zooms_out() {
        let mut app = App::new(ui::get_canvas_area(Rect::new(0, 0, 80, 24), false), seeded_config());
        let before = app.canvas.pixels_per_dot();
        app.focus = Focus::Drift;
        for _ in 0..10 {
            app.adjust_focused_up();
        }
        assert!(app.canvas.pixels_per_dot() > before);
        let sim = app.simulation.as_ref().unwrap();
        assert!(sim.width.min(sim.height) >= app.settings.sky_extent() - 1e-2);
    }

    #[test]
    fn test_resize_while_paused_repaints() {
        let mut app = app();
        run_frames(&mut app, 1);
        app.toggle_pause();
        app.resize(Rect::new(0, 1, 90, 30));
        assert!(!app.cells().is_empty());
    }

    #[test]
    fn test_nebula_lights_background() {
        let mut app = app();
        app.settings.particle_count = 5;
        app.reset();
        run_frames(&mut app, 1);
        let (w, h) = (app.canvas_area.width as usize * 2, app.canvas_area.height as usize * 4);
        let accent_dots = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| app.canvas.alpha_at(Layer::Accent, x, y) > 0.0)
            .count();
        assert!(accent_dots > 100, "{}", accent_dots);
    }

    #[test]
    fn test_hovering_button_forms_heart() {
        let mut app = app();
        let button = ui::button_rect(app.canvas_area);
        app.handle_mouse(mouse(MouseEventKind::Moved, button.x + 1, button.y + 1));
        assert_eq!(app.phase(), Phase::Forming);
        assert_eq!(app.button_label(), "Keep holding...");

        run_frames(&mut app, 80);
        assert_eq!(app.progress.progress(), 1.0);
        assert!(app.show_heart_hint());

        app.handle_mouse(mouse(MouseEventKind::Moved, app.canvas_area.x + 1, app.canvas_area.y + 1));
        assert_eq!(app.phase(), Phase::Dissolving);
        run_frames(&mut app, 80);
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.button_label(), "Hover here");
    }

    #[test]
    fn test_press_and_release_in_canvas() {
        let mut app = app();
        let (x, y) = (app.canvas_area.x + 3, app.canvas_area.y + 3);
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x, y));
        assert_eq!(app.phase(), Phase::Forming);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), x, y));
        assert_eq!(app.phase(), Phase::Idle);
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let mut app = app();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 0, 0));
        assert_eq!(app.phase(), Phase::Idle);
    }

    #[test]
    fn test_release_while_hovering_keeps_forming() {
        let mut app = app();
        let button = ui::button_rect(app.canvas_area);
        app.handle_mouse(mouse(MouseEventKind::Moved, button.x + 1, button.y + 1));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), button.x + 1, button.y + 1));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), button.x + 1, button.y + 1));
        assert_eq!(app.phase(), Phase::Forming);
    }

    #[test]
    fn test_latch_toggles_interaction() {
        let mut app = app();
        app.toggle_latch();
        assert_eq!(app.phase(), Phase::Forming);
        run_frames(&mut app, 5);
        app.toggle_latch();
        assert_eq!(app.phase(), Phase::Dissolving);
    }

    #[test]
    fn test_pause_freezes_and_ignores_interaction() {
        let mut app = app();
        app.toggle_pause();
        app.toggle_latch();
        assert_eq!(app.phase(), Phase::Idle);

        let before: Vec<_> = app.simulation.as_ref().unwrap().particles().to_vec();
        run_frames(&mut app, 10);
        assert_eq!(app.simulation.as_ref().unwrap().particles(), &before[..]);

        // Resuming picks up the latched state
        app.toggle_pause();
        assert_eq!(app.phase(), Phase::Forming);
    }

    #[test]
    fn test_tick_draws_stars() {
        let mut app = app();
        run_frames(&mut app, 1);
        assert!(!app.cells().is_empty());
    }

    #[test]
    fn test_cursor_follows_pointer_in_canvas() {
        let mut app = app();
        app.handle_mouse(mouse(MouseEventKind::Moved, app.canvas_area.x + 10, app.canvas_area.y + 5));
        run_frames(&mut app, 5);
        assert!(app.cursor.visibility() > 0.0);

        app.handle_mouse(mouse(MouseEventKind::Moved, 0, 0));
        run_frames(&mut app, 30);
        assert_eq!(app.cursor.visibility(), 0.0);
    }

    #[test]
    fn test_adjust_particles_rerolls() {
        let mut app = app();
        app.focus = Focus::Particles;
        app.adjust_focused_up();
        assert_eq!(app.settings.particle_count, 30);
        assert_eq!(app.simulation.as_ref().unwrap().particles().len(), 30);
        app.adjust_focused_down();
        assert_eq!(app.simulation.as_ref().unwrap().particles().len(), 25);
    }

    #[test]
    fn test_adjust_drift_applies_live() {
        let mut app = app();
        app.focus = Focus::Drift;
        app.adjust_focused_up();
        assert_eq!(app.simulation.as_ref().unwrap().settings.drift_amplitude, 6.0);
    }

    #[test]
    fn test_palette_cycle_rebuilds_luts() {
        let mut app = app();
        app.cycle_palette();
        assert_eq!(app.palette, Palette::SoftPink);
        app.focus = Focus::Palette;
        app.adjust_focused_down();
        assert_eq!(app.palette, Palette::RoseGold);
    }

    #[test]
    fn test_focus_cycle_round_trip() {
        let mut focus = Focus::Controls;
        for _ in 0..4 {
            focus = focus.next();
            assert!(focus.is_param());
            assert_eq!(focus.next().prev(), focus);
        }
        assert_eq!(focus.next(), Focus::Drift);
    }

    #[test]
    fn test_save_config_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("constellation.json");
        let mut app = app();
        app.config_path = Some(path.clone());
        app.cycle_palette();
        app.save_config();

        assert_eq!(app.status_message.as_deref(), Some("Saved constellation.json"));
        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.palette, Palette::SoftPink);
        assert_eq!(loaded.seed, Some(5));
    }

    #[test]
    fn test_teardown_cancels_ramp() {
        let mut app = app();
        app.toggle_latch();
        run_frames(&mut app, 3);
        app.teardown();
        assert!(!app.progress.is_ramping());
        assert_eq!(app.phase(), Phase::Idle);
        assert!(app.simulation.is_none());
    }
}
