mod app;
mod braille;
mod color;
mod config;
mod cursor;
mod error;
mod nebula;
mod progress;
mod settings;
mod shape;
mod simulation;
mod ui;

use app::{App, Focus};
use clap::Parser;
use color::Palette;
use config::AppConfig;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "constellation")]
#[command(about = "Stars that gather into a heart while you hold them, in the terminal")]
struct Args {
    /// Number of stars (5-100)
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Chance that two stars are linked by an edge (0.0-1.0)
    #[arg(short = 'e', long = "edge-probability")]
    edge_probability: Option<f32>,

    /// RNG seed for a reproducible sky
    #[arg(long)]
    seed: Option<u64>,

    /// Star palette (rose, pink, champagne, purple, blue)
    #[arg(long)]
    palette: Option<String>,

    /// Config file to load settings from (and save to with S)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Install a file logger; without a log file nothing is installed so the TUI stays clean
fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Config from `explicit`, else `fallback` if that file exists, else defaults.
/// A file that exists but can't be read is an error either way.
fn load_config(explicit: Option<&Path>, fallback: Option<PathBuf>) -> crate::error::Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = AppConfig::load_from_file(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    match fallback {
        Some(path) if path.exists() => {
            let config = AppConfig::load_from_file(&path)?;
            Ok((config, Some(path)))
        }
        _ => Ok((AppConfig::default(), None)),
    }
}

/// CLI flags win over the config file
fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(particles) = args.particles {
        config.settings.particle_count = particles.clamp(settings::MIN_PARTICLES, settings::MAX_PARTICLES);
    }
    if let Some(probability) = args.edge_probability {
        config.settings.edge_probability = probability.clamp(0.0, 1.0);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(name) = &args.palette {
        match Palette::parse(name) {
            Some(palette) => config.palette = palette,
            None => warn!(palette = %name, "unknown palette, keeping {}", config.palette.name()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    // Report config problems before the terminal switches to raw mode
    let (mut config, config_path) = match load_config(args.config.as_deref(), AppConfig::default_path().ok()) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(error = %err, "config rejected");
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    apply_args(&mut config, &args);
    info!(
        particles = config.settings.particle_count,
        edge_probability = config.settings.edge_probability,
        palette = config.palette.name(),
        "starting constellation"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let frame_rect = Rect::new(0, 0, size.width, size.height);
    let mut app = App::new(ui::get_canvas_area(frame_rect, false), config);
    app.config_path = config_path;

    // Run the app
    let res = run_app(&mut terminal, &mut app);
    app.teardown();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Recompute the canvas after a terminal resize or layout change
fn relayout(app: &mut App, width: u16, height: u16) {
    let area = ui::get_canvas_area(Rect::new(0, 0, width, height), app.fullscreen_mode);
    app.resize(area);
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Handle Ctrl+C
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        // System controls
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_latch(),
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            app.cycle_palette();
                            app.focus = Focus::Palette;
                        }
                        KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                        KeyCode::Char('v') | KeyCode::Char('V') => {
                            app.toggle_fullscreen();
                            let size = terminal.size()?;
                            relayout(app, size.width, size.height);
                        }
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_up();
                                } else {
                                    app.scroll_controls_up();
                                }
                            }
                        }
                        KeyCode::Down => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_down();
                                } else {
                                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES);
                                }
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => relayout(app, width, height),
                _ => {}
            }
        }

        // Run simulation tick
        app.tick();
    }
}
