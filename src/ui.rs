use crate::app::{App, Focus};
use crate::progress::Phase;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 22;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 12;

const BUTTON_WIDTH: u16 = 23;
const BUTTON_HEIGHT: u16 = 3;

// UI color scheme
const BORDER_COLOR: Color = Color::Rgb(214, 161, 144);
const HIGHLIGHT_COLOR: Color = Color::Rgb(230, 190, 170);
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas rectangle (inside its border)
pub fn get_canvas_area(frame_area: Rect, fullscreen: bool) -> Rect {
    let outer = if fullscreen {
        frame_area
    } else {
        let sidebar = SIDEBAR_WIDTH.min(frame_area.width);
        Rect {
            x: frame_area.x + sidebar,
            y: frame_area.y,
            width: frame_area.width - sidebar,
            height: frame_area.height,
        }
    };
    Rect {
        x: outer.x.saturating_add(1),
        y: outer.y.saturating_add(1),
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Where the "Hover here" button sits inside the canvas
pub fn button_rect(canvas: Rect) -> Rect {
    let width = BUTTON_WIDTH.min(canvas.width);
    let height = BUTTON_HEIGHT.min(canvas.height);
    Rect {
        x: canvas.x + (canvas.width - width) / 2,
        y: canvas.y + (canvas.height.saturating_sub(height)) * 3 / 4,
        width,
        height,
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Status
            Constraint::Length(6), // Parameters
            Constraint::Min(6),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Constellation ");

    let progress = app.progress.progress();
    let progress_width = (area.width.saturating_sub(4)) as usize;
    let filled = (progress * progress_width as f32) as usize;
    let empty = progress_width.saturating_sub(filled);

    let (status_text, status_color) = if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if app.simulation.is_none() {
        ("NO CANVAS", DIM_TEXT_COLOR)
    } else {
        let color = match app.phase() {
            Phase::Idle => BORDER_COLOR,
            Phase::Forming => Color::LightRed,
            Phase::Dissolving => HIGHLIGHT_COLOR,
        };
        (app.phase().name(), color)
    };

    let (stars, edges) = app
        .simulation
        .as_ref()
        .map(|s| (s.particles().len(), s.edges().len()))
        .unwrap_or((0, 0));

    let content = vec![
        Line::from(Span::styled(
            format!("{} stars, {} edges", stars, edges),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::LightRed)),
            Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(status_text.to_string(), Style::default().fg(status_color))),
        Line::from(Span::styled(
            app.status_message.clone().unwrap_or_default(),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.settings;

    let content = vec![
        make_line(
            "Drift",
            format!("{:.0}", settings.drift_amplitude),
            app.focus == Focus::Drift,
        ),
        make_line(
            "Edges",
            format!("{:.2}", settings.edge_probability),
            app.focus == Focus::Edges,
        ),
        make_line("Color", app.palette.name().to_string(), app.focus == Focus::Palette),
        make_line(
            "Stars",
            format!("{}", settings.particle_count),
            app.focus == Focus::Particles,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Mouse", "hover/hold".to_string()),
        make_control("F", "hold (keyboard)".to_string()),
        make_control("Space", "pause/resume".to_string()),
        make_control("R", "new sky".to_string()),
        make_control("C", app.palette.name().to_string()),
        make_control("V", "fullscreen".to_string()),
        make_control("S", "save config".to_string()),
        make_control("H", "help".to_string()),
        make_control("Tab", "select param".to_string()),
        make_control("↑/↓", "adjust param".to_string()),
        make_control("Esc", "leave param".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let buffer = frame.buffer_mut();
    for cell in app.cells() {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buffer.cell_mut((x, y)) {
                target.set_char(cell.char).set_fg(cell.color);
            }
        }
    }

    render_heading(frame, inner);
    render_button(frame, inner, app);
}

fn render_heading(frame: &mut Frame, canvas: Rect) {
    if canvas.height < 8 {
        return;
    }
    let area = Rect {
        x: canvas.x,
        y: canvas.y + canvas.height / 8,
        width: canvas.width,
        height: 3,
    };
    let content = vec![
        Line::from(Span::styled(
            "A GENTLE MOMENT",
            Style::default().fg(BORDER_COLOR),
        )),
        Line::from(Span::styled(
            "Touch the stars",
            Style::default().fg(TEXT_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Hover or hold to see them come together",
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_button(frame: &mut Frame, canvas: Rect, app: &App) {
    let area = button_rect(canvas);
    if area.width < 3 || area.height < 3 {
        return;
    }

    let forming = app.phase() == Phase::Forming;
    let border = if forming { HIGHLIGHT_COLOR } else { DIM_TEXT_COLOR };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));

    let label = Line::from(vec![
        Span::styled("✦ ", Style::default().fg(BORDER_COLOR)),
        Span::styled(app.button_label().to_string(), Style::default().fg(TEXT_COLOR)),
        Span::styled(" ✦", Style::default().fg(BORDER_COLOR)),
    ]);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(label).alignment(Alignment::Center).block(block),
        area,
    );

    // Heart hint just below the button
    let hint_y = area.y + area.height;
    if app.show_heart_hint() && hint_y < canvas.y + canvas.height {
        let hint_area = Rect {
            x: canvas.x,
            y: hint_y,
            width: canvas.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled("♡", Style::default().fg(Color::LightRed)))
                .alignment(Alignment::Center),
            hint_area,
        );
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("CONSTELLATION", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Stars drift gently around the sky. Hover the button, or hold the mouse anywhere on the canvas, and they gather into a heart. Let go and they drift home."),
        Line::from(""),
        Line::from(Span::styled("INTERACTION:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Hover the button or hold the left mouse button to form the heart. F does the same from the keyboard (press again to release)."),
        Line::from(""),
        Line::from(Span::styled("PARAMETERS (Tab, then arrows):", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Drift: how far idle stars wander"),
        Line::from("Edges: chance two stars are linked (new sky)"),
        Line::from("Color: star palette"),
        Line::from("Stars: how many stars (new sky)"),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Space=Pause, R=New sky, C=Colors, V=Fullscreen, S=Save config, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn screen_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        screen_text(terminal.backend().buffer())
    }

    #[test]
    fn test_heading_shows_title_and_subtitle() {
        let area = get_canvas_area(Rect::new(0, 0, 124, 42), false);
        let app = App::new(area, AppConfig::default());
        let text = draw(&app, 124, 42);
        assert!(text.contains("A GENTLE MOMENT"));
        assert!(text.contains("Touch the stars"));
        assert!(text.contains("Hover or hold to see them come together"));
        assert!(text.contains("Hover here"));
    }

    #[test]
    fn test_canvas_area_excludes_sidebar_and_border() {
        let area = get_canvas_area(Rect::new(0, 0, 124, 42), false);
        assert_eq!(area, Rect::new(SIDEBAR_WIDTH + 1, 1, 100, 40));
    }

    #[test]
    fn test_canvas_area_fullscreen() {
        let area = get_canvas_area(Rect::new(0, 0, 80, 24), true);
        assert_eq!(area, Rect::new(1, 1, 78, 22));
    }

    #[test]
    fn test_tiny_terminal_has_no_canvas() {
        let area = get_canvas_area(Rect::new(0, 0, 20, 10), false);
        assert_eq!(area.width, 0);
        let area = get_canvas_area(Rect::new(0, 0, 2, 2), true);
        assert_eq!((area.width, area.height), (0, 0));
    }

    #[test]
    fn test_button_inside_canvas() {
        let canvas = Rect::new(23, 1, 100, 40);
        let button = button_rect(canvas);
        assert_eq!(button.width, BUTTON_WIDTH);
        assert_eq!(button.height, BUTTON_HEIGHT);
        assert_eq!(canvas.intersection(button), button);
    }

    #[test]
    fn test_button_shrinks_with_canvas() {
        let canvas = Rect::new(0, 0, 10, 2);
        let button = button_rect(canvas);
        assert_eq!((button.width, button.height), (10, 2));
    }
}
