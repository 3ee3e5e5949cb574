use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode};
use crate::core::{data_url, ColorVariant};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Main | AppMode::PhotoInput | AppMode::AdjustInput => draw_main(frame, app),
        AppMode::Templates | AppMode::TemplateInput => draw_templates(frame, app),
    }
}

fn swatch(color: ColorVariant) -> Color {
    match color {
        ColorVariant::Green => Color::Rgb(78, 169, 46),
        ColorVariant::Black => Color::DarkGray,
        ColorVariant::White => Color::White,
    }
}

/// Draw the portrait page
fn draw_main(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title/input
            Constraint::Min(12),    // Controls + result
            Constraint::Length(3),  // Status bar
            Constraint::Length(2),  // Help line
        ])
        .split(frame.area());

    if app.mode.is_text_input() {
        draw_input(frame, app, chunks[0]);
    } else {
        draw_title(frame, chunks[0]);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_controls(frame, app, columns[0]);
    draw_result(frame, app, columns[1]);
    draw_status(frame, app, chunks[2]);
    draw_help(frame, app, chunks[3]);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Hoodie Portrait",
            Style::default()
                .fg(swatch(ColorVariant::Green))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - branded portraits with Gemini", Style::default().fg(Color::Gray)),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(swatch(ColorVariant::Green))),
    );
    frame.render_widget(title, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.mode {
        AppMode::PhotoInput => "Photo path (Enter to load, Esc to cancel)".to_string(),
        AppMode::AdjustInput => "Additional adjustments (Enter to save, Esc to cancel)".to_string(),
        AppMode::TemplateInput => format!(
            "{} template image path (Enter to load, Esc to cancel)",
            app.selected_template_color()
        ),
        _ => String::new(),
    };

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        );
    frame.render_widget(input, area);

    // Show cursor
    frame.set_cursor_position((
        area.x + app.cursor_pos as u16 + 1,
        area.y + 1,
    ));
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let mut lines = vec![heading("1. Photo")];

    match &state.uploaded {
        Some(image) => {
            lines.push(Line::from(Span::styled(
                format!("  {}", image.preview),
                Style::default().fg(Color::White),
            )));
            lines.push(Line::from(Span::styled(
                format!("  {}", image.mime_type()),
                Style::default().fg(Color::DarkGray),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "  (none, press p to choose a photo)",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(heading("2. Hoodie Color"));

    let mut swatches = vec![Span::raw("  ")];
    for color in ColorVariant::all() {
        let style = if *color == state.color {
            Style::default()
                .fg(Color::Black)
                .bg(swatch(*color))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(swatch(*color))
        };
        swatches.push(Span::styled(format!(" {} ", color.label()), style));
        swatches.push(Span::raw(" "));
    }
    lines.push(Line::from(swatches));

    let reference = if state.current_template().is_some() {
        Span::styled("  reference image: loaded", Style::default().fg(Color::Green))
    } else {
        Span::styled("  reference image: none", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(reference));

    lines.push(Line::from(""));
    lines.push(heading("3. Adjustments"));
    if state.adjustment.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (optional, press a to add)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("  {}", state.adjustment),
            Style::default().fg(Color::White),
        )));
    }

    let controls = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Portrait"))
        .wrap(Wrap { trim: false });
    frame.render_widget(controls, area);
}

fn draw_result(frame: &mut Frame, app: &App, area: Rect) {
    let generation = &app.state.generation;

    let lines = if generation.is_generating {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "  {} Generating {} hoodie portrait...",
                    SPINNER[app.tick % SPINNER.len()],
                    app.state.color.as_str()
                ),
                Style::default().fg(Color::Yellow),
            )),
            Line::from(Span::styled(
                "  This can take up to a minute.",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    } else if let Some(error) = &generation.error {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Generation failed",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("  {}", error), Style::default().fg(Color::Red))),
        ]
    } else if let Some(image) = &generation.result_image {
        let parts = data_url::decode(image);
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Portrait ready",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  {} ({} KiB)", parts.mime_type, parts.data.len() * 3 / 4 / 1024),
                Style::default().fg(Color::Gray),
            )),
        ];
        if let Some(path) = &app.last_saved {
            lines.push(Line::from(Span::styled(
                format!("  {}", path.display()),
                Style::default().fg(Color::White),
            )));
        }
        lines
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Your portrait will appear here.",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    };

    let result = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Result"))
        .wrap(Wrap { trim: false });
    frame.render_widget(result, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (message, style) = if let Some(err) = &app.error_message {
        (err.as_str(), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status_message {
        (status.as_str(), Style::default().fg(Color::Green))
    } else if app.state.generation.is_generating {
        ("Generating...", Style::default().fg(Color::Yellow))
    } else {
        ("Ready", Style::default().fg(Color::Gray))
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        AppMode::PhotoInput | AppMode::AdjustInput | AppMode::TemplateInput => {
            "Enter: Save | Esc: Cancel"
        }
        AppMode::Main if app.state.generation.is_generating => "Generating... | q: Quit",
        AppMode::Main => {
            "p: Photo | ←→: Color | a: Adjust | g/Enter: Generate | t: Templates | q: Quit"
        }
        AppMode::Templates => "↑↓: Navigate | Enter: Set image | x: Clear | e: Export | Esc/q: Back",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Draw template settings screen
fn draw_templates(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header/input
            Constraint::Min(6),     // Template list
            Constraint::Length(3),  // Status
            Constraint::Length(2),  // Help
        ])
        .split(area);

    if app.mode == AppMode::TemplateInput {
        draw_input(frame, app, chunks[0]);
    } else {
        let header = Paragraph::new("Template Settings")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);
    }

    let items: Vec<ListItem> = ColorVariant::all()
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let is_selected = i == app.templates_selected;
            let loaded = app.state.templates.get(*color).is_some();
            let source = app
                .config
                .templates
                .path(*color)
                .map(str::to_string)
                .unwrap_or_else(|| if loaded { "(in memory)".to_string() } else { "No Image".to_string() });

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", format!("{} Template", color.label())),
                    if is_selected {
                        Style::default().fg(swatch(*color)).add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default().fg(swatch(*color))
                    },
                ),
                Span::raw("  "),
                Span::styled(
                    if loaded { "✓ " } else { "  " },
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    source,
                    if loaded {
                        Style::default().fg(Color::White)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    frame.render_widget(list, chunks[1]);

    draw_status(frame, app, chunks[2]);
    draw_help(frame, app, chunks[3]);
}
