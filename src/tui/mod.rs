mod app;
mod event_handler;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::config::Config;
use crate::core::AppState;

use app::{App, AppMode};

/// Run the TUI application
pub async fn run(config: &mut Config) -> Result<()> {
    // Build page state before touching the terminal so template warnings stay readable
    let mut state = AppState::new(config.template_store().await);
    state.select_color(config.defaults.color);
    state.set_adjustment(config.defaults.adjustment.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone(), state);

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Save config if changed
    if app.config_changed {
        *config = app.config.clone();
        config.save()?;
    }

    if let Some(path) = &app.last_saved {
        println!("Last portrait: {}", path.display());
    }

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.poll_generation();
        if app.state.generation.is_generating {
            app.tick = app.tick.wrapping_add(1);
        }

        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle events
        if poll(Duration::from_millis(100))? {
            if let Event::Key(key) = read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global quit shortcuts
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle mode-specific input
                match app.mode {
                    AppMode::Main => event_handler::handle_main_input(app, key)?,
                    AppMode::Templates => event_handler::handle_templates_input(app, key).await?,
                    mode if mode.is_text_input() => event_handler::handle_input_mode(app, key).await?,
                    _ => {}
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            return Ok(());
        }
    }
}
