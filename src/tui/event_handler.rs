use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, AppMode};
use crate::core::ColorVariant;

/// Handle input on the portrait page
pub fn handle_main_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        // Color selection
        KeyCode::Left | KeyCode::Char('h') => {
            let color = app.state.color.previous();
            app.state.select_color(color);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('c') => {
            let color = app.state.color.next();
            app.state.select_color(color);
        }
        KeyCode::Char('1') => app.state.select_color(ColorVariant::Green),
        KeyCode::Char('2') => app.state.select_color(ColorVariant::Black),
        KeyCode::Char('3') => app.state.select_color(ColorVariant::White),

        // Photo path
        KeyCode::Char('p') | KeyCode::Char('o') => {
            let current = app
                .state
                .uploaded
                .as_ref()
                .map(|u| u.preview.clone())
                .unwrap_or_default();
            app.begin_input(AppMode::PhotoInput, &current);
        }

        // Adjustments
        KeyCode::Char('a') | KeyCode::Char('i') => {
            let current = app.state.adjustment.clone();
            app.begin_input(AppMode::AdjustInput, &current);
        }

        // Generate (ignored while a request is outstanding)
        KeyCode::Char('g') | KeyCode::Enter => {
            if !app.state.generation.is_generating {
                app.start_generation();
            }
        }

        // Template settings
        KeyCode::Char('t') | KeyCode::Char('s') => {
            app.mode = AppMode::Templates;
            app.templates_selected = ColorVariant::all()
                .iter()
                .position(|c| *c == app.state.color)
                .unwrap_or(0);
            app.clear_messages();
        }

        // Quit
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }

        _ => {}
    }
    Ok(())
}

/// Handle input while typing a path or adjustment
pub async fn handle_input_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.take_input();
            app.mode = leave_input(app.mode);
        }

        KeyCode::Enter => {
            let mode = app.mode;
            let value = app.take_input();
            app.mode = leave_input(mode);

            match mode {
                AppMode::PhotoInput if !value.trim().is_empty() => {
                    if let Err(e) = app.load_photo(&value).await {
                        app.set_error(format!("{:#}", e));
                    }
                }
                AppMode::AdjustInput => {
                    app.state.set_adjustment(value.trim());
                    if app.state.adjustment.is_empty() {
                        app.set_status("Adjustments cleared");
                    } else {
                        app.set_status("Adjustments updated");
                    }
                }
                AppMode::TemplateInput if !value.trim().is_empty() => {
                    let color = app.selected_template_color();
                    if let Err(e) = app.load_template(color, &value).await {
                        app.set_error(format!("{:#}", e));
                    }
                }
                _ => {}
            }
        }

        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.move_cursor(-1),
        KeyCode::Right => app.move_cursor(1),
        KeyCode::Home => app.cursor_pos = 0,
        KeyCode::End => app.cursor_to_end(),

        _ => {}
    }
    Ok(())
}

fn leave_input(mode: AppMode) -> AppMode {
    match mode {
        AppMode::TemplateInput => AppMode::Templates,
        _ => AppMode::Main,
    }
}

/// Handle input on the template settings screen
pub async fn handle_templates_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let count = ColorVariant::all().len();

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if app.templates_selected > 0 {
                app.templates_selected -= 1;
            }
        }

        KeyCode::Down | KeyCode::Char('j') => {
            if app.templates_selected < count - 1 {
                app.templates_selected += 1;
            }
        }

        KeyCode::Enter | KeyCode::Char(' ') => {
            let color = app.selected_template_color();
            let current = app
                .config
                .templates
                .path(color)
                .unwrap_or_default()
                .to_string();
            app.begin_input(AppMode::TemplateInput, &current);
        }

        KeyCode::Char('x') | KeyCode::Delete => {
            let color = app.selected_template_color();
            app.clear_template(color);
        }

        KeyCode::Char('e') => match app.export_templates().await {
            Ok(path) => app.set_status(format!("Templates exported to {}", path.display())),
            Err(e) => app.set_error(format!("Export failed: {:#}", e)),
        },

        KeyCode::Esc | KeyCode::Char('q') => {
            app.mode = AppMode::Main;
            app.clear_messages();
        }

        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::AppState;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Config::default(), AppState::default())
    }

    #[test]
    fn arrows_cycle_colors() {
        let mut app = app();
        handle_main_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.state.color, ColorVariant::Black);
        handle_main_input(&mut app, key(KeyCode::Left)).unwrap();
        handle_main_input(&mut app, key(KeyCode::Left)).unwrap();
        assert_eq!(app.state.color, ColorVariant::White);
        handle_main_input(&mut app, key(KeyCode::Char('1'))).unwrap();
        assert_eq!(app.state.color, ColorVariant::Green);
    }

    #[tokio::test]
    async fn typed_adjustment_is_stored_trimmed() {
        let mut app = app();
        handle_main_input(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.mode, AppMode::AdjustInput);

        for c in " brighter ".chars() {
            handle_input_mode(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input_mode(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.mode, AppMode::Main);
        assert_eq!(app.state.adjustment, "brighter");
    }

    #[tokio::test]
    async fn escape_discards_input() {
        let mut app = app();
        app.state.set_adjustment("keep");
        handle_main_input(&mut app, key(KeyCode::Char('a'))).unwrap();
        handle_input_mode(&mut app, key(KeyCode::Backspace)).await.unwrap();
        handle_input_mode(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state.adjustment, "keep");
        assert_eq!(app.mode, AppMode::Main);
    }

    #[tokio::test]
    async fn bad_photo_path_shows_error() {
        let mut app = app();
        handle_main_input(&mut app, key(KeyCode::Char('p'))).unwrap();
        for c in "/no/such/photo.jpg".chars() {
            handle_input_mode(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input_mode(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert!(app.state.uploaded.is_none());
        assert!(app.error_message.is_some());
    }

    #[tokio::test]
    async fn templates_screen_opens_on_selected_color() {
        let mut app = app();
        app.state.select_color(ColorVariant::White);
        handle_main_input(&mut app, key(KeyCode::Char('t'))).unwrap();
        assert_eq!(app.mode, AppMode::Templates);
        assert_eq!(app.selected_template_color(), ColorVariant::White);

        handle_templates_input(&mut app, key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.selected_template_color(), ColorVariant::Black);
        handle_templates_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.mode, AppMode::TemplateInput);
        handle_input_mode(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.mode, AppMode::Templates);
    }
}
