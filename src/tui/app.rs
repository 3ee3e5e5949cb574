use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::GeminiClient;
use crate::config::Config;
use crate::core::output::{new_portrait_id, save_portrait};
use crate::core::{AppState, ColorVariant, PortraitError, PortraitGenerator, UploadedImage};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Portrait page
    Main,
    /// Typing the photo path
    PhotoInput,
    /// Typing additional adjustments
    AdjustInput,
    /// Reference image per color
    Templates,
    /// Typing a template image path
    TemplateInput,
}

impl AppMode {
    pub fn is_text_input(&self) -> bool {
        matches!(
            self,
            AppMode::PhotoInput | AppMode::AdjustInput | AppMode::TemplateInput
        )
    }
}

/// Finished background generation
#[derive(Debug)]
pub struct GenerationDone {
    pub result: Result<String, PortraitError>,
    pub saved: Option<Result<PathBuf, String>>,
}

/// TUI application state
pub struct App {
    /// Current mode
    pub mode: AppMode,

    /// Configuration
    pub config: Config,

    /// Photo, color, adjustments, templates and latest result
    pub state: AppState,

    /// Current text input
    pub input: String,

    /// Cursor position in input (in chars)
    pub cursor_pos: usize,

    /// Status message
    pub status_message: Option<String>,

    /// Error message
    pub error_message: Option<String>,

    /// Whether to quit
    pub should_quit: bool,

    /// Whether config was changed
    pub config_changed: bool,

    /// Templates: selected color index
    pub templates_selected: usize,

    /// Where the latest portrait was written
    pub last_saved: Option<PathBuf>,

    /// Spinner frame while generating
    pub tick: usize,

    generator: Option<Arc<PortraitGenerator>>,
    done_tx: async_channel::Sender<GenerationDone>,
    done_rx: async_channel::Receiver<GenerationDone>,
}

impl App {
    pub fn new(config: Config, state: AppState) -> Self {
        let (done_tx, done_rx) = async_channel::bounded(1);
        Self {
            mode: AppMode::Main,
            config,
            state,
            input: String::new(),
            cursor_pos: 0,
            status_message: None,
            error_message: None,
            should_quit: false,
            config_changed: false,
            templates_selected: 0,
            last_saved: None,
            tick: 0,
            generator: None,
            done_tx,
            done_rx,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
        self.status_message = None;
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    pub fn selected_template_color(&self) -> ColorVariant {
        ColorVariant::all()[self.templates_selected % ColorVariant::all().len()]
    }

    /// Start editing `initial` in the input line
    pub fn begin_input(&mut self, mode: AppMode, initial: &str) {
        self.mode = mode;
        self.input = initial.to_string();
        self.cursor_pos = self.input.chars().count();
        self.clear_messages();
    }

    /// Leave input mode, returning what was typed
    pub fn take_input(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor_pos);
        self.input.insert(idx, c);
        self.cursor_pos += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let idx = self.byte_index(self.cursor_pos);
            self.input.remove(idx);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            let idx = self.byte_index(self.cursor_pos);
            self.input.remove(idx);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.input.chars().count() as isize;
        self.cursor_pos = (self.cursor_pos as isize + delta).clamp(0, len) as usize;
    }

    pub fn cursor_to_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    /// Load the photo at `path` as the new source image
    pub async fn load_photo(&mut self, path: &str) -> Result<()> {
        let image = UploadedImage::load(&expand_path(path)).await?;
        self.set_status(format!("Photo loaded: {}", image.preview));
        self.state.upload(image);
        Ok(())
    }

    /// Use the image at `path` as reference for `color` and remember it in config
    pub async fn load_template(&mut self, color: ColorVariant, path: &str) -> Result<()> {
        let image = UploadedImage::load(&expand_path(path)).await?;
        let path = tokio::fs::canonicalize(&image.path)
            .await
            .with_context(|| format!("Template image not found: {}", image.path.display()))?;
        self.state.replace_template(color, image.data_url);
        self.config
            .templates
            .set_path(color, Some(path.display().to_string()));
        self.config_changed = true;
        self.set_status(format!("{} template updated", color));
        Ok(())
    }

    pub fn clear_template(&mut self, color: ColorVariant) {
        self.state.templates.clear(color);
        self.config.templates.set_path(color, None);
        self.config_changed = true;
        self.set_status(format!("{} template cleared", color));
    }

    /// Write the current template map to the output directory
    pub async fn export_templates(&mut self) -> Result<PathBuf> {
        let source = self.state.templates.export_source()?;
        let dir = PathBuf::from(&self.config.output.directory);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join("templates.toml");
        tokio::fs::write(&path, source).await?;
        Ok(path)
    }

    fn generator(&mut self) -> Result<Arc<PortraitGenerator>, PortraitError> {
        if let Some(generator) = &self.generator {
            return Ok(generator.clone());
        }
        let generator = Arc::new(
            PortraitGenerator::new(GeminiClient::from_config(&self.config)?)
                .with_model(&self.config.api.model),
        );
        self.generator = Some(generator.clone());
        Ok(generator)
    }

    /// Kick off a generation in the background; the result arrives via [`Self::poll_generation`]
    pub fn start_generation(&mut self) {
        if self.generator.as_ref().is_some_and(|g| g.is_busy()) {
            self.set_error(PortraitError::GenerationInProgress.to_string());
            return;
        }

        let request = match self.state.begin_generation() {
            Ok(request) => request,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };

        let generator = match self.generator() {
            Ok(generator) => generator,
            Err(e) => {
                let result = Err(e);
                self.state.finish_generation(&result);
                self.set_error(self.state.generation.error.clone().unwrap_or_default());
                return;
            }
        };

        self.last_saved = None;
        self.set_status(format!("Generating {} hoodie portrait...", request.color.as_str()));

        let output_dir = PathBuf::from(&self.config.output.directory);
        let tx = self.done_tx.clone();

        tokio::spawn(async move {
            let result = generator
                .generate(
                    &request.subject,
                    request.reference.as_deref(),
                    request.color,
                    &request.adjustment,
                )
                .await;

            let saved = match &result {
                Ok(image) => Some(
                    save_portrait(image, &output_dir, &new_portrait_id(), request.color, Utc::now())
                        .await
                        .map_err(|e| format!("{:#}", e)),
                ),
                Err(_) => None,
            };

            if tx.send(GenerationDone { result, saved }).await.is_err() {
                tracing::debug!("TUI closed before generation finished");
            }
        });
    }

    /// Pick up a finished generation, if any
    pub fn poll_generation(&mut self) {
        let Ok(done) = self.done_rx.try_recv() else {
            return;
        };
        self.finish_generation(done);
    }

    pub fn finish_generation(&mut self, done: GenerationDone) {
        self.state.finish_generation(&done.result);

        match (&done.result, done.saved) {
            (Ok(_), Some(Ok(path))) => {
                self.set_status(format!("Portrait saved: {}", path.display()));
                self.last_saved = Some(path);
            }
            (Ok(_), Some(Err(e))) => self.set_error(format!("Saving failed: {}", e)),
            (Ok(_), None) => self.set_status("Portrait generated"),
            (Err(e), _) => self.set_error(e.to_string()),
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    Path::new(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default(), AppState::default())
    }

    #[test]
    fn input_editing_is_char_aware() {
        let mut app = app();
        app.begin_input(AppMode::AdjustInput, "café");
        assert_eq!(app.cursor_pos, 4);

        app.delete_before_cursor();
        assert_eq!(app.input, "caf");
        app.move_cursor(-10);
        app.insert_char('ñ');
        assert_eq!(app.input, "ñcaf");
        app.delete_at_cursor();
        assert_eq!(app.input, "ñaf");
        app.cursor_to_end();
        assert_eq!(app.take_input(), "ñaf");
        assert_eq!(app.cursor_pos, 0);
    }

    #[test]
    fn generate_without_photo_reports_error() {
        let mut app = app();
        app.start_generation();
        assert!(!app.state.generation.is_generating);
        assert_eq!(
            app.error_message.as_deref(),
            Some(PortraitError::NoImageUploaded.to_string().as_str())
        );
    }

    #[test]
    fn generate_without_key_ends_loading_state() {
        let mut app = app();
        app.config.api.key = None;
        app.state.upload(UploadedImage {
            path: PathBuf::from("me.jpg"),
            preview: "me.jpg".to_string(),
            data_url: "data:image/jpeg;base64,AAA".to_string(),
        });

        app.start_generation();
        assert!(!app.state.generation.is_generating);
        assert!(app.error_message.unwrap().contains("API key not configured"));
    }

    #[test]
    fn finished_generation_updates_page() {
        let mut app = app();
        app.state.generation.is_generating = true;
        app.finish_generation(GenerationDone {
            result: Ok("data:image/png;base64,CCC".to_string()),
            saved: Some(Ok(PathBuf::from("out/portrait.png"))),
        });
        assert_eq!(
            app.state.generation.result_image.as_deref(),
            Some("data:image/png;base64,CCC")
        );
        assert_eq!(app.last_saved, Some(PathBuf::from("out/portrait.png")));
        assert!(!app.state.generation.is_generating);

        app.finish_generation(GenerationDone {
            result: Err(PortraitError::NoImageProduced),
            saved: None,
        });
        assert_eq!(app.error_message.as_deref(), Some("No image generated."));
    }

    #[tokio::test]
    async fn template_load_updates_state_and_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let path = dir.path().join("black.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        let typed = dir.path().join("sub").join("..").join("black.png");

        let mut app = app();
        app.load_template(ColorVariant::Black, typed.to_str().unwrap())
            .await
            .unwrap();
        assert!(app.state.templates.get(ColorVariant::Black).is_some());

        let stored = app.config.templates.black.clone().unwrap();
        assert!(Path::new(&stored).is_absolute());
        assert!(!stored.contains(".."));
        assert_eq!(
            stored,
            std::fs::canonicalize(&path).unwrap().display().to_string()
        );
        assert!(app.config_changed);

        app.clear_template(ColorVariant::Black);
        assert!(app.state.templates.get(ColorVariant::Black).is_none());
        assert!(app.config.templates.black.is_none());
    }
}
