//! Application state owned by a single controller (the CLI command or the TUI).

use anyhow::{Context, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::color::ColorVariant;
use super::data_url;
use super::error::PortraitError;
use super::templates::TemplateStore;

/// The user's source photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Original file
    pub path: PathBuf,
    /// Displayable reference for the photo
    pub preview: String,
    /// Encoded photo, `data:<mime>;base64,...`
    pub data_url: String,
}

impl UploadedImage {
    /// Read an image file into a data URL
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            preview: path.display().to_string(),
            data_url: data_url::from_bytes(sniff_mime(path, &bytes), &bytes),
        })
    }

    pub fn mime_type(&self) -> String {
        data_url::decode(&self.data_url).mime_type
    }
}

/// MIME type from the file's magic bytes, falling back to its extension
fn sniff_mime(path: &Path, bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        _ => data_url::mime_for_path(path),
    }
}

/// Outcome of the latest generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationState {
    pub is_generating: bool,
    pub result_image: Option<String>,
    pub error: Option<String>,
}

/// Snapshot of everything one generation call needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub subject: String,
    pub reference: Option<String>,
    pub color: ColorVariant,
    pub adjustment: String,
}

/// Everything the portrait page holds between user actions
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub uploaded: Option<UploadedImage>,
    pub color: ColorVariant,
    pub adjustment: String,
    pub templates: TemplateStore,
    pub generation: GenerationState,
}

impl AppState {
    pub fn new(templates: TemplateStore) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }

    /// Replace the source photo
    pub fn upload(&mut self, image: UploadedImage) {
        tracing::debug!("Photo selected: {}", image.preview);
        self.uploaded = Some(image);
    }

    pub fn select_color(&mut self, color: ColorVariant) {
        self.color = color;
    }

    pub fn set_adjustment(&mut self, adjustment: impl Into<String>) {
        self.adjustment = adjustment.into();
    }

    pub fn replace_template(&mut self, color: ColorVariant, data_url: impl Into<String>) {
        self.templates.set(color, data_url);
    }

    /// Reference image for the currently selected color
    pub fn current_template(&self) -> Option<&str> {
        self.templates.get(self.color)
    }

    /// What a generation started now would send
    pub fn request(&self) -> Result<GenerationRequest, PortraitError> {
        let uploaded = self.uploaded.as_ref().ok_or(PortraitError::NoImageUploaded)?;
        Ok(GenerationRequest {
            subject: uploaded.data_url.clone(),
            reference: self.current_template().map(str::to_string),
            color: self.color,
            adjustment: self.adjustment.clone(),
        })
    }

    /// Enter the loading state and hand back the request to send
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, PortraitError> {
        if self.generation.is_generating {
            return Err(PortraitError::GenerationInProgress);
        }
        let request = self.request()?;
        self.generation = GenerationState {
            is_generating: true,
            result_image: None,
            error: None,
        };
        Ok(request)
    }

    /// Record the result of the call started by [`Self::begin_generation`]
    pub fn finish_generation(&mut self, result: &Result<String, PortraitError>) {
        self.generation = match result {
            Ok(image) => GenerationState {
                is_generating: false,
                result_image: Some(image.clone()),
                error: None,
            },
            Err(e) => GenerationState {
                is_generating: false,
                result_image: None,
                error: Some(e.to_string()),
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded() -> UploadedImage {
        UploadedImage {
            path: PathBuf::from("me.jpg"),
            preview: "me.jpg".to_string(),
            data_url: "data:image/jpeg;base64,AAA".to_string(),
        }
    }

    #[test]
    fn generation_needs_a_photo() {
        let mut state = AppState::default();
        assert!(matches!(
            state.begin_generation(),
            Err(PortraitError::NoImageUploaded)
        ));
        assert!(!state.generation.is_generating);
    }

    #[test]
    fn request_uses_template_of_selected_color_at_call_time() {
        let mut state = AppState::default();
        state.upload(uploaded());
        state.replace_template(ColorVariant::Black, "data:image/png;base64,BBB");

        assert_eq!(state.request().unwrap().reference, None);

        state.select_color(ColorVariant::Black);
        state.set_adjustment("brighter lighting");
        let request = state.begin_generation().unwrap();
        assert_eq!(request.subject, "data:image/jpeg;base64,AAA");
        assert_eq!(request.reference.as_deref(), Some("data:image/png;base64,BBB"));
        assert_eq!(request.color, ColorVariant::Black);
        assert_eq!(request.adjustment, "brighter lighting");
        assert!(state.generation.is_generating);
    }

    #[test]
    fn second_begin_while_loading_is_refused() {
        let mut state = AppState::default();
        state.upload(uploaded());
        state.begin_generation().unwrap();
        assert!(matches!(
            state.begin_generation(),
            Err(PortraitError::GenerationInProgress)
        ));
    }

    #[test]
    fn finish_records_result_or_message() {
        let mut state = AppState::default();
        state.upload(uploaded());

        state.begin_generation().unwrap();
        state.finish_generation(&Err(PortraitError::NoImageProduced));
        assert_eq!(state.generation.error.as_deref(), Some("No image generated."));
        assert!(state.generation.result_image.is_none());

        state.begin_generation().unwrap();
        assert!(state.generation.error.is_none());
        state.finish_generation(&Ok("data:image/png;base64,CCC".to_string()));
        assert_eq!(
            state.generation,
            GenerationState {
                is_generating: false,
                result_image: Some("data:image/png;base64,CCC".to_string()),
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn load_sniffs_png_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        std::fs::write(&path, png_header).unwrap();

        let image = UploadedImage::load(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(data_url::to_bytes(&image.data_url).unwrap(), png_header.to_vec());
        assert_eq!(image.path, path);
    }

    #[tokio::test]
    async fn load_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.webp");
        std::fs::write(&path, b"not really an image").unwrap();

        let image = UploadedImage::load(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/webp");
    }

    #[tokio::test]
    async fn load_missing_file_fails() {
        assert!(UploadedImage::load(Path::new("/definitely/not/here.png"))
            .await
            .is_err());
    }
}
