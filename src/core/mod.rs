pub mod color;
pub mod data_url;
pub mod error;
pub mod output;
pub mod portrait;
pub mod prompt;
pub mod state;
pub mod templates;

pub use color::ColorVariant;
pub use error::PortraitError;
pub use portrait::{PortraitGenerator, DEFAULT_MODEL};
pub use state::{AppState, UploadedImage};
pub use templates::TemplateStore;
