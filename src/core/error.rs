use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortraitError {
    #[error("API key not configured. Set GEMINI_API_KEY environment variable or run: hoodie config set api.key <your-key>")]
    MissingApiKey,

    #[error("No photo uploaded. Choose a portrait photo first")]
    NoImageUploaded,

    #[error("A portrait is already being generated")]
    GenerationInProgress,

    #[error("No image generated.")]
    NoImageProduced,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Unknown hoodie color '{0}'. Valid colors: green, black, white")]
    UnknownColor(String),
}

impl From<serde_json::Error> for PortraitError {
    fn from(err: serde_json::Error) -> Self {
        PortraitError::InvalidResponse(err.to_string())
    }
}
