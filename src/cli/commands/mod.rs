pub mod config;
pub mod portrait;
pub mod templates;
