pub mod chunk;
pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod logging;
pub mod merger;
pub mod project_layout;
pub mod proxy;
pub mod tts;
