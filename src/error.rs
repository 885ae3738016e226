//! Error kinds for configuration, rendering and encoding.

pub type ProgressResult<T> = Result<T, ProgressError>;

#[derive(thiserror::Error, Debug)]
pub enum ProgressError {
    #[error("config error: {0}")]
    Config(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl ProgressError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}
