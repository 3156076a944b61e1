use thiserror::Error;

/// Errors raised by the render layer.
///
/// Document shape problems never surface here; they degrade to empty output.
/// Only caller-supplied inputs with the wrong JSON type are rejected.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
