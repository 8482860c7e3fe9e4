pub type SketchreelResult<T> = Result<T, SketchreelError>;

#[derive(thiserror::Error, Debug)]
pub enum SketchreelError {
    /// Caller input is missing, contradictory or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image, font or SVG bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A drawing surface could not be created.
    #[error("surface error: {0}")]
    Surface(String),

    /// The capture session or its encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchreelError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
