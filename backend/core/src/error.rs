use thiserror::Error;

/// Top-level error type for the TractStack content engine.
///
/// Compilation and evaluation never fail on malformed content; these
/// errors only surface where raw JSON input is decoded.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid element tree: {0}")]
    InvalidTree(String),

    #[error("invalid belief data: {0}")]
    InvalidBeliefs(String),
}
