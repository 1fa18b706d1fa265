//! Error types for the volume engine

use thiserror::Error;

/// Failures inside a volume strategy
///
/// These never reach callers of `VolumeEngine::apply_volume`; they only decide
/// which strategy of the chain takes effect.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No audio-processing context can be constructed on this page
    #[error("Audio context unavailable: {0}")]
    ContextUnavailable(String),

    /// The element could not be routed through a gain stage
    #[error("Audio graph construction failed: {0}")]
    GraphConstruction(String),

    /// The element rejected a native volume write
    #[error("Native volume rejected: {0}")]
    NativeVolume(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
