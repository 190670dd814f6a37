//! Error types for the annotation engine
//!
//! Every error here is locally recoverable. Callers log and continue;
//! nothing in the engine treats one of these as fatal.

/// Errors produced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Page index outside `[0, count)`
    #[error("invalid page index {index} (page count: {count})")]
    InvalidPageIndex { index: usize, count: usize },

    /// Rotation that is not a multiple of 90 degrees
    #[error("invalid rotation {0} (expected a multiple of 90 degrees)")]
    InvalidRotation(i32),

    /// Margin scale outside `(0, 1]`
    #[error("invalid margin scale {0} (expected a value in (0, 1])")]
    InvalidScale(f32),

    /// Zoom that is not finite and positive
    #[error("invalid zoom {0}")]
    InvalidZoom(f32),

    /// Surface expansion factor below 1.0 or not finite
    #[error("invalid expansion factor {0} (expected a finite value >= 1.0)")]
    InvalidExpansionFactor(f32),

    /// Eraser radius that is negative or not finite
    #[error("invalid eraser radius {0} (expected a finite value >= 0)")]
    InvalidEraserRadius(f32),

    /// Page frame with zero or non-finite area
    #[error("page frame has no area")]
    DegenerateFrame,

    /// Stroke blob (de)serialization failure
    #[error("stroke blob codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Stroke blob written by a newer engine
    #[error("unsupported stroke blob version {0}")]
    UnsupportedBlobVersion(u32),

    /// Margin settings store failure
    #[error("margin settings store error: {0}")]
    MarginStore(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
