//! Settings-specific errors

use thiserror::Error;

/// Result type alias using `SettingsError`
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The active page has no usable domain, so nothing may be stored under it
    #[error("Active page has no resolvable domain")]
    UnresolvedDomain,

    /// Quick-button slot outside the three editable buttons
    #[error("Quick button index out of bounds: {0}")]
    ButtonIndex(usize),

    /// Quick-button value outside the accepted range
    #[error("Quick button value {value} outside 1..={max}")]
    ButtonValue { value: u32, max: u32 },

    /// Error from the store or the shared layout
    #[error(transparent)]
    Core(#[from] soundmaster_core::CoreError),
}
