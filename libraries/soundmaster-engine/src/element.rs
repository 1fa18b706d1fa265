//! Platform-agnostic media element and document traits
//!
//! The browser implementation wraps `HTMLMediaElement` and `document`; tests
//! use the simulated page from [`crate::simulated`].

use crate::error::Result;

/// A media element with a native volume in `0.0..=1.0`
///
/// Handles are cheap clones referring to the same underlying element.
pub trait MediaElement: Clone {
    /// Whether the element exposes a writable volume at all
    fn has_adjustable_volume(&self) -> bool;

    /// Current native volume
    fn volume(&self) -> f64;

    /// Write the native volume
    ///
    /// Callers only pass values inside `0.0..=1.0`.
    fn set_volume(&self, volume: f64) -> Result<()>;

    fn is_muted(&self) -> bool;

    /// Upper-case tag name (`VIDEO`, `AUDIO`)
    fn tag_name(&self) -> String;

    /// Current media source, falling back to the declared `src`
    fn source(&self) -> String;
}

/// The page content tree, as far as the engine cares
pub trait MediaDocument {
    type Element: MediaElement;

    /// Every media element presently in the document, in document order
    fn media_elements(&self) -> Vec<Self::Element>;
}
