//! Audio-processing graph abstraction
//!
//! One backend instance per page owns at most one shared processing context,
//! created lazily on first use. Each media element can be routed through its
//! own gain stage: `element -> source -> gain -> destination`.

use crate::element::MediaElement;
use crate::error::Result;

/// Lifecycle of the shared processing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    NotCreated,
    Suspended,
    Running,
    Closed,
}

impl ContextState {
    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotCreated => "not created",
            Self::Suspended => "suspended",
            Self::Running => "running",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unbounded linear gain multiplier of one element's graph
///
/// Handles are cheap clones of the same node.
pub trait GainStage: Clone {
    fn gain(&self) -> f32;

    fn set_gain(&self, gain: f32);
}

/// Platform audio graph
pub trait AudioBackend {
    type Element: MediaElement;
    type Node: GainStage;

    /// Make sure the shared context exists, constructing it on first call
    ///
    /// Fails when the capability is absent or blocked. A failed attempt is not
    /// cached; the next call tries again.
    fn ensure_context(&mut self) -> Result<()>;

    fn context_state(&self) -> ContextState;

    /// Ask a suspended context to resume without waiting for it
    fn resume_context(&self);

    /// Route `element` through a new gain stage connected to the output
    ///
    /// Fails when the element is already bound to a conflicting graph.
    fn connect(&mut self, element: &Self::Element) -> Result<Self::Node>;
}
