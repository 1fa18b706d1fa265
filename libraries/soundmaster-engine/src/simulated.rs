//! In-memory page and audio graph
//!
//! Behaves like the browser objects the engine drives: native volume limited
//! to `0.0..=1.0`, a processing context that starts suspended, and elements
//! that can be routed into a graph only once.

use crate::{
    agent::PageAgent,
    backend::{AudioBackend, ContextState, GainStage},
    element::{MediaDocument, MediaElement},
    engine::VolumeEngine,
    error::{EngineError, Result},
    table::{SharedElement, WeakElementTable},
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Backing state of a simulated media element
#[derive(Debug)]
pub struct ElementCell {
    tag_name: String,
    src: RefCell<String>,
    volume: Cell<f64>,
    muted: Cell<bool>,
    adjustable: bool,
    bound_to_graph: Cell<bool>,
}

/// Handle to a simulated `<video>` or `<audio>` element
#[derive(Debug, Clone)]
pub struct SimulatedElement(Rc<ElementCell>);

impl SimulatedElement {
    fn with_tag(tag_name: &str, src: &str, volume: f64) -> Self {
        Self(Rc::new(ElementCell {
            tag_name: tag_name.to_string(),
            src: RefCell::new(src.to_string()),
            volume: Cell::new(volume),
            muted: Cell::new(false),
            adjustable: true,
            bound_to_graph: Cell::new(false),
        }))
    }

    pub fn video(src: &str, volume: f64) -> Self {
        Self::with_tag("VIDEO", src, volume)
    }

    pub fn audio(src: &str, volume: f64) -> Self {
        Self::with_tag("AUDIO", src, volume)
    }

    /// A media-like element without a writable volume
    pub fn without_volume(tag_name: &str) -> Self {
        Self(Rc::new(ElementCell {
            tag_name: tag_name.to_string(),
            src: RefCell::new(String::new()),
            volume: Cell::new(1.0),
            muted: Cell::new(false),
            adjustable: false,
            bound_to_graph: Cell::new(false),
        }))
    }

    /// Pretend another graph (e.g. the page's own player) already owns the element
    pub fn bind_elsewhere(&self) {
        self.0.bound_to_graph.set(true);
    }

    pub fn set_muted(&self, muted: bool) {
        self.0.muted.set(muted);
    }

    /// Swap the media source in place, without a structural mutation
    pub fn replace_source(&self, src: &str) {
        *self.0.src.borrow_mut() = src.to_string();
    }

    pub fn is_same(&self, other: &SimulatedElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> std::rc::Weak<ElementCell> {
        Rc::downgrade(&self.0)
    }
}

impl SharedElement for SimulatedElement {
    type Target = ElementCell;

    fn shared(&self) -> &Rc<ElementCell> {
        &self.0
    }
}

impl MediaElement for SimulatedElement {
    fn has_adjustable_volume(&self) -> bool {
        self.0.adjustable
    }

    fn volume(&self) -> f64 {
        self.0.volume.get()
    }

    fn set_volume(&self, volume: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(EngineError::NativeVolume(format!(
                "{volume} is outside the range [0, 1]"
            )));
        }
        self.0.volume.set(volume);
        Ok(())
    }

    fn is_muted(&self) -> bool {
        self.0.muted.get()
    }

    fn tag_name(&self) -> String {
        self.0.tag_name.clone()
    }

    fn source(&self) -> String {
        self.0.src.borrow().clone()
    }
}

/// Simulated document; clones share the same content tree
#[derive(Debug, Clone, Default)]
pub struct SimulatedDocument {
    elements: Rc<RefCell<Vec<SimulatedElement>>>,
}

impl SimulatedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(elements: Vec<SimulatedElement>) -> Self {
        Self {
            elements: Rc::new(RefCell::new(elements)),
        }
    }

    pub fn insert(&self, element: SimulatedElement) {
        self.elements.borrow_mut().push(element);
    }

    pub fn remove(&self, element: &SimulatedElement) {
        self.elements
            .borrow_mut()
            .retain(|existing| !existing.is_same(element));
    }
}

impl MediaDocument for SimulatedDocument {
    type Element = SimulatedElement;

    fn media_elements(&self) -> Vec<SimulatedElement> {
        self.elements.borrow().clone()
    }
}

/// Gain node whose multiplier can be read back
#[derive(Debug, Clone)]
pub struct SimulatedGain(Rc<Cell<f32>>);

impl GainStage for SimulatedGain {
    fn gain(&self) -> f32 {
        self.0.get()
    }

    fn set_gain(&self, gain: f32) {
        self.0.set(gain);
    }
}

/// Simulated processing context
#[derive(Debug)]
pub struct SimulatedAudio {
    available: bool,
    state: Cell<ContextState>,
    contexts_created: usize,
    connections: usize,
    resume_requests: Cell<usize>,
}

impl Default for SimulatedAudio {
    fn default() -> Self {
        Self {
            available: true,
            state: Cell::new(ContextState::NotCreated),
            contexts_created: 0,
            connections: 0,
            resume_requests: Cell::new(0),
        }
    }
}

impl SimulatedAudio {
    /// A context that can be created and starts suspended, as under autoplay rules
    pub fn new() -> Self {
        Self::default()
    }

    /// A page where no processing context can ever be constructed
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn contexts_created(&self) -> usize {
        self.contexts_created
    }

    pub fn connections(&self) -> usize {
        self.connections
    }

    pub fn resume_requests(&self) -> usize {
        self.resume_requests.get()
    }
}

impl AudioBackend for SimulatedAudio {
    type Element = SimulatedElement;
    type Node = SimulatedGain;

    fn ensure_context(&mut self) -> Result<()> {
        if !self.available {
            return Err(EngineError::ContextUnavailable(
                "audio processing is blocked on this page".to_string(),
            ));
        }
        if self.state.get() == ContextState::NotCreated {
            self.state.set(ContextState::Suspended);
            self.contexts_created += 1;
        }
        Ok(())
    }

    fn context_state(&self) -> ContextState {
        self.state.get()
    }

    fn resume_context(&self) {
        self.resume_requests.set(self.resume_requests.get() + 1);
        if self.state.get() == ContextState::Suspended {
            self.state.set(ContextState::Running);
        }
    }

    fn connect(&mut self, element: &SimulatedElement) -> Result<SimulatedGain> {
        if element.0.bound_to_graph.get() {
            return Err(EngineError::GraphConstruction(
                "element is already connected to another graph".to_string(),
            ));
        }
        element.0.bound_to_graph.set(true);
        self.connections += 1;
        Ok(SimulatedGain(Rc::new(Cell::new(1.0))))
    }
}

/// Page agent over the simulated page
pub type SimulatedAgent =
    PageAgent<SimulatedDocument, SimulatedAudio, WeakElementTable<ElementCell, SimulatedGain>>;

/// Build a page agent for `document` with the given audio capability
pub fn simulated_agent(document: SimulatedDocument, audio: SimulatedAudio) -> SimulatedAgent {
    PageAgent::new(document, VolumeEngine::new(audio, WeakElementTable::new()))
}
