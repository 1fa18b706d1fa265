//! Page agent - one per document
//!
//! Owns the page's volume engine and exposes the hooks the platform shell
//! wires to browser events: incoming messages, structural mutations, the
//! delayed initial application and the post-load re-application.

use crate::{
    backend::AudioBackend,
    element::MediaDocument,
    engine::VolumeEngine,
    table::ElementTable,
};
use soundmaster_core::{PageMessage, PageResponse, VolumeAck};
use tracing::{debug, info};

pub struct PageAgent<D, B, T>
where
    D: MediaDocument,
    B: AudioBackend<Element = D::Element>,
{
    document: D,
    engine: VolumeEngine<B, T>,
}

impl<D, B, T> PageAgent<D, B, T>
where
    D: MediaDocument,
    B: AudioBackend<Element = D::Element>,
    T: ElementTable<D::Element, B::Node>,
{
    pub fn new(document: D, engine: VolumeEngine<B, T>) -> Self {
        Self { document, engine }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn engine(&self) -> &VolumeEngine<B, T> {
        &self.engine
    }

    pub fn current_volume(&self) -> u32 {
        self.engine.current_volume()
    }

    /// Adopt the volume resolved for this page as the target
    ///
    /// Elements inserted from now on get it; elements already present wait for
    /// the first [`apply_to_all`](Self::apply_to_all).
    pub fn adopt_resolved_volume(&mut self, percent: u32) {
        info!("Page target volume resolved to {percent}%");
        self.engine.set_current_volume(percent);
    }

    /// Apply `percent` to every media element in the document
    ///
    /// Returns the number of media elements found.
    pub fn apply_to_all(&mut self, percent: u32) -> usize {
        let elements = self.document.media_elements();
        self.engine.apply_to_all(&elements, percent);
        elements.len()
    }

    /// Dispatch a message from the control panel
    pub fn handle_message(&mut self, message: PageMessage) -> PageResponse {
        match message {
            PageMessage::SetVolume { volume } => {
                let count = self.apply_to_all(volume);
                debug!("Applied {volume}% to {count} media elements");
                PageResponse::VolumeApplied(VolumeAck::applied(volume))
            }
            PageMessage::DebugInfo => {
                let elements = self.document.media_elements();
                PageResponse::DebugInfo(self.engine.debug_snapshot(&elements))
            }
        }
    }

    /// Structural mutation hook: handle media elements never seen before
    pub fn on_nodes_added(&mut self) -> usize {
        let elements = self.document.media_elements();
        let applied = self.engine.apply_to_unseen(&elements);
        if applied > 0 {
            debug!("Discovered {applied} new media elements");
        }
        applied
    }

    /// Post-load hook: re-apply the current target to catch late media sources
    ///
    /// Does nothing on pages without media.
    pub fn on_load_settled(&mut self) -> usize {
        let elements = self.document.media_elements();
        if elements.is_empty() {
            return 0;
        }
        let target = self.engine.current_volume();
        self.engine.apply_to_all(&elements, target);
        elements.len()
    }
}
