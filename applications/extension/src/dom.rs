//! DOM and Web Audio implementations of the engine traits

use crate::chrome::error_message;
use js_sys::{Object, WeakMap};
use soundmaster_engine::{
    AudioBackend, ContextState, ElementTable, EngineError, GainStage, MediaDocument, MediaElement,
};
use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AudioContext, AudioContextState, Document, GainNode, HtmlMediaElement};

const MEDIA_SELECTOR: &str = "video, audio";

/// `<video>` or `<audio>` element of the page
#[derive(Debug, Clone)]
pub struct DomMediaElement(HtmlMediaElement);

impl DomMediaElement {
    fn key(&self) -> &Object {
        self.0.as_ref()
    }
}

impl MediaElement for DomMediaElement {
    fn has_adjustable_volume(&self) -> bool {
        true
    }

    fn volume(&self) -> f64 {
        self.0.volume()
    }

    fn set_volume(&self, volume: f64) -> soundmaster_engine::Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(EngineError::NativeVolume(format!(
                "{volume} outside 0.0..=1.0"
            )));
        }
        self.0.set_volume(volume);
        Ok(())
    }

    fn is_muted(&self) -> bool {
        self.0.muted()
    }

    fn tag_name(&self) -> String {
        self.0.tag_name()
    }

    fn source(&self) -> String {
        let current = self.0.current_src();
        if current.is_empty() {
            self.0.src()
        } else {
            current
        }
    }
}

/// The document the content script runs in
pub struct PageDocument {
    document: Document,
}

impl PageDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl MediaDocument for PageDocument {
    type Element = DomMediaElement;

    fn media_elements(&self) -> Vec<DomMediaElement> {
        let nodes = match self.document.query_selector_all(MEDIA_SELECTOR) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Media query failed: {}", error_message(&e));
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<HtmlMediaElement>().ok())
            .map(DomMediaElement)
            .collect()
    }
}

/// Gain node of one element's graph
#[derive(Debug, Clone)]
pub struct DomGain(GainNode);

impl GainStage for DomGain {
    fn gain(&self) -> f32 {
        self.0.gain().value()
    }

    fn set_gain(&self, gain: f32) {
        self.0.gain().set_value(gain);
    }
}

/// Web Audio graph of the page, with a lazily created shared context
#[derive(Default)]
pub struct WebAudioBackend {
    context: Option<AudioContext>,
}

fn graph_error(error: JsValue) -> EngineError {
    EngineError::GraphConstruction(error_message(&error))
}

impl AudioBackend for WebAudioBackend {
    type Element = DomMediaElement;
    type Node = DomGain;

    fn ensure_context(&mut self) -> soundmaster_engine::Result<()> {
        if self.context.is_none() {
            let context = AudioContext::new()
                .map_err(|e| EngineError::ContextUnavailable(error_message(&e)))?;
            info!("Created audio context");
            self.context = Some(context);
        }
        Ok(())
    }

    fn context_state(&self) -> ContextState {
        match &self.context {
            None => ContextState::NotCreated,
            Some(context) => match context.state() {
                AudioContextState::Suspended => ContextState::Suspended,
                AudioContextState::Running => ContextState::Running,
                _ => ContextState::Closed,
            },
        }
    }

    fn resume_context(&self) {
        let Some(context) = &self.context else {
            return;
        };

        match context.resume() {
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    debug!("Audio context did not resume: {}", error_message(&e));
                }
            }),
            Err(e) => debug!("Audio context resume refused: {}", error_message(&e)),
        }
    }

    fn connect(&mut self, element: &DomMediaElement) -> soundmaster_engine::Result<DomGain> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| EngineError::ContextUnavailable("context not created".to_string()))?;

        // Throws when the element already feeds another graph
        let source = context.create_media_element_source(&element.0).map_err(graph_error)?;
        let gain = context.create_gain().map_err(graph_error)?;

        source.connect_with_audio_node(&gain).map_err(graph_error)?;
        gain.connect_with_audio_node(&context.destination()).map_err(graph_error)?;

        Ok(DomGain(gain))
    }
}

/// Element state held in `WeakMap`s, so entries die with their elements
pub struct JsElementTable {
    originals: WeakMap,
    gains: WeakMap,
}

impl Default for JsElementTable {
    fn default() -> Self {
        Self {
            originals: WeakMap::new(),
            gains: WeakMap::new(),
        }
    }
}

impl ElementTable<DomMediaElement, DomGain> for JsElementTable {
    fn original_volume(&self, element: &DomMediaElement) -> Option<f64> {
        self.originals.get(element.key()).as_f64()
    }

    fn capture_original_volume(&mut self, element: &DomMediaElement, volume: f64) {
        if !self.originals.has(element.key()) {
            self.originals.set(element.key(), &JsValue::from_f64(volume));
        }
    }

    fn gain_node(&self, element: &DomMediaElement) -> Option<DomGain> {
        self.gains
            .get(element.key())
            .dyn_into::<GainNode>()
            .ok()
            .map(DomGain)
    }

    fn attach_gain_node(&mut self, element: &DomMediaElement, node: DomGain) {
        self.gains.set(element.key(), &node.0);
    }
}
