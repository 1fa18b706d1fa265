//! Volume engine - per-page orchestration
//!
//! Makes every media element's perceived loudness equal to
//! `original_volume * percent / 100`, using a gain stage for anything the
//! element cannot reach natively and degrading to clamped native volume when
//! no gain stage is available.

use crate::{
    backend::{AudioBackend, ContextState, GainStage},
    element::MediaElement,
    error::Result,
    strategy::{clamped_native_volume, gain_for_percent, AppliedVolume, VolumeStrategy},
    table::ElementTable,
};
use soundmaster_core::{DebugSnapshot, ElementDebugInfo, UNITY_PERCENT};
use tracing::{debug, warn};

/// Volume engine owning one page's audio graph and element table
pub struct VolumeEngine<B: AudioBackend, T> {
    backend: B,
    table: T,

    /// Target percent applied to elements discovered later
    current_volume: u32,

    /// Strategies tried in order for any target other than 100%
    strategies: Vec<VolumeStrategy>,
}

impl<B, T> VolumeEngine<B, T>
where
    B: AudioBackend,
    T: ElementTable<B::Element, B::Node>,
{
    /// Create an engine targeting 100%
    pub fn new(backend: B, table: T) -> Self {
        Self {
            backend,
            table,
            current_volume: UNITY_PERCENT,
            strategies: VolumeStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Replace the strategy order
    ///
    /// Native clamping always runs after the listed strategies if none succeeded.
    pub fn with_strategies(mut self, strategies: Vec<VolumeStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn current_volume(&self) -> u32 {
        self.current_volume
    }

    /// Set the target used for newly discovered elements without touching existing ones
    pub fn set_current_volume(&mut self, percent: u32) {
        self.current_volume = percent;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Whether the engine has already captured this element's original volume
    pub fn has_seen(&self, element: &B::Element) -> bool {
        self.table.original_volume(element).is_some()
    }

    /// Apply `percent` to one element
    ///
    /// Never fails: every error degrades to clamped native volume, which is
    /// always inside the element's valid range.
    pub fn apply_volume(&mut self, element: &B::Element, percent: u32) -> AppliedVolume {
        if !element.has_adjustable_volume() {
            return AppliedVolume::Skipped;
        }

        let original = self.capture_original(element);

        if percent == UNITY_PERCENT {
            // Keep any graph; resetting its gain is cheaper than rebuilding
            if let Err(error) = element.set_volume(original) {
                warn!("Failed to restore original volume {original}: {error}");
            }
            if let Some(node) = self.table.gain_node(element) {
                node.set_gain(1.0);
            }
            return AppliedVolume::Unity;
        }

        let strategies = self.strategies.clone();
        for strategy in strategies {
            match self.try_strategy(strategy, element, original, percent) {
                Ok(applied) => return applied,
                Err(error) => {
                    debug!("{strategy:?} unavailable for {}: {error}", element.tag_name());
                }
            }
        }

        self.apply_native(element, original, percent)
    }

    /// Record `percent` as the page target and apply it to every element
    ///
    /// Idempotent: repeating the call with the same percent leaves the same state.
    pub fn apply_to_all(&mut self, elements: &[B::Element], percent: u32) -> Vec<AppliedVolume> {
        self.current_volume = percent;
        self.table.prune();
        elements
            .iter()
            .map(|element| self.apply_volume(element, percent))
            .collect()
    }

    /// Apply the current target to elements the engine has never seen
    ///
    /// Already-seen elements keep whatever was last applied to them.
    /// Returns how many elements were newly handled.
    pub fn apply_to_unseen(&mut self, elements: &[B::Element]) -> usize {
        let target = self.current_volume;
        let mut applied = 0;
        for element in elements {
            if !self.has_seen(element) && element.has_adjustable_volume() {
                self.apply_volume(element, target);
                applied += 1;
            }
        }
        applied
    }

    /// Loudness the element actually produces: native volume times gain
    pub fn perceived_loudness(&self, element: &B::Element) -> f64 {
        let gain = self
            .table
            .gain_node(element)
            .map_or(1.0, |node| f64::from(node.gain()));
        element.volume() * gain
    }

    /// Diagnostics for the given elements
    pub fn debug_snapshot(&self, elements: &[B::Element]) -> DebugSnapshot {
        let infos: Vec<ElementDebugInfo> = elements
            .iter()
            .map(|element| {
                let node = self.table.gain_node(element);
                ElementDebugInfo {
                    tag_name: element.tag_name(),
                    src: element.source(),
                    volume: element.volume(),
                    muted: element.is_muted(),
                    original_volume: self.table.original_volume(element),
                    has_gain_node: node.is_some(),
                    gain_value: node.map(|node| node.gain()),
                }
            })
            .collect();

        DebugSnapshot {
            current_volume: self.current_volume,
            media_count: elements.len(),
            audio_context_state: self.backend.context_state().to_string(),
            gain_nodes_count: infos.iter().filter(|info| info.has_gain_node).count(),
            elements: infos,
        }
    }

    fn capture_original(&mut self, element: &B::Element) -> f64 {
        if let Some(original) = self.table.original_volume(element) {
            return original;
        }
        let original = element.volume();
        self.table.capture_original_volume(element, original);
        original
    }

    fn try_strategy(
        &mut self,
        strategy: VolumeStrategy,
        element: &B::Element,
        original: f64,
        percent: u32,
    ) -> Result<AppliedVolume> {
        match strategy {
            VolumeStrategy::WebAudioGain => self.apply_gain(element, original, percent),
            VolumeStrategy::NativeClamped => Ok(self.apply_native(element, original, percent)),
        }
    }

    fn apply_gain(
        &mut self,
        element: &B::Element,
        original: f64,
        percent: u32,
    ) -> Result<AppliedVolume> {
        self.backend.ensure_context()?;

        if self.backend.context_state() == ContextState::Suspended {
            self.backend.resume_context();
        }

        let node = match self.table.gain_node(element) {
            Some(node) => node,
            None => {
                let node = self.backend.connect(element)?;
                self.table.attach_gain_node(element, node.clone());
                node
            }
        };

        element.set_volume(original)?;
        let gain = gain_for_percent(percent);
        node.set_gain(gain);
        Ok(AppliedVolume::Gain { gain })
    }

    fn apply_native(&self, element: &B::Element, original: f64, percent: u32) -> AppliedVolume {
        let volume = clamped_native_volume(original, percent);

        // A graph left at another multiplier would scale the native value
        if let Some(node) = self.table.gain_node(element) {
            node.set_gain(1.0);
        }

        if let Err(error) = element.set_volume(volume) {
            warn!("Native volume {volume} rejected: {error}");
        }
        AppliedVolume::Native { volume }
    }
}
