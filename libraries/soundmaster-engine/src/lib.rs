//! Sound Master - Volume Control Engine
//!
//! Platform-agnostic volume control for the media elements of one page.
//!
//! This crate provides:
//! - Per-element volume from 0% to 300% and beyond
//! - Lazily built audio graph (`source -> gain -> destination`) per element
//! - Ordered degrade chain: gain stage first, clamped native volume last
//! - Identity-keyed element table that never keeps elements alive
//! - Discovery of elements inserted after the initial application
//! - Page agent dispatching control-panel messages
//!
//! # Architecture
//!
//! `soundmaster-engine` never touches the browser directly. The platform
//! supplies media elements, the document and the audio graph through the
//! [`MediaElement`], [`MediaDocument`] and [`AudioBackend`] traits; the
//! [`simulated`] module implements them in memory.
//!
//! # Example
//!
//! ```rust
//! use soundmaster_engine::simulated::{
//!     simulated_agent, SimulatedAudio, SimulatedDocument, SimulatedElement,
//! };
//! use soundmaster_core::PageMessage;
//!
//! let video = SimulatedElement::video("https://cdn.example.com/clip.mp4", 0.8);
//! let document = SimulatedDocument::with_elements(vec![video.clone()]);
//! let mut agent = simulated_agent(document, SimulatedAudio::new());
//!
//! agent.handle_message(PageMessage::SetVolume { volume: 250 });
//!
//! // Native volume stays at the original, the gain node carries the boost
//! let loudness = agent.engine().perceived_loudness(&video);
//! assert!((loudness - 2.0).abs() < 1e-6);
//! ```

mod agent;
mod backend;
mod element;
mod engine;
mod error;
pub mod simulated;
mod strategy;
mod table;

// Public exports
pub use agent::PageAgent;
pub use backend::{AudioBackend, ContextState, GainStage};
pub use element::{MediaDocument, MediaElement};
pub use engine::VolumeEngine;
pub use error::{EngineError, Result};
pub use strategy::{clamped_native_volume, gain_for_percent, AppliedVolume, VolumeStrategy};
pub use table::{ElementTable, SharedElement, WeakElementTable};
