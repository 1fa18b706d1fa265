//! Sound Master - Settings Resolution & Synchronization
//!
//! Decides which volume applies to a page and keeps the background, the
//! control panel and the page agents consistent through the shared store.
//!
//! This crate provides:
//! - Domain normalization and two-level profile resolution
//! - Slider quantization to multiples of 50
//! - A background [`Coordinator`] whose cache follows store notifications
//! - The [`ControlPanel`] state machine bound to the active tab
//! - Panel to page delivery with one injection retry
//! - An in-memory [`MemoryStore`] for tests and headless use
//!
//! # Example
//!
//! ```rust
//! use soundmaster_core::{DomainProfiles, StoredSettings};
//! use soundmaster_settings::{resolve, PageDomain, VolumeSource};
//!
//! let mut profiles = DomainProfiles::default();
//! profiles.upsert("example.com", 150, 0);
//!
//! let page = PageDomain::from_url("https://m.example.com/watch");
//! let effective = resolve(&page, StoredSettings::default().global_volume, &profiles);
//!
//! assert_eq!(effective.percent, 150);
//! assert!(matches!(effective.source, VolumeSource::ParentProfile(_)));
//! ```

mod coordinator;
mod delivery;
mod domain;
mod error;
mod panel;
mod quantize;
mod resolve;
mod store;

// Public exports
pub use coordinator::{CachedState, Coordinator, InstallReason};
pub use delivery::{deliver, DeliveryError, DeliveryOutcome, TabChannel};
pub use domain::{Domain, PageDomain};
pub use error::{Result, SettingsError};
pub use panel::ControlPanel;
pub use quantize::snap_volume;
pub use resolve::{load_page_volume, resolve, EffectiveVolume, VolumeSource};
pub use store::MemoryStore;
