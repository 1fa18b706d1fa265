//! Sound Master Core
//!
//! Platform-agnostic core types, traits, and error handling for Sound Master.
//!
//! Every execution context of the extension (background coordinator, per-page
//! agent, popup control panel) shares state only through an asynchronous
//! key-value store. This crate defines the vocabulary those contexts agree on:
//!
//! - **Persisted layout**: `StoredSettings`, `DomainProfiles`, `ProfileEntry`
//! - **Store contract**: `ProfileStore`, `SettingsPatch`, `StorageChanges`
//! - **Messages**: `PageMessage` / `PageResponse` between popup and page
//! - **Configuration**: `BoostConfig`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use soundmaster_core::{DomainProfiles, ProfileEntry, StoredSettings};
//!
//! let mut profiles = DomainProfiles::default();
//! profiles.upsert("example.com", 150, 1_700_000_000_000);
//!
//! let settings = StoredSettings {
//!     domain_profiles: profiles,
//!     ..StoredSettings::default()
//! };
//! assert_eq!(settings.global_volume, 100);
//! assert_eq!(
//!     settings.domain_profiles.get("example.com"),
//!     Some(&ProfileEntry { volume: 150, created_at: 1_700_000_000_000 })
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

pub use config::{BoostConfig, SnapSettings, TimingSettings};
pub use error::{CoreError, Result};
pub use storage::{
    ChangeListener, SettingsPatch, StorageArea, StorageChange, StorageChanges, StorageKey,
};
pub use traits::{Clock, ProfileStore};
pub use types::{
    DebugSnapshot, DomainProfiles, ElementDebugInfo, PageMessage, PageResponse, ProfileEntry,
    StoredSettings, VolumeAck, VolumeProfile, DEFAULT_CUSTOM_BUTTONS, DEFAULT_GLOBAL_VOLUME,
    UNITY_PERCENT,
};
