//! Persisted settings and page messages

mod message;
mod profile;

pub use message::{DebugSnapshot, ElementDebugInfo, PageMessage, PageResponse, VolumeAck};
pub use profile::{
    DomainProfiles, ProfileEntry, StoredSettings, VolumeProfile, DEFAULT_CUSTOM_BUTTONS,
    DEFAULT_GLOBAL_VOLUME, UNITY_PERCENT,
};
