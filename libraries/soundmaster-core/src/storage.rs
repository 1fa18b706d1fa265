//! Store contract shared by every execution context
//!
//! The store is an external asynchronous key-value map with change
//! notifications. Writes are partial (`SettingsPatch`) and every write, from
//! any context including the writer, produces a `StorageChanges` notification.

use crate::types::{DomainProfiles, StoredSettings};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Top-level keys of the persisted layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// `globalVolume`, the volume for pages without a profile
    GlobalVolume,
    /// `domainProfiles`, per-site overrides
    DomainProfiles,
    /// `customButtonValues`, the three editable quick buttons
    CustomButtonValues,
}

impl StorageKey {
    /// Every key, in layout order
    pub const ALL: [StorageKey; 3] = [
        StorageKey::GlobalVolume,
        StorageKey::DomainProfiles,
        StorageKey::CustomButtonValues,
    ];

    /// Key name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalVolume => "globalVolume",
            Self::DomainProfiles => "domainProfiles",
            Self::CustomButtonValues => "customButtonValues",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial view of the store: the result of a `get`, or the payload of a `set`
///
/// Absent fields are either not requested/not stored (`get`) or left untouched (`set`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// Global volume percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_volume: Option<u32>,

    /// Complete profile map; written whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_profiles: Option<DomainProfiles>,

    /// Quick-button values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_button_values: Option<[u32; 3]>,
}

impl SettingsPatch {
    /// Patch writing only `globalVolume`
    pub fn global_volume(volume: u32) -> Self {
        Self {
            global_volume: Some(volume),
            ..Self::default()
        }
    }

    /// Patch writing only `domainProfiles`
    pub fn domain_profiles(profiles: DomainProfiles) -> Self {
        Self {
            domain_profiles: Some(profiles),
            ..Self::default()
        }
    }

    /// Patch writing only `customButtonValues`
    pub fn custom_button_values(values: [u32; 3]) -> Self {
        Self {
            custom_button_values: Some(values),
            ..Self::default()
        }
    }

    /// Patch writing every key of `settings`
    pub fn full(settings: &StoredSettings) -> Self {
        Self {
            global_volume: Some(settings.global_volume),
            domain_profiles: Some(settings.domain_profiles.clone()),
            custom_button_values: Some(settings.custom_button_values),
        }
    }

    /// Keys carried by this patch
    pub fn keys(&self) -> Vec<StorageKey> {
        let mut keys = Vec::with_capacity(3);
        if self.global_volume.is_some() {
            keys.push(StorageKey::GlobalVolume);
        }
        if self.domain_profiles.is_some() {
            keys.push(StorageKey::DomainProfiles);
        }
        if self.custom_button_values.is_some() {
            keys.push(StorageKey::CustomButtonValues);
        }
        keys
    }

    /// Whether this patch carries no keys
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Keep only the requested keys
    pub fn restricted_to(mut self, keys: &[StorageKey]) -> Self {
        if !keys.contains(&StorageKey::GlobalVolume) {
            self.global_volume = None;
        }
        if !keys.contains(&StorageKey::DomainProfiles) {
            self.domain_profiles = None;
        }
        if !keys.contains(&StorageKey::CustomButtonValues) {
            self.custom_button_values = None;
        }
        self
    }

    /// Fill absent keys with defaults
    pub fn into_settings(self) -> StoredSettings {
        let defaults = StoredSettings::default();
        StoredSettings {
            global_volume: self.global_volume.unwrap_or(defaults.global_volume),
            domain_profiles: self.domain_profiles.unwrap_or(defaults.domain_profiles),
            custom_button_values: self
                .custom_button_values
                .unwrap_or(defaults.custom_button_values),
        }
    }
}

/// Old and new value of one key in a change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange<T> {
    /// `None` when the key did not exist before
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub old_value: Option<T>,

    /// `None` when the key was removed
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub new_value: Option<T>,
}

/// Per-key changes delivered with one notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChanges {
    /// Change to [`StorageKey::GlobalVolume`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_volume: Option<StorageChange<u32>>,

    /// Change to [`StorageKey::DomainProfiles`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_profiles: Option<StorageChange<DomainProfiles>>,

    /// Change to [`StorageKey::CustomButtonValues`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_button_values: Option<StorageChange<[u32; 3]>>,
}

impl StorageChanges {
    /// Whether the notification touches no key this crate knows about
    pub fn is_empty(&self) -> bool {
        self.global_volume.is_none()
            && self.domain_profiles.is_none()
            && self.custom_button_values.is_none()
    }
}

/// Storage area a notification originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Device-local storage holding every key this extension writes
    Local,
    /// Account-synced storage
    Sync,
    /// Policy-managed, read-only storage
    Managed,
    /// In-memory storage cleared with the browser session
    Session,
}

impl StorageArea {
    /// Parse the area name passed to change listeners
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "local" => Some(Self::Local),
            "sync" => Some(Self::Sync),
            "managed" => Some(Self::Managed),
            "session" => Some(Self::Session),
            _ => None,
        }
    }
}

/// Callback invoked for every write to the store
pub type ChangeListener = Rc<dyn Fn(&StorageChanges, StorageArea)>;
