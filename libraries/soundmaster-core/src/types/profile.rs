//! Persisted volume settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percent at which a media element plays at its own native loudness
pub const UNITY_PERCENT: u32 = 100;

/// Global volume used when nothing has been stored yet
pub const DEFAULT_GLOBAL_VOLUME: u32 = UNITY_PERCENT;

/// Quick-button values used when nothing has been stored yet
pub const DEFAULT_CUSTOM_BUTTONS: [u32; 3] = [20, 100, 300];

/// Stored value of one per-domain override
///
/// The owning domain is the map key in [`DomainProfiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    /// Volume percent (0-300+)
    pub volume: u32,

    /// Creation time (Unix epoch milliseconds), preserved across volume edits
    pub created_at: i64,
}

/// A per-domain override together with its domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProfile {
    /// Normalized domain (no leading `www.`)
    pub domain: String,

    /// Volume percent (0-300+)
    pub volume: u32,

    /// Creation time (Unix epoch milliseconds)
    pub created_at: i64,
}

/// All per-domain overrides, keyed by normalized domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainProfiles(BTreeMap<String, ProfileEntry>);

impl DomainProfiles {
    /// Look up the override stored for `domain`
    pub fn get(&self, domain: &str) -> Option<&ProfileEntry> {
        self.0.get(domain)
    }

    /// Whether an override exists for `domain`
    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains_key(domain)
    }

    /// Insert or update the override for `domain`
    ///
    /// An existing entry keeps its `created_at`; `now` is only used for new entries.
    /// Returns the entry as stored.
    pub fn upsert(&mut self, domain: &str, volume: u32, now: i64) -> ProfileEntry {
        let created_at = self.0.get(domain).map_or(now, |entry| entry.created_at);
        let entry = ProfileEntry { volume, created_at };
        self.0.insert(domain.to_string(), entry);
        entry
    }

    /// Replace the override for `domain` with a freshly created one
    pub fn create(&mut self, domain: &str, volume: u32, now: i64) -> ProfileEntry {
        let entry = ProfileEntry {
            volume,
            created_at: now,
        };
        self.0.insert(domain.to_string(), entry);
        entry
    }

    /// Remove the override for `domain`, returning it if it existed
    pub fn remove(&mut self, domain: &str) -> Option<ProfileEntry> {
        self.0.remove(domain)
    }

    /// Number of stored overrides
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no overrides are stored
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate overrides as owned [`VolumeProfile`] values, ordered by domain
    pub fn profiles(&self) -> impl Iterator<Item = VolumeProfile> + '_ {
        self.0.iter().map(|(domain, entry)| VolumeProfile {
            domain: domain.clone(),
            volume: entry.volume,
            created_at: entry.created_at,
        })
    }
}

impl FromIterator<(String, ProfileEntry)> for DomainProfiles {
    fn from_iter<I: IntoIterator<Item = (String, ProfileEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Complete persisted layout of the profile store
///
/// ```json
/// { "globalVolume": 100,
///   "domainProfiles": { "example.com": { "volume": 150, "createdAt": 1700000000000 } },
///   "customButtonValues": [20, 100, 300] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    /// Volume percent for any domain without an override
    pub global_volume: u32,

    /// Per-domain overrides
    pub domain_profiles: DomainProfiles,

    /// Popup quick-button values
    pub custom_button_values: [u32; 3],
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            global_volume: DEFAULT_GLOBAL_VOLUME,
            domain_profiles: DomainProfiles::default(),
            custom_button_values: DEFAULT_CUSTOM_BUTTONS,
        }
    }
}
