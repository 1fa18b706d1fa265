//! Effective volume resolution
//!
//! Specificity order: exact domain profile, then the registrable parent's
//! profile, then the global volume. No wildcard or deeper-ancestor matching.

use crate::domain::{Domain, PageDomain};
use crate::error::Result;
use soundmaster_core::{DomainProfiles, ProfileStore, StorageKey};
use tracing::debug;

/// Where an effective volume came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// Profile stored for the page's own domain
    Profile(Domain),

    /// Profile stored for the page's parent domain
    ParentProfile(Domain),

    /// No applicable profile
    Global,
}

/// Volume percent that applies to a page, with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveVolume {
    pub percent: u32,
    pub source: VolumeSource,
}

/// Resolve the effective volume of `page`
pub fn resolve(
    page: &PageDomain,
    global_volume: u32,
    profiles: &DomainProfiles,
) -> EffectiveVolume {
    let Some(domain) = page.domain() else {
        return EffectiveVolume {
            percent: global_volume,
            source: VolumeSource::Global,
        };
    };

    if let Some(entry) = profiles.get(domain.as_str()) {
        return EffectiveVolume {
            percent: entry.volume,
            source: VolumeSource::Profile(domain.clone()),
        };
    }

    if let Some(parent) = domain.parent() {
        if let Some(entry) = profiles.get(parent.as_str()) {
            return EffectiveVolume {
                percent: entry.volume,
                source: VolumeSource::ParentProfile(parent),
            };
        }
    }

    EffectiveVolume {
        percent: global_volume,
        source: VolumeSource::Global,
    }
}

/// Read the store and resolve the effective volume of `page`
pub async fn load_page_volume<S>(store: &S, page: &PageDomain) -> Result<EffectiveVolume>
where
    S: ProfileStore + ?Sized,
{
    let settings = store
        .get(&[StorageKey::GlobalVolume, StorageKey::DomainProfiles])
        .await?
        .into_settings();

    let effective = resolve(page, settings.global_volume, &settings.domain_profiles);
    debug!(
        "Resolved {} to {}% ({:?})",
        page.label(),
        effective.percent,
        effective.source
    );
    Ok(effective)
}
