//! Background coordinator
//!
//! Holds a read-through cache of the store for the lifetime of the background
//! context. The cache is initialised once on start and afterwards changes only
//! in response to store notifications; no other code path writes to it.

use crate::domain::PageDomain;
use crate::error::Result;
use crate::resolve::{resolve, EffectiveVolume};
use soundmaster_core::{
    BoostConfig, DomainProfiles, ProfileStore, SettingsPatch, StorageArea, StorageChanges,
    StorageKey,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

/// Why the extension's install hook fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
    SharedModuleUpdate,
}

impl InstallReason {
    /// Parse the reason reported by the browser
    pub fn parse(reason: &str) -> Option<Self> {
        match reason {
            "install" => Some(Self::Install),
            "update" => Some(Self::Update),
            "chrome_update" => Some(Self::BrowserUpdate),
            "shared_module_update" => Some(Self::SharedModuleUpdate),
            _ => None,
        }
    }
}

/// Mirror of the store keys the coordinator cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedState {
    pub global_volume: u32,
    pub domain_profiles: DomainProfiles,
}

#[derive(Debug)]
struct Cache {
    state: Option<CachedState>,

    /// Keys updated by a notification while the initial read is pending;
    /// `None` once the read has landed
    notified: Option<Vec<StorageKey>>,
}

impl Cache {
    fn pending() -> Self {
        Self {
            state: None,
            notified: Some(Vec::new()),
        }
    }

    fn record(notified: &mut Option<Vec<StorageKey>>, key: StorageKey) {
        if let Some(notified) = notified.as_mut() {
            notified.push(key);
        }
    }

    fn apply(&mut self, changes: &StorageChanges, default_global: u32) {
        let state = self.state.get_or_insert_with(|| CachedState {
            global_volume: default_global,
            domain_profiles: DomainProfiles::default(),
        });

        if let Some(change) = &changes.global_volume {
            state.global_volume = change.new_value.unwrap_or(default_global);
            Self::record(&mut self.notified, StorageKey::GlobalVolume);
        }

        if let Some(change) = &changes.domain_profiles {
            state.domain_profiles = change.new_value.clone().unwrap_or_default();
            Self::record(&mut self.notified, StorageKey::DomainProfiles);
        }
    }
}

/// Background coordinator
pub struct Coordinator<S> {
    store: Rc<S>,
    cache: Rc<RefCell<Cache>>,
    config: BoostConfig,
}

impl<S: ProfileStore> Coordinator<S> {
    /// Subscribe to the store and initialise the cache from one read
    pub async fn start(store: Rc<S>, config: BoostConfig) -> Result<Self> {
        let cache = Rc::new(RefCell::new(Cache::pending()));

        let handler_cache = Rc::clone(&cache);
        let default_global = config.default_global_volume;
        store.on_change(Rc::new(move |changes: &StorageChanges, area: StorageArea| {
            if area != StorageArea::Local {
                return;
            }
            handler_cache.borrow_mut().apply(changes, default_global);
        }));

        let loaded = store
            .get(&[StorageKey::GlobalVolume, StorageKey::DomainProfiles])
            .await?
            .into_settings();

        {
            let mut cache = cache.borrow_mut();
            let notified = cache.notified.take().unwrap_or_default();
            let state = cache.state.get_or_insert_with(|| CachedState {
                global_volume: loaded.global_volume,
                domain_profiles: loaded.domain_profiles.clone(),
            });
            // A notification that raced the read is newer than the read
            if !notified.contains(&StorageKey::GlobalVolume) {
                state.global_volume = loaded.global_volume;
            }
            if !notified.contains(&StorageKey::DomainProfiles) {
                state.domain_profiles = loaded.domain_profiles;
            }
        }

        info!("Coordinator started");
        Ok(Self {
            store,
            cache,
            config,
        })
    }

    /// Install hook: fresh installs start from defaults, updates keep profiles
    pub async fn on_installed(&self, reason: InstallReason) -> Result<()> {
        if reason != InstallReason::Install {
            debug!("Install hook for {reason:?}, keeping stored settings");
            return Ok(());
        }

        info!("Initializing store defaults");
        self.store
            .set(SettingsPatch {
                global_volume: Some(self.config.default_global_volume),
                domain_profiles: Some(DomainProfiles::default()),
                custom_button_values: None,
            })
            .await?;
        Ok(())
    }

    /// Environment startup hook: reset the global volume, keep every profile
    pub async fn on_startup(&self) -> Result<()> {
        let profiles = self
            .store
            .get(&[StorageKey::DomainProfiles])
            .await?
            .domain_profiles
            .unwrap_or_default();

        info!(
            "Resetting global volume to {}% ({} profiles kept)",
            self.config.default_global_volume,
            profiles.len()
        );
        self.store
            .set(SettingsPatch {
                global_volume: Some(self.config.default_global_volume),
                domain_profiles: Some(profiles),
                custom_button_values: None,
            })
            .await?;
        Ok(())
    }

    /// Current cached view
    pub fn snapshot(&self) -> Option<CachedState> {
        self.cache.borrow().state.clone()
    }

    /// Resolve a page's effective volume from the cache
    pub fn effective_volume(&self, page: &PageDomain) -> EffectiveVolume {
        let cache = self.cache.borrow();
        match &cache.state {
            Some(state) => resolve(page, state.global_volume, &state.domain_profiles),
            None => resolve(
                page,
                self.config.default_global_volume,
                &DomainProfiles::default(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn install_reasons_parse() {
        assert_eq!(InstallReason::parse("install"), Some(InstallReason::Install));
        assert_eq!(InstallReason::parse("update"), Some(InstallReason::Update));
        assert_eq!(
            InstallReason::parse("chrome_update"),
            Some(InstallReason::BrowserUpdate)
        );
        assert_eq!(InstallReason::parse("reinstall"), None);
    }

    #[test]
    fn removed_key_falls_back_to_default() {
        let mut cache = Cache::pending();
        let changes = StorageChanges {
            global_volume: Some(soundmaster_core::StorageChange {
                old_value: Some(150),
                new_value: None,
            }),
            ..StorageChanges::default()
        };

        cache.apply(&changes, 100);

        let state = cache.state.unwrap();
        assert_eq!(state.global_volume, 100);
        assert_eq!(cache.notified, Some(vec![StorageKey::GlobalVolume]));
    }

    #[tokio::test]
    async fn writes_after_start_are_not_recorded() {
        let store = Rc::new(MemoryStore::new());
        let coordinator = Coordinator::start(Rc::clone(&store), BoostConfig::default())
            .await
            .unwrap();

        for volume in 0..1000 {
            store
                .set(SettingsPatch::global_volume(volume % 600))
                .await
                .unwrap();
        }

        assert_eq!(coordinator.cache.borrow().notified, None);
        assert_eq!(coordinator.snapshot().unwrap().global_volume, 999 % 600);
    }
}
