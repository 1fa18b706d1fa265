//! Cross-context synchronization tests
//!
//! The coordinator, control panels and page agents share one store. These
//! tests check that writes reach the coordinator cache through notifications
//! and that page agents only pick up changes on their next load.

mod test_helpers;

use async_trait::async_trait;
use soundmaster_core::{
    BoostConfig, ChangeListener, DomainProfiles, ProfileStore, SettingsPatch, StorageArea,
    StorageChange, StorageChanges, StorageKey, StoredSettings,
};
use soundmaster_engine::simulated::{
    simulated_agent, SimulatedAudio, SimulatedDocument, SimulatedElement,
};
use soundmaster_settings::{
    load_page_volume, ControlPanel, Coordinator, InstallReason, MemoryStore, PageDomain,
    VolumeSource,
};
use std::cell::RefCell;
use std::rc::Rc;
use test_helpers::{init_tracing, ManualClock, SimulatedTab};

fn with_profile(global_volume: u32, domain: &str, volume: u32) -> StoredSettings {
    let mut domain_profiles = DomainProfiles::default();
    domain_profiles.create(domain, volume, 1);
    StoredSettings {
        global_volume,
        domain_profiles,
        ..StoredSettings::default()
    }
}

#[tokio::test]
async fn coordinator_cache_starts_from_defaults() {
    init_tracing();
    let store = Rc::new(MemoryStore::new());
    let coordinator = Coordinator::start(store, BoostConfig::default()).await.unwrap();

    let state = coordinator.snapshot().unwrap();
    assert_eq!(state.global_volume, 100);
    assert!(state.domain_profiles.is_empty());
}

#[tokio::test]
async fn coordinator_cache_follows_panel_writes() {
    init_tracing();
    let store = MemoryStore::with_settings(&StoredSettings::default());
    let coordinator = Coordinator::start(Rc::new(store.clone()), BoostConfig::default())
        .await
        .unwrap();

    let tab = SimulatedTab::with_agent(SimulatedDocument::new());
    let panel = ControlPanel::open(
        Rc::new(store.clone()),
        tab,
        ManualClock::at(0),
        BoostConfig::default(),
        Some("https://www.example.com/"),
    )
    .await
    .unwrap();

    panel.set_volume(140).await.unwrap();
    assert_eq!(coordinator.snapshot().unwrap().global_volume, 140);

    panel.set_override(true).await.unwrap();
    panel.set_volume(260).await.unwrap();

    let page = PageDomain::from_hostname("m.example.com");
    let effective = coordinator.effective_volume(&page);
    assert_eq!(effective.percent, 260);
    assert!(matches!(effective.source, VolumeSource::ParentProfile(_)));
    assert_eq!(coordinator.snapshot().unwrap().global_volume, 140);
}

#[tokio::test]
async fn coordinator_ignores_other_storage_areas() {
    let store = MemoryStore::with_settings(&StoredSettings::default());
    let coordinator = Coordinator::start(Rc::new(store.clone()), BoostConfig::default())
        .await
        .unwrap();

    let changes = StorageChanges {
        global_volume: Some(StorageChange {
            old_value: Some(100),
            new_value: Some(10),
        }),
        ..StorageChanges::default()
    };
    store.broadcast(&changes, StorageArea::Sync);
    assert_eq!(coordinator.snapshot().unwrap().global_volume, 100);

    store.broadcast(&changes, StorageArea::Local);
    assert_eq!(coordinator.snapshot().unwrap().global_volume, 10);
}

#[tokio::test]
async fn install_writes_defaults_and_update_keeps_profiles() {
    init_tracing();
    let store = MemoryStore::with_settings(&with_profile(180, "example.com", 150));
    let coordinator = Coordinator::start(Rc::new(store.clone()), BoostConfig::default())
        .await
        .unwrap();

    coordinator.on_installed(InstallReason::Update).await.unwrap();
    assert_eq!(store.settings().global_volume, 180);
    assert!(store.settings().domain_profiles.contains("example.com"));

    coordinator.on_installed(InstallReason::Install).await.unwrap();
    let stored = store.settings();
    assert_eq!(stored.global_volume, 100);
    assert!(stored.domain_profiles.is_empty());
    assert!(coordinator.snapshot().unwrap().domain_profiles.is_empty());
}

#[tokio::test]
async fn startup_resets_global_and_preserves_profiles() {
    let store = MemoryStore::with_settings(&with_profile(250, "example.com", 150));
    let coordinator = Coordinator::start(Rc::new(store.clone()), BoostConfig::default())
        .await
        .unwrap();

    coordinator.on_startup().await.unwrap();

    let stored = store.settings();
    assert_eq!(stored.global_volume, 100);
    assert_eq!(stored.domain_profiles.get("example.com").unwrap().volume, 150);

    let cached = coordinator.snapshot().unwrap();
    assert_eq!(cached.global_volume, 100);
    assert_eq!(cached.domain_profiles, stored.domain_profiles);
}

#[tokio::test]
async fn zero_global_volume_survives_reload() {
    let store = MemoryStore::with_settings(&StoredSettings {
        global_volume: 0,
        ..StoredSettings::default()
    });
    let page = PageDomain::from_hostname("example.com");
    assert_eq!(load_page_volume(&store, &page).await.unwrap().percent, 0);
}

/// Store that lands a write from another context while a read is in flight
struct RacingStore {
    inner: MemoryStore,
    pending: RefCell<Option<SettingsPatch>>,
}

#[async_trait(?Send)]
impl ProfileStore for RacingStore {
    async fn get(&self, keys: &[StorageKey]) -> soundmaster_core::Result<SettingsPatch> {
        let stale = self.inner.get(keys).await?;
        let pending = self.pending.borrow_mut().take();
        if let Some(patch) = pending {
            self.inner.set(patch).await?;
        }
        Ok(stale)
    }

    async fn set(&self, patch: SettingsPatch) -> soundmaster_core::Result<()> {
        self.inner.set(patch).await
    }

    fn on_change(&self, listener: ChangeListener) {
        self.inner.on_change(listener);
    }
}

#[tokio::test]
async fn notification_during_initial_read_wins() {
    init_tracing();
    let store = Rc::new(RacingStore {
        inner: MemoryStore::with_settings(&StoredSettings::default()),
        pending: RefCell::new(Some(SettingsPatch::global_volume(220))),
    });

    let coordinator = Coordinator::start(Rc::clone(&store), BoostConfig::default())
        .await
        .unwrap();

    let state = coordinator.snapshot().unwrap();
    assert_eq!(state.global_volume, 220);
    assert!(state.domain_profiles.is_empty());
}

#[tokio::test]
async fn open_tabs_only_see_changes_after_reload() {
    init_tracing();
    let store = MemoryStore::with_settings(&StoredSettings::default());
    let page = PageDomain::from_hostname("example.com");

    // Tab A loaded before the change
    let video_a = SimulatedElement::video("https://example.com/a.mp4", 1.0);
    let mut agent_a = simulated_agent(
        SimulatedDocument::with_elements(vec![video_a]),
        SimulatedAudio::new(),
    );
    let resolved = load_page_volume(&store, &page).await.unwrap().percent;
    agent_a.adopt_resolved_volume(resolved);
    agent_a.apply_to_all(resolved);

    // Tab B's panel enables a profile and raises the volume
    let tab_b = SimulatedTab::with_agent(SimulatedDocument::new());
    let panel = ControlPanel::open(
        Rc::new(store.clone()),
        tab_b.clone(),
        ManualClock::at(0),
        BoostConfig::default(),
        Some("https://example.com/b"),
    )
    .await
    .unwrap();
    panel.set_override(true).await.unwrap();
    panel.set_volume(200).await.unwrap();

    assert_eq!(tab_b.agent_volume(), Some(200));
    assert_eq!(agent_a.current_volume(), 100);

    // Reloading tab A resolves the new profile
    assert_eq!(load_page_volume(&store, &page).await.unwrap().percent, 200);
}
