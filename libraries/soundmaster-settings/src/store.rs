//! In-memory profile store
//!
//! Clones share one underlying map, so several contexts (coordinator, panel,
//! page agents) can be attached to the same store in a single process. Every
//! `set` notifies all listeners, including the writer's own.

use async_trait::async_trait;
use soundmaster_core::{
    ChangeListener, ProfileStore, Result, SettingsPatch, StorageArea, StorageChange,
    StorageChanges, StorageKey, StoredSettings,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct StoreState {
    values: SettingsPatch,
    listeners: Vec<ChangeListener>,
    writes: usize,
}

/// Profile store kept in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<StoreState>>,
}

impl MemoryStore {
    /// An empty store, as before the first install
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `settings`
    pub fn with_settings(settings: &StoredSettings) -> Self {
        let store = Self::new();
        store.state.borrow_mut().values = SettingsPatch::full(settings);
        store
    }

    /// Raw stored values; absent keys were never written
    pub fn raw(&self) -> SettingsPatch {
        self.state.borrow().values.clone()
    }

    /// Stored values with defaults for absent keys
    pub fn settings(&self) -> StoredSettings {
        self.raw().into_settings()
    }

    /// Number of acknowledged writes
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Deliver `changes` to every listener as if `area` had been written
    pub fn broadcast(&self, changes: &StorageChanges, area: StorageArea) {
        let listeners = self.state.borrow().listeners.clone();
        for listener in listeners {
            listener(changes, area);
        }
    }
}

fn change<T: Clone>(old: &mut Option<T>, new: Option<T>) -> Option<StorageChange<T>> {
    let new_value = new?;
    let old_value = old.replace(new_value.clone());
    Some(StorageChange {
        old_value,
        new_value: Some(new_value),
    })
}

#[async_trait(?Send)]
impl ProfileStore for MemoryStore {
    async fn get(&self, keys: &[StorageKey]) -> Result<SettingsPatch> {
        Ok(self.raw().restricted_to(keys))
    }

    async fn set(&self, patch: SettingsPatch) -> Result<()> {
        // Listeners may call back into the store, so none run while it is borrowed
        let (changes, listeners) = {
            let mut state = self.state.borrow_mut();
            let values = &mut state.values;
            let changes = StorageChanges {
                global_volume: change(&mut values.global_volume, patch.global_volume),
                domain_profiles: change(&mut values.domain_profiles, patch.domain_profiles),
                custom_button_values: change(
                    &mut values.custom_button_values,
                    patch.custom_button_values,
                ),
            };
            state.writes += 1;
            (changes, state.listeners.clone())
        };

        if !changes.is_empty() {
            for listener in listeners {
                listener(&changes, StorageArea::Local);
            }
        }
        Ok(())
    }

    fn on_change(&self, listener: ChangeListener) {
        self.state.borrow_mut().listeners.push(listener);
    }
}
