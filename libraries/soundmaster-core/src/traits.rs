//! Core traits for Sound Master

use crate::error::Result;
use crate::storage::{ChangeListener, SettingsPatch, StorageKey};
use async_trait::async_trait;
use std::time::Duration;

/// Asynchronous key-value store holding the persisted layout
///
/// Implementers wrap the browser's extension storage, or keep the layout in
/// memory for tests. Every context runs single-threaded, so futures are not
/// required to be `Send`.
///
/// Consistency is last-write-wins with no transactions. A write issued by one
/// context is only guaranteed visible to another once that context receives
/// the matching change notification.
#[async_trait(?Send)]
pub trait ProfileStore {
    /// Read the requested keys
    ///
    /// Keys that were never written are absent from the returned patch.
    async fn get(&self, keys: &[StorageKey]) -> Result<SettingsPatch>;

    /// Write the keys present in `patch`, leaving the others untouched
    ///
    /// Resolves once the store has acknowledged the write.
    async fn set(&self, patch: SettingsPatch) -> Result<()>;

    /// Register a listener that fires for every write from any context
    fn on_change(&self, listener: ChangeListener);

    /// Read every key, filling absent ones with defaults
    async fn load_all(&self) -> Result<crate::types::StoredSettings> {
        Ok(self.get(&StorageKey::ALL).await?.into_settings())
    }
}

/// Wall clock and timer of the hosting context
#[async_trait(?Send)]
pub trait Clock {
    /// Current time as Unix epoch milliseconds
    fn now_millis(&self) -> i64;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}
