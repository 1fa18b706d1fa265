//! `chrome.storage.local` as a profile store

use crate::chrome;
use async_trait::async_trait;
use js_sys::Array;
use soundmaster_core::{
    ChangeListener, CoreError, ProfileStore, Result, SettingsPatch, StorageArea, StorageChanges,
    StorageKey,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Extension storage shared by every context of the extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

#[async_trait(?Send)]
impl ProfileStore for ChromeStore {
    async fn get(&self, keys: &[StorageKey]) -> Result<SettingsPatch> {
        let names: Array = keys.iter().map(|key| JsValue::from_str(key.as_str())).collect();
        let values = chrome::storage_local_get(names.into())
            .await
            .map_err(|e| CoreError::storage(chrome::error_message(&e)))?;

        let patch: SettingsPatch = serde_wasm_bindgen::from_value(values)
            .map_err(|e| CoreError::malformed("storage.local", e.to_string()))?;
        Ok(patch.restricted_to(keys))
    }

    async fn set(&self, patch: SettingsPatch) -> Result<()> {
        let items = chrome::to_js(&patch).map_err(|e| CoreError::storage(e.to_string()))?;
        chrome::storage_local_set(items)
            .await
            .map_err(|e| CoreError::storage(chrome::error_message(&e)))?;
        debug!("Stored {:?}", patch.keys());
        Ok(())
    }

    fn on_change(&self, listener: ChangeListener) {
        let callback = Closure::<dyn FnMut(JsValue, String)>::new(
            move |changes: JsValue, area: String| {
                let Some(area) = StorageArea::parse(&area) else {
                    debug!("Ignoring change in unknown storage area {area}");
                    return;
                };

                match serde_wasm_bindgen::from_value::<StorageChanges>(changes) {
                    Ok(changes) if changes.is_empty() => {}
                    Ok(changes) => listener(&changes, area),
                    Err(e) => warn!("Unreadable storage change: {e}"),
                }
            },
        );

        chrome::on_storage_changed(callback.as_ref().unchecked_ref());
        // Listeners stay registered for the life of the context
        callback.forget();
    }
}
