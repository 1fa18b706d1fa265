//! Messaging with the page agent of a browser tab

use crate::chrome;
use crate::send_error::classify_send_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use soundmaster_core::{PageMessage, PageResponse};
use soundmaster_settings::{DeliveryError, TabChannel};
use tracing::warn;
use wasm_bindgen::JsValue;

/// Content script file injected into tabs that have no agent yet
const CONTENT_SCRIPT: &str = "content.js";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InjectionTarget {
    tab_id: i32,
}

#[derive(Serialize)]
struct ScriptInjection {
    target: InjectionTarget,
    files: [&'static str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    active: bool,
    current_window: bool,
}

#[derive(Deserialize)]
struct TabInfo {
    id: Option<i32>,
    url: Option<String>,
}

/// One browser tab, addressed by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeTab {
    id: i32,
}

/// The tab the popup was opened over
pub struct ActiveTab {
    pub tab: ChromeTab,
    pub url: Option<String>,
}

impl ChromeTab {
    /// Look up the active tab of the current window
    pub async fn active() -> Result<Option<ActiveTab>, JsValue> {
        let query = chrome::to_js(&TabQuery {
            active: true,
            current_window: true,
        })?;
        let tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(chrome::tabs_query(query).await?)?;

        Ok(tabs.into_iter().find_map(|info| {
            info.id.map(|id| ActiveTab {
                tab: ChromeTab { id },
                url: info.url,
            })
        }))
    }
}

#[async_trait(?Send)]
impl TabChannel for ChromeTab {
    async fn send(&self, message: &PageMessage) -> Result<PageResponse, DeliveryError> {
        let payload = chrome::to_js(message)
            .map_err(|e| DeliveryError::NoReceiver(format!("Unserializable message: {e}")))?;

        let reply = chrome::tabs_send_message(self.id, payload)
            .await
            .map_err(|e| classify_send_error(&chrome::error_message(&e)))?;

        // The agent got the message but answered nothing usable
        if reply.is_undefined() {
            return Err(DeliveryError::ChannelClosed);
        }
        serde_wasm_bindgen::from_value(reply).map_err(|e| {
            warn!("Unreadable reply from tab {}: {e}", self.id);
            DeliveryError::ChannelClosed
        })
    }

    async fn inject_agent(&self) -> Result<(), DeliveryError> {
        let injection = chrome::to_js(&ScriptInjection {
            target: InjectionTarget { tab_id: self.id },
            files: [CONTENT_SCRIPT],
        })
        .map_err(|e| DeliveryError::Injection(e.to_string()))?;

        chrome::scripting_execute_script(injection)
            .await
            .map_err(|e| DeliveryError::Injection(chrome::error_message(&e)))?;
        Ok(())
    }
}
