//! Popup bindings exposing the control panel to the popup page

use crate::chrome;
use crate::load_config;
use crate::logging;
use crate::store::ChromeStore;
use crate::tab::ChromeTab;
use crate::timer::BrowserClock;
use js_sys::Promise;
use soundmaster_settings::{ControlPanel, SettingsError};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

type Panel = ControlPanel<ChromeStore, ChromeTab, BrowserClock>;

fn to_js_error(error: SettingsError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

/// Open the control panel for the active tab
#[wasm_bindgen(js_name = openControlPanel)]
pub async fn open_control_panel() -> Result<WasmControlPanel, JsValue> {
    logging::init();

    let active = ChromeTab::active()
        .await?
        .ok_or_else(|| JsValue::from_str("No active tab"))?;
    let panel = ControlPanel::open(
        Rc::new(ChromeStore),
        active.tab,
        BrowserClock,
        load_config(),
        active.url.as_deref(),
    )
    .await
    .map_err(to_js_error)?;

    Ok(WasmControlPanel {
        inner: Rc::new(panel),
    })
}

/// Control panel bound to the tab the popup was opened over
///
/// Mutating methods return promises resolving to the resulting volume.
#[wasm_bindgen]
pub struct WasmControlPanel {
    inner: Rc<Panel>,
}

#[wasm_bindgen]
impl WasmControlPanel {
    /// Domain shown in the header, `Unknown` when it cannot be resolved
    #[wasm_bindgen(getter)]
    pub fn domain(&self) -> String {
        self.inner.page().label().to_string()
    }

    #[wasm_bindgen(getter, js_name = currentVolume)]
    pub fn current_volume(&self) -> u32 {
        self.inner.current_volume()
    }

    #[wasm_bindgen(getter, js_name = globalVolume)]
    pub fn global_volume(&self) -> u32 {
        self.inner.global_volume()
    }

    #[wasm_bindgen(getter, js_name = hasProfile)]
    pub fn has_profile(&self) -> bool {
        self.inner.has_profile()
    }

    #[wasm_bindgen(getter, js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.is_muted()
    }

    #[wasm_bindgen(getter, js_name = maxVolume)]
    pub fn max_volume(&self) -> u32 {
        self.inner.config().max_volume
    }

    /// Mute button followed by the three editable buttons
    #[wasm_bindgen(getter, js_name = quickButtons)]
    pub fn quick_buttons(&self) -> Vec<u32> {
        self.inner.quick_buttons().to_vec()
    }

    /// Stored profiles as `{domain, volume, createdAt}` objects
    pub fn profiles(&self) -> Result<JsValue, JsValue> {
        Ok(chrome::to_js(&self.inner.profiles())?)
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: u32) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            panel.set_volume(volume).await.map_err(to_js_error)?;
            Ok(panel.current_volume().into())
        })
    }

    /// Slider input; resolves to the snapped value
    #[wasm_bindgen(js_name = sliderInput)]
    pub fn slider_input(&self, raw: u32) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            let volume = panel.slider_input(raw).await.map_err(to_js_error)?;
            Ok(volume.into())
        })
    }

    #[wasm_bindgen(js_name = pressQuickButton)]
    pub fn press_quick_button(&self, value: u32) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            let volume = panel.press_quick_button(value).await.map_err(to_js_error)?;
            Ok(volume.into())
        })
    }

    /// Per-site override checkbox
    #[wasm_bindgen(js_name = setOverride)]
    pub fn set_override(&self, enabled: bool) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            panel.set_override(enabled).await.map_err(to_js_error)?;
            Ok(panel.current_volume().into())
        })
    }

    #[wasm_bindgen(js_name = deleteProfile)]
    pub fn delete_profile(&self, domain: String) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            panel.delete_profile(&domain).await.map_err(to_js_error)?;
            Ok(panel.current_volume().into())
        })
    }

    /// Edit quick button `index` (0-2); rejected values keep the old one
    #[wasm_bindgen(js_name = setCustomButton)]
    pub fn set_custom_button(&self, index: usize, value: u32) -> Result<(), JsValue> {
        self.inner
            .set_custom_button(index, value)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = saveCustomButtons)]
    pub fn save_custom_buttons(&self) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            panel.save_custom_buttons().await.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Diagnostics of the page agent, `null` when no agent answers
    #[wasm_bindgen(js_name = debugInfo)]
    pub fn debug_info(&self) -> Promise {
        let panel = Rc::clone(&self.inner);
        future_to_promise(async move {
            match panel.request_debug_info().await {
                Some(snapshot) => Ok(chrome::to_js(&snapshot)?),
                None => Ok(JsValue::NULL),
            }
        })
    }
}
