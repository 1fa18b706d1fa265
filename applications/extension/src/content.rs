//! Content script: the page agent of one document
//!
//! Resolves the page's volume from storage, applies it once the page had time
//! to build its players, then keeps newly inserted media in line. Live
//! changes only arrive as messages from the control panel; storage
//! notifications are not followed here.

use crate::chrome;
use crate::dom::{JsElementTable, PageDocument, WebAudioBackend};
use crate::logging;
use crate::load_config;
use crate::store::ChromeStore;
use crate::timer::BrowserClock;
use js_sys::{Array, Function, Reflect};
use soundmaster_core::{BoostConfig, Clock, PageMessage};
use soundmaster_engine::{PageAgent, VolumeEngine};
use soundmaster_settings::{load_page_volume, PageDomain};
use std::cell::RefCell;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, MutationObserver, MutationObserverInit, MutationRecord, Window,
};

type DomAgent = PageAgent<PageDocument, WebAudioBackend, JsElementTable>;

/// Window property marking a document that already hosts an agent
const AGENT_MARKER: &str = "__soundMasterAgent";

thread_local! {
    static AGENT: RefCell<Option<DomAgent>> = const { RefCell::new(None) };
}

fn with_agent<R>(f: impl FnOnce(&mut DomAgent) -> R) -> Option<R> {
    AGENT.with(|agent| agent.borrow_mut().as_mut().map(f))
}

/// Entry point of the content script
#[wasm_bindgen(js_name = startContent)]
pub fn start_content() -> Result<(), JsValue> {
    logging::init();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if Reflect::has(&window, &AGENT_MARKER.into())? {
        debug!("Page agent already running");
        return Ok(());
    }
    Reflect::set(&window, &AGENT_MARKER.into(), &JsValue::TRUE)?;

    let config = load_config();
    let agent = PageAgent::new(
        PageDocument::new(document.clone()),
        VolumeEngine::new(WebAudioBackend::default(), JsElementTable::default()),
    );
    AGENT.with(|slot| *slot.borrow_mut() = Some(agent));

    listen_for_messages();
    observe_when_ready(&document)?;
    schedule_late_load(&window, &document, &config)?;

    let page = PageDomain::from_hostname(&window.location().hostname()?);
    spawn_local(initial_apply(page, config));
    Ok(())
}

async fn initial_apply(page: PageDomain, config: BoostConfig) {
    let resolved = match load_page_volume(&ChromeStore, &page).await {
        Ok(effective) => effective.percent,
        Err(e) => {
            warn!("Could not read settings for {}: {e}", page.label());
            config.default_global_volume
        }
    };
    with_agent(|agent| agent.adopt_resolved_volume(resolved));

    BrowserClock.sleep(config.timing.initial_apply_delay()).await;
    let applied = with_agent(|agent| {
        let target = agent.current_volume();
        agent.apply_to_all(target)
    });
    info!(
        "Applied page volume to {} media elements on {}",
        applied.unwrap_or_default(),
        page.label()
    );
}

fn listen_for_messages() {
    let listener = Closure::<dyn FnMut(JsValue, JsValue, Function) -> bool>::new(
        |request: JsValue, _sender: JsValue, send_response: Function| {
            let message: PageMessage = match serde_wasm_bindgen::from_value(request) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Ignoring unknown message: {e}");
                    return false;
                }
            };

            let Some(response) = with_agent(|agent| agent.handle_message(message)) else {
                return false;
            };
            match chrome::to_js(&response) {
                Ok(reply) => {
                    if let Err(e) = send_response.call1(&JsValue::NULL, &reply) {
                        debug!("Reply not delivered: {}", chrome::error_message(&e));
                    }
                }
                Err(e) => warn!("Unserializable reply: {e}"),
            }
            true
        },
    );

    chrome::on_runtime_message(listener.as_ref().unchecked_ref());
    listener.forget();
}

fn observe_when_ready(document: &Document) -> Result<(), JsValue> {
    if document.body().is_some() {
        return observe_insertions(document);
    }

    let ready_document = document.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(e) = observe_insertions(&ready_document) {
            warn!("Mutation observer not started: {}", chrome::error_message(&e));
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

fn observe_insertions(document: &Document) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        warn!("Document has no body to observe");
        return Ok(());
    };

    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        |records: Array, _observer: MutationObserver| {
            let added = records.iter().any(|record| {
                record
                    .dyn_into::<MutationRecord>()
                    .is_ok_and(|record| record.added_nodes().length() > 0)
            });
            if added {
                with_agent(DomAgent::on_nodes_added);
            }
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;

    // The observer lives as long as the document it watches
    callback.forget();
    Ok(())
}

fn schedule_late_load(
    window: &Window,
    document: &Document,
    config: &BoostConfig,
) -> Result<(), JsValue> {
    let delay = config.timing.late_load_delay();
    let settle = move || {
        spawn_local(async move {
            BrowserClock.sleep(delay).await;
            if let Some(count) = with_agent(DomAgent::on_load_settled).filter(|count| *count > 0) {
                debug!("Re-applied page volume to {count} media elements after load");
            }
        });
    };

    if document.ready_state() == "complete" {
        settle();
        return Ok(());
    }

    let on_load = Closure::once_into_js(settle);
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())
}
