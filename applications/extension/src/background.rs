//! Background service worker
//!
//! Hosts the coordinator. Lifecycle hooks must be registered synchronously
//! when the worker starts, but the coordinator only exists once its first
//! storage read finished, so hooks that fire earlier are queued.

use crate::chrome;
use crate::load_config;
use crate::logging;
use crate::store::ChromeStore;
use js_sys::Reflect;
use soundmaster_settings::{Coordinator, InstallReason, PageDomain};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Copy)]
enum LifecycleEvent {
    Installed(InstallReason),
    Startup,
}

thread_local! {
    static COORDINATOR: RefCell<Option<Rc<Coordinator<ChromeStore>>>> =
        const { RefCell::new(None) };
    static PENDING: RefCell<Vec<LifecycleEvent>> = const { RefCell::new(Vec::new()) };
}

/// Entry point of the background context
#[wasm_bindgen(js_name = startBackground)]
pub fn start_background() {
    logging::init();

    let installed = Closure::<dyn FnMut(JsValue)>::new(|details: JsValue| {
        let reason = Reflect::get(&details, &"reason".into())
            .ok()
            .and_then(|reason| reason.as_string());
        match reason.as_deref().and_then(InstallReason::parse) {
            Some(reason) => dispatch(LifecycleEvent::Installed(reason)),
            None => warn!("Unrecognized install reason {reason:?}"),
        }
    });
    chrome::on_installed(installed.as_ref().unchecked_ref());
    installed.forget();

    let startup = Closure::<dyn FnMut()>::new(|| dispatch(LifecycleEvent::Startup));
    chrome::on_startup(startup.as_ref().unchecked_ref());
    startup.forget();

    spawn_local(async {
        let store = Rc::new(ChromeStore);
        match Coordinator::start(store, load_config()).await {
            Ok(coordinator) => {
                COORDINATOR.with(|slot| *slot.borrow_mut() = Some(Rc::new(coordinator)));
                let pending = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
                for event in pending {
                    dispatch(event);
                }
            }
            Err(e) => error!("Coordinator failed to start: {e}"),
        }
    });
}

/// Effective volume of `hostname` according to the coordinator's cache
#[wasm_bindgen(js_name = effectiveVolume)]
pub fn effective_volume(hostname: &str) -> Option<u32> {
    let coordinator = COORDINATOR.with(|slot| slot.borrow().clone())?;
    Some(
        coordinator
            .effective_volume(&PageDomain::from_hostname(hostname))
            .percent,
    )
}

fn dispatch(event: LifecycleEvent) {
    let coordinator = COORDINATOR.with(|slot| slot.borrow().clone());
    let Some(coordinator) = coordinator else {
        debug!("Queueing {event:?} until the coordinator is ready");
        PENDING.with(|pending| pending.borrow_mut().push(event));
        return;
    };

    spawn_local(async move {
        let result = match event {
            LifecycleEvent::Installed(reason) => coordinator.on_installed(reason).await,
            LifecycleEvent::Startup => coordinator.on_startup().await,
        };
        if let Err(e) = result {
            error!("{event:?} hook failed: {e}");
        }
    });
}
