//! Sound Master - browser extension shell
//!
//! Wires the engine and settings crates to the browser: extension storage,
//! tab messaging, the page's media elements and Web Audio. One entry point is
//! exported per extension context:
//!
//! - `startBackground()` for the service worker
//! - `startContent()` for the content script hosting the page agent
//! - `openControlPanel()` for the popup, resolving to a `WasmControlPanel`
//!
//! Everything that touches the browser only builds for `wasm32`.

mod bundled;
mod send_error;

#[cfg(target_arch = "wasm32")]
mod background;
#[cfg(target_arch = "wasm32")]
mod chrome;
#[cfg(target_arch = "wasm32")]
mod content;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod popup;
#[cfg(target_arch = "wasm32")]
mod store;
#[cfg(target_arch = "wasm32")]
mod tab;
#[cfg(target_arch = "wasm32")]
mod timer;

pub use bundled::load_config;
pub use send_error::classify_send_error;

#[cfg(target_arch = "wasm32")]
pub use popup::WasmControlPanel;
