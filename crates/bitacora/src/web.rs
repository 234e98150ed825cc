//! Browser implementations of the view interfaces, local storage and the
//! HTTP client (through web-sys).
use wasm_bindgen::{JsCast, JsValue};

use crate::{
    route::Route,
    session::Storage,
    view::Navigator,
};

pub mod dom;
pub mod event;
pub mod http;

pub mod prelude {
    pub use super::{
        HashNavigator, LocalStorage,
        dom::{DomCards, DomForm, DomMessages},
        event::EventListener,
        http::HttpApi,
    };
}

pub fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<web_sys::Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// The element with the given id.
pub fn element(id: &str) -> Result<web_sys::Element, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))
}

/// The element with the given id, as a more specific element type.
pub fn element_as<T: JsCast>(id: &str) -> Result<T, JsValue> {
    element(id)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has an unexpected type")))
}

/// The browser's `localStorage`.
///
/// Failures (private browsing, quota) are logged and otherwise ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        match window().and_then(|w| w.local_storage()) {
            Ok(storage) => storage,
            Err(e) => {
                log::error!("local storage unavailable: {e:?}");
                None
            }
        }
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(Err(e)) = Self::storage().map(|s| s.set_item(key, value)) {
            log::error!("could not store '{key}': {e:?}");
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(Err(e)) = Self::storage().map(|s| s.remove_item(key)) {
            log::error!("could not remove '{key}': {e:?}");
        }
    }
}

/// Navigates by setting `location.hash`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashNavigator;

impl HashNavigator {
    /// The route in the current location hash.
    pub fn current() -> Route {
        let hash = window()
            .and_then(|w| w.location().hash())
            .unwrap_or_default();
        Route::from_hash(&hash)
    }
}

impl Navigator for HashNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("navigating to {route:?}");
        if let Err(e) = window().and_then(|w| w.location().set_hash(&route.hash())) {
            log::error!("could not navigate to {route:?}: {e:?}");
        }
    }
}
