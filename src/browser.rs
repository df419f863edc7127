/// Bridge to the extension APIs exposed by popup.js

use crate::tab_data::{normalize_tabs, RawTab, TabId, TabRecord};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs(current_window_only: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn writeClipboard(text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn downloadFile(content: &str, filename: &str, mime_type: &str) -> Result<(), JsValue>;
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("{0} failed: {1}")]
    Js(&'static str, String),
    #[error("could not decode {0}: {1}")]
    Decode(&'static str, String),
}

impl BrowserError {
    fn js(op: &'static str, err: JsValue) -> BrowserError {
        BrowserError::Js(op, format!("{:?}", err))
    }
}

/// Which tabs an inventory load covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryScope {
    AllWindows,
    CurrentWindow,
}

impl InventoryScope {
    pub fn from_current_window_only(current_window_only: bool) -> InventoryScope {
        if current_window_only {
            InventoryScope::CurrentWindow
        } else {
            InventoryScope::AllWindows
        }
    }
}

pub fn decode_tabs(tabs_js: JsValue) -> Result<Vec<TabRecord>, BrowserError> {
    let raw: Vec<RawTab> = serde_wasm_bindgen::from_value(tabs_js)
        .map_err(|e| BrowserError::Decode("tabs", e.to_string()))?;
    Ok(normalize_tabs(raw))
}

/// Query the browser for its tabs, normalized and unselected.
pub async fn query_tabs(scope: InventoryScope) -> Result<Vec<TabRecord>, BrowserError> {
    let tabs_js = queryTabs(scope == InventoryScope::CurrentWindow)
        .await
        .map_err(|e| BrowserError::js("tabs.query", e))?;
    decode_tabs(tabs_js)
}

pub fn decode_stored(key: &'static str, value: JsValue) -> Result<Option<Value>, BrowserError> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| BrowserError::Decode(key, e.to_string()))
}

/// Read one key; `Ok(None)` when it has never been written.
pub async fn get_storage(key: &'static str) -> Result<Option<Value>, BrowserError> {
    let value = getStorage(key)
        .await
        .map_err(|e| BrowserError::js("storage.get", e))?;
    decode_stored(key, value)
}

pub async fn set_storage(key: &'static str, value: &Value) -> Result<(), BrowserError> {
    // Plain objects, not ES Maps, so the storage area can clone them.
    let value_js = value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| BrowserError::Decode(key, e.to_string()))?;

    setStorage(key, value_js)
        .await
        .map_err(|e| BrowserError::js("storage.set", e))
}

pub async fn write_clipboard(text: &str) -> Result<(), BrowserError> {
    writeClipboard(text)
        .await
        .map_err(|e| BrowserError::js("clipboard.writeText", e))
}

/// Save `content` as a local download; the bridge revokes its object URL.
pub fn download_file(content: &str, filename: &str, mime_type: &str) -> Result<(), BrowserError> {
    downloadFile(content, filename, mime_type).map_err(|e| BrowserError::js("download", e))
}

/// Make the tab active and focus its window.
pub async fn activate_tab(tab_id: TabId) -> Result<(), BrowserError> {
    activateTab(tab_id)
        .await
        .map_err(|e| BrowserError::js("tabs.update", e))
}
