/// Tab Grab - browser extension popup for copying and exporting tabs
/// Built with Rust + WASM + Yew

pub mod browser;
pub mod domain;
pub mod engine;
pub mod format;
pub mod notify;
pub mod storage;
pub mod tab_data;
pub mod ui;
pub mod view;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Domain group key, exposed to JavaScript
#[wasm_bindgen]
pub fn group_domain(url: &str) -> String {
    domain::group_domain(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
