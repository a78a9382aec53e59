use leptos::prelude::*;
use partsgate_frontend::App;
use partsgate_frontend::config::RuntimeConfig;

// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

pub fn main() {
    console_error_panic_hook::set_once();

    let config = RuntimeConfig::load();
    if console_log::init_with_level(config.log_level).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!(target: "partsgate::web", "starting in {:?} mode", config.profile);

    mount_to_body(move || view! { <App config=config.clone() /> });
}
