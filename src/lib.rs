pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod logging;
pub mod player;
pub mod render;
#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
pub mod store;
pub mod surface;
pub mod timers;

// Wasm module
#[cfg(target_arch = "wasm32")]
pub mod wasm_client;
