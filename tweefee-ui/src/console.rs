//! Console Logging
//!
//! Thin wrappers over `web_sys::console`. Host builds (unit tests) print to
//! stderr instead, since the JS console only exists inside a browser.

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    eprintln!("[tweefee] {}", message);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    eprintln!("[tweefee] WARN {}", message);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(message: &str) {
    eprintln!("[tweefee] ERROR {}", message);
}
