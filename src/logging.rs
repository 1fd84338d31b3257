//! Browser logging setup.
//!
//! The crate logs through the `log` facade. In the browser build the facade
//! is backed by `console_log` and panics are routed to the console; elsewhere
//! no backend is installed and records are discarded.

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;

#[cfg(feature = "csr")]
const LEVEL: log::Level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init() {
    #[cfg(feature = "csr")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(LEVEL).is_err() {
            log::debug!("console logger already installed");
        }
    }
}
