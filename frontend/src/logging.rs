use log::Level;

/// Route `log` records to the browser console, once. Debug builds are verbose.
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    };
    let _ = console_log::init_with_level(level);
}
