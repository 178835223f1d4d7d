/// Installs an env-configured logger (`RUST_LOG`) so the `[retry]` messages
/// emitted by this crate become visible.
pub struct Logger;

impl Logger {
    /// Initializes the logger. Panics if a logger is already installed.
    pub fn init() {
        pretty_env_logger::init();
    }

    /// Same as [`Logger::init`], but returns `false` instead of panicking
    /// when a logger is already installed.
    pub fn try_init() -> bool {
        pretty_env_logger::try_init().is_ok()
    }
}

