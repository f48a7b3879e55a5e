pub mod app;
pub mod cancel;

pub use app::{Cli, DEFAULT_CONFIG_FILENAME, Mode};
pub use cancel::start_cancellation_listener;
