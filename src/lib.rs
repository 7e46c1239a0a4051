// Library surface for headless/integration tests and reuse.
// main.rs only owns the CLI and the terminal.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod haptics;
pub mod logging;
pub mod ripple;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod words;
