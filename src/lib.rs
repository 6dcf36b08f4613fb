pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod source;
pub mod todo;
