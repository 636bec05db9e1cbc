//! jack-bridge daemon: argument parsing, logging and signal handling around
//! the Axum server.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use anyhow as _;
use dotenvy as _;

pub mod logging;
pub mod parser;
pub mod shutdown;

pub use logging::init_logging;
pub use parser::Cli;
pub use shutdown::cancel_on_signal;
