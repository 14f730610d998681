//! Utilities: resolving the settings from the command line, `.env` and the defaults, and writing `.env`.
//!
mod functions;

pub use functions::*;
