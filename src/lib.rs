pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod speech;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::{Config, Mode};
pub use error::{Error, MicUnavailable, ParseError, Result};
