// src/lib.rs

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
mod font;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod remote;
pub mod renderer;
pub mod report;
pub mod sync;

pub use error::{Error, Result};
