pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub mod starling;

pub use error::{Error, Result};
