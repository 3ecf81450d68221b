//! anigrab library
//!
//! Scrapes a streaming portal, resolves embed pages to HLS streams, and
//! downloads episodes as decrypted transport streams.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
