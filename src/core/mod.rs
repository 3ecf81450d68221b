//! Core pipeline modules.

pub mod downloader;
pub mod hls;
pub mod playlist;
pub mod resolver;
pub mod skip;
