//! Data models.

pub mod config;
pub mod download;
pub mod favorite;
pub mod history;
pub mod media;
