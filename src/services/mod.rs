//! External service clients.

pub mod aniskip;
pub mod http;
pub mod source;
