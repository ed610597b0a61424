pub mod config;
pub mod headers;
pub mod target;
