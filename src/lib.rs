//! Prints archived captures of URLs from the
//! [Wayback Machine](https://web.archive.org).

pub mod config;
pub mod error;
mod http;
pub mod output;
pub mod snapshot;
pub mod wayback;

pub use http::build_client;
