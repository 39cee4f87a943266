//! Waterspread Backend - Imagery backends behind a common port
//!
//! Analysis code talks to an `ImageryBackend`. `MemoryBackend` evaluates
//! queries in-process over rasters it holds; `HttpBackend` forwards them to a
//! remote imagery service.

pub mod http;
pub mod memory;
pub mod ports;

pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use ports::ImageryBackend;
