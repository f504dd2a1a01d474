//! Forward relay library: relays requests whose target URL is embedded in
//! the request path.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
