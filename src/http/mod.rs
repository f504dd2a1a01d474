//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, panic boundary, tracing)
//!     → cors.rs (headers on every response)
//!     → OPTIONS → 200, empty body
//!     → "/" → landing.rs (embedded page)
//!     → request.rs (extract target, copy headers, stream body)
//!     → outbound client
//!     → response.rs (copy status/headers, stream body)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use error::{RelayError, RelayResult};
pub use request::TargetUrl;
pub use server::HttpServer;
