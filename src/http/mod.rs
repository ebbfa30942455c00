//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, scheme, host)
//!     → routing::DocRouter (Proceed | Redirect | Error)
//!     → response.rs (redirect / error / JSON mapping)
//!       or server.rs forward → content backend
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServingState};
