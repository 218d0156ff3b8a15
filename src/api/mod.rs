//! HTTP API for the clinic dashboard.
//!
//! Routes are mounted under the configured prefix. Authenticated routes
//! carry the bearer token as their last path segment and resolve it to a
//! principal inside the handler. Layers: CORS → no-store → access log → handler.
//!
//! The router is composable: `clinic_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::clinic_router;
pub use server::{serve_until_ctrl_c, start_server, ApiServer, ServerSession};
pub use types::ApiContext;
