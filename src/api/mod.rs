//! HTTP hosting surface for the translation pipeline.
//!
//! `POST /events` takes storage notifications, `POST /intake` accepts
//! uploads into the intake bucket, `GET /health` is the liveness probe.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerError};
pub use types::ApiContext;
