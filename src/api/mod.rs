//! HTTP API module for the royalty distribution engine.
//!
//! This module provides the REST endpoints for previewing allocations and
//! running distributions.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AllocateRequest, RunDistributionRequest};
pub use response::{AllocateResponse, ApiError, RunStatus};
pub use state::AppState;
