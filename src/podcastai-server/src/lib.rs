//! HTTP surface and command-line front end for the podcast pipeline.

pub mod console;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
