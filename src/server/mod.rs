//! HTTP surface: router and handlers.

mod handlers;
mod router;

pub use handlers::{LockResponse, LockValueResponse};
pub use router::build_router;
