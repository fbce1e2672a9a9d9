//! envmon HTTP server
//!
//! Serves the reading and state endpoints the sensor device posts to, and
//! the derived dashboard data the front end renders.

pub mod api;
pub mod error;
pub mod feeder;

pub use api::{router, AppState};
pub use error::ApiError;
