//! # API REST
//!
//! REST API implementation for SHS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (session token extraction, error responses, CORS)
//!
//! Uses `api-shared` for wire types and `shs-core` for every operation.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod startup;

pub use error::{ApiError, ApiResult};
pub use router::{router, ApiDoc, AppState};
