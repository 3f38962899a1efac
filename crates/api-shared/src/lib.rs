//! # API Shared
//!
//! Shared utilities and definitions for SHS APIs.
//!
//! Contains:
//! - Wire DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Session token header parsing
//!
//! Used by `api-rest`; any further HTTP surface reuses the same shapes.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::session_token_from_header;
pub use health::{HealthRes, HealthService};
