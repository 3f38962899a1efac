//! Request and response bodies of the SHS HTTP surface.
//!
//! Requests convert into core inputs with `From`/`TryFrom`; responses are built from core
//! models and views. Enum and timestamp fields keep their core types and are documented as
//! strings.

pub mod accounts;
pub mod catalogue;
pub mod error;
pub mod patients;
pub mod visits;

pub use accounts::*;
pub use catalogue::*;
pub use error::*;
pub use patients::*;
pub use visits::*;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of operations that only report success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessRes {
    pub success: bool,
}

impl SuccessRes {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
