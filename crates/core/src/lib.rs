//! # SHS Core
//!
//! Core business logic for the SHS hemophilia clinic registry.
//!
//! This crate contains the domain model and the operations over it:
//! - Accounts, permission bitsets and the authorization checks guarding every operation
//! - Patient registration and the aggregated patient record
//! - Catalogue data (blood tests, viruses, medicines, diagnoses)
//! - Visits with prescribed medicine and stock accounting
//!
//! **No API concerns**: HTTP servers, request decoding and response shapes belong in
//! `api-rest` and `api-shared`.

pub mod authorizer;
pub mod config;
pub mod constants;
pub mod context;
pub mod credentials;
pub mod error;
pub mod models;
pub mod permissions;
pub mod repositories;
pub mod session;
pub mod store;
pub mod validation;

pub use authorizer::{Actor, AuthorizationPolicy, Authorizer, Requirement};
pub use config::{AuthorizationStrategy, CoreConfig, UnresolvedReferencePolicy};
pub use context::AppContext;
pub use credentials::{CredentialHasher, Pbkdf2Hasher};
pub use error::{ShsError, ShsResult};
pub use permissions::{AccountType, Permissions, PermissionsInput};
pub use repositories::accounts::AccountService;
pub use repositories::auth::AuthService;
pub use repositories::catalogue::CatalogueService;
pub use repositories::patients::PatientService;
pub use repositories::visits::VisitService;
pub use session::{MemorySessionCache, SessionCache};
pub use store::{MemoryStore, Store, StoreError};
