//! Services implementing the gated operations.
//!
//! Every public operation takes the acting [`crate::authorizer::Actor`] explicitly and checks
//! its requirement before touching the store.

pub mod accounts;
pub mod addresses;
pub mod auth;
pub mod catalogue;
pub mod patients;
pub mod visits;

use crate::config::UnresolvedReferencePolicy;
use crate::error::{ShsError, ShsResult};
use crate::models::RowId;

/// Applies the configured policy to ids that did not resolve to a row.
///
/// Returns the ids that were dropped so callers can report them.
pub(crate) fn apply_reference_policy(
    policy: UnresolvedReferencePolicy,
    resource: &'static str,
    requested: &[RowId],
    known: impl Fn(RowId) -> bool,
) -> ShsResult<Vec<RowId>> {
    let unresolved: Vec<RowId> = requested.iter().copied().filter(|id| !known(*id)).collect();
    if unresolved.is_empty() {
        return Ok(unresolved);
    }

    match policy {
        UnresolvedReferencePolicy::Drop => {
            tracing::warn!(resource, ?unresolved, "dropping unknown ids");
            Ok(unresolved)
        }
        UnresolvedReferencePolicy::Reject => Err(ShsError::validation(format!(
            "unknown {resource} ids: {unresolved:?}"
        ))),
    }
}
