//! Address deduplication.
//!
//! Free-text addresses are matched case-insensitively by substring on every non-empty
//! field. A single match is reused; zero or several matches create a new row. Ambiguity
//! never picks a "best" candidate.
//!
//! The search and the insert are separate store calls, so two concurrent registrations of
//! the same new address may both insert it.

use crate::context::AppContext;
use crate::error::ShsResult;
use crate::models::{Address, AddressFields};

pub struct AddressResolver {
    ctx: AppContext,
}

impl AddressResolver {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn resolve_or_create(&self, fields: &AddressFields) -> ShsResult<Address> {
        let fields = fields.trimmed();
        let mut matches = self.ctx.store().search_addresses(&fields)?;

        if matches.len() == 1 {
            if let Some(existing) = matches.pop() {
                tracing::debug!(address_id = existing.id, "reusing address");
                return Ok(existing);
            }
        }

        tracing::debug!(candidates = matches.len(), "creating address");
        Ok(self.ctx.store().create_address(fields)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::testing;
    use crate::store::Store;

    #[test]
    fn unambiguous_triple_resolves_to_the_same_row() {
        let (ctx, store) = testing::context();
        let resolver = AddressResolver::new(ctx);
        let fields = AddressFields::new("Homs", "Al-Waer", "Main");

        let first = resolver.resolve_or_create(&fields).unwrap();
        let second = resolver.resolve_or_create(&fields).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.search_addresses(&AddressFields::default()).unwrap().len(), 1);
    }

    #[test]
    fn unmatched_triple_creates_exactly_one_row() {
        let (ctx, store) = testing::context();
        store
            .create_address(AddressFields::new("Aleppo", "Aziziyeh", ""))
            .unwrap();
        let resolver = AddressResolver::new(ctx);

        let created = resolver
            .resolve_or_create(&AddressFields::new("Latakia", "", ""))
            .unwrap();

        assert_eq!(created.governorate, "Latakia");
        assert_eq!(store.search_addresses(&AddressFields::default()).unwrap().len(), 2);
    }

    #[test]
    fn ambiguous_governorate_creates_a_third_row() {
        let (ctx, store) = testing::context();
        let a = store
            .create_address(AddressFields::new("Damascus", "Mezzeh", ""))
            .unwrap();
        let b = store
            .create_address(AddressFields::new("Damascus", "Kafr Sousa", ""))
            .unwrap();
        let resolver = AddressResolver::new(ctx);

        let resolved = resolver
            .resolve_or_create(&AddressFields::new("Damascus", "", ""))
            .unwrap();

        assert_ne!(resolved.id, a.id);
        assert_ne!(resolved.id, b.id);
        assert_eq!(store.search_addresses(&AddressFields::default()).unwrap().len(), 3);
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        let (ctx, store) = testing::context();
        let existing = store
            .create_address(AddressFields::new("Tartus", "Corniche", ""))
            .unwrap();
        let resolver = AddressResolver::new(ctx);

        let resolved = resolver
            .resolve_or_create(&AddressFields::new("  tartus ", "CORNICHE", ""))
            .unwrap();
        assert_eq!(resolved.id, existing.id);
    }
}
