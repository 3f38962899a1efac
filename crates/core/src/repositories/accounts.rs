//! Staff account management.
//!
//! Patient accounts are provisioned by patient registration, and the super-admin by the
//! bootstrap seed; neither can be created here.

use crate::authorizer::{rules, Actor};
use crate::context::AppContext;
use crate::error::{ShsError, ShsResult};
use crate::models::{Account, AccountUpdate, NewAccount, RowId};
use crate::permissions::{AccountType, Permissions};
use crate::validation::validate_username;
use shs_types::NonEmptyText;

#[derive(Clone, Debug)]
pub struct CreateAccountRequest {
    pub display_name: String,
    pub username: String,
    pub password: String,
    /// Overrides the account type's default permission set.
    pub permissions: Option<Permissions>,
}

#[derive(Clone, Debug, Default)]
pub struct AccountChanges {
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<Permissions>,
}

pub struct AccountService {
    ctx: AppContext,
}

impl AccountService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn create_secretary_account(
        &self,
        actor: &Actor,
        request: CreateAccountRequest,
    ) -> ShsResult<Account> {
        self.create(actor, AccountType::Secretary, request)
    }

    pub fn create_admin_account(
        &self,
        actor: &Actor,
        request: CreateAccountRequest,
    ) -> ShsResult<Account> {
        self.create(actor, AccountType::Admin, request)
    }

    fn create(
        &self,
        actor: &Actor,
        account_type: AccountType,
        request: CreateAccountRequest,
    ) -> ShsResult<Account> {
        let authorizer = self.ctx.authorizer();
        authorizer.require(actor, &rules::CREATE_ACCOUNT)?;

        let permissions = request
            .permissions
            .unwrap_or_else(|| account_type.default_permissions());
        if permissions.intersects(Permissions::WRITE_ADMINS) {
            authorizer.require(actor, &rules::WRITE_ADMIN_ACCOUNTS)?;
        }

        let display_name = NonEmptyText::new(&request.display_name)?.into_inner();
        let username = validate_username(&request.username)?;
        let password_hash = self.ctx.hasher().hash(&request.password)?;

        let account = self.ctx.store().create_account(NewAccount {
            display_name,
            username,
            password_hash,
            account_type,
            permissions,
        })?;
        tracing::info!(
            account_id = account.id,
            account_type = %account_type,
            created_by = actor.id,
            "account created"
        );
        Ok(account)
    }

    pub fn get_account(&self, actor: &Actor, id: RowId) -> ShsResult<Account> {
        self.ctx.authorizer().require(actor, &rules::GET_ACCOUNT)?;
        Ok(self.ctx.store().get_account(id)?)
    }

    pub fn list_accounts(&self, actor: &Actor) -> ShsResult<Vec<Account>> {
        self.ctx.authorizer().require(actor, &rules::LIST_ACCOUNTS)?;
        Ok(self.ctx.store().list_accounts()?)
    }

    pub fn update_account(
        &self,
        actor: &Actor,
        id: RowId,
        changes: AccountChanges,
    ) -> ShsResult<Account> {
        let authorizer = self.ctx.authorizer();
        authorizer.require(actor, &rules::UPDATE_ACCOUNT)?;

        let target = self.ctx.store().get_account(id)?;
        let grants_admin_bit = changes
            .permissions
            .is_some_and(|p| p.intersects(Permissions::WRITE_ADMINS));
        if target.account_type.is_admin_level() || grants_admin_bit {
            authorizer.require(actor, &rules::WRITE_ADMIN_ACCOUNTS)?;
        }

        let update = AccountUpdate {
            display_name: changes
                .display_name
                .map(|n| NonEmptyText::new(n).map(NonEmptyText::into_inner))
                .transpose()?,
            username: changes
                .username
                .map(|u| validate_username(&u))
                .transpose()?,
            password_hash: changes
                .password
                .map(|p| self.ctx.hasher().hash(&p))
                .transpose()?,
            permissions: changes.permissions,
        };

        let account = self.ctx.store().update_account(id, update)?;
        tracing::info!(account_id = id, updated_by = actor.id, "account updated");
        Ok(account)
    }

    /// Deleting an admin-level account also needs the admin-accounts write bit.
    pub fn delete_account(&self, actor: &Actor, id: RowId) -> ShsResult<()> {
        let authorizer = self.ctx.authorizer();
        authorizer.require(actor, &rules::DELETE_ACCOUNT)?;

        let target = self.ctx.store().get_account(id)?;
        if target.account_type.is_admin_level() {
            authorizer.require(actor, &rules::WRITE_ADMIN_ACCOUNTS)?;
        }
        if target.id == actor.id {
            return Err(ShsError::validation("an account cannot delete itself"));
        }

        self.ctx.store().delete_account(id)?;
        tracing::info!(account_id = id, deleted_by = actor.id, "account deleted");
        Ok(())
    }
}
