//! Login, session lookup and the bootstrap super-admin.

use rand::RngCore;

use crate::authorizer::Actor;
use crate::constants::SESSION_TOKEN_BYTES;
use crate::context::AppContext;
use crate::error::{ShsError, ShsResult};
use crate::models::{Account, NewAccount};
use crate::permissions::{AccountType, Permissions};
use crate::store::StoreError;
use crate::validation::validate_username;

/// A freshly issued session.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

pub struct AuthService {
    ctx: AppContext,
}

impl AuthService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub fn login(&self, username: &str, password: &str) -> ShsResult<Session> {
        let account = match self.ctx.store().get_account_by_username(username.trim()) {
            Ok(account) => account,
            Err(StoreError::NotFound(_)) => return Err(ShsError::InvalidCredentials),
            Err(err) => return Err(err.into()),
        };

        if !self.ctx.hasher().verify(password, &account.password_hash)? {
            tracing::debug!(account_id = account.id, "login rejected");
            return Err(ShsError::InvalidCredentials);
        }

        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.ctx
            .sessions()
            .set_session(&token, &account, self.ctx.cfg().session_ttl())?;
        tracing::info!(account_id = account.id, "session opened");

        Ok(Session { token, account })
    }

    /// Resolves a session token to the account's current state.
    ///
    /// A token whose account has since been deleted is invalidated.
    pub fn authenticate(&self, token: &str) -> ShsResult<Actor> {
        let cached = self.ctx.sessions().get_session(token)?;
        match self.ctx.store().get_account(cached.id) {
            Ok(account) => Ok(Actor::from(&account)),
            Err(StoreError::NotFound(_)) => {
                self.ctx.sessions().invalidate(token)?;
                Err(ShsError::InvalidSessionToken)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The stored account behind an authenticated actor.
    pub fn current_account(&self, actor: &Actor) -> ShsResult<Account> {
        Ok(self.ctx.store().get_account(actor.id)?)
    }

    pub fn logout(&self, token: &str) -> ShsResult<()> {
        self.ctx.sessions().invalidate(token)
    }

    /// Creates the super-admin unless an account with `username` already exists.
    ///
    /// Returns whether an account was created.
    pub fn seed_super_admin(&self, username: &str, password: &str) -> ShsResult<bool> {
        let username = validate_username(username)?;
        match self.ctx.store().get_account_by_username(&username) {
            Ok(_) => return Ok(false),
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let password_hash = self.ctx.hasher().hash(password)?;
        let account = self.ctx.store().create_account(NewAccount {
            display_name: "Super Admin".into(),
            username,
            password_hash,
            account_type: AccountType::SuperAdmin,
            permissions: Permissions::ALL,
        })?;
        tracing::info!(account_id = account.id, "super admin seeded");
        Ok(true)
    }
}
