use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shs_core::models::Account;
use shs_core::permissions::{AccountType, Permissions, PermissionsInput};
use shs_core::repositories::accounts::{AccountChanges, CreateAccountRequest};
use shs_core::repositories::auth::Session;
use shs_core::ShsResult;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub account: AccountRes,
}

impl From<Session> for LoginRes {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            account: session.account.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountRes {
    pub id: u64,
    pub display_name: String,
    pub username: String,
    #[schema(value_type = String, example = "secretary")]
    pub account_type: AccountType,
    pub permissions: u64,
    /// Names of the bits set in `permissions`.
    pub permission_names: Vec<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountRes {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name,
            username: account.username,
            account_type: account.account_type,
            permissions: account.permissions.bits(),
            permission_names: account
                .permissions
                .names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            created_at: account.created_at,
        }
    }
}

/// Permissions arrive as one value or a list; each value is a number or a numeric string
/// naming a single bit.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountReq {
    pub display_name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>, example = json!([16, "32"]))]
    pub permissions: Option<PermissionsInput>,
}

impl CreateAccountReq {
    pub fn into_request(self) -> ShsResult<CreateAccountRequest> {
        Ok(CreateAccountRequest {
            display_name: self.display_name,
            username: self.username,
            password: self.password,
            permissions: normalize(self.permissions)?,
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountReq {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub permissions: Option<PermissionsInput>,
}

impl UpdateAccountReq {
    pub fn into_changes(self) -> ShsResult<AccountChanges> {
        Ok(AccountChanges {
            display_name: self.display_name,
            username: self.username,
            password: self.password,
            permissions: normalize(self.permissions)?,
        })
    }
}

fn normalize(input: Option<PermissionsInput>) -> ShsResult<Option<Permissions>> {
    input.map(|p| p.normalize()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_lists_mix_numbers_and_strings() {
        let req: CreateAccountReq = serde_json::from_value(serde_json::json!({
            "display_name": "Rana",
            "username": "rana",
            "password": "pw",
            "permissions": [16, "32"],
        }))
        .unwrap();

        let request = req.into_request().unwrap();
        assert_eq!(
            request.permissions,
            Some(Permissions::READ_MEDICINE | Permissions::WRITE_MEDICINE)
        );
    }

    #[test]
    fn missing_permissions_keep_the_role_default() {
        let req: CreateAccountReq = serde_json::from_value(serde_json::json!({
            "display_name": "Rana",
            "username": "rana",
            "password": "pw",
        }))
        .unwrap();
        assert_eq!(req.into_request().unwrap().permissions, None);
    }

    #[test]
    fn composite_permission_values_are_rejected() {
        let req: UpdateAccountReq =
            serde_json::from_value(serde_json::json!({ "permissions": 3 })).unwrap();
        assert!(req.into_changes().is_err());
    }
}
