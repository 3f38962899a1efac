//! Access decisions.
//!
//! Every operation declares a [`Requirement`] naming both the capability bits and the
//! account types that may perform it. The configured [`AuthorizationStrategy`] picks which
//! half is evaluated. A super-admin is allowed everything under either strategy.
//!
//! A capability requirement is satisfied when the actor holds *any* of its bits, not all
//! of them. Several requirements rely on this to admit more than one kind of holder.

use serde::Serialize;

use crate::config::AuthorizationStrategy;
use crate::error::{ShsError, ShsResult};
use crate::models::{Account, RowId};
use crate::permissions::{AccountType, Permissions};

/// The authenticated account performing an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: RowId,
    pub username: String,
    pub display_name: String,
    pub account_type: AccountType,
    pub permissions: Permissions,
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.account_type == AccountType::SuperAdmin
    }
}

impl From<&Account> for Actor {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            account_type: account.account_type,
            permissions: account.permissions,
        }
    }
}

/// What an operation asks of its actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub permissions: Permissions,
    pub roles: &'static [AccountType],
}

impl Requirement {
    pub const fn new(permissions: Permissions, roles: &'static [AccountType]) -> Self {
        Self { permissions, roles }
    }
}

pub trait AuthorizationPolicy: Send + Sync {
    /// Decision for a non-super-admin actor.
    fn allows(&self, actor: &Actor, requirement: &Requirement) -> bool;
}

/// Allows when the actor holds at least one of the required bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct CapabilityPolicy;

impl AuthorizationPolicy for CapabilityPolicy {
    fn allows(&self, actor: &Actor, requirement: &Requirement) -> bool {
        actor.permissions.intersects(requirement.permissions)
    }
}

/// Allows when the actor's account type is in the required role list.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolePolicy;

impl AuthorizationPolicy for RolePolicy {
    fn allows(&self, actor: &Actor, requirement: &Requirement) -> bool {
        requirement.roles.contains(&actor.account_type)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Authorizer {
    strategy: AuthorizationStrategy,
}

impl Authorizer {
    pub fn new(strategy: AuthorizationStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AuthorizationStrategy {
        self.strategy
    }

    fn policy(&self) -> &'static dyn AuthorizationPolicy {
        match self.strategy {
            AuthorizationStrategy::Capabilities => &CapabilityPolicy,
            AuthorizationStrategy::Roles => &RolePolicy,
        }
    }

    pub fn authorize(&self, actor: &Actor, requirement: &Requirement) -> bool {
        actor.is_super_admin() || self.policy().allows(actor, requirement)
    }

    /// Like [`Authorizer::authorize`] but yields `PermissionDenied` on refusal.
    pub fn require(&self, actor: &Actor, requirement: &Requirement) -> ShsResult<()> {
        if self.authorize(actor, requirement) {
            return Ok(());
        }
        tracing::debug!(
            actor_id = actor.id,
            account_type = %actor.account_type,
            required = ?requirement.permissions,
            strategy = %self.strategy,
            "authorization denied"
        );
        Err(ShsError::PermissionDenied)
    }
}

/// Requirement of every gated operation.
///
/// Role lists name exactly the account types whose default permission set satisfies the
/// capability half, so both strategies agree for accounts that keep their defaults.
pub mod rules {
    use super::Requirement;
    use crate::permissions::AccountType::{Admin, Patient, Secretary};
    use crate::permissions::{AccountType, Permissions as P};

    const ADMIN: &[AccountType] = &[Admin];
    const STAFF: &[AccountType] = &[Secretary, Admin];
    const SELF_SERVICE: &[AccountType] = &[Patient, Admin];

    pub const CREATE_ACCOUNT: Requirement = Requirement::new(P::WRITE_ACCOUNTS, ADMIN);
    pub const GET_ACCOUNT: Requirement = Requirement::new(P::READ_ACCOUNTS, ADMIN);
    pub const LIST_ACCOUNTS: Requirement = Requirement::new(P::READ_ACCOUNTS, ADMIN);
    pub const UPDATE_ACCOUNT: Requirement = Requirement::new(P::WRITE_ACCOUNTS, ADMIN);
    pub const DELETE_ACCOUNT: Requirement = Requirement::new(P::WRITE_ACCOUNTS, ADMIN);
    /// Checked in addition when deleting an admin-level account or granting the admin bit.
    pub const WRITE_ADMIN_ACCOUNTS: Requirement = Requirement::new(P::WRITE_ADMINS, &[]);

    pub const CREATE_BLOOD_TEST: Requirement = Requirement::new(P::WRITE_BLOOD_TEST, STAFF);
    pub const GET_BLOOD_TEST: Requirement = Requirement::new(P::READ_BLOOD_TEST, STAFF);
    pub const DELETE_BLOOD_TEST: Requirement = Requirement::new(P::WRITE_BLOOD_TEST, STAFF);
    pub const LIST_BLOOD_TESTS: Requirement = Requirement::new(P::READ_BLOOD_TEST, STAFF);

    pub const CREATE_VIRUS: Requirement = Requirement::new(P::WRITE_VIRUS, ADMIN);
    pub const DELETE_VIRUS: Requirement = Requirement::new(P::WRITE_VIRUS, ADMIN);
    /// Patient registration picks from this list, so patient writers may read it.
    pub const LIST_VIRUSES: Requirement =
        Requirement::new(P::READ_VIRUS.union(P::WRITE_PATIENT), STAFF);

    pub const CREATE_MEDICINE: Requirement = Requirement::new(P::WRITE_MEDICINE, STAFF);
    pub const GET_MEDICINE: Requirement = Requirement::new(P::READ_MEDICINE, STAFF);
    pub const UPDATE_MEDICINE: Requirement = Requirement::new(P::WRITE_MEDICINE, STAFF);
    pub const DELETE_MEDICINE: Requirement = Requirement::new(P::WRITE_MEDICINE, STAFF);
    pub const LIST_MEDICINES: Requirement = Requirement::new(P::READ_MEDICINE, STAFF);

    pub const CREATE_DIAGNOSIS: Requirement = Requirement::new(P::WRITE_DIAGNOSES, ADMIN);
    pub const DELETE_DIAGNOSIS: Requirement = Requirement::new(P::WRITE_DIAGNOSES, ADMIN);
    pub const LIST_DIAGNOSES: Requirement =
        Requirement::new(P::READ_DIAGNOSES.union(P::WRITE_PATIENT), STAFF);

    pub const CREATE_PATIENT: Requirement = Requirement::new(P::WRITE_PATIENT, STAFF);
    pub const GET_PATIENT: Requirement = Requirement::new(P::READ_PATIENT, STAFF);
    pub const FIND_PATIENTS: Requirement = Requirement::new(P::READ_PATIENT, STAFF);
    pub const LIST_RECENT_PATIENTS: Requirement = Requirement::new(P::READ_PATIENT, STAFF);
    pub const DELETE_PATIENT: Requirement = Requirement::new(P::WRITE_PATIENT, STAFF);
    pub const CREATE_BLOOD_TEST_RESULT: Requirement = Requirement::new(P::WRITE_PATIENT, STAFF);
    pub const UPDATE_PENDING_BLOOD_TEST_RESULT: Requirement =
        Requirement::new(P::WRITE_PATIENT, STAFF);
    pub const CREATE_JOINTS_EVALUATION: Requirement = Requirement::new(P::WRITE_PATIENT, STAFF);
    pub const CREATE_DIAGNOSIS_RESULT: Requirement = Requirement::new(P::WRITE_PATIENT, STAFF);

    pub const CREATE_VISIT: Requirement = Requirement::new(P::WRITE_OTHER_VISITS, STAFF);
    pub const LIST_OTHER_VISITS: Requirement = Requirement::new(P::READ_OTHER_VISITS, STAFF);
    pub const LIST_OWN_VISITS: Requirement = Requirement::new(P::READ_OWN_VISIT, SELF_SERVICE);
    pub const GET_LAST_VISIT: Requirement = Requirement::new(P::READ_OWN_VISIT, SELF_SERVICE);
    pub const USE_MEDICINE: Requirement = Requirement::new(P::WRITE_OWN_VISIT, SELF_SERVICE);

    pub const ALL: &[(&str, Requirement)] = &[
        ("create_account", CREATE_ACCOUNT),
        ("get_account", GET_ACCOUNT),
        ("list_accounts", LIST_ACCOUNTS),
        ("update_account", UPDATE_ACCOUNT),
        ("delete_account", DELETE_ACCOUNT),
        ("write_admin_accounts", WRITE_ADMIN_ACCOUNTS),
        ("create_blood_test", CREATE_BLOOD_TEST),
        ("get_blood_test", GET_BLOOD_TEST),
        ("delete_blood_test", DELETE_BLOOD_TEST),
        ("list_blood_tests", LIST_BLOOD_TESTS),
        ("create_virus", CREATE_VIRUS),
        ("delete_virus", DELETE_VIRUS),
        ("list_viruses", LIST_VIRUSES),
        ("create_medicine", CREATE_MEDICINE),
        ("get_medicine", GET_MEDICINE),
        ("update_medicine", UPDATE_MEDICINE),
        ("delete_medicine", DELETE_MEDICINE),
        ("list_medicines", LIST_MEDICINES),
        ("create_diagnosis", CREATE_DIAGNOSIS),
        ("delete_diagnosis", DELETE_DIAGNOSIS),
        ("list_diagnoses", LIST_DIAGNOSES),
        ("create_patient", CREATE_PATIENT),
        ("get_patient", GET_PATIENT),
        ("find_patients", FIND_PATIENTS),
        ("list_recent_patients", LIST_RECENT_PATIENTS),
        ("delete_patient", DELETE_PATIENT),
        ("create_blood_test_result", CREATE_BLOOD_TEST_RESULT),
        ("update_pending_blood_test_result", UPDATE_PENDING_BLOOD_TEST_RESULT),
        ("create_joints_evaluation", CREATE_JOINTS_EVALUATION),
        ("create_diagnosis_result", CREATE_DIAGNOSIS_RESULT),
        ("create_visit", CREATE_VISIT),
        ("list_other_visits", LIST_OTHER_VISITS),
        ("list_own_visits", LIST_OWN_VISITS),
        ("get_last_visit", GET_LAST_VISIT),
        ("use_medicine", USE_MEDICINE),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{ADMIN_PERMISSIONS, PATIENT_PERMISSIONS, SECRETARY_PERMISSIONS};

    fn actor(account_type: AccountType, permissions: Permissions) -> Actor {
        Actor {
            id: 1,
            username: "someone".into(),
            display_name: "Someone".into(),
            account_type,
            permissions,
        }
    }

    #[test]
    fn super_admin_is_allowed_regardless_of_bits() {
        let root = actor(AccountType::SuperAdmin, Permissions::NONE);
        for strategy in [AuthorizationStrategy::Capabilities, AuthorizationStrategy::Roles] {
            let authorizer = Authorizer::new(strategy);
            for (name, requirement) in rules::ALL {
                assert!(authorizer.authorize(&root, requirement), "{name} under {strategy}");
            }
        }
    }

    #[test]
    fn capability_checks_are_any_of() {
        let authorizer = Authorizer::new(AuthorizationStrategy::Capabilities);
        let clerk = actor(AccountType::Secretary, Permissions::WRITE_PATIENT);

        let either = Requirement::new(Permissions::READ_VIRUS | Permissions::WRITE_PATIENT, &[]);
        assert!(authorizer.authorize(&clerk, &either));

        let neither = Requirement::new(Permissions::READ_VIRUS | Permissions::WRITE_VIRUS, &[]);
        assert!(!authorizer.authorize(&clerk, &neither));

        let nobody = actor(AccountType::Secretary, Permissions::NONE);
        assert!(!authorizer.authorize(&nobody, &either));
    }

    #[test]
    fn role_strategy_ignores_bits() {
        let authorizer = Authorizer::new(AuthorizationStrategy::Roles);
        let secretary = actor(AccountType::Secretary, Permissions::NONE);
        assert!(authorizer.authorize(&secretary, &rules::CREATE_PATIENT));

        let loaded = actor(AccountType::Secretary, Permissions::ALL);
        assert!(!authorizer.authorize(&loaded, &rules::CREATE_VIRUS));
    }

    #[test]
    fn deleting_admins_needs_the_admin_bit() {
        let admin = actor(AccountType::Admin, ADMIN_PERMISSIONS);
        for strategy in [AuthorizationStrategy::Capabilities, AuthorizationStrategy::Roles] {
            let authorizer = Authorizer::new(strategy);
            assert!(authorizer.authorize(&admin, &rules::DELETE_ACCOUNT));
            assert!(!authorizer.authorize(&admin, &rules::WRITE_ADMIN_ACCOUNTS));
        }
    }

    #[test]
    fn role_lists_match_default_permission_sets() {
        for (name, requirement) in rules::ALL {
            for role in [AccountType::Patient, AccountType::Secretary, AccountType::Admin] {
                assert_eq!(
                    requirement.roles.contains(&role),
                    role.default_permissions().intersects(requirement.permissions),
                    "{name} disagrees for {role}"
                );
            }
        }
    }

    #[test]
    fn patients_reach_only_their_own_visits() {
        let authorizer = Authorizer::new(AuthorizationStrategy::Capabilities);
        let patient = actor(AccountType::Patient, PATIENT_PERMISSIONS);
        assert!(authorizer.authorize(&patient, &rules::GET_LAST_VISIT));
        assert!(authorizer.authorize(&patient, &rules::USE_MEDICINE));
        assert!(!authorizer.authorize(&patient, &rules::LIST_OTHER_VISITS));
        assert!(!authorizer.authorize(&patient, &rules::GET_PATIENT));
    }

    #[test]
    fn require_reports_permission_denied() {
        let authorizer = Authorizer::default();
        let secretary = actor(AccountType::Secretary, SECRETARY_PERMISSIONS);
        assert!(authorizer.require(&secretary, &rules::CREATE_PATIENT).is_ok());
        assert!(matches!(
            authorizer.require(&secretary, &rules::CREATE_ACCOUNT),
            Err(ShsError::PermissionDenied)
        ));
    }
}
