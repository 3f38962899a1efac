//! Account permission vocabulary.
//!
//! Every grantable capability is one bit of a 64-bit set. Bit positions are persisted with
//! accounts and must never be renumbered: read bit then write bit per category, in the
//! order accounts, patients, medicine, virus, blood test, own visit, other visits,
//! diagnoses, followed by the admin-account write bit.
//!
//! The role to bit-set mappings are `const` data computed at compile time.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ShsError, ShsResult};

/// The kind of an account. Decides the permission set granted on creation and is the
/// unit of membership for the role-list authorization strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Patient,
    Secretary,
    Admin,
    SuperAdmin,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Secretary => "secretary",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Permission set granted to a newly created account of this type.
    pub fn default_permissions(self) -> Permissions {
        match self {
            Self::Patient => PATIENT_PERMISSIONS,
            Self::Secretary => SECRETARY_PERMISSIONS,
            Self::Admin => ADMIN_PERMISSIONS,
            Self::SuperAdmin => Permissions::ALL,
        }
    }

    /// Admin-level accounts may only be removed by holders of [`Permissions::WRITE_ADMINS`].
    pub fn is_admin_level(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ShsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "secretary" => Ok(Self::Secretary),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            other => Err(ShsError::validation(format!("unknown account type: {other}"))),
        }
    }
}

/// A set of capability bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u64);

impl Permissions {
    pub const NONE: Self = Self(0);

    pub const READ_ACCOUNTS: Self = Self(1 << 0);
    pub const WRITE_ACCOUNTS: Self = Self(1 << 1);
    pub const READ_PATIENT: Self = Self(1 << 2);
    pub const WRITE_PATIENT: Self = Self(1 << 3);
    pub const READ_MEDICINE: Self = Self(1 << 4);
    pub const WRITE_MEDICINE: Self = Self(1 << 5);
    pub const READ_VIRUS: Self = Self(1 << 6);
    pub const WRITE_VIRUS: Self = Self(1 << 7);
    pub const READ_BLOOD_TEST: Self = Self(1 << 8);
    pub const WRITE_BLOOD_TEST: Self = Self(1 << 9);
    pub const READ_OWN_VISIT: Self = Self(1 << 10);
    pub const WRITE_OWN_VISIT: Self = Self(1 << 11);
    pub const READ_OTHER_VISITS: Self = Self(1 << 12);
    pub const WRITE_OTHER_VISITS: Self = Self(1 << 13);
    pub const READ_DIAGNOSES: Self = Self(1 << 14);
    pub const WRITE_DIAGNOSES: Self = Self(1 << 15);
    pub const WRITE_ADMINS: Self = Self(1 << 16);

    pub const ALL: Self = Self((1 << 17) - 1);

    /// Every named bit, in bit order.
    pub const NAMED: [(&'static str, Permissions); 17] = [
        ("read_accounts", Self::READ_ACCOUNTS),
        ("write_accounts", Self::WRITE_ACCOUNTS),
        ("read_patient", Self::READ_PATIENT),
        ("write_patient", Self::WRITE_PATIENT),
        ("read_medicine", Self::READ_MEDICINE),
        ("write_medicine", Self::WRITE_MEDICINE),
        ("read_virus", Self::READ_VIRUS),
        ("write_virus", Self::WRITE_VIRUS),
        ("read_blood_test", Self::READ_BLOOD_TEST),
        ("write_blood_test", Self::WRITE_BLOOD_TEST),
        ("read_own_visit", Self::READ_OWN_VISIT),
        ("write_own_visit", Self::WRITE_OWN_VISIT),
        ("read_other_visits", Self::READ_OTHER_VISITS),
        ("write_other_visits", Self::WRITE_OTHER_VISITS),
        ("read_diagnoses", Self::READ_DIAGNOSES),
        ("write_diagnoses", Self::WRITE_DIAGNOSES),
        ("write_admins", Self::WRITE_ADMINS),
    ];

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Keeps unknown bits; use [`Permissions::from_bits`] to reject them.
    pub const fn from_bits_retain(bits: u64) -> Self {
        Self(bits)
    }

    pub fn from_bits(bits: u64) -> Option<Self> {
        if bits & !Self::ALL.0 != 0 {
            return None;
        }
        Some(Self(bits))
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when at least one bit of `other` is present.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when every bit of `other` is present.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Names of the bits present in this set, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, bit)| self.contains(*bit))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({:#x}: {})", self.0, self.names().join(" | "))
    }
}

pub const PATIENT_PERMISSIONS: Permissions =
    Permissions::READ_OWN_VISIT.union(Permissions::WRITE_OWN_VISIT);

pub const SECRETARY_PERMISSIONS: Permissions = Permissions::READ_PATIENT
    .union(Permissions::WRITE_PATIENT)
    .union(Permissions::READ_MEDICINE)
    .union(Permissions::WRITE_MEDICINE)
    .union(Permissions::READ_BLOOD_TEST)
    .union(Permissions::WRITE_BLOOD_TEST)
    .union(Permissions::READ_OTHER_VISITS)
    .union(Permissions::WRITE_OTHER_VISITS);

pub const ADMIN_PERMISSIONS: Permissions = SECRETARY_PERMISSIONS
    .union(Permissions::READ_ACCOUNTS)
    .union(Permissions::WRITE_ACCOUNTS)
    .union(Permissions::READ_VIRUS)
    .union(Permissions::WRITE_VIRUS)
    .union(Permissions::READ_OWN_VISIT)
    .union(Permissions::WRITE_OWN_VISIT)
    .union(Permissions::READ_DIAGNOSES)
    .union(Permissions::WRITE_DIAGNOSES);

/// One permission value as it may arrive from a client: a number or a numeric string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    Number(u64),
    Text(String),
}

/// Permission request payload: either a single value or a list of values.
///
/// [`PermissionsInput::normalize`] validates it once into a canonical [`Permissions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionsInput {
    One(PermissionValue),
    Many(Vec<PermissionValue>),
}

impl PermissionValue {
    fn to_flag(&self) -> ShsResult<Permissions> {
        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ShsError::validation(format!("invalid permissions value: {s:?}")))?,
        };

        if raw == 0 || raw & (raw - 1) != 0 {
            return Err(ShsError::validation(format!(
                "permissions value {raw} is not a single permission"
            )));
        }

        Permissions::from_bits(raw)
            .ok_or_else(|| ShsError::validation(format!("unknown permission bit {raw}")))
    }
}

impl PermissionsInput {
    pub fn normalize(&self) -> ShsResult<Permissions> {
        match self {
            Self::One(value) => value.to_flag(),
            Self::Many(values) => values
                .iter()
                .try_fold(Permissions::NONE, |acc, v| Ok(acc | v.to_flag()?)),
        }
    }
}

impl From<Permissions> for PermissionsInput {
    fn from(permissions: Permissions) -> Self {
        Self::Many(
            Permissions::NAMED
                .iter()
                .filter(|(_, bit)| permissions.contains(*bit))
                .map(|(_, bit)| PermissionValue::Number(bit.bits()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_bits_are_distinct_powers_of_two() {
        let mut seen = Permissions::NONE;
        for (name, bit) in Permissions::NAMED {
            assert_eq!(bit.bits().count_ones(), 1, "{name} must be a single bit");
            assert!(!seen.intersects(bit), "{name} overlaps another bit");
            seen |= bit;
        }
        assert_eq!(seen, Permissions::ALL);
    }

    #[test]
    fn bit_positions_are_stable() {
        assert_eq!(Permissions::READ_ACCOUNTS.bits(), 1);
        assert_eq!(Permissions::WRITE_PATIENT.bits(), 8);
        assert_eq!(Permissions::READ_BLOOD_TEST.bits(), 256);
        assert_eq!(Permissions::WRITE_DIAGNOSES.bits(), 1 << 15);
    }

    #[test]
    fn admin_extends_secretary() {
        assert!(ADMIN_PERMISSIONS.contains(SECRETARY_PERMISSIONS));
        assert!(ADMIN_PERMISSIONS.contains(Permissions::WRITE_ACCOUNTS | Permissions::WRITE_VIRUS));
        assert!(!SECRETARY_PERMISSIONS.intersects(Permissions::READ_ACCOUNTS));
        assert!(!ADMIN_PERMISSIONS.intersects(Permissions::WRITE_ADMINS));
    }

    #[test]
    fn account_type_parses_both_super_admin_spellings() {
        assert_eq!("superadmin".parse::<AccountType>().unwrap(), AccountType::SuperAdmin);
        assert_eq!("Super_Admin".parse::<AccountType>().unwrap(), AccountType::SuperAdmin);
        assert!("doctor".parse::<AccountType>().is_err());
    }

    #[test]
    fn single_string_value_normalizes() {
        let input: PermissionsInput = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(input.normalize().unwrap(), Permissions::READ_PATIENT);
    }

    #[test]
    fn list_of_mixed_values_is_ored() {
        let input: PermissionsInput = serde_json::from_str(r#"["4", 8, "16"]"#).unwrap();
        assert_eq!(
            input.normalize().unwrap(),
            Permissions::READ_PATIENT | Permissions::WRITE_PATIENT | Permissions::READ_MEDICINE
        );
    }

    #[test]
    fn combined_value_is_rejected() {
        let input: PermissionsInput = serde_json::from_str("\"12\"").unwrap();
        assert!(matches!(input.normalize(), Err(ShsError::Validation(_))));

        let input: PermissionsInput = serde_json::from_str(r#"[4, 12]"#).unwrap();
        assert!(matches!(input.normalize(), Err(ShsError::Validation(_))));
    }

    #[test]
    fn zero_unknown_and_garbage_values_are_rejected() {
        for raw in [r#""0""#, r#""abc""#, "131072"] {
            let input: PermissionsInput = serde_json::from_str(raw).unwrap();
            assert!(input.normalize().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn empty_list_is_the_empty_set() {
        let input: PermissionsInput = serde_json::from_str("[]").unwrap();
        assert_eq!(input.normalize().unwrap(), Permissions::NONE);
    }

    #[test]
    fn permissions_round_trip_through_input() {
        let input = PermissionsInput::from(SECRETARY_PERMISSIONS);
        assert_eq!(input.normalize().unwrap(), SECRETARY_PERMISSIONS);
    }
}
