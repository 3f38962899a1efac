//! Stored rows and the inputs used to create them.
//!
//! Rows carry only ids for their references. Human-readable names of referenced
//! definitions are joined in at read time by the aggregate builders in
//! [`crate::repositories`].

mod account;
mod address;
mod catalogue;
mod patient;
mod visit;

pub use account::{Account, AccountUpdate, NewAccount};
pub use address::{Address, AddressFields};
pub use blood_test::{
    BloodTest, BloodTestField, BloodTestFilledField, BloodTestResult, BloodTestUnit,
    FilledFieldInput, NewBloodTest, NewBloodTestField, NewBloodTestResult,
};
pub use catalogue::{Diagnosis, Medicine, NewDiagnosis, NewMedicine, NewVirus, Virus};
pub use patient::{
    DiagnosisResult, FirstVisitReason, Gender, JointScores, JointsEvaluation, NewPatient, Patient,
    PatientSearch,
};
pub use visit::{NewVisit, PrescribedMedicine, Visit, VisitReason};

/// Numeric primary key assigned by the store.
pub type RowId = u64;
