//! Persistence interface consumed by the services.
//!
//! The services never see a concrete backend; they hold an `Arc<dyn Store>`. Each call is a
//! single statement from the caller's point of view. Multi-step operations are not wrapped
//! in a transaction.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use shs_types::PublicId;

use crate::error::ShsError;
use crate::models::{
    Account, AccountUpdate, Address, AddressFields, BloodTest, BloodTestResult, Diagnosis,
    DiagnosisResult, FilledFieldInput, JointScores, JointsEvaluation, Medicine, NewAccount,
    NewBloodTest, NewBloodTestResult, NewDiagnosis, NewMedicine, NewPatient, NewVirus, NewVisit,
    Patient, PatientSearch, PrescribedMedicine, RowId, Virus, Visit,
};

/// Errors reported by a [`Store`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already exists")]
    Exists(&'static str),
    #[error("{medicine_name} has {left} packages left, {requested} requested")]
    OutOfStock {
        medicine_name: String,
        requested: u32,
        left: u32,
    },
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ShsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource) => ShsError::NotFound { resource },
            StoreError::Exists(resource) => ShsError::AlreadyExists { resource },
            StoreError::OutOfStock {
                medicine_name,
                requested,
                left,
            } => ShsError::InsufficientMedicineAmount {
                medicine_name,
                exceeding_amount: requested.saturating_sub(left),
                left_packages: left,
            },
            StoreError::Backend(message) => ShsError::Store(message),
        }
    }
}

pub trait Store: Send + Sync {
    // Accounts. Usernames are unique across every account type.
    fn create_account(&self, account: NewAccount) -> StoreResult<Account>;
    fn get_account(&self, id: RowId) -> StoreResult<Account>;
    fn get_account_by_username(&self, username: &str) -> StoreResult<Account>;
    fn update_account(&self, id: RowId, update: AccountUpdate) -> StoreResult<Account>;
    fn delete_account(&self, id: RowId) -> StoreResult<()>;
    fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    // Addresses.
    fn create_address(&self, fields: AddressFields) -> StoreResult<Address>;
    fn get_address(&self, id: RowId) -> StoreResult<Address>;
    /// Case-insensitive substring search over the non-empty fields of `query`.
    fn search_addresses(&self, query: &AddressFields) -> StoreResult<Vec<Address>>;

    // Patients. National ids and public ids are unique.
    fn create_patient(&self, patient: NewPatient) -> StoreResult<Patient>;
    fn get_patient(&self, id: RowId) -> StoreResult<Patient>;
    fn get_patient_by_public_id(&self, public_id: &PublicId) -> StoreResult<Patient>;
    fn find_patients(&self, search: &PatientSearch) -> StoreResult<Vec<Patient>>;
    /// Most recently created first.
    fn list_recent_patients(&self, limit: usize) -> StoreResult<Vec<Patient>>;
    /// Also removes the patient's results, evaluations and visits.
    fn delete_patient(&self, id: RowId) -> StoreResult<()>;

    // Blood test definitions.
    fn create_blood_test(&self, blood_test: NewBloodTest) -> StoreResult<BloodTest>;
    fn get_blood_test(&self, id: RowId) -> StoreResult<BloodTest>;
    /// Also removes the test's field definitions.
    fn delete_blood_test(&self, id: RowId) -> StoreResult<()>;
    fn list_blood_tests(&self) -> StoreResult<Vec<BloodTest>>;

    // Blood test results.
    fn create_blood_test_result(&self, result: NewBloodTestResult)
    -> StoreResult<BloodTestResult>;
    fn get_blood_test_result(&self, id: RowId) -> StoreResult<BloodTestResult>;
    fn list_blood_test_results(&self, patient_id: RowId) -> StoreResult<Vec<BloodTestResult>>;
    /// Replaces the filled-field set and clears the pending flag.
    fn complete_blood_test_result(
        &self,
        id: RowId,
        fields: Vec<FilledFieldInput>,
    ) -> StoreResult<BloodTestResult>;

    // Viruses.
    fn create_virus(&self, virus: NewVirus) -> StoreResult<Virus>;
    fn delete_virus(&self, id: RowId) -> StoreResult<()>;
    fn list_viruses(&self) -> StoreResult<Vec<Virus>>;

    // Medicines.
    fn create_medicine(&self, medicine: NewMedicine) -> StoreResult<Medicine>;
    fn get_medicine(&self, id: RowId) -> StoreResult<Medicine>;
    fn update_medicine(&self, id: RowId, medicine: NewMedicine) -> StoreResult<Medicine>;
    /// Takes one package of each listed medicine, all or none, checking stock and decrementing
    /// it in one step. A medicine with no package left is `OutOfStock`.
    fn take_medicines(&self, ids: &[RowId]) -> StoreResult<Vec<Medicine>>;
    fn delete_medicine(&self, id: RowId) -> StoreResult<()>;
    fn list_medicines(&self) -> StoreResult<Vec<Medicine>>;
    /// Only the ids that exist are returned; unknown ids are skipped.
    fn list_medicines_by_ids(&self, ids: &[RowId]) -> StoreResult<Vec<Medicine>>;

    // Visits and their prescribed medicine lines.
    fn create_visit(&self, visit: NewVisit) -> StoreResult<Visit>;
    /// Newest first.
    fn list_visits(&self, patient_id: RowId) -> StoreResult<Vec<Visit>>;
    fn last_visit(&self, patient_id: RowId) -> StoreResult<Visit>;
    fn create_prescribed_medicine(
        &self,
        visit_id: RowId,
        patient_id: RowId,
        medicine_id: RowId,
    ) -> StoreResult<PrescribedMedicine>;
    fn get_prescribed_medicine(&self, id: RowId) -> StoreResult<PrescribedMedicine>;
    fn list_prescribed_medicines(&self, visit_id: RowId) -> StoreResult<Vec<PrescribedMedicine>>;
    fn mark_medicine_used(
        &self,
        id: RowId,
        used_at: DateTime<Utc>,
    ) -> StoreResult<PrescribedMedicine>;

    // Diagnoses.
    fn create_diagnosis(&self, diagnosis: NewDiagnosis) -> StoreResult<Diagnosis>;
    fn delete_diagnosis(&self, id: RowId) -> StoreResult<()>;
    fn list_diagnoses(&self) -> StoreResult<Vec<Diagnosis>>;
    fn create_diagnosis_result(
        &self,
        patient_id: RowId,
        diagnosis_id: RowId,
    ) -> StoreResult<DiagnosisResult>;
    fn list_diagnosis_results(&self, patient_id: RowId) -> StoreResult<Vec<DiagnosisResult>>;

    // Joints evaluations.
    fn create_joints_evaluation(
        &self,
        patient_id: RowId,
        scores: JointScores,
    ) -> StoreResult<JointsEvaluation>;
    fn list_joints_evaluations(&self, patient_id: RowId) -> StoreResult<Vec<JointsEvaluation>>;
}
