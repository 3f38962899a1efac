//! Patient registration and the patient aggregate.
//!
//! ## Reads
//!
//! Stored rows keep only ids for the blood test, field and diagnosis definitions they
//! reference. [`PatientService::get_full`] joins them against the current definitions on
//! every read, so renaming a definition is reflected in all historical results. A
//! reference that no longer resolves is rendered with empty names rather than failing the
//! aggregate.
//!
//! ## Registration
//!
//! [`PatientService::create_patient`] is not atomic:
//!
//! 1. residency and place of birth are resolved (or created),
//! 2. virus ids are checked against the virus catalogue,
//! 3. the patient row is written,
//! 4. each submitted blood test result is written best-effort; failures are logged and
//!    counted, never rolled back,
//! 5. a patient-role account is provisioned with the public id as username.
//!
//! A failure in steps 1-3 leaves nothing behind. A failure in step 5 fails the call even
//! though the patient row already exists.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shs_types::{NonEmptyText, PhoneNumber, PublicId};

use crate::authorizer::{rules, Actor};
use crate::context::AppContext;
use crate::error::{ShsError, ShsResult};
use crate::models::{
    Account, Address, AddressFields, BloodTest, BloodTestResult, BloodTestUnit, DiagnosisResult,
    FilledFieldInput, FirstVisitReason, Gender, JointScores, JointsEvaluation, NewAccount,
    NewBloodTestResult, NewPatient, Patient, PatientSearch, RowId, Virus,
};
use crate::permissions::{AccountType, PATIENT_PERMISSIONS};
use crate::repositories::addresses::AddressResolver;
use crate::repositories::apply_reference_policy;
use crate::store::StoreError;
use crate::validation::{initial_patient_password, patient_display_name};

/// How a caller names a patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatientRef {
    Id(RowId),
    PublicId(PublicId),
}

impl From<PublicId> for PatientRef {
    fn from(public_id: PublicId) -> Self {
        Self::PublicId(public_id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BloodTestResultInput {
    pub blood_test_id: RowId,
    pub pending: bool,
    pub filled_fields: Vec<FilledFieldInput>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreatePatientRequest {
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth: AddressFields,
    pub residency: AddressFields,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub bat_score: u32,
    pub family_history_exists: bool,
    pub first_visit_reason: FirstVisitReason,
    pub virus_ids: Vec<RowId>,
    pub blood_test_results: Vec<BloodTestResultInput>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedPatient {
    pub patient_id: RowId,
    pub public_id: PublicId,
    pub account_id: RowId,
    /// Submitted blood test results that could not be stored.
    pub failed_blood_test_results: usize,
}

// ============================================================================
// VIEWS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilledFieldView {
    pub id: RowId,
    pub blood_test_field_id: RowId,
    /// Empty when the field definition no longer exists.
    pub name: String,
    /// Empty when the field definition no longer exists.
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub value_number: Option<f64>,
    pub value_string: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BloodTestResultView {
    pub id: RowId,
    pub blood_test_id: RowId,
    pub blood_test_name: String,
    pub pending: bool,
    pub filled_fields: Vec<FilledFieldView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosisResultView {
    pub id: RowId,
    pub diagnosis_id: RowId,
    pub group_name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Base demographics plus both addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientSummary {
    pub id: RowId,
    pub public_id: PublicId,
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth: Address,
    pub residency: Address,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub bat_score: u32,
    pub family_history_exists: bool,
    pub first_visit_reason: FirstVisitReason,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientView {
    #[serde(flatten)]
    pub summary: PatientSummary,
    pub viruses: Vec<Virus>,
    pub blood_test_results: Vec<BloodTestResultView>,
    pub joints_evaluations: Vec<JointsEvaluation>,
    pub diagnosis_results: Vec<DiagnosisResultView>,
}

// ============================================================================
// PATIENT SERVICE
// ============================================================================

pub struct PatientService {
    ctx: AppContext,
}

impl PatientService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    fn patient(&self, patient: &PatientRef) -> ShsResult<Patient> {
        let store = self.ctx.store();
        Ok(match patient {
            PatientRef::Id(id) => store.get_patient(*id)?,
            PatientRef::PublicId(public_id) => store.get_patient_by_public_id(public_id)?,
        })
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn create_patient(
        &self,
        actor: &Actor,
        request: CreatePatientRequest,
    ) -> ShsResult<CreatedPatient> {
        self.ctx.authorizer().require(actor, &rules::CREATE_PATIENT)?;
        let store = self.ctx.store();

        let first_name = NonEmptyText::new(&request.first_name)?.into_inner();
        let last_name = NonEmptyText::new(&request.last_name)?.into_inner();
        let phone_number = match request.phone_number.trim() {
            "" => String::new(),
            raw => PhoneNumber::new(raw)?.as_str().to_owned(),
        };
        let national_id = request.national_id.trim().to_owned();
        let password = initial_patient_password(
            &national_id,
            &phone_number,
            self.ctx.cfg().country_calling_code(),
        )?;

        let resolver = AddressResolver::new(self.ctx.clone());
        let residency = resolver.resolve_or_create(&request.residency)?;
        let place_of_birth = resolver.resolve_or_create(&request.place_of_birth)?;

        let known_viruses: Vec<RowId> = store.list_viruses()?.iter().map(|v| v.id).collect();
        apply_reference_policy(
            self.ctx.cfg().unresolved_reference_policy(),
            "virus",
            &request.virus_ids,
            |id| known_viruses.contains(&id),
        )?;
        let mut virus_ids: Vec<RowId> = request
            .virus_ids
            .iter()
            .copied()
            .filter(|id| known_viruses.contains(id))
            .collect();
        virus_ids.sort_unstable();
        virus_ids.dedup();

        let patient = store.create_patient(NewPatient {
            public_id: PublicId::generate(),
            national_id,
            nationality: request.nationality.trim().to_owned(),
            first_name,
            last_name,
            father_name: request.father_name.trim().to_owned(),
            mother_name: request.mother_name.trim().to_owned(),
            place_of_birth_id: place_of_birth.id,
            residency_id: residency.id,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            phone_number,
            bat_score: request.bat_score,
            family_history_exists: request.family_history_exists,
            first_visit_reason: request.first_visit_reason,
            virus_ids,
        })?;
        tracing::info!(patient_id = patient.id, public_id = %patient.public_id, "patient created");

        let mut failed_blood_test_results = 0;
        for result in request.blood_test_results {
            let blood_test_id = result.blood_test_id;
            if let Err(err) = self.store_result(patient.id, result) {
                failed_blood_test_results += 1;
                tracing::error!(
                    patient_id = patient.id,
                    blood_test_id,
                    error = %err,
                    "failed to store blood test result"
                );
            }
        }

        let account = self.provision_account(&patient, &password).map_err(|err| {
            tracing::error!(
                patient_id = patient.id,
                error = %err,
                "failed to provision patient account"
            );
            err
        })?;

        Ok(CreatedPatient {
            patient_id: patient.id,
            public_id: patient.public_id,
            account_id: account.id,
            failed_blood_test_results,
        })
    }

    fn provision_account(
        &self,
        patient: &Patient,
        password: &str,
    ) -> ShsResult<Account> {
        let password_hash = self.ctx.hasher().hash(password)?;
        Ok(self.ctx.store().create_account(NewAccount {
            display_name: patient_display_name(&patient.first_name, &patient.last_name),
            username: patient.public_id.as_str().to_owned(),
            password_hash,
            account_type: AccountType::Patient,
            permissions: PATIENT_PERMISSIONS,
        })?)
    }

    fn store_result(
        &self,
        patient_id: RowId,
        input: BloodTestResultInput,
    ) -> ShsResult<BloodTestResult> {
        let store = self.ctx.store();
        let test = store.get_blood_test(input.blood_test_id)?;
        check_filled_fields(&test, &input.filled_fields)?;
        Ok(store.create_blood_test_result(NewBloodTestResult {
            blood_test_id: input.blood_test_id,
            patient_id,
            pending: input.pending,
            filled_fields: input.filled_fields,
        })?)
    }

    // ------------------------------------------------------------------------
    // Aggregate reads
    // ------------------------------------------------------------------------

    pub fn get_full(&self, actor: &Actor, patient: &PatientRef) -> ShsResult<PatientView> {
        self.ctx.authorizer().require(actor, &rules::GET_PATIENT)?;
        self.build_full(patient)
    }

    pub fn get_minimal(&self, actor: &Actor, patient: &PatientRef) -> ShsResult<PatientSummary> {
        self.ctx.authorizer().require(actor, &rules::GET_PATIENT)?;
        self.build_minimal(patient)
    }

    pub fn build_minimal(&self, patient: &PatientRef) -> ShsResult<PatientSummary> {
        let patient = self.patient(patient)?;
        self.summarize(patient)
    }

    fn summarize(&self, patient: Patient) -> ShsResult<PatientSummary> {
        let store = self.ctx.store();
        let place_of_birth = store.get_address(patient.place_of_birth_id)?;
        let residency = store.get_address(patient.residency_id)?;

        Ok(PatientSummary {
            id: patient.id,
            public_id: patient.public_id,
            national_id: patient.national_id,
            nationality: patient.nationality,
            first_name: patient.first_name,
            last_name: patient.last_name,
            father_name: patient.father_name,
            mother_name: patient.mother_name,
            place_of_birth,
            residency,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender,
            phone_number: patient.phone_number,
            bat_score: patient.bat_score,
            family_history_exists: patient.family_history_exists,
            first_visit_reason: patient.first_visit_reason,
            created_at: patient.created_at,
        })
    }

    pub fn build_full(&self, patient: &PatientRef) -> ShsResult<PatientView> {
        let store = self.ctx.store();
        let patient = self.patient(patient)?;
        let patient_id = patient.id;

        let viruses: Vec<Virus> = store
            .list_viruses()?
            .into_iter()
            .filter(|v| patient.virus_ids.contains(&v.id))
            .collect();

        let results = store.list_blood_test_results(patient_id)?;
        let definitions = store.list_blood_tests()?;
        let blood_test_results = rehydrate_results(results, &definitions);

        let joints_evaluations = store.list_joints_evaluations(patient_id)?;

        let diagnoses: HashMap<RowId, (String, String)> = store
            .list_diagnoses()?
            .into_iter()
            .map(|d| (d.id, (d.group_name, d.title)))
            .collect();
        let diagnosis_results = store
            .list_diagnosis_results(patient_id)?
            .into_iter()
            .map(|r| rehydrate_diagnosis(r, &diagnoses))
            .collect();

        Ok(PatientView {
            summary: self.summarize(patient)?,
            viruses,
            blood_test_results,
            joints_evaluations,
            diagnosis_results,
        })
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// An all-blank search is reported as no patient found.
    pub fn find_patients(
        &self,
        actor: &Actor,
        search: &PatientSearch,
    ) -> ShsResult<Vec<PatientSummary>> {
        self.ctx.authorizer().require(actor, &rules::FIND_PATIENTS)?;
        let search = search.trimmed();
        if search.is_empty() {
            return Err(ShsError::not_found("patient"));
        }
        self.ctx
            .store()
            .find_patients(&search)?
            .into_iter()
            .map(|p| self.summarize(p))
            .collect()
    }

    pub fn list_recent(&self, actor: &Actor) -> ShsResult<Vec<PatientSummary>> {
        self.ctx
            .authorizer()
            .require(actor, &rules::LIST_RECENT_PATIENTS)?;
        self.ctx
            .store()
            .list_recent_patients(self.ctx.cfg().recent_patients_limit())?
            .into_iter()
            .map(|p| self.summarize(p))
            .collect()
    }

    /// Removes the patient, its dependent rows and its patient-role account.
    pub fn delete_patient(&self, actor: &Actor, patient: &PatientRef) -> ShsResult<()> {
        self.ctx.authorizer().require(actor, &rules::DELETE_PATIENT)?;
        let store = self.ctx.store();
        let patient = self.patient(patient)?;
        store.delete_patient(patient.id)?;

        match store.get_account_by_username(patient.public_id.as_str()) {
            Ok(account) if account.account_type == AccountType::Patient => {
                store.delete_account(account.id)?;
            }
            Ok(_) | Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        tracing::info!(patient_id = patient.id, deleted_by = actor.id, "patient deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Record additions
    // ------------------------------------------------------------------------

    pub fn create_blood_test_result(
        &self,
        actor: &Actor,
        patient: &PatientRef,
        input: BloodTestResultInput,
    ) -> ShsResult<BloodTestResult> {
        self.ctx
            .authorizer()
            .require(actor, &rules::CREATE_BLOOD_TEST_RESULT)?;
        let patient = self.patient(patient)?;
        let result = self.store_result(patient.id, input)?;
        tracing::info!(
            patient_id = patient.id,
            result_id = result.id,
            pending = result.pending,
            "blood test result created"
        );
        Ok(result)
    }

    /// Completes a pending result by replacing its filled fields.
    ///
    /// A result that belongs to another patient is reported as not found.
    pub fn update_pending_result(
        &self,
        actor: &Actor,
        patient: &PatientRef,
        result_id: RowId,
        fields: Vec<FilledFieldInput>,
    ) -> ShsResult<BloodTestResult> {
        self.ctx
            .authorizer()
            .require(actor, &rules::UPDATE_PENDING_BLOOD_TEST_RESULT)?;
        let store = self.ctx.store();
        let patient = self.patient(patient)?;

        let result = store.get_blood_test_result(result_id)?;
        if result.patient_id != patient.id {
            return Err(ShsError::not_found("blood test result"));
        }
        if !result.pending {
            return Err(ShsError::validation("blood test result is already completed"));
        }
        let test = store.get_blood_test(result.blood_test_id)?;
        check_filled_fields(&test, &fields)?;

        let completed = store.complete_blood_test_result(result_id, fields)?;
        tracing::info!(patient_id = patient.id, result_id, "blood test result completed");
        Ok(completed)
    }

    pub fn create_joints_evaluation(
        &self,
        actor: &Actor,
        patient: &PatientRef,
        scores: JointScores,
    ) -> ShsResult<JointsEvaluation> {
        self.ctx
            .authorizer()
            .require(actor, &rules::CREATE_JOINTS_EVALUATION)?;
        scores.validate()?;
        let patient = self.patient(patient)?;
        Ok(self
            .ctx
            .store()
            .create_joints_evaluation(patient.id, scores)?)
    }

    pub fn create_diagnosis_result(
        &self,
        actor: &Actor,
        patient: &PatientRef,
        diagnosis_id: RowId,
    ) -> ShsResult<DiagnosisResult> {
        self.ctx
            .authorizer()
            .require(actor, &rules::CREATE_DIAGNOSIS_RESULT)?;
        let patient = self.patient(patient)?;
        Ok(self
            .ctx
            .store()
            .create_diagnosis_result(patient.id, diagnosis_id)?)
    }
}

/// Every filled field must name a field of `test`, at most once.
fn check_filled_fields(test: &BloodTest, fields: &[FilledFieldInput]) -> ShsResult<()> {
    let mut seen = Vec::with_capacity(fields.len());
    for field in fields {
        let id = field.blood_test_field_id;
        if !test.fields.iter().any(|f| f.id == id) {
            return Err(ShsError::validation(format!(
                "field {id} is not part of blood test {}",
                test.name
            )));
        }
        if seen.contains(&id) {
            return Err(ShsError::validation(format!("field {id} is filled twice")));
        }
        seen.push(id);
    }
    Ok(())
}

struct FieldDefinition<'a> {
    name: &'a str,
    unit: BloodTestUnit,
    min_value: f64,
    max_value: f64,
}

fn rehydrate_results(
    results: Vec<BloodTestResult>,
    definitions: &[BloodTest],
) -> Vec<BloodTestResultView> {
    let test_names: HashMap<RowId, &str> = definitions
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();
    let fields: HashMap<RowId, FieldDefinition<'_>> = definitions
        .iter()
        .flat_map(|t| t.fields.iter())
        .map(|f| {
            (
                f.id,
                FieldDefinition {
                    name: &f.name,
                    unit: f.unit,
                    min_value: f.min_value,
                    max_value: f.max_value,
                },
            )
        })
        .collect();

    results
        .into_iter()
        .map(|result| BloodTestResultView {
            id: result.id,
            blood_test_id: result.blood_test_id,
            blood_test_name: test_names
                .get(&result.blood_test_id)
                .map(|n| n.to_string())
                .unwrap_or_default(),
            pending: result.pending,
            filled_fields: result
                .filled_fields
                .into_iter()
                .map(|filled| {
                    let definition = fields.get(&filled.blood_test_field_id);
                    FilledFieldView {
                        id: filled.id,
                        blood_test_field_id: filled.blood_test_field_id,
                        name: definition.map(|d| d.name.to_owned()).unwrap_or_default(),
                        unit: definition
                            .map(|d| d.unit.as_str().to_owned())
                            .unwrap_or_default(),
                        min_value: definition.map(|d| d.min_value),
                        max_value: definition.map(|d| d.max_value),
                        value_number: filled.value_number,
                        value_string: filled.value_string,
                    }
                })
                .collect(),
            created_at: result.created_at,
        })
        .collect()
}

fn rehydrate_diagnosis(
    result: DiagnosisResult,
    diagnoses: &HashMap<RowId, (String, String)>,
) -> DiagnosisResultView {
    let (group_name, title) = diagnoses
        .get(&result.diagnosis_id)
        .cloned()
        .unwrap_or_default();
    DiagnosisResultView {
        id: result.id,
        diagnosis_id: result.diagnosis_id,
        group_name,
        title,
        created_at: result.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnresolvedReferencePolicy;
    use crate::models::{NewBloodTest, NewBloodTestField, NewDiagnosis, NewVirus};
    use crate::permissions::{Permissions, SECRETARY_PERMISSIONS};
    use crate::repositories::auth::AuthService;
    use crate::repositories::testing;
    use crate::store::Store;

    fn cbc(store: &dyn Store) -> BloodTest {
        store
            .create_blood_test(NewBloodTest {
                name: "CBC".into(),
                fields: vec![
                    NewBloodTestField {
                        name: "Hemoglobin".into(),
                        unit: BloodTestUnit::GramPerDeciLiter,
                        min_value: 12.0,
                        max_value: 17.5,
                    },
                    NewBloodTestField {
                        name: "Platelets".into(),
                        unit: BloodTestUnit::CellPerCubicMilliMeter,
                        min_value: 150_000.0,
                        max_value: 450_000.0,
                    },
                ],
            })
            .unwrap()
    }

    fn filled(field_id: RowId, value: f64) -> FilledFieldInput {
        FilledFieldInput {
            blood_test_field_id: field_id,
            value_number: Some(value),
            value_string: None,
        }
    }

    fn secretary() -> Actor {
        testing::actor(AccountType::Secretary, SECRETARY_PERMISSIONS)
    }

    #[test]
    fn registration_provisions_a_patient_account() {
        let (ctx, store) = testing::context();
        let service = PatientService::new(ctx.clone());

        let created = service
            .create_patient(&secretary(), testing::patient_request("01020304050"))
            .unwrap();

        let account = store
            .get_account_by_username(created.public_id.as_str())
            .unwrap();
        assert_eq!(account.id, created.account_id);
        assert_eq!(account.account_type, AccountType::Patient);
        assert_eq!(account.permissions, PATIENT_PERMISSIONS);
        assert_eq!(account.display_name, "Sami Haddad");

        let session = AuthService::new(ctx)
            .login(created.public_id.as_str(), "01020304050")
            .unwrap();
        assert_eq!(session.account.id, account.id);
    }

    #[test]
    fn phone_number_is_the_password_without_a_national_id() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx.clone());
        let mut request = testing::patient_request("");
        request.national_id = "  ".into();

        let created = service.create_patient(&secretary(), request).unwrap();
        assert!(AuthService::new(ctx)
            .login(created.public_id.as_str(), "944123456")
            .is_ok());
    }

    #[test]
    fn registration_reuses_and_creates_addresses() {
        let (ctx, store) = testing::context();
        let existing = store
            .create_address(AddressFields::new("Damascus", "Mezzeh", "Autostrad"))
            .unwrap();
        let service = PatientService::new(ctx);

        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let summary = service
            .build_minimal(&PatientRef::Id(created.patient_id))
            .unwrap();

        assert_eq!(summary.residency.id, existing.id);
        assert_eq!(summary.place_of_birth.governorate, "Aleppo");
        assert_ne!(summary.place_of_birth.id, existing.id);
    }

    #[test]
    fn unknown_virus_ids_are_dropped() {
        let (ctx, store) = testing::context();
        let hcv = store
            .create_virus(NewVirus {
                name: "HCV".into(),
                identifying_blood_test_ids: Vec::new(),
            })
            .unwrap();
        let service = PatientService::new(ctx);
        let mut request = testing::patient_request("1");
        request.virus_ids = vec![hcv.id, 4_040, hcv.id];

        let created = service.create_patient(&secretary(), request).unwrap();
        let patient = store.get_patient(created.patient_id).unwrap();
        assert_eq!(patient.virus_ids, vec![hcv.id]);
    }

    #[test]
    fn unknown_virus_ids_abort_under_reject_policy() {
        let (ctx, store) = testing::context_with(UnresolvedReferencePolicy::Reject);
        let service = PatientService::new(ctx);
        let mut request = testing::patient_request("1");
        request.virus_ids = vec![4_040];

        let err = service.create_patient(&secretary(), request).unwrap_err();
        assert!(matches!(err, ShsError::Validation(_)));
        assert!(store.list_recent_patients(10).unwrap().is_empty());
    }

    #[test]
    fn address_failure_aborts_before_the_patient_is_written() {
        let (ctx, store) = testing::context();
        store.fail_on("search_addresses");
        let service = PatientService::new(ctx);

        let err = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap_err();
        assert!(matches!(err, ShsError::Store(_)));
        assert!(store.list_recent_patients(10).unwrap().is_empty());
        assert!(store.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn virus_fetch_failure_aborts_before_the_patient_is_written() {
        let (ctx, store) = testing::context();
        store.fail_on("list_viruses");
        let service = PatientService::new(ctx);

        assert!(service
            .create_patient(&secretary(), testing::patient_request("1"))
            .is_err());
        assert!(store.list_recent_patients(10).unwrap().is_empty());
    }

    #[test]
    fn failed_blood_test_results_do_not_undo_registration() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        let service = PatientService::new(ctx);
        let mut request = testing::patient_request("1");
        request.blood_test_results = vec![
            BloodTestResultInput {
                blood_test_id: test.id,
                pending: false,
                filled_fields: vec![filled(test.fields[0].id, 13.1)],
            },
            BloodTestResultInput {
                blood_test_id: 9_999,
                pending: true,
                filled_fields: Vec::new(),
            },
        ];

        let created = service.create_patient(&secretary(), request).unwrap();
        assert_eq!(created.failed_blood_test_results, 1);
        assert_eq!(
            store.list_blood_test_results(created.patient_id).unwrap().len(),
            1
        );
    }

    #[test]
    fn store_failures_on_results_are_counted_not_propagated() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        store.fail_on("create_blood_test_result");
        let service = PatientService::new(ctx);
        let mut request = testing::patient_request("1");
        request.blood_test_results = vec![BloodTestResultInput {
            blood_test_id: test.id,
            pending: true,
            filled_fields: Vec::new(),
        }];

        let created = service.create_patient(&secretary(), request).unwrap();
        assert_eq!(created.failed_blood_test_results, 1);
        assert!(store.get_patient(created.patient_id).is_ok());
    }

    #[test]
    fn account_failure_fails_registration_but_keeps_the_patient() {
        let (ctx, store) = testing::context();
        store.fail_on("create_account");
        let service = PatientService::new(ctx);

        let err = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap_err();
        assert!(matches!(err, ShsError::Store(_)));
        assert_eq!(store.list_recent_patients(10).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_national_id_is_already_exists() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx);
        service
            .create_patient(&secretary(), testing::patient_request("77"))
            .unwrap();
        let err = service
            .create_patient(&secretary(), testing::patient_request("77"))
            .unwrap_err();
        assert_eq!(err.id(), "patient-exists");
    }

    #[test]
    fn aggregate_tolerates_deleted_definitions() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        let diagnosis = store
            .create_diagnosis(NewDiagnosis {
                group_name: "Hemophilia".into(),
                title: "Hemophilia A".into(),
            })
            .unwrap();
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let patient = PatientRef::PublicId(created.public_id.clone());
        service
            .create_blood_test_result(
                &secretary(),
                &patient,
                BloodTestResultInput {
                    blood_test_id: test.id,
                    pending: false,
                    filled_fields: vec![filled(test.fields[1].id, 210_000.0)],
                },
            )
            .unwrap();
        service
            .create_diagnosis_result(&secretary(), &patient, diagnosis.id)
            .unwrap();

        let before = service.get_full(&secretary(), &patient).unwrap();
        let field = &before.blood_test_results[0].filled_fields[0];
        assert_eq!(before.blood_test_results[0].blood_test_name, "CBC");
        assert_eq!(field.name, "Platelets");
        assert_eq!(field.unit, "cell/mm^3");
        assert_eq!(before.diagnosis_results[0].title, "Hemophilia A");

        store.delete_blood_test(test.id).unwrap();
        store.delete_diagnosis(diagnosis.id).unwrap();

        let after = service.get_full(&secretary(), &patient).unwrap();
        let result = &after.blood_test_results[0];
        assert_eq!(result.blood_test_name, "");
        assert_eq!(result.filled_fields[0].name, "");
        assert_eq!(result.filled_fields[0].unit, "");
        assert_eq!(result.filled_fields[0].value_number, Some(210_000.0));
        assert_eq!(after.diagnosis_results[0].group_name, "");
        assert_eq!(after.diagnosis_results[0].title, "");
    }

    #[test]
    fn pending_result_completes_exactly_once() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let patient = PatientRef::Id(created.patient_id);
        let pending = service
            .create_blood_test_result(
                &secretary(),
                &patient,
                BloodTestResultInput {
                    blood_test_id: test.id,
                    pending: true,
                    filled_fields: Vec::new(),
                },
            )
            .unwrap();

        let completed = service
            .update_pending_result(
                &secretary(),
                &patient,
                pending.id,
                vec![filled(test.fields[0].id, 11.2)],
            )
            .unwrap();
        assert!(!completed.pending);
        assert_eq!(completed.filled_fields.len(), 1);

        let again = service.update_pending_result(
            &secretary(),
            &patient,
            pending.id,
            vec![filled(test.fields[0].id, 12.0)],
        );
        assert!(matches!(again, Err(ShsError::Validation(_))));
    }

    #[test]
    fn pending_result_of_another_patient_is_not_found() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        let service = PatientService::new(ctx);
        let owner = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let other = service
            .create_patient(&secretary(), testing::patient_request("2"))
            .unwrap();
        let pending = service
            .create_blood_test_result(
                &secretary(),
                &PatientRef::Id(owner.patient_id),
                BloodTestResultInput {
                    blood_test_id: test.id,
                    pending: true,
                    filled_fields: Vec::new(),
                },
            )
            .unwrap();

        let err = service
            .update_pending_result(
                &secretary(),
                &PatientRef::Id(other.patient_id),
                pending.id,
                Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err.id(), "blood-test-result-not-found");
        assert!(store.get_blood_test_result(pending.id).unwrap().pending);
    }

    #[test]
    fn filled_fields_must_belong_to_the_test() {
        let (ctx, store) = testing::context();
        let test = cbc(&*store);
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();

        let err = service
            .create_blood_test_result(
                &secretary(),
                &PatientRef::Id(created.patient_id),
                BloodTestResultInput {
                    blood_test_id: test.id,
                    pending: false,
                    filled_fields: vec![filled(12_345, 1.0)],
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShsError::Validation(_)));
    }

    #[test]
    fn blank_search_is_not_found_and_fields_are_anded() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx);
        service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let mut other = testing::patient_request("2");
        other.first_name = "Lina".into();
        service.create_patient(&secretary(), other).unwrap();

        assert_eq!(
            service
                .find_patients(&secretary(), &PatientSearch::default())
                .unwrap_err()
                .id(),
            "patient-not-found"
        );

        let found = service
            .find_patients(
                &secretary(),
                &PatientSearch {
                    first_name: " sami ".into(),
                    last_name: "hadd".into(),
                    ..PatientSearch::default()
                },
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Sami");
    }

    #[test]
    fn recent_patients_are_newest_first() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx);
        let first = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let second = service
            .create_patient(&secretary(), testing::patient_request("2"))
            .unwrap();

        let recent = service.list_recent(&secretary()).unwrap();
        let ids: Vec<RowId> = recent.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.patient_id, first.patient_id]);
    }

    #[test]
    fn deleting_a_patient_removes_its_account() {
        let (ctx, store) = testing::context();
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();

        service
            .delete_patient(&secretary(), &PatientRef::PublicId(created.public_id.clone()))
            .unwrap();
        assert!(store.get_patient(created.patient_id).is_err());
        assert!(store
            .get_account_by_username(created.public_id.as_str())
            .is_err());
    }

    #[test]
    fn joints_scores_are_validated_and_aggregated() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let patient = PatientRef::Id(created.patient_id);

        let bad = JointScores {
            right_ankle: 25,
            ..JointScores::default()
        };
        assert!(service
            .create_joints_evaluation(&secretary(), &patient, bad)
            .is_err());

        let good = JointScores {
            right_ankle: 4,
            left_knee: 2,
            ..JointScores::default()
        };
        service
            .create_joints_evaluation(&secretary(), &patient, good)
            .unwrap();
        let view = service.get_full(&secretary(), &patient).unwrap();
        assert_eq!(view.joints_evaluations.len(), 1);
        assert_eq!(view.joints_evaluations[0].scores.total(), 6);
    }

    #[test]
    fn patient_role_cannot_read_patients() {
        let (ctx, _) = testing::context();
        let service = PatientService::new(ctx);
        let created = service
            .create_patient(&secretary(), testing::patient_request("1"))
            .unwrap();
        let patient_actor = testing::actor(AccountType::Patient, PATIENT_PERMISSIONS);

        assert!(matches!(
            service.get_full(&patient_actor, &PatientRef::Id(created.patient_id)),
            Err(ShsError::PermissionDenied)
        ));
        let reader = testing::actor(AccountType::Secretary, Permissions::READ_PATIENT);
        assert!(service
            .get_minimal(&reader, &PatientRef::Id(created.patient_id))
            .is_ok());
    }
}
