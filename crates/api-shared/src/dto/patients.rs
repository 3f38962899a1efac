use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shs_core::models::{
    Address, AddressFields, BloodTestFilledField, BloodTestResult, DiagnosisResult,
    FilledFieldInput, FirstVisitReason, Gender, JointScores, JointsEvaluation, PatientSearch,
};
use shs_core::repositories::patients::{
    BloodTestResultInput, BloodTestResultView, CreatePatientRequest, CreatedPatient,
    DiagnosisResultView, FilledFieldView, PatientSummary, PatientView,
};
use shs_types::PublicId;
use utoipa::{IntoParams, ToSchema};

use super::catalogue::VirusRes;

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AddressReq {
    #[serde(default)]
    pub governorate: String,
    #[serde(default)]
    pub suburb: String,
    #[serde(default)]
    pub street: String,
}

impl From<AddressReq> for AddressFields {
    fn from(req: AddressReq) -> Self {
        AddressFields::new(req.governorate, req.suburb, req.street)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FilledFieldReq {
    pub blood_test_field_id: u64,
    #[serde(default)]
    pub value_number: Option<f64>,
    #[serde(default)]
    pub value_string: Option<String>,
}

impl From<FilledFieldReq> for FilledFieldInput {
    fn from(req: FilledFieldReq) -> Self {
        Self {
            blood_test_field_id: req.blood_test_field_id,
            value_number: req.value_number,
            value_string: req.value_string,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestResultReq {
    pub blood_test_id: u64,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub filled_fields: Vec<FilledFieldReq>,
}

impl From<BloodTestResultReq> for BloodTestResultInput {
    fn from(req: BloodTestResultReq) -> Self {
        Self {
            blood_test_id: req.blood_test_id,
            pending: req.pending,
            filled_fields: req.filled_fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteBloodTestResultReq {
    pub filled_fields: Vec<FilledFieldReq>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    #[serde(default)]
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth: AddressReq,
    pub residency: AddressReq,
    #[schema(value_type = String, format = Date, example = "2012-04-09")]
    pub date_of_birth: NaiveDate,
    #[schema(value_type = String, example = "male")]
    pub gender: Gender,
    pub phone_number: String,
    #[serde(default)]
    pub bat_score: u32,
    #[serde(default)]
    pub family_history_exists: bool,
    #[schema(value_type = String, example = "family_history")]
    pub first_visit_reason: FirstVisitReason,
    #[serde(default)]
    pub virus_ids: Vec<u64>,
    #[serde(default)]
    pub blood_test_results: Vec<BloodTestResultReq>,
}

impl From<CreatePatientReq> for CreatePatientRequest {
    fn from(req: CreatePatientReq) -> Self {
        Self {
            national_id: req.national_id,
            nationality: req.nationality,
            first_name: req.first_name,
            last_name: req.last_name,
            father_name: req.father_name,
            mother_name: req.mother_name,
            place_of_birth: req.place_of_birth.into(),
            residency: req.residency.into(),
            date_of_birth: req.date_of_birth,
            gender: req.gender,
            phone_number: req.phone_number,
            bat_score: req.bat_score,
            family_history_exists: req.family_history_exists,
            first_visit_reason: req.first_visit_reason,
            virus_ids: req.virus_ids,
            blood_test_results: req.blood_test_results.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientSearchQuery {
    pub public_id: Option<String>,
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub phone_number: Option<String>,
}

impl From<PatientSearchQuery> for PatientSearch {
    fn from(query: PatientSearchQuery) -> Self {
        Self {
            public_id: query.public_id.unwrap_or_default(),
            national_id: query.national_id.unwrap_or_default(),
            first_name: query.first_name.unwrap_or_default(),
            last_name: query.last_name.unwrap_or_default(),
            father_name: query.father_name.unwrap_or_default(),
            mother_name: query.mother_name.unwrap_or_default(),
            phone_number: query.phone_number.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct JointsEvaluationReq {
    #[serde(default)]
    pub right_ankle: u8,
    #[serde(default)]
    pub left_ankle: u8,
    #[serde(default)]
    pub right_knee: u8,
    #[serde(default)]
    pub left_knee: u8,
    #[serde(default)]
    pub right_elbow: u8,
    #[serde(default)]
    pub left_elbow: u8,
}

impl From<JointsEvaluationReq> for JointScores {
    fn from(req: JointsEvaluationReq) -> Self {
        Self {
            right_ankle: req.right_ankle,
            left_ankle: req.left_ankle,
            right_knee: req.right_knee,
            left_knee: req.left_knee,
            right_elbow: req.right_elbow,
            left_elbow: req.left_elbow,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisResultReq {
    pub diagnosis_id: u64,
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    #[schema(value_type = String)]
    pub public_id: PublicId,
    pub patient_id: u64,
    pub account_id: u64,
    pub failed_blood_test_results: usize,
}

impl From<CreatedPatient> for CreatePatientRes {
    fn from(created: CreatedPatient) -> Self {
        Self {
            public_id: created.public_id,
            patient_id: created.patient_id,
            account_id: created.account_id,
            failed_blood_test_results: created.failed_blood_test_results,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressRes {
    pub id: u64,
    pub governorate: String,
    pub suburb: String,
    pub street: String,
}

impl From<Address> for AddressRes {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            governorate: address.governorate,
            suburb: address.suburb,
            street: address.street,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientSummaryRes {
    pub id: u64,
    #[schema(value_type = String)]
    pub public_id: PublicId,
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth: AddressRes,
    pub residency: AddressRes,
    #[schema(value_type = String, format = Date)]
    pub date_of_birth: NaiveDate,
    #[schema(value_type = String)]
    pub gender: Gender,
    pub phone_number: String,
    pub bat_score: u32,
    pub family_history_exists: bool,
    #[schema(value_type = String)]
    pub first_visit_reason: FirstVisitReason,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<PatientSummary> for PatientSummaryRes {
    fn from(p: PatientSummary) -> Self {
        Self {
            id: p.id,
            public_id: p.public_id,
            national_id: p.national_id,
            nationality: p.nationality,
            first_name: p.first_name,
            last_name: p.last_name,
            father_name: p.father_name,
            mother_name: p.mother_name,
            place_of_birth: p.place_of_birth.into(),
            residency: p.residency.into(),
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            phone_number: p.phone_number,
            bat_score: p.bat_score,
            family_history_exists: p.family_history_exists,
            first_visit_reason: p.first_visit_reason,
            created_at: p.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FilledFieldRes {
    pub id: u64,
    pub blood_test_field_id: u64,
    pub name: String,
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub value_number: Option<f64>,
    pub value_string: Option<String>,
}

impl From<FilledFieldView> for FilledFieldRes {
    fn from(f: FilledFieldView) -> Self {
        Self {
            id: f.id,
            blood_test_field_id: f.blood_test_field_id,
            name: f.name,
            unit: f.unit,
            min_value: f.min_value,
            max_value: f.max_value,
            value_number: f.value_number,
            value_string: f.value_string,
        }
    }
}

impl From<BloodTestFilledField> for FilledFieldRes {
    fn from(f: BloodTestFilledField) -> Self {
        Self {
            id: f.id,
            blood_test_field_id: f.blood_test_field_id,
            name: String::new(),
            unit: String::new(),
            min_value: None,
            max_value: None,
            value_number: f.value_number,
            value_string: f.value_string,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestResultRes {
    pub id: u64,
    pub blood_test_id: u64,
    /// Empty on write responses and when the blood test no longer exists.
    pub blood_test_name: String,
    pub pending: bool,
    pub filled_fields: Vec<FilledFieldRes>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<BloodTestResultView> for BloodTestResultRes {
    fn from(r: BloodTestResultView) -> Self {
        Self {
            id: r.id,
            blood_test_id: r.blood_test_id,
            blood_test_name: r.blood_test_name,
            pending: r.pending,
            filled_fields: r.filled_fields.into_iter().map(Into::into).collect(),
            created_at: r.created_at,
        }
    }
}

impl From<BloodTestResult> for BloodTestResultRes {
    fn from(r: BloodTestResult) -> Self {
        Self {
            id: r.id,
            blood_test_id: r.blood_test_id,
            blood_test_name: String::new(),
            pending: r.pending,
            filled_fields: r.filled_fields.into_iter().map(Into::into).collect(),
            created_at: r.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JointsEvaluationRes {
    pub id: u64,
    pub right_ankle: u8,
    pub left_ankle: u8,
    pub right_knee: u8,
    pub left_knee: u8,
    pub right_elbow: u8,
    pub left_elbow: u8,
    pub total: u32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<JointsEvaluation> for JointsEvaluationRes {
    fn from(e: JointsEvaluation) -> Self {
        Self {
            id: e.id,
            right_ankle: e.scores.right_ankle,
            left_ankle: e.scores.left_ankle,
            right_knee: e.scores.right_knee,
            left_knee: e.scores.left_knee,
            right_elbow: e.scores.right_elbow,
            left_elbow: e.scores.left_elbow,
            total: e.scores.total(),
            created_at: e.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisResultRes {
    pub id: u64,
    pub diagnosis_id: u64,
    pub group_name: String,
    pub title: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<DiagnosisResultView> for DiagnosisResultRes {
    fn from(d: DiagnosisResultView) -> Self {
        Self {
            id: d.id,
            diagnosis_id: d.diagnosis_id,
            group_name: d.group_name,
            title: d.title,
            created_at: d.created_at,
        }
    }
}

impl From<DiagnosisResult> for DiagnosisResultRes {
    fn from(d: DiagnosisResult) -> Self {
        Self {
            id: d.id,
            diagnosis_id: d.diagnosis_id,
            group_name: String::new(),
            title: String::new(),
            created_at: d.created_at,
        }
    }
}

/// The full patient aggregate.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub patient: PatientSummaryRes,
    pub viruses: Vec<VirusRes>,
    pub blood_test_results: Vec<BloodTestResultRes>,
    pub joints_evaluations: Vec<JointsEvaluationRes>,
    pub diagnosis_results: Vec<DiagnosisResultRes>,
}

impl From<PatientView> for PatientRes {
    fn from(view: PatientView) -> Self {
        Self {
            patient: view.summary.into(),
            viruses: view.viruses.into_iter().map(Into::into).collect(),
            blood_test_results: view.blood_test_results.into_iter().map(Into::into).collect(),
            joints_evaluations: view.joints_evaluations.into_iter().map(Into::into).collect(),
            diagnosis_results: view.diagnosis_results.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_patient_body_uses_snake_case_enums_and_defaults() {
        let req: CreatePatientReq = serde_json::from_value(serde_json::json!({
            "nationality": "Syrian",
            "first_name": "Sami",
            "last_name": "Haddad",
            "father_name": "Khaled",
            "mother_name": "Mona",
            "place_of_birth": { "governorate": "Aleppo" },
            "residency": { "governorate": "Damascus", "suburb": "Mezzeh" },
            "date_of_birth": "2012-04-09",
            "gender": "male",
            "phone_number": "+963 944 123 456",
            "first_visit_reason": "family_history",
            "blood_test_results": [
                { "blood_test_id": 4, "filled_fields": [{ "blood_test_field_id": 9, "value_number": 1.5 }] }
            ],
        }))
        .unwrap();

        let request = CreatePatientRequest::from(req);
        assert_eq!(request.national_id, "");
        assert_eq!(request.gender, Gender::Male);
        assert_eq!(request.first_visit_reason, FirstVisitReason::FamilyHistory);
        assert_eq!(request.place_of_birth, AddressFields::new("Aleppo", "", ""));
        assert!(!request.blood_test_results[0].pending);
        assert_eq!(request.blood_test_results[0].filled_fields[0].value_number, Some(1.5));
    }

    #[test]
    fn search_query_defaults_missing_fields_to_blank() {
        let query = PatientSearchQuery {
            first_name: Some("sam".into()),
            ..PatientSearchQuery::default()
        };
        let search = PatientSearch::from(query);
        assert_eq!(search.first_name, "sam");
        assert_eq!(search.last_name, "");
    }
}
