use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shs_core::models::{
    BloodTest, BloodTestField, BloodTestUnit, Diagnosis, Medicine, NewBloodTest,
    NewBloodTestField, NewDiagnosis, NewMedicine, NewVirus, Virus,
};
use utoipa::ToSchema;

// ============================================================================
// BLOOD TESTS
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestFieldReq {
    pub name: String,
    #[schema(value_type = String, example = "g/dL")]
    pub unit: BloodTestUnit,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default)]
    pub max_value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestReq {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<BloodTestFieldReq>,
}

impl From<BloodTestReq> for NewBloodTest {
    fn from(req: BloodTestReq) -> Self {
        Self {
            name: req.name,
            fields: req
                .fields
                .into_iter()
                .map(|f| NewBloodTestField {
                    name: f.name,
                    unit: f.unit,
                    min_value: f.min_value,
                    max_value: f.max_value,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestFieldRes {
    pub id: u64,
    pub name: String,
    #[schema(value_type = String)]
    pub unit: BloodTestUnit,
    pub min_value: f64,
    pub max_value: f64,
}

impl From<BloodTestField> for BloodTestFieldRes {
    fn from(field: BloodTestField) -> Self {
        Self {
            id: field.id,
            name: field.name,
            unit: field.unit,
            min_value: field.min_value,
            max_value: field.max_value,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BloodTestRes {
    pub id: u64,
    pub name: String,
    pub fields: Vec<BloodTestFieldRes>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<BloodTest> for BloodTestRes {
    fn from(test: BloodTest) -> Self {
        Self {
            id: test.id,
            name: test.name,
            fields: test.fields.into_iter().map(Into::into).collect(),
            created_at: test.created_at,
        }
    }
}

// ============================================================================
// VIRUSES
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VirusReq {
    pub name: String,
    #[serde(default)]
    pub identifying_blood_test_ids: Vec<u64>,
}

impl From<VirusReq> for NewVirus {
    fn from(req: VirusReq) -> Self {
        Self {
            name: req.name,
            identifying_blood_test_ids: req.identifying_blood_test_ids,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VirusRes {
    pub id: u64,
    pub name: String,
    pub identifying_blood_test_ids: Vec<u64>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Virus> for VirusRes {
    fn from(virus: Virus) -> Self {
        Self {
            id: virus.id,
            name: virus.name,
            identifying_blood_test_ids: virus.identifying_blood_test_ids,
            created_at: virus.created_at,
        }
    }
}

// ============================================================================
// MEDICINES
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MedicineReq {
    pub name: String,
    pub dose: f64,
    pub unit: String,
    /// Packages in stock.
    #[serde(default)]
    pub amount: u32,
}

impl From<MedicineReq> for NewMedicine {
    fn from(req: MedicineReq) -> Self {
        Self {
            name: req.name,
            dose: req.dose,
            unit: req.unit,
            amount: req.amount,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MedicineRes {
    pub id: u64,
    pub name: String,
    pub dose: f64,
    pub unit: String,
    pub amount: u32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Medicine> for MedicineRes {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            dose: medicine.dose,
            unit: medicine.unit,
            amount: medicine.amount,
            created_at: medicine.created_at,
        }
    }
}

// ============================================================================
// DIAGNOSES
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisReq {
    pub group_name: String,
    pub title: String,
}

impl From<DiagnosisReq> for NewDiagnosis {
    fn from(req: DiagnosisReq) -> Self {
        Self {
            group_name: req.group_name,
            title: req.title,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRes {
    pub id: u64,
    pub group_name: String,
    pub title: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Diagnosis> for DiagnosisRes {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            id: diagnosis.id,
            group_name: diagnosis.group_name,
            title: diagnosis.title,
            created_at: diagnosis.created_at,
        }
    }
}
