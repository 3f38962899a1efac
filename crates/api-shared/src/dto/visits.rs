use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shs_core::models::{PrescribedMedicine, VisitReason};
use shs_core::repositories::visits::{PrescribedMedicineView, VisitRecord, VisitView};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateVisitReq {
    #[schema(value_type = String, example = "prophylaxis")]
    pub reason: VisitReason,
    /// A medicine id listed twice is prescribed twice.
    #[serde(default)]
    pub medicine_ids: Vec<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PrescribedMedicineRes {
    pub id: u64,
    pub medicine_id: u64,
    pub name: String,
    pub dose: f64,
    pub unit: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub used_at: Option<DateTime<Utc>>,
}

impl From<PrescribedMedicineView> for PrescribedMedicineRes {
    fn from(m: PrescribedMedicineView) -> Self {
        Self {
            id: m.id,
            medicine_id: m.medicine_id,
            name: m.name,
            dose: m.dose,
            unit: m.unit,
            used_at: m.used_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VisitRes {
    pub id: u64,
    #[schema(value_type = String)]
    pub reason: VisitReason,
    pub medicines: Vec<PrescribedMedicineRes>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<VisitView> for VisitRes {
    fn from(v: VisitView) -> Self {
        Self {
            id: v.id,
            reason: v.reason,
            medicines: v.medicines.into_iter().map(Into::into).collect(),
            created_at: v.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateVisitRes {
    pub visit_id: u64,
    #[schema(value_type = String)]
    pub reason: VisitReason,
    /// Ids of the prescribed medicine lines, one per resolved medicine id.
    pub prescribed_medicine_ids: Vec<u64>,
    /// Requested medicine ids that named no medicine.
    pub dropped_medicine_ids: Vec<u64>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<VisitRecord> for CreateVisitRes {
    fn from(record: VisitRecord) -> Self {
        Self {
            visit_id: record.visit.id,
            reason: record.visit.reason,
            prescribed_medicine_ids: record.prescribed.iter().map(|p| p.id).collect(),
            dropped_medicine_ids: record.dropped_medicine_ids,
            created_at: record.visit.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UsedMedicineRes {
    pub id: u64,
    pub medicine_id: u64,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub used_at: Option<DateTime<Utc>>,
}

impl From<PrescribedMedicine> for UsedMedicineRes {
    fn from(m: PrescribedMedicine) -> Self {
        Self {
            id: m.id,
            medicine_id: m.medicine_id,
            used_at: m.used_at,
        }
    }
}
