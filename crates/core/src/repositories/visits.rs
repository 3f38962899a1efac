//! Visits and prescribed medicine.
//!
//! A visit prescribes one line per distinct resolved medicine id, and each line consumes one
//! package. Ids that do not name a medicine follow the configured unresolved reference policy.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shs_types::PublicId;

use crate::authorizer::{rules, Actor, Requirement};
use crate::context::AppContext;
use crate::error::{ShsError, ShsResult};
use crate::models::{
    Medicine, NewVisit, Patient, PrescribedMedicine, RowId, Visit, VisitReason,
};
use crate::permissions::AccountType;
use crate::repositories::apply_reference_policy;
use crate::store::StoreError;

/// A newly recorded visit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisitRecord {
    pub visit: Visit,
    pub prescribed: Vec<PrescribedMedicine>,
    /// Requested medicine ids that named no medicine.
    pub dropped_medicine_ids: Vec<RowId>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrescribedMedicineView {
    pub id: RowId,
    pub medicine_id: RowId,
    /// Empty when the medicine has since been deleted.
    pub name: String,
    pub dose: f64,
    pub unit: String,
    pub used_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisitView {
    pub id: RowId,
    pub reason: VisitReason,
    pub created_at: DateTime<Utc>,
    pub medicines: Vec<PrescribedMedicineView>,
}

pub struct VisitService {
    ctx: AppContext,
}

impl VisitService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// The patient record behind a patient-role actor.
    fn own_patient(&self, actor: &Actor) -> ShsResult<Patient> {
        let public_id =
            PublicId::parse(&actor.username).map_err(|_| ShsError::not_found("patient"))?;
        Ok(self.ctx.store().get_patient_by_public_id(&public_id)?)
    }

    fn is_own_record(actor: &Actor, public_id: &PublicId) -> bool {
        actor.account_type == AccountType::Patient && actor.username == public_id.as_str()
    }

    pub fn create_visit(
        &self,
        actor: &Actor,
        public_id: &PublicId,
        reason: VisitReason,
        medicine_ids: &[RowId],
    ) -> ShsResult<VisitRecord> {
        self.ctx.authorizer().require(actor, &rules::CREATE_VISIT)?;
        let store = self.ctx.store();
        let patient = store.get_patient_by_public_id(public_id)?;

        let medicines: HashMap<RowId, Medicine> = store
            .list_medicines_by_ids(medicine_ids)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let dropped_medicine_ids = apply_reference_policy(
            self.ctx.cfg().unresolved_reference_policy(),
            "medicine",
            medicine_ids,
            |id| medicines.contains_key(&id),
        )?;
        let mut resolved: Vec<RowId> = Vec::with_capacity(medicine_ids.len());
        for id in medicine_ids {
            if medicines.contains_key(id) && !resolved.contains(id) {
                resolved.push(*id);
            }
        }

        store.take_medicines(&resolved)?;
        let visit = store.create_visit(NewVisit {
            patient_id: patient.id,
            reason,
        })?;
        let prescribed = resolved
            .iter()
            .map(|medicine_id| store.create_prescribed_medicine(visit.id, patient.id, *medicine_id))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            visit_id = visit.id,
            patient_id = patient.id,
            prescribed = prescribed.len(),
            dropped = dropped_medicine_ids.len(),
            "visit created"
        );
        Ok(VisitRecord {
            visit,
            prescribed,
            dropped_medicine_ids,
        })
    }

    /// A patient reading its own visits needs own-visit read; anyone else other-visits read.
    pub fn list_for_patient(&self, actor: &Actor, public_id: &PublicId) -> ShsResult<Vec<VisitView>> {
        let requirement: &Requirement = if Self::is_own_record(actor, public_id) {
            &rules::LIST_OWN_VISITS
        } else {
            &rules::LIST_OTHER_VISITS
        };
        self.ctx.authorizer().require(actor, requirement)?;

        let store = self.ctx.store();
        let patient = store.get_patient_by_public_id(public_id)?;
        store
            .list_visits(patient.id)?
            .into_iter()
            .map(|visit| self.view(visit))
            .collect()
    }

    /// Most recent visit of the acting patient with the medicines prescribed in it.
    pub fn last_visit(&self, actor: &Actor) -> ShsResult<VisitView> {
        self.ctx.authorizer().require(actor, &rules::GET_LAST_VISIT)?;
        let patient = self.own_patient(actor)?;
        let visit = self.ctx.store().last_visit(patient.id)?;
        self.view(visit)
    }

    /// Marks a prescribed line of the acting patient as consumed.
    pub fn use_medicine(&self, actor: &Actor, prescribed_id: RowId) -> ShsResult<PrescribedMedicine> {
        self.ctx.authorizer().require(actor, &rules::USE_MEDICINE)?;
        let store = self.ctx.store();
        let patient = self.own_patient(actor)?;

        let line = store.get_prescribed_medicine(prescribed_id)?;
        if line.patient_id != patient.id {
            return Err(ShsError::not_found("prescribed medicine"));
        }
        if line.used_at.is_some() {
            return Err(ShsError::validation("medicine has already been used"));
        }

        let used = store.mark_medicine_used(prescribed_id, Utc::now())?;
        tracing::info!(patient_id = patient.id, prescribed_id, "medicine used");
        Ok(used)
    }

    fn view(&self, visit: Visit) -> ShsResult<VisitView> {
        let store = self.ctx.store();
        let medicines = store
            .list_prescribed_medicines(visit.id)?
            .into_iter()
            .map(|line| {
                let medicine = match store.get_medicine(line.medicine_id) {
                    Ok(medicine) => Some(medicine),
                    Err(StoreError::NotFound(_)) => None,
                    Err(err) => return Err(ShsError::from(err)),
                };
                Ok(PrescribedMedicineView {
                    id: line.id,
                    medicine_id: line.medicine_id,
                    name: medicine.as_ref().map(|m| m.name.clone()).unwrap_or_default(),
                    dose: medicine.as_ref().map(|m| m.dose).unwrap_or_default(),
                    unit: medicine.map(|m| m.unit).unwrap_or_default(),
                    used_at: line.used_at,
                })
            })
            .collect::<ShsResult<Vec<_>>>()?;

        Ok(VisitView {
            id: visit.id,
            reason: visit.reason,
            created_at: visit.created_at,
            medicines,
        })
    }
}
