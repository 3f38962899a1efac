//! In-process [`Store`] backed by ordered maps behind a single lock.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use shs_types::PublicId;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Account, AccountUpdate, Address, AddressFields, BloodTest, BloodTestField,
    BloodTestFilledField, BloodTestResult, Diagnosis, DiagnosisResult, FilledFieldInput,
    JointScores, JointsEvaluation, Medicine, NewAccount, NewBloodTest, NewBloodTestResult,
    NewDiagnosis, NewMedicine, NewPatient, NewVirus, NewVisit, Patient, PatientSearch,
    PrescribedMedicine, RowId, Virus, Visit,
};

#[derive(Default)]
struct Tables {
    next_id: RowId,
    accounts: BTreeMap<RowId, Account>,
    addresses: BTreeMap<RowId, Address>,
    patients: BTreeMap<RowId, Patient>,
    blood_tests: BTreeMap<RowId, BloodTest>,
    blood_test_results: BTreeMap<RowId, BloodTestResult>,
    viruses: BTreeMap<RowId, Virus>,
    medicines: BTreeMap<RowId, Medicine>,
    visits: BTreeMap<RowId, Visit>,
    prescribed_medicines: BTreeMap<RowId, PrescribedMedicine>,
    diagnoses: BTreeMap<RowId, Diagnosis>,
    diagnosis_results: BTreeMap<RowId, DiagnosisResult>,
    joints_evaluations: BTreeMap<RowId, JointsEvaluation>,
}

impl Tables {
    fn next_id(&mut self) -> RowId {
        self.next_id += 1;
        self.next_id
    }

    fn filled_fields(
        &mut self,
        result_id: RowId,
        inputs: Vec<FilledFieldInput>,
    ) -> Vec<BloodTestFilledField> {
        inputs
            .into_iter()
            .map(|input| BloodTestFilledField {
                id: self.next_id(),
                blood_test_result_id: result_id,
                blood_test_field_id: input.blood_test_field_id,
                value_number: input.value_number,
                value_string: input.value_string,
            })
            .collect()
    }
}

fn found<T: Clone>(
    table: &BTreeMap<RowId, T>,
    id: RowId,
    resource: &'static str,
) -> StoreResult<T> {
    table.get(&id).cloned().ok_or(StoreError::NotFound(resource))
}

fn removed<T>(
    table: &mut BTreeMap<RowId, T>,
    id: RowId,
    resource: &'static str,
) -> StoreResult<T> {
    table.remove(&id).ok_or(StoreError::NotFound(resource))
}

/// Default [`Store`] used by the server binary and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    faults: std::sync::Mutex<std::collections::HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    /// Makes every later call of the named operation fail with a backend error.
    #[cfg(test)]
    pub(crate) fn fail_on(&self, op: &'static str) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(op);
        }
    }

    #[cfg(test)]
    fn check_fault(&self, op: &'static str) -> StoreResult<()> {
        let injected = self.faults.lock().map(|f| f.contains(op)).unwrap_or(false);
        if injected {
            return Err(StoreError::Backend(format!("injected failure in {op}")));
        }
        Ok(())
    }

    #[cfg(not(test))]
    #[inline]
    fn check_fault(&self, _op: &'static str) -> StoreResult<()> {
        Ok(())
    }
}

impl Store for MemoryStore {
    fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.check_fault("create_account")?;
        let mut t = self.write()?;
        if t.accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Exists("account"));
        }
        let row = Account {
            id: t.next_id(),
            display_name: account.display_name,
            username: account.username,
            password_hash: account.password_hash,
            account_type: account.account_type,
            permissions: account.permissions,
            created_at: Utc::now(),
        };
        t.accounts.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_account(&self, id: RowId) -> StoreResult<Account> {
        found(&self.read()?.accounts, id, "account")
    }

    fn get_account_by_username(&self, username: &str) -> StoreResult<Account> {
        self.read()?
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned()
            .ok_or(StoreError::NotFound("account"))
    }

    fn update_account(&self, id: RowId, update: AccountUpdate) -> StoreResult<Account> {
        let mut t = self.write()?;
        if let Some(username) = &update.username {
            if t.accounts
                .values()
                .any(|a| a.id != id && &a.username == username)
            {
                return Err(StoreError::Exists("account"));
            }
        }
        let account = t
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::NotFound("account"))?;
        if let Some(display_name) = update.display_name {
            account.display_name = display_name;
        }
        if let Some(username) = update.username {
            account.username = username;
        }
        if let Some(password_hash) = update.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(permissions) = update.permissions {
            account.permissions = permissions;
        }
        Ok(account.clone())
    }

    fn delete_account(&self, id: RowId) -> StoreResult<()> {
        removed(&mut self.write()?.accounts, id, "account").map(drop)
    }

    fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }

    fn create_address(&self, fields: AddressFields) -> StoreResult<Address> {
        self.check_fault("create_address")?;
        let mut t = self.write()?;
        let row = Address {
            id: t.next_id(),
            governorate: fields.governorate,
            suburb: fields.suburb,
            street: fields.street,
        };
        t.addresses.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_address(&self, id: RowId) -> StoreResult<Address> {
        found(&self.read()?.addresses, id, "address")
    }

    fn search_addresses(&self, query: &AddressFields) -> StoreResult<Vec<Address>> {
        self.check_fault("search_addresses")?;
        Ok(self
            .read()?
            .addresses
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect())
    }

    fn create_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let mut t = self.write()?;
        let taken = |p: &Patient| {
            p.public_id == patient.public_id
                || (!patient.national_id.is_empty() && p.national_id == patient.national_id)
        };
        if t.patients.values().any(taken) {
            return Err(StoreError::Exists("patient"));
        }
        let row = Patient {
            id: t.next_id(),
            public_id: patient.public_id,
            national_id: patient.national_id,
            nationality: patient.nationality,
            first_name: patient.first_name,
            last_name: patient.last_name,
            father_name: patient.father_name,
            mother_name: patient.mother_name,
            place_of_birth_id: patient.place_of_birth_id,
            residency_id: patient.residency_id,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender,
            phone_number: patient.phone_number,
            bat_score: patient.bat_score,
            family_history_exists: patient.family_history_exists,
            first_visit_reason: patient.first_visit_reason,
            virus_ids: patient.virus_ids,
            created_at: Utc::now(),
        };
        t.patients.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_patient(&self, id: RowId) -> StoreResult<Patient> {
        found(&self.read()?.patients, id, "patient")
    }

    fn get_patient_by_public_id(&self, public_id: &PublicId) -> StoreResult<Patient> {
        self.read()?
            .patients
            .values()
            .find(|p| &p.public_id == public_id)
            .cloned()
            .ok_or(StoreError::NotFound("patient"))
    }

    fn find_patients(&self, search: &PatientSearch) -> StoreResult<Vec<Patient>> {
        Ok(self
            .read()?
            .patients
            .values()
            .filter(|p| search.matches(p))
            .cloned()
            .collect())
    }

    fn list_recent_patients(&self, limit: usize) -> StoreResult<Vec<Patient>> {
        Ok(self
            .read()?
            .patients
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn delete_patient(&self, id: RowId) -> StoreResult<()> {
        let mut t = self.write()?;
        removed(&mut t.patients, id, "patient")?;
        t.blood_test_results.retain(|_, r| r.patient_id != id);
        t.visits.retain(|_, v| v.patient_id != id);
        t.prescribed_medicines.retain(|_, m| m.patient_id != id);
        t.diagnosis_results.retain(|_, d| d.patient_id != id);
        t.joints_evaluations.retain(|_, j| j.patient_id != id);
        Ok(())
    }

    fn create_blood_test(&self, blood_test: NewBloodTest) -> StoreResult<BloodTest> {
        let mut t = self.write()?;
        let id = t.next_id();
        let fields = blood_test
            .fields
            .into_iter()
            .map(|f| BloodTestField {
                id: t.next_id(),
                blood_test_id: id,
                name: f.name,
                unit: f.unit,
                min_value: f.min_value,
                max_value: f.max_value,
            })
            .collect();
        let row = BloodTest {
            id,
            name: blood_test.name,
            fields,
            created_at: Utc::now(),
        };
        t.blood_tests.insert(id, row.clone());
        Ok(row)
    }

    fn get_blood_test(&self, id: RowId) -> StoreResult<BloodTest> {
        found(&self.read()?.blood_tests, id, "blood test")
    }

    fn delete_blood_test(&self, id: RowId) -> StoreResult<()> {
        // Fields live inside the definition row and go with it.
        removed(&mut self.write()?.blood_tests, id, "blood test").map(drop)
    }

    fn list_blood_tests(&self) -> StoreResult<Vec<BloodTest>> {
        Ok(self.read()?.blood_tests.values().cloned().collect())
    }

    fn create_blood_test_result(
        &self,
        result: NewBloodTestResult,
    ) -> StoreResult<BloodTestResult> {
        self.check_fault("create_blood_test_result")?;
        let mut t = self.write()?;
        if !t.blood_tests.contains_key(&result.blood_test_id) {
            return Err(StoreError::NotFound("blood test"));
        }
        if !t.patients.contains_key(&result.patient_id) {
            return Err(StoreError::NotFound("patient"));
        }
        let id = t.next_id();
        let filled_fields = t.filled_fields(id, result.filled_fields);
        let row = BloodTestResult {
            id,
            blood_test_id: result.blood_test_id,
            patient_id: result.patient_id,
            filled_fields,
            pending: result.pending,
            created_at: Utc::now(),
        };
        t.blood_test_results.insert(id, row.clone());
        Ok(row)
    }

    fn get_blood_test_result(&self, id: RowId) -> StoreResult<BloodTestResult> {
        found(&self.read()?.blood_test_results, id, "blood test result")
    }

    fn list_blood_test_results(&self, patient_id: RowId) -> StoreResult<Vec<BloodTestResult>> {
        Ok(self
            .read()?
            .blood_test_results
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn complete_blood_test_result(
        &self,
        id: RowId,
        fields: Vec<FilledFieldInput>,
    ) -> StoreResult<BloodTestResult> {
        let mut t = self.write()?;
        if !t.blood_test_results.contains_key(&id) {
            return Err(StoreError::NotFound("blood test result"));
        }
        let filled_fields = t.filled_fields(id, fields);
        let result = t
            .blood_test_results
            .get_mut(&id)
            .ok_or(StoreError::NotFound("blood test result"))?;
        result.filled_fields = filled_fields;
        result.pending = false;
        Ok(result.clone())
    }

    fn create_virus(&self, virus: NewVirus) -> StoreResult<Virus> {
        let mut t = self.write()?;
        let row = Virus {
            id: t.next_id(),
            name: virus.name,
            identifying_blood_test_ids: virus.identifying_blood_test_ids,
            created_at: Utc::now(),
        };
        t.viruses.insert(row.id, row.clone());
        Ok(row)
    }

    fn delete_virus(&self, id: RowId) -> StoreResult<()> {
        removed(&mut self.write()?.viruses, id, "virus").map(drop)
    }

    fn list_viruses(&self) -> StoreResult<Vec<Virus>> {
        self.check_fault("list_viruses")?;
        Ok(self.read()?.viruses.values().cloned().collect())
    }

    fn create_medicine(&self, medicine: NewMedicine) -> StoreResult<Medicine> {
        let mut t = self.write()?;
        let row = Medicine {
            id: t.next_id(),
            name: medicine.name,
            dose: medicine.dose,
            unit: medicine.unit,
            amount: medicine.amount,
            created_at: Utc::now(),
        };
        t.medicines.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_medicine(&self, id: RowId) -> StoreResult<Medicine> {
        found(&self.read()?.medicines, id, "medicine")
    }

    fn update_medicine(&self, id: RowId, medicine: NewMedicine) -> StoreResult<Medicine> {
        let mut t = self.write()?;
        let row = t
            .medicines
            .get_mut(&id)
            .ok_or(StoreError::NotFound("medicine"))?;
        row.name = medicine.name;
        row.dose = medicine.dose;
        row.unit = medicine.unit;
        row.amount = medicine.amount;
        Ok(row.clone())
    }

    fn take_medicines(&self, ids: &[RowId]) -> StoreResult<Vec<Medicine>> {
        let mut t = self.write()?;
        for (i, id) in ids.iter().enumerate() {
            let row = t.medicines.get(id).ok_or(StoreError::NotFound("medicine"))?;
            let requested = ids[..=i].iter().filter(|other| *other == id).count() as u32;
            if row.amount < requested {
                return Err(StoreError::OutOfStock {
                    medicine_name: row.name.clone(),
                    requested,
                    left: row.amount,
                });
            }
        }
        let mut taken = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(row) = t.medicines.get_mut(id) {
                row.amount -= 1;
                taken.push(row.clone());
            }
        }
        Ok(taken)
    }

    fn delete_medicine(&self, id: RowId) -> StoreResult<()> {
        removed(&mut self.write()?.medicines, id, "medicine").map(drop)
    }

    fn list_medicines(&self) -> StoreResult<Vec<Medicine>> {
        Ok(self.read()?.medicines.values().cloned().collect())
    }

    fn list_medicines_by_ids(&self, ids: &[RowId]) -> StoreResult<Vec<Medicine>> {
        let t = self.read()?;
        Ok(t.medicines
            .values()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    fn create_visit(&self, visit: NewVisit) -> StoreResult<Visit> {
        let mut t = self.write()?;
        if !t.patients.contains_key(&visit.patient_id) {
            return Err(StoreError::NotFound("patient"));
        }
        let row = Visit {
            id: t.next_id(),
            patient_id: visit.patient_id,
            reason: visit.reason,
            created_at: Utc::now(),
        };
        t.visits.insert(row.id, row.clone());
        Ok(row)
    }

    fn list_visits(&self, patient_id: RowId) -> StoreResult<Vec<Visit>> {
        Ok(self
            .read()?
            .visits
            .values()
            .rev()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn last_visit(&self, patient_id: RowId) -> StoreResult<Visit> {
        self.read()?
            .visits
            .values()
            .rev()
            .find(|v| v.patient_id == patient_id)
            .cloned()
            .ok_or(StoreError::NotFound("visit"))
    }

    fn create_prescribed_medicine(
        &self,
        visit_id: RowId,
        patient_id: RowId,
        medicine_id: RowId,
    ) -> StoreResult<PrescribedMedicine> {
        self.check_fault("create_prescribed_medicine")?;
        let mut t = self.write()?;
        if !t.visits.contains_key(&visit_id) {
            return Err(StoreError::NotFound("visit"));
        }
        let row = PrescribedMedicine {
            id: t.next_id(),
            visit_id,
            patient_id,
            medicine_id,
            used_at: None,
            created_at: Utc::now(),
        };
        t.prescribed_medicines.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_prescribed_medicine(&self, id: RowId) -> StoreResult<PrescribedMedicine> {
        found(&self.read()?.prescribed_medicines, id, "prescribed medicine")
    }

    fn list_prescribed_medicines(&self, visit_id: RowId) -> StoreResult<Vec<PrescribedMedicine>> {
        Ok(self
            .read()?
            .prescribed_medicines
            .values()
            .filter(|m| m.visit_id == visit_id)
            .cloned()
            .collect())
    }

    fn mark_medicine_used(
        &self,
        id: RowId,
        used_at: DateTime<Utc>,
    ) -> StoreResult<PrescribedMedicine> {
        let mut t = self.write()?;
        let row = t
            .prescribed_medicines
            .get_mut(&id)
            .ok_or(StoreError::NotFound("prescribed medicine"))?;
        row.used_at = Some(used_at);
        Ok(row.clone())
    }

    fn create_diagnosis(&self, diagnosis: NewDiagnosis) -> StoreResult<Diagnosis> {
        let mut t = self.write()?;
        let row = Diagnosis {
            id: t.next_id(),
            group_name: diagnosis.group_name,
            title: diagnosis.title,
            created_at: Utc::now(),
        };
        t.diagnoses.insert(row.id, row.clone());
        Ok(row)
    }

    fn delete_diagnosis(&self, id: RowId) -> StoreResult<()> {
        removed(&mut self.write()?.diagnoses, id, "diagnosis").map(drop)
    }

    fn list_diagnoses(&self) -> StoreResult<Vec<Diagnosis>> {
        Ok(self.read()?.diagnoses.values().cloned().collect())
    }

    fn create_diagnosis_result(
        &self,
        patient_id: RowId,
        diagnosis_id: RowId,
    ) -> StoreResult<DiagnosisResult> {
        let mut t = self.write()?;
        if !t.patients.contains_key(&patient_id) {
            return Err(StoreError::NotFound("patient"));
        }
        if !t.diagnoses.contains_key(&diagnosis_id) {
            return Err(StoreError::NotFound("diagnosis"));
        }
        let row = DiagnosisResult {
            id: t.next_id(),
            patient_id,
            diagnosis_id,
            created_at: Utc::now(),
        };
        t.diagnosis_results.insert(row.id, row.clone());
        Ok(row)
    }

    fn list_diagnosis_results(&self, patient_id: RowId) -> StoreResult<Vec<DiagnosisResult>> {
        Ok(self
            .read()?
            .diagnosis_results
            .values()
            .filter(|d| d.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn create_joints_evaluation(
        &self,
        patient_id: RowId,
        scores: JointScores,
    ) -> StoreResult<JointsEvaluation> {
        let mut t = self.write()?;
        if !t.patients.contains_key(&patient_id) {
            return Err(StoreError::NotFound("patient"));
        }
        let row = JointsEvaluation {
            id: t.next_id(),
            patient_id,
            scores,
            created_at: Utc::now(),
        };
        t.joints_evaluations.insert(row.id, row.clone());
        Ok(row)
    }

    fn list_joints_evaluations(&self, patient_id: RowId) -> StoreResult<Vec<JointsEvaluation>> {
        Ok(self
            .read()?
            .joints_evaluations
            .values()
            .filter(|j| j.patient_id == patient_id)
            .cloned()
            .collect())
    }
}
