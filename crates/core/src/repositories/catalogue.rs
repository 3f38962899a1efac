//! Reference data: blood test definitions, viruses, medicines and diagnoses.

use shs_types::NonEmptyText;

use crate::authorizer::{rules, Actor};
use crate::context::AppContext;
use crate::error::{ShsError, ShsResult};
use crate::models::{
    BloodTest, Diagnosis, Medicine, NewBloodTest, NewDiagnosis, NewMedicine, NewVirus, RowId,
    Virus,
};
use crate::repositories::apply_reference_policy;

pub struct CatalogueService {
    ctx: AppContext,
}

impl CatalogueService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // BLOOD TESTS
    // ========================================================================

    pub fn create_blood_test(&self, actor: &Actor, blood_test: NewBloodTest) -> ShsResult<BloodTest> {
        self.ctx.authorizer().require(actor, &rules::CREATE_BLOOD_TEST)?;

        let mut blood_test = blood_test;
        blood_test.name = NonEmptyText::new(&blood_test.name)?.into_inner();
        for field in &mut blood_test.fields {
            field.name = NonEmptyText::new(&field.name)?.into_inner();
            if field.min_value > field.max_value {
                return Err(ShsError::validation(format!(
                    "field {} has min_value above max_value",
                    field.name
                )));
            }
        }

        let created = self.ctx.store().create_blood_test(blood_test)?;
        tracing::info!(blood_test_id = created.id, fields = created.fields.len(), "blood test created");
        Ok(created)
    }

    pub fn get_blood_test(&self, actor: &Actor, id: RowId) -> ShsResult<BloodTest> {
        self.ctx.authorizer().require(actor, &rules::GET_BLOOD_TEST)?;
        Ok(self.ctx.store().get_blood_test(id)?)
    }

    pub fn delete_blood_test(&self, actor: &Actor, id: RowId) -> ShsResult<()> {
        self.ctx.authorizer().require(actor, &rules::DELETE_BLOOD_TEST)?;
        self.ctx.store().delete_blood_test(id)?;
        tracing::info!(blood_test_id = id, "blood test deleted");
        Ok(())
    }

    pub fn list_blood_tests(&self, actor: &Actor) -> ShsResult<Vec<BloodTest>> {
        self.ctx.authorizer().require(actor, &rules::LIST_BLOOD_TESTS)?;
        Ok(self.ctx.store().list_blood_tests()?)
    }

    // ========================================================================
    // VIRUSES
    // ========================================================================

    /// Identifying blood test ids that do not exist follow the unresolved reference policy.
    pub fn create_virus(&self, actor: &Actor, virus: NewVirus) -> ShsResult<Virus> {
        self.ctx.authorizer().require(actor, &rules::CREATE_VIRUS)?;
        let name = NonEmptyText::new(&virus.name)?.into_inner();

        let known: Vec<RowId> = self
            .ctx
            .store()
            .list_blood_tests()?
            .iter()
            .map(|t| t.id)
            .collect();
        apply_reference_policy(
            self.ctx.cfg().unresolved_reference_policy(),
            "blood test",
            &virus.identifying_blood_test_ids,
            |id| known.contains(&id),
        )?;
        let identifying_blood_test_ids = virus
            .identifying_blood_test_ids
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();

        let created = self.ctx.store().create_virus(NewVirus {
            name,
            identifying_blood_test_ids,
        })?;
        tracing::info!(virus_id = created.id, "virus created");
        Ok(created)
    }

    pub fn delete_virus(&self, actor: &Actor, id: RowId) -> ShsResult<()> {
        self.ctx.authorizer().require(actor, &rules::DELETE_VIRUS)?;
        self.ctx.store().delete_virus(id)?;
        tracing::info!(virus_id = id, "virus deleted");
        Ok(())
    }

    pub fn list_viruses(&self, actor: &Actor) -> ShsResult<Vec<Virus>> {
        self.ctx.authorizer().require(actor, &rules::LIST_VIRUSES)?;
        Ok(self.ctx.store().list_viruses()?)
    }

    // ========================================================================
    // MEDICINES
    // ========================================================================

    fn checked_medicine(medicine: NewMedicine) -> ShsResult<NewMedicine> {
        let name = NonEmptyText::new(&medicine.name)?.into_inner();
        let unit = NonEmptyText::new(&medicine.unit)?.into_inner();
        if !medicine.dose.is_finite() || medicine.dose <= 0.0 {
            return Err(ShsError::validation("medicine dose must be a positive number"));
        }
        Ok(NewMedicine {
            name,
            unit,
            ..medicine
        })
    }

    pub fn create_medicine(&self, actor: &Actor, medicine: NewMedicine) -> ShsResult<Medicine> {
        self.ctx.authorizer().require(actor, &rules::CREATE_MEDICINE)?;
        let created = self
            .ctx
            .store()
            .create_medicine(Self::checked_medicine(medicine)?)?;
        tracing::info!(medicine_id = created.id, "medicine created");
        Ok(created)
    }

    pub fn get_medicine(&self, actor: &Actor, id: RowId) -> ShsResult<Medicine> {
        self.ctx.authorizer().require(actor, &rules::GET_MEDICINE)?;
        Ok(self.ctx.store().get_medicine(id)?)
    }

    pub fn update_medicine(
        &self,
        actor: &Actor,
        id: RowId,
        medicine: NewMedicine,
    ) -> ShsResult<Medicine> {
        self.ctx.authorizer().require(actor, &rules::UPDATE_MEDICINE)?;
        let updated = self
            .ctx
            .store()
            .update_medicine(id, Self::checked_medicine(medicine)?)?;
        tracing::info!(medicine_id = id, amount = updated.amount, "medicine updated");
        Ok(updated)
    }

    pub fn delete_medicine(&self, actor: &Actor, id: RowId) -> ShsResult<()> {
        self.ctx.authorizer().require(actor, &rules::DELETE_MEDICINE)?;
        self.ctx.store().delete_medicine(id)?;
        tracing::info!(medicine_id = id, "medicine deleted");
        Ok(())
    }

    pub fn list_medicines(&self, actor: &Actor) -> ShsResult<Vec<Medicine>> {
        self.ctx.authorizer().require(actor, &rules::LIST_MEDICINES)?;
        Ok(self.ctx.store().list_medicines()?)
    }

    // ========================================================================
    // DIAGNOSES
    // ========================================================================

    pub fn create_diagnosis(&self, actor: &Actor, diagnosis: NewDiagnosis) -> ShsResult<Diagnosis> {
        self.ctx.authorizer().require(actor, &rules::CREATE_DIAGNOSIS)?;
        let created = self.ctx.store().create_diagnosis(NewDiagnosis {
            group_name: NonEmptyText::new(&diagnosis.group_name)?.into_inner(),
            title: NonEmptyText::new(&diagnosis.title)?.into_inner(),
        })?;
        tracing::info!(diagnosis_id = created.id, "diagnosis created");
        Ok(created)
    }

    pub fn delete_diagnosis(&self, actor: &Actor, id: RowId) -> ShsResult<()> {
        self.ctx.authorizer().require(actor, &rules::DELETE_DIAGNOSIS)?;
        self.ctx.store().delete_diagnosis(id)?;
        tracing::info!(diagnosis_id = id, "diagnosis deleted");
        Ok(())
    }

    pub fn list_diagnoses(&self, actor: &Actor) -> ShsResult<Vec<Diagnosis>> {
        self.ctx.authorizer().require(actor, &rules::LIST_DIAGNOSES)?;
        Ok(self.ctx.store().list_diagnoses()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnresolvedReferencePolicy;
    use crate::models::{BloodTestUnit, NewBloodTestField};
    use crate::permissions::{AccountType, Permissions};
    use crate::repositories::testing;

    fn factor_viii() -> NewMedicine {
        NewMedicine {
            name: "Factor VIII".into(),
            dose: 500.0,
            unit: "IU".into(),
            amount: 10,
        }
    }

    #[test]
    fn medicine_listing_follows_read_medicine() {
        let (ctx, _) = testing::context();
        let catalogue = CatalogueService::new(ctx);
        let root = testing::super_admin();
        let a = catalogue.create_medicine(&root, factor_viii()).unwrap();
        let b = catalogue
            .create_medicine(
                &root,
                NewMedicine {
                    name: "Emicizumab".into(),
                    dose: 30.0,
                    unit: "mg".into(),
                    amount: 4,
                },
            )
            .unwrap();

        let patient_writer = testing::actor(
            AccountType::Secretary,
            Permissions::READ_PATIENT | Permissions::WRITE_PATIENT,
        );
        assert!(matches!(
            catalogue.list_medicines(&patient_writer),
            Err(ShsError::PermissionDenied)
        ));

        let granted = testing::actor(
            AccountType::Secretary,
            patient_writer.permissions | Permissions::READ_MEDICINE,
        );
        let ids: Vec<RowId> = catalogue
            .list_medicines(&granted)
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn blood_test_fields_are_validated() {
        let (ctx, _) = testing::context();
        let catalogue = CatalogueService::new(ctx);
        let root = testing::super_admin();

        let inverted = NewBloodTest {
            name: "Coagulation".into(),
            fields: vec![NewBloodTestField {
                name: "PT".into(),
                unit: BloodTestUnit::Second,
                min_value: 13.5,
                max_value: 11.0,
            }],
        };
        assert!(matches!(
            catalogue.create_blood_test(&root, inverted),
            Err(ShsError::Validation(_))
        ));
    }

    #[test]
    fn virus_keeps_only_known_blood_tests_by_default() {
        let (ctx, _) = testing::context();
        let catalogue = CatalogueService::new(ctx);
        let root = testing::super_admin();
        let test = catalogue
            .create_blood_test(
                &root,
                NewBloodTest {
                    name: "HCV antibodies".into(),
                    fields: Vec::new(),
                },
            )
            .unwrap();

        let virus = catalogue
            .create_virus(
                &root,
                NewVirus {
                    name: "HCV".into(),
                    identifying_blood_test_ids: vec![test.id, 404],
                },
            )
            .unwrap();
        assert_eq!(virus.identifying_blood_test_ids, vec![test.id]);
    }

    #[test]
    fn virus_with_unknown_blood_test_is_rejected_under_reject_policy() {
        let (ctx, store) = testing::context_with(UnresolvedReferencePolicy::Reject);
        let catalogue = CatalogueService::new(ctx);
        let root = testing::super_admin();

        let err = catalogue
            .create_virus(
                &root,
                NewVirus {
                    name: "HIV".into(),
                    identifying_blood_test_ids: vec![404],
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShsError::Validation(_)));
        use crate::store::Store;
        assert!(store.list_viruses().unwrap().is_empty());
    }

    #[test]
    fn secretary_lists_viruses_but_cannot_create_them() {
        let (ctx, _) = testing::context();
        let catalogue = CatalogueService::new(ctx);
        let secretary = testing::actor(
            AccountType::Secretary,
            AccountType::Secretary.default_permissions(),
        );

        assert!(catalogue.list_viruses(&secretary).unwrap().is_empty());
        assert!(matches!(
            catalogue.create_virus(
                &secretary,
                NewVirus {
                    name: "HBV".into(),
                    identifying_blood_test_ids: Vec::new(),
                }
            ),
            Err(ShsError::PermissionDenied)
        ));
    }

    #[test]
    fn medicine_update_replaces_stock() {
        let (ctx, _) = testing::context();
        let catalogue = CatalogueService::new(ctx);
        let root = testing::super_admin();
        let created = catalogue.create_medicine(&root, factor_viii()).unwrap();

        let updated = catalogue
            .update_medicine(
                &root,
                created.id,
                NewMedicine {
                    amount: 2,
                    ..factor_viii()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, 2);
        assert!(matches!(
            catalogue.update_medicine(&root, 999, factor_viii()),
            Err(ShsError::NotFound {
                resource: "medicine"
            })
        ));
    }
}
