use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shs_types::PublicId;

use super::RowId;
use crate::constants::MAX_JOINT_SCORE;
use crate::error::{ShsError, ShsResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstVisitReason {
    FamilyHistory,
    Bleeding,
    Referral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RowId,
    pub public_id: PublicId,
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth_id: RowId,
    pub residency_id: RowId,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub bat_score: u32,
    pub family_history_exists: bool,
    pub first_visit_reason: FirstVisitReason,
    pub virus_ids: Vec<RowId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPatient {
    pub public_id: PublicId,
    pub national_id: String,
    pub nationality: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub place_of_birth_id: RowId,
    pub residency_id: RowId,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub bat_score: u32,
    pub family_history_exists: bool,
    pub first_visit_reason: FirstVisitReason,
    pub virus_ids: Vec<RowId>,
}

/// Field-based patient lookup. Non-empty fields are ANDed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientSearch {
    pub public_id: String,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone_number: String,
}

impl PatientSearch {
    pub fn trimmed(&self) -> Self {
        Self {
            public_id: self.public_id.trim().to_owned(),
            national_id: self.national_id.trim().to_owned(),
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            father_name: self.father_name.trim().to_owned(),
            mother_name: self.mother_name.trim().to_owned(),
            phone_number: self.phone_number.trim().to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.public_id,
            &self.national_id,
            &self.first_name,
            &self.last_name,
            &self.father_name,
            &self.mother_name,
            &self.phone_number,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        fn like(haystack: &str, needle: &str) -> bool {
            needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        like(patient.public_id.as_str(), &self.public_id)
            && like(&patient.national_id, &self.national_id)
            && like(&patient.first_name, &self.first_name)
            && like(&patient.last_name, &self.last_name)
            && like(&patient.father_name, &self.father_name)
            && like(&patient.mother_name, &self.mother_name)
            && like(&patient.phone_number, &self.phone_number)
    }
}

/// Per-joint scores of a joints evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointScores {
    pub right_ankle: u8,
    pub left_ankle: u8,
    pub right_knee: u8,
    pub left_knee: u8,
    pub right_elbow: u8,
    pub left_elbow: u8,
}

impl JointScores {
    pub fn validate(&self) -> ShsResult<()> {
        let scores = [
            ("right_ankle", self.right_ankle),
            ("left_ankle", self.left_ankle),
            ("right_knee", self.right_knee),
            ("left_knee", self.left_knee),
            ("right_elbow", self.right_elbow),
            ("left_elbow", self.left_elbow),
        ];
        for (joint, score) in scores {
            if score > MAX_JOINT_SCORE {
                return Err(ShsError::validation(format!(
                    "{joint} score {score} exceeds {MAX_JOINT_SCORE}"
                )));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> u32 {
        [
            self.right_ankle,
            self.left_ankle,
            self.right_knee,
            self.left_knee,
            self.right_elbow,
            self.left_elbow,
        ]
        .iter()
        .map(|s| u32::from(*s))
        .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointsEvaluation {
    pub id: RowId,
    pub patient_id: RowId,
    pub scores: JointScores,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub id: RowId,
    pub patient_id: RowId,
    pub diagnosis_id: RowId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_scores_are_bounded() {
        let ok = JointScores {
            right_knee: 20,
            ..JointScores::default()
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.total(), 20);

        let too_high = JointScores {
            left_elbow: 21,
            ..JointScores::default()
        };
        assert!(matches!(too_high.validate(), Err(ShsError::Validation(_))));
    }

    #[test]
    fn blank_search_is_empty() {
        let search = PatientSearch {
            first_name: "   ".into(),
            ..PatientSearch::default()
        };
        assert!(search.is_empty());
        assert!(search.trimmed().first_name.is_empty());
    }
}
