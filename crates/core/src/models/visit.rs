use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RowId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitReason {
    Surgery,
    JointEvaluation,
    JointInjection,
    #[serde(alias = "hemelibra")]
    Hemlibra,
    #[serde(alias = "pafilaxes")]
    Prophylaxis,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: RowId,
    pub patient_id: RowId,
    pub reason: VisitReason,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVisit {
    pub patient_id: RowId,
    pub reason: VisitReason,
}

/// One prescribed medicine line of a visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub id: RowId,
    pub visit_id: RowId,
    pub patient_id: RowId,
    pub medicine_id: RowId,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_accept_legacy_spellings() {
        let hemlibra: VisitReason = serde_json::from_str("\"hemelibra\"").unwrap();
        let prophylaxis: VisitReason = serde_json::from_str("\"pafilaxes\"").unwrap();
        assert_eq!(hemlibra, VisitReason::Hemlibra);
        assert_eq!(prophylaxis, VisitReason::Prophylaxis);
        assert_eq!(serde_json::to_string(&VisitReason::Hemlibra).unwrap(), "\"hemlibra\"");
    }
}
