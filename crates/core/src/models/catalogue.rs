use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RowId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Virus {
    pub id: RowId,
    pub name: String,
    /// Blood tests whose results indicate this virus.
    pub identifying_blood_test_ids: Vec<RowId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVirus {
    pub name: String,
    #[serde(default)]
    pub identifying_blood_test_ids: Vec<RowId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: RowId,
    pub name: String,
    pub dose: f64,
    pub unit: String,
    /// Packages in stock.
    pub amount: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub dose: f64,
    pub unit: String,
    #[serde(default)]
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: RowId,
    pub group_name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiagnosis {
    pub group_name: String,
    pub title: String,
}
