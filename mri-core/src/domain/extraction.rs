//! Result of one extraction run

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::bank::BankMap;
use super::property::PropertyDetail;

/// Raw unit/vacancy row from `MRI_S-PMRM_UnitVacancyInformation`
pub type UnitRecord = serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub banks: BankMap,
    pub properties: Vec<PropertyDetail>,
    /// Units of every property, in property order then page order
    pub units: Vec<UnitRecord>,
    /// Non-fatal problems hit during the run
    pub warnings: Vec<String>,
}
