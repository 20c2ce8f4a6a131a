//! Bank records and the BankID → BankName map

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient::lenient_string;

/// Bank row from `MRI_S-PMAP_Bank`, also the shape of a row from
/// `MRI_S-PMAP_BankAccountMapping` (which only carries the BankID)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BankRecord {
    #[serde(rename = "BankID", default, deserialize_with = "lenient_string")]
    pub bank_id: Option<String>,
    #[serde(rename = "BankName", default, deserialize_with = "lenient_string")]
    pub bank_name: Option<String>,
}

/// BankID → BankName, built once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BankMap(BTreeMap<String, String>);

impl BankMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bank; a later entry for the same ID replaces the earlier one
    pub fn insert(&mut self, bank_id: impl Into<String>, bank_name: impl Into<String>) {
        self.0.insert(bank_id.into(), bank_name.into());
    }

    pub fn get(&self, bank_id: &str) -> Option<&str> {
        self.0.get(bank_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Build a map from bank records in page order.
    ///
    /// Returns the map and the number of records skipped for lacking a BankID.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BankRecord>) -> (Self, usize) {
        let mut map = Self::new();
        let mut skipped = 0;
        for record in records {
            match &record.bank_id {
                Some(id) => map.insert(id.clone(), record.bank_name.clone().unwrap_or_default()),
                None => skipped += 1,
            }
        }
        (map, skipped)
    }
}
