//! Property records as returned by MRI and the normalized detail built from them

use serde::{Deserialize, Serialize};

use super::lenient::lenient_string;

/// Property row from `MRI_S-PMRM_PropertyIDByNameOrAddress`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyRecord {
    #[serde(rename = "EntityId", default, deserialize_with = "lenient_string")]
    pub entity_id: Option<String>,
    #[serde(rename = "PropertyID", default, deserialize_with = "lenient_string")]
    pub property_id: Option<String>,
    #[serde(rename = "PropertyName", default, deserialize_with = "lenient_string")]
    pub property_name: Option<String>,
    #[serde(rename = "Address1", default, deserialize_with = "lenient_string")]
    pub address1: Option<String>,
    #[serde(rename = "Address2", default, deserialize_with = "lenient_string")]
    pub address2: Option<String>,
    /// MRI stores the property contact email here
    #[serde(rename = "Address3", default, deserialize_with = "lenient_string")]
    pub address3: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(rename = "ZipCode", default, deserialize_with = "lenient_string")]
    pub zip_code: Option<String>,
    #[serde(rename = "PhoneNumber", default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(rename = "ManagerName", default, deserialize_with = "lenient_string")]
    pub manager_name: Option<String>,
}

/// Values the upstream API does not provide, filled in from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefaults {
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub tax_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyAddress {
    pub address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Normalized property with its resolved bank names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyDetail {
    pub property_name: String,
    pub short_name: String,
    pub email: String,
    pub manager_name: String,
    pub property_type: String,
    #[serde(rename = "TaxID")]
    pub tax_id: String,
    #[serde(rename = "PropertyID")]
    pub property_id: String,
    pub bank: Vec<String>,
    pub address: PropertyAddress,
    pub phone_numbers: Vec<String>,
}

impl PropertyDetail {
    /// Build the detail for a property. `banks` must already be deduplicated.
    pub fn from_record(record: &PropertyRecord, banks: Vec<String>, defaults: &PropertyDefaults) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();

        Self {
            property_name: text(&record.property_name),
            short_name: defaults.short_name.clone(),
            email: text(&record.address3),
            manager_name: text(&record.manager_name),
            property_type: defaults.property_type.clone(),
            tax_id: defaults.tax_id.clone(),
            property_id: text(&record.property_id),
            bank: banks,
            address: PropertyAddress {
                address: text(&record.address1),
                street: text(&record.address2),
                city: text(&record.city),
                state: text(&record.state),
                postal_code: text(&record.zip_code),
            },
            phone_numbers: vec![text(&record.phone_number)],
        }
    }
}
