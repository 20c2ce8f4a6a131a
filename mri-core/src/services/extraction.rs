//! Extraction service - banks, properties and units from MRI
//!
//! Three passes run in order:
//! 1. the bank list, folded into a [`BankMap`]
//! 2. the property list, each property joined to its banks through one
//!    `EntityId`-scoped call to the bank account mapping endpoint
//! 3. the units of every property, collected into one list
//!
//! Failing bank or property passes abort the run, as does a bank reference
//! that is missing from the bank map. Problems scoped to a single property
//! become warnings on the result.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::{Config, Endpoints};
use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthHeader, BankMap, BankRecord, Extraction, PropertyDetail, PropertyRecord, UnitRecord,
};
use crate::ports::{EventSink, RestApi, RestRequest};
use crate::services::logging::LogEvent;
use crate::services::paginator::Paginator;

/// Result of the bank pass
#[derive(Debug, Default)]
pub struct FetchedBanks {
    pub banks: BankMap,
    pub warnings: Vec<String>,
}

/// Result of the property pass
#[derive(Debug, Default)]
pub struct FetchedProperties {
    pub properties: Vec<PropertyDetail>,
    pub warnings: Vec<String>,
}

/// Result of the unit pass
#[derive(Debug, Default)]
pub struct FetchedUnits {
    pub units: Vec<UnitRecord>,
    pub warnings: Vec<String>,
}

pub struct ExtractionService {
    api: Arc<dyn RestApi>,
    events: Arc<dyn EventSink>,
    paginator: Paginator,
    auth: AuthHeader,
    config: Config,
}

impl ExtractionService {
    /// Build the service. The auth header is derived once from the configured credentials.
    pub fn new(config: &Config, api: Arc<dyn RestApi>, events: Arc<dyn EventSink>) -> Self {
        let paginator = Paginator::new(Arc::clone(&api), Arc::clone(&events), config.max_retries);
        Self {
            api,
            events,
            paginator,
            auth: config.credentials.auth_header(),
            config: config.clone(),
        }
    }

    fn endpoints(&self) -> &Endpoints {
        &self.config.endpoints
    }

    /// GET request for an endpoint with the auth header attached
    fn request(&self, endpoint: &str) -> RestRequest {
        RestRequest::get(self.config.endpoint_url(endpoint))
            .header(AuthHeader::NAME, self.auth.as_str())
    }

    fn warn(&self, warnings: &mut Vec<String>, event: LogEvent, message: String) {
        self.events.record(event.with_error(message.clone()));
        warnings.push(message);
    }

    /// Run all three passes
    pub fn run(&self) -> Result<Extraction> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        self.events.record(
            LogEvent::new("extraction_started").with_error_details(format!("run_id={}", run_id)),
        );

        let fetched_banks = self.fetch_bank_map()?;
        let fetched_properties = self.fetch_property_details(&fetched_banks.banks)?;

        let mut warnings = fetched_banks.warnings;
        warnings.extend(fetched_properties.warnings);

        let mut property_ids = Vec::new();
        for property in &fetched_properties.properties {
            if property.property_id.is_empty() {
                self.warn(
                    &mut warnings,
                    LogEvent::warn("units_skipped").with_endpoint(&self.endpoints().unit),
                    format!(
                        "Property '{}' has no PropertyID - skipping units",
                        property.property_name
                    ),
                );
            } else {
                property_ids.push(property.property_id.clone());
            }
        }

        let fetched_units = self.fetch_units(&property_ids);
        warnings.extend(fetched_units.warnings);

        let extraction = Extraction {
            run_id,
            started_at,
            finished_at: Utc::now(),
            banks: fetched_banks.banks,
            properties: fetched_properties.properties,
            units: fetched_units.units,
            warnings,
        };

        self.events.record(
            LogEvent::new("extraction_completed")
                .with_count(extraction.properties.len())
                .with_error_details(format!(
                    "run_id={} banks={} units={} warnings={}",
                    run_id,
                    extraction.banks.len(),
                    extraction.units.len(),
                    extraction.warnings.len()
                )),
        );

        Ok(extraction)
    }

    /// Bank pass: every bank across all pages, keyed by BankID
    pub fn fetch_bank_map(&self) -> Result<FetchedBanks> {
        let endpoint = &self.endpoints().bank;
        let items = self.paginator.fetch_all(endpoint, self.request(endpoint))?;

        let mut records = Vec::with_capacity(items.len());
        let mut warnings = Vec::new();
        for item in items {
            match serde_json::from_value::<BankRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => self.warn(
                    &mut warnings,
                    LogEvent::warn("bank_skipped").with_endpoint(endpoint),
                    format!("Unreadable bank record: {}", e),
                ),
            }
        }

        let (banks, skipped) = BankMap::from_records(&records);
        if skipped > 0 {
            self.warn(
                &mut warnings,
                LogEvent::warn("bank_skipped").with_endpoint(endpoint).with_count(skipped),
                format!("{} bank record(s) without a BankID were skipped", skipped),
            );
        }

        self.events.record(
            LogEvent::new("bank_map_built")
                .with_endpoint(endpoint)
                .with_count(banks.len()),
        );

        Ok(FetchedBanks { banks, warnings })
    }

    /// Property pass: every property, joined to its bank names
    pub fn fetch_property_details(&self, banks: &BankMap) -> Result<FetchedProperties> {
        let endpoint = &self.endpoints().property;
        let request = self
            .request(endpoint)
            .param("$top", self.config.page_size.to_string());
        let items = self.paginator.fetch_all(endpoint, request)?;

        let mut properties = Vec::with_capacity(items.len());
        let mut warnings = Vec::new();

        for item in items {
            let record = match serde_json::from_value::<PropertyRecord>(item) {
                Ok(record) => record,
                Err(e) => {
                    self.warn(
                        &mut warnings,
                        LogEvent::warn("property_skipped").with_endpoint(endpoint),
                        format!("Unreadable property record: {}", e),
                    );
                    continue;
                }
            };

            let bank_names = self.property_bank_names(&record, banks, &mut warnings)?;
            properties.push(PropertyDetail::from_record(
                &record,
                bank_names,
                &self.config.property_defaults,
            ));
        }

        self.events.record(
            LogEvent::new("properties_built")
                .with_endpoint(endpoint)
                .with_count(properties.len()),
        );

        Ok(FetchedProperties {
            properties,
            warnings,
        })
    }

    /// Bank names of one property from a single `EntityId`-scoped call.
    ///
    /// A failed call leaves the property without banks and adds a warning.
    fn property_bank_names(
        &self,
        record: &PropertyRecord,
        banks: &BankMap,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let endpoint = &self.endpoints().bank_account;
        let property_id = record.property_id.clone().unwrap_or_default();

        let Some(entity_id) = record.entity_id.as_deref() else {
            self.warn(
                warnings,
                LogEvent::warn("bank_accounts_skipped").with_endpoint(endpoint),
                format!("Property '{}' has no EntityId - no banks attached", property_id),
            );
            return Ok(Vec::new());
        };

        let request = self.request(endpoint).param("EntityId", entity_id);
        let payload = match self.api.call(&request) {
            Ok(payload) => payload,
            Err(e) => {
                let mut event = LogEvent::warn("bank_accounts_failed")
                    .with_endpoint(endpoint)
                    .with_error_details(e.kind().as_str());
                if let Some(status) = e.status() {
                    event = event.with_status(status);
                }
                self.warn(
                    warnings,
                    event,
                    format!(
                        "Failed to fetch banks for property '{}' (EntityId {}): {}",
                        property_id, entity_id, e
                    ),
                );
                return Ok(Vec::new());
            }
        };

        let rows = match payload {
            JsonValue::Object(mut obj) => match obj.remove("value") {
                Some(JsonValue::Array(rows)) => rows,
                _ => Vec::new(),
            },
            _ => {
                self.warn(
                    warnings,
                    LogEvent::warn("bank_accounts_failed").with_endpoint(endpoint),
                    format!(
                        "Unexpected bank mapping payload for property '{}' (EntityId {})",
                        property_id, entity_id
                    ),
                );
                return Ok(Vec::new());
            }
        };

        let associations: Vec<BankRecord> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();

        resolve_bank_names(&associations, banks, &property_id)
    }

    /// Unit pass: one paginated sequence per property, all units in one list.
    ///
    /// A property whose units cannot be fetched is reported as a warning.
    pub fn fetch_units(&self, property_ids: &[String]) -> FetchedUnits {
        let endpoint = &self.endpoints().unit;
        let mut units = Vec::new();
        let mut warnings = Vec::new();

        for property_id in property_ids {
            let request = self
                .request(endpoint)
                .param("PROPERTYID", property_id.as_str())
                .param("$top", self.config.page_size.to_string());

            match self.paginator.fetch_all(endpoint, request) {
                Ok(property_units) => {
                    self.events.record(
                        LogEvent::debug("units_fetched")
                            .with_endpoint(endpoint)
                            .with_count(property_units.len())
                            .with_error_details(format!("property_id={}", property_id)),
                    );
                    units.extend(property_units);
                }
                Err(e) => self.warn(
                    &mut warnings,
                    LogEvent::warn("units_failed").with_endpoint(endpoint),
                    format!("Failed to fetch units for property '{}': {}", property_id, e),
                ),
            }
        }

        FetchedUnits { units, warnings }
    }
}

/// Resolve bank association rows to bank names.
///
/// BankIDs are deduplicated in first-seen order, then each is looked up in
/// `banks`; the same name reached through two IDs is kept once. Rows without
/// a BankID are ignored. An ID missing from `banks` is an error.
pub fn resolve_bank_names(
    associations: &[BankRecord],
    banks: &BankMap,
    property_id: &str,
) -> Result<Vec<String>> {
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut names = Vec::new();

    for bank_id in associations.iter().filter_map(|a| a.bank_id.as_deref()) {
        if !seen_ids.insert(bank_id) {
            continue;
        }
        let name = banks.get(bank_id).ok_or_else(|| Error::BankLookup {
            bank_id: bank_id.to_string(),
            property_id: property_id.to_string(),
        })?;
        if seen_names.insert(name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}
