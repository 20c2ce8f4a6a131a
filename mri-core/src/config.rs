//! Configuration management
//!
//! Settings live in `settings.json` inside the MRI directory:
//! ```json
//! {
//!   "baseUrl": "https://mri.example.com",
//!   "pageSize": 100,
//!   "credentials": { "clientId": "...", "databaseName": "...", "apiUsername": "...",
//!                    "developerKey": "...", "password": "..." },
//!   "propertyDefaults": { "shortName": "", "propertyType": "", "taxId": "" }
//! }
//! ```
//! Environment variables override the file, so credentials can stay out of it.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::Error;
use crate::domain::{AuthIdentity, PropertyDefaults};
use crate::services::paginator::DEFAULT_MAX_RETRIES;

pub const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_API_PATH: &str = "/MRIAPIServices/api.asp";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub const ENV_BASE_URL: &str = "MRI_BASE_URL";
pub const ENV_CLIENT_ID: &str = "MRI_CLIENT_ID";
pub const ENV_DATABASE_NAME: &str = "MRI_DATABASE_NAME";
pub const ENV_API_USERNAME: &str = "MRI_API_USERNAME";
pub const ENV_DEVELOPER_KEY: &str = "MRI_DEVELOPER_KEY";
pub const ENV_PASSWORD: &str = "MRI_PASSWORD";
pub const ENV_PAGE_SIZE: &str = "MRI_PAGE_SIZE";

/// `$api` names of the endpoints the extraction reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    #[serde(default = "default_bank_endpoint")]
    pub bank: String,
    #[serde(default = "default_property_endpoint")]
    pub property: String,
    #[serde(default = "default_bank_account_endpoint")]
    pub bank_account: String,
    #[serde(default = "default_unit_endpoint")]
    pub unit: String,
}

fn default_bank_endpoint() -> String {
    "MRI_S-PMAP_Bank".to_string()
}

fn default_property_endpoint() -> String {
    "MRI_S-PMRM_PropertyIDByNameOrAddress".to_string()
}

fn default_bank_account_endpoint() -> String {
    "MRI_S-PMAP_BankAccountMapping".to_string()
}

fn default_unit_endpoint() -> String {
    "MRI_S-PMRM_UnitVacancyInformation".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            bank: default_bank_endpoint(),
            property: default_property_endpoint(),
            bank_account: default_bank_account_endpoint(),
            unit: default_unit_endpoint(),
        }
    }
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// MRI extraction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Sent as `$top` on property and unit requests
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Extra attempts for a failing page before the pass gives up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Request timeout; the transport default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub credentials: AuthIdentity,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub property_defaults: PropertyDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_path: default_api_path(),
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: None,
            credentials: AuthIdentity::default(),
            endpoints: Endpoints::default(),
            property_defaults: PropertyDefaults::default(),
        }
    }
}

impl Config {
    /// Load config from the MRI directory, then apply environment overrides
    pub fn load(mri_dir: &Path) -> Result<Self> {
        let settings_path = mri_dir.join(SETTINGS_FILE);
        let mut config = if settings_path.exists() {
            Self::read_file(&settings_path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from an explicit settings file, then apply environment overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {:?}", path))
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set(&mut self.base_url, ENV_BASE_URL);
        set(&mut self.credentials.client_id, ENV_CLIENT_ID);
        set(&mut self.credentials.database_name, ENV_DATABASE_NAME);
        set(&mut self.credentials.api_username, ENV_API_USERNAME);
        set(&mut self.credentials.developer_key, ENV_DEVELOPER_KEY);
        set(&mut self.credentials.password, ENV_PASSWORD);

        if let Some(page_size) = lookup(ENV_PAGE_SIZE) {
            self.page_size = page_size
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer", ENV_PAGE_SIZE))?;
        }

        Ok(())
    }

    /// Check the settings the extraction cannot run without.
    ///
    /// Credentials are sent as given and are not checked here.
    pub fn validate(&self) -> crate::Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config(format!(
                "baseUrl is not set (settings.json or {})",
                ENV_BASE_URL
            )));
        }
        Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("baseUrl is not a valid URL: {}", e)))?;
        if !self.api_path.starts_with('/') {
            return Err(Error::config("apiPath must start with '/'"));
        }
        if self.page_size == 0 {
            return Err(Error::config("pageSize must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// `<baseUrl><apiPath>?$api=<endpoint>&$format=json`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}?$api={}&$format=json",
            self.base_url.trim_end_matches('/'),
            self.api_path,
            endpoint
        )
    }

    /// Settings as JSON with secrets masked, for display
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(credentials) = value.get_mut("credentials").and_then(|c| c.as_object_mut()) {
            for key in ["developerKey", "password"] {
                if let Some(field) = credentials.get_mut(key) {
                    if field.as_str().is_some_and(|s| !s.is_empty()) {
                        *field = serde_json::json!("********");
                    }
                }
            }
        }
        value
    }
}
