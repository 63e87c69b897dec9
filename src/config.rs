//! Policy engine connection settings.
//!
//! Settings can be deserialized from any serde format, or read from the flat
//! key/value form served by the configuration center:
//!
//! ```text
//! auth.enable = true
//! auth.address = http://iam-1:8080,http://iam-2:8080
//! auth.appCode = cmdb
//! auth.appSecret = ...
//! auth.systemID = cc
//! auth.supplierAccount = 0
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthConfig {
    /// Whether authorization is active at all. Read once at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Policy engine base addresses, rotated round-robin.
    #[serde(default)]
    pub address: Vec<String>,

    #[serde(default)]
    pub app_code: String,

    #[serde(default)]
    pub app_secret: String,

    /// The system id this service is registered under.
    #[serde(default = "default_system_id")]
    pub system_id: String,

    #[serde(default = "default_supplier_account")]
    pub supplier_account: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: Vec::new(),
            app_code: String::new(),
            app_secret: String::new(),
            system_id: default_system_id(),
            supplier_account: default_supplier_account(),
        }
    }
}

fn default_system_id() -> String {
    "cc".to_string()
}

fn default_supplier_account() -> String {
    "0".to_string()
}

impl AuthConfig {
    /// Read `<prefix>.enable`, `<prefix>.address` and friends from a flat map.
    /// Missing keys keep their defaults.
    pub fn from_kv(prefix: &str, values: &HashMap<String, String>) -> Result<Self, AuthError> {
        let get = |key: &str| values.get(&format!("{prefix}.{key}")).map(|v| v.trim());
        let mut config = AuthConfig::default();

        if let Some(enable) = get("enable") {
            config.enabled = match enable {
                "true" => true,
                "false" | "" => false,
                other => {
                    return Err(AuthError::Configuration(format!(
                        "{prefix}.enable must be true or false, got: {other}"
                    )));
                }
            };
        }
        if let Some(address) = get("address") {
            config.address = address
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(app_code) = get("appCode") {
            config.app_code = app_code.to_string();
        }
        if let Some(app_secret) = get("appSecret") {
            config.app_secret = app_secret.to_string();
        }
        if let Some(system_id) = get("systemID").filter(|s| !s.is_empty()) {
            config.system_id = system_id.to_string();
        }
        if let Some(account) = get("supplierAccount").filter(|s| !s.is_empty()) {
            config.supplier_account = account.to_string();
        }

        Ok(config)
    }

    /// Check an enabled configuration is usable. Disabled ones always are.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }

        if self.address.is_empty() {
            return Err(AuthError::NoServerAddress);
        }
        if let Some(bad) = self
            .address
            .iter()
            .find(|a| !(a.starts_with("http://") || a.starts_with("https://")))
        {
            return Err(AuthError::Configuration(format!(
                "address must start with http:// or https://, got: {bad}"
            )));
        }
        if self.app_code.is_empty() {
            return Err(AuthError::Configuration("app code is required".to_string()));
        }
        if self.app_secret.is_empty() {
            return Err(AuthError::Configuration(
                "app secret is required".to_string(),
            ));
        }
        Ok(())
    }
}
