//! Route plan loading and validation
//!
//! A route plan comes from an optional TOML file, then individual fields are
//! overridden from the environment or command line (base URL, login
//! identity, subject). Validation runs on the merged result and reports
//! field-path errors. HTTP verbs in `routes` are deliberately left
//! unchecked: an unknown verb becomes a failed probe in the report.

use crate::probe::transport::parse_target;
use crate::{CoreError, Result};
use schema::{Credentials, SmokeConfig};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a route plan from a TOML file path
pub fn load_smoke_config_from_toml_path(path: impl AsRef<Path>) -> Result<SmokeConfig> {
    let data = fs::read_to_string(&path).map_err(|e| {
        CoreError::ConfigurationError(format!("Failed to read config {:?}: {}", path.as_ref(), e))
    })?;
    load_smoke_config_from_toml_str(&data)
}

/// Load a route plan from a TOML string
///
/// Missing fields take their defaults; nothing is validated yet because the
/// base URL and credentials may still arrive as overrides.
pub fn load_smoke_config_from_toml_str(input: &str) -> Result<SmokeConfig> {
    toml::from_str(input)
        .map_err(|e| CoreError::ConfigurationError(format!("TOML parse error: {}", e)))
}

/// Values supplied outside the route plan file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `baseUrl`
    pub base_url: Option<String>,
    /// Replaces `credentials.email`
    pub email: Option<String>,
    /// Replaces `credentials.password`
    pub password: Option<String>,
    /// Replaces `subject`
    pub subject: Option<String>,
}

impl ConfigOverrides {
    /// Apply every present value onto `config`
    pub fn apply(self, config: &mut SmokeConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(subject) = self.subject {
            config.subject = subject;
        }
        if self.email.is_some() || self.password.is_some() {
            let current = config
                .credentials
                .take()
                .unwrap_or_else(|| Credentials::new("", ""));
            config.credentials = Some(Credentials::new(
                self.email.unwrap_or(current.email),
                self.password.unwrap_or(current.password),
            ));
        }
    }
}

/// Build the effective route plan: defaults, then the file, then overrides
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<SmokeConfig> {
    let mut config = match path {
        Some(path) => {
            debug!("Loading route plan from {:?}", path);
            load_smoke_config_from_toml_path(path)?
        }
        None => SmokeConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Check a merged route plan
pub fn validate_config(config: &SmokeConfig) -> Result<()> {
    if config.base_url.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "baseUrl: cannot be empty".to_string(),
        ));
    }
    let base = parse_target(&config.base_url)
        .map_err(|e| CoreError::ValidationError(format!("baseUrl: {}", e)))?;
    if base.query().is_some() || base.fragment().is_some() {
        return Err(CoreError::ValidationError(
            "baseUrl: cannot carry a query or fragment".to_string(),
        ));
    }

    validate_path("healthPath", &config.health_path)?;
    validate_path("loginPath", &config.login_path)?;
    validate_status("invalidLoginStatus", config.invalid_login_status)?;

    if config.subject.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "subject: cannot be empty".to_string(),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        validate_path(&format!("routes[{}].path", i), &route.path)?;
        validate_status(&format!("routes[{}].expectedStatus", i), route.expected_status)?;
        for name in route.headers.keys() {
            if name.trim().is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "routes[{}].headers: keys cannot be empty",
                    i
                )));
            }
        }
    }

    debug!("Route plan validated successfully");
    Ok(())
}

fn validate_path(field: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(CoreError::ValidationError(format!(
            "{}: must start with '/', got {:?}",
            field, path
        )));
    }
    Ok(())
}

fn validate_status(field: &str, status: u16) -> Result<()> {
    if !(100..=599).contains(&status) {
        return Err(CoreError::ValidationError(format!(
            "{}: must be 100..=599, got {}",
            field, status
        )));
    }
    Ok(())
}
