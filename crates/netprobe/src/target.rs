//! Probe targets and their validation.
//!
//! Addresses end up on the command line of the system `ping`, so anything that
//! could be read as a flag or that contains whitespace is rejected up front.

use std::net::IpAddr;

use thiserror::Error;
use url::Url;

/// Reasons a target definition is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target name must not be empty")]
    EmptyName,

    #[error("address of target '{0}' is empty")]
    EmptyAddress(String),

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: &'static str },

    #[error("invalid fallback url '{url}': {reason}")]
    InvalidFallback { url: String, reason: String },
}

/// A host to probe, with an optional HTTP resource used when ping fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    address: String,
    fallback_url: Option<Url>,
}

impl Target {
    /// Create a target without fallback
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self { name: name.into(), address: address.into(), fallback_url: None }
    }

    /// Attach an HTTP fallback resource
    pub fn with_fallback(mut self, url: Url) -> Self {
        self.fallback_url = Some(url);
        self
    }

    /// Build and validate a target from configuration values
    pub fn parse(
        name: impl Into<String>,
        address: impl Into<String>,
        fallback: Option<&str>,
    ) -> Result<Self, TargetError> {
        let mut target = Self::new(name, address);
        if let Some(raw) = fallback {
            target.fallback_url = Some(parse_fallback_url(raw)?);
        }
        target.validate()?;
        Ok(target)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn fallback_url(&self) -> Option<&Url> {
        self.fallback_url.as_ref()
    }

    /// Check name, address and fallback scheme
    pub fn validate(&self) -> Result<(), TargetError> {
        if self.name.trim().is_empty() {
            return Err(TargetError::EmptyName);
        }
        if self.address.is_empty() {
            return Err(TargetError::EmptyAddress(self.name.clone()));
        }
        validate_address(&self.address)?;
        if let Some(url) = &self.fallback_url {
            validate_fallback_scheme(url)?;
        }
        Ok(())
    }
}

/// Validate an IP address or hostname
pub fn validate_address(address: &str) -> Result<(), TargetError> {
    let invalid = |reason| TargetError::InvalidAddress { address: address.to_string(), reason };

    if address.is_empty() {
        return Err(invalid("address is empty"));
    }
    if address.starts_with('-') {
        return Err(invalid("address must not start with '-'"));
    }
    if address.chars().any(char::is_whitespace) {
        return Err(invalid("address must not contain whitespace"));
    }
    if address.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if address.len() > 253 {
        return Err(invalid("hostname is longer than 253 characters"));
    }
    if !address.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')) {
        return Err(invalid("hostname contains invalid characters"));
    }
    if address.split('.').any(|label| label.is_empty() || label.len() > 63) {
        return Err(invalid("hostname has an empty or oversized label"));
    }

    Ok(())
}

/// Parse a fallback resource and require an http(s) scheme
pub fn parse_fallback_url(raw: &str) -> Result<Url, TargetError> {
    let url = Url::parse(raw).map_err(|e| TargetError::InvalidFallback {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    validate_fallback_scheme(&url)?;
    Ok(url)
}

fn validate_fallback_scheme(url: &Url) -> Result<(), TargetError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(TargetError::InvalidFallback {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
