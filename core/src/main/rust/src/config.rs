// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Configuration files.
//!
//! ```toml
//! [policy]
//! preset = "moderate"
//! disallow_emulators = true
//!
//! [host]
//! debuggable = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluator::RiskEvaluator;
use crate::host::HostConfig;
use crate::policy::{PolicyPreset, SecurityPolicy};

/// A preset plus per-flag overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub preset: Option<PolicyPreset>,
    pub disallow_rooted_devices: Option<bool>,
    pub disallow_emulators: Option<bool>,
    pub disallow_hooked_devices: Option<bool>,
    pub disallow_debuggable_apps: Option<bool>,
}

impl PolicyConfig {
    pub fn resolve(&self) -> SecurityPolicy {
        let base = self
            .preset
            .map(SecurityPolicy::from_preset)
            .unwrap_or_else(SecurityPolicy::permissive);

        SecurityPolicy {
            disallow_rooted_devices: self
                .disallow_rooted_devices
                .unwrap_or(base.disallow_rooted_devices),
            disallow_emulators: self.disallow_emulators.unwrap_or(base.disallow_emulators),
            disallow_hooked_devices: self
                .disallow_hooked_devices
                .unwrap_or(base.disallow_hooked_devices),
            disallow_debuggable_apps: self
                .disallow_debuggable_apps
                .unwrap_or(base.disallow_debuggable_apps),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub policy: PolicyConfig,
    pub host: HostConfig,
}

impl TrustConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a `.json` or (anything else) TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn security_policy(&self) -> SecurityPolicy {
        self.policy.resolve()
    }

    pub fn evaluator(&self) -> RiskEvaluator {
        RiskEvaluator::from_config(self.host.clone())
    }
}
