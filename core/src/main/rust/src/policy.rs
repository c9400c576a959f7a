// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Security policy and the admit/deny decision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::report::{RiskKind, RiskReport};

/// Which risk dimensions block a sensitive operation. Every flag defaults
/// to "not disallowed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityPolicy {
    pub disallow_rooted_devices: bool,
    pub disallow_emulators: bool,
    pub disallow_hooked_devices: bool,
    pub disallow_debuggable_apps: bool,
}

impl SecurityPolicy {
    /// Never blocks.
    pub const fn permissive() -> Self {
        Self {
            disallow_rooted_devices: false,
            disallow_emulators: false,
            disallow_hooked_devices: false,
            disallow_debuggable_apps: false,
        }
    }

    /// Blocks rooted and hooked devices.
    pub const fn moderate() -> Self {
        Self {
            disallow_rooted_devices: true,
            disallow_emulators: false,
            disallow_hooked_devices: true,
            disallow_debuggable_apps: false,
        }
    }

    /// Blocks every risk.
    pub const fn strict() -> Self {
        Self {
            disallow_rooted_devices: true,
            disallow_emulators: true,
            disallow_hooked_devices: true,
            disallow_debuggable_apps: true,
        }
    }

    pub const fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Permissive => Self::permissive(),
            PolicyPreset::Moderate => Self::moderate(),
            PolicyPreset::Strict => Self::strict(),
        }
    }

    pub fn disallows(&self, kind: RiskKind) -> bool {
        match kind {
            RiskKind::Rooted => self.disallow_rooted_devices,
            RiskKind::Emulator => self.disallow_emulators,
            RiskKind::Hooked => self.disallow_hooked_devices,
            RiskKind::Debug => self.disallow_debuggable_apps,
        }
    }

    /// Compare `report` against this policy. Pure.
    pub fn evaluate(&self, report: RiskReport) -> PolicyDecision {
        let violations: Vec<RiskKind> = RiskKind::ALL
            .into_iter()
            .filter(|kind| self.disallows(*kind) && report.is_present(*kind))
            .collect();

        PolicyDecision {
            violated: !violations.is_empty(),
            report,
            violations,
        }
    }
}

/// Named policy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPreset {
    Permissive,
    Moderate,
    Strict,
}

impl FromStr for PolicyPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(PolicyPreset::Permissive),
            "moderate" => Ok(PolicyPreset::Moderate),
            "strict" => Ok(PolicyPreset::Strict),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyPreset::Permissive => "permissive",
            PolicyPreset::Moderate => "moderate",
            PolicyPreset::Strict => "strict",
        })
    }
}

impl From<PolicyPreset> for SecurityPolicy {
    fn from(preset: PolicyPreset) -> Self {
        SecurityPolicy::from_preset(preset)
    }
}

/// Outcome of a policy check: whether it was violated, the evidence, and
/// the dimensions that caused the violation (in report order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub violated: bool,
    pub report: RiskReport,
    pub violations: Vec<RiskKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_policy_and_report() {
        let report = RiskReport::new(true, false, true, false);
        let policy = SecurityPolicy {
            disallow_rooted_devices: true,
            disallow_emulators: true,
            ..SecurityPolicy::default()
        };

        let decision = policy.evaluate(report);
        assert!(decision.violated);
        assert_eq!(decision.violations, vec![RiskKind::Rooted]);
        assert_eq!(decision.report, report);
    }

    #[test]
    fn test_default_is_permissive() {
        assert_eq!(SecurityPolicy::default(), SecurityPolicy::permissive());
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Strict".parse::<PolicyPreset>().unwrap(), PolicyPreset::Strict);
        assert_eq!(" moderate ".parse::<PolicyPreset>().unwrap(), PolicyPreset::Moderate);
        assert!(matches!(
            "paranoid".parse::<PolicyPreset>(),
            Err(ConfigError::UnknownPreset(name)) if name == "paranoid"
        ));
    }

    #[test]
    fn test_missing_json_flags_default_to_allowed() {
        let policy: SecurityPolicy = serde_json::from_str(r#"{"disallowEmulators":true}"#).unwrap();
        assert_eq!(
            policy,
            SecurityPolicy {
                disallow_emulators: true,
                ..SecurityPolicy::permissive()
            }
        );
    }
}
