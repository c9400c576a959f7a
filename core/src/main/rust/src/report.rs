// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use std::fmt;

use serde::{Deserialize, Serialize};

/// One risk dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskKind {
    Rooted,
    Emulator,
    Hooked,
    Debug,
}

impl RiskKind {
    /// All dimensions, in report order.
    pub const ALL: [RiskKind; 4] = [
        RiskKind::Rooted,
        RiskKind::Emulator,
        RiskKind::Hooked,
        RiskKind::Debug,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskKind::Rooted => "Root access detected",
            RiskKind::Emulator => "Running on emulator",
            RiskKind::Hooked => "Hooking framework detected",
            RiskKind::Debug => "App is debuggable",
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the four risk signals from one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub rooted: bool,
    pub emulator: bool,
    pub hooking_detected: bool,
    pub debug_mode: bool,
}

impl RiskReport {
    pub const fn new(rooted: bool, emulator: bool, hooking_detected: bool, debug_mode: bool) -> Self {
        Self {
            rooted,
            emulator,
            hooking_detected,
            debug_mode,
        }
    }

    pub fn is_present(&self, kind: RiskKind) -> bool {
        match kind {
            RiskKind::Rooted => self.rooted,
            RiskKind::Emulator => self.emulator,
            RiskKind::Hooked => self.hooking_detected,
            RiskKind::Debug => self.debug_mode,
        }
    }

    pub fn has_any_risk(&self) -> bool {
        self.rooted || self.emulator || self.hooking_detected || self.debug_mode
    }

    /// Present dimensions, in the fixed order rooted, emulator, hooked, debug.
    pub fn risks(&self) -> Vec<RiskKind> {
        RiskKind::ALL
            .into_iter()
            .filter(|kind| self.is_present(*kind))
            .collect()
    }

    /// Human-readable labels of [`RiskReport::risks`].
    pub fn detected_risks(&self) -> Vec<&'static str> {
        self.risks().into_iter().map(RiskKind::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report() {
        let report = RiskReport::default();
        assert!(!report.has_any_risk());
        assert!(report.detected_risks().is_empty());
    }

    #[test]
    fn test_detected_risks_order() {
        let report = RiskReport::new(true, false, true, true);
        assert_eq!(
            report.detected_risks(),
            vec!["Root access detected", "Hooking framework detected", "App is debuggable"]
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_string(&RiskReport::new(false, true, true, false)).unwrap();
        assert_eq!(
            json,
            r#"{"rooted":false,"emulator":true,"hookingDetected":true,"debugMode":false}"#
        );
    }
}
