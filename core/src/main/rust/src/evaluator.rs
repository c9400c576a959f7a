// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Risk evaluation and policy checks.
//!
//! Nothing is cached: each call probes the live host again, so an
//! instrumentation agent attached between two authentication attempts is
//! seen by the second one.

use tracing::{debug, debug_span, warn};

use crate::detectors::DetectorSet;
use crate::host::{Host, HostConfig, SystemHost};
use crate::policy::{PolicyDecision, SecurityPolicy};
use crate::report::RiskReport;

/// Runs the four detectors against a host.
#[derive(Debug)]
pub struct RiskEvaluator<H = SystemHost> {
    host: H,
    detectors: DetectorSet,
}

impl RiskEvaluator<SystemHost> {
    /// Evaluator over the real host with default settings.
    pub fn system() -> Self {
        Self::new(SystemHost::default())
    }

    pub fn from_config(config: HostConfig) -> Self {
        Self::new(SystemHost::new(config))
    }
}

impl<H: Host> RiskEvaluator<H> {
    pub fn new(host: H) -> Self {
        Self::with_detectors(host, DetectorSet::default())
    }

    pub fn with_detectors(host: H, detectors: DetectorSet) -> Self {
        Self { host, detectors }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Probe the host and build a fresh report. Never fails: a probe that
    /// cannot run counts as "not detected".
    pub fn evaluate_risk(&self) -> RiskReport {
        let _span = debug_span!("evaluate_risk").entered();
        let host: &dyn Host = &self.host;

        let report = RiskReport {
            rooted: self.detectors.root.detect(host),
            emulator: self.detectors.emulator.detect(host),
            hooking_detected: self.detectors.hook.detect(host),
            debug_mode: self.detectors.debug.detect(host),
        };

        debug!(?report, "risk evaluated");
        report
    }

    /// Evaluate the host and compare the report against `policy`.
    ///
    /// The policy is copied before probing starts; later changes by the
    /// caller do not affect this call.
    pub fn check_policy(&self, policy: &SecurityPolicy) -> PolicyDecision {
        let policy = *policy;
        let decision = policy.evaluate(self.evaluate_risk());

        for kind in &decision.violations {
            warn!(risk = %kind, "security policy violated");
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::Detector;
    use crate::error::ProbeError;
    use crate::probe::Probe;
    use crate::report::RiskKind;

    struct Fixed(bool);

    impl Probe for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn evaluate(&self, _host: &dyn Host) -> Result<bool, ProbeError> {
            Ok(self.0)
        }
    }

    fn evaluator(report: RiskReport) -> RiskEvaluator {
        let fixed = |name, value| Detector::new(name, vec![Box::new(Fixed(value)) as Box<dyn Probe>]);
        RiskEvaluator::with_detectors(
            SystemHost::default(),
            DetectorSet {
                root: fixed("root", report.rooted),
                emulator: fixed("emulator", report.emulator),
                hook: fixed("hook", report.hooking_detected),
                debug: fixed("debug", report.debug_mode),
            },
        )
    }

    #[test]
    fn test_report_mirrors_detectors() {
        let expected = RiskReport::new(false, true, false, true);
        assert_eq!(evaluator(expected).evaluate_risk(), expected);
    }

    #[test]
    fn test_check_policy_reports_violations() {
        let decision = evaluator(RiskReport::new(false, true, false, true))
            .check_policy(&SecurityPolicy::strict());
        assert!(decision.violated);
        assert_eq!(decision.violations, vec![RiskKind::Emulator, RiskKind::Debug]);
    }

    #[test]
    fn test_moderate_ignores_emulator_and_debug() {
        let decision = evaluator(RiskReport::new(false, true, false, true))
            .check_policy(&SecurityPolicy::moderate());
        assert!(!decision.violated);
        assert!(decision.violations.is_empty());
    }
}
