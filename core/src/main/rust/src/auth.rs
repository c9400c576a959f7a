// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Gating of biometric authentication on the device risk policy.
//!
//! The prompt itself belongs to the platform and is reached through
//! [`Authenticator`]. [`AuthGuard`] owns the replaceable policy and runs the
//! policy check right before every prompt.

use std::sync::{PoisonError, RwLock};

use tracing::{info, warn};

use crate::evaluator::RiskEvaluator;
use crate::host::{Host, SystemHost};
use crate::policy::SecurityPolicy;
use crate::report::RiskReport;

/// Result of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Success,
    /// The user was not recognised.
    Failed,
    /// No usable biometric hardware or enrollment.
    NotSupported,
    /// The risk policy blocked the attempt before any prompt was shown.
    SecurityViolation(RiskReport),
    AuthenticationError { code: i32, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricCapability {
    Available,
    NoHardware,
    NoneEnrolled,
    Unavailable,
}

/// Text shown on the platform prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptInfo {
    pub title: String,
    pub subtitle: Option<String>,
    pub negative_button: String,
}

/// The platform biometric prompt.
#[cfg_attr(test, mockall::automock)]
pub trait Authenticator {
    fn capability(&self) -> BiometricCapability;

    fn authenticate(&self, prompt: &PromptInfo) -> AuthResult;
}

pub struct AuthGuard<A, H = SystemHost> {
    authenticator: A,
    evaluator: RiskEvaluator<H>,
    policy: RwLock<SecurityPolicy>,
}

impl<A: Authenticator, H: Host> AuthGuard<A, H> {
    pub fn new(authenticator: A, evaluator: RiskEvaluator<H>, policy: SecurityPolicy) -> Self {
        Self {
            authenticator,
            evaluator,
            policy: RwLock::new(policy),
        }
    }

    pub fn policy(&self) -> SecurityPolicy {
        *self.policy.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the policy. Takes effect from the next `authenticate` call.
    pub fn set_policy(&self, policy: SecurityPolicy) {
        *self.policy.write().unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn evaluator(&self) -> &RiskEvaluator<H> {
        &self.evaluator
    }

    pub fn authenticate(&self, prompt: &PromptInfo) -> AuthResult {
        let policy = self.policy();

        let capability = self.authenticator.capability();
        if capability != BiometricCapability::Available {
            info!(?capability, "biometric authentication not supported");
            return AuthResult::NotSupported;
        }

        let decision = self.evaluator.check_policy(&policy);
        if decision.violated {
            warn!(risks = ?decision.report.detected_risks(), "authentication blocked by security policy");
            return AuthResult::SecurityViolation(decision.report);
        }

        self.authenticator.authenticate(prompt)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::host::HostConfig;

    fn debuggable_evaluator() -> RiskEvaluator {
        let dir = std::env::temp_dir().join("trustgate-auth-empty-root");
        RiskEvaluator::from_config(HostConfig {
            root: dir,
            debuggable: Some(true),
            ..HostConfig::default()
        })
    }

    #[test]
    fn test_violation_never_shows_prompt() {
        let mut mock = MockAuthenticator::new();
        mock.expect_capability().return_const(BiometricCapability::Available);
        mock.expect_authenticate().never();

        let guard = AuthGuard::new(mock, debuggable_evaluator(), SecurityPolicy::strict());
        assert_matches!(
            guard.authenticate(&PromptInfo::default()),
            AuthResult::SecurityViolation(report) if report.debug_mode
        );
    }

    #[test]
    fn test_allowed_attempt_reaches_prompt() {
        let mut mock = MockAuthenticator::new();
        mock.expect_capability().return_const(BiometricCapability::Available);
        mock.expect_authenticate()
            .times(1)
            .returning(|_| AuthResult::Success);

        let guard = AuthGuard::new(mock, debuggable_evaluator(), SecurityPolicy::moderate());
        assert_eq!(guard.authenticate(&PromptInfo::default()), AuthResult::Success);
    }

    #[test]
    fn test_missing_enrollment_is_not_supported() {
        let mut mock = MockAuthenticator::new();
        mock.expect_capability().return_const(BiometricCapability::NoneEnrolled);
        mock.expect_authenticate().never();

        let guard = AuthGuard::new(mock, debuggable_evaluator(), SecurityPolicy::permissive());
        assert_eq!(guard.authenticate(&PromptInfo::default()), AuthResult::NotSupported);
    }

    #[test]
    fn test_policy_swap_applies_to_next_attempt() {
        let mut mock = MockAuthenticator::new();
        mock.expect_capability().return_const(BiometricCapability::Available);
        mock.expect_authenticate()
            .times(1)
            .returning(|_| AuthResult::Failed);

        let guard = AuthGuard::new(mock, debuggable_evaluator(), SecurityPolicy::permissive());
        assert_eq!(guard.authenticate(&PromptInfo::default()), AuthResult::Failed);

        guard.set_policy(SecurityPolicy::strict());
        assert_eq!(guard.policy(), SecurityPolicy::strict());
        assert_matches!(
            guard.authenticate(&PromptInfo::default()),
            AuthResult::SecurityViolation(_)
        );
    }
}
