// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! TrustGate - device trust evaluation
//!
//! Heuristic detectors for rooted devices, hooking frameworks, emulators and
//! debuggable builds, combined through a [`SecurityPolicy`] into an
//! admit/deny decision that gates biometric authentication.
//!
//! Every detector is best effort. A probe that cannot run (missing file,
//! permission denied, no class loader) counts as "not detected"; evaluation
//! itself never fails.
//!
//! ```no_run
//! use trustgate::{RiskEvaluator, SecurityPolicy};
//!
//! let decision = RiskEvaluator::system().check_policy(&SecurityPolicy::moderate());
//! if decision.violated {
//!     println!("blocked: {:?}", decision.report.detected_risks());
//! }
//! ```

pub mod auth;
pub mod config;
pub mod detectors;
pub mod error;
pub mod evaluator;
pub mod ffi;
pub mod host;
pub mod policy;
pub mod probe;
pub mod report;

pub use auth::{AuthGuard, AuthResult, Authenticator, BiometricCapability, PromptInfo};
pub use config::{PolicyConfig, TrustConfig};
pub use error::{ConfigError, ProbeError};
pub use evaluator::RiskEvaluator;
pub use host::{DeviceIdentity, Host, HostConfig, SystemHost};
pub use policy::{PolicyDecision, PolicyPreset, SecurityPolicy};
pub use report::{RiskKind, RiskReport};

#[cfg(target_os = "android")]
use android_logger::Config;
#[cfg(target_os = "android")]
use log::LevelFilter;

/// Initialize logging for Android
#[cfg(target_os = "android")]
pub fn init_logging() {
    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Info)
            .with_tag("RustTrustGate"),
    );
}

/// Install a fmt subscriber honouring `RUST_LOG`. Repeated calls are no-ops.
#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
