// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! JNI bindings for `com.ble1st.connectias.core.security.trust.RustTrustEvaluator`.
//!
//! Results are returned as JSON strings. A failure on the Rust side never
//! throws into the VM; a fallback JSON document is returned instead.

use std::cell::RefCell;

use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jstring, JNI_FALSE};
use jni::JNIEnv;
use serde::Serialize;
use tracing::warn;

use crate::error::ProbeError;
use crate::evaluator::RiskEvaluator;
use crate::host::{DeviceIdentity, Host, HostConfig, SystemHost};
use crate::policy::SecurityPolicy;

const FALLBACK_REPORT: &str =
    r#"{"rooted":false,"emulator":false,"hookingDetected":false,"debugMode":false}"#;
const FALLBACK_DECISION: &str = r#"{"violated":false,"report":{"rooted":false,"emulator":false,"hookingDetected":false,"debugMode":false},"violations":[]}"#;

/// Host that answers class lookups through the calling VM and everything
/// else through [`SystemHost`].
struct JniHost<'a, 'local> {
    system: SystemHost,
    env: RefCell<&'a mut JNIEnv<'local>>,
}

impl<'a, 'local> JniHost<'a, 'local> {
    fn new(env: &'a mut JNIEnv<'local>, config: HostConfig) -> Self {
        Self {
            system: SystemHost::new(config),
            env: RefCell::new(env),
        }
    }
}

impl Host for JniHost<'_, '_> {
    fn path_exists(&self, path: &str) -> Result<bool, ProbeError> {
        self.system.path_exists(path)
    }

    fn read_to_string(&self, path: &str) -> Result<String, ProbeError> {
        self.system.read_to_string(path)
    }

    fn property(&self, name: &str) -> Result<Option<String>, ProbeError> {
        self.system.property(name)
    }

    fn class_loadable(&self, name: &str) -> Result<bool, ProbeError> {
        let mut env = self.env.borrow_mut();
        let binary_name = name.replace('.', "/");
        match env.find_class(binary_name.as_str()) {
            Ok(class) => {
                let _ = env.delete_local_ref(class);
                Ok(true)
            }
            Err(_) => {
                // FindClass leaves a ClassNotFoundException pending
                if env.exception_check().unwrap_or(false) {
                    let _ = env.exception_clear();
                }
                Ok(false)
            }
        }
    }

    fn symbol_loaded(&self, symbol: &str) -> Result<bool, ProbeError> {
        self.system.symbol_loaded(symbol)
    }

    fn app_debuggable(&self) -> Result<bool, ProbeError> {
        self.system.app_debuggable()
    }

    fn device_identity(&self) -> Result<DeviceIdentity, ProbeError> {
        self.system.device_identity()
    }
}

/// Parse the app's `Build` values (`{"manufacturer":..,"model":..}`).
/// Empty or unreadable input leaves identity to the property lookup.
fn identity_from_json(json: &str) -> Option<DeviceIdentity> {
    if json.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(json) {
        Ok(identity) => Some(identity),
        Err(err) => {
            warn!(error = %err, "invalid identity JSON, reading properties instead");
            None
        }
    }
}

fn host_config(debuggable: jboolean, identity_json: &str) -> HostConfig {
    HostConfig {
        debuggable: Some(debuggable != JNI_FALSE),
        identity: identity_from_json(identity_json),
        ..HostConfig::default()
    }
}

fn read_string(env: &mut JNIEnv, value: &JString) -> String {
    if value.is_null() {
        return String::new();
    }
    match env.get_string(value) {
        Ok(s) => s.to_string_lossy().to_string(),
        Err(_) => String::new(),
    }
}

fn to_json_jstring<T: Serialize>(env: &JNIEnv, value: &T, fallback: &str) -> jstring {
    let json = serde_json::to_string(value).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize result");
        fallback.to_string()
    });

    match env.new_string(&json) {
        Ok(jstr) => jstr.into_raw(),
        Err(_) => match env.new_string(fallback) {
            Ok(jstr) => jstr.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
    }
}

/// Initialize logging
#[no_mangle]
pub extern "C" fn Java_com_ble1st_connectias_core_security_trust_RustTrustEvaluator_nativeInit(
    _env: JNIEnv,
    _class: JClass,
) {
    crate::init_logging();
}

/// Evaluate risk - JNI entry point
///
/// `identity_json` carries the Build values (may be empty).
/// Returns JSON string with RiskReport
#[no_mangle]
pub extern "C" fn Java_com_ble1st_connectias_core_security_trust_RustTrustEvaluator_nativeEvaluateRisk(
    mut env: JNIEnv,
    _class: JClass,
    debuggable: jboolean,
    identity_json: JString,
) -> jstring {
    let config = host_config(debuggable, &read_string(&mut env, &identity_json));
    let report = {
        let host = JniHost::new(&mut env, config);
        RiskEvaluator::new(host).evaluate_risk()
    };

    to_json_jstring(&env, &report, FALLBACK_REPORT)
}

/// Check policy - JNI entry point
///
/// `policy_json` is a serialized SecurityPolicy; an unreadable policy falls
/// back to permissive. `identity_json` carries the Build values (may be
/// empty). Returns JSON string with PolicyDecision.
#[no_mangle]
pub extern "C" fn Java_com_ble1st_connectias_core_security_trust_RustTrustEvaluator_nativeCheckPolicy(
    mut env: JNIEnv,
    _class: JClass,
    policy_json: JString,
    debuggable: jboolean,
    identity_json: JString,
) -> jstring {
    let policy_str = read_string(&mut env, &policy_json);
    let config = host_config(debuggable, &read_string(&mut env, &identity_json));

    let policy = match serde_json::from_str::<SecurityPolicy>(&policy_str) {
        Ok(policy) => policy,
        Err(err) => {
            warn!(error = %err, "invalid policy JSON, using permissive policy");
            SecurityPolicy::permissive()
        }
    };

    let decision = {
        let host = JniHost::new(&mut env, config);
        RiskEvaluator::new(host).check_policy(&policy)
    };

    to_json_jstring(&env, &decision, FALLBACK_DECISION)
}

#[cfg(test)]
mod tests {
    use jni::sys::JNI_TRUE;

    use super::*;

    #[test]
    fn test_build_values_become_host_identity() {
        let config = host_config(
            JNI_TRUE,
            r#"{"manufacturer":"Google","model":"sdk_gphone64_arm64","hardware":"ranchu"}"#,
        );
        let identity = config.identity.unwrap();
        assert_eq!(identity.model, "sdk_gphone64_arm64");
        assert_eq!(identity.hardware, "ranchu");
        assert!(identity.fingerprint.is_empty());
        assert_eq!(config.debuggable, Some(true));
    }

    #[test]
    fn test_missing_or_invalid_identity_falls_back_to_properties() {
        assert_eq!(host_config(JNI_FALSE, "").identity, None);
        assert_eq!(host_config(JNI_FALSE, "not json").identity, None);
        assert_eq!(host_config(JNI_FALSE, "").debuggable, Some(false));
    }

    #[test]
    fn test_build_identity_drives_emulator_detection() {
        let config = host_config(
            JNI_FALSE,
            r#"{"manufacturer":"Genymotion","model":"vbox86p"}"#,
        );
        let host = SystemHost::new(HostConfig {
            root: std::env::temp_dir().join("trustgate-ffi-empty-root"),
            ..config
        });
        assert!(RiskEvaluator::new(host).evaluate_risk().emulator);
    }
}
