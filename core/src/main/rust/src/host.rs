// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Access to the running host.
//!
//! Every probe reaches the environment through [`Host`]. [`SystemHost`] is
//! the real implementation: filesystem and procfs reads, system properties
//! and dynamic-symbol lookup. All of its paths are resolved under a
//! configurable root so a fake device tree can stand in for `/`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProbeError;

/// Property files consulted when a property is not supplied by the caller
/// and the platform property service is not available. Listed in init load
/// order; `ro.*` values are write-once, so the first file to set one wins.
const PROP_FILES: &[&str] = &[
    "/default.prop",
    "/system/etc/prop.default",
    "/system/build.prop",
    "/vendor/build.prop",
];

/// Identity strings of the device, as reported by the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub hardware: String,
    pub product: String,
    pub fingerprint: String,
    pub brand: String,
    pub device: String,
}

/// The environment as seen by probes.
///
/// Implementations report failures as [`ProbeError`]; they never panic on a
/// missing or forbidden resource.
pub trait Host {
    /// Whether something exists at the absolute `path`. A missing entry is
    /// `Ok(false)`, a forbidden one is an error.
    fn path_exists(&self, path: &str) -> Result<bool, ProbeError>;

    /// Read a (usually pseudo-) file completely.
    fn read_to_string(&self, path: &str) -> Result<String, ProbeError>;

    /// Value of a system property, `None` when unset.
    fn property(&self, name: &str) -> Result<Option<String>, ProbeError>;

    /// Whether the runtime can resolve the fully qualified class `name`.
    fn class_loadable(&self, name: &str) -> Result<bool, ProbeError>;

    /// Whether a native symbol is resolvable in the current process.
    fn symbol_loaded(&self, symbol: &str) -> Result<bool, ProbeError>;

    /// The application's own debuggable flag.
    fn app_debuggable(&self) -> Result<bool, ProbeError>;

    fn device_identity(&self) -> Result<DeviceIdentity, ProbeError> {
        identity_from_properties(self)
    }
}

/// Build a [`DeviceIdentity`] from the standard `ro.*` properties.
///
/// Each field is read on its own: a property that cannot be read is left
/// empty so the remaining fields still carry their evidence.
pub fn identity_from_properties<H: Host + ?Sized>(host: &H) -> Result<DeviceIdentity, ProbeError> {
    let prop = |name: &str| -> String {
        match host.property(name) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                debug!(property = name, error = %err, "identity property unreadable");
                String::new()
            }
        }
    };

    let mut hardware = prop("ro.hardware");
    if hardware.is_empty() {
        hardware = prop("ro.boot.hardware");
    }

    Ok(DeviceIdentity {
        manufacturer: prop("ro.product.manufacturer"),
        model: prop("ro.product.model"),
        hardware,
        product: prop("ro.product.name"),
        fingerprint: prop("ro.build.fingerprint"),
        brand: prop("ro.product.brand"),
        device: prop("ro.product.device"),
    })
}

/// Settings for [`SystemHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Prefix under which every absolute probe path is resolved.
    pub root: PathBuf,
    /// Property values that take precedence over the system lookup.
    pub properties: BTreeMap<String, String>,
    /// Explicit identity, e.g. the app's `Build` values.
    pub identity: Option<DeviceIdentity>,
    /// The app's debuggable flag; falls back to `debug_assertions`.
    pub debuggable: Option<bool>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            properties: BTreeMap::new(),
            identity: None,
            debuggable: None,
        }
    }
}

/// The real host.
#[derive(Debug, Clone, Default)]
pub struct SystemHost {
    config: HostConfig,
}

impl SystemHost {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    /// Host whose filesystem is rooted at `root` instead of `/`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(HostConfig {
            root: root.into(),
            ..HostConfig::default()
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn is_real_root(&self) -> bool {
        self.config.root == Path::new("/")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if self.is_real_root() {
            PathBuf::from(path)
        } else {
            self.config.root.join(path.trim_start_matches('/'))
        }
    }

    fn property_from_files(&self, name: &str) -> Result<Option<String>, ProbeError> {
        let mut first_error = None;

        for file in PROP_FILES {
            let content = match self.read_to_string(file) {
                Ok(content) => content,
                Err(ProbeError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    continue;
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                    continue;
                }
            };

            if let Some(value) = find_property(&content, name) {
                return Ok(Some(value.to_string()));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

impl Host for SystemHost {
    fn path_exists(&self, path: &str) -> Result<bool, ProbeError> {
        let resolved = self.resolve(path);
        // symlink_metadata so a dangling link to a removed binary still counts
        match fs::symlink_metadata(&resolved) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ProbeError::from_io(resolved, err)),
        }
    }

    fn read_to_string(&self, path: &str) -> Result<String, ProbeError> {
        let resolved = self.resolve(path);
        fs::read_to_string(&resolved).map_err(|err| ProbeError::from_io(resolved, err))
    }

    fn property(&self, name: &str) -> Result<Option<String>, ProbeError> {
        if let Some(value) = self.config.properties.get(name) {
            return Ok(Some(value.clone()));
        }

        #[cfg(target_os = "android")]
        if self.is_real_root() {
            if let Some(value) = android_property(name) {
                return Ok(Some(value));
            }
        }

        self.property_from_files(name)
    }

    fn class_loadable(&self, _name: &str) -> Result<bool, ProbeError> {
        Err(ProbeError::Unavailable("class loader"))
    }

    fn symbol_loaded(&self, symbol: &str) -> Result<bool, ProbeError> {
        resolve_symbol(symbol)
    }

    fn app_debuggable(&self) -> Result<bool, ProbeError> {
        Ok(self.config.debuggable.unwrap_or(cfg!(debug_assertions)))
    }

    fn device_identity(&self) -> Result<DeviceIdentity, ProbeError> {
        match &self.config.identity {
            Some(identity) => Ok(identity.clone()),
            None => identity_from_properties(self),
        }
    }
}

/// Look up `name` in `build.prop` formatted content. Later lines do not
/// override earlier ones.
pub fn find_property<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

#[cfg(target_os = "android")]
fn android_property(name: &str) -> Option<String> {
    use std::ffi::{CStr, CString};

    // PROP_VALUE_MAX in bionic
    const PROP_VALUE_MAX: usize = 92;

    let name = CString::new(name).ok()?;
    let mut buf = [0 as libc::c_char; PROP_VALUE_MAX];
    // SAFETY: `buf` has the PROP_VALUE_MAX capacity bionic writes into and
    // `name` is NUL terminated.
    let len = unsafe { libc::__system_property_get(name.as_ptr(), buf.as_mut_ptr()) };
    if len <= 0 {
        return None;
    }
    // SAFETY: bionic always NUL terminates the value.
    let value = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Some(value.to_string_lossy().into_owned())
}

#[cfg(unix)]
fn resolve_symbol(symbol: &str) -> Result<bool, ProbeError> {
    use std::ffi::CString;

    use tracing::trace;

    let name = CString::new(symbol).map_err(|err| ProbeError::Malformed {
        what: "symbol name",
        detail: err.to_string(),
    })?;
    // SAFETY: RTLD_DEFAULT searches the global scope; the returned pointer is
    // only compared against null, never dereferenced.
    let addr = unsafe { libc::dlsym(libc::RTLD_DEFAULT, name.as_ptr()) };
    trace!(symbol, found = !addr.is_null(), "dlsym");
    Ok(!addr.is_null())
}

#[cfg(not(unix))]
fn resolve_symbol(_symbol: &str) -> Result<bool, ProbeError> {
    Err(ProbeError::Unavailable("dynamic symbol lookup"))
}
