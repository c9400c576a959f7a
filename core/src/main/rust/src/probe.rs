// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Evidence probes.
//!
//! A probe answers one narrow question about the host. Probes may fail;
//! [`run_probe`] is the single place where a failure (or a panic) is turned
//! into "not detected".

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::host::{DeviceIdentity, Host};

/// A single check for one piece of environmental evidence.
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError>;
}

/// Run `probe` behind the recovery boundary: errors and panics resolve to
/// `false` and are logged.
pub fn run_probe(probe: &dyn Probe, host: &dyn Host) -> bool {
    let name = probe.name();
    match panic::catch_unwind(AssertUnwindSafe(|| probe.evaluate(host))) {
        Ok(Ok(found)) => {
            if found {
                debug!(probe = name, "probe fired");
            }
            found
        }
        Ok(Err(ProbeError::Unavailable(what))) => {
            debug!(probe = name, what, "probe skipped, not available");
            false
        }
        Ok(Err(err)) => {
            warn!(probe = name, error = %err, "probe failed, treating as not detected");
            false
        }
        Err(_) => {
            warn!(probe = name, "probe panicked, treating as not detected");
            false
        }
    }
}

/// Any of a fixed list of absolute paths exists.
///
/// Each path is checked on its own; a forbidden path counts as absent and
/// does not stop the remaining checks.
pub struct PathProbe {
    name: &'static str,
    paths: &'static [&'static str],
}

impl PathProbe {
    pub const fn new(name: &'static str, paths: &'static [&'static str]) -> Self {
        Self { name, paths }
    }
}

impl Probe for PathProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let mut found = false;
        for path in self.paths {
            match host.path_exists(path) {
                Ok(true) => {
                    debug!(probe = self.name, path, "artifact present");
                    found = true;
                }
                Ok(false) => {}
                Err(err) => debug!(probe = self.name, path, error = %err, "path not checkable"),
            }
        }
        Ok(found)
    }
}

/// An executable named `command` sits in one of the fixed binary
/// directories. `PATH` and the shell are never consulted.
pub struct CommandProbe {
    name: &'static str,
    command: &'static str,
    dirs: &'static [&'static str],
}

impl CommandProbe {
    pub const fn new(name: &'static str, command: &'static str, dirs: &'static [&'static str]) -> Self {
        Self { name, command, dirs }
    }
}

impl Probe for CommandProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let mut found = false;
        for dir in self.dirs {
            let candidate = format!("{}/{}", dir.trim_end_matches('/'), self.command);
            match host.path_exists(&candidate) {
                Ok(true) => {
                    debug!(probe = self.name, path = %candidate, "command resolved");
                    found = true;
                }
                Ok(false) => {}
                Err(err) => debug!(probe = self.name, path = %candidate, error = %err, "path not checkable"),
            }
        }
        Ok(found)
    }
}

/// Look up every name, tolerating failures per name. Fails only when no
/// lookup could be made at all.
fn lookup_each(
    probe: &str,
    names: &[&str],
    lookup: impl Fn(&str) -> Result<bool, ProbeError>,
) -> Result<bool, ProbeError> {
    let mut found = false;
    let mut answered = false;
    let mut last_error = None;

    for &name in names {
        match lookup(name) {
            Ok(hit) => {
                answered = true;
                if hit {
                    debug!(probe, name, "name resolved");
                    found = true;
                }
            }
            Err(err) => {
                debug!(probe, name, error = %err, "lookup failed");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) if !answered => Err(err),
        _ => Ok(found),
    }
}

/// Any of the named classes can be loaded. Not resolving is the normal case.
pub struct ClassProbe {
    name: &'static str,
    classes: &'static [&'static str],
}

impl ClassProbe {
    pub const fn new(name: &'static str, classes: &'static [&'static str]) -> Self {
        Self { name, classes }
    }
}

impl Probe for ClassProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        lookup_each(self.name, self.classes, |class| host.class_loadable(class))
    }
}

/// Any of the named native symbols is resolvable in this process.
pub struct SymbolProbe {
    name: &'static str,
    symbols: &'static [&'static str],
}

impl SymbolProbe {
    pub const fn new(name: &'static str, symbols: &'static [&'static str]) -> Self {
        Self { name, symbols }
    }
}

impl Probe for SymbolProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        lookup_each(self.name, self.symbols, |symbol| host.symbol_loaded(symbol))
    }
}

/// How a property value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMatch {
    Equals(&'static str),
    Contains(&'static str),
    Present,
}

impl PropertyMatch {
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (PropertyMatch::Equals(expected), Some(value)) => value.trim() == *expected,
            (PropertyMatch::Contains(needle), Some(value)) => value.contains(needle),
            (PropertyMatch::Present, Some(value)) => !value.trim().is_empty(),
            (_, None) => false,
        }
    }
}

/// A system property has a known dangerous value.
pub struct PropertyProbe {
    name: &'static str,
    property: &'static str,
    expect: PropertyMatch,
}

impl PropertyProbe {
    pub const fn new(name: &'static str, property: &'static str, expect: PropertyMatch) -> Self {
        Self { name, property, expect }
    }
}

impl Probe for PropertyProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let value = host.property(self.property)?;
        let hit = self.expect.matches(value.as_deref());
        if hit {
            debug!(probe = self.name, property = self.property, value = ?value, "dangerous property");
        }
        Ok(hit)
    }
}

/// The process's own memory map mentions a known injected library.
pub struct MapsProbe {
    name: &'static str,
    needles: &'static [&'static str],
}

impl MapsProbe {
    pub const MAPS_PATH: &'static str = "/proc/self/maps";

    pub const fn new(name: &'static str, needles: &'static [&'static str]) -> Self {
        Self { name, needles }
    }
}

impl Probe for MapsProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let maps = host.read_to_string(Self::MAPS_PATH)?.to_lowercase();
        let mut found = false;
        for needle in self.needles {
            if maps.contains(&needle.to_lowercase()) {
                debug!(probe = self.name, needle, "mapping present");
                found = true;
            }
        }
        Ok(found)
    }
}

/// A local socket is bound to a known instrumentation-server port,
/// according to the process's view of the proc network tables.
pub struct ListeningPortProbe {
    name: &'static str,
    port: u16,
    tables: &'static [&'static str],
}

impl ListeningPortProbe {
    pub const TCP_TABLES: &'static [&'static str] = &["/proc/net/tcp", "/proc/net/tcp6"];

    pub const fn new(name: &'static str, port: u16) -> Self {
        Self {
            name,
            port,
            tables: Self::TCP_TABLES,
        }
    }
}

impl Probe for ListeningPortProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let mut found = false;
        let mut readable = false;
        let mut last_error = None;

        for table in self.tables {
            match host.read_to_string(table) {
                Ok(content) => {
                    readable = true;
                    if port_in_table(&content, self.port) {
                        debug!(probe = self.name, table, port = self.port, "port bound");
                        found = true;
                    }
                }
                Err(err) => last_error = Some(err),
            }
        }

        match last_error {
            Some(err) if !readable => Err(err),
            _ => Ok(found),
        }
    }
}

/// Whether `port` appears as a local port in a `/proc/net/tcp` style table.
/// Ports are encoded as four upper-case hex digits after the address.
pub fn port_in_table(table: &str, port: u16) -> bool {
    let encoded = format!("{:04X}", port);
    table
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|local| local.rsplit_once(':'))
        .any(|(_, local_port)| local_port.eq_ignore_ascii_case(&encoded))
}

/// The device identity matches a known emulator signature.
pub struct IdentityProbe {
    name: &'static str,
    check: fn(&DeviceIdentity) -> bool,
}

impl IdentityProbe {
    pub const fn new(name: &'static str, check: fn(&DeviceIdentity) -> bool) -> Self {
        Self { name, check }
    }
}

impl Probe for IdentityProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        let identity = host.device_identity()?;
        Ok((self.check)(&identity))
    }
}

/// The application was built debuggable.
pub struct DebuggableProbe;

impl Probe for DebuggableProbe {
    fn name(&self) -> &str {
        "app_debuggable"
    }

    fn evaluate(&self, host: &dyn Host) -> Result<bool, ProbeError> {
        host.app_debuggable()
    }
}
