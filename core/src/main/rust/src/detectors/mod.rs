// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Detectors: a fixed list of probes folded into one boolean.

mod debug;
mod emulator;
mod hook;
mod root;

pub use debug::debug_detector;
pub use emulator::{emulator_detector, identity_looks_emulated};
pub use hook::hook_detector;
pub use root::root_detector;

use tracing::info;

use crate::host::Host;
use crate::probe::{run_probe, Probe};

/// A named OR over probes.
///
/// Every probe runs on every call, even after one has fired, so the log
/// always carries the full set of evidence.
pub struct Detector {
    name: &'static str,
    probes: Vec<Box<dyn Probe>>,
}

impl Detector {
    pub fn new(name: &'static str, probes: Vec<Box<dyn Probe>>) -> Self {
        Self { name, probes }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    pub fn detect(&self, host: &dyn Host) -> bool {
        let mut fired = 0;
        for probe in &self.probes {
            if run_probe(probe.as_ref(), host) {
                fired += 1;
            }
        }

        if fired > 0 {
            info!(detector = self.name, fired, total = self.probes.len(), "risk detected");
        }
        fired > 0
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("name", &self.name)
            .field("probes", &self.probe_names())
            .finish()
    }
}

/// The four detectors used by one evaluator.
#[derive(Debug)]
pub struct DetectorSet {
    pub root: Detector,
    pub emulator: Detector,
    pub hook: Detector,
    pub debug: Detector,
}

impl Default for DetectorSet {
    fn default() -> Self {
        Self {
            root: root_detector(),
            emulator: emulator_detector(),
            hook: hook_detector(),
            debug: debug_detector(),
        }
    }
}
