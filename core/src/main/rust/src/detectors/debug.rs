// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use super::Detector;
use crate::probe::DebuggableProbe;

/// Single probe: the app's own debuggable flag.
pub fn debug_detector() -> Detector {
    Detector::new("debug", vec![Box::new(DebuggableProbe)])
}
