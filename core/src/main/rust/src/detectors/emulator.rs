// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use tracing::debug;

use super::Detector;
use crate::host::DeviceIdentity;
use crate::probe::{IdentityProbe, PathProbe, PropertyMatch, PropertyProbe};

/// Emulator detection: QEMU and emulator-specific files
const EMULATOR_FILES: &[&str] = &[
    "/dev/socket/qemud",
    "/dev/qemu_pipe",
    "/sys/qemu_trace",
    "/system/bin/qemu-props",
    "/system/lib/libc_malloc_debug_qemu.so",
    "/sys/bus/platform/drivers/qemu_pipe",
    "/dev/socket/genyd",
    "/dev/socket/baseband_genyd",
];

const FINGERPRINT_PREFIXES: &[&str] = &["generic", "unknown"];
const FINGERPRINT_MARKERS: &[&str] = &["emulator", "vbox"];
const MODEL_MARKERS: &[&str] = &["google_sdk", "emulator", "android sdk built for"];
const MANUFACTURER_MARKERS: &[&str] = &["genymotion"];
const HARDWARE_MARKERS: &[&str] = &["goldfish", "ranchu", "vbox86"];
const PRODUCT_MARKERS: &[&str] = &["sdk_gphone", "vbox86p", "emulator", "simulator"];
const PRODUCT_NAMES: &[&str] = &["sdk", "google_sdk", "sdk_x86", "sdk_google"];

/// Google ships both the stock emulator images and Pixel hardware, so a
/// Google manufacturer only counts together with one of these model hints.
const GOOGLE_MODEL_HINTS: &[&str] = &["sdk", "gphone", "x86", "aosp"];

fn contains_any(value: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| value.contains(marker))
}

/// Whether the identity strings match a known emulator signature.
pub fn identity_looks_emulated(identity: &DeviceIdentity) -> bool {
    let fingerprint = identity.fingerprint.to_lowercase();
    let model = identity.model.to_lowercase();
    let manufacturer = identity.manufacturer.to_lowercase();
    let hardware = identity.hardware.to_lowercase();
    let product = identity.product.to_lowercase();
    let brand = identity.brand.to_lowercase();
    let device = identity.device.to_lowercase();

    let checks = [
        (
            "fingerprint",
            FINGERPRINT_PREFIXES.iter().any(|prefix| fingerprint.starts_with(prefix))
                || contains_any(&fingerprint, FINGERPRINT_MARKERS),
        ),
        ("model", contains_any(&model, MODEL_MARKERS)),
        ("manufacturer", contains_any(&manufacturer, MANUFACTURER_MARKERS)),
        ("hardware", contains_any(&hardware, HARDWARE_MARKERS)),
        (
            "product",
            contains_any(&product, PRODUCT_MARKERS) || PRODUCT_NAMES.contains(&product.as_str()),
        ),
        (
            "brand_device",
            brand.starts_with("generic") && device.starts_with("generic"),
        ),
        (
            "google_model",
            manufacturer == "google" && contains_any(&model, GOOGLE_MODEL_HINTS),
        ),
    ];

    let mut suspicious = false;
    for (field, hit) in checks {
        if hit {
            debug!(field, "emulator identity signature");
            suspicious = true;
        }
    }
    suspicious
}

pub fn emulator_detector() -> Detector {
    Detector::new(
        "emulator",
        vec![
            Box::new(IdentityProbe::new("device_identity", identity_looks_emulated)),
            Box::new(PropertyProbe::new(
                "kernel_qemu",
                "ro.kernel.qemu",
                PropertyMatch::Equals("1"),
            )),
            Box::new(PathProbe::new("emulator_files", EMULATOR_FILES)),
        ],
    )
}
