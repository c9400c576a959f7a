// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

// Build script for the TrustGate library
// Ensures proper linking on Android

fn main() {
    // Build scripts run on the host, so look at the target instead of cfg!
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "android" {
        // android_logger writes through liblog
        println!("cargo:rustc-link-lib=log");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
