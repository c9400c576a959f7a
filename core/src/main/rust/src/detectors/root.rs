// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use super::Detector;
use crate::probe::{CommandProbe, PathProbe, PropertyMatch, PropertyProbe};

/// Common SU binary paths (from RootBeer)
const SU_PATHS: &[&str] = &[
    "/data/local/su",
    "/data/local/bin/su",
    "/data/local/xbin/su",
    "/sbin/su",
    "/su/bin/su",
    "/system/bin/su",
    "/system/bin/.ext/su",
    "/system/bin/failsafe/su",
    "/system/sd/xbin/su",
    "/system/usr/we-need-root/su",
    "/system/xbin/su",
    "/cache/su",
    "/data/su",
    "/dev/su",
    "/system_ext/bin/su",
    "/odm/bin/su",
];

/// Directories searched for executables instead of `PATH`
const BIN_DIRS: &[&str] = &[
    "/sbin",
    "/system/bin",
    "/system/xbin",
    "/system/sd/xbin",
    "/system/bin/failsafe",
    "/data/local",
    "/data/local/bin",
    "/data/local/xbin",
    "/product/bin",
    "/vendor/bin",
    "/vendor/xbin",
    "/su/bin",
];

/// Magisk paths
const MAGISK_PATHS: &[&str] = &[
    "/data/adb/magisk",
    "/data/adb/magisk.db",
    "/sbin/.magisk",
    "/sbin/magisk",
    "/sbin/magiskhide",
    "/system/bin/magisk",
    "/cache/magisk.log",
    "/cache/.disable_magisk",
    "/dev/.magisk.unblock",
    "/data/magisk/magisk.db",
];

/// Busybox paths outside the regular binary directories
const BUSYBOX_PATHS: &[&str] = &[
    "/system/xbin/busybox",
    "/data/local/busybox",
    "/su/xbin/busybox",
];

pub fn root_detector() -> Detector {
    Detector::new(
        "root",
        vec![
            Box::new(PathProbe::new("su_paths", SU_PATHS)),
            Box::new(CommandProbe::new("su_command", "su", BIN_DIRS)),
            Box::new(PathProbe::new("magisk_paths", MAGISK_PATHS)),
            Box::new(CommandProbe::new("magisk_command", "magisk", BIN_DIRS)),
            Box::new(PathProbe::new("busybox_paths", BUSYBOX_PATHS)),
            Box::new(CommandProbe::new("busybox_command", "busybox", BIN_DIRS)),
            Box::new(PropertyProbe::new(
                "prop_debuggable",
                "ro.debuggable",
                PropertyMatch::Equals("1"),
            )),
            Box::new(PropertyProbe::new(
                "prop_insecure",
                "ro.secure",
                PropertyMatch::Equals("0"),
            )),
            Box::new(PropertyProbe::new(
                "test_keys",
                "ro.build.tags",
                PropertyMatch::Contains("test-keys"),
            )),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::host::SystemHost;

    fn touch(root: &std::path::Path, path: &str) {
        let full = root.join(path.trim_start_matches('/'));
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, b"").unwrap();
    }

    #[test]
    fn test_clean_tree_is_not_rooted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!root_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_su_in_bin_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "/vendor/bin/su");
        assert!(root_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_magisk_artifact() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "/data/adb/magisk.db");
        assert!(root_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_busybox_in_bin_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "/sbin/busybox");
        assert!(root_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_test_keys_build() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("system")).unwrap();
        fs::write(
            dir.path().join("system/build.prop"),
            "ro.build.tags=test-keys\nro.secure=1\nro.debuggable=0\n",
        )
        .unwrap();
        assert!(root_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_release_build_props_are_clean() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("system")).unwrap();
        fs::write(
            dir.path().join("system/build.prop"),
            "ro.build.tags=release-keys\nro.secure=1\nro.debuggable=0\n",
        )
        .unwrap();
        assert!(!root_detector().detect(&SystemHost::with_root(dir.path())));
    }
}
