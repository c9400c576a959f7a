// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use super::Detector;
use crate::probe::{ClassProbe, ListeningPortProbe, MapsProbe, PathProbe, SymbolProbe};

/// Classes only present when a hook framework is injected into the VM
const HOOK_CLASSES: &[&str] = &[
    "de.robv.android.xposed.XposedBridge",
    "de.robv.android.xposed.XposedHelpers",
    "com.saurik.substrate.MS$2",
    "org.lsposed.lspd.core.Main",
];

/// Native entry points exported by injected agents
const HOOK_SYMBOLS: &[&str] = &[
    "MSHookFunction",
    "MSFindSymbol",
    "frida_agent_main",
    "gum_interceptor_obtain",
];

/// Hook framework files (Xposed variants, Frida server, Substrate)
const HOOK_PATHS: &[&str] = &[
    "/system/framework/XposedBridge.jar",
    "/system/bin/app_process32_xposed",
    "/system/bin/app_process64_xposed",
    "/system/lib/libxposed_art.so",
    "/system/lib64/libxposed_art.so",
    "/system/xbin/xposed",
    "/data/xposed.prop",
    "/data/adb/modules/edxposed",
    "/data/adb/modules/lsposed",
    "/data/adb/modules/riru_edxposed",
    "/data/adb/modules/riru_lsposed",
    "/data/local/tmp/frida-server",
    "/data/local/tmp/re.frida.server",
    "/system/bin/frida-server",
    "/system/xbin/frida-server",
    "/system/lib/libsubstrate.so",
    "/system/lib64/libsubstrate.so",
    "/data/local/tmp/substrate",
];

/// Library names that show up in /proc/self/maps once injected
const INJECTED_LIBRARIES: &[&str] = &[
    "frida-agent",
    "frida-gadget",
    "libfrida",
    "XposedBridge",
    "libxposed",
    "libsubstrate",
    "liblspd",
    "libriru_lspd",
];

/// Default frida-server listening port
const FRIDA_SERVER_PORT: u16 = 27042;

pub fn hook_detector() -> Detector {
    Detector::new(
        "hook",
        vec![
            Box::new(ClassProbe::new("hook_classes", HOOK_CLASSES)),
            Box::new(SymbolProbe::new("hook_symbols", HOOK_SYMBOLS)),
            Box::new(PathProbe::new("hook_paths", HOOK_PATHS)),
            Box::new(MapsProbe::new("injected_libraries", INJECTED_LIBRARIES)),
            Box::new(ListeningPortProbe::new("frida_server_port", FRIDA_SERVER_PORT)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::host::SystemHost;

    fn proc_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("proc/self")).unwrap();
        fs::create_dir_all(dir.path().join("proc/net")).unwrap();
        fs::write(
            dir.path().join("proc/self/maps"),
            "7f00000000-7f00001000 r-xp 00000000 fd:00 1 /system/lib64/libc.so\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("proc/net/tcp"),
            "  sl  local_address rem_address   st\n   0: 0100007F:1F90 00000000:0000 0A\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_clean_process_is_not_hooked() {
        let dir = proc_tree();
        assert!(!hook_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_injected_gadget_in_maps() {
        let dir = proc_tree();
        fs::write(
            dir.path().join("proc/self/maps"),
            "7f00000000-7f00001000 r-xp 00000000 fd:00 1 /data/app/lib/arm64/libFrida-Gadget.so\n",
        )
        .unwrap();
        assert!(hook_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_frida_port_in_tcp6_only() {
        let dir = proc_tree();
        fs::write(
            dir.path().join("proc/net/tcp6"),
            "  sl  local_address rem_address st\n   0: 00000000000000000000000000000000:69A2 00000000000000000000000000000000:0000 0A\n",
        )
        .unwrap();
        assert!(hook_detector().detect(&SystemHost::with_root(dir.path())));
    }

    #[test]
    fn test_xposed_bridge_jar() {
        let dir = proc_tree();
        fs::create_dir_all(dir.path().join("system/framework")).unwrap();
        fs::write(dir.path().join("system/framework/XposedBridge.jar"), b"").unwrap();
        assert!(hook_detector().detect(&SystemHost::with_root(dir.path())));
    }
}
